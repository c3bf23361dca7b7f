//! Double-buffered pixel storage shared between the application and the scan interrupt
//!
//! Two [`PixelStore`]s hold one packed color per pixel. At any instant one of
//! them is the *front* store (read by the scan engine) and the other the
//! *back* store (written by the application). The application asks for the
//! back store to be presented with [`FrameBuffers::request_swap`]; the scan
//! engine honors the request at the next frame boundary, zero-fills the store
//! that just left the front role and clears the request.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use critical_section::Mutex;
use log::trace;

use crate::{HEIGHT, SCAN_ROWS, WIDTH};

/// One row of packed colors
pub type Row = [u16; WIDTH];

/// A fixed 16 x 32 grid of packed colors
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelStore {
    pixels: [Row; HEIGHT],
}

impl PixelStore {
    /// An all-black store
    pub const fn new() -> Self {
        Self {
            pixels: [[0; WIDTH]; HEIGHT],
        }
    }

    /// Color at `(x, y)`, `None` outside the panel
    pub fn get(&self, x: i32, y: i32) -> Option<u16> {
        let (x, y) = index(x, y)?;
        Some(self.pixels[y][x])
    }

    /// Write `color` at `(x, y)`. Returns `false` and leaves the store
    /// untouched when the coordinate is outside the panel.
    pub fn set(&mut self, x: i32, y: i32, color: u16) -> bool {
        match index(x, y) {
            Some((x, y)) => {
                self.pixels[y][x] = color;
                true
            }
            None => false,
        }
    }

    /// Set every pixel to `color`
    pub fn fill(&mut self, color: u16) {
        for row in self.pixels.iter_mut() {
            row.fill(color);
        }
    }

    /// Set every pixel to black
    pub fn clear(&mut self) {
        self.fill(0);
    }

    /// Row `y`, which must be below [`HEIGHT`]
    pub fn row(&self, y: usize) -> &Row {
        &self.pixels[y]
    }

    /// Whether every pixel is black
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().flatten().all(|&c| c == 0)
    }
}

impl Default for PixelStore {
    fn default() -> Self {
        Self::new()
    }
}

fn index(x: i32, y: i32) -> Option<(usize, usize)> {
    let x = usize::try_from(x).ok()?;
    let y = usize::try_from(y).ok()?;
    (x < WIDTH && y < HEIGHT).then_some((x, y))
}

struct Stores {
    planes: [PixelStore; 2],
    front: usize,
}

impl Stores {
    fn front(&self) -> &PixelStore {
        &self.planes[self.front]
    }

    fn back(&self) -> &PixelStore {
        &self.planes[self.front ^ 1]
    }

    fn back_mut(&mut self) -> &mut PixelStore {
        &mut self.planes[self.front ^ 1]
    }
}

/// Front/back pixel stores plus the pending swap request
///
/// Meant to live in a `static` so that both the foreground code and the scan
/// interrupt can reach it. Store contents and the role assignment are only
/// touched inside a critical section; the swap request is a single atomic
/// flag so the foreground can poll it without masking the interrupt.
pub struct FrameBuffers {
    stores: Mutex<RefCell<Stores>>,
    swap_pending: AtomicBool,
    swaps: AtomicU32,
}

impl FrameBuffers {
    /// Two blank stores, store A in the front role
    pub const fn new() -> Self {
        Self {
            stores: Mutex::new(RefCell::new(Stores {
                planes: [PixelStore::new(), PixelStore::new()],
                front: 0,
            })),
            swap_pending: AtomicBool::new(false),
            swaps: AtomicU32::new(0),
        }
    }

    /// Write a pixel into the back store; out-of-range coordinates are ignored
    ///
    /// This does not wait for a pending swap. [`crate::panel::Panel`] wraps it
    /// with the wait contract.
    pub fn set_pixel(&self, x: i32, y: i32, color: u16) {
        critical_section::with(|cs| {
            self.stores.borrow_ref_mut(cs).back_mut().set(x, y, color);
        });
    }

    /// Read a pixel from the back store
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<u16> {
        critical_section::with(|cs| self.stores.borrow_ref(cs).back().get(x, y))
    }

    /// Fill the whole back store with `color`
    pub fn fill(&self, color: u16) {
        critical_section::with(|cs| {
            self.stores.borrow_ref_mut(cs).back_mut().fill(color);
        });
    }

    /// Run `f` with the back store
    pub fn with_back<R>(&self, f: impl FnOnce(&PixelStore) -> R) -> R {
        critical_section::with(|cs| f(self.stores.borrow_ref(cs).back()))
    }

    /// Run `f` with the front store
    pub fn with_front<R>(&self, f: impl FnOnce(&PixelStore) -> R) -> R {
        critical_section::with(|cs| f(self.stores.borrow_ref(cs).front()))
    }

    /// Copy of the front store rows `row` and `row + 8`, the two rows driven
    /// together during one scan step
    pub fn front_row_pair(&self, row: usize) -> (Row, Row) {
        debug_assert!(row < SCAN_ROWS);
        let row = row.min(SCAN_ROWS - 1);
        critical_section::with(|cs| {
            let stores = self.stores.borrow_ref(cs);
            let front = stores.front();
            (*front.row(row), *front.row(row + SCAN_ROWS))
        })
    }

    /// Ask for the back store to be presented at the next frame boundary
    ///
    /// Returns `false` without touching the flag when a request is already
    /// pending; the earlier request is honored exactly once either way.
    pub fn request_swap(&self) -> bool {
        if self.swap_pending.load(Ordering::Acquire) {
            return false;
        }
        self.swap_pending.store(true, Ordering::Release);
        true
    }

    /// Whether a swap request is waiting for the next frame boundary
    pub fn is_swap_pending(&self) -> bool {
        self.swap_pending.load(Ordering::Acquire)
    }

    /// Number of swaps performed so far (wrapping)
    pub fn swap_count(&self) -> u32 {
        self.swaps.load(Ordering::Relaxed)
    }

    /// Perform the swap if one was requested. Called by the scan engine at a
    /// frame boundary.
    pub(crate) fn swap_if_pending(&self) -> bool {
        if !self.swap_pending.load(Ordering::Acquire) {
            return false;
        }
        let front = critical_section::with(|cs| {
            let mut stores = self.stores.borrow_ref_mut(cs);
            stores.front ^= 1;
            stores.back_mut().clear();
            self.swaps
                .store(self.swaps.load(Ordering::Relaxed).wrapping_add(1), Ordering::Relaxed);
            self.swap_pending.store(false, Ordering::Release);
            stores.front
        });
        trace!("frame buffers swapped, front is now store {}", front);
        true
    }
}

impl Default for FrameBuffers {
    fn default() -> Self {
        Self::new()
    }
}
