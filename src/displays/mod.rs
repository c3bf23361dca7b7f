//! Graphics Support for the matrix panel
//!
//! [`MatrixDisplay`] wraps a [`Panel`] as an `embedded-graphics`
//! [`DrawTarget`] so primitives, images and mono fonts can be drawn straight
//! into the back store.

use display_interface::DisplayError;
use embedded_graphics::{
    pixelcolor::{IntoStorage, Rgb565},
    prelude::*,
};
use embedded_hal::delay::DelayNs;

use crate::panel::Panel;
use crate::{HEIGHT, WIDTH};

/// Displayrotation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DisplayRotation {
    /// No rotation
    #[default]
    Rotate0,
    /// Rotate by 90 degrees clockwise
    Rotate90,
    /// Rotate by 180 degrees clockwise
    Rotate180,
    /// Rotate 270 degrees clockwise
    Rotate270,
}

// Checks if a pos is outside the defined display
fn outside_display(p: Point, width: u32, height: u32, rotation: DisplayRotation) -> bool {
    if p.x < 0 || p.y < 0 {
        return true;
    }
    let (x, y) = (p.x as u32, p.y as u32);
    match rotation {
        DisplayRotation::Rotate0 | DisplayRotation::Rotate180 => x >= width || y >= height,
        DisplayRotation::Rotate90 | DisplayRotation::Rotate270 => y >= width || x >= height,
    }
}

// Maps a logical position to the physical panel position
fn find_rotation(x: u32, y: u32, width: u32, height: u32, rotation: DisplayRotation) -> (u32, u32) {
    match rotation {
        DisplayRotation::Rotate0 => (x, y),
        DisplayRotation::Rotate90 => (width - 1 - y, x),
        DisplayRotation::Rotate180 => (width - 1 - x, height - 1 - y),
        DisplayRotation::Rotate270 => (y, height - 1 - x),
    }
}

/// `embedded-graphics` view of a [`Panel`]
pub struct MatrixDisplay<'a, D> {
    panel: Panel<'a, D>,
    rotation: DisplayRotation,
}

impl<'a, D> MatrixDisplay<'a, D>
where
    D: DelayNs,
{
    /// Draw into `panel` without rotation
    pub fn new(panel: Panel<'a, D>) -> Self {
        Self {
            panel,
            rotation: DisplayRotation::default(),
        }
    }

    /// Sets the rotation of the display
    pub fn set_rotation(&mut self, rotation: DisplayRotation) {
        self.rotation = rotation;
    }

    /// Get the current rotation of the display
    pub fn rotation(&self) -> DisplayRotation {
        self.rotation
    }

    /// Present what was drawn so far at the next frame boundary
    pub fn refresh(&mut self) {
        self.panel.request_refresh();
    }

    /// The underlying panel
    pub fn panel(&mut self) -> &mut Panel<'a, D> {
        &mut self.panel
    }

    /// Give the panel back
    pub fn into_panel(self) -> Panel<'a, D> {
        self.panel
    }

    fn draw_helper(&mut self, Pixel(point, color): Pixel<Rgb565>) {
        let (width, height) = (WIDTH as u32, HEIGHT as u32);
        if outside_display(point, width, height, self.rotation) {
            return;
        }
        let (x, y) = find_rotation(point.x as u32, point.y as u32, width, height, self.rotation);
        self.panel.set_pixel(x as i32, y as i32, color.into_storage());
    }
}

impl<D> DrawTarget for MatrixDisplay<'_, D>
where
    D: DelayNs,
{
    type Error = DisplayError;
    type Color = Rgb565;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for p in pixels.into_iter() {
            self.draw_helper(p);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.panel.fill(color.into_storage());
        Ok(())
    }
}

impl<D> OriginDimensions for MatrixDisplay<'_, D> {
    fn size(&self) -> Size {
        //if display is rotated 90 deg or 270 then swap height and width
        match self.rotation {
            DisplayRotation::Rotate0 | DisplayRotation::Rotate180 => {
                Size::new(WIDTH as u32, HEIGHT as u32)
            }
            DisplayRotation::Rotate90 | DisplayRotation::Rotate270 => {
                Size::new(HEIGHT as u32, WIDTH as u32)
            }
        }
    }
}
