//! Packed color layout and Binary Code Modulation bit extraction
//!
//! Pixels are stored as 16-bit words in the usual 5/6/5 packing (red in the
//! top five bits, green in the middle six, blue in the bottom five). The panel
//! only reproduces 4 bits per channel, so each channel contributes its four
//! most significant bits to the modulation: bit-plane 0 shows the least
//! significant of those four, bit-plane 3 the most significant.

use crate::BIT_PLANES;

/// Position of each channel's 4-bit modulation nibble inside a packed color
///
/// Every field is the bit index of the nibble's least significant bit, so the
/// bit shown during bit-plane `p` is `(color >> (offset + p)) & 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelLayout {
    /// Offset of the red nibble
    pub red: u8,
    /// Offset of the green nibble
    pub green: u8,
    /// Offset of the blue nibble
    pub blue: u8,
}

impl ChannelLayout {
    /// RGB565: red bits 15..11, green bits 10..5, blue bits 4..0
    pub const RGB565: Self = Self {
        red: 12,
        green: 7,
        blue: 1,
    };

    /// RGB565 words driven onto a panel whose red and blue lines are swapped
    pub const BGR565: Self = Self {
        red: 1,
        green: 7,
        blue: 12,
    };

    /// Extract the three channel bits shown during `bit_plane`
    #[inline]
    pub fn modulation_bits(&self, color: u16, bit_plane: u8) -> ChannelBits {
        debug_assert!(usize::from(bit_plane) < BIT_PLANES);
        let plane = bit_plane.min(BIT_PLANES as u8 - 1);
        ChannelBits {
            red: (color >> (self.red + plane)) & 1 != 0,
            green: (color >> (self.green + plane)) & 1 != 0,
            blue: (color >> (self.blue + plane)) & 1 != 0,
        }
    }
}

impl Default for ChannelLayout {
    fn default() -> Self {
        Self::RGB565
    }
}

/// Levels of the three color lines of one panel half for one column
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChannelBits {
    /// Red line level
    pub red: bool,
    /// Green line level
    pub green: bool,
    /// Blue line level
    pub blue: bool,
}

/// Pack 4-bit channel intensities (0..=15) into the top nibbles of an RGB565 word
///
/// Values above 15 are saturated.
pub const fn rgb444(r: u8, g: u8, b: u8) -> u16 {
    let r = (if r > 0x0F { 0x0F } else { r }) as u16;
    let g = (if g > 0x0F { 0x0F } else { g }) as u16;
    let b = (if b > 0x0F { 0x0F } else { b }) as u16;
    (r << 12) | (g << 7) | (b << 1)
}

/// Black
pub const BLACK: u16 = 0x0000;
/// Full white
pub const WHITE: u16 = 0xFFFF;
/// Full red
pub const RED: u16 = 0xF800;
/// Full green
pub const GREEN: u16 = 0x07E0;
/// Full blue
pub const BLUE: u16 = 0x001F;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb565_layout_selects_top_nibble_of_each_channel() {
        let layout = ChannelLayout::RGB565;
        // only the lowest bit of each 5/6/5 field: below every modulation nibble
        let dim = (1 << 11) | (1 << 5) | 1;
        for plane in 0..4 {
            assert_eq!(layout.modulation_bits(dim, plane), ChannelBits::default());
        }

        // green's second-lowest bit is still below its nibble
        assert!(!layout.modulation_bits(1 << 6, 0).green);
        assert!(layout.modulation_bits(1 << 7, 0).green);
        assert!(layout.modulation_bits(1 << 10, 3).green);
    }

    #[test]
    fn primaries_light_only_their_channel() {
        let layout = ChannelLayout::RGB565;
        for plane in 0..4 {
            let red = layout.modulation_bits(RED, plane);
            assert!(red.red && !red.green && !red.blue);
            let green = layout.modulation_bits(GREEN, plane);
            assert!(!green.red && green.green && !green.blue);
            let blue = layout.modulation_bits(BLUE, plane);
            assert!(!blue.red && !blue.green && blue.blue);
        }
    }

    #[test]
    fn matches_shift_then_mask_extraction() {
        // (color >> (plane + 1)) masked at 0, 6 and 11 for blue, green, red
        let layout = ChannelLayout::RGB565;
        for color in [0x1234u16, 0xBEEF, 0x5A5A, 0xFFFF, 0x0841] {
            for plane in 0..4u8 {
                let shifted = color >> (plane + 1);
                let bits = layout.modulation_bits(color, plane);
                assert_eq!(bits.blue, shifted & 1 != 0);
                assert_eq!(bits.green, (shifted >> 6) & 1 != 0);
                assert_eq!(bits.red, (shifted >> 11) & 1 != 0);
            }
        }
    }

    #[test]
    fn bgr_layout_swaps_red_and_blue() {
        let bits = ChannelLayout::BGR565.modulation_bits(RED, 2);
        assert!(bits.blue && !bits.red && !bits.green);
    }

    #[test]
    fn rgb444_places_intensity_bits_per_plane() {
        let color = rgb444(0b1000, 0b0001, 0b0110);
        let layout = ChannelLayout::RGB565;
        let planes: [ChannelBits; 4] = core::array::from_fn(|p| layout.modulation_bits(color, p as u8));
        assert_eq!(planes.map(|b| b.red), [false, false, false, true]);
        assert_eq!(planes.map(|b| b.green), [true, false, false, false]);
        assert_eq!(planes.map(|b| b.blue), [false, true, true, false]);
        assert_eq!(rgb444(0xFF, 0x0F, 0x0F), rgb444(15, 15, 15));
    }
}
