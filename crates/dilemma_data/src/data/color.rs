use serde::{Deserialize, Serialize};

/// 24-bit colour used by renderers to visualise lineages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Largest packed value, `0xFFFFFF`.
    pub const MAX_PACKED: u32 = 0x00FF_FFFF;

    /// Unpacks a `0xBBGGRR` value; bits above 24 are ignored.
    #[must_use]
    pub fn from_packed(value: u32) -> Self {
        Self {
            r: (value & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: ((value >> 16) & 0xFF) as u8,
        }
    }

    /// Packs into `0xBBGGRR`.
    #[must_use]
    pub fn packed(self) -> u32 {
        u32::from(self.r) | (u32::from(self.g) << 8) | (u32::from(self.b) << 16)
    }

    /// Moves each channel by its delta, saturating at the channel bounds.
    #[must_use]
    pub fn shifted(self, dr: i16, dg: i16, db: i16) -> Self {
        let shift = |c: u8, d: i16| (i16::from(c) + d).clamp(0, 255) as u8;
        Self {
            r: shift(self.r, dr),
            g: shift(self.g, dg),
            b: shift(self.b, db),
        }
    }
}
