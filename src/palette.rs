//! Palette colors, note annotations and index remapping
//!
//! The RGBA chunk stores 256 colors. MagicaVoxel's UI indexes them
//! 1-based, with raw slot 0 surfacing as the wrap-around at visible
//! index 255; [`Palette::color`] exposes that view while
//! [`Palette::raw_colors`] keeps the stored order.

use serde::Serialize;

use crate::PALETTE_SIZE;

/// Colors per palette row in the MagicaVoxel UI
const ROW_WIDTH: usize = 8;

/// One RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// The 256-entry color table plus NOTE annotations and the IMAP remap
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Palette {
    #[serde(serialize_with = "<[_]>::serialize")]
    raw_colors: [Color; PALETTE_SIZE],
    notes: Vec<String>,
    /// Inverse of the IMAP permutation; identity when no IMAP chunk.
    #[serde(serialize_with = "<[_]>::serialize")]
    inverse_index_map: [u8; PALETTE_SIZE],
}

impl Palette {
    pub(crate) fn from_parts(
        colors: Option<[Color; PALETTE_SIZE]>,
        index_map: Option<&[u8; PALETTE_SIZE]>,
        notes: Vec<String>,
    ) -> Palette {
        // Files without an RGBA chunk fall back to a grayscale ramp.
        let raw_colors = colors.unwrap_or_else(|| {
            std::array::from_fn(|i| Color::new(i as u8, i as u8, i as u8, 255))
        });

        let mut inverse_index_map = std::array::from_fn(|i| i as u8);
        if let Some(map) = index_map {
            for (raw, &mapped) in map.iter().enumerate().take(PALETTE_SIZE - 1) {
                inverse_index_map[mapped.wrapping_sub(1) as usize] = raw as u8;
            }
        }

        Palette {
            raw_colors,
            notes,
            inverse_index_map,
        }
    }

    /// The color table in stored order
    pub fn raw_colors(&self) -> &[Color; PALETTE_SIZE] {
        &self.raw_colors
    }

    /// The color at `index` in MagicaVoxel's visible ordering
    pub fn color(&self, index: usize) -> Color {
        self.raw_colors[(index + 1) % PALETTE_SIZE]
    }

    /// The full table in visible ordering
    pub fn colors(&self) -> [Color; PALETTE_SIZE] {
        std::array::from_fn(|i| self.color(i))
    }

    /// NOTE-chunk annotations, one per palette row
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Visible indices of every palette row annotated with `note`
    ///
    /// Notes are stored bottom row first, so note position `i` covers the
    /// row `notes.len() - 1 - i` counted from the top of the palette.
    /// Returns an empty list when no note matches.
    pub fn color_indices_by_note(&self, note: &str) -> Vec<usize> {
        let mut indices = Vec::new();
        let rows = self.notes.len();
        for (i, n) in self.notes.iter().enumerate() {
            if n != note {
                continue;
            }
            let row = rows - 1 - i;
            for j in 0..ROW_WIDTH {
                let index = row * ROW_WIDTH + j;
                if index < PALETTE_SIZE {
                    indices.push(index);
                }
            }
        }
        indices
    }

    /// Colors of every palette row annotated with `note`
    pub fn colors_by_note(&self, note: &str) -> Vec<Color> {
        self.color_indices_by_note(note)
            .into_iter()
            .map(|i| self.color(i))
            .collect()
    }

    /// The stored color for a 1-based voxel color index
    pub(crate) fn voxel_color(&self, color_index: u8) -> Color {
        self.raw_colors[color_index.wrapping_sub(1) as usize]
    }

    /// Remap a 0-based color index through the inverse IMAP permutation
    pub(crate) fn mapped_index(&self, raw_index: u8) -> u8 {
        self.inverse_index_map[raw_index as usize]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::from_parts(None, None, Vec::new())
    }
}
