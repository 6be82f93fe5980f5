//! Color/line-style palette for grouping like signals.
//!
//! The palette is an explicit, injectable ordered list rather than a module
//! constant, so tests (and callers with house styles) can substitute a
//! deterministic palette of their own.

use serde::{Deserialize, Serialize};

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);
    pub const GREEN: Rgb = Rgb::new(0, 155, 0);
    pub const MAGENTA: Rgb = Rgb::new(255, 0, 255);
}

/// Line style for a drawn curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
}

/// One palette slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub color: Rgb,
    pub style: LineStyle,
}

/// Fixed cyclic table mapping a signal's ordinal position within its dataset
/// to a (color, line-style) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
}

impl Palette {
    /// A palette from explicit entries. Must be non-empty.
    pub fn new(entries: Vec<PaletteEntry>) -> Self {
        debug_assert!(!entries.is_empty(), "palette must have at least one entry");
        Self { entries }
    }

    /// The default six-slot table: paired red/black solid+dashed slots for
    /// like signals, then blue dotted and green solid.
    pub fn standard() -> Self {
        Self::new(vec![
            PaletteEntry {
                color: Rgb::RED,
                style: LineStyle::Solid,
            },
            PaletteEntry {
                color: Rgb::RED,
                style: LineStyle::Dashed,
            },
            PaletteEntry {
                color: Rgb::BLACK,
                style: LineStyle::Solid,
            },
            PaletteEntry {
                color: Rgb::BLACK,
                style: LineStyle::Dashed,
            },
            PaletteEntry {
                color: Rgb::BLUE,
                style: LineStyle::Dotted,
            },
            PaletteEntry {
                color: Rgb::GREEN,
                style: LineStyle::Solid,
            },
        ])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for an ordinal position; wraps cyclically.
    pub fn entry(&self, ordinal: usize) -> PaletteEntry {
        self.entries[ordinal % self.entries.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_palette_has_six_slots() {
        assert_eq!(Palette::standard().len(), 6);
    }

    #[test]
    fn entry_lookup_is_cyclic() {
        let palette = Palette::standard();
        assert_eq!(palette.entry(0), palette.entry(6));
        assert_eq!(palette.entry(5), palette.entry(11));
    }

    #[test]
    fn injected_palette_overrides_the_standard_table() {
        let palette = Palette::new(vec![PaletteEntry {
            color: Rgb::new(1, 2, 3),
            style: LineStyle::Solid,
        }]);
        assert_eq!(palette.entry(7).color, Rgb::new(1, 2, 3));
    }
}
