//! Class label to display colour mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const WITH_MASK: &str = "with_mask";
pub const WITHOUT_MASK: &str = "without_mask";
pub const MASK_WEARED_INCORRECT: &str = "mask_weared_incorrect";

/// Classes emitted by the face-mask detector, in class-id order.
pub const DEFAULT_CLASSES: [&str; 3] = [WITH_MASK, WITHOUT_MASK, MASK_WEARED_INCORRECT];

/// Logical colour, always stored as red, green, blue.
///
/// Serialises as a three-element array so config tables read `[r, g, b]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Color> for [u8; 3] {
    fn from(color: Color) -> Self {
        [color.r, color.g, color.b]
    }
}

/// Built-in colours for the mask classes.
pub fn default_colors() -> BTreeMap<String, Color> {
    BTreeMap::from([
        (WITH_MASK.to_string(), Color::new(127, 255, 0)),
        (WITHOUT_MASK.to_string(), Color::new(255, 0, 0)),
        (MASK_WEARED_INCORRECT.to_string(), Color::new(255, 165, 0)),
    ])
}

/// Fixed label -> colour table, built once and read-only afterwards.
///
/// Lookups never fail: labels without an entry resolve to the fallback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorPalette {
    colors: BTreeMap<String, Color>,
    fallback: Color,
}

impl ColorPalette {
    /// Build a palette for `classes`. Entries come from `overrides` first,
    /// then the built-in table; anything still unmapped gets the fallback.
    ///
    /// Override entries for labels outside `classes` are kept too, so a
    /// detector emitting an extra class can still be coloured.
    pub fn new<S: AsRef<str>>(classes: &[S], overrides: Option<&BTreeMap<String, Color>>) -> Self {
        let builtin = default_colors();
        let mut colors = BTreeMap::new();
        for class in classes {
            let class = class.as_ref();
            let color = overrides
                .and_then(|table| table.get(class))
                .or_else(|| builtin.get(class))
                .copied()
                .unwrap_or(Color::WHITE);
            colors.insert(class.to_string(), color);
        }
        if let Some(table) = overrides {
            for (label, color) in table {
                colors.entry(label.clone()).or_insert(*color);
            }
        }
        Self {
            colors,
            fallback: Color::WHITE,
        }
    }

    pub fn color_for(&self, label: &str) -> Color {
        self.colors.get(label).copied().unwrap_or(self.fallback)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.colors.contains_key(label)
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::new(&DEFAULT_CLASSES, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels_resolve_to_builtin_colors() {
        let palette = ColorPalette::default();
        assert_eq!(palette.color_for(WITH_MASK), Color::new(127, 255, 0));
        assert_eq!(palette.color_for(WITHOUT_MASK), Color::new(255, 0, 0));
        assert_eq!(
            palette.color_for(MASK_WEARED_INCORRECT),
            Color::new(255, 165, 0)
        );
    }

    #[test]
    fn unknown_labels_fall_back_to_white() {
        let palette = ColorPalette::default();
        assert!(!palette.contains("helmet"));
        assert_eq!(palette.color_for("helmet"), Color::WHITE);
        assert_eq!(palette.color_for(""), Color::WHITE);
    }

    #[test]
    fn overrides_win_and_unmapped_classes_get_fallback() {
        let overrides = BTreeMap::from([
            (WITH_MASK.to_string(), Color::new(0, 0, 255)),
            ("visor".to_string(), Color::new(9, 9, 9)),
        ]);
        let palette = ColorPalette::new(&[WITH_MASK, "helmet"], Some(&overrides));

        assert_eq!(palette.color_for(WITH_MASK), Color::new(0, 0, 255));
        assert!(palette.contains("helmet"));
        assert_eq!(palette.color_for("helmet"), Color::WHITE);
        assert_eq!(palette.color_for("visor"), Color::new(9, 9, 9));
        assert!(!palette.contains(WITHOUT_MASK));
    }

    #[test]
    fn color_deserializes_from_array() {
        let color: Color = serde_json::from_str("[1, 2, 3]").unwrap();
        assert_eq!(color, Color::new(1, 2, 3));
    }
}
