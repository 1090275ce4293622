//! Color handling for Flowgraph output.
//!
//! [`Color`] validates CSS color strings with the `color` crate and keeps the
//! author's spelling so the render model hands the exact string to the
//! renderer. The fixed palettes used by the composition phase live here too,
//! so that identical inputs always produce identical styling.

use std::{fmt, str::FromStr};

use color::DynamicColor;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::semantic::ShapeKind;

/// Error returned when a string is not a valid CSS color.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color `{input}`: {reason}")]
pub struct InvalidColor {
    input: String,
    reason: String,
}

/// A validated CSS color.
///
/// # Examples
///
/// ```
/// use flowgraph_core::color::Color;
///
/// let red = Color::new("#ff0000").unwrap();
/// assert_eq!(red.as_str(), "#ff0000");
/// assert!(Color::new("not-a-color").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    css: String,
}

impl Color {
    /// Create a new `Color` from a CSS color string such as `"#ff0000"`,
    /// `"rgb(255, 0, 0)"` or `"red"`.
    pub fn new(color_str: &str) -> Result<Self, InvalidColor> {
        let trimmed = color_str.trim();
        DynamicColor::from_str(trimmed).map_err(|err| InvalidColor {
            input: color_str.to_string(),
            reason: err.to_string(),
        })?;
        Ok(Self {
            css: trimmed.to_string(),
        })
    }

    /// Returns the CSS text of this color.
    pub fn as_str(&self) -> &str {
        &self.css
    }

    /// Build a color from one of the built-in palette constants.
    fn builtin(css: &'static str) -> Self {
        Self {
            css: css.to_string(),
        }
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color({})", self.css)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.css)
    }
}

impl TryFrom<String> for Color {
    type Error = InvalidColor;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.css)
    }
}

/// A fill/stroke color pair used to style a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorPair {
    background: Color,
    border: Color,
}

impl ColorPair {
    pub fn new(background: Color, border: Color) -> Self {
        Self { background, border }
    }

    pub fn background(&self) -> &Color {
        &self.background
    }

    pub fn border(&self) -> &Color {
        &self.border
    }

    pub(crate) fn builtin(background: &'static str, border: &'static str) -> Self {
        Self::new(Color::builtin(background), Color::builtin(border))
    }
}

/// Fixed fill/stroke pair for a leaf shape.
///
/// A pure function of the shape, so the same shape renders identically
/// regardless of where it sits in the diagram.
pub fn shape_colors(shape: ShapeKind) -> ColorPair {
    match shape {
        ShapeKind::Rectangle => ColorPair::builtin("#eef2ff", "#6366f1"),
        ShapeKind::Diamond => ColorPair::builtin("#fef3c7", "#d97706"),
        ShapeKind::Circle => ColorPair::builtin("#dcfce7", "#16a34a"),
        ShapeKind::Stadium => ColorPair::builtin("#e0f2fe", "#0284c7"),
        ShapeKind::Rounded => ColorPair::builtin("#fce7f3", "#db2777"),
    }
}

/// Fill/stroke pair for group containers.
pub fn group_colors() -> ColorPair {
    ColorPair::builtin("#f8fafc", "#94a3b8")
}

/// Edge colors used when no palette is configured. Edges pick
/// `palette[index % len]`.
pub const DEFAULT_EDGE_PALETTE: [&str; 6] = [
    "#6366f1", "#0ea5e9", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6",
];

/// Returns the default edge palette as validated colors.
pub fn default_edge_palette() -> Vec<Color> {
    DEFAULT_EDGE_PALETTE
        .iter()
        .map(|css| Color::builtin(css))
        .collect()
}
