//! Box sizes estimated from label text.

use flowgraph_core::{geometry::Size, semantic::ShapeKind};

use crate::config::{LayoutConfig, NodeSizingConfig};

/// Size of a leaf node with the given label and shape.
///
/// Width follows the longest line, kept within the configured minimum and
/// maximum; height follows the number of lines. Diamonds shrink by a fixed
/// factor and circles become squares.
///
/// The maximum wins when the bounds are inverted, and a NaN bound is
/// ignored, so an unvalidated configuration never panics here.
pub fn node_size(label: &str, shape: ShapeKind, config: &NodeSizingConfig) -> Size {
    let longest = label.split('\n').map(|line| line.chars().count()).max().unwrap_or(0);
    let lines = label.split('\n').count().max(1);

    let width = (longest as f32 * config.char_width() + config.padding_x())
        .max(config.min_width())
        .min(config.max_width());
    let height = lines as f32 * config.line_height() + config.padding_y();
    let size = Size::new(width, height);

    match shape {
        ShapeKind::Diamond => size.scale(config.diamond_scale()),
        ShapeKind::Circle => {
            let side = width.max(height) + config.circle_margin();
            Size::new(side, side)
        }
        ShapeKind::Rectangle | ShapeKind::Stadium | ShapeKind::Rounded => size,
    }
}

/// Width needed to show a group title in its header.
pub fn title_width(title: &str, config: &LayoutConfig) -> f32 {
    title.chars().count() as f32 * config.node().char_width()
        + config.group_insets().horizontal_sum()
}

/// Size of a group with nothing inside: a header and padding, at least as
/// wide as a default node.
pub fn empty_group_size(title: &str, config: &LayoutConfig) -> Size {
    let width = title_width(title, config).max(config.node().min_width());
    Size::default()
        .add_padding(config.group_insets())
        .max(Size::new(width, 0.0))
}
