//! Configuration types for Flowgraph layout and styling.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from
//! TOML or any other serde format. Every field has a default, so a partial
//! file only overrides what it names.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining layout and style settings.
//! - [`LayoutConfig`] - Separations, group padding and node sizing.
//! - [`StyleConfig`] - The rotating edge color palette.
//!
//! # Example
//!
//! ```
//! # use flowgraph::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(config.validate().is_ok());
//! assert_eq!(config.layout().group_padding(), 20.0);
//! ```

use serde::{Deserialize, Deserializer};

use flowgraph_core::{
    color::{Color, default_edge_palette},
    geometry::Insets,
};

use crate::error::FlowgraphError;

/// Top-level application configuration combining layout and style settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified layout and style configurations.
    pub fn new(layout: LayoutConfig, style: StyleConfig) -> Self {
        Self { layout, style }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Check that every numeric setting is usable by the layout phases.
    ///
    /// # Errors
    ///
    /// Returns [`FlowgraphError::Config`] naming the first offending setting.
    pub fn validate(&self) -> Result<(), FlowgraphError> {
        self.layout.validate()
    }
}

/// Separation between items laid out in the same scope.
///
/// Group and meta spacing have different defaults, so a partial table
/// only overrides the fields it names and keeps the defaults of its own
/// level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpacingConfig {
    /// Minimum gap between neighbors in the same rank.
    node_separation: f32,

    /// Gap between consecutive ranks.
    rank_separation: f32,
}

impl SpacingConfig {
    pub fn new(node_separation: f32, rank_separation: f32) -> Self {
        Self {
            node_separation,
            rank_separation,
        }
    }

    pub fn node_separation(&self) -> f32 {
        self.node_separation
    }

    pub fn rank_separation(&self) -> f32 {
        self.rank_separation
    }

    fn meta_default() -> Self {
        Self::new(80.0, 100.0)
    }
}

impl Default for SpacingConfig {
    fn default() -> Self {
        Self::new(50.0, 60.0)
    }
}

/// The fields of a `[layout.group]` or `[layout.meta]` table, all optional.
#[derive(Deserialize)]
struct SpacingOverrides {
    node_separation: Option<f32>,
    rank_separation: Option<f32>,
}

impl SpacingOverrides {
    fn apply(self, defaults: SpacingConfig) -> SpacingConfig {
        SpacingConfig::new(
            self.node_separation.unwrap_or(defaults.node_separation),
            self.rank_separation.unwrap_or(defaults.rank_separation),
        )
    }
}

fn group_spacing<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SpacingConfig, D::Error> {
    SpacingOverrides::deserialize(deserializer).map(|o| o.apply(SpacingConfig::default()))
}

fn meta_spacing<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SpacingConfig, D::Error> {
    SpacingOverrides::deserialize(deserializer).map(|o| o.apply(SpacingConfig::meta_default()))
}

/// Label-driven node sizing parameters.
///
/// These are tuning values rather than contracts: only "longer labels give
/// wider boxes, more lines give taller boxes" is guaranteed.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct NodeSizingConfig {
    char_width: f32,
    line_height: f32,
    padding_x: f32,
    padding_y: f32,
    min_width: f32,
    max_width: f32,
    /// Factor applied to both dimensions of diamonds.
    diamond_scale: f32,
    /// Added to the side of circles after squaring.
    circle_margin: f32,
}

impl NodeSizingConfig {
    pub fn char_width(&self) -> f32 {
        self.char_width
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn padding_x(&self) -> f32 {
        self.padding_x
    }

    pub fn padding_y(&self) -> f32 {
        self.padding_y
    }

    pub fn min_width(&self) -> f32 {
        self.min_width
    }

    pub fn max_width(&self) -> f32 {
        self.max_width
    }

    pub fn diamond_scale(&self) -> f32 {
        self.diamond_scale
    }

    pub fn circle_margin(&self) -> f32 {
        self.circle_margin
    }
}

impl Default for NodeSizingConfig {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            line_height: 20.0,
            padding_x: 32.0,
            padding_y: 24.0,
            min_width: 80.0,
            max_width: 280.0,
            diamond_scale: 0.8,
            circle_margin: 16.0,
        }
    }
}

/// Layout parameters for both layout phases.
///
/// ```toml
/// [layout]
/// group_padding = 24
/// header_height = 36
///
/// [layout.group]
/// node_separation = 40
///
/// [layout.node]
/// max_width = 320
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Separations inside a group.
    #[serde(deserialize_with = "group_spacing")]
    group: SpacingConfig,

    /// Separations between top-level boxes.
    #[serde(deserialize_with = "meta_spacing")]
    meta: SpacingConfig,

    /// Padding on all four sides of a group's content.
    group_padding: f32,

    /// Vertical space reserved for a group's title bar.
    header_height: f32,

    node: NodeSizingConfig,
}

impl LayoutConfig {
    /// Creates a layout configuration with the given separations and the
    /// default padding and node sizing.
    pub fn new(group: SpacingConfig, meta: SpacingConfig) -> Self {
        Self {
            group,
            meta,
            ..Self::default()
        }
    }

    /// Returns the separations used inside groups.
    pub fn group(&self) -> &SpacingConfig {
        &self.group
    }

    /// Returns the separations used for the meta-graph.
    pub fn meta(&self) -> &SpacingConfig {
        &self.meta
    }

    pub fn group_padding(&self) -> f32 {
        self.group_padding
    }

    pub fn header_height(&self) -> f32 {
        self.header_height
    }

    /// Space between a group's border and its contents, title header
    /// included.
    pub fn group_insets(&self) -> Insets {
        Insets::with_header(self.group_padding, self.header_height)
    }

    /// Returns the node sizing parameters.
    pub fn node(&self) -> &NodeSizingConfig {
        &self.node
    }

    pub(crate) fn validate(&self) -> Result<(), FlowgraphError> {
        let values = [
            ("layout.group.node_separation", self.group.node_separation),
            ("layout.group.rank_separation", self.group.rank_separation),
            ("layout.meta.node_separation", self.meta.node_separation),
            ("layout.meta.rank_separation", self.meta.rank_separation),
            ("layout.group_padding", self.group_padding),
            ("layout.header_height", self.header_height),
            ("layout.node.char_width", self.node.char_width),
            ("layout.node.line_height", self.node.line_height),
            ("layout.node.padding_x", self.node.padding_x),
            ("layout.node.padding_y", self.node.padding_y),
            ("layout.node.min_width", self.node.min_width),
            ("layout.node.max_width", self.node.max_width),
            ("layout.node.diamond_scale", self.node.diamond_scale),
            ("layout.node.circle_margin", self.node.circle_margin),
        ];
        if let Some((name, value)) = values
            .iter()
            .find(|(_, value)| !value.is_finite() || *value < 0.0)
        {
            return Err(FlowgraphError::Config(format!(
                "`{name}` must be a non-negative number, got {value}"
            )));
        }

        if self.node.min_width > self.node.max_width {
            return Err(FlowgraphError::Config(format!(
                "`layout.node.min_width` ({}) exceeds `layout.node.max_width` ({})",
                self.node.min_width, self.node.max_width
            )));
        }
        if self.node.diamond_scale == 0.0 {
            return Err(FlowgraphError::Config(
                "`layout.node.diamond_scale` must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            group: SpacingConfig::default(),
            meta: SpacingConfig::meta_default(),
            group_padding: 20.0,
            header_height: 32.0,
            node: NodeSizingConfig::default(),
        }
    }
}

/// Visual styling configuration.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StyleConfig {
    /// Edge colors, cycled by edge index. Each entry is validated as a CSS
    /// color while loading.
    #[serde(default)]
    edge_palette: Option<Vec<Color>>,
}

impl StyleConfig {
    /// Creates a style configuration with an explicit edge palette.
    pub fn new(edge_palette: Vec<Color>) -> Self {
        Self {
            edge_palette: Some(edge_palette),
        }
    }

    /// Returns the configured edge palette, or the built-in one when none
    /// (or an empty one) is configured.
    pub fn edge_palette(&self) -> Vec<Color> {
        match &self.edge_palette {
            Some(palette) if !palette.is_empty() => palette.clone(),
            _ => default_edge_palette(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.layout().group().node_separation(), 50.0);
        assert_eq!(config.layout().meta().rank_separation(), 100.0);
        assert_eq!(config.layout().node().diamond_scale(), 0.8);
        assert_eq!(config.style().edge_palette(), default_edge_palette());
    }

    #[test]
    fn test_empty_palette_falls_back() {
        let style = StyleConfig::new(Vec::new());
        assert_eq!(style.edge_palette(), default_edge_palette());
    }

    #[test]
    fn test_validate_rejects_negative_values() {
        let layout = LayoutConfig::new(SpacingConfig::new(-1.0, 60.0), SpacingConfig::default());
        let err = AppConfig::new(layout, StyleConfig::default())
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("layout.group.node_separation"));
    }

    #[test]
    fn test_partial_meta_table_keeps_meta_defaults() {
        let config: AppConfig = toml::from_str("[layout.meta]\nnode_separation = 120.0").unwrap();
        assert_eq!(config.layout().meta().node_separation(), 120.0);
        assert_eq!(config.layout().meta().rank_separation(), 100.0);
        assert_eq!(config.layout().group(), &SpacingConfig::default());
    }

    #[test]
    fn test_partial_group_table_keeps_group_defaults() {
        let config: AppConfig = toml::from_str("[layout.group]\nrank_separation = 30.0").unwrap();
        assert_eq!(config.layout().group().node_separation(), 50.0);
        assert_eq!(config.layout().group().rank_separation(), 30.0);
        assert_eq!(config.layout().meta().node_separation(), 80.0);
    }

    #[test]
    fn test_group_insets() {
        let insets = LayoutConfig::default().group_insets();
        assert_eq!(insets.top(), 52.0);
        assert_eq!(insets.left(), 20.0);
    }

    #[test]
    fn test_validate_rejects_inverted_width_bounds() {
        let mut layout = LayoutConfig::default();
        layout.node.min_width = 500.0;
        let err = AppConfig::new(layout, StyleConfig::default())
            .validate()
            .unwrap_err();
        assert!(matches!(err, FlowgraphError::Config(_)));
    }
}
