//! Flowgraph Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Flowgraph parser
//! and layout engine. It includes:
//!
//! - **Geometry**: Points, sizes, bounds and insets ([`geometry`] module)
//! - **Colors**: CSS color validation and the fixed style palettes ([`color`] module)
//! - **Semantic**: The parsed graph model: nodes, edges and groups ([`semantic`] module)
//! - **Render**: The composed output consumed by a renderer ([`render`] module)

pub mod color;
pub mod geometry;
pub mod render;
pub mod semantic;
