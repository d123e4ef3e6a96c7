//! Surface renderers and the pieces they share.
//!
//! Both backends paint the same page in the same order: background, images by z-index, text
//! blocks by z-index, then animations are handed to the scene graph.

/// Opacity transitions and the scene graph they are applied to.
pub mod animation;
/// Renderer trait, snapshots and backend selection.
pub mod backend;
pub(crate) mod blur;
pub(crate) mod composite;
/// Raster surface backed by a CPU pixmap.
pub mod raster;
/// Style string parsers shared by both backends.
pub mod style;
/// SVG document tree.
pub mod svg;
pub(crate) mod text_shaper;
/// Vector surface backed by an SVG document.
pub mod vector;
