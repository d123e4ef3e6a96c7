//! pagevis renders declarative pages onto a raster or vector surface.
//!
//! A page is a background plus absolutely positioned text blocks and images, each with an optional
//! z-index, and a list of fade animations. The public API is controller-oriented:
//!
//! - Build a [`PageVisualizer`] for a [`RenderingMode`]
//! - Render a validated [`Page`] onto its surface
//! - Export the surface as a data URL, resize it, or destroy it
//!
//! Positions accept pixels or unit strings (`px`, `%`, `vw`, `vh`, `em`, `rem`); text is greedily
//! wrapped inside its box and aligned left, center, right or justified.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

/// Export encodings.
pub mod encode;
/// Unit resolution, text wrapping and paint order.
pub mod layout;
/// Page model and visualizer configuration.
pub mod page;
/// Surface renderers.
pub mod render;
/// Boundary validation.
pub mod schema;
/// Visualizer controller and mount targets.
pub mod visualizer;

pub use crate::assets::decode::DecodedImage;
pub use crate::assets::fonts::{FONT_DIR_ENV, FontLibrary};
pub use crate::assets::loader::{DefaultImageLoader, ImageLoader, decode_data_url};
pub use crate::foundation::color::{Rgba8, parse_css_color};
pub use crate::foundation::core::{MAX_SURFACE_DIM, RenderingContext, Viewport};
pub use crate::foundation::error::{PagevisError, PagevisResult};

pub use crate::layout::units::UnitResolver;
pub use crate::page::model::{
    Alignment, Animation, AnimationKind, Background, BorderOptions, BorderStyle, FontStyle,
    FontWeight, ImageElement, Page, PageId, Position, PositionValue, TextBlock, TextDecoration,
    TextFormatting,
};
pub use crate::page::styles::{
    ExportFormat, ExportOptions, GlobalStyles, PartialGlobalStyles, RenderingMode,
    VisualizerConfig,
};
pub use crate::render::animation::{
    DetachedScene, InMemorySceneGraph, OpacityTransition, SceneGraphSink,
};
pub use crate::render::backend::{FrameRGBA, SurfaceRenderer, SurfaceSnapshot};
pub use crate::visualizer::controller::{PageVisualizer, PageVisualizerBuilder};
pub use crate::visualizer::mount::{HeadlessMount, MountTarget, SurfaceDescriptor};
