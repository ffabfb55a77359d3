//! TrackGlyph Render Library
//!
//! Glyph composition on top of `trackglyph-core`: track variants, explicit
//! render style, and renderer-agnostic drawing commands. A pass takes
//! features plus a viewport and returns pure draw data; rasterization is
//! the host's job.

pub mod draw;
pub mod glyph;
pub mod style;
pub mod track;

pub use draw::{DrawCmd, GlyphClass};
pub use glyph::{GlyphRenderer, RenderOutput};
pub use style::RenderStyle;
pub use track::{
    FeatureSource, RenderPass, Track, TrackConfig, TrackFactory, TrackKind,
};

/// Version information for the TrackGlyph render library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
