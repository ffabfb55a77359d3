//! TrackGlyph Core Library
//!
//! Feature-layout and alignment-glyph algorithms for genomic track
//! rendering: row packing, coordinate mapping, operation-encoded alignment
//! decoding, and frame-aware codon translation. Pure in-memory transforms;
//! one synchronous pass per viewport change, nothing cached between passes.

pub mod cigar;
pub mod codon;
pub mod coords;
pub mod pack;
pub mod sequence;
pub mod types;

// Re-export commonly used types and functions
pub use cigar::{
    decode, parse_cigar, AlignedBase, BaseKind, CigarOp, DecodedAlignment, Mismatch, RefOffset,
};
pub use codon::{translate_codon, CodonGlyph, CodonStyle, CodonTranslator, STOP_AA};
pub use coords::{CoordError, CoordinateMapper, PixelSpan, Viewport, MIN_BOX_WIDTH_PX};
pub use pack::{PackParams, RowLayout, RowPacker};
pub use sequence::{InMemorySequence, ReferenceSequence};
pub use types::{Component, Exon, Feature, FeatureId, GenomicRange, Position, Strand};

/// Version information for the TrackGlyph core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
