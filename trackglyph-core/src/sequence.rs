//! Reference sequence lookup over half-open genomic ranges.
//!
//! The engine never triggers I/O mid-pass: the host pre-fetches the visible
//! range and answers synchronously. Unavailable ranges return an explicit
//! no-data result; every dependent glyph degrades to "unknown" rather than
//! guessing a match or mismatch.

use crate::types::{GenomicRange, Position};
use std::collections::HashMap;

/// Synchronous base lookup over half-open genomic ranges.
pub trait ReferenceSequence {
    /// True when every base of `range` is resident.
    fn contains(&self, chrom: &str, range: GenomicRange) -> bool;

    /// Bases of `range`, or `None` when any part of it is not resident.
    fn fetch(&self, chrom: &str, range: GenomicRange) -> Option<Vec<u8>>;

    /// Single-base convenience lookup.
    fn base(&self, chrom: &str, pos: Position) -> Option<u8> {
        self.fetch(chrom, GenomicRange::new(pos, pos + 1))
            .and_then(|bases| bases.first().copied())
    }
}

/// In-memory reference store: pre-fetched segments keyed by chromosome.
/// The segments a host loads for the visible region before a pass begins.
#[derive(Debug, Clone, Default)]
pub struct InMemorySequence {
    segments: HashMap<String, Vec<(Position, Vec<u8>)>>,
}

impl InMemorySequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resident segment starting at `start`.
    pub fn add_segment(&mut self, chrom: impl Into<String>, start: Position, bases: impl Into<Vec<u8>>) {
        self.segments
            .entry(chrom.into())
            .or_default()
            .push((start, bases.into()));
    }

    fn segment_for(&self, chrom: &str, range: GenomicRange) -> Option<(&Position, &Vec<u8>)> {
        self.segments.get(chrom)?.iter().find_map(|(start, bases)| {
            let seg = GenomicRange::new(*start, *start + bases.len() as Position);
            if range.start >= seg.start && range.end <= seg.end {
                Some((start, bases))
            } else {
                None
            }
        })
    }
}

impl ReferenceSequence for InMemorySequence {
    fn contains(&self, chrom: &str, range: GenomicRange) -> bool {
        self.segment_for(chrom, range).is_some()
    }

    fn fetch(&self, chrom: &str, range: GenomicRange) -> Option<Vec<u8>> {
        let (start, bases) = self.segment_for(chrom, range)?;
        let offset = (range.start - start) as usize;
        Some(bases[offset..offset + range.len() as usize].to_vec())
    }
}
