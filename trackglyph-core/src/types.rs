use serde::{Deserialize, Serialize};
use std::fmt;

pub type Position = u64;
pub type FeatureId = u64;

/// Half-open genomic range [start, end).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenomicRange {
    pub start: Position,
    pub end: Position,
}

impl GenomicRange {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> Position {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn overlaps(&self, other: &GenomicRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos >= self.start && pos < self.end
    }

    pub fn intersect(&self, other: &GenomicRange) -> Option<GenomicRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start < end {
            Some(GenomicRange::new(start, end))
        } else {
            None
        }
    }

    /// Swap endpoints if the range was supplied inverted. Not an error:
    /// inverted input is corrected in place before any geometry runs.
    pub fn normalize(&mut self) {
        if self.start > self.end {
            std::mem::swap(&mut self.start, &mut self.end);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    /// Parse a strand character; `None` for '.' or anything unrecognized.
    pub fn from_char(c: char) -> Option<Strand> {
        match c {
            '+' => Some(Strand::Forward),
            '-' => Some(Strand::Reverse),
            _ => None,
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
        }
    }
}

/// Sub-interval of a feature, optionally carrying a reading frame.
///
/// `phase` is the number of bases (0-2) at the exon's start that complete a
/// codon begun in the previous translated exon. Exons with `phase == None`
/// carry no reading frame (pure UTR) and are skipped by the translator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exon {
    pub range: GenomicRange,
    pub phase: Option<u8>,
    pub utr: bool,
    pub cds_start: Option<Position>,
    pub cds_end: Option<Position>,
}

impl Exon {
    pub fn new(start: Position, end: Position) -> Self {
        Self {
            range: GenomicRange::new(start, end),
            phase: None,
            utr: false,
            cds_start: None,
            cds_end: None,
        }
    }

    pub fn with_phase(mut self, phase: u8) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn as_utr(mut self) -> Self {
        self.utr = true;
        self
    }

    pub fn with_cds_trim(mut self, cds_start: Option<Position>, cds_end: Option<Position>) -> Self {
        self.cds_start = cds_start;
        self.cds_end = cds_end;
        self
    }

    /// True when this exon participates in translation.
    pub fn is_coding(&self) -> bool {
        self.phase.is_some() && !self.utr
    }

    /// The translated sub-range after applying CDS trim points, or `None`
    /// when the exon is untranslated or the trims leave nothing.
    pub fn coding_range(&self) -> Option<GenomicRange> {
        if !self.is_coding() {
            return None;
        }
        let trimmed = GenomicRange::new(
            self.cds_start.unwrap_or(self.range.start),
            self.cds_end.unwrap_or(self.range.end),
        );
        self.range.intersect(&trimmed)
    }
}

/// One aligned block of a chain-style alignment.
///
/// `range` is the block's span in the displayed genome, `other` its span in
/// the counterpart genome. `other_length` is the total length of the
/// counterpart sequence, used for extension-arm gap sizing. The block
/// inherits the feature's strand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub range: GenomicRange,
    pub other: GenomicRange,
    pub other_length: Option<Position>,
    pub query: String,
    pub cigar: String,
}

impl Component {
    pub fn new(range: GenomicRange, other: GenomicRange, query: String, cigar: String) -> Self {
        Self {
            range,
            other,
            other_length: None,
            query,
            cigar,
        }
    }

    pub fn with_other_length(mut self, length: Position) -> Self {
        self.other_length = Some(length);
        self
    }
}

/// A genomic feature supplied fresh per visible region each render pass.
///
/// Features are immutable during a pass; row assignment lives in the
/// per-pass `RowLayout` and is never stored here. `mate` carries the
/// secondary sub-range of a self-pair feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub id: FeatureId,
    pub chrom: String,
    pub range: GenomicRange,
    pub strand: Option<Strand>,
    pub name: Option<String>,
    pub exons: Vec<Exon>,
    pub components: Vec<Component>,
    pub mate: Option<GenomicRange>,
    /// Externally supplied amino-acid letters for aligned-protein features,
    /// one per codon in transcription order.
    pub protein: Option<String>,
}

impl Feature {
    pub fn new(id: FeatureId, chrom: impl Into<String>, start: Position, end: Position) -> Self {
        Self {
            id,
            chrom: chrom.into(),
            range: GenomicRange::new(start, end),
            strand: None,
            name: None,
            exons: Vec::new(),
            components: Vec::new(),
            mate: None,
            protein: None,
        }
    }

    pub fn with_strand(mut self, strand: Strand) -> Self {
        self.strand = Some(strand);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_exons(mut self, exons: Vec<Exon>) -> Self {
        self.exons = exons;
        self
    }

    pub fn with_components(mut self, components: Vec<Component>) -> Self {
        self.components = components;
        self
    }

    pub fn with_mate(mut self, mate: GenomicRange) -> Self {
        self.mate = Some(mate);
        self
    }

    pub fn with_protein(mut self, protein: impl Into<String>) -> Self {
        self.protein = Some(protein.into());
        self
    }

    /// Correct any inverted intervals before geometry is computed. A
    /// normalization step, not a reported error.
    pub fn normalize(&mut self) {
        self.range.normalize();
        if let Some(mate) = &mut self.mate {
            mate.normalize();
        }
        for exon in &mut self.exons {
            exon.range.normalize();
        }
        for component in &mut self.components {
            component.range.normalize();
            component.other.normalize();
        }
    }

    /// Full drawn span including the self-pair mate, if any.
    pub fn drawn_span(&self) -> GenomicRange {
        match &self.mate {
            Some(mate) => GenomicRange::new(
                self.range.start.min(mate.start),
                self.range.end.max(mate.end),
            ),
            None => self.range,
        }
    }
}
