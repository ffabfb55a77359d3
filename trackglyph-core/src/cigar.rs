//! Operation-encoded (CIGAR-style) alignment decoding.
//!
//! Turns a compact (length, opcode) encoding plus the raw query sequence
//! into a per-base aligned representation with reference-relative offsets,
//! classified as aligned, inserted, or gap. Unrecognized opcodes are
//! skipped, never fatal; a malformed record degrades only its own glyph.

use crate::sequence::ReferenceSequence;
use crate::types::{GenomicRange, Position};
use serde::{Deserialize, Serialize};

/// Placeholder character emitted for deletion gaps.
pub const GAP_BASE: u8 = b'-';

/// One alignment operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CigarOp {
    /// M: alignment match (may be a sequence match or mismatch)
    Match,
    /// I: insertion to the reference
    Insertion,
    /// D: deletion from the reference
    Deletion,
    /// N: skipped region (intron)
    Skip,
    /// S: soft clip
    SoftClip,
    /// H: hard clip
    HardClip,
    /// P: padding (silent)
    Padding,
    /// =: sequence match
    SeqMatch,
    /// X: sequence mismatch
    SeqMismatch,
}

impl CigarOp {
    pub fn from_char(c: char) -> Option<CigarOp> {
        match c {
            'M' => Some(CigarOp::Match),
            'I' => Some(CigarOp::Insertion),
            'D' => Some(CigarOp::Deletion),
            'N' => Some(CigarOp::Skip),
            'S' => Some(CigarOp::SoftClip),
            'H' => Some(CigarOp::HardClip),
            'P' => Some(CigarOp::Padding),
            '=' => Some(CigarOp::SeqMatch),
            'X' => Some(CigarOp::SeqMismatch),
            _ => None,
        }
    }

    /// Operations counted against the raw query sequence length.
    pub fn consumes_query(&self) -> bool {
        matches!(
            self,
            CigarOp::Match | CigarOp::Insertion | CigarOp::SoftClip | CigarOp::SeqMatch | CigarOp::SeqMismatch
        )
    }

    /// Operations counted against the component's reference span.
    pub fn consumes_reference(&self) -> bool {
        matches!(
            self,
            CigarOp::Match | CigarOp::Deletion | CigarOp::Skip | CigarOp::SeqMatch | CigarOp::SeqMismatch
        )
    }
}

/// Parse an operation string into (length, opcode) pairs. Unrecognized
/// opcode letters are dropped with a warning; decoding never fails on them.
pub fn parse_cigar(cigar: &str) -> Vec<(u32, CigarOp)> {
    let mut ops = Vec::new();
    let mut len: u64 = 0;
    let mut have_len = false;

    for c in cigar.chars() {
        if let Some(d) = c.to_digit(10) {
            len = (len * 10 + d as u64).min(u32::MAX as u64);
            have_len = true;
        } else {
            let run = if have_len { len as u32 } else { 1 };
            match CigarOp::from_char(c) {
                Some(op) => ops.push((run, op)),
                None => log::warn!("Skipping unrecognized alignment opcode '{}'", c),
            }
            len = 0;
            have_len = false;
        }
    }
    if have_len {
        log::warn!("Trailing operation length {} without opcode, discarded", len);
    }
    ops
}

/// Reference-relative placement of one aligned character.
///
/// `Between(p)` marks an inserted base sitting between reference bases
/// `p - 1` and `p`; it is a placement marker only, never a real coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefOffset {
    At(Position),
    Between(Position),
}

impl RefOffset {
    /// Fractional genomic coordinate for placement.
    pub fn placement_bp(&self) -> f64 {
        match self {
            RefOffset::At(p) => *p as f64,
            RefOffset::Between(p) => *p as f64 - 0.5,
        }
    }
}

/// Classification of one decoded character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaseKind {
    /// Consumes both query and reference (M, =, X)
    Aligned,
    /// Insertion to the reference; flagged, not substituted
    Inserted,
    /// Deletion placeholder; no query base
    Gap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignedBase {
    pub base: u8,
    pub offset: RefOffset,
    pub kind: BaseKind,
}

/// A mismatching aligned base against the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    pub pos: Position,
    pub base: u8,
}

/// Decoded per-base representation of one component alignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedAlignment {
    pub bases: Vec<AlignedBase>,
    pub ref_start: Position,
    /// Total reference length consumed across M/D/N/=/X.
    pub ref_consumed: u64,
    /// Total query characters consumed across M/I/S/=/X.
    pub query_consumed: u64,
}

impl DecodedAlignment {
    /// Reference span covered by the decode.
    pub fn ref_range(&self) -> GenomicRange {
        GenomicRange::new(self.ref_start, self.ref_start + self.ref_consumed)
    }

    /// Verify length conservation against the raw sequence and the
    /// component's declared span. Violations are data defects that degrade
    /// one glyph; callers log and keep going.
    pub fn conserves(&self, query_len: usize, declared_span: Position) -> bool {
        self.query_consumed == query_len as u64 && self.ref_consumed == declared_span
    }

    /// Contiguous runs of gap placeholders, collapsed to one range each.
    /// Each run renders as a single connecting line; the filled box is
    /// split so no fill covers the deleted span.
    pub fn deletion_runs(&self) -> Vec<GenomicRange> {
        let mut runs: Vec<GenomicRange> = Vec::new();
        for b in &self.bases {
            if b.kind != BaseKind::Gap {
                continue;
            }
            let pos = match b.offset {
                RefOffset::At(p) => p,
                RefOffset::Between(_) => continue,
            };
            match runs.last_mut() {
                Some(run) if run.end == pos => run.end = pos + 1,
                _ => runs.push(GenomicRange::new(pos, pos + 1)),
            }
        }
        runs
    }

    /// Between-base boundaries carrying inserted characters, one entry per
    /// inserted base. Each becomes an independent point glyph.
    pub fn insertion_points(&self) -> Vec<RefOffset> {
        self.bases
            .iter()
            .filter(|b| b.kind == BaseKind::Inserted)
            .map(|b| b.offset)
            .collect()
    }

    /// Aligned bases that differ from the resident reference. Positions
    /// where the reference is unavailable produce nothing: a match is never
    /// assumed and a mismatch never invented.
    pub fn mismatches(&self, seq: &dyn ReferenceSequence, chrom: &str) -> Vec<Mismatch> {
        let resident = seq.fetch(chrom, self.ref_range());
        let mut out = Vec::new();
        for b in &self.bases {
            if b.kind != BaseKind::Aligned {
                continue;
            }
            let pos = match b.offset {
                RefOffset::At(p) => p,
                RefOffset::Between(_) => continue,
            };
            let ref_base = match &resident {
                Some(bases) => bases.get((pos - self.ref_start) as usize).copied(),
                None => seq.base(chrom, pos),
            };
            if let Some(r) = ref_base {
                if !r.eq_ignore_ascii_case(&b.base) {
                    out.push(Mismatch { pos, base: b.base });
                }
            }
        }
        out
    }
}

/// Decode an operation string against the raw query sequence.
///
/// Positions left of `ref_start` never occur: the reference cursor starts
/// there and only advances. Query exhaustion under a malformed encoding
/// emits `N` for the missing characters; the conservation totals still
/// reflect what the encoding claimed, so `conserves` reports the defect.
pub fn decode(query: &[u8], cigar: &str, ref_start: Position) -> DecodedAlignment {
    let ops = parse_cigar(cigar);
    let mut bases = Vec::new();
    let mut qpos: usize = 0;
    let mut rpos = ref_start;
    let mut ref_consumed: u64 = 0;
    let mut query_consumed: u64 = 0;

    for (len, op) in ops {
        let len = len as u64;
        match op {
            CigarOp::Match | CigarOp::SeqMatch | CigarOp::SeqMismatch => {
                for _ in 0..len {
                    let base = query.get(qpos).copied().unwrap_or(b'N');
                    bases.push(AlignedBase {
                        base,
                        offset: RefOffset::At(rpos),
                        kind: BaseKind::Aligned,
                    });
                    qpos += 1;
                    rpos += 1;
                }
                query_consumed += len;
                ref_consumed += len;
            }
            CigarOp::Insertion => {
                for _ in 0..len {
                    let base = query.get(qpos).copied().unwrap_or(b'N');
                    bases.push(AlignedBase {
                        base,
                        offset: RefOffset::Between(rpos),
                        kind: BaseKind::Inserted,
                    });
                    qpos += 1;
                }
                query_consumed += len;
            }
            CigarOp::Deletion => {
                for _ in 0..len {
                    bases.push(AlignedBase {
                        base: GAP_BASE,
                        offset: RefOffset::At(rpos),
                        kind: BaseKind::Gap,
                    });
                    rpos += 1;
                }
                ref_consumed += len;
            }
            CigarOp::Skip => {
                rpos += len;
                ref_consumed += len;
            }
            CigarOp::SoftClip => {
                qpos += len as usize;
                query_consumed += len;
            }
            // Hard-clipped bases are absent from the raw query: nothing to
            // skip over, nothing consumed.
            CigarOp::HardClip | CigarOp::Padding => {}
        }
    }

    DecodedAlignment {
        bases,
        ref_start,
        ref_consumed,
        query_consumed,
    }
}
