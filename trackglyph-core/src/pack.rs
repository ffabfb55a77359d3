//! Greedy interval packing of features into display rows.
//!
//! Overlap is tested on *visual* intervals: the raw genomic span widened by
//! the rendered extension-arm decoration at the current zoom, so an arm
//! label never collides with a neighboring feature's box. Row indices are
//! zero-based and chromosome-local; layout is recomputed every render pass
//! because visual width depends on bases-per-pixel.

use crate::coords::CoordinateMapper;
use crate::types::{Feature, FeatureId, Position};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Approximate pixel width of one label character.
pub const ARM_CHAR_PX: f64 = 7.0;
/// Pixel length of the dashed arm stub beyond the label.
pub const ARM_STUB_PX: f64 = 12.0;

/// Rendered pixel length of an extension arm with its numeric gap label.
pub fn arm_label_px(gap: Position) -> f64 {
    let digits = gap.to_string().len() as f64;
    digits * ARM_CHAR_PX + ARM_STUB_PX
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackParams {
    /// Maximum number of rows per chromosome group. Features beyond the cap
    /// are left unassigned, silently excluded from layout.
    pub max_rows: usize,
    /// Group same-named features and pack each group with fresh row
    /// bookkeeping, so identically-named features prefer low, consistent
    /// rows. Groups are not jointly optimized against each other.
    pub cluster_by_name: bool,
}

impl Default for PackParams {
    fn default() -> Self {
        Self {
            max_rows: 100,
            cluster_by_name: false,
        }
    }
}

/// Per-pass row assignment, keyed by feature identity. Absent entries mean
/// the feature was filtered out or overflowed the row cap; it simply is not
/// drawn. Stale once the viewport changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowLayout {
    rows: HashMap<FeatureId, usize>,
}

impl RowLayout {
    pub fn get(&self, id: FeatureId) -> Option<usize> {
        self.rows.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows in use (maximum assigned row + 1).
    pub fn row_count(&self) -> usize {
        self.rows.values().map(|r| r + 1).max().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureId, usize)> + '_ {
        self.rows.iter().map(|(id, row)| (*id, *row))
    }

    fn assign(&mut self, id: FeatureId, row: usize) {
        self.rows.insert(id, row);
    }
}

/// Assigns display rows via greedy first-fit over start-sorted features.
pub struct RowPacker<'a> {
    mapper: &'a CoordinateMapper,
    params: PackParams,
}

impl<'a> RowPacker<'a> {
    pub fn new(mapper: &'a CoordinateMapper, params: PackParams) -> Self {
        Self { mapper, params }
    }

    pub fn pack(&self, features: &[Feature]) -> RowLayout {
        self.pack_filtered(features, |_| true)
    }

    /// Pack with a predicate; excluded features keep no row but stay in the
    /// caller's collection untouched.
    pub fn pack_filtered<F>(&self, features: &[Feature], filter: F) -> RowLayout
    where
        F: Fn(&Feature) -> bool,
    {
        let mut layout = RowLayout::default();

        // Chromosome partition first: row indices are chromosome-local.
        let mut by_chrom: BTreeMap<&str, Vec<&Feature>> = BTreeMap::new();
        for feature in features {
            if !filter(feature) {
                continue;
            }
            by_chrom.entry(&feature.chrom).or_default().push(feature);
        }

        for (_, group) in by_chrom {
            if self.params.cluster_by_name {
                let mut by_name: BTreeMap<Option<&str>, Vec<&Feature>> = BTreeMap::new();
                for feature in group {
                    by_name.entry(feature.name.as_deref()).or_default().push(feature);
                }
                // Each name group restarts its own row bookkeeping. Groups
                // are packed independently, not jointly optimized.
                for (_, cluster) in by_name {
                    self.greedy(cluster, &mut layout);
                }
            } else {
                self.greedy(group, &mut layout);
            }
        }

        layout
    }

    /// First-fit over rows in index order: place each feature in the first
    /// row whose last occupied end is at or before its visual start.
    fn greedy(&self, mut group: Vec<&Feature>, layout: &mut RowLayout) {
        let mut spans: Vec<(&Feature, f64, f64)> = group
            .drain(..)
            .map(|f| {
                let (start, end) = self.visual_span(f);
                (f, start, end)
            })
            .collect();
        spans.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal))
                .then(a.0.id.cmp(&b.0.id))
        });

        let mut row_ends: Vec<f64> = Vec::new();
        let mut overflowed = 0usize;
        for (feature, start, end) in spans {
            if let Some(row) = row_ends.iter().position(|e| *e <= start) {
                row_ends[row] = end;
                layout.assign(feature.id, row);
            } else if row_ends.len() < self.params.max_rows {
                layout.assign(feature.id, row_ends.len());
                row_ends.push(end);
            } else {
                overflowed += 1;
            }
        }
        if overflowed > 0 {
            log::debug!("{} features exceeded the {}-row cap and were excluded", overflowed, self.params.max_rows);
        }
    }

    /// Genomic span used for overlap testing: the drawn span widened by the
    /// rendered arm length on each side an arm would appear.
    fn visual_span(&self, feature: &Feature) -> (f64, f64) {
        let span = feature.drawn_span();
        let (left_gap, right_gap) = arm_gaps(feature);
        let bpp = self.mapper.bases_per_pixel();

        let left_bp = if left_gap > 0 { arm_label_px(left_gap) * bpp } else { 0.0 };
        let right_bp = if right_gap > 0 { arm_label_px(right_gap) * bpp } else { 0.0 };

        (span.start as f64 - left_bp, span.end as f64 + right_bp)
    }
}

/// Unaligned counterpart distance at each drawn edge of a chain feature:
/// how far the alignment falls short of the counterpart sequence's edges.
/// Zero when there are no components or the counterpart length is unknown.
pub fn arm_gaps(feature: &Feature) -> (Position, Position) {
    let left = feature.components.iter().min_by_key(|c| c.range.start);
    let right = feature.components.iter().max_by_key(|c| c.range.end);
    let (left, right) = match (left, right) {
        (Some(l), Some(r)) => (l, r),
        _ => return (0, 0),
    };

    let reverse = feature.strand == Some(crate::types::Strand::Reverse);
    let gap_before = |c: &crate::types::Component| c.other.start;
    let gap_after = |c: &crate::types::Component| {
        c.other_length
            .map(|len| len.saturating_sub(c.other.end))
            .unwrap_or(0)
    };

    if reverse {
        (gap_after(left), gap_before(right))
    } else {
        (gap_before(left), gap_after(right))
    }
}
