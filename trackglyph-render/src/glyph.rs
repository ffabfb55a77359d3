//! Glyph composition: turns laid-out features into drawing commands.

use crate::draw::{DrawCmd, GlyphClass};
use crate::style::RenderStyle;
use crate::track::{RenderPass, TrackConfig, TrackFactory};
use anyhow::Result;
use log::debug;
use trackglyph_core::cigar::decode;
use trackglyph_core::pack::{arm_gaps, arm_label_px};
use trackglyph_core::types::Exon;
use trackglyph_core::{
    CodonGlyph, CodonStyle, CoordinateMapper, Feature, GenomicRange, PackParams,
    ReferenceSequence, RowLayout, RowPacker, Strand, Viewport,
};

/// Filled block for a range, split around deletion runs. With no runs the
/// box gets the minimum-width clamp; split segments are drawn at true scale
/// so the runs between them stay open.
pub(crate) fn block_cmds(
    range: GenomicRange,
    deletions: &[GenomicRange],
    row: usize,
    mapper: &CoordinateMapper,
    style: &RenderStyle,
) -> Vec<DrawCmd> {
    let y = style.block_top(row);
    let h = style.block_height_px;
    let mut cmds = Vec::new();

    if deletions.is_empty() {
        let span = mapper.box_px(range);
        cmds.push(DrawCmd::Rect {
            x: span.left,
            y,
            w: span.width,
            h,
            class: GlyphClass::Block,
        });
        return cmds;
    }

    let mut cursor = range.start;
    let mut segment = |start, end, cmds: &mut Vec<DrawCmd>| {
        if start >= end {
            return;
        }
        let x = mapper.to_pixel(start);
        let w = (end - start) as f64 / mapper.bases_per_pixel();
        cmds.push(DrawCmd::Rect {
            x,
            y,
            w,
            h,
            class: GlyphClass::Block,
        });
    };
    for run in deletions {
        if let Some(cut) = range.intersect(run) {
            segment(cursor, cut.start, &mut cmds);
            cursor = cut.end;
            // Line across the deleted span at row center.
            let yc = style.row_center(row);
            cmds.push(DrawCmd::Line {
                x1: mapper.to_pixel(cut.start),
                y1: yc,
                x2: mapper.to_pixel(cut.end),
                y2: yc,
                dashed: false,
                class: GlyphClass::Deletion,
            });
        }
    }
    segment(cursor, range.end, &mut cmds);
    cmds
}

/// Thin center line spanning a spliced feature (the intron backbone).
pub(crate) fn spine_cmds(
    range: GenomicRange,
    row: usize,
    mapper: &CoordinateMapper,
    style: &RenderStyle,
) -> Vec<DrawCmd> {
    let yc = style.row_center(row);
    vec![DrawCmd::Line {
        x1: mapper.to_pixel(range.start),
        y1: yc,
        x2: mapper.to_pixel(range.end),
        y2: yc,
        dashed: false,
        class: GlyphClass::Connector,
    }]
}

/// Exon box. Untranslated exons draw at half height.
pub(crate) fn exon_cmds(
    exon: &Exon,
    row: usize,
    mapper: &CoordinateMapper,
    style: &RenderStyle,
) -> Vec<DrawCmd> {
    let span = mapper.box_px(exon.range);
    let h = if exon.utr {
        style.block_height_px / 2.0
    } else {
        style.block_height_px
    };
    let y = style.row_center(row) - h / 2.0;
    vec![DrawCmd::Rect {
        x: span.left,
        y,
        w: span.width,
        h,
        class: GlyphClass::Block,
    }]
}

/// Direction chevrons along a span, spaced by `chevron_spacing_px` and
/// culled to the surface. Unstranded features get none.
pub(crate) fn chevron_cmds(
    range: GenomicRange,
    strand: Option<Strand>,
    row: usize,
    mapper: &CoordinateMapper,
    style: &RenderStyle,
) -> Vec<DrawCmd> {
    let strand = match strand {
        Some(s) => s,
        None => return Vec::new(),
    };
    let left = mapper.to_pixel(range.start);
    let right = mapper.to_pixel(range.end);
    let yc = style.row_center(row);
    let mut cmds = Vec::new();
    let mut x = left + style.chevron_spacing_px;
    while x < right - style.chevron_spacing_px / 2.0 {
        if mapper.is_visible_px(x) {
            cmds.push(DrawCmd::Chevron {
                x,
                y: yc,
                forward: strand == Strand::Forward,
                class: GlyphClass::Block,
            });
        }
        x += style.chevron_spacing_px;
    }
    cmds
}

/// Point markers at between-base insertion positions.
pub(crate) fn insertion_cmds(
    points: &[trackglyph_core::RefOffset],
    row: usize,
    mapper: &CoordinateMapper,
    style: &RenderStyle,
) -> Vec<DrawCmd> {
    let yc = style.row_center(row);
    points
        .iter()
        .map(|p| mapper.to_pixel_f(p.placement_bp()))
        .filter(|&x| mapper.is_visible_px(x))
        .map(|x| DrawCmd::Point {
            x,
            y: yc,
            class: GlyphClass::Insertion,
        })
        .collect()
}

/// Mismatching bases: the substituted letter when a base is at least one
/// character wide on screen, otherwise a one-base sliver.
pub(crate) fn mismatch_cmds(
    mismatches: &[trackglyph_core::Mismatch],
    row: usize,
    mapper: &CoordinateMapper,
    style: &RenderStyle,
) -> Vec<DrawCmd> {
    let px_per_base = 1.0 / mapper.bases_per_pixel();
    let mut cmds = Vec::new();
    for mm in mismatches {
        let x = mapper.to_pixel(mm.pos);
        if !mapper.is_visible_px(x) {
            continue;
        }
        if px_per_base >= style.char_width_px {
            cmds.push(DrawCmd::Text {
                x: x + px_per_base / 2.0,
                y: style.row_center(row),
                text: (mm.base as char).to_string(),
                class: GlyphClass::Mismatch,
            });
        } else {
            cmds.push(DrawCmd::Rect {
                x,
                y: style.block_top(row),
                w: px_per_base.max(1.0),
                h: style.block_height_px,
                class: GlyphClass::Mismatch,
            });
        }
    }
    cmds
}

/// Codon rectangles with alternating shades and amino-acid letters where
/// legible. Boundary fragments repeat the letter on each side of the splice.
pub(crate) fn codon_cmds(
    glyphs: &[CodonGlyph],
    row: usize,
    mapper: &CoordinateMapper,
    style: &RenderStyle,
) -> Vec<DrawCmd> {
    let mut cmds = Vec::new();
    for g in glyphs {
        let span = mapper.box_px(g.range);
        if span.right() < 0.0 || span.left > mapper.viewport().width_px as f64 {
            continue;
        }
        let class = match g.style {
            CodonStyle::Start => GlyphClass::CodonStart,
            CodonStyle::Stop => GlyphClass::CodonStop,
            CodonStyle::Plain if g.shade == 0 => GlyphClass::CodonEven,
            CodonStyle::Plain => GlyphClass::CodonOdd,
        };
        cmds.push(DrawCmd::Rect {
            x: span.left,
            y: style.block_top(row),
            w: span.width,
            h: style.block_height_px,
            class,
        });
        if g.partial {
            // Continuation tick along the top edge of a split fragment.
            cmds.push(DrawCmd::Line {
                x1: span.left,
                y1: style.block_top(row),
                x2: span.right(),
                y2: style.block_top(row),
                dashed: true,
                class,
            });
        }
        if let Some(aa) = g.aa {
            if span.width >= style.char_width_px {
                cmds.push(DrawCmd::Text {
                    x: span.left + span.width / 2.0,
                    y: style.row_center(row),
                    text: (aa as char).to_string(),
                    class: if g.mismatch {
                        GlyphClass::Mismatch
                    } else {
                        GlyphClass::Label
                    },
                });
            }
        }
    }
    cmds
}

/// Horizontal connector across a genomic gap at row center.
pub(crate) fn connector_cmd(
    gap: GenomicRange,
    dashed: bool,
    row: usize,
    mapper: &CoordinateMapper,
    style: &RenderStyle,
) -> Vec<DrawCmd> {
    let yc = style.row_center(row);
    vec![DrawCmd::Line {
        x1: mapper.to_pixel(gap.start),
        y1: yc,
        x2: mapper.to_pixel(gap.end),
        y2: yc,
        dashed,
        class: GlyphClass::Connector,
    }]
}

/// Full glyph set for a chained feature: per-component decoded blocks,
/// insertion and mismatch marks, and inter-component connectors. Connectors
/// are dashed when the counterpart coordinates are not contiguous across
/// the join.
pub(crate) fn component_cmds(
    feature: &Feature,
    row: usize,
    pass: &RenderPass<'_>,
    style: &RenderStyle,
) -> Vec<DrawCmd> {
    let mut cmds = Vec::new();
    let mut components: Vec<_> = feature.components.iter().collect();
    components.sort_by_key(|c| c.range.start);

    for (i, comp) in components.iter().enumerate() {
        let decoded = decode(comp.query.as_bytes(), &comp.cigar, comp.range.start);
        if !decoded.conserves(comp.query.len(), comp.range.len()) {
            log::warn!(
                "Component at {}..{} does not conserve alignment lengths (query {} vs {}, reference {} vs {})",
                comp.range.start,
                comp.range.end,
                decoded.query_consumed,
                comp.query.len(),
                decoded.ref_consumed,
                comp.range.len()
            );
        }
        cmds.extend(block_cmds(
            decoded.ref_range(),
            &decoded.deletion_runs(),
            row,
            pass.mapper,
            style,
        ));
        cmds.extend(insertion_cmds(
            &decoded.insertion_points(),
            row,
            pass.mapper,
            style,
        ));
        if style.show_mismatches {
            cmds.extend(mismatch_cmds(
                &decoded.mismatches(pass.sequence, &feature.chrom),
                row,
                pass.mapper,
                style,
            ));
        }

        if let Some(next) = components.get(i + 1) {
            let gap = GenomicRange::new(comp.range.end, next.range.start);
            if !gap.is_empty() {
                let contiguous = comp.other.end == next.other.start;
                cmds.extend(connector_cmd(gap, !contiguous, row, pass.mapper, style));
            }
        }
    }
    cmds.extend(chevron_cmds(
        feature.range,
        feature.strand,
        row,
        pass.mapper,
        style,
    ));
    cmds
}

/// Dashed extension arms with the counterpart gap length as a label,
/// emitted only when the arm reaches onto the visible surface.
pub(crate) fn arm_cmds(
    feature: &Feature,
    row: usize,
    mapper: &CoordinateMapper,
    style: &RenderStyle,
) -> Vec<DrawCmd> {
    let (left_gap, right_gap) = arm_gaps(feature);
    let span = mapper.box_px(feature.drawn_span());
    let yc = style.row_center(row);
    let mut cmds = Vec::new();

    if left_gap > 0 {
        let x2 = span.left;
        let x1 = x2 - arm_label_px(left_gap);
        if mapper.is_visible_px(x1) || mapper.is_visible_px(x2) {
            cmds.push(DrawCmd::Line {
                x1,
                y1: yc,
                x2,
                y2: yc,
                dashed: true,
                class: GlyphClass::Arm,
            });
            cmds.push(DrawCmd::Text {
                x: x1,
                y: yc,
                text: left_gap.to_string(),
                class: GlyphClass::Arm,
            });
        }
    }
    if right_gap > 0 {
        let x1 = span.right();
        let x2 = x1 + arm_label_px(right_gap);
        if mapper.is_visible_px(x1) || mapper.is_visible_px(x2) {
            cmds.push(DrawCmd::Line {
                x1,
                y1: yc,
                x2,
                y2: yc,
                dashed: true,
                class: GlyphClass::Arm,
            });
            cmds.push(DrawCmd::Text {
                x: x2,
                y: yc,
                text: right_gap.to_string(),
                class: GlyphClass::Arm,
            });
        }
    }
    cmds
}

/// Output of one full render pass.
#[derive(Debug)]
pub struct RenderOutput {
    pub layout: RowLayout,
    pub commands: Vec<DrawCmd>,
    pub height_px: f64,
}

/// One-stop pass driver: normalizes, packs, dispatches to the configured
/// track variant, and reports the resulting height.
pub struct GlyphRenderer {
    config: TrackConfig,
}

impl GlyphRenderer {
    pub fn new(config: TrackConfig) -> Self {
        Self { config }
    }

    pub fn render_pass(
        &self,
        features: &mut [Feature],
        viewport: Viewport,
        sequence: &dyn ReferenceSequence,
    ) -> Result<RenderOutput> {
        for f in features.iter_mut() {
            f.normalize();
        }
        let mapper = CoordinateMapper::new(viewport);
        let packer = RowPacker::new(
            &mapper,
            PackParams {
                max_rows: self.config.max_rows,
                cluster_by_name: self.config.cluster_by_name,
            },
        );
        let layout = packer.pack(features);
        debug!(
            "packed {} features into {} rows",
            layout.len(),
            layout.row_count()
        );

        let mut track = TrackFactory::create(self.config.kind);
        track.initialize(&self.config);
        let pass = RenderPass {
            features,
            mapper: &mapper,
            layout: &layout,
            sequence,
        };
        let commands = track.render(&pass)?;
        let height_px = track.compute_height(&layout, &self.config.style);
        Ok(RenderOutput {
            layout,
            commands,
            height_px,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackglyph_core::InMemorySequence;

    fn mapper(start: u64, end: u64, width: u32) -> CoordinateMapper {
        CoordinateMapper::new(Viewport::new(start, end, width, 200).unwrap())
    }

    #[test]
    fn test_block_split_leaves_deletions_open() {
        let m = mapper(0, 1000, 1000);
        let style = RenderStyle::default();
        let cmds = block_cmds(
            GenomicRange::new(100, 200),
            &[GenomicRange::new(140, 150)],
            0,
            &m,
            &style,
        );
        let rects: Vec<_> = cmds
            .iter()
            .filter(|c| matches!(c, DrawCmd::Rect { .. }))
            .collect();
        let lines: Vec<_> = cmds
            .iter()
            .filter(|c| matches!(c, DrawCmd::Line { .. }))
            .collect();
        assert_eq!(rects.len(), 2);
        assert_eq!(lines.len(), 1);
        if let DrawCmd::Rect { x, w, .. } = rects[0] {
            assert_eq!(*x, 100.0);
            assert_eq!(*w, 40.0);
        }
        if let DrawCmd::Rect { x, w, .. } = rects[1] {
            assert_eq!(*x, 150.0);
            assert_eq!(*w, 50.0);
        }
    }

    #[test]
    fn test_chevrons_follow_strand_and_spacing() {
        let m = mapper(0, 1000, 1000);
        let style = RenderStyle::default();
        let fwd = chevron_cmds(GenomicRange::new(100, 200), Some(Strand::Forward), 0, &m, &style);
        assert!(!fwd.is_empty());
        assert!(fwd
            .iter()
            .all(|c| matches!(c, DrawCmd::Chevron { forward: true, .. })));

        let none = chevron_cmds(GenomicRange::new(100, 200), None, 0, &m, &style);
        assert!(none.is_empty());
    }

    #[test]
    fn test_mismatch_letters_only_when_legible() {
        let style = RenderStyle::default();
        let mms = vec![trackglyph_core::Mismatch { pos: 50, base: b'T' }];

        // 10 px per base: letters
        let wide = mapper(0, 100, 1000);
        let cmds = mismatch_cmds(&mms, 0, &wide, &style);
        assert!(matches!(cmds[0], DrawCmd::Text { .. }));

        // 1 px per base: slivers
        let narrow = mapper(0, 1000, 1000);
        let cmds = mismatch_cmds(&mms, 0, &narrow, &style);
        assert!(matches!(cmds[0], DrawCmd::Rect { .. }));
    }

    #[test]
    fn test_render_pass_generic_end_to_end() {
        let mut seq = InMemorySequence::new();
        seq.add_segment("chr1", 100, b"ATGAAATAG".to_vec());
        let mut features = vec![Feature::new(1, "chr1", 100, 109)
            .with_strand(Strand::Forward)
            .with_exons(vec![Exon::new(100, 109).with_phase(0)])];

        let renderer = GlyphRenderer::new(TrackConfig::default());
        let viewport = Viewport::new(0, 1000, 1000, 200).unwrap();
        let out = renderer.render_pass(&mut features, viewport, &seq).unwrap();

        assert_eq!(out.layout.get(1), Some(0));
        assert_eq!(out.height_px, RenderStyle::default().row_height_px);
        assert!(!out.commands.is_empty());
        // Start and stop codons both present
        assert!(out
            .commands
            .iter()
            .any(|c| c.class() == GlyphClass::CodonStart));
        assert!(out
            .commands
            .iter()
            .any(|c| c.class() == GlyphClass::CodonStop));
    }
}
