//! Full-pass integration: pack, decode, and compose glyphs for each track
//! variant over shared fixtures.

use trackglyph_core::types::{Component, Exon};
use trackglyph_core::{Feature, GenomicRange, InMemorySequence, Strand, Viewport};
use trackglyph_render::{
    DrawCmd, FeatureSource, GlyphClass, GlyphRenderer, RenderStyle, TrackConfig, TrackKind,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn count_class(cmds: &[DrawCmd], class: GlyphClass) -> usize {
    cmds.iter().filter(|c| c.class() == class).count()
}

#[test]
fn generic_track_draws_spliced_gene_with_codons() {
    init_logging();
    let mut seq = InMemorySequence::new();
    // ATG GAA ACC CGG with the fourth codon split across the splice.
    seq.add_segment("chr7", 100, b"ATGGAAACCCGGG".to_vec());

    let mut features = vec![Feature::new(1, "chr7", 100, 113)
        .with_strand(Strand::Forward)
        .with_exons(vec![
            Exon::new(100, 105).with_phase(0),
            Exon::new(105, 113).with_phase(1),
        ])];

    let config = TrackConfig {
        kind: TrackKind::Generic,
        ..Default::default()
    };
    // 1 bp per pixel so codon letters are never legible at 7 px chars,
    // but codon rectangles still alternate.
    let viewport = Viewport::new(0, 1000, 1000, 200).unwrap();
    let out = GlyphRenderer::new(config)
        .render_pass(&mut features, viewport, &seq)
        .unwrap();

    assert_eq!(out.layout.get(1), Some(0));
    assert_eq!(count_class(&out.commands, GlyphClass::CodonStart), 1);
    assert!(count_class(&out.commands, GlyphClass::CodonEven) > 0);
    assert!(count_class(&out.commands, GlyphClass::CodonOdd) > 0);
    // Two exon boxes plus the intronless spine line.
    let rects = out
        .commands
        .iter()
        .filter(|c| matches!(c, DrawCmd::Rect { class: GlyphClass::Block, .. }))
        .count();
    assert_eq!(rects, 2);
}

#[test]
fn chain_track_decodes_components_and_extends_arms() {
    init_logging();
    let seq = InMemorySequence::new();

    // Two components on the plus strand with a counterpart gap between
    // them and unaligned counterpart tails on both sides.
    let components = vec![
        Component {
            range: GenomicRange::new(1000, 1005),
            other: GenomicRange::new(50, 55),
            other_length: Some(200),
            query: "AACCG".to_string(),
            cigar: "5M".to_string(),
        },
        Component {
            range: GenomicRange::new(1050, 1058),
            other: GenomicRange::new(60, 67),
            other_length: Some(200),
            query: "GGTTACG".to_string(),
            cigar: "3M1D4M".to_string(),
        },
    ];
    let mut features = vec![Feature::new(7, "chr1", 1000, 1058)
        .with_strand(Strand::Forward)
        .with_components(components)];

    let config = TrackConfig {
        kind: TrackKind::Chain,
        ..Default::default()
    };
    let viewport = Viewport::new(900, 1900, 1000, 200).unwrap();
    let out = GlyphRenderer::new(config)
        .render_pass(&mut features, viewport, &seq)
        .unwrap();

    // The second component splits around its deletion: 1 + 2 block rects.
    let block_rects = out
        .commands
        .iter()
        .filter(|c| matches!(c, DrawCmd::Rect { class: GlyphClass::Block, .. }))
        .count();
    assert_eq!(block_rects, 3);
    assert_eq!(count_class(&out.commands, GlyphClass::Deletion), 1);
    // Counterpart jump 55 -> 60 makes the inter-component connector dashed.
    let dashed_connectors = out
        .commands
        .iter()
        .filter(|c| {
            matches!(
                c,
                DrawCmd::Line {
                    dashed: true,
                    class: GlyphClass::Connector,
                    ..
                }
            )
        })
        .count();
    assert_eq!(dashed_connectors, 1);
    // Left arm for counterpart 0..50, right arm for 67..200, each with a
    // gap-length label.
    assert_eq!(count_class(&out.commands, GlyphClass::Arm), 4);
    let labels: Vec<&str> = out
        .commands
        .iter()
        .filter_map(|c| match c {
            DrawCmd::Text { text, class: GlyphClass::Arm, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert!(labels.contains(&"50"));
    assert!(labels.contains(&"133"));
    // No reference sequence resident, so no mismatch marks.
    assert_eq!(count_class(&out.commands, GlyphClass::Mismatch), 0);
}

#[test]
fn chain_track_marks_mismatches_when_sequence_resident() {
    init_logging();
    let mut seq = InMemorySequence::new();
    seq.add_segment("chr1", 1000, b"AACCG".to_vec());

    let mut features = vec![Feature::new(1, "chr1", 1000, 1005)
        .with_strand(Strand::Forward)
        .with_components(vec![Component {
            range: GenomicRange::new(1000, 1005),
            other: GenomicRange::new(0, 5),
            other_length: Some(5),
            query: "AACTG".to_string(), // C->T at 1003
            cigar: "5M".to_string(),
        }])];

    // Zoomed to 10 px per base so the mismatch renders as a letter.
    let viewport = Viewport::new(990, 1090, 1000, 200).unwrap();
    let out = GlyphRenderer::new(TrackConfig {
        kind: TrackKind::Chain,
        ..Default::default()
    })
    .render_pass(&mut features, viewport, &seq)
    .unwrap();

    let mismatch_letters: Vec<&str> = out
        .commands
        .iter()
        .filter_map(|c| match c {
            DrawCmd::Text { text, class: GlyphClass::Mismatch, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(mismatch_letters, vec!["T"]);
}

#[test]
fn selfpair_track_bridges_mate_ranges() {
    init_logging();
    let seq = InMemorySequence::new();
    let mut features = vec![Feature::new(3, "chr2", 500, 600)
        .with_strand(Strand::Forward)
        .with_mate(GenomicRange::new(900, 1000))];

    let viewport = Viewport::new(0, 2000, 1000, 200).unwrap();
    let out = GlyphRenderer::new(TrackConfig {
        kind: TrackKind::SelfPair,
        ..Default::default()
    })
    .render_pass(&mut features, viewport, &seq)
    .unwrap();

    assert!(count_class(&out.commands, GlyphClass::Block) >= 2);
    let bridge = out.commands.iter().any(|c| {
        matches!(
            c,
            DrawCmd::Line {
                dashed: true,
                class: GlyphClass::Connector,
                ..
            }
        )
    });
    assert!(bridge);
    // Packing reserved the full span including the mate: a second feature
    // inside the bridge gap must land on another row.
    let mut both = vec![
        Feature::new(3, "chr2", 500, 600).with_mate(GenomicRange::new(900, 1000)),
        Feature::new(4, "chr2", 700, 800),
    ];
    let out = GlyphRenderer::new(TrackConfig {
        kind: TrackKind::SelfPair,
        ..Default::default()
    })
    .render_pass(&mut both, viewport, &seq)
    .unwrap();
    assert_eq!(out.layout.get(3), Some(0));
    assert_eq!(out.layout.get(4), Some(1));
    assert_eq!(out.height_px, 2.0 * RenderStyle::default().row_height_px);
}

/// Resident feature store standing in for the host's loader.
struct VecSource(Vec<Feature>);

impl FeatureSource for VecSource {
    fn fetch(&self, chrom: &str, range: GenomicRange) -> Vec<Feature> {
        self.0
            .iter()
            .filter(|f| f.chrom == chrom && f.drawn_span().overlaps(&range))
            .cloned()
            .collect()
    }
}

#[test]
fn source_fed_pass_draws_only_visible_features() {
    init_logging();
    let seq = InMemorySequence::new();
    let source = VecSource(vec![
        Feature::new(1, "chr1", 100, 300),
        Feature::new(2, "chr1", 5000, 5200),
        Feature::new(3, "chr2", 100, 300),
    ]);

    let viewport = Viewport::new(0, 1000, 1000, 200).unwrap();
    let mut features = source.fetch("chr1", viewport.range());
    assert_eq!(features.len(), 1);

    let out = GlyphRenderer::new(TrackConfig::default())
        .render_pass(&mut features, viewport, &seq)
        .unwrap();
    assert_eq!(out.layout.get(1), Some(0));
    assert_eq!(out.layout.get(2), None);
}

#[test]
fn row_cap_overflow_features_are_not_drawn() {
    init_logging();
    let seq = InMemorySequence::new();
    // Three mutually overlapping features under a cap of 2.
    let mut features = vec![
        Feature::new(0, "chr1", 100, 300),
        Feature::new(1, "chr1", 150, 350),
        Feature::new(2, "chr1", 200, 400),
    ];

    let viewport = Viewport::new(0, 1000, 1000, 200).unwrap();
    let out = GlyphRenderer::new(TrackConfig {
        kind: TrackKind::Generic,
        max_rows: 2,
        ..Default::default()
    })
    .render_pass(&mut features, viewport, &seq)
    .unwrap();

    assert_eq!(out.layout.len(), 2);
    assert_eq!(out.layout.get(2), None);
    assert_eq!(count_class(&out.commands, GlyphClass::Block), 2);
}
