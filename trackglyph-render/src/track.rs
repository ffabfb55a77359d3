//! Track variants behind a capability interface.
//!
//! Variant selection is tagged-variant dispatch through a factory, not
//! inheritance: each variant implements the same small trait and composes
//! the shared glyph emitters differently.

use crate::draw::DrawCmd;
use crate::glyph;
use crate::style::RenderStyle;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use trackglyph_core::{
    CodonTranslator, CoordinateMapper, Feature, GenomicRange, ReferenceSequence, RowLayout,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackKind {
    /// Chain-style alignments: components with operation-encoded blocks,
    /// connectors, and extension arms.
    Chain,
    /// Self-referential pairs: primary and mate sub-ranges on one sequence.
    SelfPair,
    /// Generic annotations: spliced features with optional codon glyphs.
    Generic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackConfig {
    pub kind: TrackKind,
    pub max_rows: usize,
    pub cluster_by_name: bool,
    pub style: RenderStyle,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            kind: TrackKind::Generic,
            max_rows: 100,
            cluster_by_name: false,
            style: RenderStyle::default(),
        }
    }
}

/// External feature supplier. Fetching and caching are the host's concern;
/// implementations must answer without new I/O mid-pass.
pub trait FeatureSource {
    fn fetch(&self, chrom: &str, range: GenomicRange) -> Vec<Feature>;
}

/// Everything one render pass reads. Borrowed immutably: the pass mutates
/// nothing shared and its output is simply discarded if superseded.
pub struct RenderPass<'a> {
    pub features: &'a [Feature],
    pub mapper: &'a CoordinateMapper,
    pub layout: &'a RowLayout,
    pub sequence: &'a dyn ReferenceSequence,
}

/// Capability interface shared by all track variants.
pub trait Track {
    fn initialize(&mut self, config: &TrackConfig);

    fn name(&self) -> &'static str;

    fn compute_height(&self, layout: &RowLayout, style: &RenderStyle) -> f64 {
        layout.row_count() as f64 * style.row_height_px
    }

    fn render(&self, pass: &RenderPass<'_>) -> Result<Vec<DrawCmd>>;
}

/// Factory for track variants.
pub struct TrackFactory;

impl TrackFactory {
    pub fn create(kind: TrackKind) -> Box<dyn Track> {
        match kind {
            TrackKind::Chain => Box::new(ChainTrack::default()),
            TrackKind::SelfPair => Box::new(SelfPairTrack::default()),
            TrackKind::Generic => Box::new(GenericTrack::default()),
        }
    }

    pub fn available_variants() -> Vec<&'static str> {
        vec!["chain", "selfpair", "generic"]
    }
}

#[derive(Debug, Default)]
pub struct GenericTrack {
    config: TrackConfig,
}

impl Track for GenericTrack {
    fn initialize(&mut self, config: &TrackConfig) {
        self.config = config.clone();
    }

    fn name(&self) -> &'static str {
        "generic"
    }

    fn render(&self, pass: &RenderPass<'_>) -> Result<Vec<DrawCmd>> {
        let style = &self.config.style;
        let mut cmds = Vec::new();
        for feature in pass.features {
            let row = match pass.layout.get(feature.id) {
                Some(row) => row,
                None => continue, // overflowed or filtered: not drawn
            };

            if feature.exons.is_empty() {
                cmds.extend(glyph::block_cmds(feature.range, &[], row, pass.mapper, style));
            } else {
                // Thin spine across the whole span, exon boxes on top.
                cmds.extend(glyph::spine_cmds(feature.range, row, pass.mapper, style));
                for exon in &feature.exons {
                    cmds.extend(glyph::exon_cmds(exon, row, pass.mapper, style));
                }
            }
            cmds.extend(glyph::chevron_cmds(
                feature.range,
                feature.strand,
                row,
                pass.mapper,
                style,
            ));

            if style.show_codons {
                let codons = match &feature.protein {
                    Some(protein) => {
                        CodonTranslator::compare_protein(feature, protein.as_bytes(), pass.sequence)
                    }
                    None => CodonTranslator::translate_transcript(feature, pass.sequence),
                };
                cmds.extend(glyph::codon_cmds(&codons, row, pass.mapper, style));
            }
        }
        Ok(cmds)
    }
}

#[derive(Debug, Default)]
pub struct SelfPairTrack {
    config: TrackConfig,
}

impl Track for SelfPairTrack {
    fn initialize(&mut self, config: &TrackConfig) {
        self.config = config.clone();
    }

    fn name(&self) -> &'static str {
        "selfpair"
    }

    fn render(&self, pass: &RenderPass<'_>) -> Result<Vec<DrawCmd>> {
        let style = &self.config.style;
        let mut cmds = Vec::new();
        for feature in pass.features {
            let row = match pass.layout.get(feature.id) {
                Some(row) => row,
                None => continue,
            };

            cmds.extend(glyph::block_cmds(feature.range, &[], row, pass.mapper, style));
            if let Some(mate) = feature.mate {
                cmds.extend(glyph::block_cmds(mate, &[], row, pass.mapper, style));
                // Dashed bridge between the inner edges of the pair.
                let gap = GenomicRange::new(
                    feature.range.end.min(mate.end),
                    feature.range.start.max(mate.start),
                );
                if !gap.is_empty() {
                    cmds.extend(glyph::connector_cmd(gap, true, row, pass.mapper, style));
                }
            }
            cmds.extend(glyph::chevron_cmds(
                feature.drawn_span(),
                feature.strand,
                row,
                pass.mapper,
                style,
            ));
        }
        Ok(cmds)
    }
}

#[derive(Debug, Default)]
pub struct ChainTrack {
    config: TrackConfig,
}

impl Track for ChainTrack {
    fn initialize(&mut self, config: &TrackConfig) {
        self.config = config.clone();
    }

    fn name(&self) -> &'static str {
        "chain"
    }

    fn render(&self, pass: &RenderPass<'_>) -> Result<Vec<DrawCmd>> {
        let style = &self.config.style;
        let mut cmds = Vec::new();
        for feature in pass.features {
            let row = match pass.layout.get(feature.id) {
                Some(row) => row,
                None => continue,
            };
            cmds.extend(glyph::component_cmds(feature, row, pass, style));
            cmds.extend(glyph::arm_cmds(feature, row, pass.mapper, style));
        }
        Ok(cmds)
    }
}
