//! Reference-triplet translation for spliced features.
//!
//! Walks the coding exons of a feature in transcription order, respecting
//! strand and reading-frame phase, and produces per-codon glyph data in two
//! modes: table translation of a known-genome transcript, and comparison
//! against externally supplied amino-acid letters for aligned proteins.
//!
//! An exon's phase P means its first P bases complete a codon begun in the
//! previous translated exon; codon grouping within the exon starts at
//! `start + P` (forward) or `end - P` (reverse). Boundary codons are
//! assembled from the trailing fragment of one exon and the leading
//! fragment of the next eligible exon; pure-UTR exons are skipped in that
//! search. Any fragment with unavailable bases leaves the codon unrendered,
//! never inferred.

use crate::sequence::ReferenceSequence;
use crate::types::{Feature, GenomicRange, Position, Strand};
use bio::alphabets::dna;
use serde::{Deserialize, Serialize};

/// Distinguished stop marker in the translation table.
pub const STOP_AA: u8 = b'*';

/// Standard genetic code lookup. `None` for triplets containing anything
/// other than A/C/G/T (case-insensitive), including the wrong length.
pub fn translate_codon(codon: &[u8]) -> Option<u8> {
    if codon.len() != 3 {
        return None;
    }
    let c = [
        codon[0].to_ascii_uppercase(),
        codon[1].to_ascii_uppercase(),
        codon[2].to_ascii_uppercase(),
    ];
    let aa = match &c {
        b"TTT" | b"TTC" => b'F',
        b"TTA" | b"TTG" | b"CTT" | b"CTC" | b"CTA" | b"CTG" => b'L',
        b"ATT" | b"ATC" | b"ATA" => b'I',
        b"ATG" => b'M',
        b"GTT" | b"GTC" | b"GTA" | b"GTG" => b'V',
        b"TCT" | b"TCC" | b"TCA" | b"TCG" | b"AGT" | b"AGC" => b'S',
        b"CCT" | b"CCC" | b"CCA" | b"CCG" => b'P',
        b"ACT" | b"ACC" | b"ACA" | b"ACG" => b'T',
        b"GCT" | b"GCC" | b"GCA" | b"GCG" => b'A',
        b"TAT" | b"TAC" => b'Y',
        b"TAA" | b"TAG" | b"TGA" => STOP_AA,
        b"CAT" | b"CAC" => b'H',
        b"CAA" | b"CAG" => b'Q',
        b"AAT" | b"AAC" => b'N',
        b"AAA" | b"AAG" => b'K',
        b"GAT" | b"GAC" => b'D',
        b"GAA" | b"GAG" => b'E',
        b"TGT" | b"TGC" => b'C',
        b"TGG" => b'W',
        b"CGT" | b"CGC" | b"CGA" | b"CGG" | b"AGA" | b"AGG" => b'R',
        b"GGT" | b"GGC" | b"GGA" | b"GGG" => b'G',
        _ => return None,
    };
    Some(aa)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodonStyle {
    Plain,
    /// First codon of the feature, aligned exactly with global phase 0.
    Start,
    /// Stop-codon hit.
    Stop,
}

/// One drawn codon fragment. A codon lying inside a single exon emits one
/// glyph; a codon straddling an exon boundary emits one glyph per fragment,
/// each flagged `partial`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodonGlyph {
    pub range: GenomicRange,
    pub aa: Option<u8>,
    pub style: CodonStyle,
    pub mismatch: bool,
    /// Fragment covers fewer than 3 bases (boundary piece or trailing
    /// partial codon).
    pub partial: bool,
    /// Background alternation class (0/1), advancing per codon across the
    /// whole feature, not reset per exon.
    pub shade: u8,
}

/// One codon position produced by the exon walk, before mode-specific
/// rendering. Fragments are in transcription order.
#[derive(Debug, Clone)]
struct CodonSite {
    fragments: Vec<GenomicRange>,
    /// Transcription-oriented bases (reverse-complemented on the minus
    /// strand); `None` when any fragment is not resident.
    bases: Option<Vec<u8>>,
    /// Covers a full 3 bases of genomic span.
    complete: bool,
}

/// Per-codon amino-acid derivation for spliced features. Stateless, like a
/// parser: both modes run one synchronous walk over the coding exons.
pub struct CodonTranslator;

impl CodonTranslator {
    /// Mode 1: known-genome transcript. Every codon's letter comes from the
    /// translation table; unavailable or ambiguous triplets render nothing.
    pub fn translate_transcript(feature: &Feature, seq: &dyn ReferenceSequence) -> Vec<CodonGlyph> {
        let (sites, first_phase_zero) = walk_codons(feature, seq);
        let mut glyphs = Vec::new();
        for (i, site) in sites.iter().enumerate() {
            let shade = (i % 2) as u8;
            if !site.complete {
                // Incomplete trailing codon has no table entry; the shade
                // counter has already advanced past it.
                continue;
            }
            let aa = match site.bases.as_deref().and_then(translate_codon) {
                Some(aa) => aa,
                None => continue, // unavailable or ambiguous: draw nothing
            };
            let style = if i == 0 && first_phase_zero {
                CodonStyle::Start
            } else if aa == STOP_AA {
                CodonStyle::Stop
            } else {
                CodonStyle::Plain
            };
            for fragment in &site.fragments {
                glyphs.push(CodonGlyph {
                    range: *fragment,
                    aa: Some(aa),
                    style,
                    mismatch: false,
                    partial: fragment.len() < 3,
                    shade,
                });
            }
        }
        glyphs
    }

    /// Mode 2: aligned external protein. `supplied` holds one letter per
    /// codon in transcription order; the reference triplet is translated
    /// only to flag disagreement. Trailing partial codons are still
    /// rendered from whatever bases exist, marked `partial`, so the next
    /// exon's contribution to the same amino acid is visibly duplicated.
    pub fn compare_protein(
        feature: &Feature,
        supplied: &[u8],
        seq: &dyn ReferenceSequence,
    ) -> Vec<CodonGlyph> {
        let (sites, _) = walk_codons(feature, seq);
        let mut glyphs = Vec::new();
        for (i, site) in sites.iter().enumerate() {
            let shade = (i % 2) as u8;
            let letter = match supplied.get(i) {
                Some(l) => *l,
                None => break, // supplied protein exhausted
            };
            let translated = if site.complete {
                site.bases.as_deref().and_then(translate_codon)
            } else {
                None
            };
            // Unavailable sequence never produces a mismatch.
            let mismatch = matches!(translated, Some(t) if !t.eq_ignore_ascii_case(&letter));
            for fragment in &site.fragments {
                glyphs.push(CodonGlyph {
                    range: *fragment,
                    aa: Some(letter),
                    style: CodonStyle::Plain,
                    mismatch,
                    partial: fragment.len() < 3 || !site.complete,
                    shade,
                });
            }
        }
        glyphs
    }
}

/// Transcription-ordered coding sub-ranges with their phases.
fn coding_exons(feature: &Feature) -> Vec<(GenomicRange, u64)> {
    let mut exons: Vec<(GenomicRange, u64)> = feature
        .exons
        .iter()
        .filter_map(|e| {
            let cr = e.coding_range()?;
            Some((cr, e.phase.unwrap_or(0) as u64))
        })
        .collect();
    match feature.strand {
        Some(Strand::Reverse) => exons.sort_by(|a, b| b.0.end.cmp(&a.0.end)),
        _ => exons.sort_by(|a, b| a.0.start.cmp(&b.0.start)),
    }
    exons
}

/// Fetch the transcription-oriented bases of a site's fragments, or `None`
/// when any fragment is not resident.
fn fetch_site_bases(
    fragments: &[GenomicRange],
    strand: Option<Strand>,
    chrom: &str,
    seq: &dyn ReferenceSequence,
) -> Option<Vec<u8>> {
    let mut bases = Vec::with_capacity(3);
    for fragment in fragments {
        let raw = seq.fetch(chrom, *fragment)?;
        match strand {
            Some(Strand::Reverse) => bases.extend(dna::revcomp(&raw)),
            _ => bases.extend(raw),
        }
    }
    Some(bases)
}

/// Walk the coding exons of a feature, yielding one site per codon in
/// transcription order. Returns the sites and whether the feature's first
/// codon aligns exactly with global phase 0.
fn walk_codons(feature: &Feature, seq: &dyn ReferenceSequence) -> (Vec<CodonSite>, bool) {
    let exons = coding_exons(feature);
    let reverse = feature.strand == Some(Strand::Reverse);
    let first_phase_zero = exons.first().map(|(_, p)| *p == 0).unwrap_or(false);
    let mut sites = Vec::new();

    for (i, (cr, phase)) in exons.iter().enumerate() {
        let phase = (*phase).min(cr.len());
        // The first `phase` bases complete the previous exon's trailing
        // codon and were consumed when that codon's site was built.
        if reverse {
            let mut pos = cr.end - phase;
            while pos >= cr.start + 3 {
                push_site(&mut sites, vec![GenomicRange::new(pos - 3, pos)], feature, seq, true);
                pos -= 3;
            }
            let trailing = pos - cr.start;
            if trailing > 0 {
                let own = GenomicRange::new(cr.start, pos);
                let next = next_fragment(&exons, i + 1, 3 - trailing, true);
                finish_boundary(&mut sites, own, next, trailing, feature, seq);
            }
        } else {
            let mut pos = cr.start + phase;
            while pos + 3 <= cr.end {
                push_site(&mut sites, vec![GenomicRange::new(pos, pos + 3)], feature, seq, true);
                pos += 3;
            }
            let trailing = cr.end - pos;
            if trailing > 0 {
                let own = GenomicRange::new(pos, cr.end);
                let next = next_fragment(&exons, i + 1, 3 - trailing, false);
                finish_boundary(&mut sites, own, next, trailing, feature, seq);
            }
        }
    }

    (sites, first_phase_zero)
}

/// Leading fragment of the next eligible exon, provided its declared phase
/// matches the `needed` completion length. A disagreeing phase means the
/// annotation is inconsistent; the boundary codon is dropped rather than
/// guessed at.
fn next_fragment(
    exons: &[(GenomicRange, u64)],
    next_index: usize,
    needed: u64,
    reverse: bool,
) -> Option<GenomicRange> {
    let (ncr, nphase) = exons.get(next_index)?;
    let nphase = (*nphase).min(ncr.len());
    if nphase != needed {
        log::debug!(
            "Exon phase {} does not complete a {}-base trailing codon, boundary dropped",
            nphase,
            3 - needed
        );
        return None;
    }
    Some(if reverse {
        GenomicRange::new(ncr.end - nphase, ncr.end)
    } else {
        GenomicRange::new(ncr.start, ncr.start + nphase)
    })
}

fn finish_boundary(
    sites: &mut Vec<CodonSite>,
    own: GenomicRange,
    next: Option<GenomicRange>,
    trailing: u64,
    feature: &Feature,
    seq: &dyn ReferenceSequence,
) {
    match next {
        Some(next) => {
            debug_assert_eq!(trailing + next.len(), 3);
            push_site(sites, vec![own, next], feature, seq, true);
        }
        // No eligible continuation: an incomplete codon at the end of the
        // translated region, rendered only where a mode allows partials.
        None => push_site(sites, vec![own], feature, seq, false),
    }
}

fn push_site(
    sites: &mut Vec<CodonSite>,
    fragments: Vec<GenomicRange>,
    feature: &Feature,
    seq: &dyn ReferenceSequence,
    complete: bool,
) {
    let bases = fetch_site_bases(&fragments, feature.strand, &feature.chrom, seq);
    sites.push(CodonSite {
        fragments,
        bases,
        complete,
    });
}
