//! Ranking of a query silhouette against a corpus.
//!
//! Every corpus entry is scored with mean SSIM against the query. Results are
//! ordered by descending score; equal scores keep corpus insertion order.

mod ssim;

pub use ssim::{ssim, SsimConfig};

use crate::canon::{CanonicalSilhouette, Canonicalizer};
use crate::corpus::{Corpus, CorpusEntry};
use crate::image::RasterImage;
use crate::trace::{trace_event, trace_span};
use crate::util::{SilMatchError, SilMatchResult};
use std::cmp::Ordering;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Ranking configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct RankConfig {
    /// Similarity metric parameters.
    pub ssim: SsimConfig,
    /// Score entries on the rayon pool (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            ssim: SsimConfig::default(),
            parallel: true,
        }
    }
}

/// One scored corpus entry.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedResult {
    /// Identifier of the corpus entry.
    pub id: String,
    /// Mean SSIM against the query, in `[-1, 1]`.
    pub score: f64,
}

#[derive(Clone, Copy, Debug)]
struct Scored {
    index: usize,
    score: f64,
}

fn scored_cmp_desc(a: &Scored, b: &Scored) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.index.cmp(&b.index))
}

/// Scores queries against a shared, read-only corpus.
#[derive(Clone, Debug, Default)]
pub struct SimilarityRanker {
    cfg: RankConfig,
}

impl SimilarityRanker {
    /// Creates a ranker with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the ranking configuration.
    pub fn with_config(mut self, cfg: RankConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &RankConfig {
        &self.cfg
    }

    /// Similarity of two canonical silhouettes.
    pub fn score(&self, a: &CanonicalSilhouette, b: &CanonicalSilhouette) -> SilMatchResult<f64> {
        ssim(a.bitmap(), b.bitmap(), &self.cfg.ssim)
    }

    /// Ranks every corpus entry against `query`.
    ///
    /// An empty corpus yields an empty ranking. A query whose size differs
    /// from the corpus bitmaps fails with
    /// [`SilMatchError::DimensionMismatch`]; it is never rescaled.
    pub fn rank(
        &self,
        query: &CanonicalSilhouette,
        corpus: &Corpus,
    ) -> SilMatchResult<Vec<RankedResult>> {
        let Some(expected) = corpus.dims() else {
            return Ok(Vec::new());
        };
        if query.dims() != expected {
            return Err(SilMatchError::DimensionMismatch {
                expected,
                got: query.dims(),
            });
        }
        self.cfg.ssim.validate()?;

        let _span = trace_span!("rank", entries = corpus.len()).entered();

        let score_entry = |(index, entry): (usize, &CorpusEntry)| {
            self.score(query, entry.silhouette())
                .map(|score| Scored { index, score })
        };

        #[cfg(feature = "rayon")]
        let scored: SilMatchResult<Vec<Scored>> = if self.cfg.parallel {
            corpus
                .entries()
                .par_iter()
                .enumerate()
                .map(score_entry)
                .collect()
        } else {
            corpus.entries().iter().enumerate().map(score_entry).collect()
        };
        #[cfg(not(feature = "rayon"))]
        let scored: SilMatchResult<Vec<Scored>> =
            corpus.entries().iter().enumerate().map(score_entry).collect();

        let mut scored = scored?;
        scored.sort_by(scored_cmp_desc);

        if let Some(best) = scored.first() {
            trace_event!("ranked", best_index = best.index, best_score = best.score);
        }

        let entries = corpus.entries();
        Ok(scored
            .into_iter()
            .map(|s| RankedResult {
                id: entries[s.index].id().to_string(),
                score: s.score,
            })
            .collect())
    }

    /// Canonicalizes `image` and ranks it against `corpus`.
    ///
    /// A degenerate query surfaces as [`SilMatchError::Degenerate`], which is
    /// distinct from a ranking where nothing scored well.
    pub fn rank_image(
        &self,
        image: &RasterImage,
        canonicalizer: &Canonicalizer,
        corpus: &Corpus,
    ) -> SilMatchResult<Vec<RankedResult>> {
        let query = canonicalizer.canonicalize(image)?;
        self.rank(&query, corpus)
    }
}
