//! Ordered, uniquely keyed collections of canonical silhouettes.
//!
//! A corpus is either built from raw sources (canonicalizing each one and
//! silently dropping degenerate shapes) or loaded from silhouettes that are
//! already canonical. Every entry shares the same bitmap dimensions, and
//! insertion order is kept because ranking breaks score ties by it.
//!
//! Batch canonicalization fans out over the rayon pool when the `rayon`
//! feature is enabled and `CanonConfig::parallel` is set. Results are merged
//! on the calling thread in source order, so the outcome does not depend on
//! scheduling.

mod store;

pub use store::SilhouetteStore;

use crate::canon::{CanonConfig, CanonicalSilhouette, Canonicalizer};
use crate::image::RasterImage;
use crate::trace::{trace_debug, trace_event, trace_span};
use crate::util::{SilMatchError, SilMatchResult};
use std::collections::{HashMap, HashSet};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Named canonical silhouette.
#[derive(Clone, Debug, PartialEq)]
pub struct CorpusEntry {
    id: String,
    silhouette: CanonicalSilhouette,
}

impl CorpusEntry {
    /// Returns the entry identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the silhouette.
    pub fn silhouette(&self) -> &CanonicalSilhouette {
        &self.silhouette
    }
}

/// Immutable-once-shared collection of corpus entries.
#[derive(Clone, Debug, Default)]
pub struct Corpus {
    entries: Vec<CorpusEntry>,
    index: HashMap<String, usize>,
    dims: Option<(usize, usize)>,
}

impl Corpus {
    /// Creates an empty corpus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonicalizes every source and keeps the non-degenerate results.
    ///
    /// Duplicate identifiers are rejected before any work is done. Sources
    /// that canonicalize as degenerate are excluded; any other failure aborts
    /// the build.
    pub fn build(sources: &[(String, RasterImage)], config: &CanonConfig) -> SilMatchResult<Self> {
        let _span = trace_span!("corpus_build", sources = sources.len()).entered();
        let outcomes = canonicalize_sources(sources, config)?;
        let mut corpus = Self::new();
        let mut dropped = 0usize;
        for (id, outcome) in outcomes {
            match outcome {
                Ok(silhouette) => corpus.insert(id, silhouette)?,
                Err(err) if err.is_degenerate() => {
                    trace_debug!("dropped_degenerate", id = id.as_str());
                    dropped += 1;
                }
                Err(err) => return Err(err),
            }
        }
        trace_event!("corpus_built", kept = corpus.len(), dropped = dropped);
        Ok(corpus)
    }

    /// Like [`Corpus::build`], additionally persisting through `store`.
    ///
    /// Each surviving silhouette is written under its identifier and every
    /// degenerate source has its asset deleted, so a directory of rendered
    /// shapes can be canonicalized in place.
    pub fn build_persisted<S>(
        sources: &[(String, RasterImage)],
        config: &CanonConfig,
        store: &S,
    ) -> SilMatchResult<Self>
    where
        S: SilhouetteStore + ?Sized,
    {
        let _span = trace_span!("corpus_build", sources = sources.len()).entered();
        let outcomes = canonicalize_sources(sources, config)?;
        let mut corpus = Self::new();
        let mut dropped = 0usize;
        for (id, outcome) in outcomes {
            match outcome {
                Ok(silhouette) => {
                    store.store(&id, &silhouette)?;
                    corpus.insert(id, silhouette)?;
                }
                Err(err) if err.is_degenerate() => {
                    trace_debug!("deleted_degenerate", id = id.as_str());
                    store.delete(&id)?;
                    dropped += 1;
                }
                Err(err) => return Err(err),
            }
        }
        trace_event!("corpus_built", kept = corpus.len(), dropped = dropped);
        Ok(corpus)
    }

    /// Builds a corpus from already-canonical silhouettes, keeping order.
    pub fn load<I, S>(entries: I) -> SilMatchResult<Self>
    where
        I: IntoIterator<Item = (S, CanonicalSilhouette)>,
        S: Into<String>,
    {
        let mut corpus = Self::new();
        for (id, silhouette) in entries {
            corpus.insert(id, silhouette)?;
        }
        Ok(corpus)
    }

    /// Loads every asset listed by `store`, in the store's listing order.
    pub fn load_store<S>(store: &S) -> SilMatchResult<Self>
    where
        S: SilhouetteStore + ?Sized,
    {
        let ids = store.list()?;
        let mut corpus = Self::new();
        for id in ids {
            let silhouette = store.load(&id)?;
            corpus.insert(id, silhouette)?;
        }
        Ok(corpus)
    }

    /// Appends one entry.
    ///
    /// Fails on a repeated identifier or when the bitmap size differs from
    /// the entries already present.
    pub fn insert(
        &mut self,
        id: impl Into<String>,
        silhouette: CanonicalSilhouette,
    ) -> SilMatchResult<()> {
        let id = id.into();
        if self.index.contains_key(&id) {
            return Err(SilMatchError::DuplicateIdentifier { id });
        }
        let dims = silhouette.dims();
        match self.dims {
            Some(expected) if expected != dims => {
                return Err(SilMatchError::DimensionMismatch {
                    expected,
                    got: dims,
                });
            }
            Some(_) => {}
            None => self.dims = Some(dims),
        }
        self.index.insert(id.clone(), self.entries.len());
        self.entries.push(CorpusEntry { id, silhouette });
        Ok(())
    }

    /// Returns entries in insertion order.
    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    /// Looks up an entry by identifier.
    pub fn get(&self, id: &str) -> Option<&CorpusEntry> {
        self.index.get(id).map(|&idx| &self.entries[idx])
    }

    /// Common bitmap size, or `None` for an empty corpus.
    pub fn dims(&self) -> Option<(usize, usize)> {
        self.dims
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the corpus holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

type Outcome = (String, SilMatchResult<CanonicalSilhouette>);

fn canonicalize_sources(
    sources: &[(String, RasterImage)],
    config: &CanonConfig,
) -> SilMatchResult<Vec<Outcome>> {
    let mut seen = HashSet::with_capacity(sources.len());
    for (id, _) in sources {
        if !seen.insert(id.as_str()) {
            return Err(SilMatchError::DuplicateIdentifier { id: id.clone() });
        }
    }

    let canon = Canonicalizer::new(config.clone())?;
    let run = |(id, image): &(String, RasterImage)| -> Outcome {
        let outcome = canon
            .canonicalize(image)
            .map(|silhouette| silhouette.with_source(id.as_str()));
        (id.clone(), outcome)
    };

    #[cfg(feature = "rayon")]
    let outcomes = if config.parallel {
        sources.par_iter().map(run).collect()
    } else {
        sources.iter().map(run).collect()
    };
    #[cfg(not(feature = "rayon"))]
    let outcomes = sources.iter().map(run).collect();

    Ok(outcomes)
}
