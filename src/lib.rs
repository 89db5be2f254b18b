//! Silmatch canonicalizes single-shape raster images into fixed-size
//! two-colour silhouettes and ranks a corpus of silhouettes by structural
//! similarity (SSIM) to a query.
//!
//! Image decoding and directory storage live behind the `image-io` feature;
//! `rayon` parallelizes corpus building and ranking; `tracing` emits spans
//! for the pipeline stages.

pub mod canon;
pub mod corpus;
pub mod image;
pub mod similarity;
#[cfg(feature = "image-io")]
pub mod store;
mod trace;
pub mod util;

pub use canon::{binarize, canonicalize, CanonConfig, CanonicalSilhouette, Canonicalizer, Resample};
pub use corpus::{Corpus, CorpusEntry, SilhouetteStore};
pub use crate::image::{Bitmap, BoundingBox, RasterImage};
pub use similarity::{ssim, RankConfig, RankedResult, SimilarityRanker, SsimConfig};
pub use util::{SilMatchError, SilMatchResult};

#[cfg(feature = "image-io")]
pub use crate::image::io;
#[cfg(feature = "image-io")]
pub use store::{DirStore, SourceImages};
