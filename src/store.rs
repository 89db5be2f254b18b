//! Directory-backed silhouette storage: one grayscale PNG per identifier.
//!
//! Available when the `image-io` feature is enabled.

use crate::canon::{binarize, CanonConfig, CanonicalSilhouette};
use crate::corpus::SilhouetteStore;
use crate::image::io::{gray_image_from_bitmap, load_image};
use crate::image::RasterImage;
use crate::trace::trace_debug;
use crate::util::{SilMatchError, SilMatchResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "png";

/// Stores silhouettes as `<root>/<id>.png`.
#[derive(Clone, Debug)]
pub struct DirStore {
    root: PathBuf,
    config: CanonConfig,
}

impl DirStore {
    /// Creates a store rooted at `root`; assets are read back with the
    /// default canonicalization colours.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: CanonConfig::default(),
        }
    }

    /// Uses `config` to re-binarize assets on load.
    pub fn with_config(mut self, config: CanonConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the store directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the asset for `id`.
    pub fn path_for(&self, id: &str) -> SilMatchResult<PathBuf> {
        if id.is_empty() || id.contains(['/', '\\']) || id == "." || id == ".." {
            return Err(SilMatchError::Store {
                id: id.to_string(),
                reason: "identifier is not a plain file name".into(),
            });
        }
        Ok(self.root.join(format!("{id}.{EXTENSION}")))
    }

    /// Decodes every listed asset as a raw source image, for in-place
    /// batch canonicalization.
    ///
    /// Files that fail to decode are skipped and reported in
    /// [`SourceImages::unreadable`]; they are left on disk untouched. A
    /// directory that cannot be listed is still an error.
    pub fn read_sources(&self) -> SilMatchResult<SourceImages> {
        let mut batch = SourceImages::default();
        for id in self.list()? {
            match load_image(self.path_for(&id)?) {
                Ok(image) => batch.sources.push((id, image)),
                Err(err @ SilMatchError::ImageLoad { .. }) => {
                    trace_debug!("skipped_unreadable", id = id.as_str());
                    batch.unreadable.push((id, err));
                }
                Err(err) => return Err(err),
            }
        }
        Ok(batch)
    }
}

/// Raw images read from a [`DirStore`], split into decodable sources and
/// files that could not be decoded.
#[derive(Clone, Debug, Default)]
pub struct SourceImages {
    /// Decoded images keyed by identifier, in listing order.
    pub sources: Vec<(String, RasterImage)>,
    /// Identifiers whose asset failed to decode, with the decode error.
    pub unreadable: Vec<(String, SilMatchError)>,
}

fn store_err(id: &str, err: impl std::fmt::Display) -> SilMatchError {
    SilMatchError::Store {
        id: id.to_string(),
        reason: err.to_string(),
    }
}

impl SilhouetteStore for DirStore {
    fn store(&self, id: &str, silhouette: &CanonicalSilhouette) -> SilMatchResult<()> {
        let path = self.path_for(id)?;
        fs::create_dir_all(&self.root).map_err(|err| store_err(id, err))?;
        let gray = gray_image_from_bitmap(silhouette.bitmap())?;
        gray.save_with_format(&path, image::ImageFormat::Png)
            .map_err(|err| store_err(id, err))
    }

    fn load(&self, id: &str) -> SilMatchResult<CanonicalSilhouette> {
        let raster = load_image(self.path_for(id)?)?;
        let bitmap = binarize(&raster, &self.config)?;
        Ok(CanonicalSilhouette::from_bitmap(bitmap, &self.config)?.with_source(id))
    }

    fn delete(&self, id: &str) -> SilMatchResult<()> {
        match fs::remove_file(self.path_for(id)?) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(store_err(id, err)),
        }
    }

    fn list(&self) -> SilMatchResult<Vec<String>> {
        let dir = match fs::read_dir(&self.root) {
            Ok(dir) => dir,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(store_err("*", err)),
        };
        let mut ids = Vec::new();
        for entry in dir {
            let path = entry.map_err(|err| store_err("*", err))?.path();
            let is_png = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == EXTENSION);
            if !is_png || !path.is_file() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}
