//! Named, on-disk storage of tagger artifacts.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::errors::{PosgramError, Result};
use crate::model::TaggerArtifact;

const EXTENSION: &str = "tagger";
const ZSTD_LEVEL: i32 = 19;

/// Directory of zstd-compressed tagger artifacts, keyed by artifact name.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new<P>(root: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Gets the file an artifact name maps to.
    ///
    /// # Errors
    ///
    /// [`PosgramError::InvalidArgument`] if `name` is empty or contains a path separator.
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(PosgramError::invalid_argument(
                "name",
                format!("{name:?} is not a valid artifact name"),
            ));
        }
        Ok(self.root.join(format!("{name}.{EXTENSION}")))
    }

    pub fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.path_for(name)?.is_file())
    }

    /// Saves an artifact under its own name, replacing any previous artifact of that name.
    ///
    /// # Returns
    ///
    /// The path written to.
    pub fn save(&self, artifact: &TaggerArtifact) -> Result<PathBuf> {
        let path = self.path_for(artifact.name())?;
        fs::create_dir_all(&self.root)?;
        let tmp_path = path.with_extension(format!("{EXTENSION}.tmp"));
        {
            let mut f = zstd::Encoder::new(BufWriter::new(File::create(&tmp_path)?), ZSTD_LEVEL)?;
            artifact.write(&mut f)?;
            f.finish()?.flush()?;
        }
        fs::rename(&tmp_path, &path)?;
        info!("Saved tagger {:?} to {}", artifact.name(), path.display());
        Ok(path)
    }

    /// Loads the artifact saved under `name`.
    ///
    /// # Errors
    ///
    /// [`PosgramError::ArtifactNotFound`] if nothing was saved under `name`.
    pub fn load(&self, name: &str) -> Result<TaggerArtifact> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(PosgramError::ArtifactNotFound {
                name: name.to_string(),
                path,
            });
        }
        let f = zstd::Decoder::new(File::open(&path)?)?;
        let artifact = TaggerArtifact::read(f)?;
        info!("Loaded tagger {:?} from {}", name, path.display());
        Ok(artifact)
    }
}
