//! Validation of an unpacked package directory
//!
//! Repairs are written back to the directory, so `repair()` must run before
//! `validate()` for repaired findings to drop out of the report.

use std::fs;
use std::path::{Path, PathBuf};

use slideforge_ooxml::OoxmlArchive;
use tracing::info;

use crate::error::Result;
use crate::issue::ValidationReport;
use crate::schema::SchemaSet;
use crate::ValidationEngine;

pub struct UnpackedValidator {
    dir: PathBuf,
    original: Option<PathBuf>,
    engine: ValidationEngine,
}

impl UnpackedValidator {
    pub fn new(dir: impl Into<PathBuf>, schemas: SchemaSet) -> Self {
        Self::with_engine(dir, ValidationEngine::with_defaults(schemas))
    }

    pub fn with_engine(dir: impl Into<PathBuf>, engine: ValidationEngine) -> Self {
        Self {
            dir: dir.into(),
            original: None,
            engine,
        }
    }

    /// Report only findings the original `.pptx` does not already have
    pub fn with_original(mut self, original: impl Into<PathBuf>) -> Self {
        self.original = Some(original.into());
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Repair the directory in place; returns the number of repairs
    pub fn repair(&self) -> Result<usize> {
        let before = OoxmlArchive::from_dir(&self.dir)?;
        let mut after = before.clone();
        let count = self.engine.repair(&mut after)?;

        let mut written = 0;
        for name in after.file_list() {
            let Some(bytes) = after.get(name) else {
                continue;
            };
            if before.get(name) != Some(bytes) {
                fs::write(self.dir.join(name), bytes)?;
                written += 1;
            }
        }
        info!(dir = %self.dir.display(), repairs = count, files = written, "auto-repaired");
        Ok(count)
    }

    pub fn validate(&self) -> Result<ValidationReport> {
        let package = OoxmlArchive::from_dir(&self.dir)?;
        let reference = self.original.as_deref().map(OoxmlArchive::open).transpose()?;
        Ok(self.engine.validate(&package, reference.as_ref()))
    }
}
