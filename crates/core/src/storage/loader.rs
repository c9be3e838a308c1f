use std::path::Path;
use std::sync::OnceLock;

use tracing::{debug, info, warn};

use super::format;
use super::spreadsheet;
use crate::errors::CoreError;
use crate::models::transaction::Dataset;

/// The process-wide dataset. Written once, read-only afterwards.
static DATASET: OnceLock<Dataset> = OnceLock::new();

/// Loads the transaction spreadsheet.
///
/// Flow: file → raw cell table (csv / calamine) → header normalization →
/// typed `TransactionRow`s → `Dataset`
pub struct DatasetLoader;

impl DatasetLoader {
    /// Load the dataset once per process and hand out the cached copy on every
    /// later call. The source is static during a session, so there is no
    /// invalidation. A failed load is not cached.
    pub fn load(path: impl AsRef<Path>) -> Result<&'static Dataset, CoreError> {
        let path = path.as_ref();
        if let Some(cached) = DATASET.get() {
            Self::note_cache_hit(cached, path);
            return Ok(cached);
        }

        let dataset = Self::read(path)?;
        // Another caller may have won the race; either way the stored value wins.
        let stored = DATASET.get_or_init(|| dataset);
        Ok(stored)
    }

    /// The cached dataset, if `load` has succeeded before.
    pub fn cached() -> Option<&'static Dataset> {
        DATASET.get()
    }

    /// Read and parse a source file without touching the cache.
    pub fn read(path: impl AsRef<Path>) -> Result<Dataset, CoreError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CoreError::DataUnavailable(format!(
                "File not found: '{}'",
                path.display()
            )));
        }

        let table = spreadsheet::read_table(path)?;
        let rows = format::parse_rows(&table)?;
        info!(
            path = %path.display(),
            rows = rows.len(),
            "loaded transaction dataset"
        );
        Ok(Dataset::new(path, rows))
    }

    fn note_cache_hit(cached: &Dataset, requested: &Path) {
        if cached.source() == requested {
            debug!(path = %requested.display(), "dataset served from cache");
        } else {
            warn!(
                cached = %cached.source().display(),
                requested = %requested.display(),
                "dataset already loaded from another file; serving the cached copy"
            );
        }
    }
}
