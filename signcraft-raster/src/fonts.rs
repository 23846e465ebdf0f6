//! Font registry and readiness checking.
//!
//! The registry wraps a fontdb database plus a set of pending font sources
//! (raw bytes, files, directories, remote URLs). Preloading is idempotent:
//! each source is loaded at most once, and re-calling `preload` only
//! retries sources that previously failed. [`FontRegistry::ensure_ready`]
//! gives the export pipeline its bounded, fail-open wait: render with
//! fallback fonts rather than hang when a family never materializes.

use crate::error::{RasterError, RasterResult};
use signcraft_core::net;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How long a single remote font fetch may take.
const FONT_FETCH_TIMEOUT: Duration = Duration::from_secs(8);

/// Poll interval while waiting for families to become available.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A font source to register with the database.
#[derive(Debug, Clone)]
pub enum FontSource {
    /// Raw font file bytes (TTF/OTF). Arc-wrapped for cheap cloning.
    Data(Arc<Vec<u8>>),
    /// A single font file on disk.
    File(PathBuf),
    /// A directory to scan for font files.
    Dir(PathBuf),
    /// A remote font file.
    Url(String),
}

struct PendingSource {
    source: FontSource,
    loaded: bool,
}

/// Font database with idempotent preloading.
pub struct FontRegistry {
    db: fontdb::Database,
    pending: Vec<PendingSource>,
}

impl FontRegistry {
    /// Registry over the system fonts, with the usual generic family
    /// mappings applied.
    pub fn with_system_fonts() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        apply_generic_families(&mut db);
        Self {
            db,
            pending: Vec::new(),
        }
    }

    /// Empty registry (no system fonts). Used in tests and for fully
    /// self-contained font setups.
    pub fn empty() -> Self {
        Self {
            db: fontdb::Database::new(),
            pending: Vec::new(),
        }
    }

    /// Queue a font source for the next preload.
    pub fn register(&mut self, source: FontSource) {
        self.pending.push(PendingSource {
            source,
            loaded: false,
        });
    }

    /// Load every pending source that has not been loaded yet. Safe to call
    /// repeatedly; sources that already loaded are skipped, failed ones are
    /// retried.
    pub fn preload(&mut self) {
        for entry in &mut self.pending {
            if entry.loaded {
                continue;
            }
            match load_source(&mut self.db, &entry.source) {
                Ok(()) => entry.loaded = true,
                Err(err) => {
                    log::warn!(target: "fonts", "font preload failed: {}", err);
                }
            }
        }
    }

    /// Whether a family name resolves to a face in the database.
    pub fn has_family(&self, family: &str) -> bool {
        let query = fontdb::Query {
            families: &[fontdb::Family::Name(family)],
            ..fontdb::Query::default()
        };
        self.db.query(&query).is_some()
    }

    /// Whether the database has any face at all. Pixel-level text
    /// assertions are meaningless without one.
    pub fn has_any_face(&self) -> bool {
        self.db.faces().next().is_some()
    }

    /// Wait until every requested family resolves, up to `timeout`.
    ///
    /// Generic CSS names (sans-serif etc.) are satisfied by the database's
    /// generic mappings and are not waited on. Returns `false` on timeout;
    /// the caller proceeds with fallback fonts (fail-open).
    pub fn ensure_ready(&mut self, families: &[String], timeout: Duration) -> bool {
        let concrete: Vec<&str> = families
            .iter()
            .map(String::as_str)
            .filter(|f| !is_generic_family(f))
            .collect();
        if concrete.is_empty() {
            self.preload();
            return true;
        }

        let deadline = Instant::now() + timeout;
        loop {
            self.preload();
            if concrete.iter().all(|f| self.has_family(f)) {
                return true;
            }
            if Instant::now() >= deadline {
                let missing: Vec<&str> = concrete
                    .iter()
                    .copied()
                    .filter(|f| !self.has_family(f))
                    .collect();
                log::warn!(target: "fonts",
                    "fonts not ready after {:?}, rendering with fallbacks: {:?}",
                    timeout, missing);
                return false;
            }
            std::thread::sleep(READY_POLL_INTERVAL);
        }
    }

    pub fn database(&self) -> &fontdb::Database {
        &self.db
    }
}

fn load_source(db: &mut fontdb::Database, source: &FontSource) -> RasterResult<()> {
    match source {
        FontSource::Data(bytes) => {
            db.load_font_data(bytes.as_ref().clone());
            Ok(())
        }
        FontSource::File(path) => db
            .load_font_file(path)
            .map_err(|e| RasterError::FontError(format!("{}: {}", path.display(), e))),
        FontSource::Dir(path) => {
            db.load_fonts_dir(path);
            Ok(())
        }
        FontSource::Url(url) => {
            let bytes = net::fetch_bytes(url, FONT_FETCH_TIMEOUT)
                .map_err(|e| RasterError::FontError(e.to_string()))?;
            db.load_font_data(bytes);
            Ok(())
        }
    }
}

fn is_generic_family(name: &str) -> bool {
    matches!(
        name,
        "sans-serif" | "serif" | "monospace" | "cursive" | "fantasy"
    )
}

/// Map the generic CSS families onto whatever concrete faces are present,
/// preferring the common browser defaults.
fn apply_generic_families(db: &mut fontdb::Database) {
    let available: std::collections::HashSet<String> = db
        .faces()
        .flat_map(|face| {
            face.families
                .iter()
                .map(|(fam, _lang)| fam.clone())
                .collect::<Vec<_>>()
        })
        .collect();

    for family in ["Arial", "Helvetica", "Liberation Sans", "DejaVu Sans"] {
        if available.contains(family) {
            db.set_sans_serif_family(family);
            break;
        }
    }
    for family in ["Times New Roman", "Liberation Serif", "DejaVu Serif"] {
        if available.contains(family) {
            db.set_serif_family(family);
            break;
        }
    }
    for family in ["Comic Sans MS", "Apple Chancery"] {
        if available.contains(family) {
            db.set_cursive_family(family);
            break;
        }
    }
}
