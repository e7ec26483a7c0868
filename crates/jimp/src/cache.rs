//! Persistent package index cache.
//!
//! One gzip-compressed JSON record per cache file, holding the classpath the
//! index was built from and the index itself. Staleness is mtime-based: any
//! classpath member newer than the cache file, or a classpath that no longer
//! matches the recorded one, forces a rebuild. Every failure mode (missing
//! file, unreadable member, corrupt record) also resolves to "rebuild" - the
//! cache regenerates rather than the run failing.

use crate::classpath::{self, ClasspathEntry};
use crate::index::PackageIndex;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use std::time::SystemTime;
use walkdir::WalkDir;

/// The persisted record. `save` then `load` round-trips exactly.
#[derive(Debug, Serialize, Deserialize)]
struct CacheRecord {
    classpath: Vec<String>,
    packages: BTreeMap<String, String>,
}

fn mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Decide whether the cache must be regenerated for this classpath.
///
/// Checks short-circuit in order: missing cache file, any file under a
/// directory entry newer than the cache, any archive newer than the cache,
/// then a by-value comparison of the recorded classpath (same entries, same
/// order). I/O failures while probing count as stale.
pub fn needs_rebuild(cache_file: &Path, entries: &[ClasspathEntry]) -> bool {
    let Some(cache_at) = mtime(cache_file) else {
        return true;
    };

    for entry in entries {
        match entry {
            ClasspathEntry::Dir(path) => {
                for item in WalkDir::new(path) {
                    let item = match item {
                        Ok(i) => i,
                        Err(_) => return true,
                    };
                    if !item.file_type().is_file() {
                        continue;
                    }
                    match mtime(item.path()) {
                        Some(t) if t <= cache_at => {}
                        _ => return true,
                    }
                }
            }
            ClasspathEntry::Archive(path) => match mtime(path) {
                Some(t) if t <= cache_at => {}
                _ => return true,
            },
        }
    }

    match load(cache_file) {
        Ok((recorded, _)) => recorded != classpath::as_strings(entries),
        Err(_) => true,
    }
}

/// Read the record back. Any decode failure surfaces as an error the caller
/// treats like a stale cache.
pub fn load(cache_file: &Path) -> Result<(Vec<String>, PackageIndex), String> {
    let file = File::open(cache_file)
        .map_err(|e| format!("cannot open cache file {}: {}", cache_file.display(), e))?;
    let record: CacheRecord = serde_json::from_reader(GzDecoder::new(file))
        .map_err(|e| format!("cannot decode cache file {}: {}", cache_file.display(), e))?;
    Ok((record.classpath, PackageIndex::from_map(record.packages)))
}

/// Write the record, compressed.
pub fn save(cache_file: &Path, classpath: &[String], index: &PackageIndex) -> Result<(), String> {
    let record = CacheRecord {
        classpath: classpath.to_vec(),
        packages: index.to_map(),
    };
    let file = File::create(cache_file)
        .map_err(|e| format!("cannot create cache file {}: {}", cache_file.display(), e))?;
    let mut encoder = GzEncoder::new(file, Compression::default());
    serde_json::to_writer(&mut encoder, &record)
        .map_err(|e| format!("cannot encode cache file {}: {}", cache_file.display(), e))?;
    encoder
        .finish()
        .map_err(|e| format!("cannot write cache file {}: {}", cache_file.display(), e))?;
    Ok(())
}
