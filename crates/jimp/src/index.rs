//! Package index: short symbol name -> fully-qualified name.
//!
//! Built by walking classpath entries. Source trees are scanned with the
//! symbol scanner and recorded with overwrite semantics (source is
//! authoritative); jars contribute their `.class` entry names and only fill
//! vacancies. The precedence is tracked per entry so build order never
//! decides a conflict.

use crate::classpath::ClasspathEntry;
use crate::scan;
use std::collections::BTreeMap;
use std::fs;
use std::fs::File;
use std::path::Path;
use walkdir::WalkDir;

/// Reserved key carrying the scanned project's own declared package name.
/// Deliberately not a legal Java identifier so it can never collide.
pub const OWN_PACKAGE_KEY: &str = "*index:package";

#[derive(Debug, Clone)]
struct Entry {
    target: String,
    from_source: bool,
}

/// Mapping from simple (possibly scope-dotted) names to fully-qualified
/// names. Keys are unqualified, values are fully dotted.
#[derive(Debug, Default, Clone)]
pub struct PackageIndex {
    entries: BTreeMap<String, Entry>,
}

impl PackageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, short: &str) -> Option<&str> {
        self.entries.get(short).map(|e| e.target.as_str())
    }

    /// Record a source-derived mapping. Always overwrites: source trees are
    /// fresher than anything a jar or an old cache said.
    pub fn insert_source(&mut self, short: &str, target: String) {
        self.entries.insert(
            short.to_string(),
            Entry {
                target,
                from_source: true,
            },
        );
    }

    /// Record an archive-derived mapping. Fills vacancies only; never
    /// displaces an existing entry, source-derived or otherwise.
    pub fn insert_archive(&mut self, short: &str, target: String) {
        self.entries.entry(short.to_string()).or_insert(Entry {
            target,
            from_source: false,
        });
    }

    /// The scanned project's own declared package, if stashed.
    pub fn own_package(&self) -> Option<&str> {
        self.get(OWN_PACKAGE_KEY)
    }

    pub fn set_own_package(&mut self, package: &str) {
        self.insert_source(OWN_PACKAGE_KEY, package.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flatten to the plain map persisted in the cache record.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.target.clone()))
            .collect()
    }

    /// Rebuild from a persisted map. Loaded entries count as source-derived;
    /// the only writes after a load are source re-scans, which overwrite
    /// regardless.
    pub fn from_map(map: BTreeMap<String, String>) -> Self {
        let entries = map
            .into_iter()
            .map(|(k, target)| {
                (
                    k,
                    Entry {
                        target,
                        from_source: true,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    #[cfg(test)]
    fn is_from_source(&self, short: &str) -> bool {
        self.entries.get(short).map(|e| e.from_source) == Some(true)
    }
}

/// Build an index from expanded classpath entries.
///
/// Unreadable files and archives are warned about and skipped; the build
/// completes with whatever the remaining classpath yields.
pub fn build(entries: &[ClasspathEntry]) -> PackageIndex {
    let mut index = PackageIndex::new();
    for entry in entries {
        match entry {
            ClasspathEntry::Dir(path) => add_source_tree(&mut index, path, None),
            ClasspathEntry::Archive(path) => add_archive(&mut index, path),
        }
    }
    index
}

/// Scan every `.java` file below the first level of `root` and record its
/// scoped definitions as `<namespace>.<top-level scope>`.
///
/// `skip_dir` excludes one directory's immediate files - used when re-scanning
/// the target's own project tree, which leaves the directory of the file being
/// edited out of the walk.
pub fn add_source_tree(index: &mut PackageIndex, root: &Path, skip_dir: Option<&Path>) {
    for entry in WalkDir::new(root).min_depth(2) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                eprintln!("warning: skipping unreadable path under {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("java") {
            continue;
        }
        if let Some(skip) = skip_dir {
            if path.parent() == Some(skip) {
                continue;
            }
        }

        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("warning: skipping unreadable file {}: {}", path.display(), e);
                continue;
            }
        };
        let symbols = scan::scan(&text);
        let Some(namespace) = symbols.namespace.as_deref() else {
            // Default-package file: nothing importable to record.
            continue;
        };
        for (scope, qualified) in symbols.scoped_defines() {
            index.insert_source(&qualified, format!("{}.{}", namespace, scope));
        }
    }
}

/// Register every `.class` entry of a jar, with archive (no-overwrite)
/// semantics.
pub fn add_archive(index: &mut PackageIndex, path: &Path) {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("warning: skipping unreadable archive {}: {}", path.display(), e);
            return;
        }
    };
    let archive = match zip::ZipArchive::new(file) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("warning: skipping unreadable archive {}: {}", path.display(), e);
            return;
        }
    };
    for name in archive.file_names() {
        add_class_entry(index, name);
    }
}

/// Ingest one archive entry name like `com/example/Outer$Inner.class`.
///
/// Nested-class separators split into scope levels the same way
/// source-derived nested declarations do: `Outer$Inner$Field` registers
/// `Outer`, `Outer.Inner` and `Outer.Inner.Field`, all pointing at the
/// outermost class.
fn add_class_entry(index: &mut PackageIndex, name: &str) {
    let Some(stem) = name.strip_suffix(".class") else {
        return;
    };
    if stem.is_empty()
        || !stem
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '/')
    {
        return;
    }

    let qualified = stem.replace('/', ".");
    let last = qualified.rsplit('.').next().unwrap_or(&qualified);
    if last.contains('$') {
        let root = match qualified.find('$') {
            Some(i) => qualified[..i].to_string(),
            None => qualified.clone(),
        };
        let mut scopes: Vec<&str> = Vec::new();
        for inner in last.split('$') {
            scopes.push(inner);
            index.insert_archive(&scopes.join("."), root.clone());
        }
    } else {
        index.insert_archive(last, qualified.clone());
    }
}
