//! Project layout detection.
//!
//! A closed set of layout variants is probed in fixed priority order - Gradle
//! first, then plain Eclipse/ADT - each anchored at the source root derived
//! from the target file's declared package. The first variant whose marker
//! file is found within a bounded number of parent directories wins.

use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// How many parent directories to search above the source root for a layout
/// marker.
const PARENT_SEARCH_DEPTH: usize = 5;

/// Properties key naming the build profile, e.g. `jimp.profile = android`.
const PROFILE_KEY: &str = "jimp.profile";

trait Layout: Sync {
    fn name(&self) -> &'static str;
    /// Marker file that identifies a project root of this layout.
    fn marker(&self) -> &'static str;
    /// Where this layout keeps its manifest, relative to the project root.
    fn manifest(&self, root: &Path) -> PathBuf;
}

struct Gradle;
struct Eclipse;

impl Layout for Gradle {
    fn name(&self) -> &'static str {
        "gradle"
    }
    fn marker(&self) -> &'static str {
        "build.gradle"
    }
    fn manifest(&self, root: &Path) -> PathBuf {
        root.join("src/main/AndroidManifest.xml")
    }
}

impl Layout for Eclipse {
    fn name(&self) -> &'static str {
        "eclipse"
    }
    fn marker(&self) -> &'static str {
        "AndroidManifest.xml"
    }
    fn manifest(&self, root: &Path) -> PathBuf {
        root.join("AndroidManifest.xml")
    }
}

/// Priority order: Gradle beats Eclipse when both markers are present.
static LAYOUTS: [&dyn Layout; 2] = [&Gradle, &Eclipse];

/// A located project: its root and the layout that claimed it.
pub struct Project {
    root: PathBuf,
    layout: &'static dyn Layout,
}

impl Project {
    /// Probe the layout variants around `target`. Returns `None` (with a
    /// warning) when no marker is found; callers degrade gracefully.
    pub fn locate(namespace: Option<&str>, target: &Path) -> Option<Project> {
        let start = source_root(namespace, target)?;
        for layout in &LAYOUTS {
            let mut dir = Some(start.as_path());
            for _ in 0..=PARENT_SEARCH_DEPTH {
                let Some(d) = dir else { break };
                if d.join(layout.marker()).exists() {
                    return Some(Project {
                        root: d.to_path_buf(),
                        layout: *layout,
                    });
                }
                dir = d.parent();
            }
        }
        eprintln!("warning: project layout unknown for {}", target.display());
        None
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    #[allow(dead_code)] // diagnostics
    pub fn layout_name(&self) -> &'static str {
        self.layout.name()
    }

    /// Declared package of the project, from the manifest's `package`
    /// attribute. Parse failures warn and yield `None`; everything
    /// package-dependent downstream becomes a no-op.
    pub fn package_name(&self) -> Option<String> {
        let manifest = self.layout.manifest(&self.root);
        match manifest_package(&manifest) {
            Some(package) => Some(package),
            None => {
                eprintln!(
                    "warning: cannot parse {}: cannot determine package name",
                    manifest.display()
                );
                None
            }
        }
    }

    /// Build profile named by the `jimp.profile` key in any `*.properties`
    /// file at the project root.
    pub fn profile_name(&self) -> Option<String> {
        let re = Regex::new(&format!(
            r"^{}\s*=\s*([A-Za-z0-9_]+)\s*$",
            regex::escape(PROFILE_KEY)
        ))
        .expect("profile pattern is well-formed");

        let dir = fs::read_dir(&self.root).ok()?;
        for item in dir.flatten() {
            let path = item.path();
            if path.extension().and_then(|e| e.to_str()) != Some("properties") {
                continue;
            }
            let Ok(text) = fs::read_to_string(&path) else {
                continue;
            };
            for line in text.lines() {
                if let Some(m) = re.captures(line) {
                    return Some(m[1].to_string());
                }
            }
        }
        None
    }
}

/// Derive the source root by stripping the namespace-as-path suffix from the
/// target file's directory: `/proj/src/com/example/app` with namespace
/// `com.example.app` roots at `/proj/src`. Without a namespace the target's
/// directory is the root.
pub fn source_root(namespace: Option<&str>, target: &Path) -> Option<PathBuf> {
    let canonical = target.canonicalize().unwrap_or_else(|_| target.to_path_buf());
    let dir = canonical.parent()?.to_path_buf();
    let Some(ns) = namespace else {
        return Some(dir);
    };
    let suffix: PathBuf = ns.split('.').collect();
    if dir.ends_with(&suffix) {
        let keep = dir.components().count() - suffix.components().count();
        Some(dir.components().take(keep).collect())
    } else {
        Some(dir)
    }
}

/// Pull the `package` attribute off the root `<manifest>` element.
fn manifest_package(path: &Path) -> Option<String> {
    let mut reader = Reader::from_file(path).ok()?;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"manifest" => {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"package" {
                        return attr.unescape_value().ok().map(|v| v.into_owned());
                    }
                }
                return None;
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
        buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(path: &Path, text: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    const MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android"
    package="com.example.app">
  <application/>
</manifest>
"#;

    #[test]
    fn source_root_strips_namespace_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("src/com/example/app/Main.java");
        write(&target, "");
        let root = source_root(Some("com.example.app"), &target).unwrap();
        assert_eq!(root, dir.path().canonicalize().unwrap().join("src"));
    }

    #[test]
    fn eclipse_layout_is_located_by_manifest_marker() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("src/com/example/app/Main.java");
        write(&target, "");
        write(&dir.path().join("AndroidManifest.xml"), MANIFEST);

        let project = Project::locate(Some("com.example.app"), &target).unwrap();
        assert_eq!(project.layout_name(), "eclipse");
        assert_eq!(project.package_name().as_deref(), Some("com.example.app"));
    }

    #[test]
    fn gradle_layout_wins_over_eclipse() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("src/main/java/com/example/app/Main.java");
        write(&target, "");
        write(&dir.path().join("build.gradle"), "");
        write(&dir.path().join("AndroidManifest.xml"), MANIFEST);
        write(&dir.path().join("src/main/AndroidManifest.xml"), MANIFEST);

        let project = Project::locate(Some("com.example.app"), &target).unwrap();
        assert_eq!(project.layout_name(), "gradle");
        assert_eq!(project.package_name().as_deref(), Some("com.example.app"));
    }

    #[test]
    fn unknown_layout_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("src/com/example/app/Main.java");
        write(&target, "");
        assert!(Project::locate(Some("com.example.app"), &target).is_none());
    }

    #[test]
    fn broken_manifest_degrades_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("src/com/example/app/Main.java");
        write(&target, "");
        write(&dir.path().join("AndroidManifest.xml"), "<manifest");

        let project = Project::locate(Some("com.example.app"), &target).unwrap();
        assert_eq!(project.package_name(), None);
    }

    #[test]
    fn profile_name_reads_properties_key() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("src/com/example/app/Main.java");
        write(&target, "");
        write(&dir.path().join("AndroidManifest.xml"), MANIFEST);
        write(
            &dir.path().join("local.properties"),
            "sdk.dir=/opt/android\njimp.profile = android\n",
        );

        let project = Project::locate(Some("com.example.app"), &target).unwrap();
        assert_eq!(project.profile_name().as_deref(), Some("android"));
    }
}
