//! Profile configuration file.
//!
//! A TOML file mapping profile names to classpath/cache-file defaults:
//!
//! ```toml
//! [android]
//! classpath = "libs/*.jar:/opt/android-sdk/platforms/android-19/android.jar:src/"
//! cache-file = "~/.cache/jimp/android.cache.gz"
//! ```
//!
//! Command-line flags always override profile values.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Defaults contributed by one profile section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Profile {
    /// Classpath specification (see [`crate::classpath::expand`]).
    pub classpath: Option<String>,
    /// Package index cache file.
    #[serde(rename = "cache-file")]
    pub cache_file: Option<String>,
}

/// Load one named profile out of a configuration file.
pub fn load_profile(path: &Path, name: &str) -> Result<Profile, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("cannot read config file {}: {}", path.display(), e))?;
    let profiles: HashMap<String, Profile> = toml::from_str(&text)
        .map_err(|e| format!("cannot parse config file {}: {}", path.display(), e))?;
    profiles
        .get(name)
        .cloned()
        .ok_or_else(|| format!("cannot find profile: {}", name))
}
