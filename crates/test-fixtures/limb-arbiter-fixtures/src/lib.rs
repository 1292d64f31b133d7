use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    registries: HashMap<String, String>,
    scenarios: HashMap<String, String>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

/// Absolute path of the fixture registered as `name` in one manifest section.
fn entry(section: &HashMap<String, String>, kind: &str, name: &str) -> Result<PathBuf> {
    section
        .get(name)
        .map(|rel| fixtures_root().join(rel))
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn parse<T: DeserializeOwned>(path: &Path) -> Result<T> {
    serde_json::from_str(&read(path)?)
        .with_context(|| format!("failed to parse JSON fixture {}", path.display()))
}

fn sorted_keys(section: &HashMap<String, String>) -> Vec<String> {
    let mut keys: Vec<String> = section.keys().cloned().collect();
    keys.sort();
    keys
}

/// Registry tables as designers would author them.
pub mod registries {
    use super::*;

    pub fn keys() -> Vec<String> {
        sorted_keys(&MANIFEST.registries)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        entry(&MANIFEST.registries, "registry", name)
    }

    pub fn json(name: &str) -> Result<String> {
        read(&path(name)?)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        parse(&path(name)?)
    }
}

/// Scripted request/complete sequences with expected outcomes.
pub mod scenarios {
    use super::*;

    pub fn keys() -> Vec<String> {
        sorted_keys(&MANIFEST.scenarios)
    }

    pub fn json(name: &str) -> Result<String> {
        read(&entry(&MANIFEST.scenarios, "scenario", name)?)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        parse(&entry(&MANIFEST.scenarios, "scenario", name)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_entries_exist_on_disk() {
        for key in registries::keys() {
            assert!(registries::path(&key).unwrap().exists(), "registry {key}");
        }
        for key in scenarios::keys() {
            assert!(scenarios::json(&key).is_ok(), "scenario {key}");
        }
    }

    #[test]
    fn unknown_fixture_is_an_error() {
        assert!(registries::json("does-not-exist").is_err());
    }
}
