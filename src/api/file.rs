use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A file to register with the logbook.
///
/// Only `absolute_path` has to be filled in. `path` is derived from it during
/// registration, see [`relative_path`]. Anything in `extra` is sent along as
/// additional top-level fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub absolute_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(rename = "gen", default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<i64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl FileInfo {
    pub fn new(absolute_path: impl Into<String>) -> Self {
        FileInfo {
            absolute_path: absolute_path.into(),
            ..Default::default()
        }
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn with_generation(mut self, generation: i64) -> Self {
        self.generation = Some(generation);
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Characters kept in front of the experiment name, enough for the instrument
/// directory in `/<instr>/<experiment>/...` layouts.
const PREFIX_LEN: usize = 5;

/// Derives the path the logbook stores for a file.
///
/// The first occurrence of `experiment` in `absolute_path` is located. If it
/// starts past character 5, everything from five characters before it is
/// returned, so `/cds/data/psdm/xpp/xpptut15/xtc/r1.xtc` becomes
/// `/xpp/xpptut15/xtc/r1.xtc`.
/// Otherwise the absolute path is returned unchanged. A recurrence of the
/// experiment name earlier in the path wins over the real experiment
/// directory.
pub fn relative_path<'a>(experiment: &str, absolute_path: &'a str) -> &'a str {
    let head = match absolute_path.find(experiment) {
        Some(index) => &absolute_path[..index],
        None => return absolute_path,
    };
    if head.chars().count() <= PREFIX_LEN {
        return absolute_path;
    }
    match head.char_indices().rev().nth(PREFIX_LEN - 1) {
        Some((start, _)) => &absolute_path[start..],
        None => absolute_path,
    }
}
