//! Static stop-id → display-name directory.
//!
//! Loaded once at startup from a GTFS `stops.txt`-like file and shared
//! read-only by every request afterwards.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use tracing::{info, warn};

#[derive(Debug, Default, Clone)]
pub struct StopDirectory {
    names: HashMap<String, String>,
}

impl StopDirectory {
    /// Reads the directory from `path`.
    ///
    /// Each line needs at least three comma-separated fields: the first is the
    /// stop id, the third (with surrounding quotes stripped) is the name.
    /// Shorter lines are skipped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("could not open stops file {}", path.display()))?;
        Self::from_reader(file)
    }

    /// Like [`StopDirectory::load`], but a read failure yields an empty
    /// directory and a warning instead of an error.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(directory) => {
                info!(stops = directory.len(), path = %path.display(), "Loaded stops");
                directory
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not load stops file, stop names will not be resolved");
                Self::default()
            }
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        // The name column is split naively on commas, so quoting is disabled
        // and the quotes are trimmed by hand.
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(reader);

        let mut names = HashMap::new();
        for record in rdr.byte_records() {
            let record = record.context("could not read stops file")?;
            if record.len() < 3 {
                continue;
            }
            let stop_id = String::from_utf8_lossy(&record[0]).trim().to_string();
            let stop_name = String::from_utf8_lossy(&record[2])
                .trim_matches('"')
                .to_string();
            names.insert(stop_id, stop_name);
        }

        Ok(Self { names })
    }

    /// Display name for `stop_id`, or the id itself when it is unknown.
    pub fn lookup<'a>(&'a self, stop_id: &'a str) -> &'a str {
        self.names.get(stop_id).map(String::as_str).unwrap_or(stop_id)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StopDirectory {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            names: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
