use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, bail};
use serde::de::DeserializeOwned;

/// Read a JSON document from `path`, or from stdin when no path is given.
pub fn read_json<T: DeserializeOwned>(path: Option<&Path>) -> anyhow::Result<T> {
    match path {
        Some(path) => {
            if !path.is_file() {
                bail!("not a file: {}", path.display());
            }
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("failed to parse {}", path.display()))
        }
        None => {
            let mut contents = String::new();
            io::stdin()
                .read_to_string(&mut contents)
                .context("failed to read stdin")?;
            if contents.trim().is_empty() {
                bail!("--input <file.json> or JSON on stdin required");
            }
            serde_json::from_str(&contents).context("failed to parse stdin")
        }
    }
}
