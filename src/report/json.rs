//! JSON machine-readable report

use super::AssetEntry;
use miette::{Context, IntoDiagnostic, Result};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

#[derive(Serialize)]
struct JsonReport<'a> {
    total: usize,
    unused: usize,
    assets: &'a [AssetEntry],
}

/// Writes the full entry list as JSON, to a file or stdout
pub struct JsonReporter {
    output_path: Option<PathBuf>,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn report(&self, entries: &[AssetEntry]) -> Result<()> {
        let report = JsonReport {
            total: entries.len(),
            unused: entries.iter().filter(|e| !e.reachable).count(),
            assets: entries,
        };

        let text = serde_json::to_string_pretty(&report).into_diagnostic()?;

        match &self.output_path {
            Some(path) => fs::write(path, text)
                .into_diagnostic()
                .wrap_err_with(|| format!("cannot write report to {}", path.display()))?,
            None => println!("{}", text),
        }
        Ok(())
    }
}
