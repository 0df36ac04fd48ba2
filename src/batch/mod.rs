use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::info;
use serde::Deserialize;

use crate::metadata::MetadataRecord;

/// One video of a batch file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchItem {
    pub file: PathBuf,
    pub metadata: MetadataRecord,
}

/// Read a JSON array of `{"file": ..., "metadata": {...}}` objects.
///
/// Every item is validated up front so a bad entry late in the file fails
/// before anything is uploaded.
pub fn load(path: &Path) -> Result<Vec<BatchItem>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read batch file {}", path.display()))?;
    let items = parse(&text).with_context(|| format!("invalid batch file {}", path.display()))?;
    info!("loaded {} videos from {}", items.len(), path.display());
    Ok(items)
}

pub fn parse(text: &str) -> Result<Vec<BatchItem>> {
    let items: Vec<BatchItem> = serde_json::from_str(text)?;
    if items.is_empty() {
        bail!("batch contains no videos");
    }
    Ok(items)
}
