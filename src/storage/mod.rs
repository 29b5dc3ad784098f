use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{debug, info};

use crate::models::common::{BlockBundle, MappedBlock};

const BUNDLE_EXTENSION: &str = "json";
const OUTPUT_SUFFIX: &str = ".operations.json";

/// Output path for a bundle: `<output_dir>/<stem>.operations.json`.
pub fn output_path(bundle: &Path, output_dir: &Path) -> PathBuf {
    let stem = bundle
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.join(format!("{stem}{OUTPUT_SUFFIX}"))
}

/// Bundles in `input_dir` that have no output yet and are not in `skip`,
/// in file name order.
pub async fn pending_bundles(
    input_dir: &Path,
    output_dir: &Path,
    skip: &HashSet<PathBuf>,
) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(input_dir)
        .await
        .with_context(|| format!("failed to read input directory {}", input_dir.display()))?;

    let mut pending = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_bundle = path.extension().is_some_and(|ext| ext == BUNDLE_EXTENSION)
            && entry.file_type().await?.is_file();
        if !is_bundle || skip.contains(&path) {
            continue;
        }
        if fs::try_exists(output_path(&path, output_dir)).await? {
            debug!("Skipping already mapped bundle {}", path.display());
            continue;
        }
        pending.push(path);
    }

    pending.sort();
    Ok(pending)
}

pub async fn read_bundle(path: &Path) -> Result<BlockBundle> {
    let contents = fs::read(path)
        .await
        .with_context(|| format!("failed to read bundle {}", path.display()))?;
    serde_json::from_slice(&contents)
        .with_context(|| format!("failed to parse bundle {}", path.display()))
}

/// Writes the mapped block next to its siblings in `output_dir`. The file is
/// written under a temporary name first so readers never see a partial file.
pub async fn write_operations(
    bundle: &Path,
    output_dir: &Path,
    block: &MappedBlock,
) -> Result<PathBuf> {
    let target = output_path(bundle, output_dir);
    let tmp = target.with_extension("tmp");

    let json = serde_json::to_vec_pretty(block).context("failed to serialize mapped block")?;
    fs::write(&tmp, json)
        .await
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, &target)
        .await
        .with_context(|| format!("failed to move output into place at {}", target.display()))?;

    info!(
        "Wrote block {} ({} transactions) to {}",
        block.block_identifier.index,
        block.transactions.len(),
        target.display()
    );
    Ok(target)
}
