// src/publish.rs

use glob::{glob, Pattern};
use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

use crate::error::{FlowError, Result};

/// What a mirror pass changed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MirrorStats {
    pub copied: usize,
    pub removed: usize,
}

/// Copy freshly written files into `docs_dir`, keeping their file names.
pub fn copy_outputs(files: &[PathBuf], docs_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(docs_dir).map_err(|e| FlowError::io(docs_dir, e))?;
    let mut out = Vec::with_capacity(files.len());
    for src in files {
        let Some(name) = src.file_name() else {
            warn!(path = %src.display(), "skipping path without a file name");
            continue;
        };
        let dst = docs_dir.join(name);
        fs::copy(src, &dst).map_err(|e| FlowError::io(&dst, e))?;
        debug!(from = %src.display(), to = %dst.display(), "published");
        out.push(dst);
    }
    Ok(out)
}

/// Relative paths of everything under `root` (files and directories).
fn relative_entries(root: &Path) -> Result<BTreeSet<PathBuf>> {
    let pattern = format!("{}/**/*", Pattern::escape(&root.to_string_lossy()));
    let mut set = BTreeSet::new();
    let paths = glob(&pattern).map_err(|e| FlowError::Config(format!("{}: {}", pattern, e)))?;
    for entry in paths {
        match entry {
            Ok(path) => {
                if let Ok(rel) = path.strip_prefix(root) {
                    set.insert(rel.to_path_buf());
                }
            }
            Err(e) => warn!(error = %e, "unreadable path while scanning"),
        }
    }
    Ok(set)
}

/// Make `dst` an exact copy of `src`: copy every file across and delete
/// anything in `dst` that has no counterpart in `src`.
#[instrument(level = "info", skip_all, fields(src = %src.display(), dst = %dst.display()))]
pub fn mirror_dir(src: &Path, dst: &Path) -> Result<MirrorStats> {
    if !src.is_dir() {
        return Err(FlowError::io(
            src,
            std::io::Error::new(std::io::ErrorKind::NotFound, "source directory missing"),
        ));
    }
    fs::create_dir_all(dst).map_err(|e| FlowError::io(dst, e))?;

    let mut stats = MirrorStats::default();
    let src_entries = relative_entries(src)?;

    for rel in &src_entries {
        let from = src.join(rel);
        let to = dst.join(rel);
        if from.is_dir() {
            if to.is_file() {
                fs::remove_file(&to).map_err(|e| FlowError::io(&to, e))?;
            }
            fs::create_dir_all(&to).map_err(|e| FlowError::io(&to, e))?;
        } else {
            if to.is_dir() {
                fs::remove_dir_all(&to).map_err(|e| FlowError::io(&to, e))?;
            }
            if let Some(parent) = to.parent() {
                fs::create_dir_all(parent).map_err(|e| FlowError::io(parent, e))?;
            }
            fs::copy(&from, &to).map_err(|e| FlowError::io(&to, e))?;
            stats.copied += 1;
        }
    }

    // deepest first, so children go before their directories
    let mut stale: Vec<PathBuf> = relative_entries(dst)?
        .into_iter()
        .filter(|rel| !src_entries.contains(rel))
        .collect();
    stale.sort_by_key(|p| std::cmp::Reverse(p.components().count()));

    for rel in stale {
        let path = dst.join(&rel);
        if path.is_dir() {
            fs::remove_dir_all(&path).map_err(|e| FlowError::io(&path, e))?;
        } else if path.exists() {
            fs::remove_file(&path).map_err(|e| FlowError::io(&path, e))?;
        } else {
            continue;
        }
        debug!(path = %rel.display(), "removed stale entry");
        stats.removed += 1;
    }

    info!(copied = stats.copied, removed = stats.removed, "mirror complete");
    Ok(stats)
}
