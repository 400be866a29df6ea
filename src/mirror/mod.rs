//! Directory mirror copier.
//!
//! Overwrites `.txt` files in a target tree with same-named files from a
//! source tree. Files are matched by file name only, wherever they sit in
//! either tree, so a target file keeps its location and only its content and
//! timestamps change.
//!
//! The target index is built first, on the calling thread. Copies are then
//! fanned out over a rayon pool and the run returns once every copy has
//! finished.

pub mod report;

pub use report::{CopyOutcome, CopyStatus, OverwriteReport};

use std::collections::HashMap;
use std::fs::{self, File, FileTimes};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::error::YoloclsError;

const LABEL_SUFFIX: &str = ".txt";

/// Options for an overwrite run.
#[derive(Clone, Debug, Default)]
pub struct OverwriteOptions {
    /// Worker threads for the copy pool. `None` uses rayon's default.
    pub workers: Option<usize>,
    /// Match files and report what would be copied without copying.
    pub dry_run: bool,
}

/// Returns true for names ending in `.txt` that are not hidden.
pub fn is_label_file_name(name: &str) -> bool {
    name.ends_with(LABEL_SUFFIX) && !name.starts_with('.')
}

/// Maps file name to full path for every label file under `target_dir`.
///
/// When two files share a name, the one visited later wins. Visit order
/// follows the directory scan and is not guaranteed.
pub fn build_target_index(target_dir: &Path) -> Result<HashMap<String, PathBuf>, YoloclsError> {
    let mut index = HashMap::new();
    for path in collect_label_files(target_dir)? {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            index.insert(name.to_string(), path.clone());
        }
    }
    Ok(index)
}

/// Copies `source` over `target`, including permissions and timestamps.
///
/// Never fails: the result is logged and returned as a [`CopyOutcome`].
pub fn copy_file(source: &Path, target: &Path) -> CopyOutcome {
    match try_copy_file(source, target) {
        Ok(bytes) => {
            info!("Overwrote {} -> {}", source.display(), target.display());
            CopyOutcome::copied(source, target, bytes)
        }
        Err(err) => {
            error!("{}", err);
            CopyOutcome::failed(source, target, err.to_string())
        }
    }
}

/// Overwrites every file in `target_dir` that has a same-named file in
/// `source_dir`.
///
/// Fails before doing any work if either directory is missing. Per-file
/// failures and unmatched source files are recorded in the report.
pub fn overwrite(
    source_dir: &Path,
    target_dir: &Path,
    options: &OverwriteOptions,
) -> Result<OverwriteReport, YoloclsError> {
    if !source_dir.is_dir() {
        error!("Source directory does not exist: {}", source_dir.display());
        return Err(YoloclsError::SourceDirMissing {
            path: source_dir.to_path_buf(),
        });
    }
    if !target_dir.is_dir() {
        error!("Target directory does not exist: {}", target_dir.display());
        return Err(YoloclsError::TargetDirMissing {
            path: target_dir.to_path_buf(),
        });
    }

    info!("Building index of {}...", target_dir.display());
    let index = build_target_index(target_dir)?;
    info!("Index built with {} file(s)", index.len());

    let mut sources = collect_label_files(source_dir)?;
    sources.sort();

    // One job per target path. Same-named sources are visited in sorted
    // order and the last one wins.
    let mut outcomes = Vec::new();
    let mut jobs: Vec<(PathBuf, PathBuf)> = Vec::new();
    let mut job_for_target: HashMap<PathBuf, usize> = HashMap::new();
    for source in sources {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let Some(target) = index.get(&name) else {
            warn!("No matching file for {}, skipping", name);
            outcomes.push(CopyOutcome::skipped(&source));
            continue;
        };

        match job_for_target.get(target).copied() {
            Some(slot) => {
                let previous = std::mem::replace(&mut jobs[slot].0, source);
                warn!(
                    "Duplicate source name {}: {} replaces {}",
                    name,
                    jobs[slot].0.display(),
                    previous.display()
                );
                outcomes.push(CopyOutcome::superseded(&previous, target, &jobs[slot].0));
            }
            None => {
                job_for_target.insert(target.clone(), jobs.len());
                jobs.push((source, target.clone()));
            }
        }
    }

    if options.dry_run {
        outcomes.extend(
            jobs.iter()
                .map(|(source, target)| CopyOutcome::planned(source, target)),
        );
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.workers.unwrap_or(0))
            .build()?;
        let copied: Vec<CopyOutcome> = pool.install(|| {
            jobs.par_iter()
                .map(|(source, target)| copy_file(source, target))
                .collect()
        });
        outcomes.extend(copied);
    }

    let report = OverwriteReport::new(source_dir, target_dir, index.len(), outcomes);
    info!(
        copied = report.copied_count(),
        skipped = report.skipped_count(),
        failed = report.failed_count(),
        "Overwrite finished"
    );
    Ok(report)
}

fn try_copy_file(source: &Path, target: &Path) -> Result<u64, YoloclsError> {
    let copy_err = |source_err| YoloclsError::Copy {
        source_path: source.to_path_buf(),
        target_path: target.to_path_buf(),
        source: source_err,
    };

    let bytes = fs::copy(source, target).map_err(copy_err)?;

    let metadata = fs::metadata(source).map_err(copy_err)?;
    let mut times = FileTimes::new();
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    File::options()
        .write(true)
        .open(target)
        .and_then(|file| file.set_times(times))
        .map_err(copy_err)?;

    Ok(bytes)
}

/// All label files under `root`. Unreadable entries are logged and skipped.
fn collect_label_files(root: &Path) -> Result<Vec<PathBuf>, YoloclsError> {
    if !root.is_dir() {
        return Err(YoloclsError::Walk {
            path: root.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), err);
                continue;
            }
        };

        if entry.file_type().is_file()
            && entry
                .file_name()
                .to_str()
                .is_some_and(is_label_file_name)
        {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
