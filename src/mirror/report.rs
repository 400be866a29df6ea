//! Overwrite report types.
//!
//! Every source file found during an overwrite run ends up as exactly one
//! [`CopyOutcome`], so a report can be printed, serialized, or checked
//! programmatically after the run.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// The result of one overwrite run.
#[derive(Clone, Debug, Serialize)]
pub struct OverwriteReport {
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    /// Number of distinct file names in the target index.
    pub indexed: usize,
    /// One entry per source file, sorted by source path.
    pub outcomes: Vec<CopyOutcome>,
}

impl OverwriteReport {
    pub fn new(
        source_dir: &Path,
        target_dir: &Path,
        indexed: usize,
        mut outcomes: Vec<CopyOutcome>,
    ) -> Self {
        outcomes.sort_by(|a, b| a.source.cmp(&b.source));
        Self {
            source_dir: source_dir.to_path_buf(),
            target_dir: target_dir.to_path_buf(),
            indexed,
            outcomes,
        }
    }

    pub fn copied_count(&self) -> usize {
        self.count(|s| matches!(s, CopyStatus::Copied { .. }))
    }

    pub fn planned_count(&self) -> usize {
        self.count(|s| matches!(s, CopyStatus::Planned))
    }

    /// Unmatched sources plus sources superseded by a same-named file.
    pub fn skipped_count(&self) -> usize {
        self.count(|s| matches!(s, CopyStatus::Skipped | CopyStatus::Superseded { .. }))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|s| matches!(s, CopyStatus::Failed { .. }))
    }

    /// Returns true if no copy failed.
    pub fn is_ok(&self) -> bool {
        self.failed_count() == 0
    }

    fn count(&self, pred: impl Fn(&CopyStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

impl fmt::Display for OverwriteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Overwrite {} -> {} ({} indexed target file(s))",
            self.source_dir.display(),
            self.target_dir.display(),
            self.indexed
        )?;

        for outcome in &self.outcomes {
            writeln!(f, "  {}", outcome)?;
        }

        write!(
            f,
            "{} copied, {} skipped, {} failed",
            self.copied_count(),
            self.skipped_count(),
            self.failed_count()
        )?;
        if self.planned_count() > 0 {
            write!(f, ", {} planned (dry run)", self.planned_count())?;
        }
        writeln!(f)
    }
}

/// What happened to one source file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CopyOutcome {
    pub source: PathBuf,
    /// The matching target file, if the name was found in the target index.
    pub target: Option<PathBuf>,
    pub status: CopyStatus,
}

impl CopyOutcome {
    pub fn copied(source: &Path, target: &Path, bytes: u64) -> Self {
        Self::with_target(source, target, CopyStatus::Copied { bytes })
    }

    pub fn planned(source: &Path, target: &Path) -> Self {
        Self::with_target(source, target, CopyStatus::Planned)
    }

    pub fn failed(source: &Path, target: &Path, message: impl Into<String>) -> Self {
        Self::with_target(
            source,
            target,
            CopyStatus::Failed {
                message: message.into(),
            },
        )
    }

    pub fn skipped(source: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            target: None,
            status: CopyStatus::Skipped,
        }
    }

    pub fn superseded(source: &Path, target: &Path, by: &Path) -> Self {
        Self::with_target(
            source,
            target,
            CopyStatus::Superseded {
                by: by.to_path_buf(),
            },
        )
    }

    fn with_target(source: &Path, target: &Path, status: CopyStatus) -> Self {
        Self {
            source: source.to_path_buf(),
            target: Some(target.to_path_buf()),
            status,
        }
    }
}

impl fmt::Display for CopyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = self
            .target
            .as_deref()
            .map(|t| t.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        match &self.status {
            CopyStatus::Copied { bytes } => write!(
                f,
                "[OK  ] {} -> {} ({} bytes)",
                self.source.display(),
                target,
                bytes
            ),
            CopyStatus::Planned => write!(f, "[PLAN] {} -> {}", self.source.display(), target),
            CopyStatus::Skipped => write!(
                f,
                "[SKIP] {}: no matching file in target",
                self.source.display()
            ),
            CopyStatus::Superseded { by } => write!(
                f,
                "[SKIP] {}: {} -> {} instead",
                self.source.display(),
                by.display(),
                target
            ),
            CopyStatus::Failed { message } => write!(
                f,
                "[FAIL] {} -> {}: {}",
                self.source.display(),
                target,
                message
            ),
        }
    }
}

/// Status of one copy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CopyStatus {
    Copied { bytes: u64 },
    /// Matched but not copied because the run was a dry run.
    Planned,
    /// No target file with the same name.
    Skipped,
    /// Another source with the same name was copied to the target instead.
    Superseded { by: PathBuf },
    Failed { message: String },
}
