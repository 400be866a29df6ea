//! Batch conversion of legacy box labels to one-hot lines.
//!
//! For each image whose label file still ends in a box line, the class of
//! the first box line is looked up and the matching one-hot line is appended.
//! Horizontal rows carry a class index; oriented rows carry a class name that
//! must appear in the class list. Files that already end in a one-hot line
//! are left alone.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::YoloclsError;
use crate::label::{read_label_state, write_one_hot, LabelState, LineFormat, OneHot};
use crate::session::Dataset;

/// Per-file result of a conversion run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ConvertAction {
    /// A one-hot line selecting `class_index` was appended.
    Converted { class_index: usize },
    /// The last line is already one-hot.
    AlreadyConverted,
    /// The label file has no lines.
    Empty,
    /// The box line names a class that is not in the class list.
    UnknownClass { class: String },
    /// The lines are neither box lines nor one-hot.
    Unrecognized { reason: String },
    LabelMissing,
    Failed { message: String },
}

#[derive(Clone, Debug, Serialize)]
pub struct ConvertEntry {
    pub label_path: PathBuf,
    #[serde(flatten)]
    pub action: ConvertAction,
}

/// Summary of a conversion run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ConvertReport {
    pub entries: Vec<ConvertEntry>,
}

impl ConvertReport {
    pub fn converted_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.action, ConvertAction::Converted { .. }))
            .count()
    }

    /// Entries that could not be converted (unknown class, unrecognized,
    /// missing label, I/O failure).
    pub fn problem_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| {
                !matches!(
                    e.action,
                    ConvertAction::Converted { .. }
                        | ConvertAction::AlreadyConverted
                        | ConvertAction::Empty
                )
            })
            .count()
    }
}

impl fmt::Display for ConvertReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            let path = entry.label_path.display();
            match &entry.action {
                ConvertAction::Converted { class_index } => {
                    writeln!(f, "  converted  {} -> class {}", path, class_index)?
                }
                ConvertAction::AlreadyConverted => writeln!(f, "  unchanged  {}", path)?,
                ConvertAction::Empty => writeln!(f, "  empty      {}", path)?,
                ConvertAction::UnknownClass { class } => {
                    writeln!(f, "  skipped    {}: unknown class '{}'", path, class)?
                }
                ConvertAction::Unrecognized { reason } => {
                    writeln!(f, "  skipped    {}: {}", path, reason)?
                }
                ConvertAction::LabelMissing => writeln!(f, "  missing    {}", path)?,
                ConvertAction::Failed { message } => {
                    writeln!(f, "  failed     {}: {}", path, message)?
                }
            }
        }
        writeln!(
            f,
            "{} converted, {} problem(s), {} file(s) total",
            self.converted_count(),
            self.problem_count(),
            self.entries.len()
        )
    }
}

/// Appends one-hot lines to every label file that still ends in a box line.
pub fn convert_legacy_labels(dataset: &Dataset) -> Result<ConvertReport, YoloclsError> {
    let class_count = dataset.classes.len();
    let mut report = ConvertReport::default();

    for image in dataset.layout.list_images()? {
        let label_path = dataset.layout.label_path_for(&image);
        let action = match read_label_state(&label_path, class_count) {
            Ok(state) => convert_one(dataset, &label_path, &state),
            Err(YoloclsError::LabelMissing { .. }) => ConvertAction::LabelMissing,
            Err(err) => ConvertAction::Failed {
                message: err.to_string(),
            },
        };

        match &action {
            ConvertAction::Converted { class_index } => info!(
                "Converted {} to class {}",
                label_path.display(),
                class_index
            ),
            ConvertAction::AlreadyConverted | ConvertAction::Empty => {}
            other => warn!("Not converted {}: {:?}", label_path.display(), other),
        }

        report.entries.push(ConvertEntry { label_path, action });
    }

    Ok(report)
}

fn convert_one(dataset: &Dataset, label_path: &Path, state: &LabelState) -> ConvertAction {
    let class_count = dataset.classes.len();
    match &state.last_format {
        None => return ConvertAction::Empty,
        Some(LineFormat::OneHot(_)) => return ConvertAction::AlreadyConverted,
        Some(LineFormat::Unrecognized { reason }) => {
            return ConvertAction::Unrecognized {
                reason: reason.clone(),
            }
        }
        Some(LineFormat::Horizontal(_) | LineFormat::Oriented(_)) => {}
    }

    let class_index = match &state.first_format {
        Some(LineFormat::Horizontal(row)) if row.class_id < class_count => row.class_id,
        Some(LineFormat::Horizontal(row)) => {
            return ConvertAction::UnknownClass {
                class: row.class_id.to_string(),
            }
        }
        Some(LineFormat::Oriented(row)) => {
            match dataset.classes.iter().position(|c| *c == row.class_name) {
                Some(index) => index,
                None => {
                    return ConvertAction::UnknownClass {
                        class: row.class_name.clone(),
                    }
                }
            }
        }
        _ => {
            return ConvertAction::Unrecognized {
                reason: "first line is not a box line".to_string(),
            }
        }
    };

    let one_hot = match OneHot::from_selection(class_count, Some(class_index)) {
        Ok(one_hot) => one_hot,
        Err(err) => {
            return ConvertAction::Failed {
                message: err.to_string(),
            }
        }
    };

    match write_one_hot(label_path, &one_hot) {
        Ok(_) => ConvertAction::Converted { class_index },
        Err(err) => ConvertAction::Failed {
            message: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn dataset_with(root: &Path, labels: &[(&str, Option<&str>)]) -> Dataset {
        fs::create_dir_all(root.join("images")).expect("images");
        fs::create_dir_all(root.join("labels")).expect("labels");
        for (stem, label) in labels {
            fs::write(root.join("images").join(format!("{stem}.jpg")), b"x").expect("image");
            if let Some(label) = label {
                fs::write(root.join("labels").join(format!("{stem}.txt")), label)
                    .expect("label");
            }
        }
        Dataset::load(
            root,
            vec!["plane".to_string(), "ship".to_string(), "car".to_string()],
        )
        .expect("load dataset")
    }

    #[test]
    fn converts_horizontal_and_oriented_rows() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let dataset = dataset_with(
            temp.path(),
            &[
                ("a", Some("2 0.5 0.5 0.1 0.1\n0 0.2 0.2 0.1 0.1\n")),
                ("b", Some("1 1 9 1 9 9 1 9 ship 0.7")),
            ],
        );

        let report = convert_legacy_labels(&dataset).expect("convert");
        assert_eq!(report.converted_count(), 2);
        assert_eq!(
            fs::read_to_string(temp.path().join("labels/a.txt")).expect("read a"),
            "2 0.5 0.5 0.1 0.1\n0 0.2 0.2 0.1 0.1\n0 0 1"
        );
        assert_eq!(
            fs::read_to_string(temp.path().join("labels/b.txt")).expect("read b"),
            "1 1 9 1 9 9 1 9 ship 0.7\n0 1 0"
        );
    }

    #[test]
    fn leaves_converted_and_empty_files_alone() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let dataset = dataset_with(
            temp.path(),
            &[("a", Some("0 0.5 0.5 0.1 0.1\n1 0 0")), ("b", Some(""))],
        );

        let report = convert_legacy_labels(&dataset).expect("convert");
        assert_eq!(report.converted_count(), 0);
        assert_eq!(report.problem_count(), 0);
        assert_eq!(report.entries[0].action, ConvertAction::AlreadyConverted);
        assert_eq!(report.entries[1].action, ConvertAction::Empty);
    }

    #[test]
    fn reports_unknown_classes_and_missing_labels() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let dataset = dataset_with(
            temp.path(),
            &[
                ("a", Some("7 0.5 0.5 0.1 0.1")),
                ("b", Some("1 1 9 1 9 9 1 9 tank 0.7")),
                ("c", None),
            ],
        );

        let report = convert_legacy_labels(&dataset).expect("convert");
        assert_eq!(report.problem_count(), 3);
        assert_eq!(
            report.entries[0].action,
            ConvertAction::UnknownClass {
                class: "7".to_string()
            }
        );
        assert_eq!(
            report.entries[1].action,
            ConvertAction::UnknownClass {
                class: "tank".to_string()
            }
        );
        assert_eq!(report.entries[2].action, ConvertAction::LabelMissing);
        assert_eq!(
            fs::read_to_string(temp.path().join("labels/a.txt")).expect("read a"),
            "7 0.5 0.5 0.1 0.1"
        );
    }
}
