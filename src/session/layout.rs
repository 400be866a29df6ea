//! Dataset root discovery and class map loading.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::YoloclsError;

const IMAGES_DIR: &str = "images";
const LABEL_DIR_NAMES: [&str; 2] = ["labels", "labelTxt"];

/// Image and label directories found under a dataset root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetLayout {
    pub root: PathBuf,
    pub images_dir: PathBuf,
    pub labels_dir: PathBuf,
}

impl DatasetLayout {
    /// Scans the immediate subdirectories of `root`.
    ///
    /// `images` is the image source. `labels` and `labelTxt` are both accepted
    /// as the label source; entries are visited in sorted order and the last
    /// match wins, so `labels` takes precedence when both exist.
    pub fn discover(root: &Path) -> Result<Self, YoloclsError> {
        if !root.is_dir() {
            return Err(YoloclsError::DatasetLayoutInvalid {
                path: root.to_path_buf(),
                message: "dataset root must be a directory".to_string(),
            });
        }

        let mut names: Vec<String> = fs::read_dir(root)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .collect();
        names.sort();

        let mut images_dir = None;
        let mut labels_dir = None;
        for name in names {
            if name == IMAGES_DIR {
                images_dir = Some(root.join(&name));
            } else if LABEL_DIR_NAMES.contains(&name.as_str()) {
                labels_dir = Some(root.join(&name));
            }
        }

        let images_dir = images_dir.ok_or_else(|| YoloclsError::DatasetLayoutInvalid {
            path: root.to_path_buf(),
            message: "missing images/ directory".to_string(),
        })?;
        let labels_dir = labels_dir.ok_or_else(|| YoloclsError::DatasetLayoutInvalid {
            path: root.to_path_buf(),
            message: "missing labels/ or labelTxt/ directory".to_string(),
        })?;

        Ok(Self {
            root: root.to_path_buf(),
            images_dir,
            labels_dir,
        })
    }

    /// Regular, non-hidden files directly inside the image directory, sorted
    /// by file name.
    pub fn list_images(&self) -> Result<Vec<PathBuf>, YoloclsError> {
        let mut images: Vec<PathBuf> = fs::read_dir(&self.images_dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
            .map(|entry| entry.path())
            .collect();
        images.sort();
        Ok(images)
    }

    /// Label path for an image: same stem, `.txt`, inside the label directory.
    pub fn label_path_for(&self, image_path: &Path) -> PathBuf {
        let mut file_name = image_path
            .file_stem()
            .unwrap_or(image_path.as_os_str())
            .to_os_string();
        file_name.push(".txt");
        self.labels_dir.join(file_name)
    }

    /// Reads class names from `data.yaml` or `classes.txt` in the root, in
    /// that order of preference. Returns an empty list when neither exists.
    pub fn read_class_names(&self) -> Result<Vec<String>, YoloclsError> {
        let data_yaml = self.root.join("data.yaml");
        let classes_txt = self.root.join("classes.txt");
        if data_yaml.is_file() {
            read_data_yaml_names(&data_yaml)
        } else if classes_txt.is_file() {
            read_classes_txt(&classes_txt)
        } else {
            Ok(Vec::new())
        }
    }
}

#[derive(Debug, Deserialize)]
struct DataYaml {
    names: DataYamlNames,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DataYamlNames {
    Sequence(Vec<String>),
    Mapping(BTreeMap<usize, String>),
}

fn read_data_yaml_names(path: &Path) -> Result<Vec<String>, YoloclsError> {
    let data = fs::read_to_string(path)?;
    let parsed: DataYaml =
        serde_yaml::from_str(&data).map_err(|source| YoloclsError::DataYamlParse {
            path: path.to_path_buf(),
            source,
        })?;

    let names = match parsed.names {
        DataYamlNames::Sequence(names) => names,
        DataYamlNames::Mapping(mapping) => {
            let Some(max_index) = mapping.keys().max().copied() else {
                return Ok(Vec::new());
            };
            let mut names = vec![String::new(); max_index + 1];
            for (index, name) in mapping {
                names[index] = name;
            }
            for (index, name) in names.iter_mut().enumerate() {
                if name.trim().is_empty() {
                    *name = format!("class_{index}");
                }
            }
            names
        }
    };

    Ok(names)
}

fn read_classes_txt(path: &Path) -> Result<Vec<String>, YoloclsError> {
    let data = fs::read_to_string(path)?;
    let mut names = Vec::new();

    for (line_idx, line) in data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if data.lines().skip(line_idx).all(|rest| rest.trim().is_empty()) {
                break;
            }
            return Err(YoloclsError::ClassesTxtInvalid {
                path: path.to_path_buf(),
                message: format!("line {} is empty", line_idx + 1),
            });
        }
        names.push(trimmed.to_string());
    }

    Ok(names)
}
