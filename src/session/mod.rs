//! Label annotation session.
//!
//! A session holds one open dataset (image directory, label directory and an
//! ordered class list) and a cursor over its images. For the image under the
//! cursor it reads the label file, shows the stored one-hot selection as a
//! set of single-choice options, and writes the user's choice back as the
//! last line of the label file before moving on.

mod layout;

pub use layout::DatasetLayout;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::YoloclsError;
use crate::label::{read_label_state, write_one_hot, LineFormat, OneHot, WriteMode};

/// A dataset opened for annotation.
#[derive(Clone, Debug)]
pub struct Dataset {
    pub layout: DatasetLayout,
    /// Class names; position is the one-hot index.
    pub classes: Vec<String>,
}

impl Dataset {
    /// Discovers the layout under `root` and attaches `classes`.
    ///
    /// When `classes` is empty the names are read from `data.yaml` or
    /// `classes.txt` in the root.
    pub fn load(root: &Path, classes: Vec<String>) -> Result<Self, YoloclsError> {
        let layout = DatasetLayout::discover(root)?;
        let classes = if classes.is_empty() {
            layout.read_class_names()?
        } else {
            classes
        };

        if classes.is_empty() {
            return Err(YoloclsError::NoClasses {
                root: root.to_path_buf(),
            });
        }

        Ok(Self { layout, classes })
    }

    pub fn image_directory(&self) -> &Path {
        &self.layout.images_dir
    }

    pub fn label_directory(&self) -> &Path {
        &self.layout.labels_dir
    }
}

/// Session behavior switches.
#[derive(Clone, Copy, Debug, Default)]
pub struct SessionOptions {
    /// Leave the label file untouched when saving with no option selected.
    /// By default an all-zero vector is written.
    pub skip_unselected: bool,
}

/// Navigation direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// One selectable class option.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub index: usize,
    pub name: String,
    pub selected: bool,
}

/// Everything shown for the image under the cursor.
#[derive(Clone, Debug, Serialize)]
pub struct ImageView {
    pub index: usize,
    pub image_count: usize,
    pub image_path: PathBuf,
    pub label_path: PathBuf,
    /// Non-blank lines in the label file, including the one-hot line.
    pub label_lines: usize,
    pub width: usize,
    pub height: usize,
    /// The stored one-hot line, when the label file already has one.
    pub label_text: Option<String>,
    pub choices: Vec<Choice>,
    /// Non-fatal notes, e.g. an unrecognized label format on first open.
    pub warnings: Vec<String>,
}

impl ImageView {
    /// Index of the pre-selected option.
    pub fn selected(&self) -> Option<usize> {
        self.choices.iter().find(|c| c.selected).map(|c| c.index)
    }

    fn file_name(&self) -> String {
        self.image_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl fmt::Display for ImageView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Image ID: {} of {}", self.index, self.image_count)?;
        writeln!(
            f,
            "Filename: {} ({}x{})",
            self.file_name(),
            self.width,
            self.height
        )?;
        writeln!(
            f,
            "Label: {} ({} line(s))",
            self.label_path.display(),
            self.label_lines
        )?;
        writeln!(
            f,
            "TXT Content: {}",
            self.label_text.as_deref().unwrap_or_default()
        )?;
        for choice in &self.choices {
            let mark = if choice.selected { '*' } else { ' ' };
            writeln!(f, "  ({}) [{}] {}", mark, choice.index, choice.name)?;
        }
        for warning in &self.warnings {
            writeln!(f, "  warning: {}", warning)?;
        }
        Ok(())
    }
}

/// A single-threaded annotation session over one dataset.
#[derive(Debug)]
pub struct AnnotationSession {
    dataset: Dataset,
    images: Vec<PathBuf>,
    cursor: usize,
    view: Option<ImageView>,
    selection: Option<usize>,
    has_ever_opened: Vec<bool>,
    options: SessionOptions,
}

/// Loads the dataset at `root` and opens a session on it.
pub fn load(
    root: &Path,
    classes: Vec<String>,
    options: SessionOptions,
) -> Result<AnnotationSession, YoloclsError> {
    AnnotationSession::open(Dataset::load(root, classes)?, options)
}

impl AnnotationSession {
    /// Freezes the sorted image index and positions the cursor at image 0.
    ///
    /// Nothing is displayed yet; call [`AnnotationSession::display`].
    pub fn open(dataset: Dataset, options: SessionOptions) -> Result<Self, YoloclsError> {
        let images = dataset.layout.list_images()?;
        if images.is_empty() {
            return Err(YoloclsError::NoImages {
                path: dataset.layout.images_dir.clone(),
            });
        }

        info!(
            images = images.len(),
            classes = dataset.classes.len(),
            "Opened dataset {}",
            dataset.layout.root.display()
        );

        let has_ever_opened = vec![false; images.len()];
        Ok(Self {
            dataset,
            images,
            cursor: 0,
            view: None,
            selection: None,
            has_ever_opened,
            options,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn classes(&self) -> &[String] {
        &self.dataset.classes
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_view(&self) -> Option<&ImageView> {
        self.view.as_ref()
    }

    /// The pending selection that the next save will write.
    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    pub fn has_ever_opened(&self, index: usize) -> bool {
        self.has_ever_opened.get(index).copied().unwrap_or(false)
    }

    /// Moves the cursor to `index` and loads its image and label state.
    ///
    /// On failure the view and pending selection are cleared but the cursor
    /// stays on `index`, so the caller can still navigate away.
    pub fn display(&mut self, index: usize) -> Result<&ImageView, YoloclsError> {
        let count = self.images.len();
        if index >= count {
            return Err(YoloclsError::ImageIndexOutOfRange { index, count });
        }

        self.cursor = index;
        self.view = None;
        self.selection = None;

        let view = match self.build_view(index) {
            Ok(view) => view,
            Err(err) => {
                warn!("Failed to load image or label at index {}: {}", index, err);
                return Err(err);
            }
        };

        self.selection = view.selected();
        self.has_ever_opened[index] = true;
        Ok(self.view.insert(view))
    }

    /// Sets the pending selection. `None` clears it.
    pub fn select(&mut self, option: Option<usize>) -> Result<(), YoloclsError> {
        let count = self.dataset.classes.len();
        if let Some(index) = option {
            if index >= count {
                return Err(YoloclsError::ClassIndexOutOfRange { index, count });
            }
        }
        self.selection = option;
        if let Some(view) = self.view.as_mut() {
            for choice in &mut view.choices {
                choice.selected = Some(choice.index) == option;
            }
        }
        Ok(())
    }

    /// Writes the pending selection as the last line of the current label file.
    ///
    /// Returns `None` when nothing was written: no image is displayed, or the
    /// selection is empty and the session skips unselected images.
    pub fn save_annotation(&mut self) -> Result<Option<WriteMode>, YoloclsError> {
        let Some(view) = self.view.as_ref() else {
            return Ok(None);
        };
        if self.selection.is_none() && self.options.skip_unselected {
            debug!("No selection for {}, leaving label untouched", view.label_path.display());
            return Ok(None);
        }

        let label_path = view.label_path.clone();
        let one_hot = OneHot::from_selection(self.dataset.classes.len(), self.selection)?;
        let mode = write_one_hot(&label_path, &one_hot)?;
        info!(
            "Saved '{}' to {} ({:?})",
            one_hot,
            label_path.display(),
            mode
        );

        if let Some(view) = self.view.as_mut() {
            view.label_text = Some(one_hot.to_string());
            match mode {
                WriteMode::Sole => view.label_lines = 1,
                WriteMode::Appended => view.label_lines += 1,
                WriteMode::Replaced => {}
            }
        }
        Ok(Some(mode))
    }

    /// Saves, moves the cursor one step (wrapping), and displays the new image.
    ///
    /// A failed save leaves the cursor where it was.
    pub fn advance(&mut self, direction: Direction) -> Result<&ImageView, YoloclsError> {
        self.save_annotation()?;

        let count = self.images.len();
        let next = match direction {
            Direction::Next => (self.cursor + 1) % count,
            Direction::Previous => (self.cursor + count - 1) % count,
        };
        self.display(next)
    }

    /// Saves the pending selection one last time and ends the session.
    pub fn close(mut self) -> Result<Option<WriteMode>, YoloclsError> {
        let mode = self.save_annotation()?;
        info!("Closed dataset {}", self.dataset.layout.root.display());
        Ok(mode)
    }

    fn build_view(&self, index: usize) -> Result<ImageView, YoloclsError> {
        let image_path = self.images[index].clone();
        let size = imagesize::size(&image_path).map_err(|source| {
            YoloclsError::ImageUnreadable {
                path: image_path.clone(),
                source,
            }
        })?;

        let label_path = self.dataset.layout.label_path_for(&image_path);
        let state = read_label_state(&label_path, self.dataset.classes.len())?;

        let mut warnings = Vec::new();
        if !self.has_ever_opened[index] {
            if let Some(LineFormat::Unrecognized { reason }) = &state.first_format {
                let message = format!(
                    "unrecognised label format in {}: {}",
                    label_path.display(),
                    reason
                );
                warn!("{}", message);
                warnings.push(message);
            }
        }

        let label_text = match state.last_format {
            Some(LineFormat::OneHot(_)) => state.last_line,
            _ => None,
        };

        let selected = state.current.selected();
        let choices = self
            .dataset
            .classes
            .iter()
            .enumerate()
            .map(|(i, name)| Choice {
                index: i,
                name: name.clone(),
                selected: selected == Some(i),
            })
            .collect();

        Ok(ImageView {
            index,
            image_count: self.images.len(),
            image_path,
            label_path,
            label_lines: state.line_count,
            width: size.width,
            height: size.height,
            label_text,
            choices,
            warnings,
        })
    }
}
