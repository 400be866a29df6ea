//! Reading and rewriting label files.

use std::fs;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use super::{classify_line, LineFormat, OneHot};
use crate::error::YoloclsError;

/// What a label file currently says about its image.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelState {
    /// Number of lines, ignoring trailing blank lines.
    pub line_count: usize,
    /// The last non-blank line, trimmed.
    pub last_line: Option<String>,
    /// Format of the last line.
    pub last_format: Option<LineFormat>,
    /// Format of the first line.
    pub first_format: Option<LineFormat>,
    /// The selection currently stored in the file. All zero unless the last
    /// line is a valid one-hot line.
    pub current: OneHot,
}

/// How [`write_one_hot`] placed the new line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    /// The file had no lines; the one-hot line is now the only line.
    Sole,
    /// The last line was one-hot and was replaced.
    Replaced,
    /// The last line was something else and the one-hot line was appended.
    Appended,
}

/// Reads a label file and works out its current one-hot state.
pub fn read_label_state(path: &Path, class_count: usize) -> Result<LabelState, YoloclsError> {
    let content = fs::read_to_string(path).map_err(|err| missing_or_io(path, err))?;
    let lines = split_lines(&content);

    let first_format = lines.first().map(|line| classify_line(line, class_count));
    let last_line = lines.last().map(|line| line.trim().to_string());
    let last_format = last_line
        .as_deref()
        .map(|line| classify_line(line, class_count));

    let current = match &last_format {
        Some(LineFormat::OneHot(one_hot)) => one_hot.clone(),
        _ => OneHot::zeros(class_count),
    };

    Ok(LabelState {
        line_count: lines.len(),
        last_line,
        last_format,
        first_format,
        current,
    })
}

/// Writes `one_hot` as the last line of the label file at `path`.
///
/// The file is opened once, read in full, truncated and rewritten. A trailing
/// one-hot line is replaced in place; any other trailing line is kept and the
/// one-hot line is appended after it. Lines are rejoined with `\r\n` when the
/// file already used it, `\n` otherwise. No trailing newline is written.
pub fn write_one_hot(path: &Path, one_hot: &OneHot) -> Result<WriteMode, YoloclsError> {
    let mut file = fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|err| missing_or_io(path, err))?;

    let mut content = String::new();
    file.read_to_string(&mut content)?;

    let mut lines: Vec<String> = split_lines(&content)
        .into_iter()
        .map(str::to_string)
        .collect();
    let newline = if content.contains("\r\n") { "\r\n" } else { "\n" };
    let new_line = one_hot.to_string();

    let last_is_one_hot = lines
        .last()
        .map(|last| OneHot::parse(last, one_hot.len()).is_some());

    let mode = match last_is_one_hot {
        Some(true) => {
            let last = lines.len() - 1;
            lines[last] = new_line;
            WriteMode::Replaced
        }
        Some(false) => {
            lines.push(new_line);
            WriteMode::Appended
        }
        None => {
            lines.push(new_line);
            WriteMode::Sole
        }
    };

    file.seek(SeekFrom::Start(0))?;
    file.set_len(0)?;
    file.write_all(lines.join(newline).as_bytes())?;
    file.flush()?;

    Ok(mode)
}

/// Splits on newlines and drops trailing blank lines.
fn split_lines(content: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = content.lines().collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    lines
}

fn missing_or_io(path: &Path, err: io::Error) -> YoloclsError {
    if err.kind() == io::ErrorKind::NotFound {
        YoloclsError::LabelMissing {
            path: path.to_path_buf(),
        }
    } else {
        YoloclsError::Io(err)
    }
}
