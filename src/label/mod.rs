//! Label line grammar.
//!
//! A label file holds one line per record. Three line shapes are recognized:
//!
//! - **horizontal box** (YOLO): `class_index x_center y_center width height`
//! - **oriented box** (YOLO-OBB / DOTA style): `x1 y1 x2 y2 x3 y3 x4 y4 class confidence`
//! - **one-hot**: one `0`/`1` token per class, at most one `1`
//!
//! Box lines are treated as legacy input. They are never rewritten, only
//! followed by a one-hot line once an image has been annotated.

mod file;

pub use file::{read_label_state, write_one_hot, LabelState, WriteMode};

use std::fmt;

use serde::Serialize;

use crate::error::YoloclsError;

/// Token count of a horizontal box line.
pub const HORIZONTAL_TOKENS: usize = 5;
/// Token count of an oriented box line.
pub const ORIENTED_TOKENS: usize = 10;

/// A single-choice selection over `len` classes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct OneHot {
    len: usize,
    hot: Option<usize>,
}

impl OneHot {
    /// An all-zero vector (no class selected).
    pub fn zeros(len: usize) -> Self {
        Self { len, hot: None }
    }

    /// A vector with `selection` set, or all zero when `selection` is `None`.
    pub fn from_selection(len: usize, selection: Option<usize>) -> Result<Self, YoloclsError> {
        if let Some(index) = selection {
            if index >= len {
                return Err(YoloclsError::ClassIndexOutOfRange { index, count: len });
            }
        }
        Ok(Self {
            len,
            hot: selection,
        })
    }

    /// Parses a one-hot line for `class_count` classes.
    ///
    /// The line qualifies when it has exactly `class_count` tokens, every token
    /// is `0` or `1`, and at most one token is `1`.
    pub fn parse(line: &str, class_count: usize) -> Option<Self> {
        if class_count == 0 {
            return None;
        }

        let mut len = 0;
        let mut hot = None;
        for token in line.split_whitespace() {
            match token {
                "0" => {}
                "1" if hot.is_none() => hot = Some(len),
                _ => return None,
            }
            len += 1;
            if len > class_count {
                return None;
            }
        }

        (len == class_count).then_some(Self { len, hot })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Index of the `1`, if any.
    pub fn selected(&self) -> Option<usize> {
        self.hot
    }
}

impl fmt::Display for OneHot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.len {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(if self.hot == Some(i) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// A YOLO horizontal box row (normalized center/size).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HorizontalRow {
    pub class_id: usize,
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

/// An oriented box row: four corner points, a class label and a confidence.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrientedRow {
    pub points: [f64; 8],
    pub class_name: String,
    pub confidence: f64,
}

/// The shape of one label line.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineFormat {
    OneHot(OneHot),
    Horizontal(HorizontalRow),
    Oriented(OrientedRow),
    Unrecognized { reason: String },
}

impl LineFormat {
    /// True for horizontal and oriented box lines.
    pub fn is_legacy(&self) -> bool {
        matches!(self, LineFormat::Horizontal(_) | LineFormat::Oriented(_))
    }
}

/// Classifies a label line.
///
/// One-hot is checked first, so with five classes a line such as
/// `0 0 1 0 0` reads as one-hot rather than as a horizontal box.
pub fn classify_line(line: &str, class_count: usize) -> LineFormat {
    if let Some(one_hot) = OneHot::parse(line, class_count) {
        return LineFormat::OneHot(one_hot);
    }

    // Take at most one token past the longest shape so pathological inputs
    // do not allocate unbounded memory.
    let tokens: Vec<&str> = line
        .split_whitespace()
        .take(ORIENTED_TOKENS + 1)
        .collect();

    match tokens.len() {
        HORIZONTAL_TOKENS => match parse_horizontal(&tokens) {
            Ok(row) => LineFormat::Horizontal(row),
            Err(reason) => LineFormat::Unrecognized { reason },
        },
        ORIENTED_TOKENS => match parse_oriented(&tokens) {
            Ok(row) => LineFormat::Oriented(row),
            Err(reason) => LineFormat::Unrecognized { reason },
        },
        0 => LineFormat::Unrecognized {
            reason: "line is empty".to_string(),
        },
        n if n > ORIENTED_TOKENS => LineFormat::Unrecognized {
            reason: format!("more than {ORIENTED_TOKENS} tokens"),
        },
        n => LineFormat::Unrecognized {
            reason: format!(
                "expected {HORIZONTAL_TOKENS} tokens (horizontal box), {ORIENTED_TOKENS} tokens (oriented box) or {class_count} one-hot tokens, found {n}"
            ),
        },
    }
}

/// Fuzz-only entrypoint for label line classification.
#[cfg(feature = "fuzzing")]
pub fn fuzz_classify_line(input: &str, class_count: usize) -> LineFormat {
    classify_line(input, class_count)
}

fn parse_horizontal(tokens: &[&str]) -> Result<HorizontalRow, String> {
    let class_id = tokens[0].parse::<usize>().map_err(|_| {
        format!(
            "invalid class_id '{}'; expected non-negative integer",
            tokens[0]
        )
    })?;

    Ok(HorizontalRow {
        class_id,
        cx: parse_f64_token(tokens[1], "x_center")?,
        cy: parse_f64_token(tokens[2], "y_center")?,
        w: parse_f64_token(tokens[3], "width")?,
        h: parse_f64_token(tokens[4], "height")?,
    })
}

fn parse_oriented(tokens: &[&str]) -> Result<OrientedRow, String> {
    let mut points = [0.0; 8];
    for (i, point) in points.iter_mut().enumerate() {
        *point = parse_f64_token(tokens[i], "coordinate")?;
    }

    Ok(OrientedRow {
        points,
        class_name: tokens[8].to_string(),
        confidence: parse_f64_token(tokens[9], "confidence")?,
    })
}

fn parse_f64_token(raw: &str, field_name: &str) -> Result<f64, String> {
    raw.parse::<f64>()
        .map_err(|_| format!("invalid {field_name} '{raw}'; expected floating-point number"))
}
