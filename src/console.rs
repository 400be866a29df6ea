//! Line-oriented terminal driver for an annotation session.
//!
//! Walks the wizard pages, then reads one command per line:
//!
//! | input              | effect                                     |
//! |--------------------|--------------------------------------------|
//! | `n`, `next`        | save, go to the next image (wraps)         |
//! | `p`, `prev`        | save, go to the previous image (wraps)     |
//! | `<k>`              | select option `k`                          |
//! | `-`, `none`        | clear the selection                        |
//! | `g <i>`, `goto <i>`| save, jump to image `i`                    |
//! | `?`, `help`        | list commands                              |
//! | `q`, `quit`        | ask, then save and exit                    |
//! | EOF                | save and exit                              |

use std::io::{BufRead, Write};
use std::path::Path;

use crate::error::YoloclsError;
use crate::session::{AnnotationSession, Direction, SessionOptions};
use crate::wizard::{Page, Wizard};

const WELCOME: &str = "Welcome to the yolocls labeling session.
Each image gets exactly one class. Selections are written as a one-hot line
at the end of the image's label file when you move to another image or quit.
Back up the label directory before you start.";

const HELP: &str = "commands: n|next, p|prev, <k> select option k, -|none clear, g <i> go to image i, q|quit";

enum Command {
    Navigate(Direction),
    Select(Option<usize>),
    Goto(usize),
    Help,
    Quit,
    Nothing,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Command::Nothing;
    };

    match head {
        "n" | "next" => Command::Navigate(Direction::Next),
        "p" | "prev" | "previous" => Command::Navigate(Direction::Previous),
        "-" | "none" => Command::Select(None),
        "?" | "help" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        "g" | "goto" => match parts.next().and_then(|raw| raw.parse().ok()) {
            Some(index) => Command::Goto(index),
            None => Command::Unknown(line.trim().to_string()),
        },
        other => match other.parse::<usize>() {
            Ok(index) => Command::Select(Some(index)),
            Err(_) => Command::Unknown(line.trim().to_string()),
        },
    }
}

/// Runs an interactive session on the dataset at `root`.
///
/// `classes` may be empty, in which case class files in the root are used,
/// and failing that the class names are read from `input` until a blank line.
pub fn run_annotate<R: BufRead, W: Write>(
    root: &Path,
    classes: Vec<String>,
    options: SessionOptions,
    input: &mut R,
    out: &mut W,
) -> Result<(), YoloclsError> {
    let mut wizard = Wizard::new(options);
    writeln!(out, "{}", WELCOME)?;
    wizard.advance();

    let layout = wizard.load_dataset(root)?;
    writeln!(out, "Dataset Directory: {}", layout.root.display())?;
    writeln!(out, "Image Directory: {}", layout.images_dir.display())?;
    writeln!(out, "Label Directory: {}", layout.labels_dir.display())?;
    let classes = if classes.is_empty() {
        layout.read_class_names()?
    } else {
        classes
    };
    wizard.advance();

    for class in &classes {
        wizard.add_class(class);
    }
    if wizard.classes().is_empty() {
        writeln!(out, "Enter image classes, one per line (blank line to finish):")?;
        out.flush()?;
        let mut line = String::new();
        loop {
            line.clear();
            if input.read_line(&mut line)? == 0 || line.trim().is_empty() {
                break;
            }
            wizard.add_class(&line);
        }
    }
    if wizard.advance() != Some(Page::ReviewClasses) {
        return Err(YoloclsError::NoClasses {
            root: root.to_path_buf(),
        });
    }
    writeln!(out, "Classes: {}", wizard.classes().join(", "))?;

    let (mut session, first) = wizard.start_session()?;
    match first {
        Ok(()) => show_current(&session, out)?,
        Err(err) => writeln!(out, "Error: {}", err)?,
    }
    writeln!(out, "{}", HELP)?;

    let mut line = String::new();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        let result = match parse_command(&line) {
            Command::Navigate(direction) => session.advance(direction).map(|_| true),
            Command::Select(option) => session.select(option).map(|_| true),
            Command::Goto(index) => goto(&mut session, index).map(|_| true),
            Command::Help => {
                writeln!(out, "{}", HELP)?;
                Ok(false)
            }
            Command::Quit => {
                if confirm_quit(input, out)? {
                    break;
                }
                Ok(false)
            }
            Command::Nothing => Ok(false),
            Command::Unknown(raw) => {
                writeln!(out, "Unknown command '{}'. {}", raw, HELP)?;
                Ok(false)
            }
        };

        match result {
            Ok(true) => show_current(&session, out)?,
            Ok(false) => {}
            Err(err) => writeln!(out, "Error: {}", err)?,
        }
    }

    session.close()?;
    writeln!(out, "Saved. Bye.")?;
    Ok(())
}

/// Asks before quitting. EOF at the prompt counts as yes.
fn confirm_quit<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<bool, YoloclsError> {
    write!(out, "Save and quit? [y/N] ")?;
    out.flush()?;
    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        writeln!(out)?;
        return Ok(true);
    }
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

fn goto(session: &mut AnnotationSession, index: usize) -> Result<(), YoloclsError> {
    if index >= session.image_count() {
        return Err(YoloclsError::ImageIndexOutOfRange {
            index,
            count: session.image_count(),
        });
    }
    session.save_annotation()?;
    session.display(index).map(|_| ())
}

fn show_current<W: Write>(session: &AnnotationSession, out: &mut W) -> Result<(), YoloclsError> {
    if let Some(view) = session.current_view() {
        write!(out, "{}", view)?;
    }
    Ok(())
}
