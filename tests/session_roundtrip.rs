//! Integration tests for annotation sessions over on-disk datasets.

use std::path::Path;

use yolocls::label::WriteMode;
use yolocls::session::{self, Direction, SessionOptions};
use yolocls::YoloclsError;

mod common;
use common::{create_dataset, read_label, write_text};

fn classes(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn open(root: &Path, names: &[&str]) -> session::AnnotationSession {
    let mut session =
        session::load(root, classes(names), SessionOptions::default()).expect("load session");
    session.display(0).expect("display first image");
    session
}

#[test]
fn selection_is_written_as_sole_line_of_empty_label() {
    let temp = tempfile::tempdir().expect("create temp dir");
    create_dataset(temp.path(), "labels", &[("a", "")]);

    let mut session = open(temp.path(), &["cat", "dog", "bird"]);
    session.select(Some(1)).expect("select dog");
    let mode = session.save_annotation().expect("save");

    assert_eq!(mode, Some(WriteMode::Sole));
    assert_eq!(read_label(temp.path(), "labels", "a"), "0 1 0");
}

#[test]
fn one_hot_after_box_lines_is_replaced_not_duplicated() {
    let temp = tempfile::tempdir().expect("create temp dir");
    create_dataset(
        temp.path(),
        "labels",
        &[("a", "0 0.5 0.5 0.1 0.1\n2 0.3 0.3 0.2 0.2\n")],
    );

    let mut session = open(temp.path(), &["cat", "dog", "bird"]);
    assert_eq!(session.current_view().expect("view").label_lines, 2);
    session.select(Some(0)).expect("select");
    assert_eq!(session.save_annotation().expect("save"), Some(WriteMode::Appended));
    assert_eq!(session.current_view().expect("view").label_lines, 3);

    session.select(Some(2)).expect("reselect");
    assert_eq!(session.save_annotation().expect("save"), Some(WriteMode::Replaced));
    assert_eq!(session.current_view().expect("view").label_lines, 3);

    let text = read_label(temp.path(), "labels", "a");
    assert_eq!(text.lines().count(), 3);
    assert_eq!(
        text,
        "0 0.5 0.5 0.1 0.1\n2 0.3 0.3 0.2 0.2\n0 0 1"
    );
}

#[test]
fn oriented_box_lines_are_preserved() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let obb = "10 10 20 10 20 20 10 20 plane 0.9";
    create_dataset(temp.path(), "labelTxt", &[("a", obb)]);

    let mut session = open(temp.path(), &["plane", "ship"]);
    assert_eq!(session.selection(), None);
    session.select(Some(1)).expect("select ship");
    session.close().expect("close");

    assert_eq!(read_label(temp.path(), "labelTxt", "a"), format!("{obb}\n0 1"));
}

#[test]
fn navigation_wraps_in_both_directions() {
    let temp = tempfile::tempdir().expect("create temp dir");
    create_dataset(temp.path(), "labels", &[("a", ""), ("b", ""), ("c", "")]);

    let mut session = open(temp.path(), &["cat", "dog"]);
    let view = session.advance(Direction::Previous).expect("previous");
    assert_eq!(view.index, 2);
    assert!(view.image_path.ends_with("c.bmp"));

    let view = session.advance(Direction::Next).expect("next");
    assert_eq!(view.index, 0);
    assert_eq!(session.cursor(), 0);
}

#[test]
fn advancing_without_selection_writes_zeros_by_default() {
    let temp = tempfile::tempdir().expect("create temp dir");
    create_dataset(temp.path(), "labels", &[("a", ""), ("b", "")]);

    let mut session = open(temp.path(), &["cat", "dog"]);
    session.advance(Direction::Next).expect("next");

    assert_eq!(read_label(temp.path(), "labels", "a"), "0 0");
    assert_eq!(read_label(temp.path(), "labels", "b"), "");
}

#[test]
fn skip_unselected_leaves_label_untouched() {
    let temp = tempfile::tempdir().expect("create temp dir");
    create_dataset(temp.path(), "labels", &[("a", "1 0.5 0.5 0.2 0.2\n"), ("b", "")]);

    let options = SessionOptions {
        skip_unselected: true,
    };
    let mut session =
        session::load(temp.path(), classes(&["cat", "dog"]), options).expect("load session");
    session.display(0).expect("display");
    session.advance(Direction::Next).expect("next");

    assert_eq!(
        read_label(temp.path(), "labels", "a"),
        "1 0.5 0.5 0.2 0.2\n"
    );
}

#[test]
fn stored_selection_is_restored_on_reopen() {
    let temp = tempfile::tempdir().expect("create temp dir");
    create_dataset(temp.path(), "labels", &[("a", ""), ("b", "")]);

    let mut session = open(temp.path(), &["cat", "dog", "bird"]);
    session.select(Some(2)).expect("select bird");
    session.advance(Direction::Next).expect("next");
    session.select(Some(0)).expect("select cat");
    session.close().expect("close");

    let mut reopened = open(temp.path(), &["cat", "dog", "bird"]);
    assert_eq!(reopened.selection(), Some(2));
    let view = reopened.display(1).expect("display second");
    assert_eq!(view.selected(), Some(0));
    assert_eq!(view.label_text.as_deref(), Some("1 0 0"));
}

#[test]
fn one_hot_of_wrong_width_is_not_treated_as_selection() {
    let temp = tempfile::tempdir().expect("create temp dir");
    create_dataset(temp.path(), "labels", &[("a", "0 1")]);

    let mut session = open(temp.path(), &["cat", "dog", "bird"]);
    assert_eq!(session.selection(), None);
    session.select(Some(0)).expect("select");
    session.save_annotation().expect("save");

    // A two-token 0/1 line is not a one-hot line for three classes.
    assert_eq!(read_label(temp.path(), "labels", "a"), "0 1\n1 0 0");
}

#[test]
fn unrecognised_first_line_warns_only_on_first_open() {
    let temp = tempfile::tempdir().expect("create temp dir");
    create_dataset(temp.path(), "labels", &[("a", "garbage line")]);

    let mut session = open(temp.path(), &["cat"]);
    assert!(session.has_ever_opened(0));
    let first = session.current_view().expect("view").warnings.clone();
    assert_eq!(first.len(), 1);
    assert!(first[0].contains("unrecognised label format"));

    let again = session.display(0).expect("display again");
    assert!(again.warnings.is_empty());
}

#[test]
fn missing_label_file_is_reported_and_cursor_moves() {
    let temp = tempfile::tempdir().expect("create temp dir");
    create_dataset(temp.path(), "labels", &[("a", "")]);
    common::write_bmp(&temp.path().join("images/b.bmp"), 8, 8);

    let mut session = open(temp.path(), &["cat"]);
    session.select(Some(0)).expect("select");
    let err = session.advance(Direction::Next).unwrap_err();

    assert!(matches!(err, YoloclsError::LabelMissing { .. }));
    assert_eq!(session.cursor(), 1);
    assert!(session.current_view().is_none());
    assert!(!session.has_ever_opened(1));
    assert_eq!(read_label(temp.path(), "labels", "a"), "1");

    // Nothing is displayed, so nothing is saved.
    assert_eq!(session.save_annotation().expect("save"), None);
}

#[test]
fn out_of_range_indices_are_rejected() {
    let temp = tempfile::tempdir().expect("create temp dir");
    create_dataset(temp.path(), "labels", &[("a", "")]);

    let mut session = open(temp.path(), &["cat", "dog"]);
    assert!(matches!(
        session.select(Some(2)),
        Err(YoloclsError::ClassIndexOutOfRange { index: 2, count: 2 })
    ));
    assert!(matches!(
        session.display(5),
        Err(YoloclsError::ImageIndexOutOfRange { index: 5, count: 1 })
    ));
    assert_eq!(session.cursor(), 0);
    assert!(session.current_view().is_some());
}

#[test]
fn classes_fall_back_to_data_yaml() {
    let temp = tempfile::tempdir().expect("create temp dir");
    create_dataset(temp.path(), "labels", &[("a", "")]);
    write_text(
        &temp.path().join("data.yaml"),
        "names:\n  - person\n  - bicycle\n",
    );

    let session = session::load(temp.path(), Vec::new(), SessionOptions::default())
        .expect("load session");
    assert_eq!(session.classes(), ["person", "bicycle"]);
    assert_eq!(session.dataset().image_directory(), temp.path().join("images"));
    assert_eq!(session.dataset().label_directory(), temp.path().join("labels"));
}

#[test]
fn empty_image_directory_fails_to_open() {
    let temp = tempfile::tempdir().expect("create temp dir");
    create_dataset(temp.path(), "labels", &[]);

    let err = session::load(temp.path(), classes(&["cat"]), SessionOptions::default())
        .unwrap_err();
    assert!(matches!(err, YoloclsError::NoImages { .. }));
}
