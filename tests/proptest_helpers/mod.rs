#![allow(dead_code)]

use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// A class count together with an optional in-range selection.
pub fn arb_selection(max_classes: usize) -> BoxedStrategy<(usize, Option<usize>)> {
    (1..=max_classes)
        .prop_flat_map(|len| (Just(len), proptest::option::of(0..len)))
        .boxed()
}

fn arb_coord() -> BoxedStrategy<String> {
    (0.0f64..1.0).prop_map(|v| format!("{v:.6}")).boxed()
}

/// A horizontal box line: `class cx cy w h`.
pub fn arb_horizontal_line(max_class: u32) -> BoxedStrategy<String> {
    (
        0..max_class,
        arb_coord(),
        arb_coord(),
        arb_coord(),
        arb_coord(),
    )
        .prop_map(|(class, cx, cy, w, h)| format!("{class} {cx} {cy} {w} {h}"))
        .boxed()
}

/// An oriented box line: eight coordinates, a class name, a confidence.
pub fn arb_oriented_line() -> BoxedStrategy<String> {
    (
        prop::collection::vec(0u32..1024, 8),
        "[a-z]{1,8}",
        0.0f64..1.0,
    )
        .prop_map(|(points, class, confidence)| {
            let points: Vec<String> = points.iter().map(u32::to_string).collect();
            format!("{} {} {:.2}", points.join(" "), class, confidence)
        })
        .boxed()
}

/// Zero or more box lines of either shape.
pub fn arb_box_lines(max_lines: usize) -> BoxedStrategy<Vec<String>> {
    prop::collection::vec(
        prop_oneof![arb_horizontal_line(20), arb_oriented_line()],
        0..=max_lines,
    )
    .boxed()
}
