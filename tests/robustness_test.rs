use std::time::{Duration, Instant};

use mdhtml::{escape_text, escape_verbatim, render, render_inline};
use proptest::prelude::*;

fn assert_fast(input: &str) -> String {
    let start = Instant::now();
    let html = render(input);
    let elapsed = start.elapsed();
    assert!(elapsed < Duration::from_secs(5), "took {elapsed:?}");
    html
}

#[test]
fn test_deeply_nested_quotes() {
    let input = format!("{} deep", ">".repeat(200));
    let html = render(&input);
    assert_eq!(html.matches("<blockquote>").count(), 200);
    assert_eq!(html.matches("</blockquote>").count(), 200);
}

#[test]
fn test_deeply_nested_list() {
    let input: String = (0..100)
        .map(|depth| format!("{}- item {depth}\n", "  ".repeat(depth)))
        .collect();
    let html = render(&input);
    assert_eq!(html.matches("<li>").count(), 100);
    assert_eq!(html.matches("<ul>").count(), 100);
}

#[test]
fn test_hundred_thousand_nested_quotes() {
    let input = format!("{} deep", ">".repeat(100_000));
    let html = render(&input);
    assert!(html.contains("deep"));
    assert_eq!(html.matches("<blockquote>").count(), 256);
    assert_eq!(html.matches("</blockquote>").count(), 256);
}

#[test]
fn test_thousands_of_list_levels() {
    let input: String = (0..5_000)
        .map(|depth| format!("{}- item {depth}\n", " ".repeat(depth)))
        .collect();
    let html = render(&input);
    assert_eq!(html.matches("<li>").count(), 5_000);
    assert_eq!(html.matches("<ul>").count(), 256);
}

#[test]
fn test_many_unclosed_underscores_are_linear() {
    let html = assert_fast(&"_a ".repeat(40_000));
    assert!(!html.contains("<em>"));
}

#[test]
fn test_many_open_brackets_are_linear() {
    let html = assert_fast(&format!("{}]", "[".repeat(60_000)));
    assert!(!html.contains("<a "));
}

#[test]
fn test_many_image_openers_are_linear() {
    let html = assert_fast(&format!("{}](", "![".repeat(40_000)));
    assert!(!html.contains("<img"));
}

#[test]
fn test_many_distinct_backtick_runs_are_linear() {
    let input: String = (1..400).map(|n| format!("{} x ", "`".repeat(n))).collect();
    let html = assert_fast(&input);
    assert!(!html.contains("<code>"));
}

#[test]
fn test_many_unmatched_backticks() {
    let input = "` `` ``` ".repeat(500);
    assert!(!render(&input).is_empty());
}

proptest! {
    #[test]
    fn render_never_panics(s in "\\PC*") {
        let _ = render(&s);
    }

    #[test]
    fn render_handles_markup_soup(s in "[-*_`#>|:!\\[\\]()~=+. \n0-9a-z\"<>&]{0,200}") {
        let _ = render(&s);
    }

    #[test]
    fn plain_text_angle_brackets_are_always_escaped(s in "[a-z <>&]{0,80}") {
        let html = render_inline(&s);
        prop_assert!(!html.contains(['<', '>']));
    }

    #[test]
    fn escape_text_leaves_plain_text_alone(s in "[a-zA-Z0-9 .,;!?-]*") {
        prop_assert_eq!(escape_text(&s), s);
    }

    #[test]
    fn escaped_text_has_no_markup_chars(s in "\\PC*") {
        let escaped = escape_text(&s);
        prop_assert!(!escaped.contains(['<', '>', '"', '\'']));
        let verbatim = escape_verbatim(&s);
        prop_assert!(!verbatim.contains(['<', '>']));
    }
}
