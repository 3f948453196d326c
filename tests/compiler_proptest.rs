//! Property-based tests over indentation and close ordering.

use haml::Engine;
use proptest::prelude::*;

/// Build a straight ladder: one tag per level, each one level deeper.
fn ladder(unit: &str, levels: usize) -> String {
    let mut src = String::new();
    for level in 0..=levels {
        src.push_str(&unit.repeat(level));
        src.push_str(&format!("%t{}\n", level));
    }
    src
}

/// The expected rendering of `ladder`: every tag closes after all of its
/// descendants, none before.
fn ladder_html(levels: usize) -> String {
    let mut html = String::new();
    for level in 0..levels {
        html.push_str(&"  ".repeat(level));
        html.push_str(&format!("<t{}>\n", level));
    }
    html.push_str(&"  ".repeat(levels));
    html.push_str(&format!("<t{0}></t{0}>\n", levels));
    for level in (0..levels).rev() {
        html.push_str(&"  ".repeat(level));
        html.push_str(&format!("</t{}>\n", level));
    }
    html
}

proptest! {
    #[test]
    fn prop_nested_tags_close_in_lifo_order(
        width in 1usize..5,
        tabs in any::<bool>(),
        levels in 1usize..6,
    ) {
        let unit = if tabs { "\t" } else { " " }.repeat(width);
        let html = Engine::default().to_html(&ladder(&unit, levels)).unwrap();
        prop_assert_eq!(html, ladder_html(levels));
    }

    #[test]
    fn prop_output_is_independent_of_the_unit(
        width in 1usize..5,
        tabs in any::<bool>(),
        levels in 1usize..6,
    ) {
        let unit = if tabs { "\t" } else { " " }.repeat(width);
        let html = Engine::default().to_html(&ladder(&unit, levels)).unwrap();
        let reference = Engine::default().to_html(&ladder("  ", levels)).unwrap();
        prop_assert_eq!(html, reference);
    }

    #[test]
    fn prop_mixed_indentation_characters_always_fail(
        spaces in 1usize..4,
        tabs in 1usize..4,
        spaces_first in any::<bool>(),
    ) {
        let run = if spaces_first {
            format!("{}{}", " ".repeat(spaces), "\t".repeat(tabs))
        } else {
            format!("{}{}", "\t".repeat(tabs), " ".repeat(spaces))
        };
        let src = format!("%p\n{}%p", run);
        let err = Engine::default().to_html(&src).unwrap_err();
        prop_assert!(err.to_string().contains("mixed indentation"));
    }

    #[test]
    fn prop_depth_jumps_always_fail(
        width in 1usize..4,
        tabs in any::<bool>(),
        jump in 3usize..7,
    ) {
        let unit = if tabs { "\t" } else { " " }.repeat(width);
        let src = format!("%a\n{}%b\n{}%c", unit, unit.repeat(jump));
        let err = Engine::default().to_html(&src).unwrap_err();
        prop_assert!(err.to_string().contains("invalid indentation"));
    }

    #[test]
    fn prop_filter_bodies_pass_lines_through_verbatim(
        lines in proptest::collection::vec("[a-z][a-z0-9 ]{0,18}[a-z0-9]", 1..5),
    ) {
        let mut src = String::from(":plain\n");
        for line in &lines {
            src.push_str("  ");
            src.push_str(line);
            src.push('\n');
        }
        let html = Engine::default().to_html(&src).unwrap();
        prop_assert_eq!(html, format!("{}\n", lines.join("\n")));
    }
}

#[test]
fn test_default_round_trip() {
    assert_eq!(Engine::default().to_html("%div").unwrap(), "<div></div>\n");
}
