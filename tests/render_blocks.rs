//! Block-level constructs: comments, doctypes, filters, multiline values
//! and whitespace-preserving tags.

use haml::haml::error::{HamlError, SemanticError};
use haml::{Engine, Format, Options};
use rstest::rstest;

fn render(source: &str) -> String {
    Engine::default().to_html(source).expect("render failed")
}

fn render_as(source: &str, format: Format) -> String {
    Engine::new(Options {
        format,
        ..Options::default()
    })
    .to_html(source)
    .expect("render failed")
}

#[test]
fn test_one_line_comment() {
    assert_eq!(render("/ a comment"), "<!-- a comment -->\n");
}

#[test]
fn test_comment_with_nested_content() {
    assert_eq!(render("/\n  %p hi"), "<!--\n  <p>hi</p>\n-->\n");
}

#[test]
fn test_conditional_comment() {
    assert_eq!(
        render("/[if IE] text"),
        "<!--[if IE]> text <![endif]-->\n"
    );
    assert_eq!(
        render("/[if lt IE 8]\n  %a"),
        "<!--[if lt IE 8]>\n  <a></a>\n<![endif]-->\n"
    );
}

#[test]
fn test_silent_comment_produces_nothing() {
    assert_eq!(render("-# note to self\n%p"), "<p></p>\n");
}

#[test]
fn test_silent_comment_swallows_its_block() {
    assert_eq!(
        render("-# note\n  anything goes here: %foo = {\n%p"),
        "<p></p>\n"
    );
}

#[test]
fn test_nested_silent_comment() {
    assert_eq!(
        render("%div\n  -# gone\n    also gone\n  %p"),
        "<div>\n  <p></p>\n</div>\n"
    );
}

#[rstest]
#[case(Format::Html5, "!!!", "<!doctype html>")]
#[case(
    Format::Xhtml,
    "!!!",
    "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Transitional//EN\" \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd\">"
)]
#[case(
    Format::Xhtml,
    "!!! strict",
    "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\" \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\">"
)]
#[case(
    Format::Xhtml,
    "!!! frameset",
    "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Frameset//EN\" \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-frameset.dtd\">"
)]
#[case(
    Format::Xhtml,
    "!!! basic",
    "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML Basic 1.1//EN\" \"http://www.w3.org/TR/xhtml-basic/xhtml-basic11.dtd\">"
)]
#[case(
    Format::Xhtml,
    "!!! mobile",
    "<!DOCTYPE html PUBLIC \"-//WAPFORUM//DTD XHTML Mobile 1.2//EN\" \"http://www.openmobilealliance.org/tech/DTD/xhtml-mobile12.dtd\">"
)]
#[case(
    Format::Html4,
    "!!!",
    "<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01 Transitional//EN\" \"http://www.w3.org/TR/html4/loose.dtd\">"
)]
#[case(
    Format::Html4,
    "!!! strict",
    "<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01//EN\" \"http://www.w3.org/TR/html4/strict.dtd\">"
)]
#[case(
    Format::Html4,
    "!!! frameset",
    "<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01 Frameset//EN\" \"http://www.w3.org/TR/html4/frameset.dtd\">"
)]
fn test_doctype_declarations(
    #[case] format: Format,
    #[case] source: &str,
    #[case] expected: &str,
) {
    assert_eq!(render_as(source, format), format!("{}\n", expected));
}

#[test]
fn test_xml_prolog() {
    assert_eq!(
        render_as("!!! XML", Format::Xhtml),
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n"
    );
    assert_eq!(
        render_as("!!! XML iso-8859-1", Format::Xhtml),
        "<?xml version=\"1.0\" encoding=\"iso-8859-1\"?>\n"
    );
}

#[test]
fn test_unknown_doctype_subtype_is_rejected() {
    let err = render_err("!!! strict");
    assert!(matches!(
        err,
        HamlError::Semantic(SemanticError::UnknownDoctype { .. })
    ));
    let err = Engine::new(Options {
        format: Format::Html4,
        ..Options::default()
    })
    .to_html("!!! mobile")
    .unwrap_err();
    assert!(matches!(
        err,
        HamlError::Semantic(SemanticError::UnknownDoctype { .. })
    ));
}

fn render_err(source: &str) -> HamlError {
    Engine::default().to_html(source).unwrap_err()
}

#[test]
fn test_plain_filter_passes_lines_through() {
    assert_eq!(
        render(":plain\n  foo\n    bar\n  baz"),
        "foo\n  bar\nbaz\n"
    );
}

#[test]
fn test_plain_filter_nested_in_a_tag() {
    assert_eq!(
        render("%div\n  :plain\n    line"),
        "<div>\n  line\n</div>\n"
    );
}

#[test]
fn test_filter_stops_at_dedent() {
    assert_eq!(render(":plain\n  raw\n%p"), "raw\n<p></p>\n");
}

#[test]
fn test_javascript_filter() {
    insta::assert_snapshot!(render(":javascript\n  alert(1);"), @r"
    <script type='text/javascript'>
      alert(1);
    </script>
    ");
}

#[test]
fn test_javascript_filter_xhtml_wraps_in_cdata() {
    insta::assert_snapshot!(render_as(":javascript\n  alert(1);", Format::Xhtml), @r"
    <script type='text/javascript'>
      //<![CDATA[
        alert(1);
      //]]>
    </script>
    ");
}

#[test]
fn test_javascript_filter_uses_the_attr_wrapper() {
    let html = Engine::new(Options {
        attr_wrapper: '"',
        ..Options::default()
    })
    .to_html(":javascript\n  go();")
    .unwrap();
    assert_eq!(html, "<script type=\"text/javascript\">\n  go();\n</script>\n");
}

#[test]
fn test_unknown_filter_is_rejected() {
    let err = render_err(":sass\n  x");
    assert!(matches!(
        err,
        HamlError::Semantic(SemanticError::UnknownFilter { .. })
    ));
}

#[test]
fn test_multiline_tag_value() {
    assert_eq!(
        render("%p multi |\n  line |\n  string |"),
        "<p>multi line string</p>\n"
    );
}

#[test]
fn test_multiline_content_then_normal_line() {
    assert_eq!(render("one |\n  two |\n%p"), "one two\n<p></p>\n");
}

#[test]
fn test_preserving_tag_keeps_interior_bytes() {
    assert_eq!(render("%pre\n  %code\n    foo"), "<pre><code>foo</code></pre>\n");
    assert_eq!(render("%textarea\n  text"), "<textarea>text</textarea>\n");
}

#[test]
fn test_configured_preserve_set_is_honored() {
    let mut options = Options::default();
    options.preserve.push("poem".to_string());
    let html = Engine::new(options).to_html("%poem\n  line").unwrap();
    assert_eq!(html, "<poem>line</poem>\n");
}

#[test]
fn test_full_document() {
    let source = "!!!\n%html\n  %head\n    %title hi\n  %body\n    #content.main\n      %p hello";
    insta::assert_snapshot!(render(source), @r"
    <!doctype html>
    <html>
      <head>
        <title>hi</title>
      </head>
      <body>
        <div id='content' class='main'>
          <p>hello</p>
        </div>
      </body>
    </html>
    ");
}
