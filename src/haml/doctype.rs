//! Doctype string tables.
//!
//! Each output format carries its own set of doctype declarations keyed
//! by subtype keyword; the empty subtype aliases to `transitional` where
//! one exists.

use crate::haml::config::Format;
use once_cell::sync::Lazy;
use std::collections::HashMap;

static DOCTYPES: Lazy<HashMap<(Format, &'static str), &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert(
        (Format::Xhtml, "strict"),
        "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\" \
         \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\">",
    );
    m.insert(
        (Format::Xhtml, "transitional"),
        "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Transitional//EN\" \
         \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd\">",
    );
    m.insert(
        (Format::Xhtml, "basic"),
        "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML Basic 1.1//EN\" \
         \"http://www.w3.org/TR/xhtml-basic/xhtml-basic11.dtd\">",
    );
    m.insert(
        (Format::Xhtml, "mobile"),
        "<!DOCTYPE html PUBLIC \"-//WAPFORUM//DTD XHTML Mobile 1.2//EN\" \
         \"http://www.openmobilealliance.org/tech/DTD/xhtml-mobile12.dtd\">",
    );
    m.insert(
        (Format::Xhtml, "frameset"),
        "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Frameset//EN\" \
         \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-frameset.dtd\">",
    );
    m.insert(
        (Format::Html4, "strict"),
        "<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01//EN\" \
         \"http://www.w3.org/TR/html4/strict.dtd\">",
    );
    m.insert(
        (Format::Html4, "frameset"),
        "<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01 Frameset//EN\" \
         \"http://www.w3.org/TR/html4/frameset.dtd\">",
    );
    m.insert(
        (Format::Html4, "transitional"),
        "<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01 Transitional//EN\" \
         \"http://www.w3.org/TR/html4/loose.dtd\">",
    );
    m.insert((Format::Html5, ""), "<!doctype html>");
    m
});

/// Look up the doctype declaration for a format/subtype pair. The empty
/// subtype maps to `transitional` for the formats that define it.
pub fn doctype(format: Format, subtype: &str) -> Option<&'static str> {
    let subtype = match (format, subtype) {
        (Format::Xhtml, "") | (Format::Html4, "") => "transitional",
        _ => subtype,
    };
    DOCTYPES.get(&(format, subtype)).copied()
}

/// The XML prolog emitted for `!!! XML` doctypes.
pub fn xml_prolog(encoding: &str) -> String {
    let encoding = if encoding.is_empty() {
        "utf-8"
    } else {
        encoding
    };
    format!("<?xml version=\"1.0\" encoding=\"{}\"?>", encoding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_subtype_aliases() {
        assert_eq!(
            doctype(Format::Xhtml, ""),
            doctype(Format::Xhtml, "transitional")
        );
        assert_eq!(
            doctype(Format::Html4, ""),
            doctype(Format::Html4, "transitional")
        );
        assert_eq!(doctype(Format::Html5, ""), Some("<!doctype html>"));
    }

    #[test]
    fn test_unknown_subtype() {
        assert_eq!(doctype(Format::Html4, "mobile"), None);
        assert_eq!(doctype(Format::Html5, "strict"), None);
    }

    #[test]
    fn test_xml_prolog_default_encoding() {
        assert_eq!(
            xml_prolog(""),
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>"
        );
        assert_eq!(
            xml_prolog("utf-16"),
            "<?xml version=\"1.0\" encoding=\"utf-16\"?>"
        );
    }
}
