//! Escaping of the five predefined XML entities.
//!
//! Both directions are driven by one entity table, so the escaper and the
//! unescaper cannot drift apart.

use aho_corasick::{AhoCorasick, MatchKind};
use once_cell::sync::Lazy;

/// Raw characters, index-aligned with [`ENTITIES`]
const RAW: [&str; 5] = ["&", "<", ">", "\"", "'"];

/// `'` is escaped too; manifest paths may contain apostrophes and
/// `&apos;` is valid in double-quoted attributes.
const ENTITIES: [&str; 5] = ["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"];

static ESCAPER: Lazy<AhoCorasick> =
    Lazy::new(|| AhoCorasick::new(RAW).expect("constant XML escape patterns are valid"));

// LeftmostLongest so `&amp;lt;` decodes to `&lt;` and not `<`
static UNESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(ENTITIES)
        .expect("constant XML entity patterns are valid")
});

/// Escape XML special characters for use in text or attribute values.
///
/// # Examples
///
/// ```
/// use odpack::common::xml::escape_xml;
/// assert_eq!(escape_xml("a & b"), "a &amp; b");
/// assert_eq!(escape_xml("Pictures/\"x\".png"), "Pictures/&quot;x&quot;.png");
/// ```
#[inline]
pub fn escape_xml(s: &str) -> String {
    ESCAPER.replace_all(s, &ENTITIES)
}

/// Unescape the five predefined XML entities.
///
/// Unknown or malformed entities are left unchanged.
///
/// # Examples
///
/// ```
/// use odpack::common::xml::unescape_xml;
/// assert_eq!(unescape_xml("&lt;a &amp; b&gt;"), "<a & b>");
/// assert_eq!(unescape_xml("&amp;lt;"), "&lt;");
/// assert_eq!(unescape_xml("&invalid;"), "&invalid;");
/// ```
#[inline]
pub fn unescape_xml(s: &str) -> String {
    UNESCAPER.replace_all(s, &RAW)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_all_specials() {
        assert_eq!(
            escape_xml(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&apos;&amp;&apos;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_unescape_inverts_escape() {
        let raw = "Object 1/content & \"styles\".xml";
        assert_eq!(unescape_xml(&escape_xml(raw)), raw);
    }

    #[test]
    fn test_apostrophe_in_path() {
        assert_eq!(escape_xml("Pictures/it's.png"), "Pictures/it&apos;s.png");
        assert_eq!(unescape_xml("Pictures/it&apos;s.png"), "Pictures/it's.png");
    }

    #[test]
    fn test_tables_are_aligned() {
        for (raw, entity) in RAW.iter().zip(ENTITIES.iter()) {
            assert_eq!(escape_xml(raw), *entity);
            assert_eq!(unescape_xml(entity), *raw);
        }
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(escape_xml("content.xml"), "content.xml");
        assert_eq!(unescape_xml("content.xml"), "content.xml");
    }
}
