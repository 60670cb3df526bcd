// src/crawl/extract.rs
// =============================================================================
// This module pulls references out of raw page markup.
//
// We don't build a DOM here. A page is scanned for `src="..."` and
// `href="..."` attributes with a regular expression, which also catches
// references inside markup a DOM parser would consider broken.
//
// Every captured value is then turned into an absolute Location with the
// `url` crate:
// - Already absolute ("https://other.com/x") -> kept exactly as written
// - Relative ("/docs", "../c", "//cdn.com/x") -> resolved against the page
//
// Rust concepts:
// - Enums with data: a Reference is either resolved or malformed
// - Iterators: captures_iter() walks every match in the page
// =============================================================================

use regex::Regex;
use url::{ParseError, Url};

use super::config::{ExtractOptions, LinkPattern, MalformedPolicy};
use super::error::CrawlError;

const STRICT_PATTERN: &str = r#"(?:src|href)="([^"\s]+)""#;
const LOOSE_PATTERN: &str = r#"(?:src|href)="([^"]*)""#;

/// One reference found on a page, in the order it appears in the markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// The raw attribute value and the absolute Location it points to
    Resolved { raw: String, location: String },
    /// The raw value could not be parsed as a URL
    Malformed { raw: String, error: ParseError },
}

#[derive(Debug, Clone)]
pub struct LinkExtractor {
    pattern: Regex,
    on_malformed: MalformedPolicy,
}

impl LinkExtractor {
    pub fn new(options: ExtractOptions) -> Result<Self, CrawlError> {
        let pattern = match options.pattern {
            LinkPattern::Strict => STRICT_PATTERN,
            LinkPattern::Loose => LOOSE_PATTERN,
        };
        Ok(Self {
            pattern: Regex::new(pattern)?,
            on_malformed: options.on_malformed,
        })
    }

    /// Extracts every reference in `markup`, resolving relative ones
    /// against `base`.
    ///
    /// Empty values (`href=""`) are ignored. With `MalformedPolicy::Abort`
    /// the first malformed reference is the last item returned.
    pub fn extract(&self, base: &Url, markup: &str) -> Vec<Reference> {
        let mut references = Vec::new();

        for captures in self.pattern.captures_iter(markup) {
            let raw = match captures.get(1) {
                Some(value) if !value.as_str().is_empty() => value.as_str(),
                _ => continue,
            };

            match resolve(base, raw) {
                Ok(location) => references.push(Reference::Resolved {
                    raw: raw.to_string(),
                    location,
                }),
                Err(error) => {
                    references.push(Reference::Malformed {
                        raw: raw.to_string(),
                        error,
                    });
                    if self.on_malformed == MalformedPolicy::Abort {
                        break;
                    }
                }
            }
        }

        references
    }
}

// Turns one raw attribute value into an absolute Location
//
// Examples (base = "http://example.com/a/b"):
//   "http://other.com"  -> "http://other.com"  (untouched)
//   "../c"              -> "http://example.com/c"
//   "/page3"            -> "http://example.com/page3"
fn resolve(base: &Url, raw: &str) -> Result<String, ParseError> {
    match Url::parse(raw) {
        // Absolute references keep their original spelling so they compare
        // equal to the same string found elsewhere
        Ok(_) => Ok(raw.to_string()),
        Err(ParseError::RelativeUrlWithoutBase) => base.join(raw).map(String::from),
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor(pattern: LinkPattern, on_malformed: MalformedPolicy) -> LinkExtractor {
        LinkExtractor::new(ExtractOptions { pattern, on_malformed }).unwrap()
    }

    fn locations(references: &[Reference]) -> Vec<&str> {
        references
            .iter()
            .filter_map(|r| match r {
                Reference::Resolved { location, .. } => Some(location.as_str()),
                Reference::Malformed { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_resolve_parent_relative() {
        let base = Url::parse("http://example.com/a/b").unwrap();
        assert_eq!(resolve(&base, "../c").unwrap(), "http://example.com/c");
    }

    #[test]
    fn test_absolute_kept_as_written() {
        let base = Url::parse("http://ex.com").unwrap();
        assert_eq!(resolve(&base, "http://ex.com").unwrap(), "http://ex.com");
        assert_eq!(resolve(&base, "https://Other.com/x").unwrap(), "https://Other.com/x");
    }

    #[test]
    fn test_scheme_relative_inherits_scheme() {
        let base = Url::parse("https://ex.com/page").unwrap();
        assert_eq!(resolve(&base, "//cdn.ex.com/app.js").unwrap(), "https://cdn.ex.com/app.js");
    }

    #[test]
    fn test_extracts_src_and_href_in_order() {
        let html = r#"
            <link href="/style.css" rel="stylesheet">
            <img src="logo.png">
            <a href="http://ex.com/page2">Two</a>
        "#;
        let base = Url::parse("http://ex.com/dir/index.html").unwrap();
        let refs = extractor(LinkPattern::Strict, MalformedPolicy::Skip).extract(&base, html);
        assert_eq!(
            locations(&refs),
            vec!["http://ex.com/style.css", "http://ex.com/dir/logo.png", "http://ex.com/page2"]
        );
    }

    #[test]
    fn test_raw_value_is_kept_alongside_location() {
        let base = Url::parse("http://ex.com").unwrap();
        let refs = extractor(LinkPattern::Strict, MalformedPolicy::Skip)
            .extract(&base, r#"<a href="/page3">"#);
        assert_eq!(
            refs,
            vec![Reference::Resolved {
                raw: "/page3".to_string(),
                location: "http://ex.com/page3".to_string(),
            }]
        );
    }

    #[test]
    fn test_single_quotes_are_not_matched() {
        let base = Url::parse("http://ex.com").unwrap();
        let refs = extractor(LinkPattern::Strict, MalformedPolicy::Skip)
            .extract(&base, "<a href='/docs'>Docs</a>");
        assert!(refs.is_empty());
    }

    #[test]
    fn test_strict_pattern_rejects_whitespace_and_empty() {
        let html = r#"<a href="/with space"></a><a href=""></a><a href="/ok"></a>"#;
        let base = Url::parse("http://ex.com").unwrap();
        let refs = extractor(LinkPattern::Strict, MalformedPolicy::Skip).extract(&base, html);
        assert_eq!(locations(&refs), vec!["http://ex.com/ok"]);
    }

    #[test]
    fn test_loose_pattern_accepts_whitespace_but_skips_empty() {
        let html = r#"<a href="/with space"></a><a href=""></a>"#;
        let base = Url::parse("http://ex.com").unwrap();
        let refs = extractor(LinkPattern::Loose, MalformedPolicy::Skip).extract(&base, html);
        assert_eq!(locations(&refs), vec!["http://ex.com/with%20space"]);
    }

    #[test]
    fn test_malformed_reference_is_skipped_by_default() {
        let html = r#"<a href="/one"></a><a href="http://[oops"></a><a href="/two"></a>"#;
        let base = Url::parse("http://ex.com").unwrap();
        let refs = extractor(LinkPattern::Strict, MalformedPolicy::Skip).extract(&base, html);

        assert_eq!(refs.len(), 3);
        assert!(matches!(&refs[1], Reference::Malformed { raw, .. } if raw == "http://[oops"));
        assert_eq!(locations(&refs), vec!["http://ex.com/one", "http://ex.com/two"]);
    }

    #[test]
    fn test_malformed_reference_aborts_in_strict_mode() {
        let html = r#"<a href="/one"></a><a href="http://[oops"></a><a href="/two"></a>"#;
        let base = Url::parse("http://ex.com").unwrap();
        let refs = extractor(LinkPattern::Strict, MalformedPolicy::Abort).extract(&base, html);

        assert_eq!(refs.len(), 2);
        assert!(matches!(refs.last(), Some(Reference::Malformed { .. })));
        assert_eq!(locations(&refs), vec!["http://ex.com/one"]);
    }
}
