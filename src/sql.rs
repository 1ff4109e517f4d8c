#[cfg(test)]
use std::sync::LazyLock;

#[cfg(test)]
use regex::Regex;

const DEFAULT_DELIMITER: &str = "$$";
const ALTERNATE_TAG: &str = "tag";

#[cfg(test)]
static OPENING_DELIMITER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$(?:[A-Za-z_][A-Za-z0-9_]*)?\$").expect("dollar-quote delimiter regex compiles")
});

pub fn dollar_quote(value: Option<&str>) -> String {
    match value {
        None => "NULL".to_string(),
        Some(text) => {
            let delimiter = delimiter_for(text);
            format!("{delimiter}{text}{delimiter}")
        }
    }
}

pub fn delimiter_for(text: &str) -> String {
    if delimiter_fits(text, DEFAULT_DELIMITER) {
        return DEFAULT_DELIMITER.to_string();
    }

    let mut suffix = 0_usize;
    loop {
        let candidate = if suffix == 0 {
            format!("${ALTERNATE_TAG}$")
        } else {
            format!("${ALTERNATE_TAG}{suffix}$")
        };
        if delimiter_fits(text, &candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

// The first occurrence of the delimiter after the opening one must be the
// closing one, which also rules out text ending in a prefix of it.
fn delimiter_fits(text: &str, delimiter: &str) -> bool {
    let closed = format!("{text}{delimiter}");
    closed.find(delimiter) == Some(text.len())
}

// Only used to check rendered literals; `NULL` and malformed input give `None`.
#[cfg(test)]
pub fn strip_dollar_quotes(literal: &str) -> Option<&str> {
    let delimiter = OPENING_DELIMITER.find(literal)?.as_str();
    let body = literal
        .strip_prefix(delimiter)?
        .strip_suffix(delimiter)?;

    delimiter_fits(body, delimiter).then_some(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_uses_default_delimiter() {
        assert_eq!(dollar_quote(Some("Neville's teachings")), "$$Neville's teachings$$");
        assert_eq!(dollar_quote(Some("")), "$$$$");
    }

    #[test]
    fn absent_value_renders_null_keyword() {
        assert_eq!(dollar_quote(None), "NULL");
        assert_eq!(strip_dollar_quotes("NULL"), None);
    }

    #[test]
    fn text_containing_default_delimiter_switches_to_tag() {
        let text = "costs $$ and more";
        let literal = dollar_quote(Some(text));

        assert_eq!(literal, "$tag$costs $$ and more$tag$");
        assert_eq!(strip_dollar_quotes(&literal), Some(text));
    }

    #[test]
    fn trailing_dollar_cannot_close_the_literal_early() {
        assert_eq!(delimiter_for("price in $"), "$tag$");
        assert_eq!(delimiter_for("$leading is fine"), "$$");
    }

    #[test]
    fn colliding_tags_advance_to_numbered_tags() {
        let text = "both $$ and $tag$ appear";
        assert_eq!(delimiter_for(text), "$tag1$");

        let text = "$$ $tag$ $tag1$";
        assert_eq!(delimiter_for(text), "$tag2$");

        let text = "ends with $tag";
        assert_eq!(delimiter_for(text), "$$");
    }

    #[test]
    fn escaping_round_trips_awkward_text() {
        let samples = [
            "",
            "$",
            "$$",
            "$$$",
            "a$$b$tag$c$tag1",
            "multi\nline 'quoted' \"text\" with \\ backslash",
            "ends with $tag$",
            "ünïcödé $$ — dash",
        ];

        for sample in samples {
            let literal = dollar_quote(Some(sample));
            assert_eq!(strip_dollar_quotes(&literal), Some(sample), "literal: {literal}");
        }
    }

    #[test]
    fn malformed_literals_are_rejected() {
        assert_eq!(strip_dollar_quotes("'plain'"), None);
        assert_eq!(strip_dollar_quotes("$$unterminated"), None);
        assert_eq!(strip_dollar_quotes("$$early$$close$$"), None);
        assert_eq!(strip_dollar_quotes("$a$body$b$"), None);
    }
}
