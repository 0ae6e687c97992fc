//! Line-level formatting rules for front-matter values.
//!
//! These rules are the contract between rendering and [`crate::frontmatter`]:
//! whatever is written here must parse back to the same field value.

use once_cell::sync::Lazy;
use regex::Regex;

use lineup_core::classify::duration_options;

static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));

/// Double-quote `value`, escaping `\` and `"`.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Inverse of [`quote`]. Unquoted input is returned trimmed as-is.
pub fn unquote(raw: &str) -> String {
    let raw = raw.trim();
    let Some(inner) = raw
        .strip_prefix('"')
        .and_then(|r| r.strip_suffix('"'))
    else {
        return raw.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// `linkedin: "<url>"`, or a disabled placeholder when there is no profile.
///
/// The placeholder is distinguishable from an explicit empty value so an
/// editor can fill it in by uncommenting.
pub fn linkedin_line(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        "# linkedin: \"\"".to_string()
    } else {
        format!("linkedin: {}", quote(url))
    }
}

/// Render the duration cell.
///
/// One option yields a single active line. Several options yield a block of
/// commented alternatives, one per option, for an editor to pick from.
pub fn duration_block(raw: &str) -> String {
    let options = duration_options(raw);
    match options.as_slice() {
        [] => "duration: \"\"".to_string(),
        [single] => format!("duration: {}", quote(single)),
        many => {
            let mut lines = vec!["# Multiple duration options - uncomment one:".to_string()];
            lines.extend(many.iter().map(|d| format!("# duration: {}", quote(d))));
            lines.join("\n")
        }
    }
}

/// `name: []` or a block list of quoted items.
pub fn list_block(name: &str, items: &[String]) -> String {
    if items.is_empty() {
        return format!("{name}: []");
    }
    let mut lines = vec![format!("{name}:")];
    lines.extend(items.iter().map(|item| format!("    - {}", quote(item))));
    lines.join("\n")
}

/// Trim a bio/abstract and collapse runs of blank lines; empty becomes `""`.
pub fn body_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let text = text.trim();
    if text.is_empty() {
        return "\"\"".to_string();
    }
    BLANK_RUN.replace_all(text, "\n\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("plain")]
    #[case("")]
    #[case(r#"She said "hi""#)]
    #[case(r"back\slash")]
    #[case("two\nlines")]
    fn quote_unquote_inverse(#[case] value: &str) {
        assert_eq!(unquote(&quote(value)), value);
    }

    #[test]
    fn linkedin_placeholder_is_commented() {
        assert_eq!(linkedin_line(""), "# linkedin: \"\"");
        assert_eq!(
            linkedin_line(" https://linkedin.com/in/ada "),
            "linkedin: \"https://linkedin.com/in/ada\""
        );
    }

    #[test]
    fn duration_single_and_multiple() {
        assert_eq!(duration_block(""), "duration: \"\"");
        assert_eq!(duration_block("40-50 minutes"), "duration: \"60\"");
        assert_eq!(
            duration_block("20-30 minutes, 40-50 minutes"),
            "# Multiple duration options - uncomment one:\n# duration: \"30\"\n# duration: \"60\""
        );
    }

    #[test]
    fn list_block_shapes() {
        assert_eq!(list_block("speakers", &[]), "speakers: []");
        assert_eq!(
            list_block("speakers", &["ada".into(), "bob".into()]),
            "speakers:\n    - \"ada\"\n    - \"bob\""
        );
    }

    #[test]
    fn body_collapses_blank_runs() {
        assert_eq!(body_text("  "), "\"\"");
        assert_eq!(body_text("one\n\n\n  \ntwo\n"), "one\n\ntwo");
    }
}
