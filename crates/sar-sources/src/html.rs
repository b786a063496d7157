//! HTML body to plain text
//!
//! The normalizer only sees the [`TextExtractor`] trait, so the extraction
//! strategy can change without touching the tree walk.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExtractError {
    #[error("content is binary, not HTML")]
    Binary,
}

/// Narrow seam between the normalizer and whatever parses HTML
pub trait TextExtractor: Send + Sync {
    fn extract(&self, html: &[u8]) -> Result<String, ExtractError>;
}

/// Tag scanner that keeps visible text and turns block elements into line breaks
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlTextExtractor;

/// Elements whose content is never visible text
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "head", "title", "template"];

const BLOCK_ELEMENTS: &[&str] = &[
    "br", "p", "div", "tr", "li", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "table", "hr",
    "ul", "ol", "pre", "body", "section", "article", "header", "footer",
];

impl TextExtractor for HtmlTextExtractor {
    fn extract(&self, html: &[u8]) -> Result<String, ExtractError> {
        if html.contains(&0) {
            return Err(ExtractError::Binary);
        }

        let html = String::from_utf8_lossy(html);
        let raw = scan(&html);
        Ok(tidy(&raw))
    }
}

fn scan(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(lt) = rest.find('<') {
        push_text(&mut out, &rest[..lt]);
        rest = &rest[lt..];

        if rest.starts_with("<!--") {
            rest = match rest.find("-->") {
                Some(end) => &rest[end + 3..],
                None => "",
            };
            continue;
        }

        // A '<' that cannot open a tag is literal text ("a < b")
        let opens_tag = rest[1..]
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
            .unwrap_or(false);
        if !opens_tag {
            out.push('<');
            rest = &rest[1..];
            continue;
        }

        let Some(end) = find_tag_end(rest) else {
            // Unterminated tag: nothing after it is visible
            rest = "";
            break;
        };
        let tag = &rest[1..end];
        rest = &rest[end + 1..];

        let (closing, name) = tag_name(tag);
        if !closing && !tag.ends_with('/') && SKIPPED_ELEMENTS.contains(&name.as_str()) {
            rest = skip_element(rest, &name);
            continue;
        }
        if BLOCK_ELEMENTS.contains(&name.as_str()) {
            out.push('\n');
        } else if matches!(name.as_str(), "td" | "th") {
            out.push(' ');
        }
    }

    push_text(&mut out, rest);
    out
}

/// Index of the '>' closing the tag at the start of `s`, ignoring quoted '>'
fn find_tag_end(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices().skip(1) {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(i),
            _ => {}
        }
    }
    None
}

fn tag_name(tag: &str) -> (bool, String) {
    let (closing, body) = match tag.strip_prefix('/') {
        Some(body) => (true, body),
        None => (false, tag),
    };
    let name = body
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    (closing, name)
}

/// Skip past `</name ...>`; an element that is never closed swallows the rest
fn skip_element<'a>(rest: &'a str, name: &str) -> &'a str {
    let lowered = rest.to_ascii_lowercase();
    let needle = format!("</{}", name);
    match lowered.find(&needle) {
        Some(start) => match rest[start..].find('>') {
            Some(end) => &rest[start + end + 1..],
            None => "",
        },
        None => "",
    }
}

/// Append a text run, collapsing HTML whitespace and decoding entities
fn push_text(out: &mut String, text: &str) {
    let mut rest = text;
    let mut last_space = out.ends_with([' ', '\n']) || out.is_empty();

    while !rest.is_empty() {
        let mut chars = rest.chars();
        let Some(c) = chars.next() else { break };

        if c == '&'
            && let Some((decoded, consumed)) = decode_entity(rest)
        {
            out.push(decoded);
            last_space = false;
            rest = &rest[consumed..];
            continue;
        }

        if c.is_ascii_whitespace() {
            if !last_space {
                out.push(' ');
                last_space = true;
            }
        } else {
            out.push(c);
            last_space = false;
        }
        rest = chars.as_str();
    }
}

/// Decode an entity at the start of `s`; returns the character and bytes consumed
fn decode_entity(s: &str) -> Option<(char, usize)> {
    let (semi, _) = s.char_indices().take(12).find(|&(_, c)| c == ';')?;
    let entity = &s[1..semi];

    let decoded = match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "mdash" => '\u{2014}',
        "ndash" => '\u{2013}',
        "hellip" => '\u{2026}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "copy" => '\u{00A9}',
        "reg" => '\u{00AE}',
        "trade" => '\u{2122}',
        "euro" => '\u{20AC}',
        "pound" => '\u{00A3}',
        _ => {
            let code = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code)?
        }
    };

    Some((decoded, semi + 1))
}

/// Trim lines, drop blank ones, and join a dangling `Label:` line to its value
fn tidy(raw: &str) -> String {
    let lines: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut merged: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if line.ends_with(':')
            && let Some(next) = lines.get(i + 1)
            && !next.ends_with(':')
        {
            merged.push(format!("{} {}", line, next));
            i += 2;
            continue;
        }
        merged.push(line.to_string());
        i += 1;
    }

    let mut text = merged.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> String {
        HtmlTextExtractor.extract(html.as_bytes()).unwrap()
    }

    #[test]
    fn test_paragraphs_become_lines() {
        let text = extract("<html><body><p>Hello Jane,</p><p>See   attached.<br>Thanks</p></body></html>");
        assert_eq!(text, "Hello Jane,\nSee attached.\nThanks\n");
    }

    #[test]
    fn test_scripts_and_styles_dropped() {
        let text = extract(
            "<head><title>Re: budget</title><style>p { color: red; }</style></head>\
             <body><script type=\"text/javascript\">var x = '<p>';</script><div>Visible</div>\
             <!-- hidden comment --><NOSCRIPT>no js</NOSCRIPT></body>",
        );
        assert_eq!(text, "Visible\n");
    }

    #[test]
    fn test_entities_decoded() {
        let text = extract("<p>Tom &amp; Jerry &lt;tom@example.com&gt; &#169; &#x41;&nbsp;B &bogus; a < b</p>");
        assert_eq!(text, "Tom & Jerry <tom@example.com> \u{00A9} A B &bogus; a < b\n");
    }

    #[test]
    fn test_header_labels_merged_with_values() {
        let text = extract(
            "<table><tr><td><b>From:</b></td></tr><tr><td>Alice Smith</td></tr>\
             <tr><td>To:</td></tr><tr><td>Cc:</td></tr><tr><td>bob@example.org</td></tr></table>",
        );
        assert_eq!(text, "From: Alice Smith\nTo:\nCc: bob@example.org\n");
    }

    #[test]
    fn test_quoted_angle_bracket_in_attribute() {
        let text = extract("<a title=\"x > y\" href=\"mailto:carol@example.net\">Carol</a>");
        assert_eq!(text, "Carol\n");
    }

    #[test]
    fn test_binary_rejected() {
        let err = HtmlTextExtractor.extract(b"PK\x03\x04\x00\x00").unwrap_err();
        assert_eq!(err, ExtractError::Binary);
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(extract("<html><body></body></html>"), "");
    }
}
