//! Structured header and email address redaction

use regex::Regex;
use sar_core::{Error, RedactionInfo, RedactionMarker, Result};

/// Local part of RFC 5322 atext plus dots, then a domain of two or more labels
pub const EMAIL_PATTERN: &str =
    r"[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)+";

pub const EMAIL_REDACTION: &str = "email";

/// Header fields whose values identify people
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    SenderName,
    SenderEmailAddress,
    SentRepresentingName,
    SentRepresentingEmailAddress,
    From,
    To,
    Cc,
    ReturnPath,
}

impl HeaderField {
    pub const ALL: [HeaderField; 8] = [
        HeaderField::SenderName,
        HeaderField::SenderEmailAddress,
        HeaderField::SentRepresentingName,
        HeaderField::SentRepresentingEmailAddress,
        HeaderField::From,
        HeaderField::To,
        HeaderField::Cc,
        HeaderField::ReturnPath,
    ];

    pub fn label(self) -> &'static str {
        match self {
            HeaderField::SenderName => "Sender name",
            HeaderField::SenderEmailAddress => "Sender email address",
            HeaderField::SentRepresentingName => "Sent representing name",
            HeaderField::SentRepresentingEmailAddress => "Sent representing email address",
            HeaderField::From => "From",
            HeaderField::To => "To",
            HeaderField::Cc => "Cc",
            HeaderField::ReturnPath => "Return-Path",
        }
    }

    /// Match a line's label, ignoring case and runs of whitespace
    pub fn from_label(label: &str) -> Option<HeaderField> {
        let collapsed = label.split_whitespace().collect::<Vec<_>>().join(" ");
        Self::ALL
            .into_iter()
            .find(|field| field.label().eq_ignore_ascii_case(&collapsed))
    }
}

pub struct HeaderRedactor {
    marker: RedactionMarker,
    email: Regex,
}

impl HeaderRedactor {
    pub fn new(marker: RedactionMarker) -> Result<Self> {
        let email = Regex::new(EMAIL_PATTERN).map_err(|e| Error::Other(e.into()))?;
        Ok(Self { marker, email })
    }

    /// Redact header values line by line, then sweep the whole text for addresses
    pub fn redact(&self, content: &str) -> (String, Vec<RedactionInfo>) {
        let mut counts: Vec<(String, usize)> = Vec::new();
        let headers_done = self.redact_header_lines(content, &mut counts);

        let mut emails = 0;
        let result = self
            .email
            .replace_all(&headers_done, |_: &regex::Captures<'_>| {
                emails += 1;
                self.marker.as_str()
            })
            .into_owned();
        if emails > 0 {
            bump(&mut counts, EMAIL_REDACTION, emails);
        }

        let infos = counts
            .into_iter()
            .map(|(redaction_type, count)| RedactionInfo {
                redaction_type,
                count,
            })
            .collect();

        (result, infos)
    }

    fn redact_header_lines(&self, content: &str, counts: &mut Vec<(String, usize)>) -> String {
        let marker = self.marker.as_str();
        let mut out = String::with_capacity(content.len());
        let mut current: Option<HeaderField> = None;

        for line in content.split_inclusive('\n') {
            let (body, eol) = split_eol(line);

            if let Some(field) = current {
                let folded = body.starts_with([' ', '\t']) && !body.trim().is_empty();
                if folded {
                    let indent_len = body.len() - body.trim_start().len();
                    let value = &body[indent_len..];
                    if value != marker {
                        bump(counts, field.label(), 1);
                    }
                    out.push_str(&body[..indent_len]);
                    out.push_str(marker);
                    out.push_str(eol);
                    continue;
                }
                current = None;
            }

            if let Some((field, label_end)) = header_field(body) {
                let after = &body[label_end + 1..];
                let ws_len = after.len() - after.trim_start().len();
                let value = after[ws_len..].trim_end();

                current = Some(field);
                if value.is_empty() || value == marker {
                    out.push_str(line);
                    continue;
                }

                bump(counts, field.label(), 1);
                out.push_str(&body[..label_end + 1 + ws_len]);
                out.push_str(marker);
                out.push_str(eol);
                continue;
            }

            out.push_str(line);
        }

        out
    }
}

/// Recognise `Label: value` for a redactable label; returns the field and the colon index
fn header_field(line: &str) -> Option<(HeaderField, usize)> {
    if line.starts_with(char::is_whitespace) {
        return None;
    }
    let colon = line.find(':')?;
    HeaderField::from_label(&line[..colon]).map(|field| (field, colon))
}

fn split_eol(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

fn bump(counts: &mut Vec<(String, usize)>, redaction_type: &str, by: usize) {
    match counts.iter_mut().find(|(t, _)| t == redaction_type) {
        Some((_, count)) => *count += by,
        None => counts.push((redaction_type.to_string(), by)),
    }
}
