//! Content-line lexing (RFC 5545 §3.1)

use agendum_domain::{AgendumError, Result};

/// Longest line emitted before folding, in octets.
const FOLD_WIDTH: usize = 75;

/// One `NAME;PARAM=VALUE:value` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    /// Upper-cased property name.
    pub name: String,
    /// Parameters in source order; names upper-cased, values unquoted.
    pub params: Vec<(String, String)>,
    pub value: String,
}

impl ContentLine {
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Join folded lines: a line break followed by a space or tab is removed.
#[must_use]
pub fn unfold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        let newline = match c {
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                true
            }
            '\n' => true,
            _ => false,
        };

        if !newline {
            out.push(c);
        } else if matches!(chars.peek(), Some(' ' | '\t')) {
            chars.next();
        } else {
            out.push('\n');
        }
    }
    out
}

/// Unfolded, non-empty lines.
#[must_use]
pub fn split_lines(text: &str) -> Vec<String> {
    unfold(text)
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_content_line(line: &str) -> Result<ContentLine> {
    let malformed = |reason: &str| {
        AgendumError::MalformedCalendarObject(format!("{reason} in content line '{line}'"))
    };

    let name_end = line.find([';', ':']).ok_or_else(|| malformed("missing ':'"))?;
    let name = &line[..name_end];
    if name.is_empty() {
        return Err(malformed("empty property name"));
    }

    let mut params = Vec::new();
    let mut rest = &line[name_end..];
    while let Some(after_semicolon) = rest.strip_prefix(';') {
        let eq = after_semicolon.find('=').ok_or_else(|| malformed("parameter without '='"))?;
        let key = after_semicolon[..eq].to_ascii_uppercase();
        let (value, remaining) = param_value(&after_semicolon[eq + 1..])
            .ok_or_else(|| malformed("unterminated quoted parameter"))?;
        params.push((key, value));
        rest = remaining;
    }

    let value = rest.strip_prefix(':').ok_or_else(|| malformed("missing ':'"))?;
    Ok(ContentLine { name: name.to_ascii_uppercase(), params, value: value.to_string() })
}

/// Split one parameter value off `input`, honouring DQUOTE-quoted sections.
fn param_value(input: &str) -> Option<(String, &str)> {
    let mut value = String::new();
    let mut quoted = false;
    for (index, c) in input.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ';' | ':' if !quoted => return Some((value, &input[index..])),
            _ => value.push(c),
        }
    }
    None
}

/// Fold a line at 75 octets without splitting a UTF-8 sequence.
#[must_use]
pub fn fold(line: &str) -> String {
    if line.len() <= FOLD_WIDTH {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + line.len() / FOLD_WIDTH * 3);
    let mut width = 0;
    for c in line.chars() {
        // continuation lines carry a leading space
        if width + c.len_utf8() > FOLD_WIDTH {
            out.push_str("\r\n ");
            width = 1;
        }
        out.push(c);
        width += c.len_utf8();
    }
    out
}
