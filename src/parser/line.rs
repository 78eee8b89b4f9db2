//! Classification of single GetPot lines.

/// What a trimmed GetPot line contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    /// `[name]`, `[./name]` or `[./]`, optionally followed by `# comment`.
    /// `trailing` holds any other text after the closing bracket.
    Open {
        name: &'a str,
        comment: Option<&'a str>,
        trailing: Option<&'a str>,
    },
    /// `[]` or `[../]`.
    Close { trailing: Option<&'a str> },
    /// `key = value`, optionally followed by `# comment`.
    Param {
        name: &'a str,
        value: &'a str,
        comment: Option<&'a str>,
    },
    /// Text after a leading `#` that is neither a header nor a parameter.
    Comment(&'a str),
    Unknown,
}

/// Classify a line that has already been trimmed and is not empty.
pub fn classify(line: &str) -> Line<'_> {
    if let Some(rest) = line.strip_prefix('#') {
        return Line::Comment(rest.trim());
    }
    if line.starts_with('[') {
        return classify_header(line);
    }
    classify_param(line).unwrap_or(Line::Unknown)
}

fn classify_header(line: &str) -> Line<'_> {
    let Some(close) = line.find(']') else {
        return Line::Unknown;
    };
    let inner = line[1..close].trim();
    if inner.contains('[') {
        return Line::Unknown;
    }
    let rest = line[close + 1..].trim();
    let (comment, trailing) = match rest.strip_prefix('#') {
        Some(c) => (Some(c.trim()), None),
        None if rest.is_empty() => (None, None),
        None => match rest.split_once('#') {
            Some((junk, c)) => (Some(c.trim()), Some(junk.trim())),
            None => (None, Some(rest)),
        },
    };
    match inner {
        "" | "../" => Line::Close { trailing },
        _ => {
            let name = inner.strip_prefix("./").unwrap_or(inner);
            Line::Open {
                name,
                comment,
                trailing,
            }
        }
    }
}

/// Split `key = value # comment`. Returns `None` when the line does not have
/// that shape.
pub fn classify_param(line: &str) -> Option<Line<'_>> {
    let (key, rest) = line.split_once('=')?;
    let name = key.trim();
    if name.is_empty() || name.contains(['[', ']', '#']) {
        return None;
    }
    let (value, comment) = match find_comment(rest) {
        Some(idx) => (&rest[..idx], Some(rest[idx + 1..].trim())),
        None => (rest, None),
    };
    Some(Line::Param {
        name,
        value: value.trim(),
        comment,
    })
}

/// Position of the `#` that starts an inline comment: outside single quotes,
/// preceded by whitespace, and after a non-empty value. A `#` inside a word
/// (`a#b`) or leading the value (`#ff0000`) is part of the value.
fn find_comment(text: &str) -> Option<usize> {
    let quoting = text.trim_start().starts_with('\'');
    let mut quoted = false;
    let mut prev_space = false;
    for (i, ch) in text.char_indices() {
        match ch {
            '\'' if quoting => quoted = !quoted,
            '#' if !quoted && prev_space && !text[..i].trim().is_empty() => return Some(i),
            _ => {}
        }
        prev_space = ch.is_whitespace();
    }
    None
}

/// True if `value` is a single-quoted string that is not closed yet.
/// Apostrophes inside unquoted values (`bob's_run`) do not count.
pub fn has_open_quote(value: &str) -> bool {
    value.starts_with('\'') && value.matches('\'').count() % 2 == 1
}
