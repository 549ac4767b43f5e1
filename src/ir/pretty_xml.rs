//! Line-based indentation of serialized XML.
//!
//! The input is expected to be compact (`...><...` with no whitespace between
//! tags). A line break is inserted at every tag boundary and each resulting
//! line is indented two spaces per open element. Text content is never
//! touched, so the output parses to the same tree as the input.

const PADDING: &str = "  ";

/// Pretty-print compact XML.
///
/// Lines are broken only at `><` tag boundaries. Newlines already inside
/// text or attribute values are kept as they are and never indented.
pub fn format_xml(xml: &str) -> String {
    let pieces: Vec<&str> = xml.split("><").collect();
    let last = pieces.len().saturating_sub(1);

    let mut pad: usize = 0;
    let mut out = String::with_capacity(xml.len() + xml.len() / 4);

    for (idx, piece) in pieces.iter().enumerate() {
        let mut node = String::with_capacity(piece.len() + 2);
        if idx > 0 {
            node.push('<');
        }
        node.push_str(piece);
        if idx < last {
            node.push('>');
        }

        let mut indent = 0;
        if opens_and_closes(&node) {
            indent = 0;
        } else if starts_with_closing_tag(&node) {
            pad = pad.saturating_sub(1);
        } else if is_opening_tag(&node) {
            indent = 1;
        }

        if idx > 0 {
            out.push('\n');
        }
        out.push_str(&PADDING.repeat(pad));
        out.push_str(&node);
        pad += indent;
    }

    out
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// `<a>text</a>`: something, then a closing tag ending the line.
fn opens_and_closes(line: &str) -> bool {
    let Some(body) = line.strip_suffix('>') else {
        return false;
    };
    let tail_start = body.rfind('>').map_or(0, |idx| idx + 1);

    body[tail_start..].match_indices("</").any(|(offset, _)| {
        let start = tail_start + offset;
        start > 0
            && body[start + 2..]
                .chars()
                .next()
                .is_some_and(is_word_char)
    })
}

/// `</a>`
fn starts_with_closing_tag(line: &str) -> bool {
    line.strip_prefix("</")
        .and_then(|rest| rest.chars().next())
        .is_some_and(is_word_char)
}

/// `<a ...>` that is not self-closing (`<a/>`).
fn is_opening_tag(line: &str) -> bool {
    let Some(rest) = line.strip_prefix('<') else {
        return false;
    };
    if !rest.chars().next().is_some_and(is_word_char) {
        return false;
    }
    match rest.find('>') {
        Some(close) => !rest[..close].ends_with('/'),
        None => false,
    }
}
