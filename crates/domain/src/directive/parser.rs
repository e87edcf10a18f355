//! Directive extraction from generated narration
//!
//! Directives look like `IDENTIFIER[payload]` where the identifier is a run of
//! `[A-Z_]` directly before the opening bracket. Payloads may nest further
//! directives; brackets are matched by depth counting. Extracted spans are
//! removed from the display text by position, never by searching for the raw
//! string.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::dedup::{DirectiveKey, Position};
use super::kind::DirectiveKind;

/// How to treat a directive whose closing bracket has not arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// The buffer is still growing. An unclosed candidate is a pending tail,
    /// so scanning stops there and nothing inside it is extracted yet.
    Streaming,
    /// The text is complete. An unclosed candidate is malformed; scanning
    /// resumes right after its opening bracket.
    Final,
}

/// One directive occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Directive {
    pub kind: DirectiveKind,
    /// Sanitized payload between the outer brackets
    pub payload: String,
    /// The untouched source text of the directive
    pub raw: String,
    /// Byte span of `raw` in the parsed text
    pub span: Range<usize>,
    pub position: Position,
}

impl Directive {
    pub fn key(&self) -> DirectiveKey {
        DirectiveKey::new(self.kind, self.position)
    }

    /// Top-level pipe-delimited fields, trimmed.
    pub fn fields(&self) -> Vec<&str> {
        split_fields(&self.payload)
    }

    /// A positional field, `None` when missing or blank.
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields()
            .get(index)
            .copied()
            .filter(|value| !value.is_empty())
    }
}

/// Result of a parse pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedText {
    pub directives: Vec<Directive>,
    /// Source text with directive spans removed and whitespace collapsed
    pub display_text: String,
}

fn is_identifier_byte(byte: u8) -> bool {
    byte.is_ascii_uppercase() || byte == b'_'
}

/// Find the byte index of the bracket closing the one at `open`.
fn matching_bracket(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, byte) in bytes[open..].iter().enumerate() {
        match byte {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse directives out of `text`.
pub fn parse_directives(text: &str, mode: ParseMode) -> ParsedText {
    let bytes = text.as_bytes();
    let mut directives = Vec::new();
    // Identifiers may not reach back into an already extracted directive
    let mut floor = 0usize;
    let mut cursor = 0usize;

    while cursor < bytes.len() {
        if bytes[cursor] != b'[' {
            cursor += 1;
            continue;
        }

        let open = cursor;
        let mut start = open;
        while start > floor && is_identifier_byte(bytes[start - 1]) {
            start -= 1;
        }

        let Some(kind) = DirectiveKind::from_identifier(&text[start..open]) else {
            cursor = open + 1;
            continue;
        };

        let Some(close) = matching_bracket(bytes, open) else {
            match mode {
                ParseMode::Streaming => break,
                ParseMode::Final => {
                    cursor = open + 1;
                    continue;
                }
            }
        };

        directives.push(Directive {
            kind,
            payload: sanitize_payload(&text[open + 1..close]),
            raw: text[start..=close].to_string(),
            span: start..close + 1,
            position: Position::Offset(start),
        });
        floor = close + 1;
        cursor = close + 1;
    }

    let display_text = strip_spans(text, &directives);
    ParsedText {
        directives,
        display_text,
    }
}

/// Allow-list payload characters; other whitespace becomes a plain space.
pub fn sanitize_payload(payload: &str) -> String {
    payload
        .chars()
        .filter_map(|c| match c {
            c if c.is_alphanumeric() => Some(c),
            '_' | '|' | '-' | ',' | '.' | ' ' | '+' | '[' | ']' => Some(c),
            c if c.is_whitespace() => Some(' '),
            _ => None,
        })
        .collect()
}

/// Split on pipes that are not inside nested brackets.
pub fn split_fields(payload: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (index, c) in payload.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '|' if depth == 0 => {
                fields.push(payload[start..index].trim());
                start = index + 1;
            }
            _ => {}
        }
    }
    fields.push(payload[start..].trim());
    fields
}

fn strip_spans(text: &str, directives: &[Directive]) -> String {
    let mut kept = String::with_capacity(text.len());
    let mut last = 0usize;
    for directive in directives {
        kept.push_str(&text[last..directive.span.start]);
        kept.push(' ');
        last = directive.span.end;
    }
    kept.push_str(&text[last..]);
    normalize_whitespace(&kept)
}

/// Collapse whitespace runs while keeping paragraph breaks.
fn normalize_whitespace(text: &str) -> String {
    text.split("\n\n")
        .map(|paragraph| paragraph.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|paragraph| !paragraph.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_directive_and_strips_it_from_display() {
        let parsed = parse_directives("You take DAMAGE[player|10|fire] damage.", ParseMode::Final);

        assert_eq!(parsed.directives.len(), 1);
        let directive = &parsed.directives[0];
        assert_eq!(directive.kind, DirectiveKind::Damage);
        assert_eq!(directive.payload, "player|10|fire");
        assert_eq!(directive.raw, "DAMAGE[player|10|fire]");
        assert_eq!(directive.position, Position::Offset(9));
        assert_eq!(directive.fields(), vec!["player", "10", "fire"]);
        assert_eq!(parsed.display_text, "You take damage.");
    }

    #[test]
    fn nested_directive_stays_inside_outer_payload() {
        let parsed = parse_directives(
            "STATUS_ADD[Blinded|For ROLL[1d4] turns]",
            ParseMode::Final,
        );

        assert_eq!(parsed.directives.len(), 1);
        let directive = &parsed.directives[0];
        assert_eq!(directive.kind, DirectiveKind::StatusAdd);
        assert_eq!(directive.field(1), Some("For ROLL[1d4] turns"));
        assert_eq!(parsed.display_text, "");
    }

    #[test]
    fn unclosed_candidate_is_not_a_directive() {
        let parsed = parse_directives("BROKEN[no close", ParseMode::Final);
        assert!(parsed.directives.is_empty());
        assert_eq!(parsed.display_text, "BROKEN[no close");

        let parsed = parse_directives("DAMAGE[player|3 and then", ParseMode::Final);
        assert!(parsed.directives.is_empty());
        assert_eq!(parsed.display_text, "DAMAGE[player|3 and then");
    }

    #[test]
    fn final_mode_resumes_inside_unclosed_candidate() {
        let parsed = parse_directives("STATUS_ADD[x ROLL[1d4] more", ParseMode::Final);
        assert_eq!(parsed.directives.len(), 1);
        assert_eq!(parsed.directives[0].kind, DirectiveKind::Roll);
    }

    #[test]
    fn streaming_mode_stops_at_pending_tail() {
        let parsed = parse_directives(
            "GOLD[5] then STATUS_ADD[x ROLL[1d4] more",
            ParseMode::Streaming,
        );
        assert_eq!(parsed.directives.len(), 1);
        assert_eq!(parsed.directives[0].kind, DirectiveKind::Gold);
    }

    #[test]
    fn unknown_identifiers_are_left_in_text() {
        let parsed = parse_directives("A NOTE[hello] and GOLD[-3]", ParseMode::Final);
        assert_eq!(parsed.directives.len(), 1);
        assert_eq!(parsed.directives[0].kind, DirectiveKind::Gold);
        assert_eq!(parsed.display_text, "A NOTE[hello] and");
    }

    #[test]
    fn identical_directives_are_distinct_occurrences() {
        let text = "GOLD[5] GOLD[5]";
        let parsed = parse_directives(text, ParseMode::Final);
        assert_eq!(parsed.directives.len(), 2);
        assert_ne!(parsed.directives[0].key(), parsed.directives[1].key());
        assert_eq!(parsed.directives[1].span, 8..15);
    }

    #[test]
    fn payload_is_sanitized() {
        let parsed = parse_directives("SUGGEST[Open the <door>!\tnow]", ParseMode::Final);
        assert_eq!(parsed.directives[0].payload, "Open the door now");
    }

    #[test]
    fn empty_payload_is_valid() {
        let parsed = parse_directives("Rest now. LONG_REST[]", ParseMode::Final);
        assert_eq!(parsed.directives.len(), 1);
        assert_eq!(parsed.directives[0].payload, "");
        assert_eq!(parsed.directives[0].field(0), None);
    }

    #[test]
    fn paragraph_breaks_survive_normalization() {
        let parsed = parse_directives("First  line GOLD[1].\n\nSecond\tline", ParseMode::Final);
        assert_eq!(parsed.display_text, "First line .\n\nSecond line");
    }

    #[test]
    fn split_fields_ignores_nested_pipes() {
        assert_eq!(
            split_fields("a | USE[b|c] | d"),
            vec!["a", "USE[b|c]", "d"]
        );
    }
}
