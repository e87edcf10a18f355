//! Directive grammar: kinds, parsing, typed arguments, and dedup identity

mod args;
mod dedup;
mod kind;
mod parser;

pub use args::{
    parse_count, parse_decimal, parse_signed, round_currency, Amount, ResolvedAmount,
};
pub use dedup::{DedupRegistry, DirectiveKey, Position};
pub use kind::DirectiveKind;
pub use parser::{parse_directives, sanitize_payload, split_fields, Directive, ParseMode, ParsedText};
