//! Response normalisation: deterministic cleanup of model-generated JSON.
//!
//! Models asked for "JSON format" routinely reply with something that is
//! *almost* JSON:
//!
//! - the payload wrapped in ` ```json ... ``` ` fences
//! - a stray `JSON` label glued to the opening brace (`JSON{...}`)
//! - pretty-printing with tabs and newlines
//! - trailing commas before `}` or `]`
//!
//! This module applies six cheap regex/string rules that target exactly those
//! failure modes. It is not a general JSON repair tool: anything outside this
//! list is left alone and will surface as an opaque payload after decoding.
//!
//! ## Rule Order
//!
//! Fences and newlines are stripped before whitespace is collapsed, and the
//! label is stripped before collapsing so the inserted brace never picks up a
//! boundary space. Running [`normalize_response`] on its own output returns
//! the same string.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// Apply all normalisation rules to the raw model reply.
///
/// Total over all inputs: never fails, never panics.
///
/// Rules (applied in order):
/// 1. Strip code-fence markers (` ```json ` and bare ` ``` `) and every `\n`
/// 2. Replace a leading, case-insensitive `JSON{` label with `{`
/// 3. Collapse every whitespace run into one space
/// 4. Drop commas that directly precede `}`
/// 5. Drop commas that directly precede `]`
/// 6. Trim
pub fn normalize_response(raw: &str) -> String {
    let s = strip_fences_and_newlines(raw);
    let s = strip_leading_label(&s);
    let s = collapse_whitespace(&s);
    let s = drop_trailing_commas_before_brace(&s);
    let s = drop_trailing_commas_before_bracket(&s);
    s.trim().to_string()
}

// ── Rule 1: Strip fences and newlines ────────────────────────────────────────

static RE_FENCES_AND_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```json|```|\n").expect("valid regex"));

/// Removing a newline can glue two backtick runs into a fresh fence
/// (`` ``\n` ``), so repeat until nothing matches. Each pass shortens the
/// string, which bounds the loop.
fn strip_fences_and_newlines(input: &str) -> String {
    let mut current = input.to_string();
    loop {
        match RE_FENCES_AND_NEWLINES.replace_all(&current, "") {
            Cow::Borrowed(_) => return current,
            Cow::Owned(next) => current = next,
        }
    }
}

// ── Rule 2: Strip a leading label ────────────────────────────────────────────

static RE_LEADING_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*JSON\{").expect("valid regex"));

fn strip_leading_label(input: &str) -> String {
    RE_LEADING_LABEL.replace(input, "{").into_owned()
}

// ── Rule 3: Collapse whitespace ──────────────────────────────────────────────

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

fn collapse_whitespace(input: &str) -> String {
    RE_WHITESPACE.replace_all(input, " ").into_owned()
}

// ── Rules 4 & 5: Trailing commas ─────────────────────────────────────────────
//
// A run such as `,,}` or `, ,]` is consumed in one match; matching a single
// comma would leave `,}` behind for a second pass to find.

static RE_COMMA_BEFORE_BRACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:,\s*)+\}").expect("valid regex"));

static RE_COMMA_BEFORE_BRACKET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:,\s*)+\]").expect("valid regex"));

fn drop_trailing_commas_before_brace(input: &str) -> String {
    RE_COMMA_BEFORE_BRACE.replace_all(input, "}").into_owned()
}

fn drop_trailing_commas_before_bracket(input: &str) -> String {
    RE_COMMA_BEFORE_BRACKET.replace_all(input, "]").into_owned()
}

// ── Tests ────────────────────────────────────────────────────────────────────
