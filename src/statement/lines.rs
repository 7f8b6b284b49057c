//! Quote-aware line handling for tab-separated statement exports.
//!
//! Quotes have no escape mechanism: every `"` flips the in-quote state, so a
//! doubled `""` toggles twice and leaves the state unchanged. An unbalanced
//! quote keeps the rest of the document inside the quote, so an export with a
//! stray quote comes out as one long logical line and the parser rejects it.

/// Collapse newlines that fall inside a quoted field into a single space so
/// every logical record occupies exactly one line.
pub fn normalize_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                out.push(c);
            }
            '\r' if in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' | '\r' if in_quotes => out.push(' '),
            _ => out.push(c),
        }
    }
    out
}

/// Split one line on tabs outside quotes. Quote characters are dropped and
/// each field is trimmed; the last field is always emitted, even if empty.
pub fn tokenize_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            '\t' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}
