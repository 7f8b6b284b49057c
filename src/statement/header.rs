//! Column roles and header detection.
//!
//! Statements from different banks name the same column differently
//! ("Txn Date", "Transaction Date", "Withdrawal Amt", "Dr" ...). Each
//! canonical role carries a list of accepted header names; the table is plain
//! data and can be overridden from settings without touching the parser.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::lines::tokenize_line;

/// Lines scanned for a header before falling back to line 0.
pub const HEADER_SCAN_LIMIT: usize = 50;

const DATE_MARKERS: &[&str] = &["date"];
const DATE_EXCLUDES: &[&str] = &["statement", "open"];
const AMOUNT_MARKERS: &[&str] = &["debit", "credit", "balance", "withdrawal", "deposit"];
const DESCRIPTION_MARKERS: &[&str] = &["description", "details", "particulars", "narration"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Date,
    ValueDate,
    Description,
    Reference,
    Debit,
    Credit,
    Balance,
}

/// Accepted header names per role, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnRoles {
    pub date: Vec<String>,
    pub value_date: Vec<String>,
    pub description: Vec<String>,
    pub reference: Vec<String>,
    pub debit: Vec<String>,
    pub credit: Vec<String>,
    pub balance: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for ColumnRoles {
    fn default() -> Self {
        Self {
            date: names(&["date", "txn date", "transaction date", "tran date", "posting date"]),
            value_date: names(&["value date", "value dt"]),
            description: names(&[
                "description",
                "details",
                "particulars",
                "narration",
                "transaction details",
                "remarks",
            ]),
            reference: names(&[
                "ref no./cheque no.",
                "ref no",
                "reference",
                "cheque no",
                "chq no",
                "chq/ref no",
                "reference no",
            ]),
            debit: names(&["debit", "withdrawal", "dr", "debit amount", "withdrawal amt", "withdrawal amount"]),
            credit: names(&["credit", "deposit", "cr", "credit amount", "deposit amt", "deposit amount"]),
            balance: names(&["balance", "closing balance", "running balance", "balance amount"]),
        }
    }
}

impl ColumnRoles {
    pub fn variants(&self, role: Role) -> &[String] {
        match role {
            Role::Date => &self.date,
            Role::ValueDate => &self.value_date,
            Role::Description => &self.description,
            Role::Reference => &self.reference,
            Role::Debit => &self.debit,
            Role::Credit => &self.credit,
            Role::Balance => &self.balance,
        }
    }
}

/// True when `needle` occurs in `haystack` bounded by non-letters or the
/// string edges. Keeps "cr" from matching inside "Description".
fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphabetic) && !after.is_some_and(char::is_alphabetic)
    })
}

/// Resolve the header column that plays `role`.
///
/// Exact case-insensitive matches are tried first; only if none exists does a
/// whole-word match count. Within a pass the first header in column order wins.
pub fn find_key<'h>(headers: &'h [String], roles: &ColumnRoles, role: Role) -> Option<&'h str> {
    let variants: Vec<String> = roles.variants(role).iter().map(|v| v.to_lowercase()).collect();
    let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

    let exact = lowered
        .iter()
        .position(|h| variants.iter().any(|v| v == h));
    let index = exact.or_else(|| {
        lowered
            .iter()
            .position(|h| variants.iter().any(|v| contains_word(h, v)))
    })?;
    Some(headers[index].as_str())
}

fn is_header(tokens: &[String]) -> bool {
    let lowered: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
    let has_any = |markers: &[&str], t: &str| markers.iter().any(|m| t.contains(m));

    let has_date = lowered
        .iter()
        .any(|t| has_any(DATE_MARKERS, t) && !has_any(DATE_EXCLUDES, t));
    let has_amount = lowered.iter().any(|t| has_any(AMOUNT_MARKERS, t));
    let has_description = lowered.iter().any(|t| has_any(DESCRIPTION_MARKERS, t));

    has_date && has_amount && has_description
}

/// Find the header among the first [`HEADER_SCAN_LIMIT`] lines. Falls back to
/// line 0 when nothing qualifies. Returns the line index and its trimmed,
/// original-case column names.
pub fn locate_header(lines: &[&str]) -> (usize, Vec<String>) {
    for (index, line) in lines.iter().take(HEADER_SCAN_LIMIT).enumerate() {
        let tokens = tokenize_line(line);
        if is_header(&tokens) {
            debug!(index, columns = tokens.len(), "located statement header");
            return (index, tokens);
        }
    }
    warn!("no header row found in the first {HEADER_SCAN_LIMIT} lines; using the first line");
    (0, lines.first().map(|l| tokenize_line(l)).unwrap_or_default())
}
