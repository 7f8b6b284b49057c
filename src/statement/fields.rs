//! Field-level normalization: amounts, dates, descriptions, and the mapping
//! of one tokenized row onto a [`Transaction`].

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use super::header::{find_key, ColumnRoles, Role};
use crate::models::{Transaction, TxnType};

/// Substrings added by payment rails (UPI reference codes) that carry no
/// meaning for the user. Removed case-insensitively, in this order.
pub const NOISE_PATTERNS: &[&str] = &[
    r"TO TRANSFER-UPI/[A-Z]+/\d+/",
    r"BY TRANSFER-UPI/[A-Z]+/\d+/",
    r"UPI/DR/\d+/",
    r"UPI/CR/\d+/",
    r"/DR/\d+/",
    r"/CR/\d+/",
];

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

fn noise_regexes() -> &'static [Regex] {
    static NOISE: OnceLock<Vec<Regex>> = OnceLock::new();
    NOISE.get_or_init(|| {
        NOISE_PATTERNS
            .iter()
            .filter_map(|p| Regex::new(&format!("(?i){p}")).ok())
            .collect()
    })
}

fn whitespace_regex() -> &'static Regex {
    static WS: OnceLock<Regex> = OnceLock::new();
    WS.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace pattern"))
}

#[derive(Clone, Copy)]
enum MonthPart {
    Numeric,
    Abbrev,
}

struct DateFormat {
    pattern: &'static str,
    month: MonthPart,
    short_year: bool,
}

// Priority order matters: the first format that matches wins. A trailing
// time-of-day (anything after whitespace) is ignored.
static DATE_FORMATS: &[DateFormat] = &[
    DateFormat { pattern: r"^(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4})(?:\s|$)", month: MonthPart::Numeric, short_year: false },
    DateFormat { pattern: r"^(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{2})(?:\s|$)", month: MonthPart::Numeric, short_year: true },
    DateFormat { pattern: r"^(\d{1,2})\s+([A-Za-z]{3})\s+(\d{4})(?:\s|$)", month: MonthPart::Abbrev, short_year: false },
    DateFormat { pattern: r"^(\d{1,2})[/\-]([A-Za-z]{3})[/\-](\d{4})(?:\s|$)", month: MonthPart::Abbrev, short_year: false },
    DateFormat { pattern: r"^(\d{1,2})[/\-]([A-Za-z]{3})[/\-](\d{2})(?:\s|$)", month: MonthPart::Abbrev, short_year: true },
];

fn date_regexes() -> &'static [(Regex, &'static DateFormat)] {
    static DATES: OnceLock<Vec<(Regex, &'static DateFormat)>> = OnceLock::new();
    DATES.get_or_init(|| {
        DATE_FORMATS
            .iter()
            .filter_map(|f| Regex::new(f.pattern).ok().map(|re| (re, f)))
            .collect()
    })
}

fn iso_regex() -> &'static Regex {
    static ISO: OnceLock<Regex> = OnceLock::new();
    ISO.get_or_init(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})(?:\s|T|$)").expect("valid ISO pattern"))
}

fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(s)
        .trim()
}

/// Two-digit years above 50 belong to the 1900s, the rest to the 2000s.
fn expand_year(yy: i32) -> i32 {
    if yy > 50 {
        1900 + yy
    } else {
        2000 + yy
    }
}

fn month_from_abbrev(abbrev: &str) -> Option<u32> {
    let lower = abbrev.to_lowercase();
    MONTHS.iter().position(|m| *m == lower).map(|i| i as u32 + 1)
}

fn iso(year: i32, month: u32, day: u32) -> Option<String> {
    NaiveDate::from_ymd_opt(year, month, day).map(|d| d.format("%Y-%m-%d").to_string())
}

/// Parse a money amount. Never fails: anything unreadable is 0.
///
/// Commas are dropped wholesale, which covers both "283,295.35" and the
/// lakh grouping "2,83,295.35".
pub fn parse_amount(raw: &str) -> f64 {
    let s = strip_quotes(raw);
    if s.is_empty() {
        return 0.0;
    }
    let cleaned: String = s.chars().filter(|c| !matches!(c, ',' | '₹' | '$')).collect();
    match cleaned.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Parse a statement date into `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Option<String> {
    let s = strip_quotes(raw);
    if s.is_empty() {
        return None;
    }

    for (re, format) in date_regexes() {
        let Some(caps) = re.captures(s) else {
            continue;
        };
        let day: u32 = caps[1].parse().ok()?;
        let month = match format.month {
            MonthPart::Numeric => caps[2].parse().ok()?,
            MonthPart::Abbrev => month_from_abbrev(&caps[2])?,
        };
        let year: i32 = caps[3].parse().ok()?;
        let year = if format.short_year { expand_year(year) } else { year };
        return iso(year, month, day);
    }

    let caps = iso_regex().captures(s)?;
    iso(caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?)
}

/// Strip payment-rail noise and collapse whitespace.
///
/// Runs to a fixed point so that removing one code can never expose another
/// on a later call: `clean_description(clean_description(x)) == clean_description(x)`.
pub fn clean_description(raw: &str) -> String {
    let mut current = raw.to_string();
    loop {
        let mut next = current.clone();
        for re in noise_regexes() {
            next = re.replace_all(&next, "").into_owned();
        }
        let next = whitespace_regex().replace_all(&next, " ").trim().to_string();
        if next == current {
            return next;
        }
        current = next;
    }
}

/// One data line keyed by header column name.
#[derive(Debug)]
pub struct RawRecord<'h> {
    header: &'h [String],
    values: Vec<String>,
}

impl<'h> RawRecord<'h> {
    /// Value of the first column named `column`, or "" if absent.
    pub fn get(&self, column: &str) -> &str {
        self.header
            .iter()
            .position(|h| h == column)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Map a tokenized line onto the header. Short rows are padded with empty
/// fields, extra trailing fields are ignored, and rows with nothing but empty
/// fields yield `None`.
pub fn map_row<'h>(header: &'h [String], mut fields: Vec<String>) -> Option<RawRecord<'h>> {
    if fields.iter().all(|f| f.trim().is_empty()) {
        return None;
    }
    if fields.len() < header.len() {
        fields.resize(header.len(), String::new());
    }
    fields.truncate(header.len());
    Some(RawRecord { header, values: fields })
}

/// Header columns resolved per role, computed once per document.
#[derive(Debug, Default)]
pub struct ColumnMap<'h> {
    pub date: Option<&'h str>,
    pub value_date: Option<&'h str>,
    pub description: Option<&'h str>,
    pub reference: Option<&'h str>,
    pub debit: Option<&'h str>,
    pub credit: Option<&'h str>,
    pub balance: Option<&'h str>,
}

impl<'h> ColumnMap<'h> {
    pub fn resolve(header: &'h [String], roles: &ColumnRoles) -> Self {
        Self {
            date: find_key(header, roles, Role::Date),
            value_date: find_key(header, roles, Role::ValueDate),
            description: find_key(header, roles, Role::Description),
            reference: find_key(header, roles, Role::Reference),
            debit: find_key(header, roles, Role::Debit),
            credit: find_key(header, roles, Role::Credit),
            balance: find_key(header, roles, Role::Balance),
        }
    }
}

fn field<'r>(record: &'r RawRecord<'_>, column: Option<&str>) -> &'r str {
    column.map(|c| record.get(c)).unwrap_or("")
}

/// Turn a mapped row into a transaction, or `None` when the primary date or
/// the description is missing.
pub fn normalize_record(record: &RawRecord<'_>, columns: &ColumnMap<'_>) -> Option<Transaction> {
    let date = parse_date(field(record, columns.date))?;
    let description = clean_description(strip_quotes(field(record, columns.description)));
    if description.is_empty() {
        return None;
    }

    let debit = parse_amount(field(record, columns.debit));
    let credit = parse_amount(field(record, columns.credit));
    let balance = parse_amount(field(record, columns.balance));
    let (amount, txn_type) = if credit > 0.0 {
        (credit, TxnType::Credit)
    } else {
        (-debit, TxnType::Debit)
    };

    Some(Transaction {
        id: Transaction::new_id(),
        date,
        value_date: parse_date(field(record, columns.value_date)),
        description,
        reference: strip_quotes(field(record, columns.reference)).to_string(),
        debit,
        credit,
        balance,
        amount,
        txn_type,
        category_id: None,
        subcategory_id: None,
        notes: String::new(),
    })
}
