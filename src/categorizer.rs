use regex::Regex;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::error::Result;
use crate::models::{MatchType, Rule};

fn matches(description: &str, rule: &Rule, compiled: Option<&Regex>) -> bool {
    let desc_upper = description.to_uppercase();
    let pat_upper = rule.pattern.to_uppercase();
    match rule.match_type {
        MatchType::Contains => desc_upper.contains(&pat_upper),
        MatchType::StartsWith => desc_upper.starts_with(&pat_upper),
        MatchType::Regex => compiled.is_some_and(|re| re.is_match(description)),
    }
}

/// Active rules, highest priority first; ties go to the older rule.
pub fn load_rules(conn: &Connection) -> Result<Vec<Rule>> {
    let mut stmt = conn.prepare(
        "SELECT id, pattern, match_type, category_id, subcategory_id, priority FROM rules \
         WHERE is_active = 1 ORDER BY priority DESC, id ASC",
    )?;
    let raw: Vec<(i64, String, String, i64, Option<i64>, i64)> = stmt
        .query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut rules = Vec::with_capacity(raw.len());
    for (id, pattern, match_type, category_id, subcategory_id, priority) in raw {
        let Ok(match_type) = match_type.parse::<MatchType>() else {
            warn!(rule = id, %match_type, "skipping rule with unknown match type");
            continue;
        };
        rules.push(Rule {
            id,
            pattern,
            match_type,
            category_id,
            subcategory_id,
            priority,
        });
    }
    Ok(rules)
}

pub struct CategorizeResult {
    pub categorized: usize,
    pub uncategorized: usize,
}

/// Apply rules to uncategorized transactions, or to every transaction when
/// `all` is set. The first matching rule wins and its hit count goes up.
pub fn categorize_transactions(conn: &Connection, all: bool) -> Result<CategorizeResult> {
    let rules = load_rules(conn)?;
    let compiled: Vec<Option<Regex>> = rules
        .iter()
        .map(|r| match r.match_type {
            MatchType::Regex => Regex::new(&r.pattern).ok(),
            _ => None,
        })
        .collect();

    let sql = if all {
        "SELECT id, description FROM transactions"
    } else {
        "SELECT id, description FROM transactions WHERE category_id IS NULL"
    };
    let mut txn_stmt = conn.prepare(sql)?;
    let pending: Vec<(String, String)> = txn_stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut categorized = 0usize;
    let mut uncategorized = 0usize;

    for (txn_id, description) in &pending {
        let hit = rules
            .iter()
            .zip(&compiled)
            .find(|(rule, re)| matches(description, rule, re.as_ref()));
        match hit {
            Some((rule, _)) => {
                conn.execute(
                    "UPDATE transactions SET category_id = ?1, subcategory_id = ?2 WHERE id = ?3",
                    rusqlite::params![rule.category_id, rule.subcategory_id, txn_id],
                )?;
                conn.execute(
                    "UPDATE rules SET hit_count = hit_count + 1 WHERE id = ?1",
                    [rule.id],
                )?;
                categorized += 1;
            }
            None => uncategorized += 1,
        }
    }

    info!(categorized, uncategorized, "applied categorization rules");
    Ok(CategorizeResult {
        categorized,
        uncategorized,
    })
}
