use rusqlite::{params_from_iter, Connection};

use crate::error::Result;
use crate::store::{TransactionFilter, FROM_JOINED};

// ---------------------------------------------------------------------------
// Monthly summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MonthSummary {
    /// `YYYY-MM`
    pub month: String,
    pub income: f64,
    pub spending: f64,
    pub net: f64,
    pub count: i64,
}

pub fn monthly_summary(conn: &Connection, filter: &TransactionFilter) -> Result<Vec<MonthSummary>> {
    let (clause, params) = filter.clause()?;
    let sql = format!(
        "SELECT substr(t.date, 1, 7) AS month, SUM(t.credit), SUM(t.debit), COUNT(*) \
         FROM {FROM_JOINED} WHERE {clause} \
         GROUP BY month ORDER BY month ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
        let income: f64 = row.get(1)?;
        let spending: f64 = row.get(2)?;
        Ok(MonthSummary {
            month: row.get(0)?,
            income,
            spending,
            net: income - spending,
            count: row.get(3)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

// ---------------------------------------------------------------------------
// Category breakdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySpend {
    pub name: String,
    pub total: f64,
    pub count: i64,
    pub pct: f64,
}

pub struct CategoryBreakdown {
    pub categories: Vec<CategorySpend>,
    pub total: f64,
}

/// Spending (debits) per top-level category, largest first.
pub fn category_breakdown(conn: &Connection, filter: &TransactionFilter) -> Result<CategoryBreakdown> {
    let (clause, params) = filter.clause()?;
    let sql = format!(
        "SELECT COALESCE(c.name, 'Uncategorized') AS cat_name, SUM(t.debit) AS spent, COUNT(*) \
         FROM {FROM_JOINED} WHERE {clause} AND t.debit > 0 \
         GROUP BY cat_name ORDER BY spent DESC, cat_name ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let raw: Vec<(String, f64, i64)> = stmt
        .query_map(params_from_iter(params.iter()), |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let total: f64 = raw.iter().map(|(_, t, _)| t).sum();
    let categories = raw
        .into_iter()
        .map(|(name, t, count)| CategorySpend {
            name,
            total: t,
            count,
            pct: if total != 0.0 { t / total * 100.0 } else { 0.0 },
        })
        .collect();

    Ok(CategoryBreakdown { categories, total })
}

// ---------------------------------------------------------------------------
// Totals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Totals {
    pub income: f64,
    pub spending: f64,
    pub net: f64,
    pub count: i64,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
}

pub fn totals(conn: &Connection, filter: &TransactionFilter) -> Result<Totals> {
    let (clause, params) = filter.clause()?;
    let sql = format!(
        "SELECT COALESCE(SUM(t.credit), 0), COALESCE(SUM(t.debit), 0), COUNT(*), MIN(t.date), MAX(t.date) \
         FROM {FROM_JOINED} WHERE {clause}"
    );
    let totals = conn.query_row(&sql, params_from_iter(params.iter()), |row| {
        let income: f64 = row.get(0)?;
        let spending: f64 = row.get(1)?;
        Ok(Totals {
            income,
            spending,
            net: income - spending,
            count: row.get(2)?,
            first_date: row.get(3)?,
            last_date: row.get(4)?,
        })
    })?;
    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use crate::models::TxnType;
    use crate::store::tests::seed;

    #[test]
    fn test_monthly_summary() {
        let (_dir, conn) = test_db();
        seed(&conn);
        let months = monthly_summary(&conn, &TransactionFilter::default()).unwrap();
        let labels: Vec<&str> = months.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(labels, vec!["2024-03", "2024-04", "2024-05"]);
        let april = &months[1];
        assert_eq!(april.income, 90000.0);
        assert_eq!(april.spending, 2750.0);
        assert_eq!(april.net, 87250.0);
        assert_eq!(april.count, 3);
    }

    #[test]
    fn test_category_breakdown() {
        let (_dir, conn) = test_db();
        seed(&conn);
        let breakdown = category_breakdown(&conn, &TransactionFilter::default()).unwrap();
        assert_eq!(breakdown.total, 23350.0);
        assert_eq!(breakdown.categories[0].name, "Housing");
        assert_eq!(breakdown.categories[1].name, "Food & Dining");
        assert_eq!(breakdown.categories[1].count, 3);
        let pct_sum: f64 = breakdown.categories.iter().map(|c| c.pct).sum();
        assert!((pct_sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_breakdown_groups_uncategorized() {
        let (_dir, conn) = test_db();
        seed(&conn);
        conn.execute("UPDATE transactions SET category_id = NULL, subcategory_id = NULL WHERE description = 'BIG BASKET'", [])
            .unwrap();
        let filter = TransactionFilter {
            month: Some("2024-04".to_string()),
            ..Default::default()
        };
        let breakdown = category_breakdown(&conn, &filter).unwrap();
        let names: Vec<&str> = breakdown.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Uncategorized", "Food & Dining"]);
    }

    #[test]
    fn test_totals_with_filter() {
        let (_dir, conn) = test_db();
        seed(&conn);
        let all = totals(&conn, &TransactionFilter::default()).unwrap();
        assert_eq!(all.count, 5);
        assert_eq!(all.first_date.as_deref(), Some("2024-03-28"));
        assert_eq!(all.last_date.as_deref(), Some("2024-05-02"));

        let credits = totals(
            &conn,
            &TransactionFilter {
                txn_type: Some(TxnType::Credit),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(credits.income, 90000.0);
        assert_eq!(credits.spending, 0.0);
    }

    #[test]
    fn test_empty_database_totals() {
        let (_dir, conn) = test_db();
        let t = totals(&conn, &TransactionFilter::default()).unwrap();
        assert_eq!(t, Totals::default());
    }
}
