use super::{day_column, MetricsStore};
use crate::{
    error::GenResult,
    support_tickets::SupportTicket,
    types::{format_day, Day},
};
use rusqlite::params;
use serde::Serialize;

/// One month of the cancellation trend report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyShare {
    /// `YYYY-MM`
    pub month: String,
    pub total_tickets: i64,
    pub matching_tickets: i64,
    /// Percentage rounded to one decimal.
    pub matching_pct: f64,
}

fn ticket_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<SupportTicket> {
    Ok(SupportTicket {
        ticket_id: row.get(0)?,
        created_date: day_column(row, 1)?,
        category: row.get(2)?,
        subcategory: row.get(3)?,
        channel: row.get(4)?,
        sentiment_score: row.get(5)?,
        resolution_hours: row.get(6)?,
        escalated: row.get::<_, i32>(7)? != 0,
    })
}

impl MetricsStore {
    // ── Support tickets ────────────────────────────────────────────

    pub fn insert_ticket(&self, t: &SupportTicket) -> GenResult<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO support_tickets (
                ticket_id, created_date, category, subcategory, channel,
                sentiment_score, resolution_hours, escalated
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        stmt.execute(params![
            t.ticket_id,
            format_day(t.created_date),
            &t.category,
            &t.subcategory,
            &t.channel,
            t.sentiment_score,
            t.resolution_hours,
            if t.escalated { 1i32 } else { 0i32 },
        ])?;
        Ok(())
    }

    pub fn tickets(&self) -> GenResult<Vec<SupportTicket>> {
        let mut stmt = self.conn.prepare(
            "SELECT ticket_id, created_date, category, subcategory, channel,
                    sentiment_score, resolution_hours, escalated
             FROM support_tickets ORDER BY ticket_id ASC",
        )?;
        let rows = stmt.query_map([], ticket_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn ticket_count(&self) -> GenResult<i64> {
        self.table_row_count("support_tickets")
    }

    /// Per-month share of tickets in `category`, from `since` onward.
    pub fn monthly_category_share(&self, category: &str, since: Day) -> GenResult<Vec<MonthlyShare>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                strftime('%Y-%m', created_date) AS month,
                COUNT(*) AS total_tickets,
                SUM(CASE WHEN category = ?1 THEN 1 ELSE 0 END) AS matching,
                ROUND(100.0 * SUM(CASE WHEN category = ?1 THEN 1 ELSE 0 END) / COUNT(*), 1)
             FROM support_tickets
             WHERE created_date >= ?2
             GROUP BY month
             ORDER BY month",
        )?;
        let rows = stmt.query_map(params![category, format_day(since)], |row| {
            Ok(MonthlyShare {
                month: row.get(0)?,
                total_tickets: row.get(1)?,
                matching_tickets: row.get(2)?,
                matching_pct: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
