use super::{day_column, MetricsStore};
use crate::{
    daily_metrics::DailyMetric,
    error::GenResult,
    types::{cents_from_f64, cents_to_f64, format_day, parse_day, Day},
};
use rusqlite::{params, OptionalExtension};

fn daily_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<DailyMetric> {
    Ok(DailyMetric {
        date: day_column(row, 0)?,
        sessions: row.get(1)?,
        new_users: row.get(2)?,
        signups: row.get(3)?,
        trials_started: row.get(4)?,
        conversions: row.get(5)?,
        revenue_cents: cents_from_f64(row.get(6)?),
        avg_order_value: row.get(7)?,
    })
}

impl MetricsStore {
    // ── Daily aggregates ───────────────────────────────────────────

    pub fn insert_daily_metric(&self, m: &DailyMetric) -> GenResult<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO daily_metrics (
                date, sessions, new_users, signups, trials_started,
                conversions, revenue, avg_order_value
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        stmt.execute(params![
            format_day(m.date),
            m.sessions,
            m.new_users,
            m.signups,
            m.trials_started,
            m.conversions,
            cents_to_f64(m.revenue_cents),
            m.avg_order_value,
        ])?;
        Ok(())
    }

    pub fn daily_metrics(&self) -> GenResult<Vec<DailyMetric>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, sessions, new_users, signups, trials_started,
                    conversions, revenue, avg_order_value
             FROM daily_metrics ORDER BY date ASC",
        )?;
        let rows = stmt.query_map([], daily_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn daily_metric(&self, date: Day) -> GenResult<Option<DailyMetric>> {
        self.conn
            .query_row(
                "SELECT date, sessions, new_users, signups, trials_started,
                        conversions, revenue, avg_order_value
                 FROM daily_metrics WHERE date = ?1",
                params![format_day(date)],
                daily_row_mapper,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn daily_date_range(&self) -> GenResult<Option<(Day, Day)>> {
        let (min, max): (Option<String>, Option<String>) = self.conn.query_row(
            "SELECT MIN(date), MAX(date) FROM daily_metrics",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        match (min, max) {
            (Some(min), Some(max)) => Ok(Some((
                parse_day(&min).map_err(anyhow::Error::from)?,
                parse_day(&max).map_err(anyhow::Error::from)?,
            ))),
            _ => Ok(None),
        }
    }

    /// Summed (sessions, conversions) over `[from, to]`, or None when no
    /// daily rows fall inside the window.
    pub fn daily_sums_between(&self, from: Day, to: Day) -> GenResult<Option<(i64, i64)>> {
        let (sessions, conversions): (Option<i64>, Option<i64>) = self.conn.query_row(
            "SELECT SUM(sessions), SUM(conversions)
             FROM daily_metrics WHERE date >= ?1 AND date <= ?2",
            params![format_day(from), format_day(to)],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(sessions.map(|s| (s, conversions.unwrap_or(0))))
    }
}
