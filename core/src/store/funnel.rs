use super::{day_column, MetricsStore};
use crate::{error::GenResult, types::format_day, weekly_funnel::WeeklyFunnel};
use rusqlite::params;

impl MetricsStore {
    // ── Weekly funnel ──────────────────────────────────────────────

    pub fn insert_weekly_funnel(&self, w: &WeeklyFunnel) -> GenResult<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO weekly_funnel (
                week_start, visitors, product_views, add_to_cart,
                checkout_started, checkout_completed, conversion_rate
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        stmt.execute(params![
            format_day(w.week_start),
            w.visitors,
            w.product_views,
            w.add_to_cart,
            w.checkout_started,
            w.checkout_completed,
            w.conversion_rate,
        ])?;
        Ok(())
    }

    pub fn weekly_funnel(&self) -> GenResult<Vec<WeeklyFunnel>> {
        let mut stmt = self.conn.prepare(
            "SELECT week_start, visitors, product_views, add_to_cart,
                    checkout_started, checkout_completed, conversion_rate
             FROM weekly_funnel ORDER BY week_start ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(WeeklyFunnel {
                week_start: day_column(row, 0)?,
                visitors: row.get(1)?,
                product_views: row.get(2)?,
                add_to_cart: row.get(3)?,
                checkout_started: row.get(4)?,
                checkout_completed: row.get(5)?,
                conversion_rate: row.get(6)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
