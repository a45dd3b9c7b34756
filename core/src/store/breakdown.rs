use super::{day_column, MetricsStore};
use crate::{
    channel_metrics::ChannelMetric,
    error::GenResult,
    product_metrics::ProductMetric,
    types::{cents_from_f64, cents_to_f64, format_day},
};
use rusqlite::params;

fn channel_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChannelMetric> {
    Ok(ChannelMetric {
        date: day_column(row, 0)?,
        channel_id: row.get(1)?,
        channel_name: row.get(2)?,
        sessions: row.get(3)?,
        signups: row.get(4)?,
        conversions: row.get(5)?,
        revenue_cents: cents_from_f64(row.get(6)?),
    })
}

fn product_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProductMetric> {
    Ok(ProductMetric {
        date: day_column(row, 0)?,
        product_id: row.get(1)?,
        product_name: row.get(2)?,
        units_sold: row.get(3)?,
        revenue_cents: cents_from_f64(row.get(4)?),
        refunds: row.get(5)?,
        refund_amount: row.get(6)?,
    })
}

impl MetricsStore {
    // ── Channel breakdown ──────────────────────────────────────────

    pub fn insert_channel_metric(&self, m: &ChannelMetric) -> GenResult<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO channel_metrics (
                date, channel_id, channel_name, sessions, signups, conversions, revenue
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        stmt.execute(params![
            format_day(m.date),
            &m.channel_id,
            &m.channel_name,
            m.sessions,
            m.signups,
            m.conversions,
            cents_to_f64(m.revenue_cents),
        ])?;
        Ok(())
    }

    /// All channel rows ordered by date, then insertion order.
    pub fn channel_metrics(&self) -> GenResult<Vec<ChannelMetric>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, channel_id, channel_name, sessions, signups, conversions, revenue
             FROM channel_metrics ORDER BY date ASC, rowid ASC",
        )?;
        let rows = stmt.query_map([], channel_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Product breakdown ──────────────────────────────────────────

    pub fn insert_product_metric(&self, m: &ProductMetric) -> GenResult<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO product_metrics (
                date, product_id, product_name, units_sold, revenue, refunds, refund_amount
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        stmt.execute(params![
            format_day(m.date),
            &m.product_id,
            &m.product_name,
            m.units_sold,
            cents_to_f64(m.revenue_cents),
            m.refunds,
            m.refund_amount,
        ])?;
        Ok(())
    }

    pub fn product_metrics(&self) -> GenResult<Vec<ProductMetric>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, product_id, product_name, units_sold, revenue, refunds, refund_amount
             FROM product_metrics ORDER BY date ASC, rowid ASC",
        )?;
        let rows = stmt.query_map([], product_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
