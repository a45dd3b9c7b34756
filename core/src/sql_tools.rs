//! Read-only SQL tools over a generated database file.
//!
//! Every tool opens a fresh read-only connection, never propagates an
//! error, and returns display text. Failures are rendered into the
//! returned string so one bad call never affects the next.

use rusqlite::{types::ValueRef, Connection, OpenFlags};
use std::path::{Path, PathBuf};

/// Statements must open with one of these (case-insensitive).
pub const READ_ONLY_PREFIXES: [&str; 2] = ["SELECT", "WITH"];

pub const REJECTED_QUERY: &str = "Error: Only SELECT queries are allowed for safety.";
pub const EMPTY_RESULT: &str = "Query returned no results.";

#[derive(Debug, Clone)]
pub struct SqlTools {
    db_path: PathBuf,
}

impl SqlTools {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> rusqlite::Result<Connection> {
        Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
    }

    /// Run a read-only statement and render rows as CSV.
    pub fn query(&self, sql: &str) -> String {
        if !is_read_only(sql) {
            return REJECTED_QUERY.to_string();
        }
        match self.run_query(sql) {
            Ok(Some(csv)) => csv,
            Ok(None) => EMPTY_RESULT.to_string(),
            Err(e) => format!("Error executing query: {e}"),
        }
    }

    fn run_query(&self, sql: &str) -> rusqlite::Result<Option<String>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let mut rows = stmt.query([])?;

        let mut lines = vec![columns.join(",")];
        while let Some(row) = rows.next()? {
            let cells = (0..columns.len())
                .map(|i| -> rusqlite::Result<String> {
                    Ok(render_value(row.get_ref(i)?).unwrap_or_default())
                })
                .collect::<rusqlite::Result<Vec<_>>>()?;
            lines.push(cells.join(","));
        }
        if lines.len() == 1 {
            return Ok(None);
        }
        Ok(Some(lines.join("\n")))
    }

    /// Every table with its row count, in name order.
    pub fn list_tables(&self) -> String {
        match self.run_list_tables() {
            Ok(text) => text,
            Err(e) => format!("Error listing tables: {e}"),
        }
    }

    fn run_list_tables(&self) -> rusqlite::Result<String> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut lines = vec!["Tables in database:".to_string()];
        for name in names {
            let count: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM {}", quote_ident(&name)),
                [],
                |row| row.get(0),
            )?;
            lines.push(format!("- {name} ({} rows)", with_thousands(count)));
        }
        Ok(lines.join("\n"))
    }

    /// Column names and types with one sample row, as a markdown table.
    pub fn describe_table(&self, table_name: &str) -> String {
        match self.run_describe_table(table_name) {
            Ok(text) => text,
            Err(e) => format!("Error describing table: {e}"),
        }
    }

    fn run_describe_table(&self, table_name: &str) -> rusqlite::Result<String> {
        let conn = self.connect()?;
        let mut info = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table_name)))?;
        // (name, declared type), in column order
        let columns = info
            .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        if columns.is_empty() {
            return Ok(format!("Table '{table_name}' not found."));
        }

        let mut sample_stmt = conn.prepare(&format!("SELECT * FROM {} LIMIT 1", quote_ident(table_name)))?;
        let mut sample_rows = sample_stmt.query([])?;
        let sample: Option<Vec<String>> = match sample_rows.next()? {
            Some(row) => Some(
                (0..columns.len())
                    .map(|i| -> rusqlite::Result<String> {
                        Ok(render_value(row.get_ref(i)?).unwrap_or_else(|| "NULL".into()))
                    })
                    .collect::<rusqlite::Result<Vec<_>>>()?,
            ),
            None => None,
        };

        let mut lines = vec![
            format!("Schema for {table_name}:"),
            String::new(),
            "| Column | Type | Sample |".to_string(),
            "|--------|------|--------|".to_string(),
        ];
        for (i, (name, col_type)) in columns.iter().enumerate() {
            let sample_val = sample.as_ref().map_or("NULL", |s| s[i].as_str());
            lines.push(format!("| {name} | {col_type} | {sample_val} |"));
        }
        Ok(lines.join("\n"))
    }

    /// Minimum and maximum of `date_column` in `table_name`.
    pub fn get_date_range(&self, table_name: &str, date_column: &str) -> String {
        match self.run_date_range(table_name, date_column) {
            Ok((min, max)) => format!("Date range in {table_name}: {min} to {max}"),
            Err(e) => format!("Error getting date range: {e}"),
        }
    }

    fn run_date_range(&self, table_name: &str, date_column: &str) -> rusqlite::Result<(String, String)> {
        let conn = self.connect()?;
        let column = quote_ident(date_column);
        conn.query_row(
            &format!("SELECT MIN({column}), MAX({column}) FROM {}", quote_ident(table_name)),
            [],
            |row| {
                Ok((
                    render_value(row.get_ref(0)?).unwrap_or_else(|| "NULL".into()),
                    render_value(row.get_ref(1)?).unwrap_or_else(|| "NULL".into()),
                ))
            },
        )
    }
}

pub fn is_read_only(sql: &str) -> bool {
    let upper = sql.trim().to_uppercase();
    READ_ONLY_PREFIXES.iter().any(|p| upper.starts_with(p))
}

/// Render one SQLite value as text. None for NULL.
fn render_value(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(render_real(f)),
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Some(format!("<blob {} bytes>", b.len())),
    }
}

/// Shortest round-trip text with a trailing ".0" on whole values (85.0)
/// and a signed two-digit exponent outside [1e-4, 1e16) (1e-05, 1e+16).
fn render_real(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let magnitude = f.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let sci = format!("{f:e}");
        if let Some((mantissa, exponent)) = sci.split_once('e') {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            return format!("{mantissa}e{sign}{digits:0>2}");
        }
    }
    format!("{f:?}")
}

/// Backtick quoting: unlike double quotes, SQLite never reinterprets
/// an unknown backticked name as a string literal.
fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// `1234567` -> `1,234,567`
pub fn with_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if n < 0 {
        out.insert(0, '-');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_only_prefix_check() {
        assert!(is_read_only("SELECT 1"));
        assert!(is_read_only("  select * from daily_metrics"));
        assert!(is_read_only("\nWITH t AS (SELECT 1) SELECT * FROM t"));
        assert!(!is_read_only("DELETE FROM daily_metrics"));
        assert!(!is_read_only("DROP TABLE weekly_funnel"));
        assert!(!is_read_only(""));
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(with_thousands(0), "0");
        assert_eq!(with_thousands(999), "999");
        assert_eq!(with_thousands(1_000), "1,000");
        assert_eq!(with_thousands(3_655), "3,655");
        assert_eq!(with_thousands(1_234_567), "1,234,567");
        assert_eq!(with_thousands(-45_000), "-45,000");
    }

    #[test]
    fn real_values_keep_decimal_point() {
        assert_eq!(render_value(ValueRef::Real(85.0)).unwrap(), "85.0");
        assert_eq!(render_value(ValueRef::Real(0.0243)).unwrap(), "0.0243");
        assert_eq!(render_value(ValueRef::Null), None);
    }

    #[test]
    fn extreme_reals_use_signed_two_digit_exponent() {
        assert_eq!(render_real(1e-5), "1e-05");
        assert_eq!(render_real(-2.5e-7), "-2.5e-07");
        assert_eq!(render_real(1e16), "1e+16");
        assert_eq!(render_real(1.5e300), "1.5e+300");
        assert_eq!(render_real(1e-100), "1e-100");
        assert_eq!(render_real(0.0001), "0.0001");
        assert_eq!(render_real(1234567890123456.0), "1234567890123456.0");
        assert_eq!(render_real(0.0), "0.0");
        assert_eq!(render_real(f64::INFINITY), "inf");
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("daily_metrics"), "`daily_metrics`");
        assert_eq!(quote_ident("we`ird"), "`we``ird`");
    }
}
