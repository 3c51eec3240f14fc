//! SQLite-backed verdict history: one row per consumed window.

use crate::error::Result;
use crate::risk::{Verdict, WindowVerdict};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub session_id: String,
    pub ts: i64,
    pub mean: f64,
    pub verdict: String,
}

impl HistoryRow {
    pub fn is_at_risk(&self) -> bool {
        self.verdict == Verdict::AtRisk.as_str()
    }
}

pub struct VerdictHistory {
    conn: Mutex<Connection>,
}

impl VerdictHistory {
    /// Open or create DB at path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS verdicts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                ts INTEGER NOT NULL,
                mean REAL NOT NULL,
                samples INTEGER NOT NULL,
                verdict TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_verdicts_ts ON verdicts(ts);
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        match self.conn.lock() {
            Ok(c) => c,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn record(&self, v: &WindowVerdict) -> Result<()> {
        self.conn().execute(
            "INSERT INTO verdicts (session_id, ts, mean, samples, verdict) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![v.session_id, v.ts, v.mean, v.samples as i64, v.verdict.as_str()],
        )?;
        Ok(())
    }

    /// Most recent rows first
    pub fn recent(&self, limit: usize) -> Result<Vec<HistoryRow>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT session_id, ts, mean, verdict FROM verdicts ORDER BY ts DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(HistoryRow {
                session_id: row.get(0)?,
                ts: row.get(1)?,
                mean: row.get(2)?,
                verdict: row.get(3)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Retention: delete rows older than given timestamp (ms)
    pub fn prune_before(&self, ts: i64) -> Result<u64> {
        let n = self
            .conn()
            .execute("DELETE FROM verdicts WHERE ts < ?1", params![ts])?;
        Ok(n as u64)
    }
}
