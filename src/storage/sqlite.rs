use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use std::path::Path;

use crate::error::Result;
use crate::models::AnalysisResult;

/// One persisted analysis run.
#[derive(Debug, Clone)]
pub struct StoredAnalysis {
    pub id: i64,
    pub document_name: String,
    pub analyzed_at: DateTime<Utc>,
    pub result: AnalysisResult,
}

pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let storage = Self { conn };
        storage.init_db()?;
        Ok(storage)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self { conn };
        storage.init_db()?;
        Ok(storage)
    }

    fn init_db(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS analyses (
                id INTEGER PRIMARY KEY,
                document_name TEXT NOT NULL,
                analyzed_at TEXT NOT NULL,
                overall_score INTEGER NOT NULL,
                ats_score INTEGER NOT NULL,
                content_score INTEGER NOT NULL,
                format_score INTEGER NOT NULL,
                skills_score INTEGER NOT NULL,
                result_json TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_analyses_document_name ON analyses(document_name);
            CREATE INDEX IF NOT EXISTS idx_analyses_analyzed_at ON analyses(analyzed_at);
            "#,
        )?;

        Ok(())
    }

    pub fn save_analysis(&self, document_name: &str, result: &AnalysisResult) -> Result<i64> {
        let result_json = serde_json::to_string(result)?;

        self.conn.execute(
            r#"
            INSERT INTO analyses (document_name, analyzed_at, overall_score, ats_score,
                                  content_score, format_score, skills_score, result_json)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                document_name,
                Utc::now().to_rfc3339(),
                result.overall_score,
                result.ats_compatibility.score,
                result.content_quality.score,
                result.format_structure.score,
                result.skills_match.score,
                result_json,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!("Stored analysis {} for {}", id, document_name);
        Ok(id)
    }

    pub fn latest_analysis(&self, document_name: &str) -> Result<Option<StoredAnalysis>> {
        let result = self.conn.query_row(
            r#"
            SELECT id, document_name, analyzed_at, result_json
            FROM analyses
            WHERE document_name = ?1
            ORDER BY id DESC
            LIMIT 1
            "#,
            params![document_name],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        );

        match result {
            Ok(raw) => Ok(Some(decode(raw)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Most recent analyses first.
    pub fn recent_analyses(&self, limit: usize) -> Result<Vec<StoredAnalysis>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, document_name, analyzed_at, result_json
            FROM analyses
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        rows.map(|raw| decode(raw?)).collect()
    }
}

fn decode((id, document_name, analyzed_at, result_json): (i64, String, String, String)) -> Result<StoredAnalysis> {
    let analyzed_at = DateTime::parse_from_rfc3339(&analyzed_at)?.with_timezone(&Utc);

    Ok(StoredAnalysis {
        id,
        document_name,
        analyzed_at,
        result: serde_json::from_str(&result_json)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Scorer;
    use crate::error::Error;

    #[test]
    fn test_save_and_fetch_latest() {
        let storage = Storage::in_memory().unwrap();
        let scorer = Scorer::with_builtin_catalog().unwrap();

        let first = scorer.analyze("python", None);
        let second = scorer.analyze("python sql docker git aws css\nme@example.com", None);

        storage.save_analysis("cv.txt", &first).unwrap();
        let id = storage.save_analysis("cv.txt", &second).unwrap();

        let latest = storage.latest_analysis("cv.txt").unwrap().unwrap();
        assert_eq!(latest.id, id);
        assert_eq!(latest.result, second);
        assert!(storage.latest_analysis("other.txt").unwrap().is_none());
    }

    #[test]
    fn test_recent_analyses_order_and_limit() {
        let storage = Storage::in_memory().unwrap();
        let scorer = Scorer::with_builtin_catalog().unwrap();
        let result = scorer.analyze("", None);

        for name in ["a.txt", "b.txt", "c.txt"] {
            storage.save_analysis(name, &result).unwrap();
        }

        let recent = storage.recent_analyses(2).unwrap();
        let names: Vec<_> = recent.iter().map(|r| r.document_name.as_str()).collect();
        assert_eq!(names, vec!["c.txt", "b.txt"]);
    }

    #[test]
    fn test_corrupt_timestamp_is_an_error() {
        let storage = Storage::in_memory().unwrap();
        let result = Scorer::with_builtin_catalog().unwrap().analyze("summary", None);
        let id = storage.save_analysis("cv.txt", &result).unwrap();

        storage
            .conn
            .execute(
                "UPDATE analyses SET analyzed_at = 'yesterday' WHERE id = ?1",
                params![id],
            )
            .unwrap();

        assert!(matches!(storage.latest_analysis("cv.txt"), Err(Error::Timestamp(_))));
        assert!(matches!(storage.recent_analyses(5), Err(Error::Timestamp(_))));
    }

    #[test]
    fn test_file_backed_storage_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.db");
        let result = Scorer::with_builtin_catalog().unwrap().analyze("summary", None);

        Storage::new(&path).unwrap().save_analysis("cv.txt", &result).unwrap();
        let reopened = Storage::new(&path).unwrap();
        assert_eq!(reopened.recent_analyses(10).unwrap().len(), 1);
    }
}
