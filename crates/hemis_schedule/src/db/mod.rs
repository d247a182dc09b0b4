/// Database module for persisting HEMIS schedule records
mod types;

pub use types::{CellValue, DbScheduleRow, ScheduleRecord, ScheduleTable};

use crate::error::ScheduleError;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::{Path, PathBuf};
use tracing::debug;

const SCHEMA_SQL: &str = include_str!("../../../../sql/init_schedule.sql");

/// Handle to the on-disk schedule store.
///
/// Holds only the path; every operation opens its own connection and closes it before
/// returning.
#[derive(Debug, Clone)]
pub struct ScheduleStore {
    path: PathBuf,
}

impl ScheduleStore {
    /// Creates a store handle and makes sure the schema exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ScheduleError> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
        };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Path of the SQLite file backing this store
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection, ScheduleError> {
        Connection::open(&self.path).map_err(|e| ScheduleError::StoreUnavailable {
            message: format!("failed to open {}: {}", self.path.display(), e),
        })
    }

    /// Creates the `schedule` table if it does not exist yet
    pub fn ensure_schema(&self) -> Result<(), ScheduleError> {
        let conn = self.connect()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    /// Inserts the record, or refreshes the mutable columns of an existing row.
    pub fn upsert(&self, record: &ScheduleRecord) -> Result<(), ScheduleError> {
        self.upsert_at(record, Utc::now())
    }

    /// Same as [`ScheduleStore::upsert`] with an explicit `fetched_at`.
    ///
    /// On conflict only `subject_name`, `teacher_name`, `lesson_date` and `fetched_at` are
    /// overwritten; every other column keeps its stored value.
    pub fn upsert_at(
        &self,
        record: &ScheduleRecord,
        fetched_at: DateTime<Utc>,
    ) -> Result<(), ScheduleError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO schedule (
                id, subject_name, subject_code, faculty_name, department_name,
                education_year, semester_name, group_name, auditorium_name,
                building_name, training_type, lesson_pair, start_time, end_time,
                teacher_name, lesson_date, week, week_start, week_end, fetched_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
            ON CONFLICT(id) DO UPDATE SET
                subject_name = excluded.subject_name,
                teacher_name = excluded.teacher_name,
                lesson_date = excluded.lesson_date,
                fetched_at = excluded.fetched_at",
            params![
                record.id,
                &record.subject_name,
                &record.subject_code,
                &record.faculty_name,
                &record.department_name,
                &record.education_year,
                &record.semester_name,
                &record.group_name,
                &record.auditorium_name,
                &record.building_name,
                &record.training_type,
                &record.lesson_pair,
                &record.start_time,
                &record.end_time,
                &record.teacher_name,
                record.lesson_date,
                record.week,
                record.week_start,
                record.week_end,
                fetched_at.naive_utc(),
            ],
        )?;

        tx.commit()?;
        debug!(id = record.id, "Upserted schedule record");
        Ok(())
    }

    /// Returns every stored row together with the table's column names
    pub fn query_all(&self) -> Result<ScheduleTable, ScheduleError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT * FROM schedule")?;

        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let rows = stmt
            .query_map([], row_to_schedule)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(ScheduleTable { columns, rows })
    }

    /// Number of stored rows
    pub fn count(&self) -> Result<usize, ScheduleError> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM schedule", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn row_to_schedule(row: &Row<'_>) -> rusqlite::Result<DbScheduleRow> {
    Ok(DbScheduleRow {
        record: ScheduleRecord {
            id: row.get(0)?,
            subject_name: row.get(1)?,
            subject_code: row.get(2)?,
            faculty_name: row.get(3)?,
            department_name: row.get(4)?,
            education_year: row.get(5)?,
            semester_name: row.get(6)?,
            group_name: row.get(7)?,
            auditorium_name: row.get(8)?,
            building_name: row.get(9)?,
            training_type: row.get(10)?,
            lesson_pair: row.get(11)?,
            start_time: row.get(12)?,
            end_time: row.get(13)?,
            teacher_name: row.get(14)?,
            lesson_date: row.get(15)?,
            week: row.get(16)?,
            week_start: row.get(17)?,
            week_end: row.get(18)?,
        },
        fetched_at: row.get(19)?,
    })
}
