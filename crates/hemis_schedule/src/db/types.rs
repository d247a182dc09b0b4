/// Database types for schedule data
use serde::Serialize;

/// One lesson occurrence as flattened from HEMIS, ready to be written.
///
/// Field order matches the column order of the `schedule` table. Every column but `id` is
/// nullable: upstream may send `null` leaves and the table carries no NOT NULL constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleRecord {
    pub id: i64,
    pub subject_name: Option<String>,
    pub subject_code: Option<String>,
    pub faculty_name: Option<String>,
    pub department_name: Option<String>,
    pub education_year: Option<String>,
    pub semester_name: Option<String>,
    pub group_name: Option<String>,
    pub auditorium_name: Option<String>,
    pub building_name: Option<String>,
    pub training_type: Option<String>,
    pub lesson_pair: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub teacher_name: Option<String>,
    pub lesson_date: Option<i64>,
    pub week: Option<i64>,
    pub week_start: Option<i64>,
    pub week_end: Option<i64>,
}

/// A stored row: the record plus the time it was last written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DbScheduleRow {
    #[serde(flatten)]
    pub record: ScheduleRecord,
    pub fetched_at: Option<String>,
}

/// A single cell of a stored row, borrowed for export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    Integer(i64),
    Text(&'a str),
    /// SQL NULL
    Empty,
}

impl<'a> From<&'a Option<String>> for CellValue<'a> {
    fn from(value: &'a Option<String>) -> Self {
        value.as_deref().map_or(CellValue::Empty, CellValue::Text)
    }
}

impl From<Option<i64>> for CellValue<'_> {
    fn from(value: Option<i64>) -> Self {
        value.map_or(CellValue::Empty, CellValue::Integer)
    }
}

impl DbScheduleRow {
    /// Returns every column value in table order.
    pub fn cells(&self) -> Vec<CellValue<'_>> {
        let r = &self.record;
        vec![
            CellValue::Integer(r.id),
            (&r.subject_name).into(),
            (&r.subject_code).into(),
            (&r.faculty_name).into(),
            (&r.department_name).into(),
            (&r.education_year).into(),
            (&r.semester_name).into(),
            (&r.group_name).into(),
            (&r.auditorium_name).into(),
            (&r.building_name).into(),
            (&r.training_type).into(),
            (&r.lesson_pair).into(),
            (&r.start_time).into(),
            (&r.end_time).into(),
            (&r.teacher_name).into(),
            r.lesson_date.into(),
            r.week.into(),
            r.week_start.into(),
            r.week_end.into(),
            (&self.fetched_at).into(),
        ]
    }
}

/// Full contents of the `schedule` table, with the column names SQLite reports.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScheduleTable {
    pub columns: Vec<String>,
    pub rows: Vec<DbScheduleRow>,
}

impl ScheduleTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[cfg(test)]
    pub(crate) fn get(&self, id: i64) -> Option<&DbScheduleRow> {
        self.rows.iter().find(|row| row.record.id == id)
    }
}
