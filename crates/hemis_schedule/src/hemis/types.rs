/// Types for raw HEMIS schedule payloads
use crate::db::ScheduleRecord;
use crate::error::ScheduleError;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body returned by the schedule endpoint on success
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleResponse {
    pub data: Vec<Value>,
}

/// Deserializes a required text leaf, keeping `null` as `None` and numbers as their text.
fn opaque_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(de::Error::custom(format!(
            "expected a scalar or null, found {other}"
        ))),
    }
}

/// Deserializes a required integer leaf, keeping `null` as `None`.
fn opaque_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("expected an integer, found {n}"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("expected an integer, found \"{s}\""))),
        other => Err(de::Error::custom(format!(
            "expected an integer or null, found {other}"
        ))),
    }
}

// Leaves go through `deserialize_with` so an absent key stays an error while `null` is kept.

/// Any nested HEMIS object of which only the display name is kept
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Named {
    #[serde(deserialize_with = "opaque_text")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSubject {
    #[serde(deserialize_with = "opaque_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "opaque_text")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAuditorium {
    #[serde(deserialize_with = "opaque_text")]
    pub name: Option<String>,
    pub building: Named,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLessonPair {
    #[serde(deserialize_with = "opaque_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "opaque_text")]
    pub start_time: Option<String>,
    #[serde(deserialize_with = "opaque_text")]
    pub end_time: Option<String>,
}

/// One schedule entry as emitted by HEMIS, reduced to the fields we persist.
///
/// Dates (`lesson_date`, `weekStartTime`, `weekEndTime`) are kept in whatever integer encoding
/// upstream uses. Nested objects must be present and non-null; their leaves may be `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawScheduleEntry {
    pub id: i64,
    pub subject: RawSubject,
    pub faculty: Named,
    pub department: Named,
    #[serde(rename = "educationYear")]
    pub education_year: Named,
    pub semester: Named,
    pub group: Named,
    pub auditorium: RawAuditorium,
    #[serde(rename = "trainingType")]
    pub training_type: Named,
    #[serde(rename = "lessonPair")]
    pub lesson_pair: RawLessonPair,
    pub employee: Named,
    #[serde(deserialize_with = "opaque_int")]
    pub lesson_date: Option<i64>,
    #[serde(rename = "_week", deserialize_with = "opaque_int")]
    pub week: Option<i64>,
    #[serde(rename = "weekStartTime", deserialize_with = "opaque_int")]
    pub week_start: Option<i64>,
    #[serde(rename = "weekEndTime", deserialize_with = "opaque_int")]
    pub week_end: Option<i64>,
}

impl From<RawScheduleEntry> for ScheduleRecord {
    fn from(raw: RawScheduleEntry) -> Self {
        ScheduleRecord {
            id: raw.id,
            subject_name: raw.subject.name,
            subject_code: raw.subject.code,
            faculty_name: raw.faculty.name,
            department_name: raw.department.name,
            education_year: raw.education_year.name,
            semester_name: raw.semester.name,
            group_name: raw.group.name,
            auditorium_name: raw.auditorium.name,
            building_name: raw.auditorium.building.name,
            training_type: raw.training_type.name,
            lesson_pair: raw.lesson_pair.name,
            start_time: raw.lesson_pair.start_time,
            end_time: raw.lesson_pair.end_time,
            teacher_name: raw.employee.name,
            lesson_date: raw.lesson_date,
            week: raw.week,
            week_start: raw.week_start,
            week_end: raw.week_end,
        }
    }
}

/// Flattens one raw entry into a [`ScheduleRecord`].
///
/// Any missing key, at any depth, fails with [`ScheduleError::MalformedRecord`]; nothing is
/// defaulted. A present key holding `null` is stored as NULL.
pub fn map_entry(raw: &Value) -> Result<ScheduleRecord, ScheduleError> {
    RawScheduleEntry::deserialize(raw)
        .map(ScheduleRecord::from)
        .map_err(|e| ScheduleError::MalformedRecord {
            id: raw.get("id").and_then(Value::as_i64),
            message: e.to_string(),
        })
}
