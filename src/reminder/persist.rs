use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use tracing::{info, warn};

use super::model::{Reminder, ReminderId};
use crate::errors::PersistError;

/// Backing storage for the reminder list.
pub trait Persistence: Send {
    /// Missing or empty storage yields an empty list; individually broken
    /// records are skipped.
    fn load(&self) -> Result<Vec<Reminder>, PersistError>;

    fn save(&self, reminders: &[Reminder]) -> Result<(), PersistError>;
}

/// Reminders stored as a JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Persistence for JsonFile {
    fn load(&self) -> Result<Vec<Reminder>, PersistError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no reminder file yet, starting fresh");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };
        decode(&content)
    }

    fn save(&self, reminders: &[Reminder]) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = encode(reminders)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

// ── on-disk record ──

#[derive(Debug, Serialize, Deserialize)]
struct Record {
    id: Number,
    text: String,
    #[serde(rename = "dateTime")]
    date_time: String,
    #[serde(default)]
    notified: bool,
}

impl Record {
    fn from_reminder(r: &Reminder) -> Self {
        Self {
            id: Number::from(r.id.0),
            text: r.text.clone(),
            date_time: r.due_at.to_rfc3339_opts(SecondsFormat::AutoSi, false),
            notified: r.notified,
        }
    }

    fn into_reminder(self) -> Result<Reminder, String> {
        let id = parse_id(&self.id).ok_or_else(|| format!("unusable id {}", self.id))?;
        let due_at = parse_date_time(&self.date_time)
            .ok_or_else(|| format!("unparsable dateTime {:?}", self.date_time))?;
        Ok(Reminder {
            id,
            text: self.text,
            due_at,
            notified: self.notified,
        })
    }
}

pub fn encode(reminders: &[Reminder]) -> Result<String, PersistError> {
    let records: Vec<Record> = reminders.iter().map(Record::from_reminder).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

pub fn decode(content: &str) -> Result<Vec<Reminder>, PersistError> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let items: Vec<Value> = serde_json::from_str(content)?;
    let mut reminders = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let parsed = serde_json::from_value::<Record>(item)
            .map_err(|err| err.to_string())
            .and_then(Record::into_reminder);
        match parsed {
            Ok(reminder) => reminders.push(reminder),
            Err(reason) => warn!(index, %reason, "skipping invalid reminder record"),
        }
    }

    reminders.sort_by_key(|r| r.due_at);
    Ok(reminders)
}

/// Integer ids are taken as-is; fractional ones (seconds since the epoch)
/// become milliseconds.
fn parse_id(id: &Number) -> Option<ReminderId> {
    if let Some(n) = id.as_u64() {
        return Some(ReminderId(n));
    }
    let secs = id.as_f64()?;
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    Some(ReminderId((secs * 1000.0).round() as u64))
}

/// ISO-8601 with offset, or a naive local timestamp.
pub fn parse_date_time(s: &str) -> Option<DateTime<Local>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Local));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    fn sample(id: u64, text: &str, mins: i64, notified: bool) -> Reminder {
        let base = Local.with_ymd_and_hms(2031, 1, 15, 8, 30, 0).single().unwrap();
        Reminder {
            id: ReminderId(id),
            text: text.to_string(),
            due_at: base + Duration::minutes(mins),
            notified,
        }
    }

    #[test]
    fn save_then_load_keeps_every_field() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("nested").join("reminders.json"));
        let reminders = vec![
            sample(1, "standup", 0, true),
            sample(2, "lunch \"break\"", 90, false),
        ];

        file.save(&reminders).unwrap();
        let loaded = file.load().unwrap();

        assert_eq!(loaded.len(), 2);
        for (a, b) in reminders.iter().zip(&loaded) {
            assert_eq!(a.text, b.text);
            assert_eq!(a.due_at, b.due_at);
            assert_eq!(a.notified, b.notified);
            assert_eq!(a.id, b.id);
        }
        assert!(!dir.path().join("nested").join("reminders.json.tmp").exists());
    }

    #[test]
    fn missing_and_empty_files_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("absent.json"));
        assert!(file.load().unwrap().is_empty());

        let empty = dir.path().join("empty.json");
        fs::write(&empty, "  \n").unwrap();
        assert!(JsonFile::new(empty).load().unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "[{\"id\": 1,").unwrap();
        assert!(matches!(JsonFile::new(path).load(), Err(PersistError::Json(_))));
    }

    #[test]
    fn written_timestamps_carry_an_offset() {
        let json = encode(&[sample(9, "tea", 0, false)]).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let stamp = value[0]["dateTime"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok(), "{stamp}");
        assert_eq!(value[0]["id"], 9);
        assert_eq!(value[0]["notified"], false);
    }

    #[test]
    fn bad_records_are_skipped_and_rest_sorted() {
        let json = r#"[
            {"id": 1, "text": "late", "dateTime": "2031-01-15T10:00:00+00:00", "notified": true},
            {"id": 2, "text": "no time"},
            {"id": 3, "text": "bad time", "dateTime": "tomorrow"},
            "not an object",
            {"id": 1717251000.25, "text": "early", "dateTime": "2031-01-15T09:00:00+00:00"}
        ]"#;

        let loaded = decode(json).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].text, "early");
        assert_eq!(loaded[0].id, ReminderId(1_717_251_000_250));
        assert!(!loaded[0].notified);
        assert_eq!(loaded[1].text, "late");
        assert!(loaded[1].notified);
    }

    #[test]
    fn parses_offset_and_naive_timestamps() {
        let with_offset = parse_date_time("2024-06-01T14:30:00-04:00").unwrap();
        let expected = FixedOffset::west_opt(4 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 6, 1, 14, 30, 0)
            .unwrap();
        assert_eq!(with_offset, expected);

        let python = parse_date_time("2024-06-01T14:30:00.123456-04:00").unwrap();
        assert_eq!(python.timestamp(), expected.timestamp());

        let naive = parse_date_time("2024-06-01T14:30:00").unwrap();
        let local = Local.with_ymd_and_hms(2024, 6, 1, 14, 30, 0).earliest().unwrap();
        assert_eq!(naive, local);
        assert_eq!(parse_date_time("2024-06-01 14:30"), Some(local));

        assert!(parse_date_time("June 1st").is_none());
    }
}
