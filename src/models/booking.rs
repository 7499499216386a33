use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::Interval;

pub const DEFAULT_NAME: &str = "Anonymous";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub interval: Interval,
    pub name: String,
    #[serde(default)]
    pub note: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSummary {
    pub id: String,
    pub interval: Interval,
    pub name: String,
    pub note: String,
}

impl Booking {
    pub fn summary(&self) -> BookingSummary {
        BookingSummary {
            id: self.id.clone(),
            interval: self.interval,
            name: self.name.clone(),
            note: self.note.clone(),
        }
    }
}

pub fn normalize_name(name: &str) -> String {
    match name.trim() {
        "" => DEFAULT_NAME.to_string(),
        trimmed => trimmed.to_string(),
    }
}

pub fn normalize_note(note: Option<&str>) -> String {
    note.map(str::trim).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_defaults() {
        assert_eq!(normalize_name(""), "Anonymous");
        assert_eq!(normalize_name("   \t"), "Anonymous");
        assert_eq!(normalize_name("  Asha "), "Asha");
    }

    #[test]
    fn test_note_defaults_to_empty() {
        assert_eq!(normalize_note(None), "");
        assert_eq!(normalize_note(Some("  bring forms ")), "bring forms");
    }

    #[test]
    fn test_missing_note_deserializes_empty() {
        let json = r#"{
            "id": "b-1",
            "interval": {"start": "2024-06-10T09:00:00", "end": "2024-06-10T10:00:00"},
            "name": "Asha",
            "created_at": "2024-06-01T12:00:00"
        }"#;
        let booking: Booking = serde_json::from_str(json).unwrap();
        assert_eq!(booking.note, "");
        assert_eq!(booking.summary().name, "Asha");
    }
}
