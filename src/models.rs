use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EntryError;

pub const MIN_SEVERITY: i32 = 1;
pub const MAX_SEVERITY: i32 = 10;

/// One logged symptom occurrence.
///
/// `timestamp` is kept as the stored RFC 3339 text so a corrupt row still
/// loads; use [`SymptomEvent::occurred_at`] for the parsed instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomEvent {
    pub id: Uuid,
    pub timestamp: String,
    pub symptom: String,
    pub severity: i32,
    pub notes: String,
}

impl SymptomEvent {
    /// Parsed timestamp in local device time, `None` when the text is not RFC 3339.
    pub fn occurred_at(&self) -> Option<DateTime<Local>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|ts| ts.with_timezone(&Local))
    }

    pub fn occurred_on(&self) -> Option<NaiveDate> {
        self.occurred_at().map(|ts| ts.date_naive())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub fn label(self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomSummary {
    pub symptom: String,
    pub avg_severity: f64,
    pub count: usize,
    pub trend: Trend,
}

/// One calendar day of the trailing seven-day window.
///
/// `avg_severity` is `0.0` when `event_count` is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySeveritySample {
    pub day: NaiveDate,
    pub avg_severity: f64,
    pub event_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub generated_on: NaiveDate,
    pub summaries: Vec<SymptomSummary>,
    pub timeline: Vec<DailySeveritySample>,
}

#[derive(Debug, Clone)]
pub struct NewEntry {
    pub symptom: String,
    pub severity: i32,
    pub notes: String,
}

/// Fields an edit may change. The timestamp of an edited event is kept.
#[derive(Debug, Clone, Default)]
pub struct EntryUpdate {
    pub symptom: Option<String>,
    pub severity: Option<i32>,
    pub notes: Option<String>,
}

pub fn validate_severity(severity: i32) -> Result<i32, EntryError> {
    if (MIN_SEVERITY..=MAX_SEVERITY).contains(&severity) {
        Ok(severity)
    } else {
        Err(EntryError::SeverityOutOfRange(severity))
    }
}

/// Checks a symptom name against the configured vocabulary.
///
/// Matching is exact; `allow_custom` only lifts the vocabulary check.
pub fn validate_symptom(
    symptom: &str,
    vocabulary: &[String],
    allow_custom: bool,
) -> Result<(), EntryError> {
    if symptom.trim().is_empty() {
        return Err(EntryError::EmptySymptom);
    }
    if allow_custom || vocabulary.iter().any(|known| known == symptom) {
        Ok(())
    } else {
        Err(EntryError::UnknownSymptom(symptom.to_string()))
    }
}

impl NewEntry {
    pub fn validate(&self, vocabulary: &[String], allow_custom: bool) -> Result<(), EntryError> {
        validate_symptom(&self.symptom, vocabulary, allow_custom)?;
        validate_severity(self.severity)?;
        Ok(())
    }
}

impl EntryUpdate {
    pub fn is_empty(&self) -> bool {
        self.symptom.is_none() && self.severity.is_none() && self.notes.is_none()
    }

    pub fn validate(&self, vocabulary: &[String], allow_custom: bool) -> Result<(), EntryError> {
        if let Some(symptom) = &self.symptom {
            validate_symptom(symptom, vocabulary, allow_custom)?;
        }
        if let Some(severity) = self.severity {
            validate_severity(severity)?;
        }
        Ok(())
    }

    pub fn apply(&self, event: &mut SymptomEvent) {
        if let Some(symptom) = &self.symptom {
            event.symptom = symptom.clone();
        }
        if let Some(severity) = self.severity {
            event.severity = severity;
        }
        if let Some(notes) = &self.notes {
            event.notes = notes.clone();
        }
    }
}
