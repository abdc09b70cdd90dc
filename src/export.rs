use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::ValueEnum;

use crate::models::SymptomEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn default_file_name(self, today: NaiveDate) -> PathBuf {
        PathBuf::from(format!(
            "symptom-log-{}.{}",
            today.format("%Y-%m-%d"),
            self.extension()
        ))
    }
}

/// Renders events as CSV with a `Date,Time,Symptom,Severity,Notes` header.
///
/// Date and time are local; both are blank for an unparseable timestamp.
pub fn to_csv(events: &[SymptomEvent]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Date", "Time", "Symptom", "Severity", "Notes"])?;

    for event in events {
        let (date, time) = match event.occurred_at() {
            Some(at) => (
                at.format("%Y-%m-%d").to_string(),
                at.format("%H:%M:%S").to_string(),
            ),
            None => (String::new(), String::new()),
        };
        writer.write_record([
            date.as_str(),
            time.as_str(),
            event.symptom.as_str(),
            event.severity.to_string().as_str(),
            event.notes.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| err.into_error())
        .context("failed to flush csv output")?;
    Ok(String::from_utf8(bytes)?)
}

pub fn to_json(events: &[SymptomEvent]) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(events)?)
}

pub fn write_export(
    events: &[SymptomEvent],
    format: ExportFormat,
    out: &Path,
) -> anyhow::Result<()> {
    let content = match format {
        ExportFormat::Csv => to_csv(events)?,
        ExportFormat::Json => to_json(events)?,
    };
    std::fs::write(out, content).with_context(|| format!("failed to write {}", out.display()))?;
    tracing::info!(count = events.len(), path = %out.display(), "exported entries");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use uuid::Uuid;

    fn sample_event(notes: &str) -> SymptomEvent {
        let at = Local
            .with_ymd_and_hms(2026, 2, 14, 9, 5, 30)
            .earliest()
            .expect("valid local time");
        SymptomEvent {
            id: Uuid::new_v4(),
            timestamp: at.to_rfc3339(),
            symptom: "Sensitivity to Light".to_string(),
            severity: 6,
            notes: notes.to_string(),
        }
    }

    #[test]
    fn csv_splits_date_and_time_and_quotes_notes() {
        let events = vec![sample_event(r#"said "too bright", left early"#)];
        let csv = to_csv(&events).unwrap();
        let mut lines = csv.lines();

        assert_eq!(lines.next(), Some("Date,Time,Symptom,Severity,Notes"));
        assert_eq!(
            lines.next(),
            Some(r#"2026-02-14,09:05:30,Sensitivity to Light,6,"said ""too bright"", left early""#)
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn csv_leaves_date_blank_for_broken_timestamps() {
        let events = vec![SymptomEvent {
            timestamp: "??".to_string(),
            ..sample_event("")
        }];
        let csv = to_csv(&events).unwrap();
        assert_eq!(csv.lines().nth(1), Some(",,Sensitivity to Light,6,"));
    }

    #[test]
    fn json_export_reads_back_as_events() {
        let events = vec![sample_event("one"), sample_event("two")];
        let json = to_json(&events).unwrap();
        let parsed: Vec<SymptomEvent> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, events);
    }

    #[test]
    fn default_file_names_carry_the_date() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        assert_eq!(
            ExportFormat::Csv.default_file_name(today),
            PathBuf::from("symptom-log-2026-10-15.csv")
        );
        assert_eq!(
            ExportFormat::Json.default_file_name(today),
            PathBuf::from("symptom-log-2026-10-15.json")
        );
    }

    #[test]
    fn write_export_creates_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("log.json");
        write_export(&[sample_event("x")], ExportFormat::Json, &out).unwrap();
        let written = std::fs::read_to_string(&out).unwrap();
        assert!(written.contains("Sensitivity to Light"));
    }
}
