use std::fmt::Write;

use crate::filter::DateRange;
use crate::models::{AnalyticsReport, SymptomEvent, SymptomSummary};

pub fn severity_band(severity: i32) -> &'static str {
    match severity {
        i32::MIN..=4 => "mild",
        5..=7 => "moderate",
        _ => "severe",
    }
}

/// Summaries ordered by occurrence count, most frequent first.
pub fn by_frequency(report: &AnalyticsReport) -> Vec<&SymptomSummary> {
    let mut summaries: Vec<&SymptomSummary> = report.summaries.iter().collect();
    summaries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.symptom.cmp(&b.symptom)));
    summaries
}

pub fn summary_line(summary: &SymptomSummary) -> String {
    format!(
        "- {}: {} entries (avg severity {:.1}/10, {})",
        summary.symptom,
        summary.count,
        summary.avg_severity,
        summary.trend.label()
    )
}

pub fn history_line(event: &SymptomEvent) -> String {
    let when = event
        .occurred_at()
        .map(|at| at.format("%b %d, %Y %-I:%M %p").to_string())
        .unwrap_or_else(|| format!("unknown time ({})", event.timestamp));

    let mut line = format!(
        "{} | {} | level {} ({}) | {}",
        when,
        event.symptom,
        event.severity,
        severity_band(event.severity),
        event.id
    );
    if !event.notes.is_empty() {
        let _ = write!(line, "\n    {}", event.notes);
    }
    line
}

pub fn build_markdown(range: DateRange, report: &AnalyticsReport, events: &[SymptomEvent]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Symptom Log Report");
    let _ = writeln!(
        output,
        "Generated {} for {} ({} entries)",
        report.generated_on,
        range.label(),
        events.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Symptom Summary");

    if report.summaries.is_empty() {
        let _ = writeln!(output, "No entries recorded for this window.");
    } else {
        for summary in by_frequency(report) {
            let _ = writeln!(output, "{}", summary_line(summary));
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## 7-Day Severity");
    let _ = writeln!(output, "| Day | Avg severity | Entries |");
    let _ = writeln!(output, "|-----|--------------|---------|");
    for sample in &report.timeline {
        let _ = writeln!(
            output,
            "| {} | {:.1} | {} |",
            sample.day.format("%b %d"),
            sample.avg_severity,
            sample.event_count
        );
    }

    let mut recent: Vec<&SymptomEvent> = events.iter().collect();
    recent.sort_by_key(|event| std::cmp::Reverse(event.occurred_at()));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Entries");

    if recent.is_empty() {
        let _ = writeln!(output, "No entries recorded for this window.");
    } else {
        for event in recent.iter().take(5) {
            let day = event
                .occurred_on()
                .map(|day| day.to_string())
                .unwrap_or_else(|| "unknown date".to_string());
            let notes = if event.notes.is_empty() {
                "no notes"
            } else {
                event.notes.as_str()
            };
            let _ = writeln!(
                output,
                "- {} (level {}) on {}: {}",
                event.symptom, event.severity, day, notes
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics;
    use chrono::{Duration, Local, TimeZone};
    use uuid::Uuid;

    fn sample_event(symptom: &str, days_ago: i64, severity: i32, notes: &str) -> SymptomEvent {
        let now = Local
            .with_ymd_and_hms(2026, 5, 20, 14, 0, 0)
            .earliest()
            .expect("valid local time");
        SymptomEvent {
            id: Uuid::new_v4(),
            timestamp: (now - Duration::days(days_ago)).to_rfc3339(),
            symptom: symptom.to_string(),
            severity,
            notes: notes.to_string(),
        }
    }

    fn report_for(events: &[SymptomEvent]) -> AnalyticsReport {
        let now = Local
            .with_ymd_and_hms(2026, 5, 20, 18, 0, 0)
            .earliest()
            .expect("valid local time");
        analytics::build_report(events, now)
    }

    #[test]
    fn bands_follow_severity() {
        assert_eq!(severity_band(1), "mild");
        assert_eq!(severity_band(4), "mild");
        assert_eq!(severity_band(5), "moderate");
        assert_eq!(severity_band(7), "moderate");
        assert_eq!(severity_band(8), "severe");
        assert_eq!(severity_band(10), "severe");
    }

    #[test]
    fn frequency_order_breaks_ties_by_name() {
        let events = vec![
            sample_event("Nausea", 1, 3, ""),
            sample_event("Fatigue", 1, 3, ""),
            sample_event("Headache", 1, 3, ""),
            sample_event("Headache", 2, 5, ""),
        ];
        let report = report_for(&events);
        let ordered = by_frequency(&report);
        let names: Vec<&str> = ordered.iter().map(|s| s.symptom.as_str()).collect();
        assert_eq!(names, vec!["Headache", "Fatigue", "Nausea"]);
    }

    #[test]
    fn markdown_lists_summary_timeline_and_recent_notes() {
        let events = vec![
            sample_event("Headache", 3, 2, "morning"),
            sample_event("Headache", 0, 8, "after meeting"),
            sample_event("Dizziness", 1, 5, ""),
        ];
        let report = report_for(&events);
        let markdown = build_markdown(DateRange::LastWeek, &report, &events);

        assert!(markdown.starts_with("# Symptom Log Report\n"));
        assert!(markdown.contains("for last 7 days (3 entries)"));
        assert!(markdown.contains("- Headache: 2 entries (avg severity 5.0/10, increasing)"));
        assert!(markdown.contains("- Dizziness: 1 entries (avg severity 5.0/10, stable)"));
        assert!(markdown.contains("| May 20 | 8.0 | 1 |"));
        assert!(markdown.contains("| May 18 | 0.0 | 0 |"));
        assert!(markdown.contains("- Dizziness (level 5) on 2026-05-19: no notes"));

        let recent = markdown.split("## Recent Entries").nth(1).unwrap();
        let first = recent.find("after meeting").unwrap();
        let last = recent.find("morning").unwrap();
        assert!(first < last);
    }

    #[test]
    fn markdown_handles_empty_windows() {
        let report = report_for(&[]);
        let markdown = build_markdown(DateRange::All, &report, &[]);
        assert_eq!(markdown.matches("No entries recorded for this window.").count(), 2);
        assert_eq!(markdown.matches("| 0.0 | 0 |").count(), 7);
    }

    #[test]
    fn history_line_shows_band_and_notes() {
        let event = sample_event("Fatigue", 0, 9, "could not finish walk");
        let line = history_line(&event);
        assert!(line.starts_with("May 20, 2026 2:00 PM | Fatigue | level 9 (severe)"));
        assert!(line.ends_with("\n    could not finish walk"));
    }
}
