use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Local, NaiveDate};

use crate::models::{AnalyticsReport, DailySeveritySample, SymptomEvent, SymptomSummary, Trend};

/// Recent-half average must move by more than this before a trend is reported.
pub const TREND_THRESHOLD: f64 = 0.5;

pub const TIMELINE_DAYS: i64 = 7;

/// Builds the full analytics report for a snapshot of events.
///
/// `now` anchors the seven-day timeline; the summaries do not depend on it.
pub fn build_report(events: &[SymptomEvent], now: DateTime<Local>) -> AnalyticsReport {
    let today = now.date_naive();
    let summaries = summarize(events);
    let timeline = seven_day_timeline(events, today);

    tracing::debug!(
        events = events.len(),
        symptoms = summaries.len(),
        %today,
        "built analytics report"
    );

    AnalyticsReport {
        generated_on: today,
        summaries,
        timeline,
    }
}

/// One summary per distinct symptom name, ordered by name.
///
/// Names are compared exactly, so `"Headache"` and `"headache"` are separate groups.
pub fn summarize(events: &[SymptomEvent]) -> Vec<SymptomSummary> {
    let mut groups: BTreeMap<&str, Vec<&SymptomEvent>> = BTreeMap::new();

    for event in events {
        groups.entry(event.symptom.as_str()).or_default().push(event);
    }

    groups
        .into_iter()
        .map(|(symptom, group)| SymptomSummary {
            symptom: symptom.to_string(),
            avg_severity: round_tenth(mean_severity(&group)),
            count: group.len(),
            trend: classify_trend(&group),
        })
        .collect()
}

/// Compares the recent half of a group against the older half.
///
/// With an odd count the recent half takes the middle event. Events whose
/// timestamp does not parse are ordered before all others.
pub fn classify_trend(group: &[&SymptomEvent]) -> Trend {
    if group.len() < 2 {
        return Trend::Stable;
    }

    let mut ordered: Vec<(Option<DateTime<Local>>, &SymptomEvent)> = group
        .iter()
        .map(|event| (event.occurred_at(), *event))
        .collect();
    ordered.sort_by_key(|(occurred_at, _)| *occurred_at);
    let ordered: Vec<&SymptomEvent> = ordered.into_iter().map(|(_, event)| event).collect();

    let (older, recent) = ordered.split_at(ordered.len() / 2);
    let older_avg = mean_severity(older);
    let recent_avg = mean_severity(recent);

    if recent_avg > older_avg + TREND_THRESHOLD {
        Trend::Increasing
    } else if recent_avg < older_avg - TREND_THRESHOLD {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

/// Seven daily samples from `today - 6` through `today`, oldest first.
///
/// Days without events carry `avg_severity = 0.0` and `event_count = 0`.
/// Events with an unparseable timestamp are left out.
pub fn seven_day_timeline(events: &[SymptomEvent], today: NaiveDate) -> Vec<DailySeveritySample> {
    let dated: Vec<(NaiveDate, &SymptomEvent)> = events
        .iter()
        .filter_map(|event| event.occurred_on().map(|day| (day, event)))
        .collect();

    (0..TIMELINE_DAYS)
        .rev()
        .map(|offset| {
            let day = today - Duration::days(offset);
            let day_events: Vec<&SymptomEvent> = dated
                .iter()
                .filter(|(event_day, _)| *event_day == day)
                .map(|(_, event)| *event)
                .collect();

            let avg_severity = if day_events.is_empty() {
                0.0
            } else {
                round_tenth(mean_severity(&day_events))
            };

            DailySeveritySample {
                day,
                avg_severity,
                event_count: day_events.len(),
            }
        })
        .collect()
}

/// Rounds to one decimal place, halves away from zero.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn mean_severity(events: &[&SymptomEvent]) -> f64 {
    if events.is_empty() {
        return 0.0;
    }
    let total: i64 = events.iter().map(|event| i64::from(event.severity)).sum();
    total as f64 / events.len() as f64
}
