use chrono::{DateTime, Days, Local};
use clap::ValueEnum;

use crate::models::SymptomEvent;

/// History window applied before events reach the analytics engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DateRange {
    #[default]
    All,
    #[value(name = "7d")]
    LastWeek,
    #[value(name = "30d")]
    LastMonth,
}

impl DateRange {
    pub fn days(self) -> Option<u64> {
        match self {
            DateRange::All => None,
            DateRange::LastWeek => Some(7),
            DateRange::LastMonth => Some(30),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DateRange::All => "all entries",
            DateRange::LastWeek => "last 7 days",
            DateRange::LastMonth => "last 30 days",
        }
    }

    /// `now` moved back by whole calendar days, keeping the local wall-clock time.
    pub fn cutoff(self, now: DateTime<Local>) -> Option<DateTime<Local>> {
        self.days()
            .and_then(|days| now.checked_sub_days(Days::new(days)))
    }

    /// Keeps events strictly after the cutoff instant.
    ///
    /// Events with an unparseable timestamp only survive `All`.
    pub fn apply(self, events: &[SymptomEvent], now: DateTime<Local>) -> Vec<SymptomEvent> {
        let Some(cutoff) = self.cutoff(now) else {
            return events.to_vec();
        };

        events
            .iter()
            .filter(|event| event.occurred_at().is_some_and(|at| at > cutoff))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use uuid::Uuid;

    fn sample_event(now: DateTime<Local>, days_ago: u64) -> SymptomEvent {
        let at = now
            .checked_sub_days(Days::new(days_ago))
            .expect("date in range");
        SymptomEvent {
            id: Uuid::new_v4(),
            timestamp: at.to_rfc3339(),
            symptom: "Headache".to_string(),
            severity: 5,
            notes: String::new(),
        }
    }

    #[test]
    fn all_keeps_everything_including_broken_rows() {
        let now = Local::now();
        let mut events = vec![sample_event(now, 1), sample_event(now, 400)];
        events.push(SymptomEvent {
            timestamp: "garbage".to_string(),
            ..sample_event(now, 0)
        });
        assert_eq!(DateRange::All.apply(&events, now).len(), 3);
    }

    #[test]
    fn last_week_drops_older_events() {
        let now = Local::now();
        let events = vec![
            sample_event(now, 1),
            sample_event(now, 6),
            sample_event(now, 8),
            sample_event(now, 20),
        ];
        let kept = DateRange::LastWeek.apply(&events, now);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].id, events[0].id);
        assert_eq!(kept[1].id, events[1].id);
    }

    #[test]
    fn last_month_keeps_twenty_day_old_events() {
        let now = Local::now();
        let events = vec![sample_event(now, 20), sample_event(now, 31)];
        let kept = DateRange::LastMonth.apply(&events, now);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, events[0].id);
    }

    #[test]
    fn cutoff_is_exclusive() {
        let now = Local::now();
        let events = vec![sample_event(now, 7)];
        assert!(DateRange::LastWeek.apply(&events, now).is_empty());
    }

    #[test]
    fn cutoff_keeps_wall_clock_time() {
        let now = Local
            .with_ymd_and_hms(2026, 4, 15, 12, 0, 0)
            .earliest()
            .expect("valid local time");
        let cutoff = DateRange::LastMonth.cutoff(now).expect("windowed range");
        assert_eq!(cutoff.date_naive(), NaiveDate::from_ymd_opt(2026, 3, 16).unwrap());
        assert_eq!(cutoff.time(), now.time());
        assert!(DateRange::All.cutoff(now).is_none());
    }

    #[test]
    fn windowed_ranges_drop_unparseable_timestamps() {
        let now = Local::now();
        let events = vec![SymptomEvent {
            timestamp: "garbage".to_string(),
            ..sample_event(now, 0)
        }];
        assert!(DateRange::LastMonth.apply(&events, now).is_empty());
    }
}
