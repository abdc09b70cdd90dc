use std::str::FromStr;

use anyhow::Context;
use chrono::{DateTime, Duration, Local};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{validate_severity, validate_symptom, EntryUpdate, NewEntry, SymptomEvent};

pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("invalid database url {database_url}"))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("failed to open the symptom log database")?;

    tracing::debug!(%database_url, "connected to database");
    Ok(pool)
}

pub async fn init_db(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

fn event_from_row(row: &SqliteRow) -> anyhow::Result<SymptomEvent> {
    let id: String = row.try_get("id")?;
    Ok(SymptomEvent {
        id: Uuid::parse_str(&id).with_context(|| format!("stored id {id} is not a uuid"))?,
        timestamp: row.try_get("recorded_at")?,
        symptom: row.try_get("symptom")?,
        severity: row
            .try_get("severity")
            .with_context(|| format!("entry {id} has a non-integer severity"))?,
        notes: row.try_get("notes")?,
    })
}

async fn insert_row(pool: &SqlitePool, event: &SymptomEvent) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO symptom_events (id, recorded_at, symptom, severity, notes)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(event.id.to_string())
    .bind(&event.timestamp)
    .bind(&event.symptom)
    .bind(event.severity)
    .bind(&event.notes)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn insert_event(
    pool: &SqlitePool,
    entry: &NewEntry,
    recorded_at: DateTime<Local>,
) -> anyhow::Result<SymptomEvent> {
    let event = SymptomEvent {
        id: Uuid::new_v4(),
        timestamp: recorded_at.to_rfc3339(),
        symptom: entry.symptom.clone(),
        severity: entry.severity,
        notes: entry.notes.clone(),
    };

    insert_row(pool, &event).await?;
    tracing::info!(id = %event.id, symptom = %event.symptom, "logged symptom");
    Ok(event)
}

pub async fn fetch_event(pool: &SqlitePool, id: Uuid) -> anyhow::Result<Option<SymptomEvent>> {
    let row = sqlx::query(
        "SELECT id, recorded_at, symptom, severity, notes FROM symptom_events WHERE id = ?1",
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(event_from_row).transpose()
}

/// Applies an edit by id. Returns `None` when no event has that id.
pub async fn update_event(
    pool: &SqlitePool,
    id: Uuid,
    update: &EntryUpdate,
) -> anyhow::Result<Option<SymptomEvent>> {
    let Some(mut event) = fetch_event(pool, id).await? else {
        return Ok(None);
    };
    update.apply(&mut event);

    sqlx::query(
        r#"
        UPDATE symptom_events
        SET symptom = ?1, severity = ?2, notes = ?3
        WHERE id = ?4
        "#,
    )
    .bind(&event.symptom)
    .bind(event.severity)
    .bind(&event.notes)
    .bind(id.to_string())
    .execute(pool)
    .await?;

    tracing::info!(%id, "updated symptom entry");
    Ok(Some(event))
}

pub async fn delete_event(pool: &SqlitePool, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM symptom_events WHERE id = ?1")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    let deleted = result.rows_affected() > 0;
    tracing::info!(%id, deleted, "delete requested");
    Ok(deleted)
}

pub async fn clear(pool: &SqlitePool) -> anyhow::Result<u64> {
    let result = sqlx::query("DELETE FROM symptom_events").execute(pool).await?;
    Ok(result.rows_affected())
}

/// Every stored event, newest first. Rows with an unparseable timestamp come last.
///
/// Rows that cannot be decoded are skipped with a warning.
pub async fn fetch_events(pool: &SqlitePool) -> anyhow::Result<Vec<SymptomEvent>> {
    let rows = sqlx::query(
        "SELECT id, recorded_at, symptom, severity, notes FROM symptom_events ORDER BY rowid",
    )
    .fetch_all(pool)
    .await?;

    let mut events: Vec<SymptomEvent> = rows
        .iter()
        .filter_map(|row| match event_from_row(row) {
            Ok(event) => Some(event),
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "skipping unreadable entry");
                None
            }
        })
        .collect();
    events.sort_by_key(|event| std::cmp::Reverse(event.occurred_at()));

    tracing::debug!(count = events.len(), "loaded symptom events");
    Ok(events)
}

pub async fn seed(pool: &SqlitePool, now: DateTime<Local>) -> anyhow::Result<usize> {
    let entries = vec![
        ("5b0f3c52-8a9e-4c1d-9f2a-6d3e1b7c4a01", 13, "Headache", 7, "Woke up with pressure behind the eyes"),
        ("5b0f3c52-8a9e-4c1d-9f2a-6d3e1b7c4a02", 9, "Headache", 6, "Eased after a nap"),
        ("5b0f3c52-8a9e-4c1d-9f2a-6d3e1b7c4a03", 5, "Headache", 4, ""),
        ("5b0f3c52-8a9e-4c1d-9f2a-6d3e1b7c4a04", 1, "Headache", 3, "Mild, after screen time"),
        ("5b0f3c52-8a9e-4c1d-9f2a-6d3e1b7c4a05", 6, "Fatigue", 4, "Long shift"),
        ("5b0f3c52-8a9e-4c1d-9f2a-6d3e1b7c4a06", 2, "Fatigue", 6, "Poor sleep the night before"),
        ("5b0f3c52-8a9e-4c1d-9f2a-6d3e1b7c4a07", 0, "Fatigue", 7, ""),
        ("5b0f3c52-8a9e-4c1d-9f2a-6d3e1b7c4a08", 3, "Dizziness", 5, "Standing up too quickly"),
        ("5b0f3c52-8a9e-4c1d-9f2a-6d3e1b7c4a09", 4, "Sensitivity to Light", 6, "Grocery store lighting"),
        ("5b0f3c52-8a9e-4c1d-9f2a-6d3e1b7c4a0a", 0, "Memory Fog", 5, "Lost track of a conversation"),
    ];

    let mut inserted = 0usize;
    for (id, days_ago, symptom, severity, notes) in entries {
        let event = SymptomEvent {
            id: Uuid::parse_str(id)?,
            timestamp: (now - Duration::days(days_ago)).to_rfc3339(),
            symptom: symptom.to_string(),
            severity,
            notes: notes.to_string(),
        };
        if insert_row(pool, &event).await? {
            inserted += 1;
        }
    }

    tracing::info!(inserted, "seeded demo entries");
    Ok(inserted)
}

/// Imports events from a CSV file with an `id,timestamp,symptom,severity,notes` header.
///
/// `id` may be blank; rows whose id already exists are skipped.
pub async fn import_csv(pool: &SqlitePool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        id: Option<Uuid>,
        timestamp: String,
        symptom: String,
        severity: i32,
        #[serde(default)]
        notes: String,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut inserted = 0usize;

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let line = index + 2;
        let row = result.with_context(|| format!("line {line}: malformed row"))?;
        DateTime::parse_from_rfc3339(&row.timestamp)
            .with_context(|| format!("line {line}: timestamp {} is not RFC 3339", row.timestamp))?;
        validate_severity(row.severity).with_context(|| format!("line {line}"))?;
        validate_symptom(&row.symptom, &[], true).with_context(|| format!("line {line}"))?;

        let event = SymptomEvent {
            id: row.id.unwrap_or_else(Uuid::new_v4),
            timestamp: row.timestamp,
            symptom: row.symptom,
            severity: row.severity,
            notes: row.notes,
        };

        if insert_row(pool, &event).await? {
            inserted += 1;
        }
    }

    tracing::info!(inserted, path = %csv_path.display(), "imported csv");
    Ok(inserted)
}
