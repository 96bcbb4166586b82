//! CSV export of workout history.
//!
//! Flattens the append-only log into one row per exercise slot per session
//! for spreadsheet analysis. The export is a full rewrite of the target
//! file, synced to disk before returning.

use crate::types::WorkoutHistory;
use crate::Result;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    session_id: String,
    completed_at: String,
    day_index: u8,
    exercise_id: String,
    sets: u32,
    completed_sets: u32,
    target_type: String,
    target_value: u32,
    actual_values: String,
    duration_seconds: Option<u32>,
}

/// Write a user's history to CSV, returning the number of rows written
pub fn export_history_csv(records: &[WorkoutHistory], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);

    let mut rows = 0;
    for record in records {
        for exercise in &record.exercises {
            let target_type = serde_json::to_value(exercise.target.kind)?
                .as_str()
                .unwrap_or("reps")
                .to_string();
            let actual_values = exercise
                .actual_values
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join("|");

            writer.serialize(CsvRow {
                session_id: record.id.to_string(),
                completed_at: record.completed_at.to_rfc3339(),
                day_index: record.day_index,
                exercise_id: exercise.exercise_id.clone(),
                sets: exercise.sets,
                completed_sets: exercise.completed_sets,
                target_type,
                target_value: exercise.target.value,
                actual_values,
                duration_seconds: record.duration_seconds,
            })?;
            rows += 1;
        }
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Exported {} history rows to {:?}", rows, path);
    Ok(rows)
}
