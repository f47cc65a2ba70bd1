use chrono::{DateTime, Datelike, NaiveDate, Utc};
use uuid::Uuid;

use crate::models::{Action, Milestone, Status, StatusEntry, UpdateLog, Worker};

/// A single field-level edit to one status cell.
#[derive(Debug, Clone)]
pub enum FieldEdit {
    Status(Status),
    Date(String),
    Note(String),
}

/// Merge one field edit into a worker's status map and prepend exactly one
/// audit entry. Unknown worker ids are a silent no-op; the list is returned
/// unchanged and the caller sees `false`.
pub fn apply_update(
    workers: &mut [Worker],
    worker_id: Uuid,
    milestone: Milestone,
    edit: FieldEdit,
    user: &str,
    now: DateTime<Utc>,
) -> bool {
    let Some(worker) = workers.iter_mut().find(|w| w.id == worker_id) else {
        return false;
    };

    let entry = worker
        .statuses
        .slot_mut(milestone)
        .get_or_insert_with(|| StatusEntry {
            status: Status::Unset,
            date: None,
            note: None,
            updated_by: user.to_string(),
            timestamp: now,
        });

    let (action, log_note) = match edit {
        FieldEdit::Status(to) => {
            let from = entry.status;
            entry.status = to;
            (Action::StatusChanged { from, to }, None)
        }
        FieldEdit::Date(to) => {
            let from = entry.date.replace(to.clone());
            (
                Action::DateUpdated {
                    from,
                    to: to.clone(),
                },
                Some(format!("Set to {to}")),
            )
        }
        FieldEdit::Note(to) => {
            let from = entry.note.replace(to.clone());
            (Action::NoteUpdated { from, to: to.clone() }, Some(to))
        }
    };

    // Provenance is stamped on every touch, whichever field changed.
    entry.updated_by = user.to_string();
    entry.timestamp = now;

    worker.history.insert(
        0,
        UpdateLog {
            id: Uuid::new_v4(),
            milestone: milestone.label().to_string(),
            timestamp: now,
            user: user.to_string(),
            action,
            note: log_note,
        },
    );

    true
}

/// Append one worker per non-blank line of `text`, each with an empty
/// status map and a single "Created" audit entry. Returns how many were
/// added; existing workers are never touched.
pub fn bulk_import(
    workers: &mut Vec<Worker>,
    text: &str,
    user: &str,
    now: DateTime<Utc>,
) -> usize {
    let names: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    for name in &names {
        let mut worker = Worker::new(*name);
        worker.history.push(UpdateLog {
            id: Uuid::new_v4(),
            milestone: "System".to_string(),
            timestamp: now,
            user: user.to_string(),
            action: Action::Created,
            note: None,
        });
        workers.push(worker);
    }

    names.len()
}

/// Remove one worker by id. Returns whether anything was removed.
pub fn delete_worker(workers: &mut Vec<Worker>, worker_id: Uuid) -> bool {
    let before = workers.len();
    workers.retain(|w| w.id != worker_id);
    workers.len() < before
}

/// ISO week label for report archival, e.g. "Week 35 - 2026". Uses the ISO
/// week-numbering year, so dates near January 1 may label into the
/// neighboring year.
pub fn week_label(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("Week {} - {}", iso.week(), iso.year())
}
