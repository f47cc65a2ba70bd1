use std::path::Path;

use anyhow::Context;

use crate::models::{Milestone, Status, StatusEntry, Worker};

/// Short cell text for one status entry, matching the spreadsheet export:
/// "Done (date)", "Waiting (date)", "Issue: note", or "-" when nothing has
/// been recorded.
pub fn status_cell(entry: Option<&StatusEntry>) -> String {
    let Some(entry) = entry else {
        return "-".to_string();
    };
    match entry.status {
        Status::Done => match &entry.date {
            Some(date) => format!("Done ({date})"),
            None => "Done".to_string(),
        },
        Status::Waiting => match &entry.date {
            Some(date) => format!("Waiting ({date})"),
            None => "Waiting".to_string(),
        },
        Status::Issue => format!("Issue: {}", entry.note.as_deref().unwrap_or("")),
        Status::Unset => "-".to_string(),
    }
}

fn worker_row(index: usize, worker: &Worker) -> Vec<String> {
    let mut row = vec![(index + 1).to_string(), worker.name.clone()];

    for milestone in Milestone::ALL {
        row.push(status_cell(worker.statuses.get(milestone)));
    }

    let arrival = worker
        .statuses
        .get(Milestone::Booking)
        .and_then(|entry| entry.date.clone())
        .unwrap_or_else(|| "-".to_string());
    row.push(arrival);

    let latest = worker
        .history
        .first()
        .map(|log| format!("{} ({})", log.action.describe(), log.user))
        .unwrap_or_else(|| "-".to_string());
    row.push(latest);

    row
}

/// One CSV row per worker: index, name, the five milestone cells, flight
/// arrival date, and the latest audit entry.
pub fn write_csv(workers: &[Worker], out: &Path) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(out)
        .with_context(|| format!("failed to create {}", out.display()))?;

    let mut headers = vec!["ID".to_string(), "Worker Name".to_string()];
    headers.extend(Milestone::ALL.iter().map(|m| m.label().to_string()));
    headers.push("Flight Arrival".to_string());
    headers.push("Latest Update".to_string());
    writer.write_record(&headers)?;

    for (index, worker) in workers.iter().enumerate() {
        writer.write_record(worker_row(index, worker))?;
    }

    writer.flush()?;
    Ok(())
}
