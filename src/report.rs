use std::fmt::Write;

use chrono::{DateTime, Duration, Utc};

use crate::models::{
    DetailedStats, Milestone, MilestoneBreakdown, MilestoneCounts, ReportCategory, ReportItem,
    Status, WeeklyReport, WeeklyReportSummary, Worker,
};

/// The archive keeps at most this many weekly snapshots; oldest drop first.
pub const MAX_ARCHIVED_REPORTS: usize = 12;

/// Trailing window for the "recent completions" category.
pub const RECENT_WINDOW_DAYS: i64 = 7;

pub fn summarize(workers: &[Worker]) -> WeeklyReportSummary {
    let mut breakdown: Vec<MilestoneBreakdown> = Milestone::ALL
        .into_iter()
        .map(|milestone| MilestoneBreakdown {
            milestone,
            counts: MilestoneCounts::default(),
        })
        .collect();

    let mut completed = 0;
    let mut waiting = 0;
    let mut issues = 0;

    for worker in workers {
        for (milestone, entry) in worker.statuses.iter() {
            let idx = Milestone::ALL
                .iter()
                .position(|m| *m == milestone)
                .unwrap_or(0);
            match entry.status {
                Status::Done => {
                    completed += 1;
                    breakdown[idx].counts.done += 1;
                }
                Status::Waiting => {
                    waiting += 1;
                    breakdown[idx].counts.waiting += 1;
                }
                Status::Issue => {
                    issues += 1;
                    breakdown[idx].counts.issue += 1;
                }
                Status::Unset => {}
            }
        }
    }

    WeeklyReportSummary {
        total_workers: workers.len(),
        total_slots: workers.len() * Milestone::ALL.len(),
        completed,
        waiting,
        issues,
        breakdown,
    }
}

fn add_to_category(list: &mut Vec<ReportCategory>, name: &str, item: ReportItem) {
    let category = match list.iter_mut().find(|c| c.name == name) {
        Some(existing) => existing,
        None => {
            list.push(ReportCategory {
                name: name.to_string(),
                count: 0,
                items: Vec::new(),
            });
            list.last_mut().unwrap()
        }
    };
    category.count += 1;
    category.items.push(item);
}

/// Categorized breakdown for the weekly report. Pure and idempotent: the
/// same worker list and clock always produce identical output.
pub fn detailed_stats(workers: &[Worker], now: DateTime<Utc>) -> DetailedStats {
    let mut stats = DetailedStats::default();
    let window_start = now - Duration::days(RECENT_WINDOW_DAYS);

    for worker in workers {
        for (milestone, entry) in worker.statuses.iter() {
            match entry.status {
                Status::Done => {
                    if entry.timestamp >= window_start {
                        add_to_category(
                            &mut stats.recent_completions,
                            milestone.label(),
                            ReportItem {
                                worker_name: worker.name.clone(),
                                detail: entry.date.as_ref().map(|d| format!("Date: {d}")),
                                timestamp: Some(entry.timestamp),
                            },
                        );
                    }
                }
                Status::Waiting => {
                    add_to_category(
                        &mut stats.bottlenecks,
                        milestone.label(),
                        ReportItem {
                            worker_name: worker.name.clone(),
                            detail: None,
                            timestamp: Some(entry.timestamp),
                        },
                    );
                }
                Status::Issue => {
                    add_to_category(
                        &mut stats.critical_issues,
                        milestone.label(),
                        ReportItem {
                            worker_name: worker.name.clone(),
                            detail: Some(
                                entry
                                    .note
                                    .clone()
                                    .unwrap_or_else(|| "No details provided".to_string()),
                            ),
                            timestamp: Some(entry.timestamp),
                        },
                    );
                }
                Status::Unset => {}
            }

            if milestone == Milestone::Booking && entry.status == Status::Done {
                if let Some(date) = entry.date.as_ref().filter(|d| !d.is_empty()) {
                    stats.upcoming_arrivals.push(ReportItem {
                        worker_name: worker.name.clone(),
                        detail: Some(date.clone()),
                        timestamp: None,
                    });
                }
            }
        }
    }

    // Lexicographic on the raw date string. Only correct for zero-padded
    // ISO dates, which is what the date inputs have always produced.
    stats
        .upcoming_arrivals
        .sort_by(|a, b| a.detail.cmp(&b.detail));

    stats
}

/// Snapshot the full worker list along with its derived summary and stats.
pub fn build_report(workers: &[Worker], week: String, now: DateTime<Utc>) -> WeeklyReport {
    WeeklyReport {
        week,
        created_at: now,
        workers: workers.to_vec(),
        summary: summarize(workers),
        stats: detailed_stats(workers, now),
    }
}

/// Insert a snapshot into the archive: any previous report for the same
/// week is replaced, the new one goes first, and the archive is truncated
/// to `MAX_ARCHIVED_REPORTS`.
pub fn archive(reports: &mut Vec<WeeklyReport>, report: WeeklyReport) {
    reports.retain(|r| r.week != report.week);
    reports.insert(0, report);
    reports.truncate(MAX_ARCHIVED_REPORTS);
}

fn render_categories(output: &mut String, heading: &str, categories: &[ReportCategory]) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## {heading}");

    if categories.is_empty() {
        let _ = writeln!(output, "Nothing in this category.");
        return;
    }

    for category in categories {
        let names: Vec<&str> = category
            .items
            .iter()
            .map(|item| item.worker_name.as_str())
            .collect();
        let _ = writeln!(
            output,
            "- {} ({}): {}",
            category.name,
            category.count,
            names.join(", ")
        );
        for item in &category.items {
            if let Some(detail) = &item.detail {
                let _ = writeln!(output, "  - {}: {}", item.worker_name, detail);
            }
        }
    }
}

pub fn render(report: &WeeklyReport) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Weekly Report: {}", report.week);
    let _ = writeln!(
        output,
        "Generated {}",
        report.created_at.format("%d %b %Y %H:%M UTC")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");
    let _ = writeln!(output, "- Workers: {}", report.summary.total_workers);
    let _ = writeln!(
        output,
        "- Completed: {} / {}",
        report.summary.completed, report.summary.total_slots
    );
    let _ = writeln!(output, "- Waiting: {}", report.summary.waiting);
    let _ = writeln!(output, "- Issues: {}", report.summary.issues);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Per-Milestone Breakdown");
    for entry in &report.summary.breakdown {
        let _ = writeln!(
            output,
            "- {}: {} done, {} waiting, {} issues",
            entry.milestone, entry.counts.done, entry.counts.waiting, entry.counts.issue
        );
    }

    render_categories(&mut output, "Recent Completions", &report.stats.recent_completions);
    render_categories(&mut output, "Bottlenecks", &report.stats.bottlenecks);
    render_categories(&mut output, "Critical Issues", &report.stats.critical_issues);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Upcoming Arrivals");
    if report.stats.upcoming_arrivals.is_empty() {
        let _ = writeln!(output, "No booked arrivals.");
    } else {
        for item in &report.stats.upcoming_arrivals {
            let _ = writeln!(
                output,
                "- {}: {}",
                item.worker_name,
                item.detail.as_deref().unwrap_or("-")
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{apply_update, FieldEdit};
    use crate::models::Worker;

    fn worker_with(
        name: &str,
        milestone: Milestone,
        status: Status,
        date: Option<&str>,
        note: Option<&str>,
        at: DateTime<Utc>,
    ) -> Worker {
        let worker = Worker::new(name);
        let id = worker.id;
        let mut list = vec![worker];
        apply_update(
            &mut list,
            id,
            milestone,
            FieldEdit::Status(status),
            "ops",
            at,
        );
        if let Some(date) = date {
            apply_update(
                &mut list,
                id,
                milestone,
                FieldEdit::Date(date.to_string()),
                "ops",
                at,
            );
        }
        if let Some(note) = note {
            apply_update(
                &mut list,
                id,
                milestone,
                FieldEdit::Note(note.to_string()),
                "ops",
                at,
            );
        }
        list.pop().unwrap()
    }

    fn report_at(week: &str, now: DateTime<Utc>) -> WeeklyReport {
        build_report(&[], week.to_string(), now)
    }

    #[test]
    fn summary_counts_and_slot_total() {
        let now = Utc::now();
        let workers = vec![
            worker_with("A", Milestone::Training, Status::Done, None, None, now),
            worker_with("B", Milestone::Training, Status::Waiting, None, None, now),
            worker_with("C", Milestone::Stamp, Status::Issue, None, None, now),
            Worker::new("D"),
        ];

        let summary = summarize(&workers);
        assert_eq!(summary.total_workers, 4);
        assert_eq!(summary.total_slots, 20);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.waiting, 1);
        assert_eq!(summary.issues, 1);
        assert!(summary.completed + summary.waiting + summary.issues <= summary.total_slots);

        let training = summary
            .breakdown
            .iter()
            .find(|b| b.milestone == Milestone::Training)
            .unwrap();
        assert_eq!(training.counts.done, 1);
        assert_eq!(training.counts.waiting, 1);
        assert_eq!(training.counts.issue, 0);
    }

    #[test]
    fn recent_completions_respect_the_window() {
        let now = Utc::now();
        let workers = vec![
            worker_with("Fresh", Milestone::Oec, Status::Done, None, None, now),
            worker_with(
                "Stale",
                Milestone::Oec,
                Status::Done,
                None,
                None,
                now - Duration::days(10),
            ),
        ];

        let stats = detailed_stats(&workers, now);
        assert_eq!(stats.recent_completions.len(), 1);
        let category = &stats.recent_completions[0];
        assert_eq!(category.name, "OEC");
        assert_eq!(category.count, 1);
        assert_eq!(category.items[0].worker_name, "Fresh");
    }

    #[test]
    fn issues_carry_note_or_placeholder() {
        let now = Utc::now();
        let workers = vec![
            worker_with(
                "A",
                Milestone::Stamp,
                Status::Issue,
                None,
                Some("passport expired"),
                now,
            ),
            worker_with("B", Milestone::Stamp, Status::Issue, None, None, now),
        ];

        let stats = detailed_stats(&workers, now);
        let category = &stats.critical_issues[0];
        assert_eq!(category.count, 2);
        assert_eq!(category.items[0].detail.as_deref(), Some("passport expired"));
        assert_eq!(category.items[1].detail.as_deref(), Some("No details provided"));
    }

    #[test]
    fn bottlenecks_group_without_time_filter() {
        let now = Utc::now();
        let workers = vec![
            worker_with(
                "Old",
                Milestone::Training,
                Status::Waiting,
                None,
                None,
                now - Duration::days(90),
            ),
            worker_with("New", Milestone::Training, Status::Waiting, None, None, now),
        ];

        let stats = detailed_stats(&workers, now);
        assert_eq!(stats.bottlenecks.len(), 1);
        assert_eq!(stats.bottlenecks[0].count, 2);
    }

    #[test]
    fn arrivals_sorted_by_date_string() {
        let now = Utc::now();
        let workers = vec![
            worker_with(
                "Late",
                Milestone::Booking,
                Status::Done,
                Some("2026-11-03"),
                None,
                now,
            ),
            worker_with(
                "Early",
                Milestone::Booking,
                Status::Done,
                Some("2026-09-21"),
                None,
                now,
            ),
            // Done without a date never shows up as an arrival.
            worker_with("NoDate", Milestone::Booking, Status::Done, None, None, now),
        ];

        let stats = detailed_stats(&workers, now);
        let order: Vec<&str> = stats
            .upcoming_arrivals
            .iter()
            .map(|item| item.worker_name.as_str())
            .collect();
        assert_eq!(order, vec!["Early", "Late"]);
    }

    #[test]
    fn stats_are_idempotent() {
        let now = Utc::now();
        let workers = vec![worker_with(
            "A",
            Milestone::Booking,
            Status::Done,
            Some("2026-10-01"),
            None,
            now,
        )];

        assert_eq!(detailed_stats(&workers, now), detailed_stats(&workers, now));
    }

    #[test]
    fn archive_replaces_same_week_entry() {
        let now = Utc::now();
        let mut reports = Vec::new();

        archive(&mut reports, report_at("Week 34 - 2026", now));
        let second = report_at("Week 34 - 2026", now + Duration::hours(1));
        let second_created = second.created_at;
        archive(&mut reports, second);

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].created_at, second_created);
    }

    #[test]
    fn archive_caps_at_twelve_dropping_oldest() {
        let now = Utc::now();
        let mut reports = Vec::new();

        for week in 1..=13 {
            archive(&mut reports, report_at(&format!("Week {week} - 2026"), now));
        }

        assert_eq!(reports.len(), MAX_ARCHIVED_REPORTS);
        assert_eq!(reports[0].week, "Week 13 - 2026");
        assert!(!reports.iter().any(|r| r.week == "Week 1 - 2026"));
    }

    #[test]
    fn render_includes_summary_and_arrivals() {
        let now = Utc::now();
        let workers = vec![worker_with(
            "A",
            Milestone::Booking,
            Status::Done,
            Some("2026-10-01"),
            None,
            now,
        )];
        let report = build_report(&workers, "Week 40 - 2026".to_string(), now);
        let text = render(&report);

        assert!(text.contains("# Weekly Report: Week 40 - 2026"));
        assert!(text.contains("- Completed: 1 / 5"));
        assert!(text.contains("- A: 2026-10-01"));
    }
}
