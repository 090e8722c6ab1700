//! Deterministic demo data.

use chrono::{DateTime, Duration, TimeZone, Utc};
use taskboard_lib::{InMemoryTaskSource, Task, TaskPriority, TaskStatus};

const VERBS: [&str; 8] = [
    "Review", "Draft", "Fix", "Ship", "Refactor", "Document", "Benchmark", "Triage",
];
const SUBJECTS: [&str; 10] = [
    "login flow",
    "billing export",
    "search index",
    "release notes",
    "onboarding email",
    "API pagination",
    "dashboard charts",
    "audit log",
    "mobile layout",
    "backup job",
];

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 12, 1, 9, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Builds the `index`-th demo task. Higher indices are older.
pub fn task(index: usize) -> Task {
    let created = base_time() - Duration::minutes(index as i64 * 7);
    let title = format!(
        "{} {} #{}",
        VERBS[index % VERBS.len()],
        SUBJECTS[(index / VERBS.len()) % SUBJECTS.len()],
        index + 1
    );

    let mut task = Task::new(title)
        .with_status(TaskStatus::ALL[index % TaskStatus::ALL.len()])
        .created_at(created);

    if index % 5 != 4 {
        task = task.with_priority(TaskPriority::ALL[index % TaskPriority::ALL.len()]);
    }
    if index % 3 == 0 {
        task = task.with_description(format!("Follow-up for item {}", index + 1));
    }
    if index % 4 == 1 {
        task = task.with_due_date(created + Duration::days(14));
    }
    task
}

/// A source holding `count` demo tasks.
pub fn source(count: usize) -> InMemoryTaskSource {
    InMemoryTaskSource::with_tasks((0..count).map(task))
}
