//! Dashboard aggregates over loaded lists.

use crate::model::{Item, Status};
use crate::view::{self, TaggedItem};
use chrono::{Days, NaiveDate};
use serde::Serialize;

/// Days covered by [`weekly_series`].
pub const WEEK_DAYS: u64 = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub done: usize,
}

impl StatusCounts {
    #[must_use]
    pub fn of(items: &[Item]) -> Self {
        let done = items.iter().filter(|item| item.is_done()).count();
        Self {
            total: items.len(),
            pending: items.len() - done,
            done,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OverviewStats {
    pub total_tasks: usize,
    pub total_todos: usize,
    pub completed_tasks: usize,
    pub completed_todos: usize,
    pub pending_tasks: usize,
    pub pending_todos: usize,
}

impl OverviewStats {
    #[must_use]
    pub fn of(tasks: &[Item], todos: &[Item]) -> Self {
        let tasks = StatusCounts::of(tasks);
        let todos = StatusCounts::of(todos);
        Self {
            total_tasks: tasks.total,
            total_todos: todos.total,
            completed_tasks: tasks.done,
            completed_todos: todos.done,
            pending_tasks: tasks.pending,
            pending_todos: todos.pending,
        }
    }
}

/// Items created on one calendar day, split by current status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    /// Short weekday name (`Mon`..`Sun`).
    pub weekday: String,
    pub completed: usize,
    pub pending: usize,
}

/// The [`WEEK_DAYS`] UTC calendar days ending at `today`, oldest first.
///
/// Each bucket counts the items whose `created_at` falls on that day; their
/// completion date does not matter.
#[must_use]
pub fn weekly_series(items: &[Item], today: NaiveDate) -> Vec<DayBucket> {
    (0..WEEK_DAYS)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|date| {
            let created_that_day = items
                .iter()
                .filter(|item| item.created_at.date_naive() == date);
            let (completed, pending) =
                created_that_day.fold((0, 0), |(done, open), item| match item.status {
                    Status::Done => (done + 1, open),
                    Status::Pending => (done, open + 1),
                });
            DayBucket {
                date,
                weekday: date.format("%a").to_string(),
                completed,
                pending,
            }
        })
        .collect()
}

/// Both collections merged and tagged, newest first.
#[must_use]
pub fn overview_table(tasks: &[Item], todos: &[Item]) -> Vec<TaggedItem> {
    view::overview(tasks, todos)
}
