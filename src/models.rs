use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type TaskId = u32;

/// Date format accepted at the boundary and written to disk.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const DEFAULT_REMINDER_WINDOW_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Pending => f.write_str("Pending"),
            TaskStatus::Completed => f.write_str("Completed"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    /// Open domain: `High`, `Medium` and `Low` are ranked, anything else sorts last.
    pub priority: String,
    pub due_date: NaiveDate,
    pub status: TaskStatus,
}

impl Task {
    pub fn new(
        id: TaskId,
        title: String,
        description: String,
        priority: String,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            title,
            description,
            priority,
            due_date,
            status: TaskStatus::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    pub fn mark_complete(&mut self) {
        self.status = TaskStatus::Completed;
    }

    /// Days from `today` until the task is due. Negative when overdue.
    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.due_date - today).num_days()
    }

    pub fn priority_rank(&self) -> u8 {
        priority_rank(&self.priority)
    }

    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}) - Due: {} - {}",
            self.id,
            self.title,
            self.priority,
            self.due_date.format(DATE_FORMAT),
            self.status
        )
    }
}

pub fn priority_rank(priority: &str) -> u8 {
    match priority {
        "High" => 1,
        "Medium" => 2,
        "Low" => 3,
        _ => 4,
    }
}

pub fn parse_due_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Settings {
    #[serde(default = "default_reminder_window_days")]
    pub reminder_window_days: i64,
    #[serde(default = "default_autosave_sorted_order")]
    pub autosave_sorted_order: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reminder_window_days: default_reminder_window_days(),
            autosave_sorted_order: default_autosave_sorted_order(),
        }
    }
}

fn default_reminder_window_days() -> i64 {
    DEFAULT_REMINDER_WINDOW_DAYS
}

fn default_autosave_sorted_order() -> bool {
    true
}
