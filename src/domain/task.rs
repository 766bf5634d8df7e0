use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Comment, DomainError, DomainResult};

/// Deadlines this many days out (or fewer) are flagged as due soon.
const DUE_SOON_DAYS: i64 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn generate() -> Self {
        TaskId(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        TaskId(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Sort key: lower ranks come first on the board.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Next value when cycling through a selector, wrapping around.
    pub fn cycle_next(self) -> Self {
        match self {
            Priority::High => Priority::Medium,
            Priority::Medium => Priority::Low,
            Priority::Low => Priority::High,
        }
    }

    pub fn cycle_prev(self) -> Self {
        match self {
            Priority::High => Priority::Low,
            Priority::Medium => Priority::High,
            Priority::Low => Priority::Medium,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(DomainError::InvalidPriority(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Todo,
    InProgress,
    Completed,
}

impl Status {
    /// Column order on the board.
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Completed];

    pub fn title(self) -> &'static str {
        match self {
            Status::Todo => "To Do",
            Status::InProgress => "In Progress",
            Status::Completed => "Completed",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in-progress",
            Status::Completed => "completed",
        }
    }

    pub fn column_index(self) -> usize {
        match self {
            Status::Todo => 0,
            Status::InProgress => 1,
            Status::Completed => 2,
        }
    }

    /// Forward transition offered on a card: Start (todo), Complete
    /// (in progress), Reopen (completed).
    pub fn advance(self) -> Self {
        match self {
            Status::Todo => Status::InProgress,
            Status::InProgress => Status::Completed,
            Status::Completed => Status::InProgress,
        }
    }

    /// Backward transition: only in-progress tasks can go back to todo.
    pub fn retreat(self) -> Option<Self> {
        match self {
            Status::InProgress => Some(Status::Todo),
            Status::Todo | Status::Completed => None,
        }
    }

    /// Button label for `advance()` from this status.
    pub fn advance_label(self) -> &'static str {
        match self {
            Status::Todo => "Start",
            Status::InProgress => "Complete",
            Status::Completed => "Reopen",
        }
    }

    pub fn cycle_next(self) -> Self {
        Status::ALL[(self.column_index() + 1) % Status::ALL.len()]
    }

    pub fn cycle_prev(self) -> Self {
        Status::ALL[(self.column_index() + Status::ALL.len() - 1) % Status::ALL.len()]
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "todo" => Ok(Status::Todo),
            "in-progress" | "in_progress" | "inprogress" => Ok(Status::InProgress),
            "completed" | "done" => Ok(Status::Completed),
            other => Err(DomainError::InvalidStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineUrgency {
    Overdue,
    DueToday,
    DueSoon,
    Later,
}

impl Task {
    /// Materialize a validated draft under a freshly assigned id.
    pub fn from_draft(draft: TaskDraft) -> Self {
        Self {
            id: TaskId::generate(),
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            status: draft.status,
            deadline: draft.deadline,
            comments: draft.comments.unwrap_or_default(),
        }
    }

    /// Merge an edit into this task. Fields present on the update win;
    /// omitted fields keep their stored value. Status and comments in
    /// particular survive an edit that doesn't mention them, so a status
    /// change applied while the form was open is not reverted.
    pub fn apply(&mut self, update: TaskUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(deadline) = update.deadline {
            self.deadline = deadline;
        }
        if let Some(comments) = update.comments {
            self.comments = comments;
        }
    }

    pub fn deadline_urgency(&self) -> Option<DeadlineUrgency> {
        self.deadline_urgency_at(Utc::now())
    }

    pub fn deadline_urgency_at(&self, now: DateTime<Utc>) -> Option<DeadlineUrgency> {
        let deadline = self.deadline?;
        let days = (deadline.date_naive() - now.date_naive()).num_days();

        Some(match days {
            d if d < 0 => DeadlineUrgency::Overdue,
            0 => DeadlineUrgency::DueToday,
            d if d <= DUE_SOON_DAYS => DeadlineUrgency::DueSoon,
            _ => DeadlineUrgency::Later,
        })
    }

    /// Format the deadline for display
    pub fn deadline_display(&self) -> Option<String> {
        self.deadline_display_at(Utc::now())
    }

    pub fn deadline_display_at(&self, now: DateTime<Utc>) -> Option<String> {
        let deadline = self.deadline?;
        let day = deadline.format("%b %-d");

        Some(match self.deadline_urgency_at(now)? {
            DeadlineUrgency::DueToday => "Due today".to_string(),
            DeadlineUrgency::Overdue => format!("Overdue: {day}"),
            DeadlineUrgency::DueSoon | DeadlineUrgency::Later => format!("Due {day}"),
        })
    }
}

/// Parse a `YYYY-MM-DD` deadline into midnight UTC of that day.
pub fn parse_deadline(input: &str) -> DomainResult<DateTime<Utc>> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| DomainError::InvalidDate(trimmed.to_string()))
}

/// A task as submitted by the creation form, before it has an id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: Status,
    pub deadline: Option<DateTime<Utc>>,
    pub comments: Option<Vec<Comment>>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::MissingField("title".to_string()));
        }
        Ok(())
    }
}

/// An edit to an existing task. `None` means "leave as stored".
#[derive(Debug, Clone, PartialEq)]
pub struct TaskUpdate {
    pub id: TaskId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub deadline: Option<Option<DateTime<Utc>>>,
    pub comments: Option<Vec<Comment>>,
}

impl TaskUpdate {
    pub fn new(id: TaskId) -> Self {
        Self {
            id,
            title: None,
            description: None,
            priority: None,
            status: None,
            deadline: None,
            comments: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.deadline.is_none()
            && self.comments.is_none()
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(DomainError::MissingField("title".to_string()));
        }
        Ok(())
    }
}
