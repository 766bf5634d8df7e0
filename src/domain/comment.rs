use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author recorded on comments. There are no accounts, so every comment is
/// attributed to the same local identity.
pub const LOCAL_AUTHOR: &str = "Current User";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommentId(pub String);

impl CommentId {
    pub fn generate() -> Self {
        CommentId(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CommentId {
    fn from(s: String) -> Self {
        CommentId(s)
    }
}

impl From<&str> for CommentId {
    fn from(s: &str) -> Self {
        CommentId(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub text: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Builds a comment stamped with a fresh id and the current time.
    pub fn new(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: CommentId::generate(),
            text: text.into(),
            author: author.into(),
            created_at: Utc::now(),
        }
    }

    /// Format the creation time for display, e.g. "Mar 4, 2:07 PM"
    pub fn created_display(&self) -> String {
        self.created_at.format("%b %-d, %-I:%M %p").to_string()
    }

    /// Format the time since creation for display
    pub fn time_since_created(&self) -> String {
        let now = Utc::now();
        let duration = now.signed_duration_since(self.created_at);

        if duration.num_days() > 0 {
            format!("{} days ago", duration.num_days())
        } else if duration.num_hours() > 0 {
            format!("{} hours ago", duration.num_hours())
        } else if duration.num_minutes() > 0 {
            format!("{} minutes ago", duration.num_minutes())
        } else {
            "Just now".to_string()
        }
    }
}
