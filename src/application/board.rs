use crate::domain::{Status, Task};

/// One status column: the tasks carrying that status, in collection order.
#[derive(Debug, Clone, PartialEq)]
pub struct Column<'a> {
    pub status: Status,
    pub tasks: Vec<&'a Task>,
}

impl Column<'_> {
    pub fn title(&self) -> &'static str {
        self.status.title()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// The active collection grouped into To Do / In Progress / Completed.
#[derive(Debug, Clone, PartialEq)]
pub struct Board<'a> {
    pub columns: [Column<'a>; 3],
}

impl<'a> Board<'a> {
    pub fn from_tasks(tasks: &'a [Task]) -> Self {
        let columns = Status::ALL.map(|status| Column {
            status,
            tasks: tasks.iter().filter(|t| t.status == status).collect(),
        });
        Self { columns }
    }

    pub fn column(&self, status: Status) -> &Column<'a> {
        &self.columns[status.column_index()]
    }

    pub fn total(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }

    /// Human-readable summary, one column after another.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for column in &self.columns {
            out.push_str(&format!("{} ({})\n", column.title(), column.len()));
            if column.is_empty() {
                out.push_str("  No tasks\n");
            }
            for task in &column.tasks {
                out.push_str(&format!(
                    "  [{}] {} ({})",
                    task.priority.label(),
                    task.title,
                    task.id
                ));
                if let Some(deadline) = task.deadline_display() {
                    out.push_str(&format!(" - {deadline}"));
                }
                if !task.comments.is_empty() {
                    out.push_str(&format!(" - {} comments", task.comments.len()));
                }
                out.push('\n');
            }
        }
        out
    }
}
