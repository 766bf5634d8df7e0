use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use super::TextInput;
use crate::domain::{
    parse_deadline, DomainError, DomainResult, Priority, Status, Task, TaskDraft, TaskId,
    TaskUpdate,
};

#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    Create,
    Edit(TaskId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Priority,
    Status,
    Deadline,
}

impl FormField {
    const ORDER: [FormField; 5] = [
        FormField::Title,
        FormField::Description,
        FormField::Priority,
        FormField::Status,
        FormField::Deadline,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// What the form hands to the store on submit.
#[derive(Debug, Clone, PartialEq)]
pub enum FormSubmission {
    Create(TaskDraft),
    Update(TaskUpdate),
}

/// Create/edit form. Validates at the boundary so the store only ever sees
/// well-formed input.
#[derive(Debug, Clone)]
pub struct TaskForm {
    mode: FormMode,
    title: TextInput,
    description: TextInput,
    deadline: TextInput,
    priority: Priority,
    status: Status,
    initial_status: Status,
    focused: FormField,
    error: Option<String>,
}

impl TaskForm {
    pub fn create() -> Self {
        let mut form = Self {
            mode: FormMode::Create,
            title: TextInput::new("Task title"),
            description: TextInput::new("Task description"),
            deadline: TextInput::new("YYYY-MM-DD (optional)"),
            priority: Priority::default(),
            status: Status::default(),
            initial_status: Status::default(),
            focused: FormField::Title,
            error: None,
        };
        form.sync_focus();
        form
    }

    pub fn edit(task: &Task) -> Self {
        let deadline = task
            .deadline
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();

        let mut form = Self {
            mode: FormMode::Edit(task.id.clone()),
            title: TextInput::new("Task title").with_value(&task.title),
            description: TextInput::new("Task description").with_value(&task.description),
            deadline: TextInput::new("YYYY-MM-DD (optional)").with_value(&deadline),
            priority: task.priority,
            status: task.status,
            initial_status: task.status,
            focused: FormField::Title,
            error: None,
        };
        form.sync_focus();
        form
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, FormMode::Edit(_))
    }

    pub fn focus_next(&mut self) {
        self.focused = self.focused.next();
        self.sync_focus();
    }

    pub fn focus_prev(&mut self) {
        self.focused = self.focused.prev();
        self.sync_focus();
    }

    fn sync_focus(&mut self) {
        self.title.set_focused(self.focused == FormField::Title);
        self.description
            .set_focused(self.focused == FormField::Description);
        self.deadline.set_focused(self.focused == FormField::Deadline);
    }

    fn focused_input(&mut self) -> Option<&mut TextInput> {
        match self.focused {
            FormField::Title => Some(&mut self.title),
            FormField::Description => Some(&mut self.description),
            FormField::Deadline => Some(&mut self.deadline),
            FormField::Priority | FormField::Status => None,
        }
    }

    pub fn input_char(&mut self, c: char) {
        if let Some(input) = self.focused_input() {
            input.insert_char(c);
            self.error = None;
        }
    }

    pub fn backspace(&mut self) {
        if let Some(input) = self.focused_input() {
            input.delete_char();
        }
    }

    pub fn delete(&mut self) {
        if let Some(input) = self.focused_input() {
            input.delete_forward();
        }
    }

    /// Left arrow: move the text cursor, or pick the previous option.
    pub fn left(&mut self) {
        match self.focused {
            FormField::Priority => self.priority = self.priority.cycle_prev(),
            FormField::Status => self.status = self.status.cycle_prev(),
            _ => {
                if let Some(input) = self.focused_input() {
                    input.move_left();
                }
            }
        }
    }

    pub fn right(&mut self) {
        match self.focused {
            FormField::Priority => self.priority = self.priority.cycle_next(),
            FormField::Status => self.status = self.status.cycle_next(),
            _ => {
                if let Some(input) = self.focused_input() {
                    input.move_right();
                }
            }
        }
    }

    /// Build the submission. An edit only carries a status when the user
    /// picked a different one, and never carries comments, so anything
    /// changed on the board meanwhile survives the merge.
    pub fn build(&self) -> DomainResult<FormSubmission> {
        let title = self.title.value().trim().to_string();
        let description = self.description.value().trim().to_string();
        let deadline = match self.deadline.value().trim() {
            "" => None,
            raw => Some(parse_deadline(raw)?),
        };

        match &self.mode {
            FormMode::Create => {
                let draft = TaskDraft {
                    title,
                    description,
                    priority: self.priority,
                    status: self.status,
                    deadline,
                    comments: None,
                };
                draft.validate()?;
                Ok(FormSubmission::Create(draft))
            }
            FormMode::Edit(id) => {
                let update = TaskUpdate {
                    id: id.clone(),
                    title: Some(title),
                    description: Some(description),
                    priority: Some(self.priority),
                    status: (self.status != self.initial_status).then_some(self.status),
                    deadline: Some(deadline),
                    comments: None,
                };
                update.validate()?;
                Ok(FormSubmission::Update(update))
            }
        }
    }

    /// Validate and return the submission, or record an inline error.
    pub fn submit(&mut self) -> Option<FormSubmission> {
        match self.build() {
            Ok(submission) => {
                self.error = None;
                Some(submission)
            }
            Err(e) => {
                self.focused = match e {
                    DomainError::InvalidDate(_) => FormField::Deadline,
                    _ => FormField::Title,
                };
                self.sync_focus();
                self.error = Some(validation_message(&e));
                None
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Clear, area);

        let heading = if self.is_editing() {
            "Edit Task"
        } else {
            "Create New Task"
        };
        let block = Block::default()
            .title(heading)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(3), // Description
                Constraint::Length(3), // Priority
                Constraint::Length(3), // Status
                Constraint::Length(3), // Deadline
                Constraint::Length(1), // Validation message
                Constraint::Min(0),
                Constraint::Length(1), // Hints
            ])
            .split(inner);

        self.title.render(frame, rows[0], "Title");
        self.description.render(frame, rows[1], "Description");
        self.render_choice(
            frame,
            rows[2],
            "Priority",
            FormField::Priority,
            Priority::ALL
                .iter()
                .map(|p| (p.label(), *p == self.priority, priority_color(*p)))
                .collect(),
        );
        self.render_choice(
            frame,
            rows[3],
            "Status",
            FormField::Status,
            Status::ALL
                .iter()
                .map(|s| (s.title(), *s == self.status, Color::White))
                .collect(),
        );
        self.deadline.render(frame, rows[4], "Deadline");

        if let Some(error) = &self.error {
            frame.render_widget(
                Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red)),
                rows[5],
            );
        }

        let submit = if self.is_editing() {
            "Update Task"
        } else {
            "Add Task"
        };
        let hints = format!("Tab: next field | ←/→: choose | Enter: {submit} | Esc: cancel");
        frame.render_widget(
            Paragraph::new(hints).style(Style::default().fg(Color::DarkGray)),
            rows[7],
        );
    }

    fn render_choice(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        field: FormField,
        options: Vec<(&'static str, bool, Color)>,
    ) {
        let border_style = if self.focused == field {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };

        let mut spans = Vec::new();
        for (label, selected, color) in options {
            let marker = if selected { "(•) " } else { "( ) " };
            let mut style = Style::default().fg(color);
            if selected {
                style = style.add_modifier(Modifier::BOLD);
            }
            spans.push(Span::styled(format!("{marker}{label}"), style));
            spans.push(Span::raw("   "));
        }

        let paragraph = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .title(title.to_string())
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(border_style),
        );
        frame.render_widget(paragraph, area);
    }
}

fn validation_message(error: &DomainError) -> String {
    match error {
        DomainError::MissingField(field) if field == "title" => "Title is required".to_string(),
        DomainError::InvalidDate(_) => "Deadline must be a date like 2024-05-17".to_string(),
        other => other.to_string(),
    }
}

pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}
