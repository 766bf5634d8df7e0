use color_eyre::Result;
use std::time::{Duration, Instant};

use super::{
    event::{AppEvent, EventHandler},
    widgets::{priority_color, FormSubmission, TaskForm, TextInput},
};
use crate::application::{AppResult, Board, DragResult, DropLocation, TaskStore};
use crate::domain::{DeadlineUrgency, Status, Task, TaskId};
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Board,
    Form,
    Comments,
    Trash,
    Move,
    Help,
}

/// A status change waiting out its animation delay.
#[derive(Debug, Clone)]
struct PendingStatusChange {
    task_id: TaskId,
    to: Status,
    apply_at: Instant,
}

/// Keyboard drag in progress: the task being carried and where it would
/// land.
#[derive(Debug, Clone)]
struct MoveState {
    task_id: TaskId,
    title: String,
    source: DropLocation,
    target: DropLocation,
}

pub struct App {
    store: TaskStore,

    // UI State
    mode: AppMode,
    focused_column: Status,
    selected: [usize; 3],
    trash_selected: usize,

    // Overlays
    form: Option<TaskForm>,
    comment_task: Option<TaskId>,
    comment_input: TextInput,
    moving: Option<MoveState>,

    // Status transitions
    pending: Option<PendingStatusChange>,
    status_change_delay: Duration,

    status_message: Option<String>,
    error_message: Option<String>,
}

impl App {
    pub fn new(store: TaskStore, status_change_delay: Duration) -> Self {
        Self {
            store,
            mode: AppMode::Board,
            focused_column: Status::Todo,
            selected: [0; 3],
            trash_selected: 0,
            form: None,
            comment_task: None,
            comment_input: TextInput::new("Add a comment..."),
            moving: None,
            pending: None,
            status_change_delay,
            status_message: None,
            error_message: None,
        }
    }

    fn column_tasks(&self, status: Status) -> Vec<&Task> {
        self.store
            .active()
            .iter()
            .filter(|t| t.status == status)
            .collect()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        let index = self.selected[self.focused_column.column_index()];
        self.column_tasks(self.focused_column).get(index).copied()
    }

    fn selected_trash_task(&self) -> Option<&Task> {
        self.store.deleted().get(self.trash_selected)
    }

    fn clamp_selection(&mut self) {
        for status in Status::ALL {
            let len = self.column_tasks(status).len();
            let slot = &mut self.selected[status.column_index()];
            *slot = (*slot).min(len.saturating_sub(1));
        }
        let trash_len = self.store.deleted().len();
        self.trash_selected = self.trash_selected.min(trash_len.saturating_sub(1));
    }

    /// Point the board cursor at a task, wherever it now lives.
    fn select_task(&mut self, id: &TaskId) {
        let Some(task) = self.store.get(id) else {
            return;
        };
        let status = task.status;
        if let Some(index) = self
            .column_tasks(status)
            .iter()
            .position(|t| &t.id == id)
        {
            self.focused_column = status;
            self.selected[status.column_index()] = index;
        }
    }

    /// Run a store operation, surfacing any failure in the status bar.
    fn with_store<T>(&mut self, op: impl FnOnce(&mut TaskStore) -> AppResult<T>) -> Option<T> {
        match op(&mut self.store) {
            Ok(value) => {
                self.error_message = None;
                Some(value)
            }
            Err(e) => {
                tracing::error!(error = %e, "store operation failed");
                self.error_message = Some(e.to_string());
                None
            }
        }
    }

    /// Returns `true` when the app should exit.
    pub fn handle_event(&mut self, event: AppEvent) -> bool {
        if event == AppEvent::Quit {
            return true;
        }
        if event == AppEvent::Tick {
            return false;
        }

        match self.mode {
            AppMode::Board => return self.handle_board_event(event),
            AppMode::Form => self.handle_form_event(event),
            AppMode::Comments => self.handle_comments_event(event),
            AppMode::Trash => self.handle_trash_event(event),
            AppMode::Move => self.handle_move_event(event),
            AppMode::Help => self.mode = AppMode::Board,
        }
        false
    }

    fn handle_board_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Character('q') => return true,
            AppEvent::Character('?') => self.mode = AppMode::Help,

            AppEvent::Left | AppEvent::Character('h') | AppEvent::BackTab => {
                self.focused_column = self.focused_column.cycle_prev();
            }
            AppEvent::Right | AppEvent::Character('l') | AppEvent::Tab => {
                self.focused_column = self.focused_column.cycle_next();
            }
            AppEvent::Down | AppEvent::Character('j') => self.next_task(),
            AppEvent::Up | AppEvent::Character('k') => self.previous_task(),

            AppEvent::Character('n') => {
                self.form = Some(TaskForm::create());
                self.mode = AppMode::Form;
            }
            AppEvent::Enter | AppEvent::Character('e') => {
                if let Some(task) = self.selected_task() {
                    self.form = Some(TaskForm::edit(task));
                    self.mode = AppMode::Form;
                }
            }
            AppEvent::Character('d') | AppEvent::Character('x') | AppEvent::Delete => {
                self.delete_selected();
            }
            AppEvent::Character('s') => {
                if let Some(task) = self.selected_task() {
                    let (id, to) = (task.id.clone(), task.status.advance());
                    self.schedule_status_change(id, to);
                }
            }
            AppEvent::Character('b') => {
                if let Some(task) = self.selected_task() {
                    if let Some(to) = task.status.retreat() {
                        let id = task.id.clone();
                        self.schedule_status_change(id, to);
                    }
                }
            }
            AppEvent::Character('c') => {
                if let Some(task) = self.selected_task() {
                    self.comment_task = Some(task.id.clone());
                    self.comment_input.clear();
                    self.comment_input.set_focused(true);
                    self.mode = AppMode::Comments;
                }
            }
            AppEvent::Character('m') => self.start_move(),
            AppEvent::Character('t') => {
                self.trash_selected = 0;
                self.mode = AppMode::Trash;
            }
            AppEvent::Escape => {
                self.status_message = None;
                self.error_message = None;
            }
            _ => {}
        }
        false
    }

    fn next_task(&mut self) {
        let len = self.column_tasks(self.focused_column).len();
        if len == 0 {
            return;
        }
        let slot = &mut self.selected[self.focused_column.column_index()];
        *slot = if *slot >= len - 1 { 0 } else { *slot + 1 };
    }

    fn previous_task(&mut self) {
        let len = self.column_tasks(self.focused_column).len();
        if len == 0 {
            return;
        }
        let slot = &mut self.selected[self.focused_column.column_index()];
        *slot = if *slot == 0 { len - 1 } else { *slot - 1 };
    }

    fn delete_selected(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let (id, title) = (task.id.clone(), task.title.clone());
        if self.with_store(|store| store.delete(&id)) == Some(true) {
            self.status_message = Some(format!("Moved \"{title}\" to trash (t to view)"));
        }
        self.clamp_selection();
    }

    fn schedule_status_change(&mut self, task_id: TaskId, to: Status) {
        // One transition at a time.
        if self.pending.is_some() {
            return;
        }
        if self.status_change_delay.is_zero() {
            self.apply_status_change(&task_id, to);
            return;
        }
        self.pending = Some(PendingStatusChange {
            task_id,
            to,
            apply_at: Instant::now() + self.status_change_delay,
        });
    }

    fn apply_status_change(&mut self, task_id: &TaskId, to: Status) {
        if self.with_store(|store| store.change_status(task_id, to)) == Some(true) {
            self.status_message = Some(format!("Moved to {}", to.title()));
        }
        self.clamp_selection();
    }

    /// Apply a pending status change once its delay has elapsed.
    pub fn tick(&mut self, now: Instant) {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|pending| now >= pending.apply_at);
        if due {
            if let Some(pending) = self.pending.take() {
                self.apply_status_change(&pending.task_id, pending.to);
            }
        }
    }

    fn handle_form_event(&mut self, event: AppEvent) {
        let Some(form) = self.form.as_mut() else {
            self.mode = AppMode::Board;
            return;
        };

        match event {
            AppEvent::Escape => {
                self.form = None;
                self.mode = AppMode::Board;
            }
            AppEvent::Enter => {
                if let Some(submission) = form.submit() {
                    self.form = None;
                    self.mode = AppMode::Board;
                    self.apply_submission(submission);
                }
            }
            AppEvent::Tab | AppEvent::Down => form.focus_next(),
            AppEvent::BackTab | AppEvent::Up => form.focus_prev(),
            AppEvent::Left => form.left(),
            AppEvent::Right => form.right(),
            AppEvent::Backspace => form.backspace(),
            AppEvent::Delete => form.delete(),
            AppEvent::Character(c) => form.input_char(c),
            _ => {}
        }
    }

    fn apply_submission(&mut self, submission: FormSubmission) {
        match submission {
            FormSubmission::Create(draft) => {
                if let Some(task) = self.with_store(|store| store.create(draft)) {
                    self.status_message = Some(format!("Created \"{}\"", task.title));
                    self.select_task(&task.id);
                }
            }
            FormSubmission::Update(update) => match self.with_store(|store| store.update(update)) {
                Some(Some(task)) => {
                    self.status_message = Some(format!("Updated \"{}\"", task.title));
                    self.select_task(&task.id);
                }
                Some(None) => {
                    self.status_message = Some("Task no longer exists".to_string());
                }
                None => {}
            },
        }
    }

    fn handle_comments_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Escape => {
                self.comment_task = None;
                self.comment_input.set_focused(false);
                self.mode = AppMode::Board;
            }
            AppEvent::Enter => {
                if let Some(task_id) = self.comment_task.clone() {
                    let text = self.comment_input.value().to_string();
                    let added = self.with_store(|store| store.add_comment(&task_id, &text));
                    if matches!(added, Some(Some(_))) {
                        self.comment_input.clear();
                    }
                }
            }
            AppEvent::Backspace => self.comment_input.delete_char(),
            AppEvent::Delete => self.comment_input.delete_forward(),
            AppEvent::Left => self.comment_input.move_left(),
            AppEvent::Right => self.comment_input.move_right(),
            AppEvent::Character(c) => self.comment_input.insert_char(c),
            _ => {}
        }
    }

    fn handle_trash_event(&mut self, event: AppEvent) {
        let len = self.store.deleted().len();
        match event {
            AppEvent::Escape | AppEvent::Character('t') | AppEvent::Character('q') => {
                self.mode = AppMode::Board;
            }
            AppEvent::Down | AppEvent::Character('j') => {
                if len > 0 {
                    self.trash_selected = (self.trash_selected + 1) % len;
                }
            }
            AppEvent::Up | AppEvent::Character('k') => {
                if len > 0 {
                    self.trash_selected = (self.trash_selected + len - 1) % len;
                }
            }
            AppEvent::Enter | AppEvent::Character('r') => {
                if let Some(task) = self.selected_trash_task() {
                    let (id, title) = (task.id.clone(), task.title.clone());
                    if self.with_store(|store| store.restore(&id)) == Some(true) {
                        self.status_message = Some(format!("Restored \"{title}\""));
                    }
                    self.clamp_selection();
                }
            }
            AppEvent::Character('x') | AppEvent::Character('d') | AppEvent::Delete => {
                if let Some(task) = self.selected_trash_task() {
                    let (id, title) = (task.id.clone(), task.title.clone());
                    if self.with_store(|store| store.purge_one(&id)) == Some(true) {
                        self.status_message = Some(format!("Permanently deleted \"{title}\""));
                    }
                    self.clamp_selection();
                }
            }
            AppEvent::Character('E') => {
                if let Some(count) = self.with_store(|store| store.purge_all()) {
                    self.status_message = Some(format!("Emptied trash ({count} tasks)"));
                }
                self.clamp_selection();
            }
            _ => {}
        }
    }

    fn start_move(&mut self) {
        let index = self.selected[self.focused_column.column_index()];
        let Some(task) = self.selected_task() else {
            return;
        };
        let source = DropLocation {
            status: task.status,
            index,
        };
        self.moving = Some(MoveState {
            task_id: task.id.clone(),
            title: task.title.clone(),
            source,
            target: source,
        });
        self.mode = AppMode::Move;
    }

    /// Slots available in a column while `task_id` is being carried.
    fn drop_slots(&self, status: Status, task_id: &TaskId) -> usize {
        self.column_tasks(status)
            .iter()
            .filter(|t| &t.id != task_id)
            .count()
            + 1
    }

    fn handle_move_event(&mut self, event: AppEvent) {
        let Some(mut moving) = self.moving.take() else {
            self.mode = AppMode::Board;
            return;
        };

        match event {
            AppEvent::Escape => {
                let drag = DragResult {
                    task_id: moving.task_id,
                    source: moving.source,
                    destination: None,
                };
                self.with_store(|store| store.move_task(&drag));
                self.mode = AppMode::Board;
                return;
            }
            AppEvent::Enter => {
                let drag = DragResult {
                    task_id: moving.task_id.clone(),
                    source: moving.source,
                    destination: Some(moving.target),
                };
                if self.with_store(|store| store.move_task(&drag)) == Some(true) {
                    self.status_message = Some(format!(
                        "Moved \"{}\" to {}",
                        moving.title,
                        moving.target.status.title()
                    ));
                }
                self.select_task(&moving.task_id);
                self.mode = AppMode::Board;
                return;
            }
            AppEvent::Left | AppEvent::Character('h') => {
                moving.target.status = moving.target.status.cycle_prev();
            }
            AppEvent::Right | AppEvent::Character('l') => {
                moving.target.status = moving.target.status.cycle_next();
            }
            AppEvent::Up | AppEvent::Character('k') => {
                moving.target.index = moving.target.index.saturating_sub(1);
            }
            AppEvent::Down | AppEvent::Character('j') => {
                moving.target.index += 1;
            }
            _ => {}
        }

        let slots = self.drop_slots(moving.target.status, &moving.task_id);
        moving.target.index = moving.target.index.min(slots - 1);
        self.focused_column = moving.target.status;
        self.moving = Some(moving);
    }

    pub fn render(&self, frame: &mut Frame) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Min(0),    // Columns
                Constraint::Length(1), // Status bar
            ])
            .split(frame.area());

        let column_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(main_chunks[1]);

        let board = Board::from_tasks(self.store.active());
        self.render_header(frame, main_chunks[0], board.total());

        for column in &board.columns {
            self.render_column(
                frame,
                column_chunks[column.status.column_index()],
                column.status,
                &column.tasks,
            );
        }

        self.render_status_bar(frame, main_chunks[2]);

        match self.mode {
            AppMode::Form => {
                if let Some(form) = &self.form {
                    form.render(frame, Self::centered_rect(60, 80, frame.area()));
                }
            }
            AppMode::Comments => self.render_comments(frame),
            AppMode::Trash => self.render_trash(frame),
            AppMode::Help => self.render_help(frame),
            AppMode::Board | AppMode::Move => {}
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, total: usize) {
        let trash = self.store.deleted().len();
        let line = Line::from(vec![
            Span::styled(
                "Task Management",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ·  {total} tasks  ·  Trash: {trash}"),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_column(&self, frame: &mut Frame, area: Rect, status: Status, tasks: &[&Task]) {
        let is_focused = self.focused_column == status;
        let border_style = if is_focused {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Gray)
        };

        let block = Block::default()
            .title(format!(" {} ({}) ", status.title(), tasks.len()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style);

        let moving = self.moving.as_ref().filter(|_| self.mode == AppMode::Move);

        let mut items: Vec<ListItem> = tasks
            .iter()
            .filter(|t| moving.map_or(true, |m| m.task_id != t.id))
            .map(|t| self.task_item(t))
            .collect();

        if let Some(m) = moving.filter(|m| m.target.status == status) {
            let marker = ListItem::new(Line::from(Span::styled(
                format!("▶ {}", m.title),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )));
            let at = m.target.index.min(items.len());
            items.insert(at, marker);
        }

        if items.is_empty() {
            let paragraph = Paragraph::new("No tasks")
                .block(block)
                .style(
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                )
                .alignment(Alignment::Center);
            frame.render_widget(paragraph, area);
            return;
        }

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::DarkGray));

        let selected = (is_focused && self.mode == AppMode::Board)
            .then(|| self.selected[status.column_index()]);
        let mut state = ListState::default().with_selected(selected);
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn task_item(&self, task: &Task) -> ListItem<'static> {
        let is_pending = self
            .pending
            .as_ref()
            .is_some_and(|p| p.task_id == task.id);

        let mut lines = vec![Line::from(vec![
            Span::styled(
                format!("[{}] ", task.priority.label()),
                Style::default().fg(priority_color(task.priority)),
            ),
            Span::styled(
                task.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ])];

        if let Some(first_line) = task.description.lines().next() {
            if !first_line.trim().is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("  {first_line}"),
                    Style::default().fg(Color::Gray),
                )));
            }
        }

        let mut meta = Vec::new();
        if let (Some(text), Some(urgency)) = (task.deadline_display(), task.deadline_urgency()) {
            meta.push(Span::styled(
                format!("  {text}"),
                Style::default().fg(urgency_color(urgency)),
            ));
        }
        if !task.comments.is_empty() {
            meta.push(Span::styled(
                format!("  {} comments", task.comments.len()),
                Style::default().fg(Color::DarkGray),
            ));
        }
        if is_pending {
            meta.push(Span::styled(
                "  moving...",
                Style::default().fg(Color::Cyan),
            ));
        }
        if !meta.is_empty() {
            lines.push(Line::from(meta));
        }

        let mut item = ListItem::new(Text::from(lines));
        if is_pending {
            item = item.style(Style::default().add_modifier(Modifier::DIM));
        }
        item
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let paragraph = if let Some(error) = &self.error_message {
            Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red))
        } else if let Some(message) = &self.status_message {
            Paragraph::new(message.as_str()).style(Style::default().fg(Color::Green))
        } else {
            Paragraph::new(self.hints()).style(Style::default().fg(Color::DarkGray))
        };
        frame.render_widget(paragraph, area);
    }

    fn hints(&self) -> String {
        match self.mode {
            AppMode::Board => {
                let advance = self
                    .selected_task()
                    .map_or("Start", |t| t.status.advance_label());
                format!(
                    "h/l: column | j/k: select | n: new | e: edit | s: {advance} | b: back | c: comments | m: move | d: delete | t: trash | ?: help | q: quit"
                )
            }
            AppMode::Move => "h/l: column | j/k: position | Enter: drop | Esc: cancel".to_string(),
            AppMode::Form => "Tab: next field | Enter: save | Esc: cancel".to_string(),
            AppMode::Comments => "Enter: add comment | Esc: close".to_string(),
            AppMode::Trash => {
                "j/k: select | r: restore | x: delete forever | E: empty trash | Esc: close"
                    .to_string()
            }
            AppMode::Help => "Press any key to close this help".to_string(),
        }
    }

    fn render_comments(&self, frame: &mut Frame) {
        let popup_area = Self::centered_rect(60, 70, frame.area());
        frame.render_widget(Clear, popup_area);

        let task = self
            .comment_task
            .as_ref()
            .and_then(|id| self.store.get(id));
        let title = task.map_or_else(
            || "Comments".to_string(),
            |t| format!("Comments - {}", t.title),
        );

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),    // Comment list
                Constraint::Length(3), // Input
            ])
            .split(inner);

        let comments = task.map(|t| t.comments.as_slice()).unwrap_or_default();
        let lines: Vec<Line> = if comments.is_empty() {
            vec![Line::from(Span::styled(
                "No comments yet",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ))]
        } else {
            comments
                .iter()
                .flat_map(|comment| {
                    [
                        Line::from(vec![
                            Span::styled(
                                comment.author.clone(),
                                Style::default().add_modifier(Modifier::BOLD),
                            ),
                            Span::raw(" • "),
                            Span::styled(
                                format!(
                                    "{} ({})",
                                    comment.created_display(),
                                    comment.time_since_created()
                                ),
                                Style::default().fg(Color::Gray),
                            ),
                        ]),
                        Line::from(comment.text.clone()),
                        Line::default(),
                    ]
                })
                .collect()
        };

        // Keep the newest comments in view.
        let overflow = lines.len().saturating_sub(chunks[0].height as usize);
        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((overflow as u16, 0));
        frame.render_widget(paragraph, chunks[0]);

        self.comment_input.render(frame, chunks[1], "New comment");
    }

    fn render_trash(&self, frame: &mut Frame) {
        let popup_area = Self::centered_rect(60, 80, frame.area());
        frame.render_widget(Clear, popup_area);

        let deleted = self.store.deleted();
        let block = Block::default()
            .title(format!("Deleted Tasks ({})", deleted.len()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Red));

        if deleted.is_empty() {
            let paragraph = Paragraph::new("No deleted tasks")
                .block(block)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center);
            frame.render_widget(paragraph, popup_area);
            return;
        }

        let items: Vec<ListItem> = deleted
            .iter()
            .map(|task| {
                let mut lines = vec![Line::from(vec![
                    Span::styled(
                        format!("[{}] ", task.priority.label()),
                        Style::default().fg(priority_color(task.priority)),
                    ),
                    Span::raw(task.title.clone()),
                ])];
                if !task.description.trim().is_empty() {
                    lines.push(Line::from(Span::styled(
                        format!("  {}", task.description.lines().next().unwrap_or_default()),
                        Style::default().fg(Color::Gray),
                    )));
                }
                lines.push(Line::from(Span::styled(
                    format!("  {}", task.status),
                    Style::default().fg(Color::DarkGray),
                )));
                ListItem::new(Text::from(lines))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::DarkGray));
        let mut state = ListState::default().with_selected(Some(self.trash_selected));
        frame.render_stateful_widget(list, popup_area, &mut state);
    }

    fn render_help(&self, frame: &mut Frame) {
        let popup_area = Self::centered_rect(60, 70, frame.area());

        frame.render_widget(Clear, popup_area);

        let help_text = [
            "Task Board Help",
            "",
            "Board:",
            "  h/l or ←/→     - Switch column",
            "  j/k or ↑/↓     - Select task",
            "  n              - New task",
            "  e or Enter     - Edit task",
            "  s              - Start / Complete / Reopen",
            "  b              - Back to To Do",
            "  c              - Comments",
            "  d              - Move task to trash",
            "",
            "Moving tasks:",
            "  m              - Pick up task",
            "  h/l, j/k       - Choose column and position",
            "  Enter / Esc    - Drop / cancel",
            "",
            "Trash:",
            "  t              - Open trash",
            "  r              - Restore task",
            "  x              - Delete permanently",
            "  E              - Empty trash",
            "",
            "General:",
            "  ?              - Show this help",
            "  q              - Quit",
            "  Ctrl+C         - Force quit application",
            "",
            "Press any key to close this help",
        ]
        .join("\n");

        let paragraph = Paragraph::new(help_text)
            .block(Block::default().title("Help").borders(Borders::ALL))
            .wrap(Wrap { trim: false });

        frame.render_widget(paragraph, popup_area);
    }

    fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
        let popup_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(r);

        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(popup_layout[1])[1]
    }
}

fn urgency_color(urgency: DeadlineUrgency) -> Color {
    match urgency {
        DeadlineUrgency::Overdue => Color::Red,
        DeadlineUrgency::DueToday => Color::Rgb(255, 140, 0),
        DeadlineUrgency::DueSoon => Color::Yellow,
        DeadlineUrgency::Later => Color::DarkGray,
    }
}

pub async fn run_tui(mut app: App) -> Result<()> {
    // Set up terminal
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut event_handler = EventHandler::new();

    // Main loop
    let result = loop {
        if let Err(e) = terminal.draw(|frame| app.render(frame)) {
            break Err(e.into());
        }

        match event_handler.next_event().await {
            Ok(event) => {
                if app.handle_event(event) {
                    break Ok(());
                }
            }
            Err(e) => break Err(e),
        }

        app.tick(Instant::now());

        if event_handler.should_quit() {
            break Ok(());
        }
    };

    // Cleanup
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::observability::TracingObserver;
    use crate::adapters::storage::MemoryKeyValueStore;
    use crate::domain::{Priority, TaskDraft};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn app_with_delay(delay: Duration) -> App {
        let store = TaskStore::open(
            Arc::new(MemoryKeyValueStore::new()),
            Arc::new(TracingObserver),
        )
        .unwrap();
        App::new(store, delay)
    }

    fn app() -> App {
        app_with_delay(Duration::ZERO)
    }

    fn press(app: &mut App, keys: &str) {
        for c in keys.chars() {
            app.handle_event(AppEvent::Character(c));
        }
    }

    fn add(app: &mut App, title: &str, priority: Priority) -> TaskId {
        app.store
            .create(TaskDraft::new(title).with_priority(priority))
            .unwrap()
            .id
    }

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn create_task_through_form() {
        let mut app = app();

        press(&mut app, "n");
        assert_eq!(app.mode, AppMode::Form);
        press(&mut app, "Test Task");
        app.handle_event(AppEvent::Enter);

        assert_eq!(app.mode, AppMode::Board);
        assert_eq!(app.store.active().len(), 1);
        assert_eq!(app.store.active()[0].title, "Test Task");
        assert_eq!(app.store.active()[0].status, Status::Todo);
        assert_eq!(app.selected_task().unwrap().title, "Test Task");
    }

    #[test]
    fn empty_title_keeps_form_open() {
        let mut app = app();

        press(&mut app, "n");
        app.handle_event(AppEvent::Enter);

        assert_eq!(app.mode, AppMode::Form);
        assert!(app.store.active().is_empty());
        assert!(screen(&app).contains("Title is required"));

        app.handle_event(AppEvent::Escape);
        assert_eq!(app.mode, AppMode::Board);
    }

    #[test]
    fn edit_keeps_comments() {
        let mut app = app();
        let id = add(&mut app, "Draft", Priority::Low);
        app.store.add_comment(&id, "note").unwrap();

        press(&mut app, "e");
        press(&mut app, "!");
        app.handle_event(AppEvent::Enter);

        let task = app.store.get(&id).unwrap();
        assert_eq!(task.title, "Draft!");
        assert_eq!(task.comments.len(), 1);
    }

    #[test]
    fn delete_and_restore_via_trash() {
        let mut app = app();
        let id = add(&mut app, "Doomed", Priority::Medium);

        press(&mut app, "d");
        assert!(app.store.active().is_empty());
        assert_eq!(app.store.deleted().len(), 1);

        press(&mut app, "t");
        assert_eq!(app.mode, AppMode::Trash);
        press(&mut app, "r");

        assert!(app.store.get(&id).is_some());
        assert!(app.store.deleted().is_empty());
    }

    #[test]
    fn purge_and_empty_trash() {
        let mut app = app();
        add(&mut app, "a", Priority::Medium);
        add(&mut app, "b", Priority::Medium);
        add(&mut app, "c", Priority::Medium);
        press(&mut app, "ddd");
        assert_eq!(app.store.deleted().len(), 3);

        press(&mut app, "tx");
        assert_eq!(app.store.deleted().len(), 2);

        press(&mut app, "E");
        assert!(app.store.deleted().is_empty());
        assert!(screen(&app).contains("No deleted tasks"));
    }

    #[test]
    fn status_change_applies_immediately_without_delay() {
        let mut app = app();
        let id = add(&mut app, "Work", Priority::High);

        press(&mut app, "s");
        assert_eq!(app.store.get(&id).unwrap().status, Status::InProgress);

        app.focused_column = Status::InProgress;
        press(&mut app, "b");
        assert_eq!(app.store.get(&id).unwrap().status, Status::Todo);
    }

    #[test]
    fn status_change_waits_for_delay() {
        let mut app = app_with_delay(Duration::from_millis(300));
        let id = add(&mut app, "Work", Priority::High);

        press(&mut app, "s");
        assert!(app.pending.is_some());
        assert_eq!(app.store.get(&id).unwrap().status, Status::Todo);

        // A second press while one is in flight is ignored.
        press(&mut app, "s");
        app.tick(Instant::now());
        assert_eq!(app.store.get(&id).unwrap().status, Status::Todo);

        app.tick(Instant::now() + Duration::from_secs(1));
        assert!(app.pending.is_none());
        assert_eq!(app.store.get(&id).unwrap().status, Status::InProgress);
    }

    #[test]
    fn keyboard_drag_moves_between_columns() {
        let mut app = app();
        let id = add(&mut app, "Carry me", Priority::Low);

        press(&mut app, "ml");
        assert_eq!(app.mode, AppMode::Move);
        assert!(screen(&app).contains("▶ Carry me"));
        press(&mut app, "l");
        app.handle_event(AppEvent::Enter);

        assert_eq!(app.mode, AppMode::Board);
        assert_eq!(app.store.get(&id).unwrap().status, Status::Completed);
        assert_eq!(app.focused_column, Status::Completed);
    }

    #[test]
    fn cancelled_drag_changes_nothing() {
        let mut app = app();
        let id = add(&mut app, "Stay", Priority::Low);

        press(&mut app, "ml");
        app.handle_event(AppEvent::Escape);

        assert_eq!(app.mode, AppMode::Board);
        assert_eq!(app.store.get(&id).unwrap().status, Status::Todo);
    }

    #[test]
    fn comments_overlay_adds_and_ignores_blank() {
        let mut app = app();
        let id = add(&mut app, "Discuss", Priority::Medium);

        press(&mut app, "c");
        assert_eq!(app.mode, AppMode::Comments);
        app.handle_event(AppEvent::Enter);
        press(&mut app, "   ");
        app.handle_event(AppEvent::Enter);
        assert!(app.store.get(&id).unwrap().comments.is_empty());

        press(&mut app, "looks good");
        app.handle_event(AppEvent::Enter);

        let comments = &app.store.get(&id).unwrap().comments;
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].text, "looks good");
        assert!(screen(&app).contains("Current User"));
    }

    #[test]
    fn board_renders_three_columns_with_counts() {
        let mut app = app();
        add(&mut app, "First", Priority::High);
        let second = add(&mut app, "Second", Priority::Low);
        app.store.change_status(&second, Status::Completed).unwrap();

        let text = screen(&app);

        assert!(text.contains("To Do (1)"));
        assert!(text.contains("In Progress (0)"));
        assert!(text.contains("Completed (1)"));
        assert!(text.contains("[High] First"));
        assert!(text.contains("No tasks"));
    }

    #[test]
    fn quit_keys() {
        let mut app = app();
        assert!(app.handle_event(AppEvent::Quit));
        assert!(app.handle_event(AppEvent::Character('q')));

        press(&mut app, "n");
        assert!(!app.handle_event(AppEvent::Character('q')));
    }
}
