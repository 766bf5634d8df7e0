use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Quit,

    // Navigation
    Up,
    Down,
    Left,
    Right,
    Tab,
    BackTab,

    // Input handling
    Character(char),
    Backspace,
    Delete,
    Enter,
    Escape,

    // Other
    Tick,
}

pub struct EventHandler {
    should_quit: bool,
    poll_interval: Duration,
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            poll_interval: Duration::from_millis(50),
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub async fn next_event(&mut self) -> Result<AppEvent> {
        if event::poll(self.poll_interval)? {
            match event::read()? {
                Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                    Ok(self.handle_key_event(key_event))
                }
                _ => Ok(AppEvent::Tick),
            }
        } else {
            Ok(AppEvent::Tick)
        }
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) -> AppEvent {
        let event = map_key(key_event);
        if event == AppEvent::Quit {
            self.should_quit = true;
        }
        event
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Translate a key press. Letters are passed through as characters; the
/// app decides per mode whether they are commands or text.
pub fn map_key(key_event: KeyEvent) -> AppEvent {
    match key_event {
        // Global quit with Ctrl+C
        KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            ..
        } => AppEvent::Quit,

        KeyEvent {
            code: KeyCode::Up, ..
        } => AppEvent::Up,
        KeyEvent {
            code: KeyCode::Down,
            ..
        } => AppEvent::Down,
        KeyEvent {
            code: KeyCode::Left,
            ..
        } => AppEvent::Left,
        KeyEvent {
            code: KeyCode::Right,
            ..
        } => AppEvent::Right,

        KeyEvent {
            code: KeyCode::Tab, ..
        } => AppEvent::Tab,
        KeyEvent {
            code: KeyCode::BackTab,
            ..
        } => AppEvent::BackTab,

        KeyEvent {
            code: KeyCode::Enter,
            ..
        } => AppEvent::Enter,
        KeyEvent {
            code: KeyCode::Esc, ..
        } => AppEvent::Escape,
        KeyEvent {
            code: KeyCode::Backspace,
            ..
        } => AppEvent::Backspace,
        KeyEvent {
            code: KeyCode::Delete,
            ..
        } => AppEvent::Delete,

        KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::NONE | KeyModifiers::SHIFT,
            ..
        } => AppEvent::Character(c),

        _ => AppEvent::Tick,
    }
}
