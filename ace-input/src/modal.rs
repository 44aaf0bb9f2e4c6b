//! Modal state machine for keyboard input

use crate::commands::Command;
use ace_analysis::CopyLabel;
use ace_library::QualityStep;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Divider movement per arrow key press
const DIVIDER_STEP: f32 = 0.05;

/// Input modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    /// Typing settings for the focused copy
    Command,
}

/// Handles keyboard input and converts to commands
pub struct InputHandler {
    mode: Mode,
    command_buffer: String,
    /// Copy that settings edits apply to
    focused: CopyLabel,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            mode: Mode::Normal,
            command_buffer: String::new(),
            focused: CopyLabel::A,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn focused(&self) -> CopyLabel {
        self.focused
    }

    /// Get current command buffer (for display)
    pub fn command_buffer(&self) -> &str {
        &self.command_buffer
    }

    /// Handle a key event and return a command if applicable
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        // Ctrl+C always quits
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Command::Quit);
        }
        match self.mode {
            Mode::Normal => self.handle_normal_mode(key),
            Mode::Command => self.handle_command_mode(key),
        }
    }

    fn handle_normal_mode(&mut self, key: KeyEvent) -> Option<Command> {
        let focused = self.focused;
        match key.code {
            KeyCode::Char(':') => {
                self.mode = Mode::Command;
                self.command_buffer.clear();
                Some(Command::EnterCommandMode)
            }

            // Playback
            KeyCode::Char(' ') => Some(Command::TogglePlayback),
            KeyCode::Tab => Some(Command::SwitchChannel),
            KeyCode::Char('s') => Some(Command::Stop),

            // Focus and settings
            KeyCode::Char('1') => {
                self.focused = CopyLabel::A;
                Some(Command::Focus(CopyLabel::A))
            }
            KeyCode::Char('2') => {
                self.focused = CopyLabel::B;
                Some(Command::Focus(CopyLabel::B))
            }
            KeyCode::Char('[') => Some(Command::Adjust(focused, QualityStep::Lower)),
            KeyCode::Char(']') => Some(Command::Adjust(focused, QualityStep::Raise)),
            KeyCode::Char('c') => Some(Command::Cycle(focused, QualityStep::Lower)),
            KeyCode::Char('C') => Some(Command::Cycle(focused, QualityStep::Raise)),

            // Split view
            KeyCode::Char('+') | KeyCode::Char('=') => Some(Command::ZoomIn),
            KeyCode::Char('-') => Some(Command::ZoomOut),
            KeyCode::Left | KeyCode::Char('h') => Some(Command::MoveDivider(-DIVIDER_STEP)),
            KeyCode::Right | KeyCode::Char('l') => Some(Command::MoveDivider(DIVIDER_STEP)),
            KeyCode::Char('r') => Some(Command::ResetView),

            KeyCode::Char('w') => Some(Command::Snapshot),
            KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
            _ => None,
        }
    }

    fn handle_command_mode(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Enter => {
                self.mode = Mode::Normal;
                let buffer = std::mem::take(&mut self.command_buffer);
                let buffer = buffer.trim();
                if buffer.is_empty() {
                    Some(Command::EnterNormalMode)
                } else {
                    Some(Command::Configure(self.focused, buffer.to_string()))
                }
            }
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.command_buffer.clear();
                Some(Command::EnterNormalMode)
            }
            KeyCode::Backspace => {
                self.command_buffer.pop();
                if self.command_buffer.is_empty() {
                    self.mode = Mode::Normal;
                    Some(Command::EnterNormalMode)
                } else {
                    None
                }
            }
            KeyCode::Char(c) => {
                self.command_buffer.push(c);
                None
            }
            _ => None,
        }
    }
}
