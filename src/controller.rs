use std::time::Duration;

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use tracing::trace;

use crate::domain::{DashConfig, DashError, Message};
use crate::model::Model;
use crate::pipeline::Field;

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &DashConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_ms,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, DashError> {
        if event::poll(Duration::from_millis(self.event_poll_time))?
            && let Event::Key(key) = event::read()?
            && key.kind == event::KeyEventKind::Press
        {
            // while the query editor is open, keys go there unmapped
            if model.raw_keyevents() {
                return Ok(Some(Message::RawKey(key)));
            }
            return Ok(self.handle_key(key));
        }
        Ok(None)
    }

    fn handle_key(&self, key: KeyEvent) -> Option<Message> {
        let message = if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => Some(Message::Quit),
                _ => None,
            }
        } else {
            match key.code {
                KeyCode::Char('q') => Some(Message::Quit),
                KeyCode::Char('?') => Some(Message::Help),
                KeyCode::Esc => Some(Message::Exit),
                KeyCode::Up | KeyCode::Char('k') => Some(Message::MoveUp),
                KeyCode::Down | KeyCode::Char('j') => Some(Message::MoveDown),
                KeyCode::Left | KeyCode::Char('h') => Some(Message::MoveLeft),
                KeyCode::Right | KeyCode::Char('l') => Some(Message::MoveRight),
                KeyCode::Char('n') | KeyCode::PageDown => Some(Message::NextPage),
                KeyCode::Char('p') | KeyCode::PageUp => Some(Message::PrevPage),
                KeyCode::Char('g') | KeyCode::Home => Some(Message::FirstPage),
                KeyCode::Char('G') | KeyCode::End => Some(Message::LastPage),
                KeyCode::Char('+') => Some(Message::GrowPageSize),
                KeyCode::Char('-') => Some(Message::ShrinkPageSize),
                KeyCode::Char('s') | KeyCode::Enter => Some(Message::SortSelected),
                KeyCode::Char('/') => Some(Message::Search),
                KeyCode::Char('y') => Some(Message::CopyCell),
                KeyCode::Char('Y') => Some(Message::CopyRow),
                KeyCode::Char(c @ '1'..='6') => {
                    let idx = c as usize - '1' as usize;
                    Some(Message::SortBy(Field::ALL[idx]))
                }
                _ => None,
            }
        };
        trace!("mapped {key:?} => {message:?}");
        message
    }
}
