//! Drivers for a real terminal: crossterm input and a ratatui terminal on
//! stdout.

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::{Frame, Terminal};
use tracing::warn;

use super::keyboard::KeyboardNormalizer;
use super::{InputDriver, OutputDriver};

/// Reads crossterm events. `poll` may pull one event early; it is parked
/// until the next `read`.
#[derive(Default)]
pub struct ConsoleInputDriver {
    normalizer: KeyboardNormalizer,
    parked: Option<Event>,
}

impl ConsoleInputDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_normalized(&mut self) -> io::Result<Event> {
        loop {
            if let Some(evt) = self.normalizer.normalize(event::read()?) {
                return Ok(evt);
            }
        }
    }
}

impl InputDriver for ConsoleInputDriver {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        if self.parked.is_some() {
            return Ok(true);
        }
        if !event::poll(timeout)? {
            return Ok(false);
        }
        // A release-only burst normalizes to nothing; report it as idle.
        self.parked = self.normalizer.normalize(event::read()?);
        Ok(self.parked.is_some())
    }

    fn read(&mut self) -> io::Result<Event> {
        match self.parked.take() {
            Some(evt) => Ok(evt),
            None => self.read_normalized(),
        }
    }

    fn set_mouse_capture(&mut self, enabled: bool) -> io::Result<()> {
        let mut stdout = io::stdout();
        if enabled {
            execute!(stdout, EnableMouseCapture)
        } else {
            execute!(stdout, DisableMouseCapture)
        }
    }
}

/// Owns raw mode and the alternate screen between `enter` and `exit`, and
/// restores the terminal when dropped.
pub struct ConsoleOutputDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl ConsoleOutputDriver {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            terminal: Terminal::new(CrosstermBackend::new(io::stdout()))?,
            active: false,
        })
    }
}

impl OutputDriver for ConsoleOutputDriver {
    fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        terminal::enable_raw_mode()?;
        execute!(self.terminal.backend_mut(), EnterAlternateScreen, Hide)?;
        self.active = true;
        self.terminal.clear()
    }

    fn exit(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        execute!(
            self.terminal.backend_mut(),
            DisableMouseCapture,
            LeaveAlternateScreen,
            Show
        )?;
        terminal::disable_raw_mode()
    }

    fn draw<F>(&mut self, f: F) -> io::Result<()>
    where
        F: FnOnce(&mut Frame<'_>),
    {
        self.terminal
            .draw(f)
            .map(drop)
            .map_err(|err| io::Error::other(err.to_string()))
    }
}

impl Drop for ConsoleOutputDriver {
    fn drop(&mut self) {
        if let Err(err) = self.exit() {
            warn!("terminal not restored: {err}");
        }
    }
}
