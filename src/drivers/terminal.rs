use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};

use super::{ChannelDriver, InputDriver};
use crate::event_loop::SwitcherEvent;

/// Slice used to alternate between the terminal and the transport channel.
const SLICE: Duration = Duration::from_millis(5);

/// Merges terminal keyboard input with transport requests.
pub struct TerminalInputDriver {
    channel: ChannelDriver,
}

impl TerminalInputDriver {
    pub fn new(channel: ChannelDriver) -> Self {
        Self { channel }
    }

    fn pump_terminal(&mut self, timeout: Duration) -> io::Result<()> {
        if !event::poll(timeout)? {
            return Ok(());
        }
        match event::read()? {
            // Key repeat is noise for the switcher; presses and releases
            // both matter.
            Event::Key(key) if key.kind != KeyEventKind::Repeat => {
                self.channel.push(SwitcherEvent::Key(key))
            }
            Event::Resize(_, _) => self.channel.push(SwitcherEvent::Resize),
            _ => {}
        }
        Ok(())
    }
}

impl InputDriver for TerminalInputDriver {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.channel.drain_ready()? {
                return Ok(true);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            self.pump_terminal(remaining.min(SLICE))?;
            if self.channel.drain_ready()? {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
        }
    }

    fn read(&mut self) -> io::Result<SwitcherEvent> {
        self.channel.read()
    }
}
