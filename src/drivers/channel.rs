use std::collections::VecDeque;
use std::io;
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use super::InputDriver;
use crate::event_loop::SwitcherEvent;

/// Driver over the channel the transport thread writes into.
pub struct ChannelDriver {
    rx: Receiver<SwitcherEvent>,
    event_queue: VecDeque<SwitcherEvent>,
}

impl ChannelDriver {
    pub fn new(rx: Receiver<SwitcherEvent>) -> Self {
        Self {
            rx,
            event_queue: VecDeque::new(),
        }
    }

    /// Moves whatever is already waiting into the queue without blocking.
    pub(crate) fn drain_ready(&mut self) -> io::Result<bool> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.event_queue.push_back(event),
                Err(TryRecvError::Empty) => return Ok(!self.event_queue.is_empty()),
                Err(TryRecvError::Disconnected) => {
                    if self.event_queue.is_empty() {
                        return Err(disconnected());
                    }
                    return Ok(true);
                }
            }
        }
    }

    pub(crate) fn push(&mut self, event: SwitcherEvent) {
        self.event_queue.push_back(event);
    }
}

fn disconnected() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "event channel closed")
}

impl InputDriver for ChannelDriver {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        if !self.event_queue.is_empty() {
            return Ok(true);
        }
        match self.rx.recv_timeout(timeout) {
            Ok(event) => {
                self.event_queue.push_back(event);
                Ok(true)
            }
            Err(RecvTimeoutError::Timeout) => Ok(false),
            Err(RecvTimeoutError::Disconnected) => Err(disconnected()),
        }
    }

    fn read(&mut self) -> io::Result<SwitcherEvent> {
        if let Some(event) = self.event_queue.pop_front() {
            return Ok(event);
        }
        self.rx.recv().map_err(|_| disconnected())
    }
}
