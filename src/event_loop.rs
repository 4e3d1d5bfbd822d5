use std::io;
use std::sync::mpsc::Sender;
use std::time::Duration;

use crossterm::event::KeyEvent;

use crate::drivers::InputDriver;

pub enum ControlFlow {
    Continue,
    Quit,
}

/// Everything the switcher reacts to, funnelled into one thread.
#[derive(Debug)]
pub enum SwitcherEvent {
    /// A command from the transport; the response goes back on `reply`.
    Request {
        argv: Vec<String>,
        reply: Sender<String>,
    },
    /// Keyboard input seen by the overlay surface.
    Key(KeyEvent),
    /// Overlay surface changed size.
    Resize,
    /// Stop the loop.
    Shutdown,
}

/// A centralized event loop that owns the switcher thread.
///
/// The transport and the terminal reader feed events through the driver;
/// the loop is the only place that waits on them, so every state
/// transition happens on this thread in arrival order.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
        }
    }

    /// Runs the loop, taking control of the current thread.
    ///
    /// The `handler` is called with:
    /// - `Some(event)` when an event arrives.
    /// - `None` once per pass, before waiting, so timers get serviced even
    ///   when nothing else happens.
    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut D, Option<SwitcherEvent>) -> io::Result<ControlFlow>,
    {
        loop {
            if let ControlFlow::Quit = handler(&mut self.driver, None)? {
                break;
            }

            if self.driver.poll(self.poll_interval)? {
                // Drain bursts (a held Tab key) before the next timer pass.
                loop {
                    let event = self.driver.read()?;
                    if let ControlFlow::Quit = handler(&mut self.driver, Some(event))? {
                        return Ok(());
                    }
                    if !self.driver.poll(Duration::from_millis(0))? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::ChannelDriver;
    use std::sync::mpsc;

    #[test]
    fn idle_ticks_then_events_then_quit() {
        let (tx, rx) = mpsc::channel();
        let mut event_loop = EventLoop::new(ChannelDriver::new(rx), Duration::from_millis(1));
        let (reply, replies) = mpsc::channel();
        tx.send(SwitcherEvent::Request {
            argv: vec!["next".into()],
            reply,
        })
        .unwrap();
        tx.send(SwitcherEvent::Shutdown).unwrap();

        let mut idle = 0;
        event_loop
            .run(|_, event| match event {
                None => {
                    idle += 1;
                    Ok(ControlFlow::Continue)
                }
                Some(SwitcherEvent::Request { argv, reply }) => {
                    let _ = reply.send(argv.join(" "));
                    Ok(ControlFlow::Continue)
                }
                Some(SwitcherEvent::Shutdown) => Ok(ControlFlow::Quit),
                Some(_) => Ok(ControlFlow::Continue),
            })
            .unwrap();
        assert!(idle >= 1);
        assert_eq!(replies.recv().unwrap(), "next");
    }
}
