pub mod channel;
pub mod terminal;

pub use channel::ChannelDriver;
pub use terminal::TerminalInputDriver;

use std::io;
use std::time::Duration;

use crate::event_loop::SwitcherEvent;

pub trait InputDriver {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool>;
    fn read(&mut self) -> io::Result<SwitcherEvent>;
}

impl<T: InputDriver + ?Sized> InputDriver for &mut T {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        (**self).poll(timeout)
    }

    fn read(&mut self) -> io::Result<SwitcherEvent> {
        (**self).read()
    }
}
