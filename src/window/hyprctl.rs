use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::WmQuery;
use crate::error::{Result, SwitcherError};

const WAIT_STEP: Duration = Duration::from_millis(5);

/// [`WmQuery`] backed by the `hyprctl` command line tool.
pub struct Hyprctl {
    program: String,
    base_args: Vec<String>,
    timeout: Duration,
}

impl Hyprctl {
    /// `command` is a shell-words string such as `hyprctl` or
    /// `hyprctl --instance 0`.
    pub fn new(command: &str, timeout: Duration) -> Result<Self> {
        let mut words = shell_words::split(command)
            .map_err(|err| SwitcherError::InvalidCommand(format!("{command}: {err}")))?;
        if words.is_empty() {
            return Err(SwitcherError::InvalidCommand(
                "empty window manager command".into(),
            ));
        }
        let program = words.remove(0);
        Ok(Self {
            program,
            base_args: words,
            timeout,
        })
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.base_args).args(args);
        cmd
    }

    fn describe(&self, args: &[&str]) -> String {
        shell_words::join(
            std::iter::once(self.program.as_str())
                .chain(self.base_args.iter().map(String::as_str))
                .chain(args.iter().copied()),
        )
    }

    /// Runs the tool to completion, bounded by the configured timeout.
    fn query(&self, args: &[&str]) -> Result<String> {
        let described = self.describe(args);
        let mut child = self
            .command(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // A full pipe would stall the child until the deadline.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = match wait_bounded(&mut child, self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                return Err(SwitcherError::Timeout {
                    command: described,
                    timeout: self.timeout,
                });
            }
            Err(err) => return Err(err.into()),
        };

        let stdout = stdout.map(join_drain).unwrap_or_default();
        let stderr = stderr.map(join_drain).unwrap_or_default();
        if !status.success() {
            return Err(SwitcherError::Process {
                command: described,
                status: status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(stdout)
    }
}

/// The parts of a child process the bounded wait needs.
trait Reapable {
    fn try_wait(&mut self) -> io::Result<Option<ExitStatus>>;
    fn kill(&mut self) -> io::Result<()>;
    fn wait(&mut self) -> io::Result<ExitStatus>;
}

impl Reapable for Child {
    fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        Child::try_wait(self)
    }

    fn kill(&mut self) -> io::Result<()> {
        Child::kill(self)
    }

    fn wait(&mut self) -> io::Result<ExitStatus> {
        Child::wait(self)
    }
}

/// Waits up to `timeout` for `child` to exit. `Ok(None)` means it timed out.
/// On timeout or a failed status check the child is killed and reaped.
fn wait_bounded<C: Reapable>(child: &mut C, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) if Instant::now() < deadline => thread::sleep(WAIT_STEP),
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Ok(None);
            }
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(err);
            }
        }
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn join_drain(handle: thread::JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}

/// Reaps a fire-and-forget child without blocking the caller.
fn reap(mut child: Child, described: String) {
    thread::spawn(move || match child.wait() {
        Ok(status) if status.success() => debug!("{described}: ok"),
        Ok(status) => warn!("{described}: exited with {status}"),
        Err(err) => warn!("{described}: {err}"),
    });
}

impl WmQuery for Hyprctl {
    fn clients_json(&mut self) -> Result<String> {
        self.query(&["-j", "clients"])
    }

    fn active_window_json(&mut self) -> Result<String> {
        self.query(&["-j", "activewindow"])
    }

    fn monitors_json(&mut self) -> Result<String> {
        self.query(&["-j", "monitors"])
    }

    fn focus_window(&mut self, address: &str) -> Result<()> {
        let target = format!("address:{address}");
        let args = ["dispatch", "focuswindow", target.as_str()];
        let described = self.describe(&args);
        let child = self
            .command(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        reap(child, described);
        Ok(())
    }
}
