//! Unix-socket transport for switcher requests.
//!
//! Frames are a little-endian `u32` length followed by the payload. A
//! request payload is its argv with every argument NUL-terminated; the
//! response payload is the UTF-8 reply string.

use std::fs;
use std::io::{Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::error::{Result, SwitcherError};
use crate::event_loop::SwitcherEvent;

const MAX_FRAME: usize = 64 * 1024;
const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

/// Socket location: explicit override, then the runtime dir, then `/tmp`.
pub fn socket_path(configured: Option<&Path>) -> PathBuf {
    if let Some(path) = configured {
        return path.to_path_buf();
    }
    if let Some(dir) = dirs::runtime_dir() {
        return dir.join("hypr-switcher.sock");
    }
    // SAFETY: getuid has no preconditions and cannot fail.
    let uid = unsafe { libc::getuid() };
    PathBuf::from(format!("/tmp/hypr-switcher-{uid}.sock"))
}

pub fn encode_argv<S: AsRef<str>>(argv: &[S]) -> Vec<u8> {
    argv.iter()
        .flat_map(|arg| [arg.as_ref().as_bytes(), &[0]].concat())
        .collect()
}

pub fn decode_argv(payload: &[u8]) -> Vec<String> {
    payload
        .split(|c| *c == 0)
        .filter(|s| !s.is_empty())
        .map(|s| String::from_utf8_lossy(s).to_string())
        .collect()
}

fn write_frame(stream: &mut UnixStream, payload: &[u8]) -> Result<()> {
    let size: u32 = payload
        .len()
        .try_into()
        .map_err(|_| SwitcherError::Transport("frame too large".into()))?;
    stream.write_all(&size.to_le_bytes())?;
    stream.write_all(payload)?;
    stream.flush()?;
    Ok(())
}

fn read_frame(stream: &mut UnixStream) -> Result<Vec<u8>> {
    let mut header = [0u8; 4];
    stream.read_exact(&mut header)?;
    let size = u32::from_le_bytes(header) as usize;
    if size > MAX_FRAME {
        return Err(SwitcherError::Transport(format!(
            "frame of {size} bytes exceeds {MAX_FRAME}"
        )));
    }
    let mut payload = vec![0u8; size];
    stream.read_exact(&mut payload)?;
    Ok(payload)
}

/// Sends one request to a running daemon and returns its reply.
pub fn send_request<S: AsRef<str>>(path: &Path, argv: &[S]) -> Result<String> {
    let mut stream = UnixStream::connect(path).map_err(|err| {
        SwitcherError::Transport(format!("cannot reach {}: {err}", path.display()))
    })?;
    stream.set_read_timeout(Some(REPLY_TIMEOUT))?;
    write_frame(&mut stream, &encode_argv(argv))?;
    let reply = read_frame(&mut stream)?;
    Ok(String::from_utf8_lossy(&reply).to_string())
}

/// Listening side. Each connection carries one request; the reply comes
/// from the event loop through a per-request channel.
pub struct IpcServer {
    path: PathBuf,
    listener: UnixListener,
}

impl IpcServer {
    pub fn bind(path: &Path) -> Result<Self> {
        if UnixStream::connect(path).is_ok() {
            return Err(SwitcherError::Transport(format!(
                "another instance is listening on {}",
                path.display()
            )));
        }
        // Stale socket from a previous run.
        let _ = fs::remove_file(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let listener = UnixListener::bind(path)?;
        debug!("listening on {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            listener,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serves connections on a background thread, forwarding requests to
    /// `events`. The returned guard removes the socket file on drop.
    pub fn start(self, events: Sender<SwitcherEvent>) -> SocketGuard {
        let guard = SocketGuard {
            path: self.path.clone(),
        };
        let listener = self.listener;
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream.inspect_err(|err| error!("accept failed: {err}")) else {
                    continue;
                };
                if let Err(err) = serve_client(stream, &events) {
                    warn!("client error: {err}");
                }
            }
        });
        guard
    }
}

fn serve_client(mut stream: UnixStream, events: &Sender<SwitcherEvent>) -> Result<()> {
    stream.set_read_timeout(Some(REPLY_TIMEOUT))?;
    let argv = decode_argv(&read_frame(&mut stream)?);
    debug!("request {argv:?}");
    let (reply, response) = mpsc::channel();
    events
        .send(SwitcherEvent::Request { argv, reply })
        .map_err(|_| SwitcherError::Transport("event loop stopped".into()))?;
    let text = response
        .recv_timeout(REPLY_TIMEOUT)
        .map_err(|err| SwitcherError::Transport(format!("no reply: {err}")))?;
    write_frame(&mut stream, text.as_bytes())
}

pub struct SocketGuard {
    path: PathBuf,
}

impl Drop for SocketGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
