use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use tracing::{error, info};

use hypr_switcher::command::handle_request;
use hypr_switcher::config::{Config, DEFAULT_CONFIG_TEMPLATE};
use hypr_switcher::drivers::{ChannelDriver, TerminalInputDriver};
use hypr_switcher::event_loop::{ControlFlow, EventLoop, SwitcherEvent};
use hypr_switcher::icons::{DesktopRegistry, IconResolver};
use hypr_switcher::ipc::{self, IpcServer};
use hypr_switcher::preview::PreviewResolver;
use hypr_switcher::recency::{FocusHistory, sort_windows};
use hypr_switcher::surface::terminal::{TerminalKeyAction, key_action};
use hypr_switcher::surface::{LogSurface, OverlaySurface, TerminalSurface};
use hypr_switcher::switcher::{Switcher, SwitcherContext};
use hypr_switcher::tracing_sub::{self, LogTarget};
use hypr_switcher::window::{Collector, Hyprctl};
use hypr_switcher::{Result, SwitcherError};

/// Loop wake-up interval; timers are serviced at least this often.
const LOOP_INTERVAL: Duration = Duration::from_millis(5);

#[derive(Parser, Debug)]
#[command(
    name = "hypr-switcher",
    version = env!("CARGO_PKG_VERSION"),
    about = "Alt-Tab window switcher for Hyprland"
)]
struct Cli {
    /// Configuration file (default: $XDG_CONFIG_HOME/hypr-switcher/config.toml).
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Socket path, overriding the configured one.
    #[arg(short, long, global = true, value_name = "PATH")]
    socket: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run headless, serving requests on the socket (default).
    Daemon,
    /// Run with the terminal as the overlay surface.
    Tui {
        /// Where to write logs while the terminal is in use.
        #[arg(long, value_name = "FILE")]
        log_file: Option<PathBuf>,
    },
    /// Send one request to a running instance and print the reply.
    Send {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        argv: Vec<String>,
    },
    /// Print the windows the switcher would offer, in order.
    Windows,
    /// Print the default configuration.
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("hypr-switcher: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command.unwrap_or(Command::Daemon) {
        Command::Config => {
            print!("{DEFAULT_CONFIG_TEMPLATE}");
            Ok(())
        }
        Command::Send { argv } => {
            let config = Config::load(cli.config.as_deref())?;
            let path = ipc::socket_path(cli.socket.as_deref().or(config.socket_path.as_deref()));
            println!("{}", ipc::send_request(&path, &argv)?);
            Ok(())
        }
        Command::Windows => {
            tracing_sub::init(LogTarget::Stderr)?;
            let config = Config::load(cli.config.as_deref())?;
            let mut collector = collector(&config)?;
            let windows = sort_windows(collector.collect(), config.sort_mode, &FocusHistory::new());
            for window in windows {
                println!(
                    "{}\t{}\t{}\t{}",
                    window.address, window.workspace, window.class, window.title
                );
            }
            Ok(())
        }
        Command::Daemon => {
            tracing_sub::init(LogTarget::Stderr)?;
            let config = Config::load(cli.config.as_deref())?;
            serve(&config, cli.socket, LogSurface::new(), ChannelDriver::new)
        }
        Command::Tui { log_file } => {
            let log_file = log_file.unwrap_or_else(tracing_sub::default_log_file);
            if let Some(parent) = log_file.parent() {
                std::fs::create_dir_all(parent)?;
            }
            tracing_sub::init(LogTarget::File(log_file))?;
            let config = Config::load(cli.config.as_deref())?;
            let mut surface = TerminalSurface::new(config.modifier)?;
            surface.enter()?;
            serve(&config, cli.socket, surface, |rx| {
                TerminalInputDriver::new(ChannelDriver::new(rx))
            })
        }
    }
}

fn collector(config: &Config) -> Result<Collector<Hyprctl>> {
    let hyprctl = Hyprctl::new(&config.hyprctl.command, config.hyprctl.timeout())?;
    Ok(Collector::new(hyprctl, config.fallback_display_width))
}

/// Surfaces that want to see raw key traffic.
trait KeyObserver {
    fn observe_key(&mut self, _key: &crossterm::event::KeyEvent) {}
    fn redraw(&mut self) {}
    /// Whether terminal bindings apply.
    fn local_keys(&self) -> bool {
        false
    }
}

impl KeyObserver for LogSurface {}

impl KeyObserver for TerminalSurface {
    fn observe_key(&mut self, key: &crossterm::event::KeyEvent) {
        TerminalSurface::observe_key(self, key)
    }

    fn redraw(&mut self) {
        TerminalSurface::redraw(self)
    }

    fn local_keys(&self) -> bool {
        true
    }
}

fn serve<S, D, F>(config: &Config, socket: Option<PathBuf>, surface: S, driver: F) -> Result<()>
where
    S: OverlaySurface + KeyObserver,
    D: hypr_switcher::drivers::InputDriver,
    F: FnOnce(mpsc::Receiver<SwitcherEvent>) -> D,
{
    let path = ipc::socket_path(socket.as_deref().or(config.socket_path.as_deref()));
    let server = IpcServer::bind(&path)?;
    let (tx, rx) = mpsc::channel();
    let _guard = server.start(tx);
    info!("serving on {}", path.display());

    let context = SwitcherContext::new(
        IconResolver::new(Box::new(DesktopRegistry::from_env())),
        PreviewResolver::new(config.preview.dir(), config.preview.bounds()),
    );
    let mut switcher = Switcher::new(collector(config)?, surface, context, config.switcher_settings());

    let mut event_loop = EventLoop::new(driver(rx), LOOP_INTERVAL);
    event_loop
        .run(|_, event| {
            let now = Instant::now();
            match event {
                None => {}
                Some(SwitcherEvent::Request { argv, reply }) => {
                    let response = handle_request(&mut switcher, &argv, now);
                    // The client may have given up waiting.
                    let _ = reply.send(response);
                }
                Some(SwitcherEvent::Key(key)) => {
                    switcher.surface_mut().observe_key(&key);
                    if switcher.handle_key(&key, now) {
                        return Ok(ControlFlow::Continue);
                    }
                    if switcher.surface().local_keys() {
                        match key_action(&key, switcher.state().is_active()) {
                            Some(TerminalKeyAction::Quit) => return Ok(ControlFlow::Quit),
                            Some(TerminalKeyAction::Request(action)) => {
                                handle_request(&mut switcher, &[action.to_string()], now);
                            }
                            None => {}
                        }
                    }
                }
                Some(SwitcherEvent::Resize) => switcher.surface_mut().redraw(),
                Some(SwitcherEvent::Shutdown) => return Ok(ControlFlow::Quit),
            }
            switcher.tick(now);
            Ok(ControlFlow::Continue)
        })
        .map_err(SwitcherError::from)
}
