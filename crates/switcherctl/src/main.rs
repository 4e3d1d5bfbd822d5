use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use hypr_switcher::config::Config;
use hypr_switcher::ipc;

#[derive(Parser, Debug)]
#[command(
    name = "switcherctl",
    version = env!("CARGO_PKG_VERSION"),
    about = "Send one request to a running hypr-switcher"
)]
struct Cli {
    /// Socket path (default: from the config, then $XDG_RUNTIME_DIR).
    #[arg(short, long, value_name = "PATH")]
    socket: Option<PathBuf>,

    /// Request, e.g. `next`, `set-mode icons` or `show {"mode":"icons"}`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    argv: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let configured = match cli.socket {
        Some(path) => Some(path),
        None => match Config::load(None) {
            Ok(config) => config.socket_path,
            Err(err) => {
                eprintln!("switcherctl: {err}");
                return ExitCode::FAILURE;
            }
        },
    };
    let path = ipc::socket_path(configured.as_deref());
    match ipc::send_request(&path, &cli.argv) {
        Ok(reply) => {
            println!("{reply}");
            if reply.starts_with("error:") {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            eprintln!("switcherctl: {err}");
            ExitCode::FAILURE
        }
    }
}
