//! Simple REST datastore server, in-memory only by default or backed by
//! a JSON file via `-f`. Once running, visit the root URL to explore
//! the API with swagger-ui.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use server::ServeOptions;

/// Simple REST Datastore
#[derive(Parser)]
#[command(name = "microstore", version, about, long_about = None)]
struct Cli {
    /// Name of a file to back the database; omit for in-memory operation
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Hostname to listen on - set this to '0.0.0.0' to have the server
    /// available externally as well
    #[arg(long, value_name = "IP")]
    host: Option<String>,

    /// The port of the webserver
    #[arg(long, value_name = "PORT")]
    port: Option<u16>,

    /// Turn on debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    common::utils::logging::init_logging(cli.debug);

    std::panic::set_hook(Box::new(|info| {
        error!(message = %info, "unhandled panic occurred");
    }));

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        pid = std::process::id(),
        "microstore starting"
    );

    let opts = ServeOptions {
        backing_file: cli.file,
        host: cli.host,
        port: cli.port,
    };

    match rt.block_on(server::run(opts)) {
        Ok(()) => {
            info!("microstore stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "server exited with error");
            ExitCode::FAILURE
        }
    }
}
