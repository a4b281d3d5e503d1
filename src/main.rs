//! Netforge CLI — Rust-native network topology descriptors.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "netforge",
    version,
    about = "Rust-native network topology descriptors — typed declarations, rendered desired-state graphs"
)]
struct Cli {
    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: netforge::cli::Commands,
}

fn main() {
    let cli = Cli::parse();
    netforge::logging::init_cli_logger(cli.verbose);
    if let Err(e) = netforge::cli::dispatch(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
