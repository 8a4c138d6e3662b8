use clap::Parser;
use taskboard::cli::commands::Cli;
use taskboard::cli::handlers;

fn main() {
    // No subcommand launches the board view
    let cli = Cli::parse();
    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
