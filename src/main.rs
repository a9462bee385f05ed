use clap::Parser;
use cleancommand::cli::commands::Cli;
use cleancommand::cli::handlers;

fn main() {
    let cli = Cli::parse();
    cleancommand::logging::init(cli.verbose);

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
