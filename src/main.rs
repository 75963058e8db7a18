use bomscout::cli::commands::{CliArgs, Commands};
use bomscout::cli::handlers::{handle_detectors, handle_scan};
use bomscout::util::logging;
use bomscout::VERSION;

use clap::Parser;
use tracing::debug;

fn main() {
    let args = CliArgs::parse();
    logging::init_for_cli(args.log_level.as_deref(), args.verbose, args.quiet);

    debug!("bomscout v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Scan(scan_args) => handle_scan(scan_args, args.quiet),
        Commands::Detectors => handle_detectors(),
    };

    std::process::exit(exit_code);
}
