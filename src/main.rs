use clap::Parser;
use riskflow::cli::{self, Cli};
use tracing::{debug, error, trace};

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(cli::get_log_level(cli.verbose))
        .with_target(cli.verbose >= 2) // Show target module for -vv and above
        .with_line_number(cli.verbose >= 3) // Show line numbers for -vvv
        .init();

    debug!("riskflow started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = cli::execute_command(cli.command) {
        let code = cli::exit_code(&e);
        error!("Fatal error: {}", e);
        match e.downcast_ref::<riskflow::ConfigFileError>() {
            Some(err) => {
                debug!(
                    "E{:04}: {}",
                    err.code(),
                    riskflow::error::describe_error_code(err.code())
                );
                eprintln!("Error: {}", err.user_message())
            }
            None => eprintln!("Error: {e:#}"),
        }
        std::process::exit(code);
    }
}
