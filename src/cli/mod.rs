mod commands;
mod completions;
mod context;
mod error;
pub mod exit_codes;
pub mod output;

pub use commands::Cli;
pub use context::{parse_query_string, ContextArgs, ContextError};
pub use error::CliError;

use output::OutputMode;

/// run a parsed command line and return the process exit code
pub fn run(cli: Cli) -> i32 {
    let mode = cli.output_mode();

    match commands::execute(cli) {
        Ok(code) => code,
        Err(e) => {
            report_error(&e, mode);
            e.code
        }
    }
}

fn report_error(e: &CliError, mode: OutputMode) {
    if mode.is_json() {
        output::print_json_error(e.code, &e.message);
    } else {
        eprintln!("error: {}", e.message);
    }
}
