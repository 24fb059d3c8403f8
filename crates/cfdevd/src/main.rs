use std::process::ExitCode;

use cfdevd::LaunchError;

fn main() -> ExitCode {
    match cfdevd::run_cli(std::env::args_os()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(LaunchError::Usage(error)) => error.exit(),
        Err(error) => {
            eprintln!("cfdevd: {error}");
            ExitCode::FAILURE
        }
    }
}
