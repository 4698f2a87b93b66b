//! binman - Keep track of what is stored in which bin

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = bin_manager::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
