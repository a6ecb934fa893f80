//! pea - named text snippets, versioned with git

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = pea_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
