use std::process::ExitCode;

use idskit::IdsError;

fn main() -> ExitCode {
    match idskit::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            if let IdsError::LossyConversion { report } = &err {
                eprint!("{report}");
            }
            ExitCode::FAILURE
        }
    }
}
