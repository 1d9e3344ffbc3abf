use std::process::ExitCode;

fn main() -> ExitCode {
    match loop_lang::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
