use std::process::ExitCode;

fn main() -> ExitCode {
    confval_cli::run()
}
