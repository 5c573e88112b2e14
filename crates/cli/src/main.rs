use std::process::ExitCode;

fn main() -> ExitCode {
    execlens_cli::run()
}
