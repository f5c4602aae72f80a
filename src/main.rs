use std::process::ExitCode;

fn main() -> ExitCode {
    labread_lib::run()
}
