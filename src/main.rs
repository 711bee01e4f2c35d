// park/src/main.rs

use std::process::ExitCode;

fn main() -> ExitCode {
    park::commands::run_cli()
}
