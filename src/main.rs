//! Thin binary wrapper.
//!
//! Reads one function of `x` from stdin, then plots it until the window is closed.
//! Exit codes: 0 on window close, a distinct negative code per fatal startup error
//! (see `StartupError::exit_code`).
//!
//! Run:
//! - `RUST_LOG=info cargo run`

use std::io;
use std::process::ExitCode;

use calcmotion::{config::PlotConfig, error::StartupError, expr::Expression, prompt};

fn run() -> Result<(), StartupError> {
    let text = prompt::read_function(io::stdin().lock(), io::stdout())?;
    let expression = Expression::compile(&text, "x")?;
    calcmotion::run_plot(expression, PlotConfig::default())
}

fn main() -> ExitCode {
    // Keep logging setup in the binary so the library remains unopinionated.
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            err.report(io::stderr());
            std::process::exit(err.exit_code());
        }
    }
}
