use std::process::ExitCode;

use tracing::error;

use clrhost::logging::DIAGNOSTIC_TARGET;
use clrhost::HostConfig;

fn main() -> ExitCode {
    clrhost::logging::init();

    // Referencing the export keeps the linker from discarding it.
    let _ = std::hint::black_box(clrhost::native::add_numbers as extern "C" fn(i32, i32) -> i32);

    match HostConfig::from_current_exe().and_then(|config| clrhost::run(&config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(target: DIAGNOSTIC_TARGET, "{}", err);
            ExitCode::from(1)
        }
    }
}
