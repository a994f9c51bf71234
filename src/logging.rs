//! Diagnostics go to stderr so stdout carries only the host's status lines.

use std::io::{self, IsTerminal};
use std::sync::OnceLock;

use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, EnvFilter};

/// Used when `RUST_LOG` is unset or unparseable.
pub const DEFAULT_DIRECTIVE: &str = "warn";

/// Target of the single failure line. Errors on it are never filtered out.
pub const DIAGNOSTIC_TARGET: &str = "clrhost::diagnostic";

pub fn init() {
    static INITIALISED: OnceLock<()> = OnceLock::new();

    INITIALISED.get_or_init(|| {
        let use_ansi = std::env::var_os("NO_COLOR").is_none() && io::stderr().is_terminal();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
        let subscriber = fmt::fmt()
            .with_env_filter(with_diagnostics(filter))
            .with_ansi(use_ansi)
            .with_writer(io::stderr)
            .with_target(false)
            .compact()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

fn with_diagnostics(filter: EnvFilter) -> EnvFilter {
    match format!("{}=error", DIAGNOSTIC_TARGET).parse::<Directive>() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}
