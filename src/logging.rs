// Logging setup.
// Human-readable tracing output on stderr; RUST_LOG overrides the verbosity flags.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Default filter directive for the given verbosity (-q = -1, default 0, -v = 1, -vv = 2).
pub fn default_directive(verbosity: i8) -> &'static str {
    match verbosity {
        i8::MIN..=-1 => "touchminer=warn",
        0 => "touchminer=info",
        1 => "touchminer=debug",
        _ => "touchminer=trace",
    }
}

/// Install the global subscriber. Safe to call more than once; later calls are ignored.
pub fn init_logging(verbosity: i8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(-3), "touchminer=warn");
        assert_eq!(default_directive(0), "touchminer=info");
        assert_eq!(default_directive(1), "touchminer=debug");
        assert_eq!(default_directive(5), "touchminer=trace");
    }

    #[test]
    fn test_init_twice() {
        init_logging(0);
        init_logging(1);
    }
}
