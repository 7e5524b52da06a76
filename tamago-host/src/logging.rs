//! Tracing subscriber setup.

use tamago_core::config::GeneralConfig;
use tracing_subscriber::{EnvFilter, fmt};

/// Install a compact stderr subscriber filtered at `config.log_level`.
///
/// `RUST_LOG` takes precedence when set. Returns `false` if a global
/// subscriber was already installed, in which case nothing changes.
pub fn init_tracing(config: &GeneralConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_a_no_op() {
        let config = GeneralConfig {
            log_level: "not a real [level".into(),
        };
        // Whichever test installs first wins; the second call must not panic.
        let _ = init_tracing(&config);
        assert!(!init_tracing(&GeneralConfig::default()));
    }
}
