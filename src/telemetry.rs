// ============================================================
// Logging setup
// ============================================================
// Installs a tracing-subscriber fmt subscriber. RUST_LOG takes
// precedence; otherwise this crate logs at info level.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_DIRECTIVE: &str = "caption_prep=info";

/// Install the global subscriber. A second call is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    // Fails only when a subscriber is already set
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_does_not_panic() {
        init_tracing();
        init_tracing();
        tracing::info!("tracing initialised");
    }
}
