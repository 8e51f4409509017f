//! Tracing subscriber setup for binaries.

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// Install the JSON subscriber, filtered by `RUST_LOG`.
///
/// A subscriber that is already installed stays in place; the failure is
/// logged through it.
pub fn init() {
    if let Err(err) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %err, "tracing init failed");
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn repeated_initialisation_is_not_fatal() {
        init();
        init();
    }
}
