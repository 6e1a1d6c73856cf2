use once_cell::sync::OnceCell;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static TRACING: OnceCell<bool> = OnceCell::new();

/// Install a stderr `fmt` subscriber at `level`; `RUST_LOG` takes precedence
/// when set.
///
/// Only the first call has any effect. Returns whether a subscriber from
/// this function is active, which is false when another global subscriber
/// was already installed.
pub fn enable_tracing(level: Level) -> bool {
    *TRACING.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "warn,peel={level},peel_convert={level},peel_archive={level}"
            ))
        });
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
            .is_ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_calls_are_stable() {
        let first = enable_tracing(Level::DEBUG);
        assert_eq!(enable_tracing(Level::TRACE), first);
    }
}
