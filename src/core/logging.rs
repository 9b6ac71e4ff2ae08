use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Install a fmt subscriber as the global default.
///
/// Returns `false` when a global subscriber was already set, which happens
/// when an embedding application configured tracing itself.
pub fn init_tracing(level: Level) -> bool {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_thread_names(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        let _ = init_tracing(Level::DEBUG);
        assert!(!init_tracing(Level::INFO));
    }
}
