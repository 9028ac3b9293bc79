use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Installs the global subscriber; messages go to standard output.
pub fn init(log_level: &str) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(log_level))
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
}

pub fn parse_level(log_level: &str) -> Level {
    match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
