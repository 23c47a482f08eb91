// Logging initialisation tests

use filigree::config::{LogFormat, LoggingConfig};
use filigree::logging::{init_subscriber, LoggingError};

#[test]
fn test_json_subscriber_installs_once() {
    let config = LoggingConfig {
        format: LogFormat::Json,
        ..LoggingConfig::default()
    };
    let _ = init_subscriber(&config);
    tracing::info!(component = "tests", "subscriber ready");
    assert!(matches!(
        init_subscriber(&config),
        Err(LoggingError::AlreadyInitialized(_))
    ));
}
