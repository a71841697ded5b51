// Startup failures must surface as errors so the binary exits non-zero.
use custo3d_backend::config::{AppConfig, ConfigError};
use custo3d_backend::{run, StartupError};

fn config(database_url: &str) -> AppConfig {
    let database_url = database_url.to_string();
    AppConfig::from_lookup(move |key| match key {
        "DATABASE_URL" => Some(database_url.clone()),
        "JWT_SECRET" => Some("test-secret".to_string()),
        _ => None,
    })
    .unwrap()
}

#[tokio::test]
async fn unusable_database_url_fails_startup() {
    let err = run(config("not a database url")).await.unwrap_err();
    assert!(matches!(err, StartupError::Database(_)), "{err}");
}

#[test]
fn config_errors_are_startup_errors() {
    let err = StartupError::from(ConfigError::Missing("JWT_SECRET"));
    assert!(matches!(err, StartupError::Config(_)));
    assert_eq!(err.to_string(), "invalid configuration: JWT_SECRET must be set");
}
