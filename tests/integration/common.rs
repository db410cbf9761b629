use mendeley_sdk::{MendeleyApi, Settings};

/// Build a client for the live API.
///
/// **IMPORTANT**: Live tests MUST run against the real Mendeley API. This
/// panics with a helpful message when MENDELEY_ACCESS_TOKEN is not set.
pub fn live_api() -> MendeleyApi {
    init_tracing();

    match std::env::var(mendeley_sdk::client::ACCESS_TOKEN_ENV) {
        Ok(token) if !token.is_empty() => {}
        _ => panic!(
            "\n\n\
            MENDELEY_ACCESS_TOKEN is not set.\n\
            Live integration tests need an OAuth access token for a test account:\n\
            \x20 export MENDELEY_ACCESS_TOKEN='...'\n\
            Optionally point MENDELEY_BASE_URL at a staging API.\n\n"
        ),
    }

    let settings = Settings::from_env().expect("Invalid MENDELEY_BASE_URL");
    MendeleyApi::new(settings).expect("Failed to create API client")
}

/// Install a test subscriber honouring RUST_LOG.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
