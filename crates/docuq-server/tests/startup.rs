//! Startup behavior without a usable API key.

use docuq_core::DocuqError;
use docuq_server::{config::Config, server};
use std::time::Duration;
use tempfile::TempDir;

/// A port that was free a moment ago.
fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[tokio::test]
async fn test_missing_credential_halts_before_serving() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("qa_database.db");
    let port = free_port();
    let config = Config {
        host: "127.0.0.1".to_string(),
        port,
        db_path: db_path.clone(),
        ..Config::default()
    };

    for key in [None, Some(String::new()), Some("   ".to_string())] {
        let result = tokio::time::timeout(Duration::from_secs(5), server::run(config.clone(), key))
            .await
            .expect("server started without a credential");

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DocuqError>(),
            Some(DocuqError::MissingCredential)
        ));
        assert_eq!(
            err.to_string(),
            "MISTRAL_API_KEY is not set in environment variables"
        );
    }

    // Nothing was opened or bound
    assert!(!db_path.exists());
    std::net::TcpListener::bind(("127.0.0.1", port)).unwrap();
}
