use super::test_helpers::*;

#[test]
fn storage_is_optional() {
    let state = test_app_state("http://localhost:8000", false);
    assert!(state.storage.is_none());
    assert_eq!(state.backend.base_url(), "http://localhost:8000");
}

#[test]
fn storage_client_built_from_config() {
    let state = test_app_state("http://localhost:8000/", true);
    let storage = state.storage.expect("storage configured");
    assert_eq!(storage.bucket(), "finup-bucket");
    assert_eq!(
        storage.public_url("provider-1/a.pdf"),
        "http://localhost:8000/storage/v1/object/public/finup-bucket/provider-1/a.pdf"
    );
}

#[test]
fn cookie_flag_follows_config() {
    let mut config = test_config("http://localhost:8000");
    config.cookie_secure = true;
    let state = super::AppState::from_config(config).unwrap();
    assert!(state.cookie_secure());
}
