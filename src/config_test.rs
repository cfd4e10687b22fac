use std::collections::HashMap;

use super::*;

fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    AppConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn defaults_when_nothing_is_set() {
    let cfg = config_from(&[]).unwrap();
    assert_eq!(cfg.backend_url, DEFAULT_BACKEND_URL);
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert!(!cfg.production);
    assert!(!cfg.cookie_secure);
    assert_eq!(cfg.static_dir, PathBuf::from(DEFAULT_STATIC_DIR));
    assert_eq!(
        cfg.timeouts,
        BackendTimeouts {
            request_secs: DEFAULT_BACKEND_REQUEST_TIMEOUT_SECS,
            connect_secs: DEFAULT_BACKEND_CONNECT_TIMEOUT_SECS,
        }
    );
    assert!(cfg.storage.is_none());
}

#[test]
fn backend_url_trailing_slash_trimmed() {
    let cfg = config_from(&[("BACKEND_URL", "https://api.finup.test/")]).unwrap();
    assert_eq!(cfg.backend_url, "https://api.finup.test");
}

#[test]
fn legacy_backend_url_used_as_fallback() {
    let cfg = config_from(&[("NEXT_PUBLIC_API_URL", "http://legacy:8000")]).unwrap();
    assert_eq!(cfg.backend_url, "http://legacy:8000");
}

#[test]
fn backend_url_wins_over_legacy_keys() {
    let cfg = config_from(&[
        ("BACKEND_URL", "http://primary:8000"),
        ("NEXT_PUBLIC_BACKEND_URL", "http://legacy:8000"),
    ])
    .unwrap();
    assert_eq!(cfg.backend_url, "http://primary:8000");
}

#[test]
fn production_turns_on_secure_cookies() {
    let cfg = config_from(&[("APP_ENV", "Production")]).unwrap();
    assert!(cfg.production);
    assert!(cfg.cookie_secure);
}

#[test]
fn cookie_secure_override_beats_app_env() {
    let cfg = config_from(&[("APP_ENV", "production"), ("COOKIE_SECURE", "off")]).unwrap();
    assert!(cfg.production);
    assert!(!cfg.cookie_secure);
}

#[test]
fn invalid_cookie_secure_errors() {
    let err = config_from(&[("COOKIE_SECURE", "maybe")]).unwrap_err();
    assert_eq!(err, ConfigError::Invalid { key: "COOKIE_SECURE", value: "maybe".into() });
}

#[test]
fn invalid_port_errors() {
    let err = config_from(&[("PORT", "eighty")]).unwrap_err();
    assert!(err.to_string().contains("PORT"));
}

#[test]
fn timeouts_parsed() {
    let cfg = config_from(&[("BACKEND_REQUEST_TIMEOUT_SECS", "42"), ("BACKEND_CONNECT_TIMEOUT_SECS", " 7 ")]).unwrap();
    assert_eq!(cfg.timeouts, BackendTimeouts { request_secs: 42, connect_secs: 7 });
}

#[test]
fn storage_requires_url_and_key() {
    let cfg = config_from(&[("SUPABASE_URL", "https://x.supabase.co")]).unwrap();
    assert!(cfg.storage.is_none());

    let cfg = config_from(&[("SUPABASE_URL", "https://x.supabase.co/"), ("SUPABASE_ANON_KEY", "anon")]).unwrap();
    let storage = cfg.storage.unwrap();
    assert_eq!(storage.url, "https://x.supabase.co");
    assert_eq!(storage.api_key, "anon");
    assert_eq!(storage.bucket, DEFAULT_STORAGE_BUCKET);
}

#[test]
fn parse_bool_variants() {
    for raw in ["1", "true", "YES", " on "] {
        assert_eq!(parse_bool(raw), Some(true), "expected true for {raw:?}");
    }
    for raw in ["0", "False", "no", "off"] {
        assert_eq!(parse_bool(raw), Some(false), "expected false for {raw:?}");
    }
    assert_eq!(parse_bool(""), None);
    assert_eq!(parse_bool("maybe"), None);
}
