use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn explicit_values_are_used() {
    let config = ClientConfig::from_lookup(lookup_from(&[
        ("FOLIO_API_BASE_URL", "https://api.example.com/"),
        ("FOLIO_TOKEN_PATH", "/tmp/folio-token"),
    ]))
    .unwrap();
    assert_eq!(config.base_url, "https://api.example.com");
    assert_eq!(config.token_path, PathBuf::from("/tmp/folio-token"));
    assert_eq!(config.token_store().path(), config.token_path.as_path());
}

#[test]
fn base_url_defaults_to_localhost() {
    let config = ClientConfig::from_lookup(lookup_from(&[("FOLIO_TOKEN_PATH", "/tmp/t")])).unwrap();
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
}

#[test]
fn blank_values_fall_back_to_defaults() {
    let config = ClientConfig::from_lookup(lookup_from(&[
        ("FOLIO_API_BASE_URL", "  "),
        ("FOLIO_TOKEN_PATH", "/tmp/t"),
    ]))
    .unwrap();
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
}

#[test]
fn non_http_base_url_is_rejected() {
    let err = ClientConfig::from_lookup(lookup_from(&[
        ("FOLIO_API_BASE_URL", "ftp://example.com"),
        ("FOLIO_TOKEN_PATH", "/tmp/t"),
    ]))
    .unwrap_err();
    assert_eq!(err, ConfigError::InvalidBaseUrl("ftp://example.com".to_owned()));
}

#[test]
fn new_trims_every_trailing_slash() {
    let config = ClientConfig::new("http://localhost:8000///", "/tmp/t").unwrap();
    assert_eq!(config.base_url, "http://localhost:8000");
}

#[test]
fn default_token_path_ends_in_folio_token() {
    if let Some(path) = default_token_path() {
        assert!(path.ends_with("folio/token") || path.ends_with(".folio/token"));
    }
}
