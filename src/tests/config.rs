use crate::config::Config;

#[test]
fn creates_default_config() {
    let tmp = tempfile::tempdir().unwrap();
    let base_path = tmp.path().to_str().unwrap();

    let config = Config::load_with(base_path).unwrap();

    assert!(tmp.path().join("config.yaml").exists());
    assert_eq!(config.listen_addr, "0.0.0.0:3001");
    assert_eq!(config.allowed_origins, vec!["http://localhost:3000"]);
    assert_eq!(config.suggest_quiet_ms, 500);
}

#[test]
fn fills_missing_fields() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("config.yaml"), "suggest_quiet_ms: 250\n").unwrap();

    let config = Config::load_with(tmp.path().to_str().unwrap()).unwrap();
    assert_eq!(config.suggest_quiet_ms, 250);
    assert_eq!(config.listen_addr, "0.0.0.0:3001");

    // the upgraded file is written back
    let saved = std::fs::read_to_string(tmp.path().join("config.yaml")).unwrap();
    assert!(saved.contains("listen_addr"));
}

#[test]
fn rejects_zero_quiet_period() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("config.yaml"), "suggest_quiet_ms: 0\n").unwrap();

    assert!(Config::load_with(tmp.path().to_str().unwrap()).is_err());
}
