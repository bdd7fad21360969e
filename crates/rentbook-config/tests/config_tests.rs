use rentbook_config::{Config, ConfigError, ConfigManager};
use tempfile::tempdir;

#[test]
fn default_config_matches_documented_values() {
    let cfg = Config::default();

    assert_eq!(cfg.currency, "KES");
    assert!(!cfg.locale.is_empty());
    assert_eq!(cfg.cache_ttl_secs, 30);
    assert_eq!(cfg.reminder_warning_days, 5);
    assert_eq!(cfg.reminder_critical_days, 14);
    assert!(!cfg.allow_adjustments);
    assert_eq!(cfg.recent_tenants_limit, 5);
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_home(dir.path()).expect("manager");
    assert_eq!(manager.load().expect("defaults"), Config::default());

    let mut cfg = Config::default();
    cfg.currency = "USD".to_string();
    cfg.last_opened_book = Some("sunrise_flats".into());
    manager.save(&cfg).expect("save config");

    let loaded = manager.load().expect("load config");
    assert_eq!(loaded, cfg);
    assert!(manager.config_path().ends_with("config/config.json"));
}

#[test]
fn set_parses_and_validates_values() {
    let mut cfg = Config::default();
    cfg.set("currency", "usd").unwrap();
    assert_eq!(cfg.currency, "USD");
    cfg.set("allow_adjustments", "yes").unwrap();
    assert!(cfg.allow_adjustments);
    cfg.set("cache_ttl_secs", "0").unwrap();
    assert_eq!(cfg.get("cache_ttl_secs").unwrap(), "0");

    assert!(matches!(
        cfg.set("reminder_warning_days", "20"),
        Err(ConfigError::InvalidValue { .. })
    ));
    assert!(matches!(
        cfg.set("cache_ttl_secs", "-1"),
        Err(ConfigError::InvalidValue { .. })
    ));
    assert!(matches!(
        cfg.set("theme", "dark"),
        Err(ConfigError::UnknownKey(_))
    ));
    for key in Config::KEYS {
        assert!(cfg.get(key).is_ok(), "{key} should be readable");
    }
}

#[test]
fn update_does_not_save_rejected_changes() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_home(dir.path()).expect("manager");

    manager
        .update(|cfg| cfg.set("recent_tenants_limit", "3"))
        .expect("valid update");
    assert!(manager
        .update(|cfg| cfg.set("recent_tenants_limit", "many"))
        .is_err());
    assert_eq!(manager.load().unwrap().recent_tenants_limit, 3);
}

#[test]
fn backups_round_trip_through_restore() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_home(dir.path()).expect("manager");

    let mut cfg = Config::default();
    cfg.currency = "UGX".into();
    let name = manager.backup(&cfg, Some("Before switch")).expect("backup");
    assert!(name.starts_with("config_"));
    assert!(name.ends_with("_before-switch.json"));
    assert_eq!(manager.list_backups().unwrap(), vec![name.clone()]);

    manager.save(&Config::default()).expect("save defaults");
    let restored = manager.restore(&name).expect("restore");
    assert_eq!(restored.currency, "UGX");
    assert_eq!(manager.load().unwrap().currency, "UGX");
}
