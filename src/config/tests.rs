use super::*;

#[test]
fn defaults_match_documented_values() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.port(), DEFAULT_PORT);
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
    assert!(settings.database.url.is_none());
    assert!(settings.cache.enabled);
    assert_eq!(settings.cache.default_ttl_seconds.get(), 3600);
    assert_eq!(settings.cache.locations_ttl_seconds.get(), 3600);
    assert_eq!(settings.cache.sweep_interval_seconds.get(), 300);
    assert_eq!(settings.rate_limit.window_seconds.get(), 900);
    assert_eq!(settings.rate_limit.max_requests.get(), 100);
    assert_eq!(settings.server.cors_origins.len(), 4);
    assert!(
        settings
            .server
            .cors_origins
            .contains(&"http://localhost:3000".to_string())
    );
    assert_eq!(settings.server.body_limit_bytes, 10 * 1024 * 1024);
    assert_eq!(settings.server.environment, "development");
}

#[test]
fn cors_origins_are_normalized() {
    let mut raw = RawSettings::default();
    raw.server.cors_origins = Some(vec![
        " https://app.example.com/ ".to_string(),
        "https://admin.example.com:443/path".to_string(),
        "http://localhost:8080".to_string(),
    ]);
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(
        settings.server.cors_origins,
        vec![
            "https://app.example.com",
            "https://admin.example.com",
            "http://localhost:8080"
        ]
    );
}

#[test]
fn invalid_cors_origin_is_reported() {
    for origin in ["*", "ftp://files.example.com", "not a url"] {
        let mut raw = RawSettings::default();
        raw.server.cors_origins = Some(vec![origin.to_string()]);
        assert!(
            matches!(
                Settings::from_raw(raw),
                Err(LoadError::Invalid {
                    key: "server.cors_origins",
                    ..
                })
            ),
            "{origin}"
        );
    }
}

#[test]
fn zero_body_limit_is_rejected() {
    let mut raw = RawSettings::default();
    raw.server.body_limit_bytes = Some(0);
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "server.body_limit_bytes",
            ..
        })
    ));
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());
    raw.cache.default_ttl_seconds = Some(60);

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        cache_default_ttl_seconds: Some(120),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.cache.default_ttl_seconds.get(), 120);
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn zero_ttl_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.default_ttl_seconds = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero ttl must fail");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.default_ttl_seconds",
            ..
        }
    ));
}

#[test]
fn blank_database_url_is_treated_as_missing() {
    let mut raw = RawSettings::default();
    raw.database.url = Some("   ".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.database.url.is_none());
}

#[test]
fn invalid_log_level_is_reported() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "logging.level",
            ..
        })
    ));
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["apartments"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "apartments",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--database-url",
        "postgres://override",
        "--cache-enabled",
        "false",
        "--server-cors-origin",
        "https://a.example.com",
        "--server-cors-origin",
        "https://b.example.com",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(
                serve.overrides.database.database_url.as_deref(),
                Some("postgres://override")
            );
            assert_eq!(serve.overrides.cache_enabled, Some(false));
            assert_eq!(
                serve.overrides.server_cors_origins,
                vec!["https://a.example.com", "https://b.example.com"]
            );
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_seed_arguments() {
    let args = CliArgs::parse_from([
        "apartments",
        "seed",
        "--database-url",
        "postgres://example",
        "seed/apartments.toml",
    ]);

    match args.command.expect("seed command") {
        Command::Seed(seed) => {
            assert_eq!(
                seed.database.database_url.as_deref(),
                Some("postgres://example")
            );
            assert_eq!(seed.file, std::path::Path::new("seed/apartments.toml"));
        }
        _ => panic!("wrong command parsed"),
    }
}
