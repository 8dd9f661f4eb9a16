#[cfg(test)]
mod tests {
    // ── Schema & validation ────────────────────────────────────

    mod schema {
        use noema_config::{NoemaConfig, TrustBands};

        #[test]
        fn test_defaults_validate_cleanly() {
            let warnings = NoemaConfig::default().validate().unwrap();
            assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        }

        #[test]
        fn test_partial_toml_keeps_defaults() {
            let raw = r#"
                [scheduler]
                max_concurrent = 5

                [monitor]
                interval_secs = 2
                overrun_factor = 2.0

                [governance]
                fallback_trust = 0.4
            "#;
            let config: NoemaConfig = toml::from_str(raw).unwrap();
            assert_eq!(config.scheduler.max_concurrent, 5);
            assert_eq!(config.monitor.interval_secs, 2);
            assert_eq!(config.monitor.overrun_factor, 2.0);
            assert_eq!(config.governance.fallback_trust, 0.4);
            // untouched sections keep their defaults
            assert_eq!(config.monitor.escalation_threshold, 0.8);
            assert_eq!(config.governance.bands.limited, 0.60);
            assert_eq!(config.governance.safety.threshold, 0.6);
            assert_eq!(config.process_defaults.exploration.compute_pct, 30.0);
            assert!(!config.process_defaults.synthesis.network_access);
        }

        #[test]
        fn test_empty_toml_is_all_defaults() {
            let config: NoemaConfig = toml::from_str("").unwrap();
            assert_eq!(config.scheduler.max_concurrent, 3);
            assert_eq!(config.monitor.interval_secs, 5);
            assert_eq!(
                config.governance.questioning.reflections.exploration.len(),
                3
            );
        }

        #[test]
        fn test_misordered_bands_rejected() {
            let mut config = NoemaConfig::default();
            config.governance.bands = TrustBands {
                limited: 0.8,
                standard: 0.7,
                enhanced: 0.9,
            };
            let err = config.validate().unwrap_err();
            assert!(err.contains("governance.bands"));
        }

        #[test]
        fn test_zero_concurrency_rejected() {
            let mut config = NoemaConfig::default();
            config.scheduler.max_concurrent = 0;
            let err = config.validate().unwrap_err();
            assert!(err.contains("scheduler.max_concurrent"));
        }

        #[test]
        fn test_overrun_factor_below_one_rejected() {
            let mut config = NoemaConfig::default();
            config.monitor.overrun_factor = 0.5;
            let err = config.validate().unwrap_err();
            assert!(err.contains("monitor.overrun_factor"));
        }

        #[test]
        fn test_unknown_log_level_is_only_a_warning() {
            let mut config = NoemaConfig::default();
            config.logging.level = "verbose".into();
            let warnings = config.validate().unwrap();
            assert_eq!(warnings.len(), 1);
            assert_eq!(warnings[0].field, "logging.level");
        }

        #[test]
        fn test_risk_factor_out_of_range_is_a_warning() {
            let mut config = NoemaConfig::default();
            config.governance.risk.factors.exploration[0].severity = 1.5;
            let warnings = config.validate().unwrap();
            assert!(warnings.iter().any(|w| w.field.contains("risk.factors")));
        }
    }

    // ── Loader ─────────────────────────────────────────────────

    mod loader {
        use std::io::Write;
        use std::path::Path;

        use noema_config::ConfigLoader;

        #[test]
        fn test_missing_file_falls_back_to_defaults() {
            let loader =
                ConfigLoader::load(Some(Path::new("/nonexistent/noema.toml"))).unwrap();
            assert_eq!(loader.get().scheduler.max_concurrent, 3);
        }

        #[test]
        fn test_load_and_reload_from_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("noema.toml");
            std::fs::write(&path, "[scheduler]\nmax_concurrent = 7\n").unwrap();

            let loader = ConfigLoader::load(Some(&path)).unwrap();
            assert_eq!(loader.get().scheduler.max_concurrent, 7);

            let mut file = std::fs::File::create(&path).unwrap();
            writeln!(file, "[scheduler]\nmax_concurrent = 9").unwrap();
            loader.reload().unwrap();
            assert_eq!(loader.get().scheduler.max_concurrent, 9);
        }

        #[test]
        fn test_invalid_toml_is_an_error() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("noema.toml");
            std::fs::write(&path, "[scheduler\nmax_concurrent = ").unwrap();
            assert!(ConfigLoader::load(Some(&path)).is_err());
        }

        #[test]
        fn test_invalid_values_fail_validation_on_load() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("noema.toml");
            std::fs::write(&path, "[scheduler]\nmax_concurrent = 0\n").unwrap();
            assert!(ConfigLoader::load(Some(&path)).is_err());
        }

        #[test]
        fn test_explicit_path_wins() {
            let path = Path::new("/tmp/custom-noema.toml");
            assert_eq!(ConfigLoader::resolve_path(Some(path)), path);
        }
    }
}
