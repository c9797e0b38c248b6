//! Tests for configuration

#[cfg(test)]
mod tests {
    use super::super::config::*;
    use chrono::NaiveDate;
    use std::io::Write;

    #[test]
    fn test_model_config_default() {
        let config = ModelConfig::default();
        assert_eq!(config.feature_window, 20);
        assert_eq!(config.min_valid_rows, 150);
        assert_eq!(config.horizon, 5);
        assert_eq!(config.n_trees, 100);
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.learning_rate, 0.05);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_report_config_default() {
        let config = ReportConfig::default();
        assert_eq!(config.top_n, 5);
        assert_eq!(config.max_chars, 500);
        assert!(config.disclaimer.is_some());
        assert!(config.promo.is_none());
    }

    #[test]
    fn test_publish_config_defaults() {
        let config: PublishConfig = toml::from_str("").unwrap();
        assert_eq!(config.base_url, "https://graph.threads.net/v1.0");
        assert_eq!(config.settle_delay_secs, 30);
        assert_eq!(config.settle_delay(), std::time::Duration::from_secs(30));
        assert!(config.access_token.is_none());
        assert!(config.require_token().is_err());
    }

    #[test]
    fn test_publish_config_with_token() {
        let toml_str = r#"
access_token = "tok"
user_id = "1789"
settle_delay_secs = 5
"#;
        let config: PublishConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.require_token().unwrap(), "tok");
        assert_eq!(config.user_id, Some("1789".to_string()));
        assert_eq!(config.settle_delay_secs, 5);
    }

    #[test]
    fn test_universe_symbols_dedup_benchmarks_first() {
        let toml_str = r#"
benchmarks = ["0050.TW", "2330.TW"]
watchlist = ["2317.TW", "2330.TW", "2454.TW"]
"#;
        let config: UniverseConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.market, "TW");
        assert_eq!(
            config.symbols(),
            vec!["0050.TW", "2330.TW", "2317.TW", "2454.TW"]
        );
    }

    #[test]
    fn test_calendar_config_holidays() {
        let toml_str = r#"
holidays = ["2025-01-01", "2025-02-28"]
"#;
        let config: CalendarConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.holidays.len(), 2);
        assert_eq!(config.holidays[1], NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
    }

    #[test]
    fn test_history_path_expands_tilde() {
        let config = HistoryConfig {
            path: "~/history.csv".to_string(),
        };
        let resolved = config.resolved_path();
        assert!(!resolved.to_string_lossy().starts_with('~'));
        assert!(resolved.to_string_lossy().ends_with("history.csv"));
    }

    #[test]
    fn test_validate_rejects_too_many_trees() {
        let mut config = Config::default();
        config.model.n_trees = 500;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_model_params() {
        let cases: Vec<fn(&mut ModelConfig)> = vec![
            |m: &mut ModelConfig| m.learning_rate = 0.0,
            |m: &mut ModelConfig| m.learning_rate = 1.5,
            |m: &mut ModelConfig| m.subsample = 0.0,
            |m: &mut ModelConfig| m.max_depth = 0,
            |m: &mut ModelConfig| m.min_samples_leaf = 0,
            |m: &mut ModelConfig| m.feature_window = 0,
            |m: &mut ModelConfig| m.horizon = 0,
        ];
        for tweak in cases {
            let mut config = Config::default();
            tweak(&mut config.model);
            assert!(config.validate().is_err());
        }
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_load_rejects_zero_learning_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.toml");
        std::fs::write(&path, "[model]\nlearning_rate = 0.0\n").unwrap();
        assert!(Config::load(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_universe() {
        let mut config = Config::default();
        config.universe.benchmarks.clear();
        config.universe.watchlist.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[universe]
benchmarks = ["SPY"]
watchlist = ["AAPL", "MSFT"]

[report]
top_n = 3
promo = "More at https://example.com"

[publish]
access_token = "from-file"
"#
        )
        .unwrap();

        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.universe.benchmarks, vec!["SPY"]);
        assert_eq!(config.universe.watchlist.len(), 2);
        assert_eq!(config.report.top_n, 3);
        assert_eq!(config.report.max_chars, 500);
        assert_eq!(config.publish.access_token.as_deref(), Some("from-file"));
        assert_eq!(config.model.seed, 42);
    }
}
