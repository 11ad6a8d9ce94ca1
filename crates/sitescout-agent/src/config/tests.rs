#[cfg(test)]
mod tests {
    use super::super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_path_precedence() {
        let explicit = Path::new("custom.toml");
        assert_eq!(resolve_path(Some(explicit), Some("env.toml".into())), PathBuf::from("custom.toml"));
        assert_eq!(resolve_path(None, Some("env.toml".into())), PathBuf::from("env.toml"));
        assert_eq!(resolve_path(None, Some(String::new())), PathBuf::from(DEFAULT_CONFIG_FILE));
        assert_eq!(resolve_path(None, None), PathBuf::from(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load(Some(&missing)).is_err());
    }

    #[test]
    fn test_load_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sitescout.toml");
        std::fs::write(
            &path,
            "[ranking]\nstrategy = \"narrative\"\n\n[llm]\nmax_batch = 3\n\n[scoring]\nflood_cap = 30.0\n",
        )
        .unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.ranking.strategy, RankingStrategy::Narrative);
        assert_eq!(config.llm.max_batch, 3);
        assert_eq!(config.llm.fallback_score, 30);
        assert_eq!(config.scoring.flood_cap, 30.0);
        assert_eq!(config.scoring.power_cap, 15.0);
    }

    #[test]
    fn test_overrides_win() {
        let overrides = Overrides {
            strategy: Some(RankingStrategy::Mock),
            export_path: Some(PathBuf::from("out.json")),
            format: Some(ExportFormat::Json),
        };
        let config = apply_overrides(ScoutConfig::default(), &overrides);
        assert_eq!(config.ranking.strategy, RankingStrategy::Mock);
        assert_eq!(config.export.path.as_deref(), Some("out.json"));
        assert_eq!(config.export.format, ExportFormat::Json);

        let untouched = apply_overrides(ScoutConfig::default(), &Overrides::default());
        assert_eq!(untouched.ranking.strategy, RankingStrategy::Deterministic);
        assert!(untouched.export.path.is_none());
    }

    #[test]
    fn test_api_key_prefers_config() {
        let settings = LlmSettings { api_key: Some("sk-config".into()), ..Default::default() };
        let key = resolve_api_key_with(&settings, |_| Some("sk-env".into())).unwrap();
        assert_eq!(key.expose_secret(), "sk-config");
    }

    #[test]
    fn test_api_key_env_order() {
        let settings = LlmSettings { api_key: Some("  ".into()), ..Default::default() };
        let key = resolve_api_key_with(&settings, |name| match name {
            "SITESCOUT_ANTHROPIC_API_KEY" => Some(String::new()),
            "ANTHROPIC_API_KEY" => Some("sk-generic".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(key.expose_secret(), "sk-generic");

        assert!(resolve_api_key_with(&LlmSettings::default(), |_| None).is_none());
    }
}
