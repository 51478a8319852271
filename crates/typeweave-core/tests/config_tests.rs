use std::io::Write;

use typeweave_core::config::{
    DEFAULT_EXCLUDE_DIRS, DEFAULT_HIGH_CONFIDENCE, DEFAULT_MAX_FILE_SIZE, DEFAULT_MIN_SIMILARITY,
};
use typeweave_core::{Config, ConfigError, SimilarityWeights};

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.extraction.max_file_size, DEFAULT_MAX_FILE_SIZE);
    assert_eq!(config.extraction.exclude_dirs.len(), DEFAULT_EXCLUDE_DIRS.len());
    assert!(config.extraction.supplementary);
    assert_eq!(config.matching.min_similarity, DEFAULT_MIN_SIMILARITY);
    assert_eq!(config.matching.high_confidence, DEFAULT_HIGH_CONFIDENCE);
    assert_eq!(config.matching.weights, SimilarityWeights::default());
}

#[test]
fn test_config_from_toml() {
    let toml_str = r#"
[extraction]
include_private = true
max_file_size = 200000

[matching]
min_similarity = 70

[matching.weights]
name = 40
kind = 20
fields = 40
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert!(config.extraction.include_private);
    assert_eq!(config.extraction.max_file_size, 200000);
    assert!(config.extraction.supplementary);
    assert_eq!(config.matching.min_similarity, 70);
    assert_eq!(config.matching.high_confidence, DEFAULT_HIGH_CONFIDENCE);
    assert_eq!(config.matching.weights.fields, 40);
    assert!(config.validate().is_ok());
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[extraction]\nsupplementary = false").unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert!(!config.extraction.supplementary);
    assert_eq!(config.extraction.max_file_size, DEFAULT_MAX_FILE_SIZE);
}

#[test]
fn test_from_file_rejects_invalid_weights() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("typeweave.toml");
    std::fs::write(&path, "[matching.weights]\nname = 60\nkind = 30\nfields = 30\n").unwrap();

    let err = Config::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_from_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = Config::from_file(dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(missing, ConfigError::ReadError(_)));

    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[extraction\n").unwrap();
    let bad = Config::from_file(&path).unwrap_err();
    assert!(matches!(bad, ConfigError::ParseError(_)));
}

#[test]
fn test_default_config_string_round_trips() {
    let rendered = Config::default_config_string();
    let parsed: Config = toml::from_str(&rendered).unwrap();
    assert_eq!(parsed, Config::default());
}
