//! Integration tests for flagstaff-config

use flagstaff_config::*;
use std::io::Write;

#[test]
fn test_dotenv_source() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# overrides for local runs").unwrap();
    writeln!(file, "FLAG_NEWDASHBOARD=true").unwrap();
    writeln!(file, "FLAGSTAFF_ENVIRONMENT=staging").unwrap();

    let source = MapSource::from_dotenv(file.path()).unwrap();
    assert_eq!(source.get("FLAG_NEWDASHBOARD").as_deref(), Some("true"));

    let settings = EngineSettings::from_source(&source).unwrap();
    assert_eq!(settings.environment, "staging");
}

#[test]
fn test_dotenv_missing_file() {
    let result = MapSource::from_dotenv("/nonexistent/flagstaff/.env");
    assert!(matches!(result, Err(ConfigError::LoadError(_))));
}

#[test]
fn test_load_toml_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[maintenanceMode]").unwrap();
    writeln!(file, "default_value = false").unwrap();
    writeln!(file, "description = \"Read-only mode\"").unwrap();

    let loader = ConfigLoader::auto(file.path()).unwrap();
    let value = loader.load_file(file.path()).unwrap();
    assert_eq!(value["maintenanceMode"]["description"], "Read-only mode");
}

#[test]
fn test_load_missing_file_is_io_error() {
    let loader = ConfigLoader::new(FileFormat::Json);
    let result = loader.load_file("/nonexistent/flags.json");
    assert!(matches!(result, Err(ConfigError::IoError(_))));
}

#[test]
fn test_layered_settings() {
    let source = LayeredSource::new()
        .layer(MapSource::new().with("APP_ENV", "production"))
        .layer(EnvSource::new());

    let settings = EngineSettings::from_source(&source).unwrap();
    assert_eq!(settings.environment, "production");
    assert_eq!(settings.override_prefix, "FLAG_");
}

#[test]
fn test_config_error_display() {
    let err = ConfigError::ValidationError("percentage out of range".to_string());
    assert!(err.to_string().contains("percentage out of range"));
}
