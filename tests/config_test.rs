use clap::Parser;
use fakeql::cli::Cli;
use fakeql::config::Settings;
use fakeql::faker::Locale;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_layered_configuration() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();

    let fakeql_toml = r#"
[server]
host = "127.0.0.1"
port = 3000

[schema]
file = "from-file.graphql"

[faker.types.float]
min = 1.5
max = 2.5
precision = 0.1
"#;
    let config_path = root.join("fakeql.toml");
    fs::write(&config_path, fakeql_toml)?;

    // Environment beats the file
    std::env::set_var("FAKEQL_SERVER__PORT", "4000");
    std::env::set_var("FAKEQL_FAKER__LOCALE", "zh_TW");
    let settings = Settings::load(&config_path);
    std::env::remove_var("FAKEQL_SERVER__PORT");
    std::env::remove_var("FAKEQL_FAKER__LOCALE");
    let settings = settings?;

    assert_eq!(settings.server.port, 4000);
    assert_eq!(settings.faker.locale, Locale::ZhTw);
    assert_eq!(settings.faker.types.float.min, 1.5);
    assert_eq!(settings.schema_file().to_str(), Some("from-file.graphql"));

    // CLI beats both
    let cli = Cli::parse_from([
        "fakeql",
        "cli.graphql",
        "--config",
        config_path.to_str().unwrap(),
        "--port",
        "5000",
    ]);
    let settings = Settings::new_with_cli(&cli)?;
    assert_eq!(settings.server.port, 5000);
    assert_eq!(settings.schema_file().to_str(), Some("cli.graphql"));

    Ok(())
}

#[test]
fn test_invalid_configuration_reports_every_problem() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("fakeql.toml");
    fs::write(
        &config_path,
        r#"
[server]
host = ""

[proxy]
url = "localhost:4000"
headers = ["missing separator"]
"#,
    )?;

    let cli = Cli::parse_from(["fakeql", "--config", config_path.to_str().unwrap()]);
    let err = Settings::new_with_cli(&cli).unwrap_err().to_string();

    assert!(err.contains("server.host"), "{err}");
    assert!(err.contains("proxy.url"), "{err}");
    assert!(err.contains("proxy.headers[0]"), "{err}");
    Ok(())
}
