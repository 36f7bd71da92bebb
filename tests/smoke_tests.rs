use birthday_importer::components::roster::load_roster;
use birthday_importer::config::Config;
use birthday_importer::error::Error;
use birthday_importer::importer;
use chrono::NaiveDate;
use std::fs;
use tempfile::TempDir;

fn config_with_roster(dir: &TempDir, csv: &str) -> Config {
    let input_path = dir.path().join("birthdays.csv");
    fs::write(&input_path, csv).unwrap();
    Config {
        input_path,
        token_path: dir.path().join("token.json"),
        client_secret_path: dir.path().join("credentials.json"),
        ..Config::default()
    }
}

/// Smoke test to verify that the default config is usable
#[test]
fn test_default_config_is_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.target_calendar_name, "Cornell Assistive Technologies Subteam Calendar");
}

/// Roster files load from disk
#[test]
fn test_roster_loads_from_file() {
    let dir = TempDir::new().unwrap();
    let config = config_with_roster(
        &dir,
        "First and Last Name,Birthday!! YAY\nAda Lovelace,12/10/1815\n,\n",
    );

    let rows = load_roster(&config).unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Ada Lovelace");
    assert_eq!(rows[0].birth_date, NaiveDate::from_ymd_opt(1815, 12, 10).unwrap());
}

/// A missing input file aborts the run
#[tokio::test]
async fn test_run_without_input_file() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        input_path: dir.path().join("missing.csv"),
        ..Config::default()
    };

    let err = importer::run(&config).await.unwrap_err();
    assert!(matches!(err, Error::FileNotFound(_)));
}

/// Schema errors abort before any authorization is attempted
#[tokio::test]
async fn test_run_aborts_on_missing_column_before_authorizing() {
    let dir = TempDir::new().unwrap();
    let config =
        config_with_roster(&dir, "First and Last Name,Birthday\nAda Lovelace,12/10/1815\n");

    let err = importer::run(&config).await.unwrap_err();

    match err {
        Error::Schema { column, found } => {
            assert_eq!(column, "Birthday!! YAY");
            assert_eq!(found, vec!["First and Last Name", "Birthday"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!config.token_path.exists());
}

/// One malformed date fails the whole run
#[tokio::test]
async fn test_run_aborts_on_bad_date() {
    let dir = TempDir::new().unwrap();
    let config = config_with_roster(
        &dir,
        "First and Last Name,Birthday!! YAY\nAda Lovelace,12/10/1815\nBad,13/45/2000\n",
    );

    let err = importer::run(&config).await.unwrap_err();
    assert!(matches!(err, Error::DateParse { .. }));
}
