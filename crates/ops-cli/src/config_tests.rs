use super::*;
use std::io::Write;

#[test]
fn missing_path_loads_every_table_at_its_default() {
    let config = OpsManagerConfig::load(None).expect("default config");
    assert_eq!(config.promotion.max_drill_age_hours, 24 * 30);
}

#[test]
fn partial_file_fills_remaining_tables_with_defaults() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    write!(file, "[promotion]\nrequireAuthorityContext = true\n").expect("write");
    let config = OpsManagerConfig::load(Some(file.path())).expect("load config");
    assert!(config.promotion.require_authority_context);
    assert_eq!(config.horizon.max_retries, 3);
}

#[test]
fn missing_file_on_disk_is_a_usage_error() {
    let err = OpsManagerConfig::load(Some(Path::new("/nonexistent/ops-manager.toml"))).expect_err("missing file");
    assert_eq!(err.code, crate::exit_error::USAGE);
}
