use crate::infrastructure::error::InfraError;
use chrono_tz::Tz;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const APP_JSON: &str = "app.json";

fn default_files() -> HashMap<&'static str, serde_json::Value> {
    HashMap::from([(
        APP_JSON,
        serde_json::json!({
            "schema": 1,
            "appName": "DayLoop",
            "timezone": "UTC"
        }),
    )])
}

pub fn ensure_default_configs(config_dir: &Path) -> Result<(), InfraError> {
    for (name, value) in default_files() {
        let path = config_dir.join(name);
        if !path.exists() {
            let formatted = serde_json::to_string_pretty(&value)?;
            fs::write(path, format!("{formatted}\n"))?;
        }
    }
    Ok(())
}

fn read_config(path: &Path) -> Result<serde_json::Value, InfraError> {
    let raw = fs::read_to_string(path)?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)?;
    let schema = parsed
        .get("schema")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| InfraError::InvalidConfig(format!("missing schema in {}", path.display())))?;
    if schema != 1 {
        return Err(InfraError::InvalidConfig(format!(
            "unsupported schema {} in {}",
            schema,
            path.display()
        )));
    }
    Ok(parsed)
}

pub fn read_timezone(config_dir: &Path) -> Result<Option<String>, InfraError> {
    let app = read_config(&config_dir.join(APP_JSON))?;
    Ok(app
        .get("timezone")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned))
}

/// Timezone anchoring "today" for schedules and day rollover. A missing or
/// unrecognized setting degrades to UTC rather than failing the caller.
pub fn resolve_timezone(config_dir: &Path) -> Tz {
    let Ok(Some(name)) = read_timezone(config_dir) else {
        return chrono_tz::UTC;
    };
    name.parse::<Tz>().unwrap_or(chrono_tz::UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static NEXT_TEMP_CONFIG: AtomicUsize = AtomicUsize::new(0);

    struct TempConfigDir {
        path: PathBuf,
    }

    impl TempConfigDir {
        fn new() -> Self {
            let sequence = NEXT_TEMP_CONFIG.fetch_add(1, Ordering::Relaxed);
            let path = std::env::temp_dir().join(format!(
                "dayloop-config-tests-{}-{}",
                std::process::id(),
                sequence
            ));
            fs::create_dir_all(&path).expect("create temp config dir");
            Self { path }
        }
    }

    impl Drop for TempConfigDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.path);
        }
    }

    #[test]
    fn defaults_are_written_once_and_read_back() {
        let dir = TempConfigDir::new();
        ensure_default_configs(&dir.path).expect("write defaults");
        assert_eq!(
            read_timezone(&dir.path).expect("read timezone"),
            Some("UTC".to_string())
        );

        // A second pass must not clobber user edits.
        fs::write(
            dir.path.join(APP_JSON),
            "{\"schema\":1,\"appName\":\"DayLoop\",\"timezone\":\"Asia/Tokyo\"}\n",
        )
        .expect("edit config");
        ensure_default_configs(&dir.path).expect("idempotent defaults");
        assert_eq!(resolve_timezone(&dir.path), chrono_tz::Asia::Tokyo);
    }

    #[test]
    fn unknown_timezone_degrades_to_utc() {
        let dir = TempConfigDir::new();
        fs::write(
            dir.path.join(APP_JSON),
            "{\"schema\":1,\"timezone\":\"Mars/Olympus\"}\n",
        )
        .expect("write config");
        assert_eq!(resolve_timezone(&dir.path), chrono_tz::UTC);
    }

    #[test]
    fn schema_mismatch_is_rejected() {
        let dir = TempConfigDir::new();
        fs::write(dir.path.join(APP_JSON), "{\"schema\":2}\n").expect("write config");
        assert!(read_timezone(&dir.path).is_err());
    }
}
