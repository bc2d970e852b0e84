use crate::model::Rule;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Defaults loaded from the TOML config file. Every key is optional and
/// command-line flags win over it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub rule: Option<Rule>,
    pub smooth: Option<usize>,
    pub latency_units: Option<String>,
    pub throughput_col: Option<String>,
    pub latency_col: Option<String>,
    pub delimiter: Option<String>,
    /// Worksheet name or index for spreadsheet input.
    pub sheet: Option<String>,
}

/// `<config_dir>/atp-knee/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("atp-knee").join("config.toml"))
}

pub fn parse_config_str(raw: &str, label: &str) -> Result<FileConfig> {
    let cfg: FileConfig =
        toml::from_str(raw).with_context(|| format!("invalid config file: {label}"))?;
    if cfg.smooth == Some(0) {
        return Err(anyhow!("invalid config file: {label}: smooth must be >= 1"));
    }
    Ok(cfg)
}

/// Load the config. An explicit path must exist; the default location is
/// optional and silently skipped when absent.
pub fn load_config(explicit: Option<&Path>) -> Result<FileConfig> {
    let (path, required) = match explicit {
        Some(p) => (p.to_path_buf(), true),
        None => match default_config_path() {
            Some(p) => (p, false),
            None => return Ok(FileConfig::default()),
        },
    };
    if !required && !path.exists() {
        debug!(path = %path.display(), "no config file");
        return Ok(FileConfig::default());
    }
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let cfg = parse_config_str(&raw, &path.display().to_string())?;
    debug!(path = %path.display(), ?cfg, "loaded config file");
    Ok(cfg)
}

/// Parse a delimiter argument: a single ASCII character, or `tab` / `\t`.
pub fn parse_delimiter(s: &str) -> Result<u8> {
    match s {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        _ => Err(anyhow!("delimiter must be a single ASCII character, got '{s}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_keys() {
        let cfg = parse_config_str(
            r#"
rule = "double_min"
smooth = 3
latency_units = "us"
throughput_col = "IOPS"
latency_col = "2"
delimiter = ";"
sheet = "runs"
"#,
            "test",
        )
        .unwrap();
        assert_eq!(cfg.rule, Some(Rule::DoubleMin));
        assert_eq!(cfg.smooth, Some(3));
        assert_eq!(cfg.latency_units.as_deref(), Some("us"));
        assert_eq!(cfg.throughput_col.as_deref(), Some("IOPS"));
        assert_eq!(cfg.delimiter.as_deref(), Some(";"));
        assert_eq!(cfg.sheet.as_deref(), Some("runs"));
    }

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(parse_config_str("", "test").unwrap(), FileConfig::default());
    }

    #[test]
    fn rejects_unknown_keys_and_zero_window() {
        assert!(parse_config_str("rules = \"midrange\"", "test").is_err());
        assert!(parse_config_str("smooth = 0", "test").is_err());
        assert!(parse_config_str("rule = \"median\"", "test").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn delimiter_forms() {
        assert_eq!(parse_delimiter(";").unwrap(), b';');
        assert_eq!(parse_delimiter("tab").unwrap(), b'\t');
        assert!(parse_delimiter(";;").is_err());
    }
}
