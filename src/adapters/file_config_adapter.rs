//! INI file configuration adapter.

use crate::domain::error::SigtraderError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SigtraderError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| SigtraderError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, SigtraderError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| SigtraderError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[backtest]
symbols = SPY, DIA
start_date = 2020-01-01
end_date = 2021-12-31
risk_free_rate = 0.02

[strategy]
kind = mean_reversion_pairs
window = 60
z_entry = 2.0

[report]
save = yes
top_drawdowns = abc
"#;

    #[test]
    fn from_string_parses_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_string("backtest", "symbols"),
            Some("SPY, DIA".to_string())
        );
        assert_eq!(
            adapter.get_string("strategy", "kind"),
            Some("mean_reversion_pairs".to_string())
        );
        assert_eq!(adapter.get_string("strategy", "z_exit"), None);
        assert_eq!(adapter.get_string("portfolio", "kind"), None);
    }

    #[test]
    fn values_come_back_unparsed() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("strategy", "window"), Some("60".to_string()));
        assert_eq!(
            adapter.get_string("report", "top_drawdowns"),
            Some("abc".to_string())
        );
        assert_eq!(adapter.get_string("report", "missing"), None);
    }

    #[test]
    fn get_bool_accepts_common_spellings() {
        let adapter =
            FileConfigAdapter::from_string("[report]\na = true\nb = no\nc = 1\nd = maybe\n")
                .unwrap();
        assert!(adapter.get_bool("report", "a", false));
        assert!(!adapter.get_bool("report", "b", true));
        assert!(adapter.get_bool("report", "c", false));
        assert!(adapter.get_bool("report", "d", true));
        assert!(!adapter.get_bool("report", "missing", false));
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert!(adapter.get_bool("report", "save", false));
    }

    #[test]
    fn missing_file_is_a_config_parse_error() {
        let Err(err) = FileConfigAdapter::from_file("/nonexistent/path/sigtrader.ini") else {
            panic!("expected a parse error for a missing file");
        };
        assert!(matches!(err, SigtraderError::ConfigParse { .. }));
        assert!(err.is_configuration());
    }
}
