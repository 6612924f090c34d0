use std::collections::HashMap;
use std::fs;

// Optional KEY=VALUE config file, named by the CONFIG_FILE env var.
// Recognized keys: OPENAI_API_KEY, CALENDAR_DB_PATH.
#[derive(Debug, Default, Clone)]
pub struct AppConfig {
    values: HashMap<String, String>,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self, String> {
        let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
        let mut values = HashMap::new();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(format!("Invalid config line {}: {}", idx + 1, line));
            };
            values.insert(key.trim().to_string(), unquote(value.trim()));
        }
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

fn unquote(value: &str) -> String {
    if value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
    {
        return value[1..value.len() - 1].to_string();
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parses_keys_and_skips_comments() {
        let file = write_config(
            "# calendar settings\nOPENAI_API_KEY=sk-test\nexport CALENDAR_DB_PATH=\"/tmp/cal.db\"\n\n",
        );
        let config = AppConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.get("OPENAI_API_KEY").as_deref(), Some("sk-test"));
        assert_eq!(config.get("CALENDAR_DB_PATH").as_deref(), Some("/tmp/cal.db"));
        assert_eq!(config.get("MISSING"), None);
    }

    #[test]
    fn rejects_lines_without_equals() {
        let file = write_config("OPENAI_API_KEY\n");
        assert!(AppConfig::from_file(file.path().to_str().unwrap()).is_err());
    }
}
