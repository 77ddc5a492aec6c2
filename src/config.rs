use std::collections::HashMap;
use std::env;
use std::fs;

/// KEY=VALUE config file with `#` comments and optional `export ` prefixes.
/// Environment variables win over file entries so a deployment can override
/// single keys.
#[derive(Debug, Default, Clone)]
pub struct AppConfig {
    values: HashMap<String, String>,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self, String> {
        let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
        Self::parse(&content)
    }

    fn parse(content: &str) -> Result<Self, String> {
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
            let key = key.trim();
            let mut value = value.trim().to_string();
            if (value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\''))
            {
                value = value[1..value.len() - 1].to_string();
            }
            values.insert(key.to_string(), value);
        }
        Ok(Self { values })
    }

    pub fn lookup(&self, key: &str) -> Option<String> {
        env::var(key).ok().or_else(|| self.values.get(key).cloned())
    }

    pub fn require(&self, key: &str) -> String {
        self.lookup(key)
            .unwrap_or_else(|| panic!("{} must be set in the environment or config file", key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_handles_comments_exports_and_quotes() {
        let config = AppConfig::parse(
            "# comment\n\
             export DISCORD_CLIENT_SECRET=\"abc\"\n\
             RUN_MODE=cli\n",
        )
        .unwrap();
        assert_eq!(
            config.values.get("DISCORD_CLIENT_SECRET"),
            Some(&"abc".to_string())
        );
        assert_eq!(config.values.get("RUN_MODE"), Some(&"cli".to_string()));
    }

    #[test]
    fn parse_rejects_malformed_lines() {
        assert!(AppConfig::parse("no equals sign").is_err());
    }
}
