use std::fs;
use std::path::{Path, PathBuf};

use datamask_core::{Context, ContextConfig};
use tracing::info;

use crate::CliError;

/// A parsed configuration file and the directory its relative paths hang off.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: ContextConfig,
    pub base_dir: PathBuf,
}

impl LoadedConfig {
    pub fn build_context(&self) -> Result<Context, CliError> {
        let context = self.config.build(&self.base_dir)?;
        info!(datasources = context.len(), "context built");
        Ok(context)
    }
}

pub fn load_config(path: &Path) -> Result<LoadedConfig, CliError> {
    let contents = fs::read_to_string(path)?;
    let config = parse_config(&contents)?;
    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    Ok(LoadedConfig { config, base_dir })
}

pub fn parse_config(contents: &str) -> Result<ContextConfig, CliError> {
    Ok(toml::from_str(contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use datamask_core::FileFormat;

    const SAMPLE: &str = r#"
[options]
max_depth = 16

[[datasource]]
name = "firstname"
values = ["Ana", "Bruno"]

[[datasource]]
name = "city"
file = "cities.data"
format = "json"

[[datasource]]
name = "greeting"
rules = ["Hello {{firstname}}", "Hi {{nickname}}"]
"#;

    #[test]
    fn parses_datasource_tables() {
        let config = parse_config(SAMPLE).expect("config");
        assert_eq!(config.options.max_depth, 16);
        assert!(!config.options.unique_names);
        assert_eq!(config.datasources.len(), 3);
        assert_eq!(config.datasources[0].values, vec!["Ana", "Bruno"]);
        assert_eq!(config.datasources[1].format, Some(FileFormat::Json));
        assert_eq!(config.datasources[2].rules.len(), 2);
    }

    #[test]
    fn options_default_when_absent() {
        let config = parse_config("[[datasource]]\nname = \"x\"\n").expect("config");
        assert_eq!(config.options.max_depth, 64);
    }

    #[test]
    fn rejects_unknown_format() {
        let result = parse_config("[[datasource]]\nname = \"x\"\nfile = \"a\"\nformat = \"csv\"\n");
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
