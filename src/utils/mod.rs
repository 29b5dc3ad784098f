use std::path::Path;

use anyhow::{Context, Result};
use config::{Environment, File, FileFormat};
use tracing::info;

use crate::models::common::Config;

const ENV_PREFIX: &str = "MAPPER";

/// Loads the YAML config at `path`, then applies `MAPPER_*` environment
/// overrides. Nested keys use a double underscore: `MAPPER_METRICS__PORT`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    info!("Config path: {}", path.to_string_lossy());

    let source = path
        .to_str()
        .with_context(|| format!("config path is not valid UTF-8: {}", path.display()))?;

    let mut config: Config = config::Config::builder()
        .add_source(File::new(source, FileFormat::Yaml))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("failed to read config file")?
        .try_deserialize()
        .context("failed to parse config YAML")?;

    // Metric labels use underscores
    config.network_name = config.network_name.replace('-', "_");

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const CONFIG: &str = "\
network_name: avalanche-c
input_dir: data/bundles
output_dir: data/operations
poll_interval_ms: 500
metrics:
  enabled: false
  address: 0.0.0.0
  port: 9100
";

    #[test]
    fn loads_yaml_config() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.network_name, "avalanche_c");
        assert_eq!(config.input_dir, "data/bundles");
        assert_eq!(config.poll_interval_ms, 500);
        assert!(!config.metrics.enabled);
        assert_eq!(config.metrics.port, 9100);
    }

    #[test]
    fn missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(dir.path().join("absent.yml")).is_err());
    }
}
