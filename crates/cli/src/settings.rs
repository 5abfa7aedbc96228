//! 配置解析：文件路径、缺省回退与环境变量覆盖

use std::path::{Path, PathBuf};

use config_loader::ConfigLoader;
use contracts::RelayBlueprint;
use tracing::{info, warn};

use crate::cli::Cli;
use crate::error::{CliError, Result};

/// 未指定 `--config` 时使用的路径
pub const DEFAULT_CONFIG_PATH: &str = "memo-relay.toml";

/// 配置来源
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub path: PathBuf,
    /// 由 `--config` / `MEMO_RELAY_CONFIG` 显式指定
    pub explicit: bool,
}

impl ConfigSource {
    pub fn from_cli(cli: &Cli) -> Self {
        match &cli.config {
            Some(path) => Self {
                path: path.clone(),
                explicit: true,
            },
            None => Self {
                path: PathBuf::from(DEFAULT_CONFIG_PATH),
                explicit: false,
            },
        }
    }
}

/// 加载配置并应用 CLI 覆盖
///
/// - 显式指定的文件不存在: `ConfigNotFound`
/// - 缺省路径不存在: 使用默认配置
/// - `access_key` 覆盖 `memobird.access_key`，覆盖后重新校验
pub fn load_blueprint(source: &ConfigSource, access_key: Option<&str>) -> Result<RelayBlueprint> {
    let mut blueprint = if source.path.exists() {
        info!(config = %source.path.display(), "Loading configuration");
        load_file(&source.path)?
    } else if source.explicit {
        return Err(CliError::config_not_found(&source.path));
    } else {
        warn!(
            config = %source.path.display(),
            "Configuration file not found, using defaults"
        );
        RelayBlueprint::default()
    };

    if let Some(key) = access_key.filter(|k| !k.is_empty()) {
        info!("Overriding memobird.access_key from environment/CLI");
        blueprint.memobird.access_key = key.to_string();
    }

    ConfigLoader::validate(&blueprint).map_err(|e| CliError::config_validation(e.to_string()))?;
    Ok(blueprint)
}

fn load_file(path: &Path) -> Result<RelayBlueprint> {
    ConfigLoader::load_from_path(path).map_err(|e| CliError::config_load(path, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn explicit(path: &Path) -> ConfigSource {
        ConfigSource {
            path: path.to_path_buf(),
            explicit: true,
        }
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = explicit(&dir.path().join("missing.toml"));

        assert!(matches!(
            load_blueprint(&source, None),
            Err(CliError::ConfigNotFound { .. })
        ));
    }

    #[test]
    fn test_implicit_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let source = ConfigSource {
            path: dir.path().join(DEFAULT_CONFIG_PATH),
            explicit: false,
        };

        let blueprint = load_blueprint(&source, Some("ak-env")).unwrap();
        assert_eq!(blueprint.memobird.access_key, "ak-env");
        assert_eq!(blueprint.print.chunk_read_lines, 40);
    }

    #[test]
    fn test_access_key_override() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[memobird]\naccess_key = \"from-file\"\n\n[print]\nchunk_read_lines = 3"
        )
        .unwrap();

        let source = explicit(file.path());
        assert_eq!(
            load_blueprint(&source, None).unwrap().memobird.access_key,
            "from-file"
        );
        let blueprint = load_blueprint(&source, Some("from-env")).unwrap();
        assert_eq!(blueprint.memobird.access_key, "from-env");
        assert_eq!(blueprint.print.chunk_read_lines, 3);
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[print]\nchunk_read_lines = 0").unwrap();

        let err = load_blueprint(&explicit(file.path()), None).unwrap_err();
        assert!(matches!(err, CliError::ConfigLoad { .. }));
    }
}
