//! 配置解析模块
//!
//! 支持 TOML (主要) 和 JSON (可选) 格式。

use contracts::{ContractError, RelayBlueprint};

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML 格式 (推荐)
    Toml,
    /// JSON 格式
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// 解析 TOML 格式配置
pub fn parse_toml(content: &str) -> Result<RelayBlueprint, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 解析 JSON 格式配置
pub fn parse_json(content: &str) -> Result<RelayBlueprint, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 根据格式解析配置
pub fn parse(content: &str, format: ConfigFormat) -> Result<RelayBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ChunkPolicy, DeliveryMode};

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[memobird]
access_key = "ak-123"

[chat]
room = true
pattern = "^Lobby$"

[print]
chunk_read_lines = 10
chunk_policy = "concurrent"
delivery_mode = "complete"

[[devices]]
device_id = "bird-1"
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.memobird.access_key, "ak-123");
        assert_eq!(bp.memobird.api_base, "http://open.memobird.cn/home");
        assert_eq!(bp.print.chunk_read_lines, 10);
        assert_eq!(bp.print.chunk_policy, ChunkPolicy::Concurrent);
        assert_eq!(bp.print.delivery_mode, DeliveryMode::Complete);
        assert_eq!(bp.print.settle_delay_ms, 20_000);
        assert_eq!(bp.devices.len(), 1);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "memobird": { "access_key": "ak-123" },
            "chat": { "room": false, "pattern": "^alice$" },
            "devices": [{ "device_id": "bird-1", "user_identifying": "u-1" }]
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert!(!bp.chat.room);
        assert_eq!(bp.devices[0].user_identifying.as_deref(), Some("u-1"));
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_unknown_policy_is_parse_error() {
        let content = r#"
[print]
chunk_policy = "sideways"
"#;
        assert!(parse_toml(content).is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
