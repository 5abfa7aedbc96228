//! 配置校验模块
//!
//! 校验规则：
//! - print 数值范围 (chunk_read_lines >= 1, poll_interval_ms >= 1)
//! - timeout_ms >= poll_interval_ms
//! - chat.pattern 可编译为正则
//! - device_id 非空且唯一
//! - memobird.api_base 非空

use std::collections::HashSet;

use contracts::{ContractError, RelayBlueprint};
use regex::Regex;
use ::validator::Validate;

/// 校验 RelayBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    validate_print_ranges(blueprint)?;
    validate_print_timing(blueprint)?;
    validate_chat_pattern(blueprint)?;
    validate_devices(blueprint)?;
    validate_memobird(blueprint)?;
    Ok(())
}

/// 校验 derive 声明的数值范围
fn validate_print_ranges(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    let Err(errors) = blueprint.print.validate() else {
        return Ok(());
    };

    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.keys().collect();
    fields.sort();

    match fields.first() {
        Some(field) => {
            let message = field_errors[*field]
                .first()
                .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| "value out of range".to_string());
            Err(ContractError::config_validation(
                format!("print.{field}"),
                message,
            ))
        }
        None => Err(ContractError::config_validation("print", errors.to_string())),
    }
}

/// 校验轮询间隔与超时
fn validate_print_timing(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    let print = &blueprint.print;
    if print.timeout_ms < print.poll_interval_ms {
        return Err(ContractError::config_validation(
            "print.timeout_ms / print.poll_interval_ms",
            format!(
                "timeout_ms ({}) must be >= poll_interval_ms ({})",
                print.timeout_ms, print.poll_interval_ms
            ),
        ));
    }
    Ok(())
}

/// 校验聊天过滤正则 (为空表示未配置聊天中继)
fn validate_chat_pattern(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    let pattern = &blueprint.chat.pattern;
    if pattern.is_empty() {
        return Ok(());
    }
    Regex::new(pattern).map_err(|e| {
        ContractError::config_validation("chat.pattern", format!("invalid regex: {e}"))
    })?;
    Ok(())
}

/// 校验预注册设备
fn validate_devices(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, device) in blueprint.devices.iter().enumerate() {
        let id = device.device_id.trim();
        if id.is_empty() {
            return Err(ContractError::config_validation(
                format!("devices[{idx}].device_id"),
                "device_id cannot be empty",
            ));
        }
        if !seen.insert(id) {
            return Err(ContractError::config_validation(
                format!("devices[device_id={id}]"),
                "duplicate device_id",
            ));
        }
    }
    Ok(())
}

fn validate_memobird(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    if blueprint.memobird.api_base.trim().is_empty() {
        return Err(ContractError::config_validation(
            "memobird.api_base",
            "api_base cannot be empty",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::DeviceConfig;

    fn minimal_blueprint() -> RelayBlueprint {
        let mut bp = RelayBlueprint::default();
        bp.memobird.access_key = "ak".into();
        bp.chat.pattern = "^Lobby$".into();
        bp.devices = vec![DeviceConfig::new("bird-1")];
        bp
    }

    #[test]
    fn test_valid_config() {
        let bp = minimal_blueprint();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&RelayBlueprint::default()).is_ok());
    }

    #[test]
    fn test_zero_chunk_lines() {
        let mut bp = minimal_blueprint();
        bp.print.chunk_read_lines = 0;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("print.chunk_read_lines"), "got: {err}");
        assert!(err.contains(">= 1"), "got: {err}");
    }

    #[test]
    fn test_timeout_shorter_than_poll_interval() {
        let mut bp = minimal_blueprint();
        bp.print.poll_interval_ms = 5_000;
        bp.print.timeout_ms = 1_000;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("timeout_ms"), "got: {err}");
    }

    #[test]
    fn test_invalid_pattern() {
        let mut bp = minimal_blueprint();
        bp.chat.pattern = "(unclosed".into();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("invalid regex"), "got: {err}");
    }

    #[test]
    fn test_duplicate_device_id() {
        let mut bp = minimal_blueprint();
        bp.devices.push(DeviceConfig::new("bird-1"));
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("duplicate device_id"), "got: {err}");
    }

    #[test]
    fn test_blank_device_id() {
        let mut bp = minimal_blueprint();
        bp.devices.push(DeviceConfig::new("   "));
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("cannot be empty"), "got: {err}");
    }
}
