//! 聊天消息过滤与清洗

use std::borrow::Cow;
use std::sync::OnceLock;

use contracts::{ChatConfig, ChatMessage};
use regex::Regex;

use crate::error::{IngestionError, Result};

/// 匹配 HTML 风格标签 (可跨行)
fn tag_regex() -> &'static Regex {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(r"<(?:.|\n)*?>").expect("tag pattern is valid"))
}

/// 去掉消息内容里的标签
pub fn strip_tags(content: &str) -> Cow<'_, str> {
    tag_regex().replace_all(content, "")
}

/// 消息过滤器
///
/// - 群聊模式 (`room = true`): 只接受群消息，且群名匹配正则
/// - 私聊模式 (`room = false`): 只接受私聊消息，且发送者名称匹配正则
///
/// 非文本消息一律忽略。
#[derive(Debug, Clone)]
pub struct MessageFilter {
    pattern: Regex,
    room: bool,
}

impl MessageFilter {
    /// # Errors
    /// 正则无法编译时返回 `IngestionError::InvalidPattern`
    pub fn new(pattern: &str, room: bool) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| IngestionError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { pattern, room })
    }

    pub fn from_config(config: &ChatConfig) -> Result<Self> {
        Self::new(&config.pattern, config.room)
    }

    pub fn is_room_mode(&self) -> bool {
        self.room
    }

    pub fn matches(&self, message: &ChatMessage) -> bool {
        if !message.kind.is_text() {
            return false;
        }
        match (message.room_topic.as_deref(), self.room) {
            (Some(topic), true) => self.pattern.is_match(topic),
            (None, false) => self.pattern.is_match(&message.sender),
            _ => false,
        }
    }
}
