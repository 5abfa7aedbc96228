//! 打印模板

use chrono::{DateTime, TimeZone};
use contracts::ChatMessage;

use super::filter::strip_tags;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `<sender>  (<YYYY-MM-DD HH:mm:ss>):\n<text>`
pub fn print_template<Tz>(sender: &str, at: &DateTime<Tz>, text: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("{sender}  ({}):\n{text}", at.format(TIME_FORMAT))
}

/// 按模板渲染一条聊天消息 (内容先去标签)
pub fn render_message(message: &ChatMessage) -> String {
    print_template(
        &message.sender,
        &message.received_at,
        &strip_tags(&message.content),
    )
}
