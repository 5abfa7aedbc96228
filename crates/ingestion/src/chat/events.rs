//! 聊天事件源
//!
//! 聊天协议运行在外部桥接进程中，桥接进程把事件以 JSON Lines 写到
//! stdin 或文件，每行一个事件：
//!
//! ```text
//! {"event":"scan","url":"https://login.weixin.qq.com/qrcode/abc","code":0}
//! {"event":"login","user":"alice"}
//! {"event":"message","sender":"bob","room_topic":"Lobby","content":"hi","kind":1}
//! {"event":"logout","user":"alice"}
//! ```

use std::path::Path;

use contracts::{ChatMessage, MessageConsumer};
use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, info, instrument, warn};

use crate::error::{IngestionError, Result};

/// 扫码登录返回码：已扫码 / 已确认
const SCAN_CODES_CONFIRMED: [u32; 2] = [200, 201];

/// 桥接进程发出的事件
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChatEvent {
    /// 登录二维码
    Scan {
        url: String,
        #[serde(default)]
        code: u32,
    },
    Login {
        user: String,
    },
    Logout {
        user: String,
    },
    Message(ChatMessage),
}

/// 等待扫码时可直接在浏览器打开的登录链接
///
/// 已扫码 (200/201) 时返回 `None`。
pub fn login_url(url: &str, code: u32) -> Option<String> {
    (!SCAN_CODES_CONFIRMED.contains(&code)).then(|| url.replacen("/qrcode/", "/l/", 1))
}

/// 事件源统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatSourceStats {
    pub events: u64,
    pub messages: u64,
    pub invalid: u64,
}

/// JSON Lines 聊天事件源
pub struct JsonLinesChatSource<R> {
    name: String,
    lines: Lines<R>,
    line_no: u64,
    stats: ChatSourceStats,
}

impl<R: AsyncBufRead + Unpin> JsonLinesChatSource<R> {
    pub fn new(name: impl Into<String>, reader: R) -> Self {
        Self {
            name: name.into(),
            lines: reader.lines(),
            line_no: 0,
            stats: ChatSourceStats::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stats(&self) -> &ChatSourceStats {
        &self.stats
    }

    /// 读取下一个事件
    ///
    /// 空行跳过；无法解析的行记录警告后跳过。输入结束返回 `Ok(None)`。
    ///
    /// # Errors
    /// 底层输入读取失败
    pub async fn next_event(&mut self) -> Result<Option<ChatEvent>> {
        loop {
            let Some(line) = self
                .lines
                .next_line()
                .await
                .map_err(|e| IngestionError::read(&self.name, e))?
            else {
                return Ok(None);
            };
            self.line_no += 1;

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<ChatEvent>(line) {
                Ok(event) => {
                    self.stats.events += 1;
                    return Ok(Some(event));
                }
                Err(e) => {
                    self.stats.invalid += 1;
                    let err = IngestionError::InvalidEvent {
                        line_no: self.line_no,
                        message: e.to_string(),
                    };
                    warn!(source = %self.name, error = %err, "skipping chat event");
                }
            }
        }
    }

    /// 读取全部事件，消息交给 consumer，其余事件记录日志
    ///
    /// consumer 按顺序逐条处理，前一条处理完才读取下一条。
    #[instrument(name = "chat_source_run", skip(self, consumer), fields(source = %self.name))]
    pub async fn run<C: MessageConsumer>(&mut self, consumer: &mut C) -> Result<ChatSourceStats> {
        info!("listening for chat events");
        while let Some(event) = self.next_event().await? {
            match event {
                ChatEvent::Scan { url, code } => {
                    if let Some(login) = login_url(&url, code) {
                        info!(code, login_url = %login, "scan the QR code or open the login url");
                    }
                    info!(code, url = %url, "scan");
                }
                ChatEvent::Login { user } => info!(user = %user, "login"),
                ChatEvent::Logout { user } => info!(user = %user, "logout"),
                ChatEvent::Message(message) => {
                    self.stats.messages += 1;
                    debug!(sender = %message.sender, room = ?message.room_topic, "message");
                    consumer.on_message(message).await;
                }
            }
        }
        info!(
            events = self.stats.events,
            messages = self.stats.messages,
            invalid = self.stats.invalid,
            "chat event stream ended"
        );
        Ok(self.stats.clone())
    }
}

impl JsonLinesChatSource<BufReader<Stdin>> {
    /// 从标准输入读取事件
    pub fn stdin() -> Self {
        Self::new("stdin", BufReader::new(tokio::io::stdin()))
    }
}

impl JsonLinesChatSource<BufReader<File>> {
    /// 从文件读取事件
    ///
    /// # Errors
    /// 文件无法打开
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let file = File::open(path)
            .await
            .map_err(|e| IngestionError::open(&name, e))?;
        Ok(Self::new(name, BufReader::new(file)))
    }
}
