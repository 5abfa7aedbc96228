//! ChatRelay - 聊天消息到打印机的转发
//!
//! 事件源每收到一条消息调用一次 [`MessageConsumer::on_message`]；通过过滤器的
//! 文本消息按模板渲染后交给 Dispatcher。

use contracts::{ChatConfig, ChatMessage, DeliveryOutcome, MessageConsumer, PrintDevice};
use ingestion::{render_message, MessageFilter};
use tracing::{debug, info, instrument};

use crate::dispatcher::Dispatcher;
use crate::error::{DispatcherError, Result};

/// 转发统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// 通过过滤并已投递的消息
    pub relayed: usize,
    /// 被过滤掉的消息
    pub ignored: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// 聊天转发器
pub struct ChatRelay<'a, D> {
    dispatcher: &'a Dispatcher<D>,
    filter: MessageFilter,
    stats: RelayStats,
    outcomes: Vec<DeliveryOutcome>,
}

impl<'a, D: PrintDevice> ChatRelay<'a, D> {
    pub fn new(dispatcher: &'a Dispatcher<D>, filter: MessageFilter) -> Self {
        Self {
            dispatcher,
            filter,
            stats: RelayStats::default(),
            outcomes: Vec::new(),
        }
    }

    /// 由 `[chat]` 配置构建
    ///
    /// # Errors
    /// - `MissingChatPattern`: pattern 为空
    /// - 正则无法编译
    pub fn from_config(dispatcher: &'a Dispatcher<D>, config: &ChatConfig) -> Result<Self> {
        if config.pattern.trim().is_empty() {
            return Err(DispatcherError::MissingChatPattern);
        }
        let filter = MessageFilter::from_config(config)?;
        Ok(Self::new(dispatcher, filter))
    }

    pub fn stats(&self) -> &RelayStats {
        &self.stats
    }

    /// 所有投递结果 (按消息顺序)
    pub fn outcomes(&self) -> &[DeliveryOutcome] {
        &self.outcomes
    }
}

impl<D: PrintDevice + Sync> MessageConsumer for ChatRelay<'_, D> {
    #[instrument(
        name = "chat_relay_on_message",
        skip(self, message),
        fields(sender = %message.sender)
    )]
    async fn on_message(&mut self, message: ChatMessage) {
        if !self.filter.matches(&message) {
            debug!(room = ?message.room_topic, "message ignored");
            self.stats.ignored += 1;
            observability::record_message_ignored();
            return;
        }

        let text = render_message(&message);
        info!(room = ?message.room_topic, "relaying message");
        observability::record_message_relayed(self.filter.is_room_mode());

        let outcome = self.dispatcher.send(&text).await;
        self.stats.relayed += 1;
        if outcome.is_success() {
            self.stats.delivered += 1;
        } else if outcome.is_failure() {
            self.stats.failed += 1;
        }
        self.outcomes.push(outcome);
    }
}
