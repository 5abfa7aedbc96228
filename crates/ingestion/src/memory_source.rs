//! 内存行源
//!
//! 用于测试：预置行序列，可在指定位置注入读取错误，并记录 pause/resume 调用。

use std::collections::VecDeque;

use contracts::{ContractError, LineSource};

/// 行源上发生的控制事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEvent {
    /// 在已交付 `after_lines` 行后暂停
    Pause { after_lines: usize },
    /// 在已交付 `after_lines` 行后恢复
    Resume { after_lines: usize },
}

/// 内存行源
#[derive(Debug, Default)]
pub struct MemoryLineSource {
    name: String,
    lines: VecDeque<String>,
    delivered: usize,
    fail_after: Option<usize>,
    paused: bool,
    events: Vec<SourceEvent>,
    reads_while_paused: usize,
}

impl MemoryLineSource {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: "memory".to_string(),
            lines: lines.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// 交付 `n` 行之后返回读取错误
    pub fn fail_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 记录的 pause/resume 事件
    pub fn events(&self) -> &[SourceEvent] {
        &self.events
    }

    /// 暂停状态下被读取的次数 (正确的消费者应为 0)
    pub fn reads_while_paused(&self) -> usize {
        self.reads_while_paused
    }

    pub fn delivered(&self) -> usize {
        self.delivered
    }
}

impl LineSource for MemoryLineSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn next_line(&mut self) -> Result<Option<String>, ContractError> {
        if self.paused {
            self.reads_while_paused += 1;
        }
        if self.fail_after == Some(self.delivered) {
            return Err(ContractError::source_read(
                &self.name,
                "injected read failure",
            ));
        }
        let line = self.lines.pop_front();
        if line.is_some() {
            self.delivered += 1;
        }
        Ok(line)
    }

    fn pause(&mut self) {
        self.paused = true;
        self.events.push(SourceEvent::Pause {
            after_lines: self.delivered,
        });
    }

    fn resume(&mut self) {
        self.paused = false;
        self.events.push(SourceEvent::Resume {
            after_lines: self.delivered,
        });
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_yields_lines_then_none() {
        let mut source = MemoryLineSource::new(["a", "b"]);
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("a"));
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("b"));
        assert_eq!(source.next_line().await.unwrap(), None);
        assert_eq!(source.delivered(), 2);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let mut source = MemoryLineSource::new(["a", "b"]).fail_after(1);
        assert!(source.next_line().await.unwrap().is_some());
        assert!(source.next_line().await.is_err());
    }

    #[tokio::test]
    async fn test_records_events() {
        let mut source = MemoryLineSource::new(["a"]);
        source.next_line().await.unwrap();
        source.pause();
        source.resume();
        assert_eq!(
            source.events(),
            &[
                SourceEvent::Pause { after_lines: 1 },
                SourceEvent::Resume { after_lines: 1 }
            ]
        );
        assert_eq!(source.reads_while_paused(), 0);
    }
}
