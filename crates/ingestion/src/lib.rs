//! # Ingestion
//!
//! Text ingestion module.
//!
//! Responsibilities:
//! - Read files line by line behind the `LineSource` pause/resume contract
//! - Sanitise raw lines (trim, drop blanks)
//! - Read chat bridge events and hand messages to a `MessageConsumer`
//! - Filter chat messages and render them with the print template
//!
//! ## Usage Example
//!
//! ```ignore
//! use contracts::LineSource;
//! use ingestion::{clean_line, FileLineSource, LineSourceConfig};
//!
//! let mut source = FileLineSource::open("book.txt", LineSourceConfig::default()).await?;
//! while let Some(raw) = source.next_line().await? {
//!     if let Some(line) = clean_line(&raw) {
//!         // buffer line
//!     }
//! }
//! ```

pub mod chat;
mod config;
mod error;
mod file_source;
mod memory_source;
mod sanitize;

// Re-exports
pub use chat::{
    login_url, print_template, render_message, strip_tags, ChatEvent, ChatSourceStats,
    JsonLinesChatSource, MessageFilter,
};
pub use config::{IngestionMetrics, LineSourceConfig, MetricsSnapshot};
pub use contracts::{LineSource, LocalLineSource};
pub use error::{IngestionError, Result};
pub use file_source::FileLineSource;
pub use memory_source::{MemoryLineSource, SourceEvent};
pub use sanitize::clean_line;
