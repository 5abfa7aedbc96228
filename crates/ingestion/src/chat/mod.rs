//! Chat side of ingestion: event stream, filtering, print template

mod events;
mod filter;
mod template;

pub use events::{login_url, ChatEvent, ChatSourceStats, JsonLinesChatSource};
pub use filter::{strip_tags, MessageFilter};
pub use template::{print_template, render_message};
