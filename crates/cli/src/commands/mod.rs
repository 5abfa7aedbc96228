//! Command implementations.

mod chat;
mod info;
mod menu;
mod print_file;
mod validate;

pub use chat::run_chat;
pub use info::run_info;
pub use menu::run_menu;
pub use print_file::run_print_file;
pub use validate::run_validate;
