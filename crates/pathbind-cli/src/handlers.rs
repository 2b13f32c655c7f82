//! Command handlers for the CLI
//!
//! Each subcommand has its own module; shared file and input helpers live
//! in `utils`.

mod bind;
mod check;
mod completions;
mod config;
mod resolve;
mod utils;

pub use bind::handle_bind;
pub use check::handle_check;
pub use completions::handle_completions;
pub use config::handle_config;
pub use resolve::handle_resolve;
