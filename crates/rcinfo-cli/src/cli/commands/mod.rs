//! CLI command handlers, one file per command.

mod bot;
mod lookup;
mod quota;
mod serve;

pub use bot::run_bot;
pub use lookup::{run_lookup, LookupOptions};
pub use quota::run_quota;
pub use serve::run_serve;
