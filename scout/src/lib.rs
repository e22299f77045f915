#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod agent;
pub mod config;
pub mod elastic;
mod error;
mod format;
pub mod openai;
mod prompt;
mod query;
pub mod tools;

pub use agent::{Agent, ChatBackend, Message, Reply, ToolCall};
pub use config::Config;
pub use elastic::{ConnectivityStatus, Elastic, Product, SearchBackend};
pub use error::SearchError;
pub use format::{format_results, NO_RESULTS};
pub use openai::AzureOpenAI;
pub use prompt::system_prompt;
pub use query::{build_search_request, DateRange, MAX_RESULTS};
pub use tools::{Tool, ToolRegistry, ToolSpec};
