//! suiact: turns a free-text request into a validated intent, resolves it
//! against Sui state, submits the Move call and reports one outcome.

pub mod actions;
pub mod bootstrap;
pub mod chain;
pub mod cli;
pub mod config;
pub mod error;
pub mod intent;
pub mod llm;
pub mod pipeline;
pub mod resolve;
pub mod settings;

pub use actions::ActionKind;
pub use config::Config;
pub use error::{Error, PipelineFailure, Result};
pub use pipeline::{Callback, Outcome, Pipeline};
