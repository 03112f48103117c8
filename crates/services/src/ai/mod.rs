//! Remote text generation and the typed gateway built on top of it.

mod client;
mod config;
mod gateway;
mod json;
mod prompts;

pub use client::{ChatCompletionsClient, TextGenerator};
pub use config::AiConfig;
pub use gateway::AiGateway;
pub use json::extract_json;
pub use prompts::{SYSTEM_INSTRUCTION, evaluation_prompt, question_prompt};
