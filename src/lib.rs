//! A chat assistant that can call tools: read the clock, fetch a to-do item,
//! and add, toggle and inspect lamps in a small in-memory home.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod core;
pub mod display;
pub mod home;
pub mod input;
pub mod providers;
pub mod todo;
pub mod tools;

pub use conversation::{Conversation, TurnPhase, TurnReport};
pub use core::error::{HomechatError, ToolError};
