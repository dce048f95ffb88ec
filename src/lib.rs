//! Licensing and prompt-rewrite backend for the Prompt QA Copilot browser
//! extension.
//!
//! The server ingests LemonSqueezy webhook events, derives a per-user license
//! record from them, and gates the prompt-rewrite endpoints on that record.

pub mod ai;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod lemonsqueezy;
pub mod models;
