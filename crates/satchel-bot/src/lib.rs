//! Conversation engine and reminder scheduling for the assignment bot.
//!
//! The engine is transport-free: the server feeds it decoded webhook
//! updates and it talks back through the [`client::BotApi`] trait, so the
//! whole flow can run against an in-memory fake in tests.

pub mod client;
pub mod dates;
pub mod error;
pub mod notify;
pub mod router;
pub mod sweeper;

mod callbacks;
mod commands;
mod conversation;
mod format;

#[cfg(test)]
mod testing;

pub use client::{BotApi, TelegramClient};
pub use dates::{DateParser, SystemDateParser};
pub use error::BotError;
pub use notify::Notifier;
pub use router::Engine;
pub use sweeper::{run_sweep_loop, sweep_once};
