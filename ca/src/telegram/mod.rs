//! Telegram data API client
//!
//! [`TelegramClient`] layers caching, a process-wide rate gate and bounded
//! retries over a raw [`ChannelFeed`].

mod client;
mod error;
pub mod feed;

pub use client::{TelegramClient, extract_channel_name, synthetic_messages};
pub use error::TelegramError;
pub use feed::{ChannelFeed, RapidApiFeed};
