//! Self-refreshing tweets widget pipeline.
//!
//! Polls a feed endpoint on a fixed interval, normalizes each post into
//! linkified markup, keeps the last good batch in a key-value cache for
//! offline fallback, and reconciles the rendered display with animated
//! swaps only when the content actually changed.

pub mod cache;
pub mod config;
pub mod error;
pub mod normalize;
pub mod parser;
pub mod post;
pub mod render;
pub mod scheduler;
pub mod surface;
pub mod template;
pub mod transport;

pub use cache::{CacheGateway, FileStore, KeyValueStore, MemoryStore};
pub use config::TweetsConfig;
pub use error::RefreshError;
pub use post::{Entities, LinkEntity, Mention, Post, Snapshot, Tag};
pub use render::{DisplaySurface, Reconciler, RenderPass};
pub use scheduler::{CycleOutcome, RefreshScheduler, ScheduleState};
pub use surface::TextSurface;
pub use transport::{HttpTransport, Transport};
