//! Session store with capacity bound and idle eviction.
//!
//! This crate provides the process-wide session table for Verbena:
//! - a concurrent map from opaque session id to an exclusively-lockable
//!   session value
//! - LRU eviction to prevent unbounded memory growth
//! - idle-based eviction with an optional background sweep
//!
//! Nothing is persisted: the table starts empty at process start and all
//! sessions are lost on restart.
//!
//! # Example
//!
//! ```rust,ignore
//! use verbena_session::{SessionStore, StoreConfig};
//!
//! let config = StoreConfig::default()
//!     .with_max_sessions(1000)
//!     .with_idle_timeout(Duration::from_secs(1800));
//!
//! let store: SessionStore<MySession> = SessionStore::new(config);
//! ```

mod config;
mod error;
mod idle;
mod store;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use idle::IdleTracker;
pub use store::{SessionHandle, SessionStore};
