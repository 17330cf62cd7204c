//! Issue tracker service
//!
//! A small REST service for filing, listing, updating and deleting issues
//! per project, backed by a document store.
//!
//! ```rust
//! use issuetracker::config::settings::open_store;
//! use issuetracker::config::urls::handler;
//! use issuetracker_conf::Settings;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = open_store(&Settings::default()).await.unwrap();
//! let handler = handler(store).unwrap();
//! # let _ = handler;
//! # });
//! ```

pub mod apps;
pub mod config;
