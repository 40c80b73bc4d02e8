//! Keep-alive probing for remotely-hosted database projects.
//!
//! This crate provides the core of the keep-alive monitor: resolving the
//! current list of projects, pinging each project's keep-alive RPC
//! concurrently, and folding the results into a per-cycle summary.
//!
//! # Example
//!
//! ```no_run
//! use keepalive::{CycleRunner, HttpPinger, HttpProjectSource, source::DEFAULT_PROJECTS_URL};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = reqwest::Client::builder()
//!     .timeout(Duration::from_secs(10))
//!     .build()?;
//!
//! let source = HttpProjectSource::new(client.clone(), DEFAULT_PROJECTS_URL);
//! let pinger = HttpPinger::with_client(client);
//!
//! let runner = CycleRunner::new(Arc::new(source), Arc::new(pinger));
//! let summary = runner.run().await?;
//!
//! println!("{}/{} projects up", summary.up, summary.total);
//! # Ok(())
//! # }
//! ```

pub mod pinger;
pub mod runner;
pub mod source;
pub mod types;

pub use pinger::{HttpPinger, Pinger};
pub use runner::CycleRunner;
pub use source::{HttpProjectSource, ProjectSource, SourceError};
pub use types::{PingResult, PingStatus, Project, Summary};
