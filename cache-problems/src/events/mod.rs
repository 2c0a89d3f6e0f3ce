//! Listener plumbing for the problem pipeline
//!
//! # Event Flow
//!
//! ```text
//! ┌──────────────┐  report   ┌──────────────┐  on_problem   ┌──────────────┐
//! │   Producer   │──────────▶│ Problem Sink │──────────────▶│  Collector   │
//! └──────────────┘           └──────┬───────┘               └──────────────┘
//!                                   │ registry
//!                                   ▼
//!                            ┌──────────────┐ build_finished ┌──────────────┐
//!                            │   Registry   │───────────────▶│   Arbiter    │
//!                            └──────────────┘                └──────────────┘
//! ```
//!
//! Both kinds of event are delivered synchronously on the caller's thread.

pub mod registry;
pub mod types;

pub use registry::{ListenerRegistry, SharedListenerRegistry};
pub use types::{BuildListener, BuildResult, ListenerId, ProblemListener, ROOT_BUILD_PATH};
