#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Receipt Hydrator
//!
//! Real-time progress listener and result hydration for receipt fraud analysis.
//!
//! ## Overview
//!
//! The analysis backend writes a flattened, size-constrained receipt record into a
//! document store and updates it as its agents make progress. When analysis
//! finishes, the heavy forensic artifacts land in a separate sidecar document. This
//! crate subscribes to the record, turns each push into a structured event, and on
//! completion merges record and sidecar into one UI-ready analysis.
//!
//! ## Module Organization
//!
//! - [`hydrator`] - Subscriptions, callback handlers and the receipt watcher
//! - [`models`] - Receipt record, agent progress, sidecar and hydrated analysis
//! - [`normalize`] - Tolerant parsing of loosely serialized fields
//! - [`store`] - Document store trait and an in-memory implementation
//! - [`config`] - Layered configuration
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Failure Handling
//!
//! Malformed fields, a missing sidecar and hydration shape errors are all recovered
//! locally and never reach the caller as errors. Only a broken subscription and a
//! backend-declared `failed` status are delivered through `on_error`.

pub mod config;
pub mod constants;
pub mod error;
pub mod hydrator;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod store;

pub use config::HydratorConfig;
pub use constants::ReceiptStatus;
pub use error::{HydratorError, ReceiptFailure, Result};
pub use hydrator::{
    ReceiptCallbacks, ReceiptEvent, ReceiptEventHandler, ReceiptProgressHydrator,
    ReceiptSubscription, ReceiptWatcher, SubscriptionStats,
};
pub use models::{AgentProgress, ForensicSidecar, HydratedAnalysis, HydrationSource, ReceiptRecord};
pub use normalize::{normalize, ParseOutcome};
pub use store::{DocumentPath, DocumentSnapshot, DocumentStore, InMemoryDocumentStore};
