//! # Scene Import
//!
//! Rebuilds serialized design-document trees as live nodes on a
//! [`CanvasHost`](scene_core::CanvasHost).
//!
//! ## Pipeline
//!
//! ```text
//! JSON ──► input ──► BatchScheduler ──┐
//!                                     │ per root, chunked
//!          ┌──────────────────────────┘
//!          ▼
//!   FontCache::preload ──► ReconstructionQueue ──► GroupFinalizer
//!                          │  FactoryRegistry
//!                          │  geometry::resolve
//!                          │  component::instantiate
//!                          ▼
//!                    IdentityMap + ImportSummary ──► ImportReport
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use scene_core::MemoryCanvas;
//! use scene_import::Importer;
//!
//! # async fn run() -> Result<(), scene_import::ImportError> {
//! let importer = Importer::new(Arc::new(MemoryCanvas::new()));
//! let report = importer
//!     .import_json(r#"{"id": "1:1", "type": "FRAME"}"#, None)
//!     .await?;
//! assert_eq!(report.roots.len(), 1);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod component;
pub mod config;
pub mod error;
pub mod factory;
pub mod fonts;
pub mod geometry;
pub mod groups;
pub mod identity;
pub mod importer;
pub mod input;
pub mod properties;
pub mod queue;
pub mod report;
pub mod scheduler;

pub use config::{ImportConfig, BATCH_SIZE_ENV, DEFAULT_BATCH_SIZE, DEFAULT_VIEWPORT};
pub use error::{ImportError, ImportResult};
pub use factory::{FactoryContext, FactoryRegistry, NodeFactory};
pub use fonts::{fallback_for, CacheStats, FontCache};
pub use geometry::{GeometrySource, ResolvedGeometry};
pub use identity::{IdentityMap, OnNodeCreated};
pub use importer::Importer;
pub use input::{collect_roots, parse_roots, Roots, Skipped};
pub use report::{ImportIssue, ImportProgress, ImportReport, ImportSummary, IssueKind};
pub use scheduler::BatchScheduler;
