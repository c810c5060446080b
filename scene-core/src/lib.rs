//! # Scene Core
//!
//! Shared vocabulary for rebuilding serialized design documents on a live
//! canvas.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 scene-core                  │
//! ├─────────────────────────────────────────────┤
//! │  Wire Model      │  Live Node Vocabulary    │
//! │  - SceneRecord   │  - NodeId / NodeKind     │
//! │  - Paints/Fonts  │  - NodeProperty          │
//! │  - Geometry      │  - NodeSnapshot          │
//! ├─────────────────────────────────────────────┤
//! │  Host Boundary   │  In-Memory Host          │
//! │  - CanvasHost    │  - MemoryCanvas          │
//! │  - HostError     │  - Failure injection     │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod font;
pub mod geometry;
pub mod host;
pub mod memory;
pub mod node;
pub mod paint;
pub mod record;

pub use error::{HostError, HostResult};
pub use font::FontName;
pub use geometry::{AffineTransform, BoundingBox, Bounds, Vector};
pub use host::CanvasHost;
pub use memory::{MemoryCanvas, NodeData};
pub use node::{
    AutoLayout, LayoutSizing, NodeId, NodeKind, NodeProperty, NodeSnapshot, TextRangeStyle,
};
pub use paint::{Color, ColorStop, CornerRadii, Effect, Paint, VectorPath};
pub use record::{tags, ComponentRef, SceneRecord, TextSegment, TypeStyle};

/// Scene core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
