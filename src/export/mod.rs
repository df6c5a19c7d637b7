// src/export/mod.rs

//! Producing artifacts.
//!
//! - `format`: target formats and the ad-hoc export allow-list.
//! - `path`: destination path resolution (pure).
//! - `destination`: staleness check against the store.
//! - `engine`: image decoding/encoding.
//! - `executor`: export / relocate / remove operations.

pub mod destination;
pub mod engine;
pub mod executor;
pub mod format;
pub mod path;

pub use destination::{DestinationInfo, resolve_destination_info};
pub use engine::{
    EngineError, EngineRegistry, ImageCrateEngine, ImageEngine, PsdEngine, RasterBuffer,
};
pub use executor::{ExportOutcome, ExportTarget, Exporter, RelocateOutcome};
pub use format::ExportFormat;
pub use path::{ResolvedDestination, SourceParts, normalize_path, resolve_destination};
