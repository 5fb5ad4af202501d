//! # varsel-core
//!
//! Foundation layer for the Varsel telemetry engine.
//! Holds the record data model shared by every component and the
//! queue primitive that connects the producer to its consumers.
//!
//! ### Key Submodules:
//! - `events`: log/metric record types, the wire envelope, and the
//!   unbounded FIFO `RecordQueue`
//! - `error`: crate-wide error taxonomy

pub mod error;
pub mod events;

pub mod prelude {
    pub use crate::error::*;
    pub use crate::events::*;
}

pub use error::TelemetryError;
