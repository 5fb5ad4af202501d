mod error;
mod runtime;
mod server;

pub use self::{error::EngineError, runtime::TelemetryRuntime};

pub mod prelude {
    pub use super::{EngineError, TelemetryRuntime};
}
