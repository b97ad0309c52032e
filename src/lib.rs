//! smartpy - scripting bindings for material-parameter identification
//!
//! Converts between native sequences and dynamic-language sequences, hands
//! boxed records over to the foreign runtime without leaks, and forwards the
//! identification entry points of the external engine.

pub mod config;
pub mod errors;
pub mod identification;
pub mod logging;
pub mod marshal;
pub mod transfer;

#[cfg(feature = "python")]
pub mod python;

// Re-export commonly used items
pub use config::Config;
pub use errors::{BindingError, ConversionError, EngineError, MarshalError, TransferFailure, TypeMismatch};
pub use identification::{Constants, IdentificationEngine, IdentificationRequest, OptiData, Parameters, WeightSpec};
pub use logging::{init_logging, LogConfig, LogFormat, LogOutput};
pub use marshal::{extend_foreign, to_foreign, to_native, BoxedRecord, ForeignRuntime, FromForeign, ToForeign};
pub use transfer::{transfer, OwnedGuard};

pub use smartpy_runtime as runtime;
