//! Material-parameter identification bindings
//!
//! - `records.rs` - constants, parameters and data blocks
//! - `engine.rs` - the external library's entry points and the process-wide engine
//! - `wrappers.rs` - forwarding wrappers with argument marshalling

mod engine;
mod records;
mod wrappers;

pub use engine::{engine, install_engine, EngineResult, IdentificationEngine, IdentificationRun};
pub use records::{Constants, OptiData, Parameters, WeightSpec};
pub use wrappers::{
    apply_constants, apply_parameters, calc_cost, copy_constants, copy_parameters, identification,
    read_constants, read_parameters, IdentificationRequest,
};
