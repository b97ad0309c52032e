//! The external identification library, seen through its call signatures
//!
//! The optimiser, the cost function components and the file readers live
//! behind `IdentificationEngine`; this crate only forwards to them.

use super::records::{Constants, OptiData, Parameters, WeightSpec};
use crate::errors::{BindingError, EngineError};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use tracing::info;

pub type EngineResult<T> = Result<T, EngineError>;

/// Arguments of one identification run, as the engine receives them
#[derive(Debug, Clone, PartialEq)]
pub struct IdentificationRun {
    pub simul_type: String,
    pub n_param: usize,
    pub n_consts: usize,
    pub nfiles: usize,
    pub ngen: usize,
    pub aleaspace: i32,
    /// Population of the first generation when sampled at random
    pub apop: usize,
    /// Population of the first generation when sampled on a grid
    pub spop: usize,
    pub ngboys: usize,
    pub maxpop: usize,
    pub stationnary_cond: usize,
    pub path_data: PathBuf,
    pub path_keys: PathBuf,
    pub path_results: PathBuf,
    pub materialfile: String,
    pub outputfile: String,
}

pub trait IdentificationEngine {
    fn run_identification(&self, run: &IdentificationRun) -> EngineResult<()>;

    fn read_constants(&self, consts: &mut [Constants], nfiles: usize) -> EngineResult<()>;

    fn read_parameters(&self, params: &mut [Parameters]) -> EngineResult<()>;

    fn copy_constants(&self, consts: &[Constants], src: &Path, dst: &Path) -> EngineResult<()>;

    fn copy_parameters(&self, params: &[Parameters], src: &Path, dst: &Path) -> EngineResult<()>;

    fn apply_constants(&self, consts: &[Constants], dst: &Path) -> EngineResult<()>;

    fn apply_parameters(&self, params: &[Parameters], dst: &Path) -> EngineResult<()>;

    fn read_data_exp(&self, data_exp: &mut [OptiData]) -> EngineResult<()>;

    fn read_data_weights(
        &self,
        weights: &mut WeightSpec,
        data_weight: &mut [OptiData],
        data_exp: &[OptiData],
    ) -> EngineResult<()>;

    fn read_data_num(&self, data_exp: &[OptiData], data_num: &mut [OptiData]) -> EngineResult<()>;

    /// Load the values of `data` from `folder/<data.name>`
    fn import_data(&self, data: &mut OptiData, folder: &str) -> EngineResult<()>;

    /// Flatten `data` into one vector of length `sizev`, laid out after `data_exp`
    fn calc_v(&self, data: &[OptiData], data_exp: &[OptiData], sizev: usize) -> EngineResult<Vec<f64>>;

    fn calc_w(
        &self,
        sizev: usize,
        weights: &WeightSpec,
        data_weight: &[OptiData],
        data_exp: &[OptiData],
    ) -> EngineResult<Vec<f64>>;

    /// Weighted residual cost between experimental and numerical vectors
    fn calc_c(&self, vexp: &[f64], vnum: &[f64], weights: &[f64]) -> EngineResult<f64>;
}

type SharedEngine = Box<dyn IdentificationEngine + Send + Sync>;

static ENGINE: OnceCell<SharedEngine> = OnceCell::new();

/// Install the process-wide engine. Returns `false` if one is already installed.
pub fn install_engine<E>(engine: E) -> bool
where
    E: IdentificationEngine + Send + Sync + 'static,
{
    let installed = ENGINE.set(Box::new(engine)).is_ok();
    if installed {
        info!(engine = core::any::type_name::<E>(), "Identification engine installed");
    }
    installed
}

pub fn engine() -> Result<&'static (dyn IdentificationEngine + Send + Sync), BindingError> {
    ENGINE
        .get()
        .map(|engine| engine.as_ref())
        .ok_or(BindingError::EngineMissing)
}
