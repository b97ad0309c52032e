//! Forwarding wrappers - convert arguments, call the engine, convert results

use super::engine::{IdentificationEngine, IdentificationRun};
use super::records::{Constants, OptiData, Parameters, WeightSpec};
use crate::config::IdentificationConfig;
use crate::errors::BindingError;
use crate::marshal::{self, ForeignRuntime};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Identification job as described by the caller
#[derive(Debug, Clone, PartialEq)]
pub struct IdentificationRequest {
    pub simul_type: String,
    pub n_param: usize,
    pub n_consts: usize,
    pub nfiles: usize,
    pub ngen: usize,
    pub aleaspace: i32,
    /// Size of the first generation
    pub pop: usize,
    pub ngboys: usize,
    pub maxpop: usize,
    pub stationnary_cond: usize,
    pub path_data: PathBuf,
    pub path_keys: PathBuf,
    pub path_results: PathBuf,
    pub materialfile: String,
    pub outputfile: String,
}

impl IdentificationRequest {
    /// Route `pop` to the random (`aleaspace == 2`) or grid (`aleaspace < 2`) population.
    pub fn into_run(self) -> IdentificationRun {
        let (apop, spop) = match self.aleaspace {
            2 => (self.pop, 0),
            a if a < 2 => (0, self.pop),
            _ => (0, 0),
        };

        IdentificationRun {
            simul_type: self.simul_type,
            n_param: self.n_param,
            n_consts: self.n_consts,
            nfiles: self.nfiles,
            ngen: self.ngen,
            aleaspace: self.aleaspace,
            apop,
            spop,
            ngboys: self.ngboys,
            maxpop: self.maxpop,
            stationnary_cond: self.stationnary_cond,
            path_data: self.path_data,
            path_keys: self.path_keys,
            path_results: self.path_results,
            materialfile: self.materialfile,
            outputfile: self.outputfile,
        }
    }
}

pub fn identification<E>(engine: &E, request: IdentificationRequest) -> Result<(), BindingError>
where
    E: IdentificationEngine + ?Sized,
{
    let run = request.into_run();
    info!(
        simul_type = %run.simul_type,
        n_param = run.n_param,
        nfiles = run.nfiles,
        ngen = run.ngen,
        apop = run.apop,
        spop = run.spop,
        "Running identification"
    );

    engine.run_identification(&run)?;
    Ok(())
}

pub fn read_constants<R, E>(
    engine: &E,
    runtime: &R,
    nconstants: usize,
    nfiles: usize,
) -> Result<R::List, BindingError>
where
    R: ForeignRuntime,
    E: IdentificationEngine + ?Sized,
{
    let mut consts = vec![Constants::default(); nconstants];
    engine.read_constants(&mut consts, nfiles)?;
    debug!(event = "read_constants", count = consts.len(), nfiles);

    Ok(marshal::constants_to_list(runtime, &consts)?)
}

pub fn read_parameters<R, E>(engine: &E, runtime: &R, nparams: usize) -> Result<R::List, BindingError>
where
    R: ForeignRuntime,
    E: IdentificationEngine + ?Sized,
{
    let mut params = vec![Parameters::default(); nparams];
    engine.read_parameters(&mut params)?;
    debug!(event = "read_parameters", count = params.len());

    Ok(marshal::parameters_to_list(runtime, &params)?)
}

pub fn copy_constants<R, E>(
    engine: &E,
    runtime: &R,
    consts: &R::Object,
    src: &Path,
    dst: &Path,
) -> Result<(), BindingError>
where
    R: ForeignRuntime,
    E: IdentificationEngine + ?Sized,
{
    let consts = marshal::list_to_constants(runtime, consts)?;
    debug!(event = "copy_constants", count = consts.len(), src = %src.display(), dst = %dst.display());

    engine.copy_constants(&consts, src, dst)?;
    Ok(())
}

pub fn copy_parameters<R, E>(
    engine: &E,
    runtime: &R,
    params: &R::Object,
    src: &Path,
    dst: &Path,
) -> Result<(), BindingError>
where
    R: ForeignRuntime,
    E: IdentificationEngine + ?Sized,
{
    let params = marshal::list_to_parameters(runtime, params)?;
    debug!(event = "copy_parameters", count = params.len(), src = %src.display(), dst = %dst.display());

    engine.copy_parameters(&params, src, dst)?;
    Ok(())
}

pub fn apply_constants<R, E>(
    engine: &E,
    runtime: &R,
    consts: &R::Object,
    dst: &Path,
) -> Result<(), BindingError>
where
    R: ForeignRuntime,
    E: IdentificationEngine + ?Sized,
{
    let consts = marshal::list_to_constants(runtime, consts)?;
    debug!(event = "apply_constants", count = consts.len(), dst = %dst.display());

    engine.apply_constants(&consts, dst)?;
    Ok(())
}

pub fn apply_parameters<R, E>(
    engine: &E,
    runtime: &R,
    params: &R::Object,
    dst: &Path,
) -> Result<(), BindingError>
where
    R: ForeignRuntime,
    E: IdentificationEngine + ?Sized,
{
    let params = marshal::list_to_parameters(runtime, params)?;
    debug!(event = "apply_parameters", count = params.len(), dst = %dst.display());

    engine.apply_parameters(&params, dst)?;
    Ok(())
}

/// Split `name` into its root and its four-character extension (`.txt`)
fn split_extension(name: &str) -> Result<(&str, &str), BindingError> {
    match name.char_indices().rev().nth(3) {
        Some((at, _)) => Ok(name.split_at(at)),
        None => Err(BindingError::InvalidArgument(format!(
            "numerical data file name '{}' has no four-character extension",
            name
        ))),
    }
}

/// Cost of the numerical results `data_num_name` against the experimental data.
///
/// Numerical file `i` is read as `<root>_<i+1><ext>` from the numerical data folder.
pub fn calc_cost<E>(
    engine: &E,
    nfiles: usize,
    data_num_name: &str,
    folders: &IdentificationConfig,
) -> Result<f64, BindingError>
where
    E: IdentificationEngine + ?Sized,
{
    let (root, ext) = split_extension(data_num_name)?;

    let mut data_exp = vec![OptiData::default(); nfiles];
    let mut data_weight = vec![OptiData::default(); nfiles];
    let mut data_num = vec![OptiData::default(); nfiles];
    let mut weights = WeightSpec::new(nfiles);

    engine.read_data_exp(&mut data_exp)?;
    engine.read_data_weights(&mut weights, &mut data_weight, &data_exp)?;
    engine.read_data_num(&data_exp, &mut data_num)?;

    let mut sizev = 0;
    for (i, ((exp, weight), num)) in data_exp
        .iter_mut()
        .zip(data_weight.iter_mut())
        .zip(data_num.iter_mut())
        .enumerate()
    {
        engine.import_data(exp, &folders.exp_data_folder)?;
        engine.import_data(weight, &folders.exp_data_folder)?;
        sizev += exp.ndata * exp.ninfo;

        num.name = format!("{}_{}{}", root, i + 1, ext);
        engine.import_data(num, &folders.num_data_folder)?;
    }

    let vexp = engine.calc_v(&data_exp, &data_exp, sizev)?;
    let vnum = engine.calc_v(&data_num, &data_exp, sizev)?;
    let w = engine.calc_w(sizev, &weights, &data_weight, &data_exp)?;

    let cost = engine.calc_c(&vexp, &vnum, &w)?;
    debug!(event = "calc_cost", nfiles, sizev, cost);
    Ok(cost)
}
