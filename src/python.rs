//! Python bindings
//!
//! `PythonRuntime` plugs the interpreter into the marshaller; the `smartpy`
//! extension module exposes the identification wrappers on top of it.
//! Records cross as `NativeRecord` objects that own the adopted value.

use crate::config::Config;
use crate::errors::{BindingError, ConversionError, MarshalError, TransferFailure, TypeMismatch};
use crate::identification::{self as id, IdentificationRequest};
use crate::logging;
use crate::marshal::{ForeignIter, ForeignRuntime, FromForeign, ToForeign};
use core::ptr::NonNull;
use once_cell::sync::Lazy;
use pyo3::exceptions::{PyMemoryError, PyRuntimeError, PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyList;
use smartpy_runtime::Adopted;
use std::path::Path;

static CONFIG: Lazy<Config> = Lazy::new(Config::discover);

/// The running interpreter, seen as a foreign runtime
#[derive(Clone, Copy)]
pub struct PythonRuntime<'py> {
    py: Python<'py>,
}

impl<'py> PythonRuntime<'py> {
    pub fn new(py: Python<'py>) -> Self {
        Self { py }
    }
}

/// Python-side owner of an adopted native record
#[pyclass(name = "NativeRecord", module = "smartpy")]
pub struct NativeRecord {
    slot: Option<Adopted>,
}

#[pymethods]
impl NativeRecord {
    #[getter]
    fn type_name(&self) -> &'static str {
        self.slot
            .as_ref()
            .map(|adopted| adopted.type_info().short_name())
            .unwrap_or("empty")
    }

    fn __repr__(&self) -> String {
        format!("<smartpy.NativeRecord {}>", self.type_name())
    }
}

fn foreign_failure(err: PyErr) -> TransferFailure {
    TransferFailure::Foreign(err.to_string())
}

impl<'py> ForeignRuntime for PythonRuntime<'py> {
    type Object = &'py PyAny;
    type List = &'py PyList;

    fn new_list(&self, _capacity: usize) -> Result<&'py PyList, TransferFailure> {
        Ok(PyList::empty(self.py))
    }

    fn append(&self, list: &&'py PyList, item: &'py PyAny) -> Result<(), TransferFailure> {
        list.append(item).map_err(foreign_failure)
    }

    fn list_object(&self, list: &'py PyList) -> &'py PyAny {
        list.as_ref()
    }

    fn type_name(&self, object: &&'py PyAny) -> String {
        object
            .get_type()
            .name()
            .map(str::to_owned)
            .unwrap_or_else(|_| "object".to_string())
    }

    fn iter<'a>(&'a self, iterable: &'a &'py PyAny) -> Result<ForeignIter<'a, &'py PyAny>, ConversionError> {
        let iterable: &'py PyAny = *iterable;
        let items = iterable.iter().map_err(|_| ConversionError::NotIterable {
            found: self.type_name(&iterable),
        })?;
        Ok(Box::new(items.map(|item| item.map_err(|err| err.to_string()))))
    }

    unsafe fn adopt<T: Send + Sync + 'static>(&self, raw: NonNull<T>) -> Result<&'py PyAny, TransferFailure> {
        // The Python object must exist before it is given the pointer
        let cell = Py::new(self.py, NativeRecord { slot: None }).map_err(foreign_failure)?;
        cell.borrow_mut(self.py).slot = Some(Adopted::from_raw(raw));
        Ok(cell.into_py(self.py).into_ref(self.py))
    }

    fn adopted<T: Clone + 'static>(&self, object: &&'py PyAny) -> Option<T> {
        let record: PyRef<'py, NativeRecord> = (*object).extract().ok()?;
        let value = record.slot.as_ref()?.downcast_ref::<T>().cloned();
        value
    }
}

macro_rules! python_primitive {
    ($ty:ty, $expected:literal) => {
        impl<'py> ToForeign<PythonRuntime<'py>> for $ty {
            fn marshal(&self, runtime: &PythonRuntime<'py>) -> Result<&'py PyAny, TransferFailure> {
                Ok(ToPyObject::to_object(self, runtime.py).into_ref(runtime.py))
            }
        }

        impl<'py> FromForeign<PythonRuntime<'py>> for $ty {
            fn unmarshal(runtime: &PythonRuntime<'py>, object: &&'py PyAny) -> Result<Self, TypeMismatch> {
                (*object)
                    .extract::<$ty>()
                    .map_err(|_| TypeMismatch::new($expected, runtime.type_name(object)))
            }
        }
    };
}

python_primitive!(f64, "float");
python_primitive!(i32, "int");
python_primitive!(String, "str");

impl From<BindingError> for PyErr {
    fn from(err: BindingError) -> PyErr {
        let message = err.to_string();
        match err {
            BindingError::Marshal(MarshalError::Conversion(_)) => PyTypeError::new_err(message),
            BindingError::Marshal(_) => PyMemoryError::new_err(message),
            BindingError::InvalidArgument(_) => PyValueError::new_err(message),
            BindingError::Engine(_) | BindingError::EngineMissing => PyRuntimeError::new_err(message),
        }
    }
}

#[pyfunction]
#[allow(clippy::too_many_arguments)]
fn identification(
    simul_type: String,
    n_param: usize,
    n_consts: usize,
    nfiles: usize,
    ngen: usize,
    aleaspace: i32,
    pop: usize,
    ngboys: usize,
    maxpop: usize,
    stationnary_cond: usize,
    path_data: String,
    path_keys: String,
    path_results: String,
    materialfile: String,
    outputfile: String,
) -> PyResult<()> {
    let request = IdentificationRequest {
        simul_type,
        n_param,
        n_consts,
        nfiles,
        ngen,
        aleaspace,
        pop,
        ngboys,
        maxpop,
        stationnary_cond,
        path_data: path_data.into(),
        path_keys: path_keys.into(),
        path_results: path_results.into(),
        materialfile,
        outputfile,
    };

    id::identification(id::engine()?, request)?;
    Ok(())
}

#[pyfunction]
fn read_constants(py: Python<'_>, nconstants: usize, nfiles: usize) -> PyResult<&PyList> {
    let runtime = PythonRuntime::new(py);
    Ok(id::read_constants(id::engine()?, &runtime, nconstants, nfiles)?)
}

#[pyfunction]
fn read_parameters(py: Python<'_>, nparams: usize) -> PyResult<&PyList> {
    let runtime = PythonRuntime::new(py);
    Ok(id::read_parameters(id::engine()?, &runtime, nparams)?)
}

#[pyfunction]
fn copy_constants<'py>(py: Python<'py>, consts: &'py PyAny, src_path: String, dst_path: String) -> PyResult<()> {
    let runtime = PythonRuntime::new(py);
    id::copy_constants(id::engine()?, &runtime, &consts, Path::new(&src_path), Path::new(&dst_path))?;
    Ok(())
}

#[pyfunction]
fn copy_parameters<'py>(py: Python<'py>, params: &'py PyAny, src_path: String, dst_path: String) -> PyResult<()> {
    let runtime = PythonRuntime::new(py);
    id::copy_parameters(id::engine()?, &runtime, &params, Path::new(&src_path), Path::new(&dst_path))?;
    Ok(())
}

#[pyfunction]
fn apply_constants<'py>(py: Python<'py>, consts: &'py PyAny, dst_path: String) -> PyResult<()> {
    let runtime = PythonRuntime::new(py);
    id::apply_constants(id::engine()?, &runtime, &consts, Path::new(&dst_path))?;
    Ok(())
}

#[pyfunction]
fn apply_parameters<'py>(py: Python<'py>, params: &'py PyAny, dst_path: String) -> PyResult<()> {
    let runtime = PythonRuntime::new(py);
    id::apply_parameters(id::engine()?, &runtime, &params, Path::new(&dst_path))?;
    Ok(())
}

#[pyfunction]
fn calc_cost(nfiles: usize, data_num_name: String) -> PyResult<f64> {
    Ok(id::calc_cost(id::engine()?, nfiles, &data_num_name, &CONFIG.identification)?)
}

#[pymodule]
fn smartpy(_py: Python, m: &PyModule) -> PyResult<()> {
    logging::init_global(CONFIG.logging.to_log_config());

    m.add_class::<NativeRecord>()?;
    m.add_function(wrap_pyfunction!(identification, m)?)?;
    m.add_function(wrap_pyfunction!(read_constants, m)?)?;
    m.add_function(wrap_pyfunction!(read_parameters, m)?)?;
    m.add_function(wrap_pyfunction!(copy_constants, m)?)?;
    m.add_function(wrap_pyfunction!(copy_parameters, m)?)?;
    m.add_function(wrap_pyfunction!(apply_constants, m)?)?;
    m.add_function(wrap_pyfunction!(apply_parameters, m)?)?;
    m.add_function(wrap_pyfunction!(calc_cost, m)?)?;
    Ok(())
}
