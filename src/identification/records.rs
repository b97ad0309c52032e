//! Value records exchanged with the identification engine

use crate::marshal::BoxedRecord;

/// A material constant, possibly varying per input file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constants {
    pub number: i32,
    pub value: f64,
    /// One value per input file
    pub input_values: Vec<f64>,
    /// Placeholder replaced in the input files
    pub key: String,
    pub ninput_files: usize,
    pub input_files: Vec<String>,
}

impl Constants {
    pub fn new(number: i32, nfiles: usize) -> Self {
        Self {
            number,
            input_values: vec![0.0; nfiles],
            ..Self::default()
        }
    }
}

impl BoxedRecord for Constants {
    const TYPE_NAME: &'static str = "Constants";
}

/// A material parameter to identify, bounded by `[min_value, max_value]`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    pub number: i32,
    pub min_value: f64,
    pub max_value: f64,
    pub value: f64,
    pub key: String,
    pub ninput_files: usize,
    pub input_files: Vec<String>,
}

impl Parameters {
    pub fn new(number: i32, min_value: f64, max_value: f64) -> Self {
        Self {
            number,
            min_value,
            max_value,
            value: 0.5 * (min_value + max_value),
            ..Self::default()
        }
    }
}

impl BoxedRecord for Parameters {
    const TYPE_NAME: &'static str = "Parameters";
}

/// One block of experimental, weighting or numerical data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptiData {
    pub name: String,
    pub number: i32,
    /// Number of columns of information per data point
    pub ninfo: usize,
    /// Number of data points
    pub ndata: usize,
    pub ncolumns: usize,
    pub columns: Vec<usize>,
    /// Row-major, `ndata × ninfo`
    pub data: Vec<f64>,
}

/// Weighting description read alongside the experimental data
#[derive(Debug, Clone, PartialEq)]
pub struct WeightSpec {
    pub weight_types: [i32; 3],
    /// One weight per file
    pub weight_files: Vec<f64>,
    /// Per-column weights, one vector per file
    pub weight_cols: Vec<Vec<f64>>,
}

impl WeightSpec {
    pub fn new(nfiles: usize) -> Self {
        Self {
            weight_types: [0; 3],
            weight_files: vec![0.0; nfiles],
            weight_cols: vec![Vec::new(); nfiles],
        }
    }
}
