use smartpy_runtime::AllocError;
use std::fmt;

/// A single foreign value that does not convert to the requested native type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMismatch {
    pub expected: &'static str,
    pub found: String,
}

impl TypeMismatch {
    pub fn new(expected: &'static str, found: impl Into<String>) -> Self {
        Self {
            expected,
            found: found.into(),
        }
    }
}

impl fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {}, found {}", self.expected, self.found)
    }
}

impl std::error::Error for TypeMismatch {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    Element {
        index: usize,
        expected: &'static str,
        found: String,
    },
    NotIterable {
        found: String,
    },
    /// The foreign iterator itself failed while producing element `index`
    Iteration {
        index: usize,
        message: String,
    },
}

impl ConversionError {
    pub(crate) fn element(index: usize, mismatch: TypeMismatch) -> Self {
        Self::Element {
            index,
            expected: mismatch.expected,
            found: mismatch.found,
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element { index, expected, found } => {
                write!(f, "element {}: expected {}, found {}", index, expected, found)
            }
            Self::NotIterable { found } => {
                write!(f, "'{}' object is not iterable", found)
            }
            Self::Iteration { index, message } => {
                write!(f, "iteration failed at element {}: {}", index, message)
            }
        }
    }
}

impl std::error::Error for ConversionError {}

/// The foreign runtime refused to take ownership of a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferFailure {
    Exhausted { limit: usize },
    Foreign(String),
}

impl From<AllocError> for TransferFailure {
    fn from(err: AllocError) -> Self {
        match err {
            AllocError::Exhausted { limit } => Self::Exhausted { limit },
        }
    }
}

impl fmt::Display for TransferFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted { limit } => {
                write!(f, "foreign heap exhausted ({} live objects allowed)", limit)
            }
            Self::Foreign(message) => write!(f, "foreign runtime error: {}", message),
        }
    }
}

impl std::error::Error for TransferFailure {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarshalError {
    Conversion(ConversionError),
    /// The output list itself could not be created
    Allocation(TransferFailure),
    /// Boxing or appending element `index` failed
    Transfer {
        index: usize,
        source: TransferFailure,
    },
}

impl MarshalError {
    pub fn is_conversion(&self) -> bool {
        matches!(self, Self::Conversion(_))
    }
}

impl From<ConversionError> for MarshalError {
    fn from(err: ConversionError) -> Self {
        Self::Conversion(err)
    }
}

impl fmt::Display for MarshalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conversion(err) => write!(f, "conversion failed: {}", err),
            Self::Allocation(err) => write!(f, "cannot create list: {}", err),
            Self::Transfer { index, source } => {
                write!(f, "cannot hand element {} to the foreign runtime: {}", index, source)
            }
        }
    }
}

impl std::error::Error for MarshalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Conversion(err) => Some(err),
            Self::Allocation(err) => Some(err),
            Self::Transfer { source, .. } => Some(source),
        }
    }
}

/// Error raised by the identification engine; forwarded untouched
#[derive(Debug)]
pub struct EngineError {
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

#[derive(Debug)]
pub enum BindingError {
    Marshal(MarshalError),
    Engine(EngineError),
    InvalidArgument(String),
    /// No identification engine has been installed
    EngineMissing,
}

impl From<MarshalError> for BindingError {
    fn from(err: MarshalError) -> Self {
        Self::Marshal(err)
    }
}

impl From<EngineError> for BindingError {
    fn from(err: EngineError) -> Self {
        Self::Engine(err)
    }
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Marshal(err) => write!(f, "{}", err),
            Self::Engine(err) => write!(f, "{}", err),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {}", message),
            Self::EngineMissing => write!(f, "no identification engine installed"),
        }
    }
}

impl std::error::Error for BindingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Marshal(err) => Some(err),
            Self::Engine(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_conversion_error_messages() {
        let err = ConversionError::element(2, TypeMismatch::new("float", "str"));
        assert_eq!(err.to_string(), "element 2: expected float, found str");

        let err = ConversionError::NotIterable { found: "int".into() };
        assert_eq!(err.to_string(), "'int' object is not iterable");
    }

    #[test]
    fn test_alloc_error_becomes_transfer_failure() {
        let failure = TransferFailure::from(AllocError::Exhausted { limit: 4 });
        assert_eq!(failure, TransferFailure::Exhausted { limit: 4 });
    }

    #[test]
    fn test_engine_error_passes_through_unchanged() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "path_data/keys.dat");
        let err = BindingError::from(EngineError::with_source("cannot read keys", io));

        assert_eq!(err.to_string(), "cannot read keys");
        let engine = err.source().unwrap();
        assert_eq!(engine.source().unwrap().to_string(), "path_data/keys.dat");
    }
}
