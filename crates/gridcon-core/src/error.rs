//! Unified error types for the sizing pipeline
//!
//! [`GridconError`] carries the failure taxonomy of a sizing run: parameter
//! errors raised while deriving costs, data-shape errors raised while building
//! the network, solver failures, and the accordance diagnostic. Every stage
//! returns [`GridconResult`] so errors propagate to the driver with `?`.
//!
//! # Example
//!
//! ```ignore
//! use gridcon_core::{GridconError, GridconResult};
//!
//! fn run(path: &str) -> GridconResult<()> {
//!     let profiles = load_profiles(path)?;
//!     let network = build_network(&config, &profiles)?;
//!     solve(&network)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Unified error type for all sizing operations.
#[derive(Error, Debug)]
pub enum GridconError {
    /// Economic or technical parameter outside its valid range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Time series missing, wrong length, or column absent
    #[error("Data shape mismatch: {0}")]
    DataShapeMismatch(String),

    /// Solver reported no optimal solution
    #[error("Infeasible or unbounded: {0}")]
    InfeasibleOrUnbounded(String),

    /// Itemized costs do not add up to the solver objective
    #[error(
        "Accordance mismatch: itemized costs {itemized:.4} vs objective {objective:.4} \
         (relative gap {relative_gap:.2e})"
    )]
    AccordanceMismatch {
        itemized: f64,
        objective: f64,
        relative_gap: f64,
    },

    /// I/O errors (file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network structure errors
    #[error("Network error: {0}")]
    Network(String),

    /// Solver/backend errors other than infeasibility
    #[error("Solver error: {0}")]
    Solver(String),
}

/// Convenience type alias for Results using GridconError.
pub type GridconResult<T> = Result<T, GridconError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GridconError::InvalidParameter("wacc must be positive".into());
        assert!(err.to_string().contains("Invalid parameter"));
        assert!(err.to_string().contains("wacc must be positive"));
    }

    #[test]
    fn test_accordance_display() {
        let err = GridconError::AccordanceMismatch {
            itemized: 99.0,
            objective: 100.0,
            relative_gap: 0.01,
        };
        let msg = err.to_string();
        assert!(msg.contains("99.0000"));
        assert!(msg.contains("100.0000"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GridconError = io_err.into();
        assert!(matches!(err, GridconError::Io(_)));
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> GridconResult<()> {
            Err(GridconError::DataShapeMismatch("pv".into()))
        }

        fn outer() -> GridconResult<()> {
            inner()?;
            Ok(())
        }

        assert!(matches!(outer(), Err(GridconError::DataShapeMismatch(_))));
    }
}
