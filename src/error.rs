use thiserror::Error;

/// Failures raised by the rating and tipping core.
///
/// Input records are assumed to be validated before they reach the core, so
/// everything here is either a numeric contract violation or a configuration
/// mistake. None of these are retried: the run aborts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("goal rate must be finite and non-negative, got {0}")]
    InvalidRate(f64),

    #[error("candidate tip grid is empty (tip_range = 0)")]
    EmptyTipGrid,

    #[error("bias grid is empty")]
    EmptyBiasGrid,

    #[error("bias value must be finite, got {0}")]
    InvalidBias(f64),

    #[error("score grid covers 0..={got} goals but points matrices expect 0..={expected}")]
    GridMismatch { expected: u8, got: u8 },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("match {index} is dated before its predecessor; input must be sorted by kickoff")]
    OutOfOrder { index: usize },
}

pub type ModelResult<T> = Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_cause() {
        assert!(ModelError::InvalidRate(-0.5).to_string().contains("-0.5"));
        assert!(ModelError::EmptyBiasGrid.to_string().contains("bias grid"));
        let err = ModelError::GridMismatch {
            expected: 7,
            got: 6,
        };
        assert!(err.to_string().contains("0..=6"));
    }
}
