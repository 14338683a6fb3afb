use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error("insufficient data: need {required} bars, got {available}")]
    InsufficientData { required: usize, available: usize },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl IndicatorError {
    pub(crate) fn require(required: usize, available: usize) -> Result<(), IndicatorError> {
        if available < required {
            Err(IndicatorError::InsufficientData {
                required,
                available,
            })
        } else {
            Ok(())
        }
    }
}
