use thiserror::Error;

/// Per-cell failure raised while advancing the moisture codes.
/// A fault never aborts the grid batch: the offending cell keeps its
/// previous codes and is reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CellError {
    /// Weather value outside the domain of the model
    #[error("invalid input {variable}={value}")]
    InvalidInput { variable: &'static str, value: f32 },

    /// The cell carries no previous-day codes and no seed was supplied
    #[error("no previous-day codes available for this cell")]
    MissingPriorState,
}

/// A cell index paired with the error raised for it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellFault {
    pub index: usize,
    pub error: CellError,
}
