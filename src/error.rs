use thiserror::Error;

/// Failures the converter can detect in the input workbook.
///
/// These are wrapped in [`anyhow::Error`] with sheet/row/column context on the
/// way up, so callers that care about the kind can `downcast_ref` it.
#[derive(Debug, Error, PartialEq)]
pub enum ConvertError {
    #[error("missing sheet `{0}`")]
    MissingSheet(String),

    #[error("sheet `{0}` has no data rows")]
    EmptySheet(String),

    #[error("sheet `{sheet}` has no `{column}` column")]
    MissingColumn { sheet: String, column: String },

    #[error("cell is empty")]
    MissingValue,

    #[error("cannot parse {0:?} as a date")]
    InvalidDate(String),

    #[error("{0:?} is not a number")]
    InvalidNumber(String),

    #[error("{0:?} is not a recognized boolean")]
    InvalidBoolean(String),

    #[error("{0:?} is not a valid year")]
    InvalidYear(String),
}
