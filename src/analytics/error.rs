//! Query error types.

use thiserror::Error;

/// Result type alias for query operations.
pub type QueryResult<T> = std::result::Result<T, QueryError>;

/// Broad class of a query failure, for the request layer to map onto its
/// own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller supplied malformed or missing input.
    InvalidParameter,
    /// Valid request whose filters matched nothing.
    NoData,
}

/// Errors a query can end with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Start year {start} cannot be later than end year {end}")]
    InvalidRange { start: i32, end: i32 },

    #[error("Year range {start}..={end} spans more than {max} years")]
    RangeTooWide { start: i32, end: i32, max: usize },

    #[error("At least one {0} must be selected")]
    MissingSelection(&'static str),

    #[error("Invalid group_by '{0}': expected 'university' or 'degree'")]
    InvalidGroupBy(String),

    #[error("Too many degrees: {requested} requested, at most {max} allowed")]
    TooManyDegrees { requested: usize, max: usize },

    #[error("At least one degree must be selected")]
    MissingDegrees,

    #[error("No data found for the given filters")]
    NoData,
}

impl QueryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::NoData => ErrorKind::NoData,
            _ => ErrorKind::InvalidParameter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_human_readable() {
        let err = QueryError::InvalidRange { start: 2023, end: 2020 };
        assert_eq!(err.to_string(), "Start year 2023 cannot be later than end year 2020");

        let err = QueryError::TooManyDegrees { requested: 8, max: 7 };
        assert_eq!(err.to_string(), "Too many degrees: 8 requested, at most 7 allowed");

        assert_eq!(
            QueryError::MissingSelection("university").to_string(),
            "At least one university must be selected"
        );
    }

    #[test]
    fn only_no_data_is_no_data() {
        assert_eq!(QueryError::NoData.kind(), ErrorKind::NoData);
        assert_eq!(QueryError::MissingDegrees.kind(), ErrorKind::InvalidParameter);
        assert_eq!(
            QueryError::RangeTooWide { start: 0, end: 2020, max: 100 }.kind(),
            ErrorKind::InvalidParameter
        );
        assert_eq!(
            QueryError::InvalidGroupBy("school".into()).kind(),
            ErrorKind::InvalidParameter
        );
    }
}
