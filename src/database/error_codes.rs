//! PostgreSQL SQLSTATE codes
//!
//! Constants and class helpers used by the store adapter to classify driver
//! errors without inspecting message text.
//!
//! SQLSTATE codes are five characters: a two-character class followed by a
//! three-character condition.
//!
//! Reference: <https://www.postgresql.org/docs/current/errcodes-appendix.html>

/// PostgreSQL SQLSTATE error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PgErrorCode;

impl PgErrorCode {
    // Class 08 - Connection Exception

    pub const CONNECTION_EXCEPTION: &'static str = "08000";
    pub const CONNECTION_DOES_NOT_EXIST: &'static str = "08003";
    pub const CONNECTION_FAILURE: &'static str = "08006";

    // Class 22 - Data Exception

    /// Malformed literal, e.g. a non-UUID string bound to a UUID column
    pub const INVALID_TEXT_REPRESENTATION: &'static str = "22P02";
    pub const STRING_DATA_RIGHT_TRUNCATION: &'static str = "22001";

    // Class 23 - Integrity Constraint Violation

    /// Duplicate key
    pub const UNIQUE_VIOLATION: &'static str = "23505";
    pub const FOREIGN_KEY_VIOLATION: &'static str = "23503";
    pub const NOT_NULL_VIOLATION: &'static str = "23502";
    pub const CHECK_VIOLATION: &'static str = "23514";
    pub const EXCLUSION_VIOLATION: &'static str = "23P01";

    // Class 57 - Operator Intervention

    /// Statement canceled, including `statement_timeout` expiry
    pub const QUERY_CANCELED: &'static str = "57014";
    pub const ADMIN_SHUTDOWN: &'static str = "57P01";
    pub const CRASH_SHUTDOWN: &'static str = "57P02";
    pub const CANNOT_CONNECT_NOW: &'static str = "57P03";

    #[inline]
    pub fn is_unique_violation(code: &str) -> bool {
        code == Self::UNIQUE_VIOLATION
    }

    /// Any Class 23 code
    #[inline]
    pub fn is_integrity_constraint_violation(code: &str) -> bool {
        code.starts_with("23")
    }

    /// Class 08, or a server going away underneath the connection
    #[inline]
    pub fn is_connection_exception(code: &str) -> bool {
        code.starts_with("08")
            || code == Self::QUERY_CANCELED
            || code == Self::ADMIN_SHUTDOWN
            || code == Self::CRASH_SHUTDOWN
            || code == Self::CANNOT_CONNECT_NOW
    }

    /// Any Class 22 code
    #[inline]
    pub fn is_data_exception(code: &str) -> bool {
        code.starts_with("22")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrity_class() {
        for code in [
            PgErrorCode::UNIQUE_VIOLATION,
            PgErrorCode::FOREIGN_KEY_VIOLATION,
            PgErrorCode::NOT_NULL_VIOLATION,
            PgErrorCode::CHECK_VIOLATION,
            PgErrorCode::EXCLUSION_VIOLATION,
        ] {
            assert!(PgErrorCode::is_integrity_constraint_violation(code));
        }
        assert!(PgErrorCode::is_unique_violation("23505"));
        assert!(!PgErrorCode::is_unique_violation("23503"));
    }

    #[test]
    fn test_connection_class() {
        assert!(PgErrorCode::is_connection_exception("08006"));
        assert!(PgErrorCode::is_connection_exception("08001"));
        assert!(PgErrorCode::is_connection_exception("57P01"));
        assert!(!PgErrorCode::is_connection_exception("23505"));
    }

    #[test]
    fn test_data_class() {
        assert!(PgErrorCode::is_data_exception("22P02"));
        assert!(PgErrorCode::is_data_exception("22001"));
        assert!(!PgErrorCode::is_data_exception("42P01"));
    }
}
