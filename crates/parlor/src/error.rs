//! Error types for the parlor framework.
//!
//! An unrecognized line is never an error: handlers signal that through
//! [`Outcome::Rejected`](crate::Outcome). This enum covers the genuine
//! failures: bad patterns at registry build time, actions reporting a
//! failed command body, malformed JSON at multi-line completion, and
//! output sink I/O.

use std::io;

/// Errors produced by the parlor framework.
#[derive(Debug, thiserror::Error)]
pub enum ParlorError {
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("command error: {0}")]
    Command(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ParlorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_error_display() {
        let e = ParlorError::Command("no such dir".into());
        assert_eq!(format!("{e}"), "command error: no such dir");
    }

    #[test]
    fn pattern_error_from_conversion() {
        let re_err = regex::Regex::new("(unclosed").unwrap_err();
        let e: ParlorError = re_err.into();
        assert!(format!("{e}").contains("pattern error"));
    }

    #[test]
    fn json_error_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let e: ParlorError = json_err.into();
        assert!(format!("{e}").contains("JSON error"));
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "gone");
        let e: ParlorError = io_err.into();
        let msg = format!("{e}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn error_is_debug() {
        let e = ParlorError::Command("test".into());
        assert!(format!("{e:?}").contains("Command"));
    }

    #[test]
    fn result_alias_round_trip() {
        let ok: Result<i32> = Ok(7);
        assert_eq!(ok.unwrap(), 7);
        let err: Result<i32> = Err(ParlorError::Command("oops".into()));
        assert!(err.is_err());
    }
}
