//! Shared `Result` alias.
//!
//! Session and access errors are plain enums owned by the crate that raises
//! them (`SessionError`, `CredentialError`, `AuthorizationError`). Fallible
//! network operations wrap them in a rootcause `Report`, so `?` on a bare
//! domain error lifts it into the report and callers can still match on
//! `Report::current_context`.

use rootcause::Report;

/// `Result` whose error is a rootcause report over the domain error `C`.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Boom;

    impl std::fmt::Display for Boom {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "boom")
        }
    }

    impl std::error::Error for Boom {}

    fn fails() -> Result<u8, Boom> {
        Err(Boom.into())
    }

    #[test]
    fn result_type_works() {
        let ok: Result<i32> = Ok(42);
        assert_eq!(ok.expect("should be ok"), 42);
    }

    #[test]
    fn domain_error_converts_into_report() {
        let err = fails().expect_err("should fail");
        assert!(err.to_string().contains("boom"));
        assert_eq!(err.current_context().to_string(), "boom");
    }
}
