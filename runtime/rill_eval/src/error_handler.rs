//! The default error handler behind the fail-fast/quiet split.
//!
//! Consulted at the reactive dispatch boundary with the failing scope and
//! source location. Fail-fast propagates; quiet mode converts the failure
//! into an ERROR-variant value after logging it. Assertion and
//! recursion-limit errors are never absorbed regardless of mode.

use tracing::warn;

use rill_value::{
    config, ErrorHandler, Scope, SourceLocation, Value, ValueError, ValueResult,
};

/// Process-default handler honoring the global fail-fast flag.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultErrorHandler;

impl DefaultErrorHandler {
    /// Register this handler process-wide.
    pub fn install() {
        config::set_error_handler(std::sync::Arc::new(DefaultErrorHandler));
    }
}

impl ErrorHandler for DefaultErrorHandler {
    fn handle(
        &self,
        scope: Option<&Scope>,
        location: Option<&SourceLocation>,
        error: ValueError,
    ) -> ValueResult {
        if !error.quietable() || config::fail_fast() {
            return Err(attach_location(error, location));
        }

        warn!(
            code = error.kind.code(),
            scope = scope.map(Scope::label),
            location = location.map(ToString::to_string),
            "absorbing error into ERROR value: {}",
            error.message
        );
        Ok(Value::error(attach_location(error, location)))
    }
}

fn attach_location(error: ValueError, location: Option<&SourceLocation>) -> ValueError {
    match (&error.location, location) {
        (None, Some(found)) => error.at(found.clone()),
        _ => error,
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use rill_value::{assertion_failed, exception};

    // The fail-fast flag is process-wide; tests touching it serialize.
    static FLAG_GUARD: parking_lot::Mutex<()> = parking_lot::Mutex::new(());

    #[test]
    fn quiet_mode_absorbs_ordinary_errors() {
        let _serialized = FLAG_GUARD.lock();
        config::set_fail_fast(false);
        let result = DefaultErrorHandler.handle(None, None, exception("io"));
        config::set_fail_fast(true);

        assert!(result.is_ok_and(|v| v.is_error()));
    }

    #[test]
    fn assertions_always_propagate() {
        let _serialized = FLAG_GUARD.lock();
        config::set_fail_fast(false);
        let result = DefaultErrorHandler.handle(None, None, assertion_failed("no"));
        config::set_fail_fast(true);

        assert!(result.is_err());
    }

    #[test]
    fn locations_attach_on_the_way_out() {
        let _serialized = FLAG_GUARD.lock();
        config::set_fail_fast(true);
        let here = SourceLocation {
            source: "main.rill".to_string(),
            line: 10,
            column: 2,
        };
        let result = DefaultErrorHandler.handle(None, Some(&here), exception("boom"));
        let err = result.expect_err("fail-fast propagates");
        assert_eq!(err.location, Some(here));
    }
}
