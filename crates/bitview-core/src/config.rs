//! Session configuration.

/// Environment variable enabling layout validation when a session starts
pub const VALIDATE_ENV: &str = "BITVIEW_VALIDATE";

/// Environment variable enabling call tracing through [`LogTracer`](crate::host::LogTracer)
pub const TRACE_CALLS_ENV: &str = "BITVIEW_TRACE_CALLS";

/// Options for a decoding [`Session`](crate::session::Session)
///
/// ## Example
///
/// ```rust
/// use bitview_core::config::SessionConfig;
///
/// let config = SessionConfig::default().validate_on_start(true);
/// assert!(config.validate_on_start);
/// assert!(!config.trace_calls);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionConfig
{
    /// Check every built-in layout table against the type system when the
    /// session is created
    pub validate_on_start: bool,
    /// Trace entry and exit of decode operations at `trace` level
    pub trace_calls: bool,
}

impl SessionConfig
{
    /// Read `BITVIEW_VALIDATE` and `BITVIEW_TRACE_CALLS`.
    ///
    /// `1`, `true`, `yes` and `on` (any case) enable an option; anything else,
    /// or an unset variable, leaves it off.
    pub fn from_env() -> Self
    {
        Self {
            validate_on_start: env_flag(VALIDATE_ENV),
            trace_calls: env_flag(TRACE_CALLS_ENV),
        }
    }

    #[must_use]
    pub const fn validate_on_start(mut self, enabled: bool) -> Self
    {
        self.validate_on_start = enabled;
        self
    }

    #[must_use]
    pub const fn trace_calls(mut self, enabled: bool) -> Self
    {
        self.trace_calls = enabled;
        self
    }
}

fn env_flag(name: &str) -> bool
{
    std::env::var(name).is_ok_and(|value| parse_flag(&value))
}

fn parse_flag(value: &str) -> bool
{
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_parse_flag()
    {
        assert!(parse_flag("1"));
        assert!(parse_flag(" TRUE "));
        assert!(parse_flag("on"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
        assert!(!parse_flag("enabled"));
    }
}
