//! `${VAR}` and `${VAR:-default}` expansion in config strings.

use std::borrow::Cow;

use crate::ConfigError;

/// Unset variable referenced without a default.
struct Unset(String);

/// Expand environment references in `value`.
///
/// A value without any `${` is returned unchanged, bare `$VAR` included.
/// Once a value contains `${`, the whole string is expanded, so a bare
/// `$VAR` in it is substituted as well (and fails the same way when unset).
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, lookup)
        .map(Cow::into_owned)
        .map_err(|err| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", err.cause.0),
        })
}

/// Expand an optional field in place.
pub(crate) fn expand_opt(value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
    if let Some(raw) = value.as_deref() {
        *value = Some(expand_env(raw, field)?);
    }
    Ok(())
}

fn lookup(var: &str) -> Result<Option<String>, Unset> {
    std::env::var(var)
        .map(Some)
        .map_err(|_| Unset(var.to_owned()))
}
