use std::{env, str::FromStr};

/// Reads a non-empty environment variable.
pub fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Reads and parses an environment variable, falling back to `default` if the
/// variable is unset. A value that does not parse is reported and replaced by
/// the default as well.
pub fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match var(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("ignoring invalid value `{raw}` for {key}");
            default
        }),
        None => default,
    }
}

/// Interprets `1`, `true`, `yes` and `on` (in any case) as `true`.
pub fn flag(key: &str) -> bool {
    var(key)
        .map(|value| {
            matches!(
                value.trim().to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
        .unwrap_or(false)
}
