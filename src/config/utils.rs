use std::fmt::Display;
use std::str::FromStr;

/// Read an environment variable, treating empty or whitespace-only values as unset.
pub(crate) fn env_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse an environment variable into `T`, falling back to `default` when unset.
pub(crate) fn parse_env<T>(key: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    match env_var(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| format!("Invalid value for {key} ('{raw}'): {e}")),
        None => Ok(default),
    }
}

/// Parse an optional environment variable into `T`.
pub(crate) fn parse_optional_env<T>(key: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: Display,
{
    env_var(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| format!("Invalid value for {key} ('{raw}'): {e}"))
        })
        .transpose()
}

/// Parse a boolean flag. Accepts true/false, 1/0, yes/no and on/off.
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a boolean environment variable, falling back to `default` when unset.
pub(crate) fn parse_bool_env(key: &str, default: bool) -> Result<bool, String> {
    match env_var(key) {
        Some(raw) => parse_bool(&raw).ok_or_else(|| format!("Invalid boolean for {key}: '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_variants() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool(" YES "), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
