/// Error types shared across curator crates.
///
/// These errors represent failures in infrastructure components (HTTP clients,
/// environment configuration) that are common to every curator binary.
/// Application-specific errors should be defined in each binary crate and wrap
/// `CommonError` via `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("http client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("invalid value for {name}: {value:?}")]
    InvalidEnv { name: String, value: String },
}

/// Source of configuration variables: the process environment in production,
/// a map in tests.
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Reads from the process environment.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Trimmed value of `name`, or `None` when unset or blank.
pub fn lookup_str(lookup: Lookup<'_>, name: &str) -> Option<String> {
    lookup(name)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Read an optional variable and parse it.
///
/// Unset or blank variables yield `Ok(None)`; a value that does not parse is an error
/// rather than a silent fallback.
pub fn lookup_parse<T: std::str::FromStr>(
    lookup: Lookup<'_>,
    name: &str,
) -> Result<Option<T>, CommonError> {
    let Some(raw) = lookup_str(lookup, name) else {
        return Ok(None);
    };
    raw.parse::<T>()
        .map(Some)
        .map_err(|_| CommonError::InvalidEnv {
            name: name.to_string(),
            value: raw,
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn lookup_parse_distinguishes_unset_and_invalid() {
        let vars: HashMap<&str, &str> =
            HashMap::from([("NUM", "42"), ("BAD", "forty-two"), ("BLANK", "  ")]);
        let lookup = |k: &str| vars.get(k).map(|v| v.to_string());

        assert_eq!(lookup_parse::<u32>(&lookup, "NUM").unwrap(), Some(42));
        assert_eq!(lookup_parse::<u32>(&lookup, "BLANK").unwrap(), None);
        assert_eq!(lookup_parse::<u32>(&lookup, "UNSET").unwrap(), None);

        let err = lookup_parse::<u32>(&lookup, "BAD").unwrap_err();
        assert!(err.to_string().contains("BAD"));
        assert!(err.to_string().contains("forty-two"));
    }
}
