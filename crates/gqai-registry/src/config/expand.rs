//! Environment variable interpolation for config string values

use regex::{Captures, Regex};

/// Matches `${VAR}`, `${VAR:-default}` and `$VAR`
const ENV_VAR_PATTERN: &str = r"\$\{([A-Za-z0-9_]+)(:-([^}]*))?\}|\$([A-Za-z0-9_]+)";

/// Expand environment variable references using the process environment.
///
/// References to unset variables without a default are left as written.
pub fn expand_env_vars(value: &str) -> String {
    expand_with(value, |name| std::env::var(name).ok())
}

/// Expand environment variable references using the supplied lookup
pub fn expand_with(value: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let regex = match Regex::new(ENV_VAR_PATTERN) {
        Ok(regex) => regex,
        Err(_) => return value.to_string(),
    };

    regex
        .replace_all(value, |captures: &Captures| {
            let verbatim = captures
                .get(0)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();

            if let Some(name) = captures.get(1) {
                match (lookup(name.as_str()), captures.get(2)) {
                    (Some(found), _) => found,
                    (None, Some(_)) => captures
                        .get(3)
                        .map(|default| default.as_str().to_string())
                        .unwrap_or_default(),
                    (None, None) => verbatim,
                }
            } else if let Some(name) = captures.get(4) {
                lookup(name.as_str()).unwrap_or(verbatim)
            } else {
                verbatim
            }
        })
        .into_owned()
}
