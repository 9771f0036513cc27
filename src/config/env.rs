//! `${VAR}` expansion for secrets kept out of the config file.

use regex::{Captures, Regex};
use std::env;
use std::sync::OnceLock;

use super::ConfigError;

fn env_ref_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env reference pattern is valid")
    })
}

/// Replace every `${VAR}` in each field with the environment variable's value.
///
/// Values are inserted as-is, so quotes and backslashes survive. All unset
/// variables are reported together and nothing is changed unless every one
/// is set.
pub fn expand_env_fields<'a>(
    fields: impl IntoIterator<Item = &'a mut String>,
) -> Result<(), ConfigError> {
    let mut missing = Vec::new();
    let expanded: Vec<(&mut String, String)> = fields
        .into_iter()
        .map(|field| {
            let value = expand_into(field, &mut missing);
            (field, value)
        })
        .collect();

    if !missing.is_empty() {
        return Err(ConfigError::MissingEnv(missing.join(", ")));
    }
    for (field, value) in expanded {
        *field = value;
    }
    Ok(())
}

fn expand_into(s: &str, missing: &mut Vec<String>) -> String {
    let expanded = env_ref_pattern().replace_all(s, |caps: &Captures| {
        let name = &caps[1];
        match env::var(name) {
            Ok(value) => value,
            Err(_) => {
                if !missing.iter().any(|m| m == name) {
                    missing.push(name.to_string());
                }
                String::new()
            }
        }
    });
    expanded.into_owned()
}
