//! Secret reference resolution.
//!
//! Values in `config.toml` can point at secrets stored elsewhere:
//!
//! - `env::VAR_NAME` reads `$VAR_NAME`
//! - `pass::path/in/store` runs `pass show path/in/store` and keeps the first line
//! - anything else is used verbatim

use std::process::{Command, ExitStatus};

use thiserror::Error;

/// A secret reference could not be resolved.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("environment variable `{0}` is not set")]
    MissingEnv(String),

    #[error("failed to run `pass show {path}`: {source}")]
    PassSpawn {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`pass show {path}` failed ({status}): {stderr}")]
    PassFailed {
        path: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("`pass show {0}` produced no output")]
    PassEmpty(String),
}

/// Returns true if `value` uses a reference prefix.
pub fn is_reference(value: &str) -> bool {
    value.starts_with("env::") || value.starts_with("pass::")
}

/// Resolves a value that may be a secret reference.
pub fn resolve(value: &str) -> Result<String, SecretError> {
    if let Some(var) = value.strip_prefix("env::") {
        std::env::var(var).map_err(|_| SecretError::MissingEnv(var.to_string()))
    } else if let Some(path) = value.strip_prefix("pass::") {
        resolve_pass(path)
    } else {
        Ok(value.to_string())
    }
}

fn resolve_pass(path: &str) -> Result<String, SecretError> {
    let output = Command::new("pass")
        .arg("show")
        .arg(path)
        .output()
        .map_err(|source| SecretError::PassSpawn {
            path: path.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(SecretError::PassFailed {
            path: path.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::to_string)
        .ok_or_else(|| SecretError::PassEmpty(path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passthrough() {
        assert_eq!(resolve("Bot.abc.def").unwrap(), "Bot.abc.def");
        assert_eq!(resolve("").unwrap(), "");
        assert!(!is_reference("Bot.abc.def"));
    }

    #[test]
    fn env_prefix_resolves() {
        unsafe {
            std::env::set_var("_CALBOT_TEST_SECRET", "discord-token");
        }
        assert!(is_reference("env::_CALBOT_TEST_SECRET"));
        assert_eq!(
            resolve("env::_CALBOT_TEST_SECRET").unwrap(),
            "discord-token"
        );
        unsafe {
            std::env::remove_var("_CALBOT_TEST_SECRET");
        }
    }

    #[test]
    fn env_prefix_missing_var_errors() {
        let err = resolve("env::_CALBOT_NONEXISTENT_VAR_12345").unwrap_err();
        assert!(matches!(err, SecretError::MissingEnv(_)));
        assert!(err.to_string().contains("not set"));
    }

    #[test]
    fn pass_prefix_unknown_entry_errors() {
        // Fails whether or not `pass` is installed.
        assert!(resolve("pass::nonexistent/calbot/entry/12345").is_err());
    }
}
