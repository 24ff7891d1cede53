// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Server configuration loaded from environment variables.

use scpatch_processing::RunConfig;
use std::path::PathBuf;
use std::str::FromStr;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on.
    pub port: u16,
    /// Directory holding the model artifacts and their baselines.
    pub output_dir: PathBuf,
    /// Model every patch is applied to.
    pub model_name: String,
    /// Maximum patch body size in MB.
    pub max_patch_size_mb: usize,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            port: env_or("PORT", 8080),
            output_dir: std::env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    // Docker images mount the artifact volume at /app/artifacts
                    if std::path::Path::new("/.dockerenv").exists() {
                        PathBuf::from("/app/artifacts")
                    } else {
                        std::env::current_dir()
                            .map(|dir| dir.join("artifacts"))
                            .unwrap_or_else(|_| PathBuf::from("./artifacts"))
                    }
                }),
            model_name: std::env::var("MODEL_NAME").unwrap_or_else(|_| "model".into()),
            max_patch_size_mb: env_or("MAX_PATCH_SIZE_MB", 16),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 300),
        }
    }

    pub fn max_patch_bytes(&self) -> usize {
        self.max_patch_size_mb * 1024 * 1024
    }

    pub fn run_config(&self) -> RunConfig {
        RunConfig::new(self.output_dir.clone(), self.model_name.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        std::env::set_var("SCPATCH_TEST_PORT_GARBAGE", "eighty");
        assert_eq!(env_or("SCPATCH_TEST_PORT_GARBAGE", 8080u16), 8080);
        std::env::set_var("SCPATCH_TEST_PORT_GOOD", "9000");
        assert_eq!(env_or("SCPATCH_TEST_PORT_GOOD", 8080u16), 9000);
        assert_eq!(env_or("SCPATCH_TEST_PORT_UNSET", 7u64), 7);
    }

    #[test]
    fn test_max_patch_bytes() {
        let config = Config {
            port: 0,
            output_dir: PathBuf::from("out"),
            model_name: "m".into(),
            max_patch_size_mb: 2,
            request_timeout_secs: 1,
        };
        assert_eq!(config.max_patch_bytes(), 2 * 1024 * 1024);
        assert_eq!(config.run_config().model_name, "m");
    }
}
