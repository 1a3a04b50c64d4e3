use anyhow::{anyhow, Result};

/// Reads an optional numeric setting from the environment, e.g. `EXTRACT_THREADS=8`.
pub fn get_env_usize(key: &str) -> Result<Option<usize>> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<usize>()
            .map(Some)
            .map_err(|_| anyhow!("{} must be a valid number, got {:?}", key, value)),
        Err(_) => Ok(None),
    }
}
