//! First-run `.env` handling.

use anyhow::Context;
use std::fs;
use std::path::Path;

/// Written when no `.env` exists so the operator has something to fill in.
pub const EXAMPLE_ENV: &str = r#"# Example .env file

# Required environment variables for nessus-queue
NESSUS_BASE_URL="https://your-nessus-host:8834"
# Access & secret key are generated from the Nessus API keys page
ACCESS_KEY="your_access_key_here"
SECRET_KEY="your_secret_key_here"
NESSUS_USER="your_nessus_username_here"
NESSUS_PASS="your_nessus_password_here"
"#;

/// State of the `.env` file at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvFile {
    /// The file already existed
    Present,
    /// The file was missing and an example was written
    Created,
}

/// Make sure `path` exists, writing [`EXAMPLE_ENV`] there if it does not.
pub fn ensure_env_file(path: &Path) -> anyhow::Result<EnvFile> {
    if path.exists() {
        return Ok(EnvFile::Present);
    }

    fs::write(path, EXAMPLE_ENV)
        .with_context(|| format!("failed to write example env file {}", path.display()))?;
    tracing::info!("Wrote example env file to {}", path.display());
    Ok(EnvFile::Created)
}

/// Load variables from `path` into the process environment.
///
/// Variables already set in the environment win over the file.
pub fn load_env_file(path: &Path) -> anyhow::Result<()> {
    dotenvy::from_path(path)
        .with_context(|| format!("failed to load env file {}", path.display()))?;
    tracing::debug!("Loaded environment from {}", path.display());
    Ok(())
}
