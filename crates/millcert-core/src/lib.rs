#![forbid(unsafe_code)]

mod config;
mod errors;
pub mod text;

use sha2::{Digest, Sha256};

pub use config::{non_blank_env, resolve_config_path, ConfigPathScope};
pub use errors::{ExitCode, MachineError};

pub const CRATE_NAME: &str = "millcert-core";

pub const ENV_MILLCERT_LOG_LEVEL: &str = "MILLCERT_LOG_LEVEL";
pub const ENV_MILLCERT_CONFIG: &str = "MILLCERT_CONFIG";
pub const ENV_MILLCERT_DEFAULT_COMPANY: &str = "MILLCERT_DEFAULT_COMPANY";
pub const ENV_MILLCERT_ARTIFACT_PREFIX: &str = "MILLCERT_ARTIFACT_PREFIX";

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
