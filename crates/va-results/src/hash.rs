//! Content-based hashing for sweep ids.

use sha2::{Digest, Sha256};
use va_project::SolverSettings;

pub fn compute_sweep_id(settings: &SolverSettings, solver_version: &str) -> String {
    let mut hasher = Sha256::new();

    let settings_json = serde_json::to_string(settings).unwrap_or_default();
    hasher.update(settings_json.as_bytes());

    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}
