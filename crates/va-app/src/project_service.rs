//! Settings loading, saving, validation and introspection.

use std::path::Path;

use va_project::SolverSettings;
use va_setup::SweepVectors;

use crate::error::{AppError, AppResult};

/// Short description of a settings document for listings.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsSummary {
    pub name: String,
    pub model_base: String,
    pub analysis_method: String,
    pub batch_mode: bool,
    pub sweep_points: usize,
    pub rotor_count: usize,
    pub control_group_count: usize,
    pub cp_slice_count: usize,
    pub stability: Option<String>,
}

/// Load settings from YAML or JSON (by extension).
pub fn load_settings(path: &Path) -> AppResult<SolverSettings> {
    if !path.exists() {
        return Err(AppError::InvalidInput(format!(
            "settings file not found: {}",
            path.display()
        )));
    }
    Ok(va_project::load(path)?)
}

pub fn save_settings(path: &Path, settings: &SolverSettings) -> AppResult<()> {
    Ok(va_project::save(path, settings)?)
}

pub fn validate_settings(settings: &SolverSettings) -> AppResult<()> {
    Ok(va_project::validate_settings(settings)?)
}

pub fn summarize(settings: &SolverSettings) -> SettingsSummary {
    SettingsSummary {
        name: settings.name.clone(),
        model_base: settings.model.base.clone(),
        analysis_method: settings.analysis_method.to_string(),
        batch_mode: settings.case.batch_mode,
        sweep_points: SweepVectors::from_settings(settings).len(),
        rotor_count: settings.rotors.len(),
        control_group_count: settings.control_groups.len(),
        cp_slice_count: settings.cp_slices.len(),
        stability: settings
            .stability
            .enabled
            .then(|| settings.stability.kind.flag().trim_start_matches('-').to_string()),
    }
}
