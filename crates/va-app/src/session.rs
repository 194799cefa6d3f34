//! Solver session: live setup tables, model files and the result store.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, info, warn};
use va_core::ResultId;
use va_project::SolverSettings;
use va_results::{ResultStore, ResultValue, csv, names};
use va_setup::{
    ControlGroupTable, CpSliceList, DeckInputs, ModelFiles, RotorDiskTable, SweepVectors,
    SetupError, SetupResult, WaitPolicy, wait_for_file, write_setup_file,
};
use va_solver::{DEFAULT_POLL, SolverControl};

use crate::error::{AppError, AppResult};

/// One model's solver state.
///
/// Settings hold the persisted form; the control group, rotor disk and Cp
/// slice tables are the working copies edited between sweeps and written
/// back by [`AeroSession::to_settings`].
pub struct AeroSession {
    pub(crate) settings: SolverSettings,
    pub(crate) files: ModelFiles,
    pub(crate) groups: ControlGroupTable,
    pub(crate) rotors: RotorDiskTable,
    pub(crate) slices: CpSliceList,
    pub(crate) results: ResultStore,
    pub(crate) control: SolverControl,
    pub(crate) wait: WaitPolicy,
    pub(crate) poll: Duration,
}

impl AeroSession {
    pub fn new(settings: SolverSettings) -> Self {
        let files = ModelFiles::new(&settings.model.base, settings.analysis_method);
        let mut session = Self {
            groups: ControlGroupTable::from_defs(&settings.control_groups),
            rotors: RotorDiskTable::from_defs(&settings.rotors),
            slices: CpSliceList::from_defs(&settings.cp_slices),
            files,
            settings,
            results: ResultStore::new(),
            control: SolverControl::new(),
            wait: WaitPolicy::default(),
            poll: DEFAULT_POLL,
        };
        session.update();
        session
    }

    /// Override the file-visibility wait (tests use an immediate policy).
    pub fn with_wait_policy(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_poll_interval(mut self, poll: Duration) -> Self {
        self.poll = poll;
        self
    }

    /// Re-derive file names and reconcile the tables against the geometry
    /// snapshot, then clamp rotor hubs.
    pub fn update(&mut self) {
        self.files = ModelFiles::new(&self.settings.model.base, self.settings.analysis_method);
        if let Some(geometry) = &self.settings.geometry {
            self.rotors.reconcile(&geometry.disk_surfaces);
            self.groups.refresh_from_geometry(&geometry.subsurfaces);
        }
        self.rotors.update();
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    /// Replace the settings; the working tables are rebuilt from them.
    pub fn set_settings(&mut self, settings: SolverSettings) {
        self.groups = ControlGroupTable::from_defs(&settings.control_groups);
        self.rotors = RotorDiskTable::from_defs(&settings.rotors);
        self.slices = CpSliceList::from_defs(&settings.cp_slices);
        self.settings = settings;
        self.update();
    }

    /// Settings with the working tables written back.
    pub fn to_settings(&self) -> SolverSettings {
        let mut settings = self.settings.clone();
        settings.control_groups = self.groups.to_defs();
        settings.rotors = self.rotors.to_defs();
        settings.cp_slices = self.slices.to_defs();
        settings
    }

    pub fn files(&self) -> &ModelFiles {
        &self.files
    }

    pub fn groups(&self) -> &ControlGroupTable {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut ControlGroupTable {
        &mut self.groups
    }

    pub fn rotors(&self) -> &RotorDiskTable {
        &self.rotors
    }

    pub fn rotors_mut(&mut self) -> &mut RotorDiskTable {
        &mut self.rotors
    }

    pub fn slices(&self) -> &CpSliceList {
        &self.slices
    }

    pub fn slices_mut(&mut self) -> &mut CpSliceList {
        &mut self.slices
    }

    pub fn results(&self) -> &ResultStore {
        &self.results
    }

    pub fn results_mut(&mut self) -> &mut ResultStore {
        &mut self.results
    }

    /// Handle for requesting a kill from another thread.
    pub fn control(&self) -> SolverControl {
        self.control.clone()
    }

    pub fn sweep_vectors(&self) -> SweepVectors {
        SweepVectors::from_settings(&self.settings)
    }

    pub(crate) fn require_model(&self) -> AppResult<()> {
        if self.settings.model.base.trim().is_empty() {
            return Err(AppError::NoModel);
        }
        Ok(())
    }

    /// Record the externally produced geometry files as `VSPAERO_Geom`.
    ///
    /// Missing files are logged; the record is written regardless.
    pub fn compute_geometry(&mut self) -> AppResult<ResultId> {
        self.require_model()?;
        self.update();

        if wait_for_file(&self.files.degen_geom, self.wait).is_err() {
            warn!(path = %self.files.degen_geom.display(), "DegenGeom file not found");
        }
        if let Some(tri) = &self.files.comp_geom
            && wait_for_file(tri, self.wait).is_err()
        {
            warn!(path = %tri.display(), "CompGeom file not found");
        }

        let cleared = self.results.clear_named(names::GEOM);
        debug!(cleared, "previous geometry results cleared");

        // Panel runs also record the trimmed mesh; vortex-lattice runs leave both empty.
        let (comp_geom, mesh_geom_id) = match &self.files.comp_geom {
            Some(tri) => (
                tri.display().to_string(),
                self.settings
                    .geometry
                    .as_ref()
                    .and_then(|g| g.mesh_geom_id.clone())
                    .unwrap_or_default(),
            ),
            None => (String::new(), String::new()),
        };

        let id = self.results.create(names::GEOM);
        let record = self.results.require_mut(id)?;
        record.add("GeometrySet", i64::from(self.settings.geom_set));
        record.add("AnalysisMethod", self.settings.analysis_method.code());
        record.add("DegenGeomFileName", self.files.degen_geom.display().to_string());
        record.add("CompGeomFileName", comp_geom);
        record.add("Mesh_GeomID", mesh_geom_id);
        Ok(id)
    }

    /// Write the setup file and record it as `VSPAERO_Setup`.
    pub fn create_setup_file(&mut self) -> AppResult<ResultId> {
        self.require_model()?;
        self.update();

        let sweep = self.sweep_vectors();
        let inputs = DeckInputs {
            settings: &self.settings,
            sweep: &sweep,
            rotors: &self.rotors,
            groups: &self.groups,
        };
        tolerate_late_file(write_setup_file(&self.files.setup, &inputs, self.wait))?;
        info!(path = %self.files.setup.display(), "setup file written");

        let id = self.results.create(names::SETUP);
        self.results
            .require_mut(id)?
            .add("SetupFile", self.files.setup.display().to_string());
        Ok(id)
    }

    /// Delete every history, load, stability and wrapper result.
    pub fn clear_all_previous_results(&mut self) {
        let mut cleared = 0;
        for name in [names::HISTORY, names::LOAD, names::STAB, names::WRAPPER] {
            cleared += self.results.clear_named(name);
        }
        debug!(cleared, "previous solver results cleared");
    }

    pub fn clear_cp_slice_results(&mut self) {
        let cleared = self.results.clear_named(names::SLICE_CASE)
            + self.results.clear_named(names::SLICE_WRAPPER);
        debug!(cleared, "previous Cp slice results cleared");
    }

    /// Write every result referenced by the latest `VSPAERO_Wrapper` to CSV
    /// and wait for the file to appear.
    pub fn export_results_to_csv(&self, path: &Path) -> AppResult<()> {
        let children = crate::query::wrapper_children(&self.results)?;
        if children.is_empty() {
            warn!("{} result contains no child results", names::WRAPPER);
        }
        csv::write_csv(&self.results, &children, path)?;
        wait_for_file(path, self.wait)?;
        Ok(())
    }
}

/// A written file that is still not visible after the wait is logged, not
/// fatal. Create and write failures pass through.
pub(crate) fn tolerate_late_file(result: SetupResult<()>) -> AppResult<()> {
    match result {
        Err(SetupError::FileDoesNotExist { path }) => {
            warn!(path = %path.display(), "file not visible after wait; continuing");
            Ok(())
        }
        other => Ok(other?),
    }
}

/// Result ids as the string vector stored in wrapper records.
pub(crate) fn id_strings(ids: &[ResultId]) -> ResultValue {
    ResultValue::StrVec(ids.iter().map(ToString::to_string).collect())
}
