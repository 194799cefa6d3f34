//! Settings document definitions.

use serde::{Deserialize, Serialize};
use va_core::{AnalysisMethod, CutAxis, Preconditioner, StabilityType};

pub const LATEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolverSettings {
    pub version: u32,
    #[serde(default)]
    pub name: String,
    pub model: ModelDef,
    #[serde(default)]
    pub geom_set: u32,
    #[serde(default)]
    pub analysis_method: AnalysisMethod,
    #[serde(default)]
    pub reference: ReferenceDef,
    #[serde(default)]
    pub cg: [f64; 3],
    #[serde(default = "default_alpha")]
    pub alpha: SweepRangeDef,
    #[serde(default = "default_beta")]
    pub beta: SweepRangeDef,
    #[serde(default = "default_mach")]
    pub mach: SweepRangeDef,
    #[serde(default)]
    pub case: CaseSetupDef,
    #[serde(default)]
    pub freestream: FreestreamDef,
    #[serde(default)]
    pub advanced: AdvancedDef,
    #[serde(default)]
    pub stability: StabilityDef,
    #[serde(default)]
    pub rotors: Vec<RotorDiskDef>,
    #[serde(default)]
    pub control_groups: Vec<ControlGroupDef>,
    #[serde(default)]
    pub cp_slices: Vec<CpSliceDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<GeometrySnapshot>,
}

impl SolverSettings {
    /// Settings with every default for a model base path.
    pub fn new(name: impl Into<String>, model_base: impl Into<String>) -> Self {
        Self {
            version: LATEST_VERSION,
            name: name.into(),
            model: ModelDef::new(model_base),
            geom_set: 0,
            analysis_method: AnalysisMethod::default(),
            reference: ReferenceDef::default(),
            cg: [0.0; 3],
            alpha: default_alpha(),
            beta: default_beta(),
            mach: default_mach(),
            case: CaseSetupDef::default(),
            freestream: FreestreamDef::default(),
            advanced: AdvancedDef::default(),
            stability: StabilityDef::default(),
            rotors: Vec::new(),
            control_groups: Vec::new(),
            cp_slices: Vec::new(),
            geometry: None,
        }
    }
}

/// Where the model files live and which executables to run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelDef {
    /// Model path without extension; every solver file derives from it.
    pub base: String,
    #[serde(default = "default_solver_exe")]
    pub solver_exe: String,
    #[serde(default = "default_slicer_exe")]
    pub slicer_exe: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exe_dir: Option<String>,
}

impl ModelDef {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            solver_exe: default_solver_exe(),
            slicer_exe: default_slicer_exe(),
            exe_dir: None,
        }
    }
}

fn default_solver_exe() -> String {
    "vspaero".to_string()
}

fn default_slicer_exe() -> String {
    "vspaero_slicer".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReferenceDef {
    pub sref: f64,
    pub bref: f64,
    pub cref: f64,
}

impl Default for ReferenceDef {
    fn default() -> Self {
        Self {
            sref: 100.0,
            bref: 1.0,
            cref: 1.0,
        }
    }
}

/// Start/end/count triple for one sweep axis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SweepRangeDef {
    pub start: f64,
    pub end: f64,
    pub npts: u32,
}

impl SweepRangeDef {
    pub fn new(start: f64, end: f64, npts: u32) -> Self {
        Self { start, end, npts }
    }

    pub fn single(value: f64) -> Self {
        Self::new(value, value, 1)
    }
}

fn default_alpha() -> SweepRangeDef {
    SweepRangeDef::new(1.0, 10.0, 3)
}

fn default_beta() -> SweepRangeDef {
    SweepRangeDef::single(0.0)
}

fn default_mach() -> SweepRangeDef {
    SweepRangeDef::single(0.0)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseSetupDef {
    pub ncpu: u32,
    pub wake_iterations: u32,
    #[serde(default)]
    pub wake_avg_start_iter: u32,
    #[serde(default)]
    pub wake_skip_until_iter: u32,
    /// Square root of the wake node count; the setup file gets the square.
    pub root_wake_nodes: u32,
    pub batch_mode: bool,
}

impl Default for CaseSetupDef {
    fn default() -> Self {
        Self {
            ncpu: 4,
            wake_iterations: 5,
            wake_avg_start_iter: 0,
            wake_skip_until_iter: 0,
            root_wake_nodes: 64,
            batch_mode: true,
        }
    }
}

impl CaseSetupDef {
    pub fn num_wake_nodes(&self) -> u64 {
        u64::from(self.root_wake_nodes) * u64::from(self.root_wake_nodes)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FreestreamDef {
    pub vinf: f64,
    pub rho: f64,
    pub re_cref: f64,
}

impl Default for FreestreamDef {
    fn default() -> Self {
        Self {
            vinf: 100.0,
            rho: 0.002377,
            re_cref: 1.0e7,
        }
    }
}

/// Solver tuning switches. Absent optional values are written as -1.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdvancedDef {
    #[serde(default)]
    pub preconditioner: Preconditioner,
    #[serde(default)]
    pub kt_correction: bool,
    #[serde(default)]
    pub symmetry: bool,
    #[serde(default)]
    pub write_2d_fem: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cl_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_turn_angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub far_dist: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_height: Option<f64>,
    #[serde(default = "default_true")]
    pub cp_slice_flag: bool,
    #[serde(default)]
    pub from_steady_state: bool,
}

impl Default for AdvancedDef {
    fn default() -> Self {
        Self {
            preconditioner: Preconditioner::Matrix,
            kt_correction: false,
            symmetry: false,
            write_2d_fem: false,
            cl_max: None,
            max_turn_angle: None,
            far_dist: None,
            ground_height: None,
            cp_slice_flag: true,
            from_steady_state: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StabilityDef {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub kind: StabilityType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RotorDiskDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_geom_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surf_index: Option<u32>,
    #[serde(default)]
    pub position: [f64; 3],
    #[serde(default)]
    pub normal: [f64; 3],
    #[serde(default = "default_rotor_diameter")]
    pub diameter: f64,
    #[serde(default)]
    pub hub_diameter: f64,
    #[serde(default = "default_rotor_rpm")]
    pub rpm: f64,
    #[serde(default = "default_rotor_ct")]
    pub ct: f64,
    #[serde(default = "default_rotor_cp")]
    pub cp: f64,
    #[serde(default = "default_true")]
    pub used: bool,
}

impl Default for RotorDiskDef {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            parent_geom_id: None,
            surf_index: None,
            position: [0.0; 3],
            normal: [0.0; 3],
            diameter: default_rotor_diameter(),
            hub_diameter: 0.0,
            rpm: default_rotor_rpm(),
            ct: default_rotor_ct(),
            cp: default_rotor_cp(),
            used: true,
        }
    }
}

fn default_rotor_diameter() -> f64 {
    10.0
}

fn default_rotor_rpm() -> f64 {
    2000.0
}

fn default_rotor_ct() -> f64 {
    0.4
}

fn default_rotor_cp() -> f64 {
    0.6
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControlGroupDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_geom_base: Option<String>,
    #[serde(default)]
    pub members: Vec<ControlMemberDef>,
    #[serde(default = "default_true")]
    pub used: bool,
    #[serde(default)]
    pub deflection: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControlMemberDef {
    pub parent_geom_id: String,
    pub ss_id: String,
    #[serde(default)]
    pub reflect: u32,
    /// Display name written to the setup file; refreshed from the geometry snapshot.
    #[serde(default)]
    pub full_name: String,
    #[serde(default = "default_gain")]
    pub gain: f64,
}

fn default_gain() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CpSliceDef {
    #[serde(default)]
    pub axis: CutAxis,
    #[serde(default)]
    pub position: f64,
    #[serde(default = "default_true")]
    pub draw: bool,
}

impl Default for CpSliceDef {
    fn default() -> Self {
        Self {
            axis: CutAxis::Y,
            position: 0.0,
            draw: true,
        }
    }
}

/// Externally computed geometry facts the driver needs: actuator disk
/// surfaces and control subsurfaces.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GeometrySnapshot {
    #[serde(default)]
    pub disk_surfaces: Vec<DiskSurfaceDef>,
    #[serde(default)]
    pub subsurfaces: Vec<SubSurfaceDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh_geom_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiskSurfaceDef {
    pub geom_id: String,
    pub geom_name: String,
    pub surf_index: u32,
    pub diameter: f64,
    #[serde(default)]
    pub position: [f64; 3],
    /// Outward disk normal as reported by the geometry; the rotor faces the opposite way.
    #[serde(default)]
    pub normal: [f64; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubSurfaceDef {
    pub geom_id: String,
    pub geom_name: String,
    pub ss_id: String,
    pub ss_name: String,
    #[serde(default = "default_symm_copies")]
    pub num_symm_copies: u32,
}

fn default_symm_copies() -> u32 {
    1
}

fn default_true() -> bool {
    true
}
