//! Result collection names shared by the parsers and the orchestrator.

pub const GEOM: &str = "VSPAERO_Geom";
pub const SETUP: &str = "VSPAERO_Setup";
pub const HISTORY: &str = "VSPAERO_History";
pub const LOAD: &str = "VSPAERO_Load";
pub const STAB: &str = "VSPAERO_Stab";
pub const WRAPPER: &str = "VSPAERO_Wrapper";
pub const SLICE_CASE: &str = "CpSlicer_Case";
pub const SLICE_WRAPPER: &str = "CpSlicer_Wrapper";
