//! Settings validation.

use crate::schema::{LATEST_VERSION, SolverSettings, SweepRangeDef};
use std::collections::HashSet;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Duplicate member: {id} in {context}")]
    DuplicateMember { id: String, context: String },

    #[error("Missing model base name")]
    MissingModel,

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn check_range(field: &str, value: u32, min: u32, max: u32) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(invalid(field, value, &format!("must be in {min}..={max}")));
    }
    Ok(())
}

fn check_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(invalid(field, value, "must be finite"));
    }
    Ok(())
}

fn check_non_negative(field: &str, value: f64) -> Result<(), ValidationError> {
    check_finite(field, value)?;
    if value < 0.0 {
        return Err(invalid(field, value, "must be non-negative"));
    }
    Ok(())
}

fn check_sweep(axis: &str, range: &SweepRangeDef, lo: f64, hi: f64) -> Result<(), ValidationError> {
    if range.npts < 1 {
        return Err(invalid(&format!("{axis}.npts"), range.npts, "must be at least 1"));
    }
    check_range(&format!("{axis}.npts"), range.npts, 1, 100)?;
    for (which, v) in [("start", range.start), ("end", range.end)] {
        let field = format!("{axis}.{which}");
        check_finite(&field, v)?;
        if v < lo || v > hi {
            return Err(invalid(&field, v, &format!("must be in [{lo}, {hi}]")));
        }
    }
    Ok(())
}

pub fn validate_settings(settings: &SolverSettings) -> Result<(), ValidationError> {
    if settings.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: settings.version,
        });
    }

    if settings.model.base.trim().is_empty() {
        return Err(ValidationError::MissingModel);
    }

    check_non_negative("reference.sref", settings.reference.sref)?;
    check_non_negative("reference.bref", settings.reference.bref)?;
    check_non_negative("reference.cref", settings.reference.cref)?;
    for (axis, v) in ["cg.x", "cg.y", "cg.z"].iter().zip(settings.cg) {
        check_finite(axis, v)?;
    }

    check_sweep("alpha", &settings.alpha, -180.0, 180.0)?;
    check_sweep("beta", &settings.beta, -180.0, 180.0)?;
    check_sweep("mach", &settings.mach, 0.0, 5.0)?;

    let case = &settings.case;
    check_range("case.ncpu", case.ncpu, 1, 255)?;
    check_range("case.wake_iterations", case.wake_iterations, 3, 255)?;
    check_range("case.wake_avg_start_iter", case.wake_avg_start_iter, 0, 255)?;
    check_range("case.wake_skip_until_iter", case.wake_skip_until_iter, 0, 255)?;

    check_non_negative("freestream.vinf", settings.freestream.vinf)?;
    check_non_negative("freestream.rho", settings.freestream.rho)?;
    check_non_negative("freestream.re_cref", settings.freestream.re_cref)?;

    let adv = &settings.advanced;
    for (field, value) in [
        ("advanced.cl_max", adv.cl_max),
        ("advanced.max_turn_angle", adv.max_turn_angle),
        ("advanced.far_dist", adv.far_dist),
        ("advanced.ground_height", adv.ground_height),
    ] {
        if let Some(v) = value {
            check_non_negative(field, v)?;
        }
    }

    for rotor in &settings.rotors {
        let ctx = format!("rotor '{}'", rotor.name);
        check_non_negative(&format!("{ctx} diameter"), rotor.diameter)?;
        check_non_negative(&format!("{ctx} hub_diameter"), rotor.hub_diameter)?;
        check_finite(&format!("{ctx} rpm"), rotor.rpm)?;
        check_finite(&format!("{ctx} ct"), rotor.ct)?;
        check_finite(&format!("{ctx} cp"), rotor.cp)?;
    }

    // A subsurface copy may belong to at most one group.
    let mut members = HashSet::new();
    for group in &settings.control_groups {
        check_finite(&format!("group '{}' deflection", group.name), group.deflection)?;
        for member in &group.members {
            let key = (&member.parent_geom_id, &member.ss_id, member.reflect);
            if !members.insert(key) {
                return Err(ValidationError::DuplicateMember {
                    id: format!("{}:{}:{}", member.parent_geom_id, member.ss_id, member.reflect),
                    context: format!("control group '{}'", group.name),
                });
            }
            check_finite(&format!("group '{}' gain", group.name), member.gain)?;
        }
    }

    for (i, slice) in settings.cp_slices.iter().enumerate() {
        check_finite(&format!("cp_slices[{i}].position"), slice.position)?;
    }

    Ok(())
}
