//! Flow conditions and the solver option enums shared by every layer.

use core::fmt;
use core::str::FromStr;

use crate::CoreError;

/// One point of a Mach/Alpha/Beta sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlowCondition {
    pub mach: f64,
    pub alpha: f64,
    pub beta: f64,
}

impl FlowCondition {
    pub fn new(mach: f64, alpha: f64, beta: f64) -> Self {
        Self { mach, alpha, beta }
    }
}

impl fmt::Display for FlowCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Mach {:.2} Alpha {:.3} Beta {:.3}",
            self.mach, self.alpha, self.beta
        )
    }
}

/// Aerodynamic model used by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AnalysisMethod {
    #[default]
    VortexLattice,
    Panel,
}

impl AnalysisMethod {
    /// Integer code stored in result records.
    pub fn code(self) -> i64 {
        match self {
            Self::VortexLattice => 0,
            Self::Panel => 1,
        }
    }
}

impl fmt::Display for AnalysisMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VortexLattice => write!(f, "vlm"),
            Self::Panel => write!(f, "panel"),
        }
    }
}

impl FromStr for AnalysisMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vlm" | "vortex_lattice" | "vortex-lattice" => Ok(Self::VortexLattice),
            "panel" => Ok(Self::Panel),
            _ => Err(CoreError::UnknownName {
                what: "analysis method",
                value: s.to_string(),
            }),
        }
    }
}

/// Stability analysis requested from the solver.
///
/// `Default` produces the full derivative tables; the single-axis variants
/// produce a name/value listing for one perturbation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StabilityType {
    #[default]
    Default,
    PAnalysis,
    QAnalysis,
    RAnalysis,
}

impl StabilityType {
    pub fn code(self) -> i64 {
        match self {
            Self::Default => 0,
            Self::PAnalysis => 1,
            Self::QAnalysis => 2,
            Self::RAnalysis => 3,
        }
    }

    /// Solver command-line flag.
    pub fn flag(self) -> &'static str {
        match self {
            Self::Default => "-stab",
            Self::PAnalysis => "-pstab",
            Self::QAnalysis => "-qstab",
            Self::RAnalysis => "-rstab",
        }
    }
}

impl FromStr for StabilityType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" | "stab" => Ok(Self::Default),
            "p" | "pstab" => Ok(Self::PAnalysis),
            "q" | "qstab" => Ok(Self::QAnalysis),
            "r" | "rstab" => Ok(Self::RAnalysis),
            _ => Err(CoreError::UnknownName {
                what: "stability type",
                value: s.to_string(),
            }),
        }
    }
}

/// Linear solver preconditioner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Preconditioner {
    #[default]
    Matrix,
    Jacobi,
    Ssor,
}

impl Preconditioner {
    /// Name written into the setup file.
    pub fn deck_name(self) -> &'static str {
        match self {
            Self::Matrix => "Matrix",
            Self::Jacobi => "Jacobi",
            Self::Ssor => "SSOR",
        }
    }

    /// Command-line flag; the matrix preconditioner is the solver default.
    pub fn flag(self) -> Option<&'static str> {
        match self {
            Self::Matrix => None,
            Self::Jacobi => Some("-jacobi"),
            Self::Ssor => Some("-ssor"),
        }
    }
}

/// Axis normal to a Cp slice plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CutAxis {
    X,
    #[default]
    Y,
    Z,
}

impl CutAxis {
    pub fn code(self) -> i64 {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::X),
            1 => Some(Self::Y),
            2 => Some(Self::Z),
            _ => None,
        }
    }

    /// Axis letter in the cuts file: `120 + code`, i.e. 'x', 'y' or 'z'.
    pub fn cuts_char(self) -> char {
        char::from(120 + self.code() as u8)
    }

    /// Cut type code recovered from an upper-case axis letter in a slice
    /// file block name (ASCII 'X' = 88).
    pub fn code_from_letter(letter: u8) -> i64 {
        i64::from(letter) - 88
    }
}

impl FromStr for CutAxis {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x" => Ok(Self::X),
            "y" => Ok(Self::Y),
            "z" => Ok(Self::Z),
            _ => Err(CoreError::UnknownName {
                what: "cut axis",
                value: s.to_string(),
            }),
        }
    }
}
