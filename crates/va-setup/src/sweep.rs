//! Mach/Alpha/Beta sweep generation.

use va_core::{FlowCondition, linspace};
use va_project::{SolverSettings, SweepRangeDef};

/// Definition of a single linear sweep axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepRange {
    pub start: f64,
    pub end: f64,
    /// Number of points; zero is treated as one.
    pub npts: usize,
}

impl SweepRange {
    pub fn new(start: f64, end: f64, npts: usize) -> Self {
        Self { start, end, npts }
    }

    /// Generate all points: `[start]` for a single point, otherwise evenly
    /// spaced from `start` to `end` inclusive.
    pub fn generate_points(&self) -> Vec<f64> {
        linspace(self.start, self.end, self.npts)
    }
}

impl From<&SweepRangeDef> for SweepRange {
    fn from(def: &SweepRangeDef) -> Self {
        Self::new(def.start, def.end, def.npts as usize)
    }
}

/// The three independent axis sequences of one sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepVectors {
    pub alpha: Vec<f64>,
    pub beta: Vec<f64>,
    pub mach: Vec<f64>,
}

impl SweepVectors {
    pub fn new(alpha: SweepRange, beta: SweepRange, mach: SweepRange) -> Self {
        Self {
            alpha: alpha.generate_points(),
            beta: beta.generate_points(),
            mach: mach.generate_points(),
        }
    }

    pub fn from_settings(settings: &SolverSettings) -> Self {
        Self::new(
            (&settings.alpha).into(),
            (&settings.beta).into(),
            (&settings.mach).into(),
        )
    }

    /// Only the first value of each axis.
    pub fn first_only(&self) -> Self {
        Self {
            alpha: self.alpha.iter().take(1).copied().collect(),
            beta: self.beta.iter().take(1).copied().collect(),
            mach: self.mach.iter().take(1).copied().collect(),
        }
    }

    /// Number of Cartesian sweep points.
    pub fn len(&self) -> usize {
        self.alpha.len() * self.beta.len() * self.mach.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cartesian product: alpha outermost, then beta, mach innermost.
    pub fn flow_conditions(&self) -> Vec<FlowCondition> {
        let mut out = Vec::with_capacity(self.len());
        for &alpha in &self.alpha {
            for &beta in &self.beta {
                for &mach in &self.mach {
                    out.push(FlowCondition::new(mach, alpha, beta));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_settings_sweep() {
        let settings = SolverSettings::new("t", "/tmp/m");
        let v = SweepVectors::from_settings(&settings);
        assert_eq!(v.alpha, vec![1.0, 5.5, 10.0]);
        assert_eq!(v.beta, vec![0.0]);
        assert_eq!(v.mach, vec![0.0]);
        assert_eq!(v.len(), 3);
    }

    #[test]
    fn ordering_is_alpha_major_mach_minor() {
        let v = SweepVectors::new(
            SweepRange::new(0.0, 1.0, 2),
            SweepRange::new(5.0, 5.0, 1),
            SweepRange::new(0.1, 0.2, 2),
        );
        let fc = v.flow_conditions();
        assert_eq!(fc.len(), 4);
        assert_eq!((fc[0].alpha, fc[0].mach), (0.0, 0.1));
        assert_eq!((fc[1].alpha, fc[1].mach), (0.0, 0.2));
        assert_eq!((fc[2].alpha, fc[2].mach), (1.0, 0.1));
        assert!(fc.iter().all(|f| f.beta == 5.0));
    }

    #[test]
    fn first_only_truncates() {
        let v = SweepVectors::new(
            SweepRange::new(0.0, 4.0, 5),
            SweepRange::new(-2.0, 2.0, 3),
            SweepRange::new(0.3, 0.5, 2),
        );
        let f = v.first_only();
        assert_eq!(f.alpha, vec![0.0]);
        assert_eq!(f.beta, vec![-2.0]);
        assert_eq!(f.mach, vec![0.3]);
    }

    proptest! {
        #[test]
        fn multi_point_sweep_spans_range(
            start in -180.0f64..180.0,
            end in -180.0f64..180.0,
            n in 2usize..100,
        ) {
            let pts = SweepRange::new(start, end, n).generate_points();
            prop_assert_eq!(pts.len(), n);
            prop_assert_eq!(pts[0], start);
            prop_assert_eq!(pts[n - 1], end);
            for w in pts.windows(2) {
                if end >= start {
                    prop_assert!(w[1] >= w[0]);
                } else {
                    prop_assert!(w[1] <= w[0]);
                }
            }
        }

        #[test]
        fn single_point_sweep_ignores_end(start in -180.0f64..180.0, end in -180.0f64..180.0) {
            let pts = SweepRange::new(start, end, 1).generate_points();
            prop_assert_eq!(pts, vec![start]);
        }
    }
}
