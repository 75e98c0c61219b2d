use crate::math::Real;
use std::num::NonZeroUsize;

/// Parameters for a time-step of the simulation and its velocity solver.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct IntegrationParameters {
    /// The timestep length (default: `1.0 / 60.0`).
    pub dt: Real,
    /// Bound on the per-step constraint-recovery contribution, i.e. the
    /// default `recovery_clamp` handed to the links' bias loaders
    /// (default: `1.0`).
    ///
    /// Without this bound a large constraint drift would inject an
    /// arbitrarily large corrective velocity in a single step.
    pub max_corrective_velocity: Real,
    /// The relaxation factor of the projected-SOR solver (default: `1.0`,
    /// i.e. plain projected Gauss-Seidel).
    pub sor_relaxation: Real,
    /// Maximum number of iterations run by the velocity solver (default: `50`).
    pub max_solver_iterations: NonZeroUsize,
    /// The solver stops early once the largest multiplier change of a sweep
    /// falls below this threshold (default: `1.0e-6`).
    pub convergence_tolerance: Real,
}

impl IntegrationParameters {
    /// The inverse of the timestep length, i.e. the steps per second (Hz).
    ///
    /// This is zero if `self.dt` is zero.
    #[inline(always)]
    pub fn inv_dt(&self) -> Real {
        if self.dt == 0.0 {
            0.0
        } else {
            1.0 / self.dt
        }
    }
}

impl Default for IntegrationParameters {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0,
            max_corrective_velocity: 1.0,
            sor_relaxation: 1.0,
            max_solver_iterations: NonZeroUsize::new(50).unwrap(),
            convergence_tolerance: 1.0e-6,
        }
    }
}
