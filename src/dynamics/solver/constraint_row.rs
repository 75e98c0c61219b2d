use crate::dynamics::{RigidBodyHandle, RigidBodySet};
use crate::math::{AngVector, Real, Vector};
use na::DVector;

/// The enforcement regime of a scalar constraint row.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum ConstraintMode {
    /// Equality constraint: the multiplier may take either sign.
    Bilateral,
    /// One-sided inequality constraint: the multiplier is projected to be
    /// non-negative.
    Unilateral,
}

/// One scalar constraint between two rigid bodies.
///
/// The row owns a six-component Jacobian partition per body (three linear and
/// three angular entries, the angular ones expressed in the body's local
/// frame, matching the convention of the bodies' generalized velocities), a
/// right-hand-side bias, and the multiplier computed by the solver.
///
/// Jacobian values are only meaningful after the owning link's `update` ran
/// for the current poses, and the mode must be set before any solver pass
/// reads the row.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ConstraintRow {
    body1: RigidBodyHandle,
    body2: RigidBodyHandle,
    /// Linear Jacobian partition for the first body.
    pub lin_jac1: Vector,
    /// Angular (body-local) Jacobian partition for the first body.
    pub ang_jac1: AngVector,
    /// Linear Jacobian partition for the second body.
    pub lin_jac2: Vector,
    /// Angular (body-local) Jacobian partition for the second body.
    pub ang_jac2: AngVector,
    rhs: Real,
    multiplier: Real,
    mode: ConstraintMode,
}

impl Default for ConstraintRow {
    fn default() -> Self {
        Self {
            body1: RigidBodyHandle::invalid(),
            body2: RigidBodyHandle::invalid(),
            lin_jac1: Vector::zeros(),
            ang_jac1: AngVector::zeros(),
            lin_jac2: Vector::zeros(),
            ang_jac2: AngVector::zeros(),
            rhs: 0.0,
            multiplier: 0.0,
            mode: ConstraintMode::Bilateral,
        }
    }
}

impl ConstraintRow {
    /// Creates a zeroed bilateral row with invalid body references.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the row to the generalized-velocity blocks of two bodies.
    pub fn set_bodies(&mut self, body1: RigidBodyHandle, body2: RigidBodyHandle) {
        self.body1 = body1;
        self.body2 = body2;
    }

    /// The first connected body.
    #[inline]
    pub fn body1(&self) -> RigidBodyHandle {
        self.body1
    }

    /// The second connected body.
    #[inline]
    pub fn body2(&self) -> RigidBodyHandle {
        self.body2
    }

    /// The enforcement regime of this row.
    #[inline]
    pub fn mode(&self) -> ConstraintMode {
        self.mode
    }

    /// Sets the enforcement regime of this row.
    pub fn set_mode(&mut self, mode: ConstraintMode) {
        self.mode = mode;
    }

    /// The right-hand-side bias term.
    #[inline]
    pub fn rhs(&self) -> Real {
        self.rhs
    }

    /// Sets the right-hand-side bias term.
    pub fn set_rhs(&mut self, rhs: Real) {
        self.rhs = rhs;
    }

    /// The current multiplier.
    #[inline]
    pub fn multiplier(&self) -> Real {
        self.multiplier
    }

    /// Sets the multiplier.
    pub fn set_multiplier(&mut self, multiplier: Real) {
        self.multiplier = multiplier;
    }

    /// Projects a candidate multiplier onto the feasible set of this row's
    /// mode.
    #[inline]
    pub fn project_multiplier(&self, candidate: Real) -> Real {
        match self.mode {
            ConstraintMode::Bilateral => candidate,
            ConstraintMode::Unilateral => candidate.max(0.0),
        }
    }

    /// The product of this row's Jacobian with a global generalized-velocity
    /// vector.
    pub fn jv(&self, bodies: &RigidBodySet, vels: &DVector<Real>) -> Real {
        let off1 = bodies.dof_offset(self.body1);
        let off2 = bodies.dof_offset(self.body2);
        self.lin_jac1.dot(&vels.fixed_rows::<3>(off1))
            + self.ang_jac1.dot(&vels.fixed_rows::<3>(off1 + 3))
            + self.lin_jac2.dot(&vels.fixed_rows::<3>(off2))
            + self.ang_jac2.dot(&vels.fixed_rows::<3>(off2 + 3))
    }

    /// Accumulates `factor * Jᵀ` into the addressed blocks of a global
    /// vector, skipping non-dynamic bodies.
    pub fn apply_jacobian_transpose(
        &self,
        bodies: &RigidBodySet,
        out: &mut DVector<Real>,
        factor: Real,
    ) {
        if bodies[self.body1].is_dynamic() {
            let off1 = bodies.dof_offset(self.body1);
            let mut lin = out.fixed_rows_mut::<3>(off1);
            lin += self.lin_jac1 * factor;
            let mut ang = out.fixed_rows_mut::<3>(off1 + 3);
            ang += self.ang_jac1 * factor;
        }
        if bodies[self.body2].is_dynamic() {
            let off2 = bodies.dof_offset(self.body2);
            let mut lin = out.fixed_rows_mut::<3>(off2);
            lin += self.lin_jac2 * factor;
            let mut ang = out.fixed_rows_mut::<3>(off2 + 3);
            ang += self.ang_jac2 * factor;
        }
    }

    /// The diagonal Schur-complement entry `J · M⁻¹ · Jᵀ` of this row.
    ///
    /// Zero when both bodies are fixed; the solver skips such rows.
    pub fn schur_diagonal(&self, bodies: &RigidBodySet) -> Real {
        let b1 = &bodies[self.body1];
        let b2 = &bodies[self.body2];
        let inv_i1 = b1.effective_inv_principal_inertia();
        let inv_i2 = b2.effective_inv_principal_inertia();

        self.lin_jac1.norm_squared() * b1.effective_inv_mass()
            + self.ang_jac1.component_mul(&inv_i1).dot(&self.ang_jac1)
            + self.lin_jac2.norm_squared() * b2.effective_inv_mass()
            + self.ang_jac2.component_mul(&inv_i2).dot(&self.ang_jac2)
    }
}
