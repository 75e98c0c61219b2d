use crate::dynamics::{IntegrationParameters, RigidBodySet, SystemDescriptor};
use crate::math::{Real, Vector, DEFAULT_EPSILON};
use na::DVector;
use num::Zero;

/// A projected successive-over-relaxation solver for the registered
/// constraint rows.
///
/// The solver sweeps the rows of a [`SystemDescriptor`] in insertion order,
/// updating one multiplier at a time and immediately propagating the impulse
/// to the global generalized-velocity vector. Unilateral rows are projected
/// to non-negative multipliers. The rows' current multipliers are taken as
/// the warm-start guess: their contribution is applied to the velocities
/// before the first sweep.
///
/// Row Jacobians must be current for the bodies' poses, i.e. every owning
/// link's `update` must have run before `solve`.
#[derive(Copy, Clone, Debug, Default)]
pub struct VelocitySolver;

struct RowWorkspace {
    inv_schur: Real,
    // Velocity change per unit multiplier, per body block.
    dlin1: Vector,
    dang1: Vector,
    dlin2: Vector,
    dang2: Vector,
    off1: usize,
    off2: usize,
}

impl VelocitySolver {
    /// Creates a new velocity solver.
    pub fn new() -> Self {
        Self
    }

    /// Solves the registered rows in place, mutating both the rows'
    /// multipliers and `vels`.
    ///
    /// Returns the number of sweeps performed.
    pub fn solve(
        &self,
        params: &IntegrationParameters,
        descriptor: &mut SystemDescriptor<'_>,
        bodies: &RigidBodySet,
        vels: &mut DVector<Real>,
    ) -> usize {
        let mut workspaces = Vec::with_capacity(descriptor.len());
        for row in descriptor.rows() {
            let schur = row.schur_diagonal(bodies);
            let b1 = &bodies[row.body1()];
            let b2 = &bodies[row.body2()];
            workspaces.push(RowWorkspace {
                // Rows connecting two fixed bodies get a zero inverse and are
                // skipped by the sweeps below.
                inv_schur: if schur > DEFAULT_EPSILON {
                    1.0 / schur
                } else {
                    0.0
                },
                dlin1: row.lin_jac1 * b1.effective_inv_mass(),
                dang1: row.ang_jac1.component_mul(&b1.effective_inv_principal_inertia()),
                dlin2: row.lin_jac2 * b2.effective_inv_mass(),
                dang2: row.ang_jac2.component_mul(&b2.effective_inv_principal_inertia()),
                off1: bodies.dof_offset(row.body1()),
                off2: bodies.dof_offset(row.body2()),
            });
        }

        // Warm start: fold the rows' current multipliers into the velocities.
        for (row, ws) in descriptor.rows().zip(workspaces.iter()) {
            let multiplier = row.multiplier();
            if multiplier != 0.0 && ws.inv_schur != 0.0 {
                Self::apply_impulse(ws, multiplier, vels);
            }
        }

        let omega = params.sor_relaxation;
        for sweep in 0..params.max_solver_iterations.get() {
            let mut max_delta = Real::zero();

            for (row, ws) in descriptor.rows_mut().zip(workspaces.iter()) {
                if ws.inv_schur == 0.0 {
                    continue;
                }

                let residual = row.jv(bodies, vels) + row.rhs();
                let candidate = row.multiplier() - omega * residual * ws.inv_schur;
                let projected = row.project_multiplier(candidate);
                let delta = projected - row.multiplier();
                row.set_multiplier(projected);

                if delta != 0.0 {
                    Self::apply_impulse(ws, delta, vels);
                    max_delta = max_delta.max(delta.abs());
                }
            }

            if max_delta <= params.convergence_tolerance {
                log::trace!("velocity solver converged after {} sweeps", sweep + 1);
                return sweep + 1;
            }
        }

        log::debug!(
            "velocity solver hit the {}-sweep limit",
            params.max_solver_iterations
        );
        params.max_solver_iterations.get()
    }

    fn apply_impulse(ws: &RowWorkspace, delta: Real, vels: &mut DVector<Real>) {
        let mut lin1 = vels.fixed_rows_mut::<3>(ws.off1);
        lin1 += ws.dlin1 * delta;
        let mut ang1 = vels.fixed_rows_mut::<3>(ws.off1 + 3);
        ang1 += ws.dang1 * delta;
        let mut lin2 = vels.fixed_rows_mut::<3>(ws.off2);
        lin2 += ws.dlin2 * delta;
        let mut ang2 = vels.fixed_rows_mut::<3>(ws.off2 + 3);
        ang2 += ws.dang2 * delta;
    }
}
