use crate::data::{Archive, ArchiveError, ArchiveIn, ArchiveOut};
use crate::dynamics::joint::JointBase;
use crate::dynamics::{
    ConstraintMode, ConstraintRow, RigidBodyHandle, RigidBodySet, SystemDescriptor,
};
use crate::math::{Isometry, Point, Real, Translation, Vector, DEFAULT_EPSILON};
use crate::utils;
use na::DVector;
use thiserror::Error;

/// How a [`DistanceJoint`] enforces its target distance.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum DistanceMode {
    /// The anchor distance must equal the target (bilateral row).
    Equality,
    /// The anchor distance may not exceed the target (unilateral row).
    MaximumDistance,
    /// The anchor distance may not fall below the target (unilateral row).
    MinimumDistance,
}

// Persistence stores modes by label, never by discriminant, so reordering the
// enum cannot corrupt old archives.
const MODE_LABELS: [(DistanceMode, &str); 3] = [
    (DistanceMode::Equality, "equality"),
    (DistanceMode::MaximumDistance, "max_distance"),
    (DistanceMode::MinimumDistance, "min_distance"),
];

impl DistanceMode {
    /// The stable label identifying this mode in archives.
    pub fn label(self) -> &'static str {
        MODE_LABELS
            .iter()
            .find(|(mode, _)| *mode == self)
            .map(|(_, label)| *label)
            .unwrap_or("equality")
    }

    /// Maps a stored label back to a mode.
    pub fn from_label(label: &str) -> Option<Self> {
        MODE_LABELS
            .iter()
            .find(|(_, l)| *l == label)
            .map(|(mode, _)| *mode)
    }
}

/// Failures reported by [`DistanceJoint::initialize`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum DistanceJointError {
    /// A handle does not address any body of the given set.
    #[error("rigid-body handle {0:?} is not part of the body set")]
    UnknownBody(RigidBodyHandle),
    /// Both handles address the same body.
    #[error("a distance joint must connect two distinct bodies")]
    DuplicateBody,
}

/// A link enforcing `distance(anchor1 on body1, anchor2 on body2) = target`,
/// optionally one-sided.
///
/// The joint owns a single scalar [`ConstraintRow`]. Once per step, after the
/// bodies moved, [`update`](Self::update) refreshes the row's Jacobian
/// partitions and the signed violation; the host then registers the row with
/// [`inject_constraints`](Self::inject_constraints), loads stabilization
/// biases, runs the velocity solver, and finally reads the reaction back with
/// [`fetch_reaction`](Self::fetch_reaction).
///
/// A two-point distance constraint transmits a pure axial force: the reaction
/// torque is always zero, and the reaction force only has an x component,
/// expressed in the link frame returned by
/// [`relative_frame`](Self::relative_frame).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct DistanceJoint {
    /// Identification and activation state, persisted before the joint's own
    /// fields.
    pub base: JointBase,
    body1: RigidBodyHandle,
    body2: RigidBodyHandle,
    local_anchor1: Point,
    local_anchor2: Point,
    distance: Real,
    mode: DistanceMode,
    mode_sign: Real,
    curr_dist: Real,
    violation: Real,
    row: ConstraintRow,
    react_force: Vector,
    react_torque: Vector,
}

impl Default for DistanceJoint {
    fn default() -> Self {
        let mut joint = Self {
            base: JointBase::default(),
            body1: RigidBodyHandle::invalid(),
            body2: RigidBodyHandle::invalid(),
            local_anchor1: Point::origin(),
            local_anchor2: Point::origin(),
            distance: 0.0,
            mode: DistanceMode::Equality,
            mode_sign: 1.0,
            curr_dist: 0.0,
            violation: 0.0,
            row: ConstraintRow::new(),
            react_force: Vector::zeros(),
            react_torque: Vector::zeros(),
        };
        joint.set_mode(DistanceMode::Equality);
        joint
    }
}

impl DistanceJoint {
    const ARCHIVE_VERSION: u32 = 1;

    /// Creates an unbound joint; it stays inactive until
    /// [`initialize`](Self::initialize) binds it to two bodies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the joint to two bodies and configures its anchors and target.
    ///
    /// `p1`/`p2` are interpreted in the bodies' local frames when
    /// `anchors_are_local` is set, and converted from world space at bind
    /// time otherwise. With `auto_distance`, the target becomes the distance
    /// measured in the current configuration (so the initial violation is
    /// exactly zero) and the `distance` argument is ignored.
    ///
    /// Fails without mutating the joint if a handle is unknown to `bodies`
    /// or both handles address the same body.
    pub fn initialize(
        &mut self,
        bodies: &RigidBodySet,
        body1: RigidBodyHandle,
        body2: RigidBodyHandle,
        anchors_are_local: bool,
        p1: Point,
        p2: Point,
        auto_distance: bool,
        distance: Real,
        mode: DistanceMode,
    ) -> Result<(), DistanceJointError> {
        if !bodies.contains(body1) {
            return Err(DistanceJointError::UnknownBody(body1));
        }
        if !bodies.contains(body2) {
            return Err(DistanceJointError::UnknownBody(body2));
        }
        if body1 == body2 {
            return Err(DistanceJointError::DuplicateBody);
        }

        self.set_mode(mode);
        self.body1 = body1;
        self.body2 = body2;
        self.row.set_bodies(body1, body2);

        let b1 = &bodies[body1];
        let b2 = &bodies[body2];
        if anchors_are_local {
            self.local_anchor1 = p1;
            self.local_anchor2 = p2;
        } else {
            self.local_anchor1 = b1.point_to_local(&p1);
            self.local_anchor2 = b2.point_to_local(&p2);
        }

        let delta =
            b1.point_to_world(&self.local_anchor1) - b2.point_to_world(&self.local_anchor2);
        self.curr_dist = delta.norm();
        self.distance = if auto_distance {
            self.curr_dist
        } else {
            distance
        };
        self.violation = self.mode_sign * (self.curr_dist - self.distance);

        Ok(())
    }

    /// Sets the enforcement mode, refreshing the derived sign and the row's
    /// regime.
    ///
    /// May be called mid-simulation; the change takes effect at the next
    /// [`update`](Self::update)/solver pass.
    pub fn set_mode(&mut self, mode: DistanceMode) {
        self.mode = mode;
        self.mode_sign = if mode == DistanceMode::MaximumDistance {
            -1.0
        } else {
            1.0
        };
        self.row.set_mode(if mode == DistanceMode::Equality {
            ConstraintMode::Bilateral
        } else {
            ConstraintMode::Unilateral
        });
    }

    /// The enforcement mode.
    #[inline]
    pub fn mode(&self) -> DistanceMode {
        self.mode
    }

    /// The sign folded into the constraint row: `-1` for
    /// [`DistanceMode::MaximumDistance`], `+1` otherwise.
    #[inline]
    pub fn mode_sign(&self) -> Real {
        self.mode_sign
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

    /// The anchor on the first body, in its local frame.
    #[inline]
    pub fn local_anchor1(&self) -> &Point {
        &self.local_anchor1
    }

    /// The anchor on the second body, in its local frame.
    #[inline]
    pub fn local_anchor2(&self) -> &Point {
        &self.local_anchor2
    }

    /// The imposed distance.
    #[inline]
    pub fn target_distance(&self) -> Real {
        self.distance
    }

    /// Sets the imposed distance.
    pub fn set_target_distance(&mut self, distance: Real) {
        self.distance = distance;
    }

    /// The anchor distance measured by the last
    /// [`update`](Self::update)/[`initialize`](Self::initialize).
    #[inline]
    pub fn current_distance(&self) -> Real {
        self.curr_dist
    }

    /// The signed constraint violation `sign · (current - target)`.
    #[inline]
    pub fn violation(&self) -> Real {
        self.violation
    }

    /// The reaction force, in the link frame (only the x/axial component can
    /// be non-zero).
    #[inline]
    pub fn react_force(&self) -> &Vector {
        &self.react_force
    }

    /// The reaction torque; always zero for a two-point distance constraint.
    #[inline]
    pub fn react_torque(&self) -> &Vector {
        &self.react_torque
    }

    /// The constraint row owned by this joint.
    #[inline]
    pub fn row(&self) -> &ConstraintRow {
        &self.row
    }

    fn is_bound(&self) -> bool {
        self.body1 != RigidBodyHandle::invalid() && self.body2 != RigidBodyHandle::invalid()
    }

    /// Is this joint taking part in solver interactions?
    ///
    /// Unbound or disabled joints are inactive, and every solver-facing
    /// operation on an inactive joint is a no-op.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.base.enabled && self.is_bound()
    }

    /// Recomputes the constraint Jacobians and violation from the bodies'
    /// current poses.
    ///
    /// Must run once per step, before any solver pass reads the row: the
    /// solver never recomputes Jacobians on its own.
    pub fn update(&mut self, bodies: &RigidBodySet, time: Real) {
        self.base.time = time;
        if !self.is_bound() {
            return;
        }

        let b1 = &bodies[self.body1];
        let b2 = &bodies[self.body2];
        let delta =
            b1.point_to_world(&self.local_anchor1) - b2.point_to_world(&self.local_anchor2);
        self.curr_dist = delta.norm();
        // Coincident anchors leave the direction undefined; fall back to x.
        let dir = if self.curr_dist > DEFAULT_EPSILON {
            delta / self.curr_dist
        } else {
            Vector::x()
        };
        let dir_b1 = b1.vector_to_local(&dir);
        let dir_b2 = b2.vector_to_local(&dir);

        self.row.lin_jac1 = dir * self.mode_sign;
        self.row.ang_jac1 = -dir_b1.cross(&self.local_anchor1.coords) * self.mode_sign;
        self.row.lin_jac2 = -dir * self.mode_sign;
        self.row.ang_jac2 = dir_b2.cross(&self.local_anchor2.coords) * self.mode_sign;

        self.violation = self.mode_sign * (self.curr_dist - self.distance);
    }

    /// The link frame: anchor2 with the local x axis along the link axis,
    /// relative to the second body.
    ///
    /// The reaction force is expressed in this frame. Returns the identity
    /// for an unbound joint.
    pub fn relative_frame(&self, bodies: &RigidBodySet) -> Isometry {
        if !self.is_bound() {
            return Isometry::identity();
        }
        let b1 = &bodies[self.body1];
        let b2 = &bodies[self.body2];
        let delta =
            b1.point_to_world(&self.local_anchor1) - b2.point_to_world(&self.local_anchor2);
        let axis_b2 = b2.vector_to_local(&delta);
        let rot = utils::rotation_from_x_axis(&axis_b2, &Vector::y());
        Isometry::from_parts(Translation::from(self.local_anchor2.coords), rot)
    }

    fn clamp_bias(&self, value: Real, recovery_clamp: Real) -> Real {
        match self.row.mode() {
            // Equality rows bound the correction magnitude on both sides;
            // one-sided rows only bound the (negative) violation correction
            // and let slack pass through.
            ConstraintMode::Bilateral => value.clamp(-recovery_clamp, recovery_clamp),
            ConstraintMode::Unilateral => value.max(-recovery_clamp),
        }
    }

    /// Registers this joint's constraint row with the system descriptor.
    pub fn inject_constraints<'a>(&'a mut self, descriptor: &mut SystemDescriptor<'a>) {
        if !self.is_active() {
            return;
        }
        descriptor.insert_constraint(&mut self.row);
    }

    /// Resets the row's right-hand-side bias to zero.
    pub fn reset_rhs_bias(&mut self) {
        if !self.is_active() {
            return;
        }
        self.row.set_rhs(0.0);
    }

    /// Accumulates `factor · violation` into the row's right-hand-side bias,
    /// applying the mode's recovery clamp when `do_clamp` is set.
    pub fn accumulate_rhs_bias(&mut self, factor: Real, recovery_clamp: Real, do_clamp: bool) {
        if !self.is_active() {
            return;
        }
        let mut term = factor * self.violation;
        if do_clamp {
            term = self.clamp_bias(term, recovery_clamp);
        }
        self.row.set_rhs(self.row.rhs() + term);
    }

    /// Jacobian load hook of the solver interface.
    ///
    /// Intentionally a no-op: the Jacobians are already current, having been
    /// written by [`update`](Self::update), which must run before any solver
    /// pass.
    pub fn load_jacobians(&self) {}

    /// Accumulates `c · violation` into `qc[off_l]`, applying the mode's
    /// recovery clamp when `do_clamp` is set.
    pub fn load_constraint_violation(
        &self,
        off_l: usize,
        qc: &mut DVector<Real>,
        c: Real,
        do_clamp: bool,
        recovery_clamp: Real,
    ) {
        if !self.is_active() {
            return;
        }
        let mut term = c * self.violation;
        if do_clamp {
            term = self.clamp_bias(term, recovery_clamp);
        }
        qc[off_l] += term;
    }

    /// Accumulates `c · Jᵀ · l[off_l]` into the global force residual `r`.
    pub fn accumulate_force_residual(
        &self,
        bodies: &RigidBodySet,
        r: &mut DVector<Real>,
        l: &DVector<Real>,
        off_l: usize,
        c: Real,
    ) {
        if !self.is_active() {
            return;
        }
        self.row.apply_jacobian_transpose(bodies, r, l[off_l] * c);
    }

    /// Scatters the global multiplier and bias at `off_l` into the row.
    pub fn multipliers_to_row(&mut self, off_l: usize, l: &DVector<Real>, qc: &DVector<Real>) {
        if !self.is_active() {
            return;
        }
        self.row.set_multiplier(l[off_l]);
        self.row.set_rhs(qc[off_l]);
    }

    /// Gathers the row's multiplier back into the global vector at `off_l`.
    pub fn multipliers_from_row(&self, off_l: usize, l: &mut DVector<Real>) {
        if !self.is_active() {
            return;
        }
        l[off_l] = self.row.multiplier();
    }

    /// Extracts the reaction from the row's multiplier: a pure axial force
    /// `-multiplier · factor` along the link frame's x axis, and a zero
    /// torque.
    pub fn fetch_reaction(&mut self, factor: Real) {
        if !self.is_active() {
            return;
        }
        self.react_force = Vector::new(-self.row.multiplier() * factor, 0.0, 0.0);
        self.react_torque = Vector::zeros();
    }

    /// Writes the reaction into a global multiplier vector at `off_l`.
    pub fn gather_reaction(&self, off_l: usize, l: &mut DVector<Real>) {
        if !self.is_active() {
            return;
        }
        l[off_l] = -self.react_force.x;
    }

    /// Restores the reaction from a global multiplier vector at `off_l`.
    pub fn scatter_reaction(&mut self, off_l: usize, l: &DVector<Real>) {
        if !self.is_active() {
            return;
        }
        self.react_force = Vector::new(-l[off_l], 0.0, 0.0);
        self.react_torque = Vector::zeros();
    }
}

impl Archive for DistanceJoint {
    fn type_name(&self) -> &'static str {
        "DistanceJoint"
    }

    fn archive_out(&self, out: &mut ArchiveOut) {
        out.write_version("DistanceJoint", Self::ARCHIVE_VERSION);
        self.base.archive_out(out);
        out.write_scalar("distance", self.distance);
        out.write_point("anchor1", &self.local_anchor1);
        out.write_point("anchor2", &self.local_anchor2);
        out.write_str("mode", self.mode.label());
    }

    // Body handles are not persisted; the host rebinds the joint after the
    // fields are restored, and it stays inactive until then.
    fn archive_in(&mut self, input: &mut ArchiveIn) -> Result<(), ArchiveError> {
        let _version = input.read_version("DistanceJoint")?;
        self.base.archive_in(input)?;
        self.distance = input.read_scalar("distance")?;
        self.local_anchor1 = input.read_point("anchor1")?;
        self.local_anchor2 = input.read_point("anchor2")?;
        let label = input.read_str("mode")?;
        let mode = DistanceMode::from_label(&label).ok_or(ArchiveError::UnknownLabel {
            field: "mode".to_owned(),
            label,
        })?;
        self.set_mode(mode);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::{
        IntegrationParameters, RigidBodyBuilder, RigidBodySet, VelocitySolver,
    };
    use crate::math::Rotation;

    fn axis_pair(z2: Real) -> (RigidBodySet, RigidBodyHandle, RigidBodyHandle) {
        let mut bodies = RigidBodySet::new();
        let h1 = bodies.insert(RigidBodyBuilder::dynamic().build());
        let h2 = bodies.insert(
            RigidBodyBuilder::dynamic()
                .translation(Vector::new(0.0, 0.0, z2))
                .build(),
        );
        (bodies, h1, h2)
    }

    fn init_joint(
        bodies: &RigidBodySet,
        h1: RigidBodyHandle,
        h2: RigidBodyHandle,
        auto_distance: bool,
        distance: Real,
        mode: DistanceMode,
    ) -> DistanceJoint {
        let mut joint = DistanceJoint::new();
        joint
            .initialize(
                bodies,
                h1,
                h2,
                true,
                Point::origin(),
                Point::origin(),
                auto_distance,
                distance,
                mode,
            )
            .unwrap();
        joint
    }

    #[test]
    fn auto_distance_starts_with_zero_violation() {
        let (bodies, h1, h2) = axis_pair(5.0);
        let joint = init_joint(&bodies, h1, h2, true, 0.0, DistanceMode::Equality);
        assert_eq!(joint.violation(), 0.0);
        assert_eq!(joint.target_distance(), 5.0);
        assert_eq!(joint.current_distance(), 5.0);
    }

    #[test]
    fn initialize_rejects_bad_body_pairs() {
        let (bodies, h1, _) = axis_pair(5.0);
        let mut joint = DistanceJoint::new();

        let bad = RigidBodyHandle::invalid();
        assert_eq!(
            joint.initialize(
                &bodies,
                h1,
                bad,
                true,
                Point::origin(),
                Point::origin(),
                true,
                0.0,
                DistanceMode::Equality,
            ),
            Err(DistanceJointError::UnknownBody(bad))
        );
        assert_eq!(
            joint.initialize(
                &bodies,
                h1,
                h1,
                true,
                Point::origin(),
                Point::origin(),
                true,
                0.0,
                DistanceMode::Equality,
            ),
            Err(DistanceJointError::DuplicateBody)
        );
        // A failed initialize leaves the joint unbound, hence inactive.
        assert!(!joint.is_active());
    }

    #[test]
    fn world_anchors_are_converted_at_bind_time() {
        let mut bodies = RigidBodySet::new();
        let h1 = bodies.insert(
            RigidBodyBuilder::dynamic()
                .translation(Vector::new(1.0, 0.0, 0.0))
                .rotation(Rotation::from_axis_angle(&Vector::y_axis(), 0.5))
                .build(),
        );
        let h2 = bodies.insert(RigidBodyBuilder::dynamic().build());

        let world1 = Point::new(1.5, 0.5, 0.0);
        let mut joint = DistanceJoint::new();
        joint
            .initialize(
                &bodies,
                h1,
                h2,
                false,
                world1,
                Point::new(0.0, 0.0, 0.0),
                true,
                0.0,
                DistanceMode::Equality,
            )
            .unwrap();

        let back = bodies[h1].point_to_world(joint.local_anchor1());
        approx::assert_relative_eq!(back, world1, epsilon = 1.0e-5);
    }

    #[test]
    fn equality_scenario_jacobian_and_violation() {
        let (bodies, h1, h2) = axis_pair(5.0);
        let mut joint = init_joint(&bodies, h1, h2, false, 5.0, DistanceMode::Equality);
        joint.update(&bodies, 0.0);

        assert_eq!(joint.violation(), 0.0);
        // Body1's linear partition is the unit separation direction, from
        // anchor2 toward anchor1.
        approx::assert_relative_eq!(joint.row().lin_jac1, Vector::new(0.0, 0.0, -1.0));
        approx::assert_relative_eq!(joint.row().lin_jac2, Vector::new(0.0, 0.0, 1.0));
        // Centered anchors produce no angular coupling.
        assert_eq!(joint.row().ang_jac1, Vector::zeros());
        assert_eq!(joint.row().ang_jac2, Vector::zeros());
    }

    #[test]
    fn max_distance_mode_flips_the_sign() {
        let (bodies, h1, h2) = axis_pair(5.0);
        let mut joint = init_joint(&bodies, h1, h2, false, 3.0, DistanceMode::MaximumDistance);
        joint.update(&bodies, 0.0);

        assert_eq!(joint.mode_sign(), -1.0);
        assert_eq!(joint.row().mode(), ConstraintMode::Unilateral);
        assert_eq!(joint.violation(), -2.0);
        approx::assert_relative_eq!(joint.row().lin_jac1, Vector::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn mode_transitions_are_idempotent() {
        let (bodies, h1, h2) = axis_pair(5.0);
        let mut joint = init_joint(&bodies, h1, h2, true, 0.0, DistanceMode::Equality);

        joint.set_mode(DistanceMode::MaximumDistance);
        joint.set_mode(DistanceMode::MaximumDistance);
        assert_eq!(joint.mode_sign(), -1.0);
        assert_eq!(joint.row().mode(), ConstraintMode::Unilateral);

        joint.set_mode(DistanceMode::Equality);
        assert_eq!(joint.mode_sign(), 1.0);
        assert_eq!(joint.row().mode(), ConstraintMode::Bilateral);
    }

    #[test]
    fn update_is_deterministic_for_fixed_poses() {
        let mut rng = oorandom::Rand32::new(94);
        let mut bodies = RigidBodySet::new();
        let h1 = bodies.insert(
            RigidBodyBuilder::dynamic()
                .translation(Vector::new(
                    rng.rand_float(),
                    rng.rand_float(),
                    rng.rand_float(),
                ))
                .rotation(Rotation::from_axis_angle(
                    &Vector::z_axis(),
                    rng.rand_float(),
                ))
                .build(),
        );
        let h2 = bodies.insert(
            RigidBodyBuilder::dynamic()
                .translation(Vector::new(3.0, rng.rand_float(), -2.0))
                .build(),
        );

        let mut joint = DistanceJoint::new();
        joint
            .initialize(
                &bodies,
                h1,
                h2,
                true,
                Point::new(0.3, -0.1, 0.2),
                Point::new(-0.4, 0.0, 0.1),
                true,
                0.0,
                DistanceMode::MinimumDistance,
            )
            .unwrap();

        joint.update(&bodies, 1.0);
        let first_row = joint.row().clone();
        let first_violation = joint.violation();

        joint.update(&bodies, 2.0);
        // Identical poses must reproduce the exact same bits.
        assert_eq!(*joint.row(), first_row);
        assert_eq!(joint.violation().to_bits(), first_violation.to_bits());
    }

    #[test]
    fn coincident_anchors_stay_finite() {
        let (bodies, h1, h2) = axis_pair(0.0);
        let mut joint = init_joint(&bodies, h1, h2, true, 0.0, DistanceMode::Equality);
        joint.update(&bodies, 0.0);

        assert_eq!(joint.row().lin_jac1, Vector::x());
        assert!(joint.violation().is_finite());
    }

    #[test]
    fn bias_clamp_is_symmetric_only_for_equality() {
        let (bodies, h1, h2) = axis_pair(5.0);

        // Equality: both correction directions are bounded.
        let mut joint = init_joint(&bodies, h1, h2, false, 1.0, DistanceMode::Equality);
        joint.update(&bodies, 0.0);
        assert_eq!(joint.violation(), 4.0);
        joint.accumulate_rhs_bias(10.0, 0.2, true);
        assert_eq!(joint.row().rhs(), 0.2);
        joint.reset_rhs_bias();
        joint.accumulate_rhs_bias(-10.0, 0.2, true);
        assert_eq!(joint.row().rhs(), -0.2);

        // One-sided: violations are bounded, slack passes through.
        let mut joint = init_joint(&bodies, h1, h2, false, 9.0, DistanceMode::MaximumDistance);
        joint.update(&bodies, 0.0);
        assert_eq!(joint.violation(), 4.0);
        joint.accumulate_rhs_bias(10.0, 0.2, true);
        assert_eq!(joint.row().rhs(), 40.0);
        joint.reset_rhs_bias();
        joint.accumulate_rhs_bias(-10.0, 0.2, true);
        assert_eq!(joint.row().rhs(), -0.2);

        // Unclamped loads pass through untouched.
        joint.reset_rhs_bias();
        joint.accumulate_rhs_bias(-10.0, 0.2, false);
        assert_eq!(joint.row().rhs(), -40.0);
    }

    #[test]
    fn violation_load_follows_the_same_clamp_policy() {
        let (bodies, h1, h2) = axis_pair(5.0);
        let mut joint = init_joint(&bodies, h1, h2, false, 1.0, DistanceMode::Equality);
        joint.update(&bodies, 0.0);

        let mut qc = DVector::zeros(3);
        joint.load_constraint_violation(1, &mut qc, 10.0, true, 0.5);
        assert_eq!(qc[1], 0.5);
        joint.load_constraint_violation(1, &mut qc, 1.0, false, 0.5);
        assert_eq!(qc[1], 4.5);
        assert_eq!(qc[0], 0.0);
        assert_eq!(qc[2], 0.0);
    }

    #[test]
    fn reaction_is_a_pure_axial_force() {
        let (bodies, h1, h2) = axis_pair(5.0);
        let mut joint = init_joint(&bodies, h1, h2, true, 0.0, DistanceMode::Equality);
        joint.update(&bodies, 0.0);

        joint.multipliers_to_row(0, &DVector::from_element(1, 2.5), &DVector::zeros(1));
        joint.fetch_reaction(2.0);
        assert_eq!(*joint.react_force(), Vector::new(-5.0, 0.0, 0.0));
        assert_eq!(*joint.react_torque(), Vector::zeros());

        let mut l = DVector::zeros(1);
        joint.gather_reaction(0, &mut l);
        assert_eq!(l[0], 5.0);

        joint.scatter_reaction(0, &DVector::from_element(1, -3.0));
        assert_eq!(*joint.react_force(), Vector::new(3.0, 0.0, 0.0));
        assert_eq!(*joint.react_torque(), Vector::zeros());
    }

    #[test]
    fn inactive_joints_touch_nothing() {
        let (bodies, h1, h2) = axis_pair(5.0);
        let mut joint = init_joint(&bodies, h1, h2, false, 1.0, DistanceMode::Equality);
        joint.update(&bodies, 0.0);
        joint.accumulate_rhs_bias(1.0, 10.0, false);
        joint.scatter_reaction(0, &DVector::from_element(1, -3.0));
        let rhs_before = joint.row().rhs();
        let react_before = *joint.react_force();

        joint.base.enabled = false;
        assert!(!joint.is_active());

        let mut qc = DVector::zeros(1);
        let mut r = DVector::zeros(12);
        let mut l_out = DVector::zeros(1);
        let l = DVector::from_element(1, 9.0);

        joint.reset_rhs_bias();
        joint.accumulate_rhs_bias(5.0, 1.0, false);
        joint.load_constraint_violation(0, &mut qc, 1.0, false, 1.0);
        joint.accumulate_force_residual(&bodies, &mut r, &l, 0, 1.0);
        joint.multipliers_from_row(0, &mut l_out);
        joint.fetch_reaction(1.0);
        joint.gather_reaction(0, &mut l_out);

        assert_eq!(joint.row().rhs(), rhs_before);
        assert_eq!(*joint.react_force(), react_before);
        assert!(qc.iter().all(|x| *x == 0.0));
        assert!(r.iter().all(|x| *x == 0.0));
        assert!(l_out.iter().all(|x| *x == 0.0));

        let mut descriptor = SystemDescriptor::new();
        joint.inject_constraints(&mut descriptor);
        assert!(descriptor.is_empty());
    }

    #[test]
    fn force_residual_accumulates_along_the_jacobian() {
        let (bodies, h1, h2) = axis_pair(5.0);
        let mut joint = init_joint(&bodies, h1, h2, true, 0.0, DistanceMode::Equality);
        joint.update(&bodies, 0.0);

        let mut r = DVector::zeros(12);
        let l = DVector::from_element(1, 2.0);
        joint.accumulate_force_residual(&bodies, &mut r, &l, 0, 0.5);

        // c·Jᵀ·l: body1 pulled along -z, body2 along +z.
        assert_eq!(r[2], -1.0);
        assert_eq!(r[8], 1.0);
        assert!(r.iter().enumerate().all(|(i, x)| i == 2 || i == 8 || *x == 0.0));
    }

    #[test]
    fn relative_frame_aligns_x_with_the_link_axis() {
        let (bodies, h1, h2) = axis_pair(5.0);
        let mut joint = DistanceJoint::new();
        joint
            .initialize(
                &bodies,
                h1,
                h2,
                true,
                Point::origin(),
                Point::new(0.5, 0.0, 0.0),
                true,
                0.0,
                DistanceMode::Equality,
            )
            .unwrap();

        let frame = joint.relative_frame(&bodies);
        assert_eq!(frame.translation.vector, Vector::new(0.5, 0.0, 0.0));

        // The frame's x axis points along the anchor separation, expressed
        // in body2's local frame.
        let p1 = bodies[h1].point_to_world(joint.local_anchor1());
        let p2 = bodies[h2].point_to_world(joint.local_anchor2());
        let axis_b2 = bodies[h2].vector_to_local(&(p1 - p2)).normalize();
        approx::assert_relative_eq!(
            frame.rotation * Vector::x(),
            axis_b2,
            epsilon = 1.0e-5
        );

        assert_eq!(
            DistanceJoint::new().relative_frame(&bodies),
            Isometry::identity()
        );
    }

    #[test]
    fn archive_round_trip_restores_the_joint_fields() {
        let (bodies, h1, h2) = axis_pair(5.0);
        let mut joint = init_joint(&bodies, h1, h2, false, 4.0, DistanceMode::MaximumDistance);
        joint.base.name = "tether".to_owned();
        joint
            .initialize(
                &bodies,
                h1,
                h2,
                true,
                Point::new(0.1, 0.2, 0.3),
                Point::new(-0.1, 0.0, 0.4),
                false,
                4.0,
                DistanceMode::MaximumDistance,
            )
            .unwrap();

        let mut out = ArchiveOut::new();
        joint.archive_out(&mut out);

        crate::data::register_default_types();
        let mut restored = crate::data::instantiate("DistanceJoint").unwrap();
        let restored = restored.downcast_mut::<DistanceJoint>().unwrap();
        restored.archive_in(&mut ArchiveIn::from(out)).unwrap();

        assert_eq!(restored.base.name, "tether");
        assert_eq!(restored.target_distance(), 4.0);
        assert_eq!(restored.local_anchor1(), &Point::new(0.1, 0.2, 0.3));
        assert_eq!(restored.local_anchor2(), &Point::new(-0.1, 0.0, 0.4));
        assert_eq!(restored.mode(), DistanceMode::MaximumDistance);
        assert_eq!(restored.mode_sign(), -1.0);
        // Bodies are rebound by the host, not by the archive.
        assert!(!restored.is_active());
    }

    #[test]
    fn unknown_mode_label_is_rejected() {
        let mut out = ArchiveOut::new();
        out.write_version("DistanceJoint", 1);
        JointBase::default().archive_out(&mut out);
        out.write_scalar("distance", 1.0);
        out.write_point("anchor1", &Point::origin());
        out.write_point("anchor2", &Point::origin());
        out.write_str("mode", "rubber_band");

        let mut joint = DistanceJoint::new();
        assert_eq!(
            joint.archive_in(&mut ArchiveIn::from(out)),
            Err(ArchiveError::UnknownLabel {
                field: "mode".to_owned(),
                label: "rubber_band".to_owned(),
            })
        );
    }

    #[test]
    fn non_binding_max_distance_yields_zero_reaction() {
        let (mut bodies, h1, h2) = axis_pair(5.0);
        // Farther apart than required by a max-distance of 10: not binding.
        let mut joint = init_joint(&bodies, h1, h2, false, 10.0, DistanceMode::MaximumDistance);
        let params = IntegrationParameters::default();

        joint.update(&bodies, params.dt);
        joint.reset_rhs_bias();
        joint.accumulate_rhs_bias(
            params.inv_dt(),
            params.max_corrective_velocity,
            true,
        );

        let mut vels = bodies.generalized_velocities();
        let mut descriptor = SystemDescriptor::new();
        joint.inject_constraints(&mut descriptor);
        VelocitySolver::new().solve(&params, &mut descriptor, &bodies, &mut vels);
        drop(descriptor);

        assert_eq!(joint.row().multiplier(), 0.0);
        joint.fetch_reaction(params.inv_dt());
        assert_eq!(*joint.react_force(), Vector::zeros());
        assert_eq!(*joint.react_torque(), Vector::zeros());

        bodies.set_generalized_velocities(&vels);
        assert_eq!(*bodies[h1].linvel(), Vector::zeros());
    }

    #[test]
    fn binding_max_distance_pulls_the_bodies_together() {
        let (bodies, h1, h2) = axis_pair(5.0);
        let mut joint = init_joint(&bodies, h1, h2, false, 3.0, DistanceMode::MaximumDistance);
        let params = IntegrationParameters::default();

        joint.update(&bodies, params.dt);
        joint.reset_rhs_bias();
        joint.accumulate_rhs_bias(
            params.inv_dt(),
            params.max_corrective_velocity,
            true,
        );

        let mut vels = bodies.generalized_velocities();
        let mut descriptor = SystemDescriptor::new();
        joint.inject_constraints(&mut descriptor);
        VelocitySolver::new().solve(&params, &mut descriptor, &bodies, &mut vels);
        drop(descriptor);

        assert!(joint.row().multiplier() > 0.0);
        // The corrective velocities close the gap: body1 moves toward +z,
        // body2 toward -z.
        assert!(vels[2] > 0.0);
        assert!(vels[8] < 0.0);

        joint.fetch_reaction(params.inv_dt());
        assert!(joint.react_force().x < 0.0);
        assert_eq!(joint.react_force().y, 0.0);
        assert_eq!(joint.react_force().z, 0.0);
    }
}
