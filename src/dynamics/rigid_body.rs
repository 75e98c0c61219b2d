use crate::math::{Isometry, Point, Real, Rotation, Vector};
use crate::utils;

/// The status of a body, governing how it is affected by constraint forces.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum RigidBodyType {
    /// Affected by constraint impulses.
    Dynamic,
    /// Never moves; reports zero inverse mass and inertia.
    Fixed,
}

/// A rigid-body frame: a pose, its generalized velocities, and the mass
/// properties needed by the constraint solver.
///
/// The generalized-velocity block of a body has six entries: the three
/// world-frame linear velocities followed by the three **body-local** angular
/// velocities. Constraint Jacobian rotational partitions are expressed in the
/// same local frame, so the two pair up without extra rotations.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RigidBody {
    position: Isometry,
    linvel: Vector,
    angvel: Vector,
    mass: Real,
    principal_inertia: Vector,
    body_type: RigidBodyType,
    pub(crate) solver_id: u32,
}

impl RigidBody {
    /// The world-space pose of this body.
    #[inline]
    pub fn position(&self) -> &Isometry {
        &self.position
    }

    /// Sets the world-space pose of this body.
    pub fn set_position(&mut self, pos: Isometry) {
        self.position = pos;
    }

    /// The world-frame linear velocity.
    #[inline]
    pub fn linvel(&self) -> &Vector {
        &self.linvel
    }

    /// The body-local angular velocity.
    #[inline]
    pub fn angvel(&self) -> &Vector {
        &self.angvel
    }

    /// Sets the world-frame linear velocity.
    pub fn set_linvel(&mut self, linvel: Vector) {
        self.linvel = linvel;
    }

    /// Sets the body-local angular velocity.
    pub fn set_angvel(&mut self, angvel: Vector) {
        self.angvel = angvel;
    }

    /// The mass of this body.
    #[inline]
    pub fn mass(&self) -> Real {
        self.mass
    }

    /// The principal angular inertia of this body, in the local frame.
    #[inline]
    pub fn principal_inertia(&self) -> &Vector {
        &self.principal_inertia
    }

    /// The status of this body.
    #[inline]
    pub fn body_type(&self) -> RigidBodyType {
        self.body_type
    }

    /// Is this body affected by constraint impulses?
    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.body_type == RigidBodyType::Dynamic
    }

    /// The inverse mass seen by the solver: zero for fixed bodies.
    #[inline]
    pub fn effective_inv_mass(&self) -> Real {
        match self.body_type {
            RigidBodyType::Dynamic => utils::inv(self.mass),
            RigidBodyType::Fixed => 0.0,
        }
    }

    /// The componentwise inverse principal inertia seen by the solver: zero
    /// for fixed bodies.
    pub fn effective_inv_principal_inertia(&self) -> Vector {
        match self.body_type {
            RigidBodyType::Dynamic => self.principal_inertia.map(utils::inv),
            RigidBodyType::Fixed => Vector::zeros(),
        }
    }

    /// Transforms a point from this body's local frame to world space.
    #[inline]
    pub fn point_to_world(&self, pt: &Point) -> Point {
        self.position.transform_point(pt)
    }

    /// Transforms a world-space point to this body's local frame.
    #[inline]
    pub fn point_to_local(&self, pt: &Point) -> Point {
        self.position.inverse_transform_point(pt)
    }

    /// Transforms a direction from this body's local frame to world space.
    #[inline]
    pub fn vector_to_world(&self, v: &Vector) -> Vector {
        self.position.transform_vector(v)
    }

    /// Transforms a world-space direction to this body's local frame.
    #[inline]
    pub fn vector_to_local(&self, v: &Vector) -> Vector {
        self.position.inverse_transform_vector(v)
    }
}

/// A builder for rigid bodies.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RigidBodyBuilder {
    position: Isometry,
    linvel: Vector,
    angvel: Vector,
    mass: Real,
    principal_inertia: Vector,
    body_type: RigidBodyType,
}

impl RigidBodyBuilder {
    /// Starts building a body of the given type with unit mass properties.
    pub fn new(body_type: RigidBodyType) -> Self {
        Self {
            position: Isometry::identity(),
            linvel: Vector::zeros(),
            angvel: Vector::zeros(),
            mass: 1.0,
            principal_inertia: Vector::new(1.0, 1.0, 1.0),
            body_type,
        }
    }

    /// Starts building a dynamic body.
    pub fn dynamic() -> Self {
        Self::new(RigidBodyType::Dynamic)
    }

    /// Starts building a fixed body.
    pub fn fixed() -> Self {
        Self::new(RigidBodyType::Fixed)
    }

    /// Sets the initial translation of the body.
    pub fn translation(mut self, translation: Vector) -> Self {
        self.position.translation.vector = translation;
        self
    }

    /// Sets the initial orientation of the body.
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.position.rotation = rotation;
        self
    }

    /// Sets the initial pose of the body.
    pub fn position(mut self, position: Isometry) -> Self {
        self.position = position;
        self
    }

    /// Sets the initial linear velocity (world frame).
    pub fn linvel(mut self, linvel: Vector) -> Self {
        self.linvel = linvel;
        self
    }

    /// Sets the initial angular velocity (local frame).
    pub fn angvel(mut self, angvel: Vector) -> Self {
        self.angvel = angvel;
        self
    }

    /// Sets the mass of the body.
    pub fn mass(mut self, mass: Real) -> Self {
        self.mass = mass;
        self
    }

    /// Sets the principal angular inertia of the body (local frame).
    pub fn principal_inertia(mut self, inertia: Vector) -> Self {
        self.principal_inertia = inertia;
        self
    }

    /// Builds the rigid body.
    pub fn build(self) -> RigidBody {
        RigidBody {
            position: self.position,
            linvel: self.linvel,
            angvel: self.angvel,
            mass: self.mass,
            principal_inertia: self.principal_inertia,
            body_type: self.body_type,
            solver_id: crate::INVALID_U32,
        }
    }
}
