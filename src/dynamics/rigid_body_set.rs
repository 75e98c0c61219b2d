use crate::dynamics::RigidBody;
use crate::math::{Real, SPATIAL_DIM};
use na::DVector;

/// The index of a rigid body added to a [`RigidBodySet`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[repr(transparent)]
pub struct RigidBodyHandle(u32);

impl RigidBodyHandle {
    /// An always-invalid handle.
    pub fn invalid() -> Self {
        Self(crate::INVALID_U32)
    }

    /// The raw index of this handle.
    pub fn index(self) -> u32 {
        self.0
    }
}

/// The collection that stores the rigid bodies of a simulation.
///
/// Links hold [`RigidBodyHandle`]s into this set, never owned bodies; the set
/// (and therefore every body) must outlive the links addressing it. Bodies
/// cannot be removed, so each body's generalized-velocity block lives at a
/// stable offset `6 * index` of the global velocity vector.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RigidBodySet {
    bodies: Vec<RigidBody>,
}

impl RigidBodySet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of bodies in this set.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Returns `true` if the set contains no body.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Inserts a body and returns its handle.
    pub fn insert(&mut self, mut body: RigidBody) -> RigidBodyHandle {
        let handle = RigidBodyHandle(self.bodies.len() as u32);
        body.solver_id = handle.0;
        self.bodies.push(body);
        handle
    }

    /// Returns `true` if `handle` addresses a body of this set.
    pub fn contains(&self, handle: RigidBodyHandle) -> bool {
        (handle.0 as usize) < self.bodies.len()
    }

    /// Gets the body addressed by `handle`, if any.
    pub fn get(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle.0 as usize)
    }

    /// Gets a mutable reference to the body addressed by `handle`, if any.
    pub fn get_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle.0 as usize)
    }

    /// Iterates over the bodies with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (RigidBodyHandle, &RigidBody)> {
        self.bodies
            .iter()
            .enumerate()
            .map(|(i, b)| (RigidBodyHandle(i as u32), b))
    }

    /// The offset of `handle`'s generalized-velocity block in the global
    /// velocity vector.
    ///
    /// # Panics
    /// Panics if `handle` does not address a body of this set.
    #[inline]
    pub fn dof_offset(&self, handle: RigidBodyHandle) -> usize {
        self[handle].solver_id as usize * SPATIAL_DIM
    }

    /// Gathers every body's generalized velocities into one global vector:
    /// per body, three world-frame linear entries followed by three
    /// body-local angular entries.
    pub fn generalized_velocities(&self) -> DVector<Real> {
        let mut vels = DVector::zeros(self.bodies.len() * SPATIAL_DIM);
        for (i, body) in self.bodies.iter().enumerate() {
            vels.fixed_rows_mut::<3>(i * SPATIAL_DIM)
                .copy_from(body.linvel());
            vels.fixed_rows_mut::<3>(i * SPATIAL_DIM + 3)
                .copy_from(body.angvel());
        }
        vels
    }

    /// Scatters a global velocity vector back into the bodies.
    ///
    /// # Panics
    /// Panics if `vels` does not hold exactly six entries per body.
    pub fn set_generalized_velocities(&mut self, vels: &DVector<Real>) {
        assert_eq!(
            vels.len(),
            self.bodies.len() * SPATIAL_DIM,
            "expected {} generalized velocities, got {}",
            self.bodies.len() * SPATIAL_DIM,
            vels.len()
        );
        for (i, body) in self.bodies.iter_mut().enumerate() {
            body.set_linvel(vels.fixed_rows::<3>(i * SPATIAL_DIM).into_owned());
            body.set_angvel(vels.fixed_rows::<3>(i * SPATIAL_DIM + 3).into_owned());
        }
    }
}

impl std::ops::Index<RigidBodyHandle> for RigidBodySet {
    type Output = RigidBody;

    fn index(&self, handle: RigidBodyHandle) -> &RigidBody {
        &self.bodies[handle.0 as usize]
    }
}

impl std::ops::IndexMut<RigidBodyHandle> for RigidBodySet {
    fn index_mut(&mut self, handle: RigidBodyHandle) -> &mut RigidBody {
        &mut self.bodies[handle.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::RigidBodyBuilder;
    use crate::math::Vector;

    #[test]
    fn velocities_round_trip_through_the_global_vector() {
        let mut bodies = RigidBodySet::new();
        let h1 = bodies.insert(
            RigidBodyBuilder::dynamic()
                .linvel(Vector::new(1.0, 2.0, 3.0))
                .angvel(Vector::new(-1.0, 0.5, 0.0))
                .build(),
        );
        let h2 = bodies.insert(RigidBodyBuilder::fixed().build());

        assert_eq!(bodies.dof_offset(h1), 0);
        assert_eq!(bodies.dof_offset(h2), 6);

        let mut vels = bodies.generalized_velocities();
        assert_eq!(vels[1], 2.0);
        assert_eq!(vels[3], -1.0);

        vels[6] = 9.0;
        bodies.set_generalized_velocities(&vels);
        assert_eq!(bodies[h2].linvel().x, 9.0);
        assert_eq!(*bodies[h1].angvel(), Vector::new(-1.0, 0.5, 0.0));
    }

    #[test]
    fn invalid_handle_is_not_contained() {
        let bodies = RigidBodySet::new();
        assert!(!bodies.contains(RigidBodyHandle::invalid()));
        assert!(bodies.get(RigidBodyHandle::invalid()).is_none());
    }
}
