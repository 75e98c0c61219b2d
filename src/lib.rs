//! # Tether
//!
//! Tether is a Rust crate for maintaining scalar distance constraints between
//! rigid bodies inside a step-driven simulation loop. It provides the
//! constraint-Jacobian computation, violation bookkeeping and reaction
//! extraction for distance links, together with a small projected-SOR velocity
//! solver that consumes the constraint rows the links produce.
//!
//! The crate is deliberately narrow: collision detection, islands, sleeping
//! and rendering are out of scope. A host integration loop owns the bodies,
//! calls [`dynamics::DistanceJoint::update`] once per step, runs the solver,
//! and reads the reaction forces back.

#![deny(bare_trait_objects)]
#![warn(missing_docs)]
#![allow(clippy::too_many_arguments)]

pub extern crate nalgebra as na;
#[cfg(feature = "serde-serialize")]
#[macro_use]
extern crate serde;
extern crate num_traits as num;

pub(crate) const INVALID_U32: u32 = u32::MAX;

/// The string version of Tether.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod data;
pub mod dynamics;
pub mod geometry;
pub mod utils;

/// Elementary mathematical entities (vectors, points, isometries, etc).
pub mod math {
    use crate::na;

    /// The scalar type used throughout this crate.
    pub type Real = f32;

    /// The default tolerance used for geometric operations.
    pub const DEFAULT_EPSILON: Real = Real::EPSILON;

    /// The dimension of the space.
    pub const DIM: usize = 3;

    /// The number of rotational degrees of freedom of a rigid body.
    pub const ANG_DIM: usize = 3;

    /// The number of degrees of freedom of a rigid body (translations plus
    /// rotations).
    pub const SPATIAL_DIM: usize = 6;

    /// The point type.
    pub type Point = na::Point3<Real>;

    /// The 2D point type, used for texture coordinates.
    pub type Point2 = na::Point2<Real>;

    /// The vector type.
    pub type Vector = na::Vector3<Real>;

    /// The angular vector type.
    pub type AngVector = na::Vector3<Real>;

    /// The unit vector type.
    pub type UnitVector = na::UnitVector3<Real>;

    /// The matrix type.
    pub type Matrix = na::Matrix3<Real>;

    /// The transformation type.
    pub type Isometry = na::Isometry3<Real>;

    /// The rotation type.
    pub type Rotation = na::UnitQuaternion<Real>;

    /// The rotation matrix type.
    pub type RotationMatrix = na::Rotation3<Real>;

    /// The translation type.
    pub type Translation = na::Translation3<Real>;

    /// A 6D vector combining the translational (3D) and rotational (3D)
    /// degrees of freedom of a rigid body.
    pub type SpatialVector = na::Vector6<Real>;
}

/// Prelude containing the common types defined by Tether.
pub mod prelude {
    pub use crate::data::{Archive, ArchiveError, ArchiveIn, ArchiveOut};
    pub use crate::dynamics::{
        ConstraintMode, ConstraintRow, DistanceJoint, DistanceJointError, DistanceMode,
        IntegrationParameters, RigidBody, RigidBodyBuilder, RigidBodyHandle, RigidBodySet,
        RigidBodyType, SystemDescriptor, VelocitySolver,
    };
    pub use crate::geometry::{BarrelShape, VisualMesh};
    pub use crate::math::*;
    pub use na::DVector;
}
