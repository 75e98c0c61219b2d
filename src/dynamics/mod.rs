//! Structures related to dynamics: bodies, links, constraint rows and the
//! velocity solver.

pub use self::integration_parameters::IntegrationParameters;
pub use self::joint::{DistanceJoint, DistanceJointError, DistanceMode, JointBase};
pub use self::rigid_body::{RigidBody, RigidBodyBuilder, RigidBodyType};
pub use self::rigid_body_set::{RigidBodyHandle, RigidBodySet};
pub use self::solver::{ConstraintMode, ConstraintRow, SystemDescriptor, VelocitySolver};

mod integration_parameters;
mod joint;
mod rigid_body;
mod rigid_body_set;
mod solver;
