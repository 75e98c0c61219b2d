//! Constraint rows, their system-level aggregation, and the projected-SOR
//! velocity solver.

pub use self::constraint_row::{ConstraintMode, ConstraintRow};
pub use self::system_descriptor::SystemDescriptor;
pub use self::velocity_solver::VelocitySolver;

mod constraint_row;
mod system_descriptor;
mod velocity_solver;
