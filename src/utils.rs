//! Miscellaneous utilities.

use crate::math::{Real, Rotation, RotationMatrix, Vector};

/// Computes the inverse of `val`, yielding zero when `val` is zero.
///
/// Zero inverses are how fixed bodies opt out of constraint corrections, so
/// this never returns an infinity.
#[inline]
pub fn inv(val: Real) -> Real {
    if val == 0.0 {
        0.0
    } else {
        1.0 / val
    }
}

/// Builds a rotation whose local x axis maps to `xdir`.
///
/// The remaining two axes are obtained by orthonormalization against
/// `up_hint`. When `xdir` is (nearly) parallel to the hint, a perpendicular
/// replacement hint is substituted; when `xdir` is (nearly) zero, the
/// identity rotation is returned.
pub fn rotation_from_x_axis(xdir: &Vector, up_hint: &Vector) -> Rotation {
    let Some(ax) = xdir.try_normalize(1.0e-6) else {
        return Rotation::identity();
    };

    let mut az = ax.cross(up_hint);
    if az.norm_squared() < 1.0e-6 {
        // xdir is aligned with the hint; any perpendicular hint will do.
        let alt = if ax.x.abs() < 0.9 {
            Vector::x()
        } else {
            Vector::y()
        };
        az = ax.cross(&alt);
    }
    let az = az.normalize();
    let ay = az.cross(&ax);

    Rotation::from_rotation_matrix(&RotationMatrix::from_basis_unchecked(&[ax, ay, az]))
}
