//! Links constraining the relative motion of pairs of rigid bodies.

pub use self::distance_joint::{DistanceJoint, DistanceJointError, DistanceMode};

mod distance_joint;

use crate::data::{ArchiveError, ArchiveIn, ArchiveOut};
use crate::math::Real;

/// State shared by every link type: identification and activation.
///
/// Concrete links embed a `JointBase` and chain their persistence hooks
/// through it, so the base fields always precede the derived ones in an
/// archive.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct JointBase {
    /// A host-assigned name for this link.
    pub name: String,
    /// Disabled links take no part in any solver interaction.
    pub enabled: bool,
    pub(crate) time: Real,
}

impl Default for JointBase {
    fn default() -> Self {
        Self {
            name: String::new(),
            enabled: true,
            time: 0.0,
        }
    }
}

impl JointBase {
    const ARCHIVE_VERSION: u32 = 1;

    /// The simulation time of the last `update` call.
    #[inline]
    pub fn time(&self) -> Real {
        self.time
    }

    /// Writes the base fields.
    pub fn archive_out(&self, out: &mut ArchiveOut) {
        out.write_version("JointBase", Self::ARCHIVE_VERSION);
        out.write_str("name", &self.name);
        out.write_bool("enabled", self.enabled);
    }

    /// Restores the base fields.
    pub fn archive_in(&mut self, input: &mut ArchiveIn) -> Result<(), ArchiveError> {
        let _version = input.read_version("JointBase")?;
        self.name = input.read_str("name")?;
        self.enabled = input.read_bool("enabled")?;
        Ok(())
    }
}
