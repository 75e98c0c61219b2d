use crate::data::{Archive, ArchiveError, ArchiveIn, ArchiveOut};
use crate::math::Real;

/// State shared by every visual-shape data holder.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct VisualShapeBase {
    /// Whether the shape should be drawn at all.
    pub visible: bool,
    /// Whether the host may rebuild the shape's render data every frame.
    /// Static primitives leave this unset.
    pub is_mutable: bool,
}

impl Default for VisualShapeBase {
    fn default() -> Self {
        Self {
            visible: true,
            is_mutable: true,
        }
    }
}

impl VisualShapeBase {
    const ARCHIVE_VERSION: u32 = 1;

    /// Writes the base fields.
    pub fn archive_out(&self, out: &mut ArchiveOut) {
        out.write_version("VisualShapeBase", Self::ARCHIVE_VERSION);
        out.write_bool("visible", self.visible);
        out.write_bool("is_mutable", self.is_mutable);
    }

    /// Restores the base fields.
    pub fn archive_in(&mut self, input: &mut ArchiveIn) -> Result<(), ArchiveError> {
        let _version = input.read_version("VisualShapeBase")?;
        self.visible = input.read_bool("visible")?;
        self.is_mutable = input.read_bool("is_mutable")?;
        Ok(())
    }
}

/// The defining dimensions of a barrel-shaped visual primitive: a solid of
/// revolution around the vertical axis, truncated at two heights.
///
/// This is a pure data holder; tessellation is left to the rendering host.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BarrelShape {
    /// Shared visual-shape state, persisted before the barrel's own fields.
    pub base: VisualShapeBase,
    height_low: Real,
    height_high: Real,
    semi_axis_vert: Real,
    semi_axis_hor: Real,
    radial_offset: Real,
}

impl Default for BarrelShape {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0, 0.0)
    }
}

impl BarrelShape {
    const ARCHIVE_VERSION: u32 = 1;

    /// Creates a barrel truncated at heights `y_low`/`y_high`, whose profile
    /// ellipse has the given full vertical/horizontal axes, shifted radially
    /// outward by `radial_offset`.
    pub fn new(
        y_low: Real,
        y_high: Real,
        vert_axis: Real,
        hor_axis: Real,
        radial_offset: Real,
    ) -> Self {
        Self {
            base: VisualShapeBase {
                // The defining dimensions are fixed at construction time, so
                // the render data never needs rebuilding.
                is_mutable: false,
                ..VisualShapeBase::default()
            },
            height_low: y_low,
            height_high: y_high,
            semi_axis_vert: vert_axis / 2.0,
            semi_axis_hor: hor_axis / 2.0,
            radial_offset,
        }
    }

    /// The lower truncation height.
    #[inline]
    pub fn height_low(&self) -> Real {
        self.height_low
    }

    /// The upper truncation height.
    #[inline]
    pub fn height_high(&self) -> Real {
        self.height_high
    }

    /// The vertical semi-axis of the profile ellipse.
    #[inline]
    pub fn semi_axis_vert(&self) -> Real {
        self.semi_axis_vert
    }

    /// The horizontal semi-axis of the profile ellipse.
    #[inline]
    pub fn semi_axis_hor(&self) -> Real {
        self.semi_axis_hor
    }

    /// The radial offset of the profile ellipse from the rotation axis.
    #[inline]
    pub fn radial_offset(&self) -> Real {
        self.radial_offset
    }
}

impl Archive for BarrelShape {
    fn type_name(&self) -> &'static str {
        "BarrelShape"
    }

    fn archive_out(&self, out: &mut ArchiveOut) {
        out.write_version("BarrelShape", Self::ARCHIVE_VERSION);
        self.base.archive_out(out);
        out.write_scalar("height_low", self.height_low);
        out.write_scalar("height_high", self.height_high);
        out.write_scalar("semi_axis_vert", self.semi_axis_vert);
        out.write_scalar("semi_axis_hor", self.semi_axis_hor);
        out.write_scalar("radial_offset", self.radial_offset);
    }

    fn archive_in(&mut self, input: &mut ArchiveIn) -> Result<(), ArchiveError> {
        let _version = input.read_version("BarrelShape")?;
        self.base.archive_in(input)?;
        self.height_low = input.read_scalar("height_low")?;
        self.height_high = input.read_scalar("height_high")?;
        self.semi_axis_vert = input.read_scalar("semi_axis_vert")?;
        self.semi_axis_hor = input.read_scalar("semi_axis_hor")?;
        self.radial_offset = input.read_scalar("radial_offset")?;
        Ok(())
    }
}
