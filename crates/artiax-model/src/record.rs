//! Per-format particle records and the role mapping shared by all formats.

use std::fmt::Debug;
use std::path::Path;

use nalgebra::Vector3;

use crate::error::FormatError;
use crate::euler::EulerConvention;
use crate::sections::AuxSections;

/// Generic meaning of a column, independent of how a format names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    PosX,
    PosY,
    PosZ,
    ShiftX,
    ShiftY,
    ShiftZ,
    Ang1,
    Ang2,
    Ang3,
}

impl Role {
    pub const ALL: [Role; 9] = [
        Role::PosX,
        Role::PosY,
        Role::PosZ,
        Role::ShiftX,
        Role::ShiftY,
        Role::ShiftZ,
        Role::Ang1,
        Role::Ang2,
        Role::Ang3,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Role::PosX => "pos_x",
            Role::PosY => "pos_y",
            Role::PosZ => "pos_z",
            Role::ShiftX => "shift_x",
            Role::ShiftY => "shift_y",
            Role::ShiftZ => "shift_z",
            Role::Ang1 => "ang_1",
            Role::Ang2 => "ang_2",
            Role::Ang3 => "ang_3",
        }
    }
}

/// Columns that back the generic roles in one format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultParams {
    pub pos: [&'static str; 3],
    pub shift: [&'static str; 3],
    pub ang: [&'static str; 3],
}

impl DefaultParams {
    pub fn key(&self, role: Role) -> &'static str {
        match role {
            Role::PosX => self.pos[0],
            Role::PosY => self.pos[1],
            Role::PosZ => self.pos[2],
            Role::ShiftX => self.shift[0],
            Role::ShiftY => self.shift[1],
            Role::ShiftZ => self.shift[2],
            Role::Ang1 => self.ang[0],
            Role::Ang2 => self.ang[1],
            Role::Ang3 => self.ang[2],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &'static str)> + '_ {
        Role::ALL.into_iter().map(move |role| (role, self.key(role)))
    }
}

/// Fixed-schema record of one on-disk format.
///
/// `DATA_KEYS` lists every column of the schema in file order. The role
/// accessors (`origin`, `shift`, `angles`) read struct fields directly and must
/// agree with `DEFAULT_PARAMS`. Stored positions are in voxels, using the
/// in-memory origin convention of the format (0-based).
pub trait MotlRecord: Clone + Default + PartialEq + Debug + 'static {
    type Rotation: EulerConvention + Default + Clone + Debug;

    const FORMAT_NAME: &'static str;
    const DATA_KEYS: &'static [&'static str];
    const DEFAULT_PARAMS: DefaultParams;

    fn value(&self, key: &str) -> Option<f64>;

    /// Returns `false` when `key` is not part of the schema.
    fn set_value(&mut self, key: &str, value: f64) -> bool;

    fn origin(&self) -> Vector3<f64>;
    fn set_origin(&mut self, origin: Vector3<f64>);

    fn shift(&self) -> Vector3<f64>;
    fn set_shift(&mut self, shift: Vector3<f64>);

    fn angles(&self) -> [f64; 3];
    fn set_angles(&mut self, angles: [f64; 3]);

    /// Parses `path` into records plus every section that is not particle data.
    fn read_records(path: &Path) -> Result<(Vec<Self>, AuxSections), FormatError>;

    /// Serializes `records` and re-emits `sections` around them.
    fn write_records(path: &Path, records: &[&Self], sections: &AuxSections)
    -> Result<(), FormatError>;

    fn role(&self, role: Role) -> f64 {
        let origin = self.origin();
        let shift = self.shift();
        let angles = self.angles();
        match role {
            Role::PosX => origin.x,
            Role::PosY => origin.y,
            Role::PosZ => origin.z,
            Role::ShiftX => shift.x,
            Role::ShiftY => shift.y,
            Role::ShiftZ => shift.z,
            Role::Ang1 => angles[0],
            Role::Ang2 => angles[1],
            Role::Ang3 => angles[2],
        }
    }
}
