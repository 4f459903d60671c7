//! STOPGAP motive lists stored as STAR files.
//!
//! The particle table is the first table that declares `orig_z`. Origins are
//! 1-based on disk and 0-based in memory. Every other part of the file is kept
//! verbatim and written back around the regenerated particle loop.

mod rotation;

use std::fs;
use std::path::Path;

use artiax_model::{AuxSections, DefaultParams, FormatError, MotlRecord, ParticleData, Section};
use artiax_star::{StarFile, write_loop};
use log::{debug, warn};
use nalgebra::Vector3;

pub use rotation::StopgapRotation;

pub const FORMAT_NAME: &str = "STOPGAP STAR file";

/// Column whose presence identifies the particle table.
pub const MARKER_COLUMN: &str = "orig_z";

/// Block header used when a list has no source file to copy the layout from.
const DEFAULT_BLOCK: &str = "data_stopgap_motivelist\n\n";

pub const DATA_KEYS: &[&str] = &[
    "motl_idx",
    "tomo_num",
    "object",
    "subtomo_num",
    "halfset",
    "orig_x",
    "orig_y",
    "orig_z",
    "score",
    "x_shift",
    "y_shift",
    "z_shift",
    "phi",
    "psi",
    "the",
    "class",
];

pub type StopgapParticleData = ParticleData<StopgapRecord>;

/// Half-set assignment. STOPGAP writes `A`/`B`; older lists use numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Halfset {
    A,
    B,
    Numeric(f64),
}

impl Default for Halfset {
    fn default() -> Self {
        Halfset::Numeric(0.0)
    }
}

impl Halfset {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "A" | "a" => Some(Halfset::A),
            "B" | "b" => Some(Halfset::B),
            _ => raw.parse().ok().map(Halfset::Numeric),
        }
    }

    pub fn value(self) -> f64 {
        match self {
            Halfset::A => 1.0,
            Halfset::B => 2.0,
            Halfset::Numeric(v) => v,
        }
    }

    /// Sets the numeric view, keeping the letter form where one applies.
    pub fn with_value(self, value: f64) -> Self {
        match self {
            Halfset::A | Halfset::B if value == 1.0 => Halfset::A,
            Halfset::A | Halfset::B if value == 2.0 => Halfset::B,
            _ => Halfset::Numeric(value),
        }
    }

    fn to_text(self) -> String {
        match self {
            Halfset::A => "A".to_string(),
            Halfset::B => "B".to_string(),
            Halfset::Numeric(v) => format_value(v),
        }
    }
}

/// One row of a STOPGAP motive list. Origins are 0-based voxel coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StopgapRecord {
    pub motl_idx: f64,
    pub tomo_num: f64,
    pub object: f64,
    pub subtomo_num: f64,
    pub halfset: Halfset,
    pub orig_x: f64,
    pub orig_y: f64,
    pub orig_z: f64,
    pub score: f64,
    pub x_shift: f64,
    pub y_shift: f64,
    pub z_shift: f64,
    pub phi: f64,
    pub psi: f64,
    pub the: f64,
    pub class: f64,
}

impl StopgapRecord {
    fn field(&self, key: &str) -> Option<f64> {
        let value = match key {
            "motl_idx" => self.motl_idx,
            "tomo_num" => self.tomo_num,
            "object" => self.object,
            "subtomo_num" => self.subtomo_num,
            "halfset" => self.halfset.value(),
            "orig_x" => self.orig_x,
            "orig_y" => self.orig_y,
            "orig_z" => self.orig_z,
            "score" => self.score,
            "x_shift" => self.x_shift,
            "y_shift" => self.y_shift,
            "z_shift" => self.z_shift,
            "phi" => self.phi,
            "psi" => self.psi,
            "the" => self.the,
            "class" => self.class,
            _ => return None,
        };
        Some(value)
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut f64> {
        let field = match key {
            "motl_idx" => &mut self.motl_idx,
            "tomo_num" => &mut self.tomo_num,
            "object" => &mut self.object,
            "subtomo_num" => &mut self.subtomo_num,
            "orig_x" => &mut self.orig_x,
            "orig_y" => &mut self.orig_y,
            "orig_z" => &mut self.orig_z,
            "score" => &mut self.score,
            "x_shift" => &mut self.x_shift,
            "y_shift" => &mut self.y_shift,
            "z_shift" => &mut self.z_shift,
            "phi" => &mut self.phi,
            "psi" => &mut self.psi,
            "the" => &mut self.the,
            "class" => &mut self.class,
            _ => return None,
        };
        Some(field)
    }

    /// Stores the on-disk text of `key`. Returns `false` if it is not a value.
    fn set_text(&mut self, key: &str, raw: &str) -> bool {
        if key == "halfset" {
            return match Halfset::parse(raw) {
                Some(halfset) => {
                    self.halfset = halfset;
                    true
                }
                None => false,
            };
        }
        match (self.field_mut(key), raw.parse::<f64>()) {
            (Some(field), Ok(value)) => {
                *field = value;
                true
            }
            _ => false,
        }
    }

    /// Row text in `DATA_KEYS` order, with 1-based origins.
    fn to_row(&self) -> Vec<String> {
        let mut on_disk = self.clone();
        on_disk.set_origin(self.origin().add_scalar(1.0));
        DATA_KEYS
            .iter()
            .map(|key| match *key {
                "halfset" => on_disk.halfset.to_text(),
                _ => format_value(on_disk.field(key).unwrap_or_default()),
            })
            .collect()
    }
}

/// Shortest text that parses back to the same value.
fn format_value(value: f64) -> String {
    format!("{value}")
}

impl MotlRecord for StopgapRecord {
    type Rotation = StopgapRotation;

    const FORMAT_NAME: &'static str = FORMAT_NAME;
    const DATA_KEYS: &'static [&'static str] = DATA_KEYS;
    const DEFAULT_PARAMS: DefaultParams = DefaultParams {
        pos: ["orig_x", "orig_y", "orig_z"],
        shift: ["x_shift", "y_shift", "z_shift"],
        ang: ["phi", "the", "psi"],
    };

    fn value(&self, key: &str) -> Option<f64> {
        self.field(key)
    }

    fn set_value(&mut self, key: &str, value: f64) -> bool {
        if key == "halfset" {
            self.halfset = self.halfset.with_value(value);
            return true;
        }
        match self.field_mut(key) {
            Some(field) => {
                *field = value;
                true
            }
            None => false,
        }
    }

    fn origin(&self) -> Vector3<f64> {
        Vector3::new(self.orig_x, self.orig_y, self.orig_z)
    }

    fn set_origin(&mut self, origin: Vector3<f64>) {
        self.orig_x = origin.x;
        self.orig_y = origin.y;
        self.orig_z = origin.z;
    }

    fn shift(&self) -> Vector3<f64> {
        Vector3::new(self.x_shift, self.y_shift, self.z_shift)
    }

    fn set_shift(&mut self, shift: Vector3<f64>) {
        self.x_shift = shift.x;
        self.y_shift = shift.y;
        self.z_shift = shift.z;
    }

    fn angles(&self) -> [f64; 3] {
        [self.phi, self.the, self.psi]
    }

    fn set_angles(&mut self, angles: [f64; 3]) {
        [self.phi, self.the, self.psi] = angles;
    }

    fn read_records(path: &Path) -> Result<(Vec<Self>, AuxSections), FormatError> {
        read_stopgap(path)
    }

    fn write_records(
        path: &Path,
        records: &[&Self],
        sections: &AuxSections,
    ) -> Result<(), FormatError> {
        let text = render_stopgap(records, sections);
        fs::write(path, text).map_err(|source| FormatError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn read_stopgap(path: &Path) -> Result<(Vec<StopgapRecord>, AuxSections), FormatError> {
    let text = fs::read_to_string(path).map_err(|source| FormatError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let star = StarFile::parse_str(&text).map_err(|err| FormatError::Syntax {
        path: path.to_path_buf(),
        line: err.line,
        message: err.message,
    })?;

    let (block_idx, table_idx) =
        star.find_table(MARKER_COLUMN)
            .ok_or_else(|| FormatError::MissingMarker {
                marker: MARKER_COLUMN.to_string(),
                path: path.to_path_buf(),
            })?;
    let block = &star.blocks[block_idx];
    let table = &block.tables[table_idx];
    debug!(
        "particle table found in block `{}` at line {}",
        block.name, table.line_start
    );

    let columns = DATA_KEYS
        .iter()
        .map(|key| {
            table
                .column_index(key)
                .ok_or_else(|| FormatError::MissingColumn {
                    column: key.to_string(),
                    table: block.name.clone(),
                    path: path.to_path_buf(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let extra: Vec<&str> = table
        .columns
        .iter()
        .map(String::as_str)
        .filter(|c| !DATA_KEYS.iter().any(|k| k == c))
        .collect();
    if !extra.is_empty() {
        warn!(
            "{}: columns {} are not part of the STOPGAP schema and will not be written back",
            path.display(),
            extra.join(", ")
        );
    }

    let mut records = Vec::with_capacity(table.rows.len());
    for (row_idx, row) in table.rows.iter().enumerate() {
        let mut record = StopgapRecord::default();
        for (key, &col) in DATA_KEYS.iter().zip(&columns) {
            let raw = &row[col];
            if !record.set_text(key, raw) {
                return Err(FormatError::InvalidValue {
                    path: path.to_path_buf(),
                    row: row_idx + 1,
                    column: key.to_string(),
                    value: raw.clone(),
                });
            }
        }
        record.set_origin(record.origin().add_scalar(-1.0));
        records.push(record);
    }

    let mut sections = AuxSections::new();
    if !star.preamble.is_empty() {
        sections.push_verbatim("", star.preamble.as_str());
    }
    for (idx, other) in star.blocks.iter().enumerate() {
        if idx == block_idx {
            sections.push_particles(other.name.as_str(), block.head(table), block.tail(table));
        } else {
            sections.push_verbatim(other.name.as_str(), other.raw.as_str());
        }
    }

    Ok((records, sections))
}

/// Full file text: preserved sections in order with the particle loop
/// regenerated in place.
fn render_stopgap(records: &[&StopgapRecord], sections: &AuxSections) -> String {
    let rows: Vec<Vec<String>> = records.iter().map(|r| r.to_row()).collect();
    let table = write_loop(DATA_KEYS, &rows);

    let mut out = String::new();
    for section in sections.iter() {
        match section {
            Section::Verbatim { text, .. } => out.push_str(text),
            Section::Particles { head, tail, .. } => {
                out.push_str(head);
                out.push_str(&table);
                out.push_str(tail);
            }
        }
    }
    if sections.particle_section().is_none() {
        out.push_str(DEFAULT_BLOCK);
        out.push_str(&table);
    }
    out
}
