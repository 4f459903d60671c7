//! ParticleData behaviour against a small whitespace-separated test format.

use std::fs;
use std::path::Path;

use artiax_model::{
    AttributeRange, AuxSections, Axis, DataError, DefaultParams, EulerConvention, FormatError,
    MotlRecord, ParticleData, ParticleId, ParticleList, PixelSizes, Role, clamp_unit,
};
use nalgebra::{Matrix3, Vector3};

#[derive(Debug, Clone, Copy, Default)]
struct Zyz;

impl EulerConvention for Zyz {
    fn axes(&self) -> [Axis; 3] {
        [Axis::Z, Axis::Y, Axis::Z]
    }

    fn rot1_from_matrix(&self, m: &Matrix3<f64>) -> f64 {
        if m[(2, 2)] > 0.9999 {
            0.0
        } else {
            m[(2, 1)].atan2(-m[(2, 0)]).to_degrees()
        }
    }

    fn rot2_from_matrix(&self, m: &Matrix3<f64>) -> f64 {
        let c = clamp_unit(m[(2, 2)]);
        (1.0 - c * c).sqrt().atan2(c).to_degrees()
    }

    fn rot3_from_matrix(&self, m: &Matrix3<f64>) -> f64 {
        if m[(2, 2)] > 0.9999 {
            m[(1, 0)].atan2(m[(0, 0)]).to_degrees()
        } else {
            m[(1, 2)].atan2(m[(0, 2)]).to_degrees()
        }
    }
}

const KEYS: &[&str] = &["x", "y", "z", "dx", "dy", "dz", "rot", "tilt", "psi", "score"];
const MARKER: &str = "# test particles";

#[derive(Debug, Clone, Default, PartialEq)]
struct TestRecord {
    values: [f64; 10],
}

impl TestRecord {
    fn index(key: &str) -> Option<usize> {
        KEYS.iter().position(|k| *k == key)
    }
}

impl MotlRecord for TestRecord {
    type Rotation = Zyz;

    const FORMAT_NAME: &'static str = "test";
    const DATA_KEYS: &'static [&'static str] = KEYS;
    const DEFAULT_PARAMS: DefaultParams = DefaultParams {
        pos: ["x", "y", "z"],
        shift: ["dx", "dy", "dz"],
        ang: ["rot", "tilt", "psi"],
    };

    fn value(&self, key: &str) -> Option<f64> {
        Self::index(key).map(|i| self.values[i])
    }

    fn set_value(&mut self, key: &str, value: f64) -> bool {
        match Self::index(key) {
            Some(i) => {
                self.values[i] = value;
                true
            }
            None => false,
        }
    }

    fn origin(&self) -> Vector3<f64> {
        Vector3::new(self.values[0], self.values[1], self.values[2])
    }

    fn set_origin(&mut self, origin: Vector3<f64>) {
        self.values[..3].copy_from_slice(origin.as_slice());
    }

    fn shift(&self) -> Vector3<f64> {
        Vector3::new(self.values[3], self.values[4], self.values[5])
    }

    fn set_shift(&mut self, shift: Vector3<f64>) {
        self.values[3..6].copy_from_slice(shift.as_slice());
    }

    fn angles(&self) -> [f64; 3] {
        [self.values[6], self.values[7], self.values[8]]
    }

    fn set_angles(&mut self, angles: [f64; 3]) {
        self.values[6..9].copy_from_slice(&angles);
    }

    fn read_records(path: &Path) -> Result<(Vec<Self>, AuxSections), FormatError> {
        let text = fs::read_to_string(path).map_err(|source| FormatError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut lines = text.lines();
        if lines.next() != Some(MARKER) {
            return Err(FormatError::MissingMarker {
                marker: MARKER.to_string(),
                path: path.to_path_buf(),
            });
        }

        let mut records = Vec::new();
        for (row, line) in lines.filter(|l| !l.trim().is_empty()).enumerate() {
            let mut record = TestRecord::default();
            for (i, token) in line.split_whitespace().enumerate().take(KEYS.len()) {
                record.values[i] = token.parse().map_err(|_| FormatError::InvalidValue {
                    path: path.to_path_buf(),
                    row: row + 1,
                    column: KEYS[i].to_string(),
                    value: token.to_string(),
                })?;
            }
            records.push(record);
        }
        Ok((records, AuxSections::new()))
    }

    fn write_records(
        path: &Path,
        records: &[&Self],
        _sections: &AuxSections,
    ) -> Result<(), FormatError> {
        let mut out = format!("{MARKER}\n");
        for record in records {
            let row: Vec<String> = record.values.iter().map(|v| v.to_string()).collect();
            out.push_str(&row.join(" "));
            out.push('\n');
        }
        fs::write(path, out).map_err(|source| FormatError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn write_sample(path: &Path) {
    let text = format!(
        "{MARKER}\n1 2 3 0.5 0 0 10 20 30 0.9\n4 5 6 0 0 0 0 0 0 0.1\n7 8 9 0 0 -1 0 90 0 0.5\n"
    );
    fs::write(path, text).expect("sample should be written");
}

#[test]
fn new_particle_has_every_schema_key() {
    let mut data = ParticleData::<TestRecord>::new();
    let particle = data.new_particle();
    for key in KEYS {
        assert_eq!(particle.get(key), Some(0.0), "key {key}");
    }
}

#[test]
fn ids_are_stable_and_never_reused() {
    let mut data = ParticleData::<TestRecord>::new();
    let ids: Vec<ParticleId> = (0..4).map(|_| data.new_particle().id()).collect();

    assert_eq!(data.delete_data(&[ids[1], ParticleId(99)]), 1);
    assert_eq!(data.ids(), vec![ids[0], ids[2], ids[3]]);

    let fresh = data.new_particle().id();
    assert!(!ids.contains(&fresh));
    assert_eq!(data.ids(), vec![ids[0], ids[2], ids[3], fresh]);
}

#[test]
fn set_rejects_unknown_attribute() {
    let mut data = ParticleData::<TestRecord>::new();
    let id = data.new_particle().id();
    let err = data.set_value(id, "nope", 1.0).expect_err("should fail");
    assert_eq!(err, DataError::UnknownAttribute("nope".to_string()));
    let err = data.value(ParticleId(42), "x").expect_err("should fail");
    assert_eq!(err, DataError::UnknownParticle(ParticleId(42)));
}

#[test]
fn reset_restores_last_read_values() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("list.txt");
    write_sample(&path);

    let mut data = ParticleData::<TestRecord>::read_file(&path).expect("read should succeed");
    let ids = data.ids();
    data.set_value(ids[0], "score", 0.0).expect("set");
    data.set_value(ids[1], "x", 100.0).expect("set");
    assert!(data.particle(ids[0]).is_some_and(|p| p.is_modified()));

    data.reset_particles(&[ids[0]]).expect("reset");
    assert_eq!(data.value(ids[0], "score"), Ok(0.9));
    assert_eq!(data.value(ids[1], "x"), Ok(100.0));

    data.reset_all_particles();
    assert_eq!(data.value(ids[1], "x"), Ok(4.0));
}

#[test]
fn reset_with_unknown_id_changes_nothing() {
    let mut data = ParticleData::<TestRecord>::new();
    let id = data.new_particle().id();
    data.set_value(id, "x", 5.0).expect("set");
    assert!(data.reset_particles(&[id, ParticleId(7)]).is_err());
    assert_eq!(data.value(id, "x"), Ok(5.0));
}

#[test]
fn pixel_sizes_scale_on_access_only() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("list.txt");
    write_sample(&path);

    let mut data = ParticleData::<TestRecord>::read_file(&path).expect("read should succeed");
    data.set_pixel_sizes(PixelSizes {
        origin: 2.0,
        translation: 4.0,
    })
    .expect("valid pixel sizes");
    let id = data.ids()[0];

    assert_eq!(data.origin(id), Ok(Vector3::new(2.0, 4.0, 6.0)));
    assert_eq!(data.translation(id), Ok(Vector3::new(2.0, 0.0, 0.0)));

    data.set_origin(id, Vector3::new(3.0, 4.0, 5.0)).expect("set");
    assert_eq!(data.value(id, "x"), Ok(1.5));
    data.set_translation(id, Vector3::new(1.0, 0.0, 0.0)).expect("set");
    assert_eq!(data.value(id, "dx"), Ok(0.25));

    let out = dir.path().join("out.txt");
    data.write_file(Some(out.as_path())).expect("write should succeed");
    let reread = ParticleData::<TestRecord>::read_file(&out).expect("read back");
    let first = reread.ids()[0];
    assert_eq!(reread.value(first, "x"), Ok(1.5));
    assert_eq!(reread.value(first, "dx"), Ok(0.25));
}

#[test]
fn invalid_pixel_sizes_are_rejected() {
    let mut data = ParticleData::<TestRecord>::new();
    assert_eq!(
        data.set_origin_pixelsize(0.0),
        Err(DataError::InvalidPixelSize(0.0))
    );
    assert!(data.set_translation_pixelsize(f64::NAN).is_err());
    assert_eq!(data.pixel_sizes(), PixelSizes::default());
}

#[test]
fn rotation_round_trips_through_angles() {
    let mut data = ParticleData::<TestRecord>::new();
    let id = data.new_particle().id();
    let target = Zyz.matrix_from_angles(-40.0, 65.0, 120.0);

    data.set_rotation(id, &target).expect("set");
    let angles = data.particle(id).map(|p| p.record().angles()).expect("particle");
    assert!((angles[0] + 40.0).abs() < 1e-9);
    assert!((angles[1] - 65.0).abs() < 1e-9);
    assert!((angles[2] - 120.0).abs() < 1e-9);

    let back = data.rotation(id).expect("rotation");
    assert!((back - target).abs().max() < 1e-12);
}

#[test]
fn placement_combines_rotation_and_position() {
    let mut data = ParticleData::<TestRecord>::new();
    data.set_origin_pixelsize(2.0).expect("valid");
    let particle = data.new_particle();
    particle.set("x", 1.0).expect("set");
    particle.set("dz", 0.5).expect("set");
    particle.set("rot", 90.0).expect("set");
    let id = particle.id();

    let m = data.placement(id).expect("placement");
    let p = m * nalgebra::Vector4::new(1.0, 0.0, 0.0, 1.0);
    // Rz(90) sends x to y, then origin (2, 0, 0) + shift (0, 0, 0.5).
    assert!((p.x - 2.0).abs() < 1e-12);
    assert!((p.y - 1.0).abs() < 1e-12);
    assert!((p.z - 0.5).abs() < 1e-12);
}

#[test]
fn attribute_range_and_selection() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("list.txt");
    write_sample(&path);
    let data = ParticleData::<TestRecord>::read_file(&path).expect("read should succeed");
    let ids = data.ids();

    assert_eq!(data.attribute_range("score"), Ok(Some((0.1, 0.9))));
    assert_eq!(
        ParticleData::<TestRecord>::new().attribute_range("score"),
        Ok(None)
    );

    let selected = data
        .select(&[AttributeRange::new("score", 0.5, 1.0)])
        .expect("select");
    assert_eq!(selected, vec![ids[0], ids[2]]);

    let selected = data
        .select(&[
            AttributeRange::new("score", 0.5, 1.0),
            AttributeRange::new("x", 5.0, 10.0),
        ])
        .expect("select");
    assert_eq!(selected, vec![ids[2]]);

    assert!(data.select(&[AttributeRange::new("bogus", 0.0, 1.0)]).is_err());
}

#[test]
fn columns_follow_schema_order() {
    let mut data = ParticleData::<TestRecord>::new();
    data.new_particle().set("y", 3.0).expect("set");
    data.new_particle().set("y", 4.0).expect("set");
    let columns = data.as_columns();
    assert_eq!(columns.len(), KEYS.len());
    assert_eq!(columns[1], ("y", vec![3.0, 4.0]));
}

#[test]
fn reload_keeps_state_when_file_turns_invalid() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("list.txt");
    write_sample(&path);
    let mut data = ParticleData::<TestRecord>::read_file(&path).expect("read should succeed");
    let before = data.ids();

    fs::write(&path, "not a particle list\n").expect("overwrite");
    let err = data.reload().expect_err("reload should fail");
    assert!(matches!(err, FormatError::MissingMarker { .. }));
    assert_eq!(data.ids(), before);
    assert_eq!(data.value(before[2], "z"), Ok(9.0));

    write_sample(&path);
    data.reload().expect("reload should succeed");
    assert_eq!(data.len(), 3);
    assert!(data.ids().iter().all(|id| !before.contains(id)));
}

#[test]
fn write_without_target_fails() {
    let data = ParticleData::<TestRecord>::new();
    assert!(matches!(data.write_file(None), Err(FormatError::NoTarget)));
}

#[test]
fn roles_follow_default_params() {
    let mut data = ParticleData::<TestRecord>::new();
    let particle = data.new_particle();
    for (i, key) in KEYS.iter().enumerate() {
        particle.set(key, i as f64 + 1.0).expect("set");
    }
    let params = TestRecord::DEFAULT_PARAMS;
    for role in Role::ALL {
        assert_eq!(Some(particle.role(role)), particle.get(params.key(role)));
    }
}

#[test]
fn boxed_list_exposes_the_same_data() {
    let mut list: Box<dyn ParticleList> = Box::new(ParticleData::<TestRecord>::new());
    let id = list.new_particle();
    list.set_value(id, "score", 0.25).expect("set");
    assert_eq!(list.format_name(), "test");
    assert_eq!(list.len(), 1);
    assert_eq!(list.value(id, "score"), Ok(0.25));
    assert_eq!(list.delete_data(&[id]), 1);
    assert!(list.is_empty());
}
