//! A single particle record with its last-read state.

use std::fmt::{Display, Formatter};

use crate::error::DataError;
use crate::record::{MotlRecord, Role};

/// Identifier unique within one `ParticleData`. Never reused once issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticleId(pub u64);

impl Display for ParticleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle<R> {
    id: ParticleId,
    record: R,
    /// Values as last read from disk, restored by `reset`.
    original: R,
}

impl<R: MotlRecord> Particle<R> {
    pub(crate) fn new(id: ParticleId) -> Self {
        Self {
            id,
            record: R::default(),
            original: R::default(),
        }
    }

    pub fn id(&self) -> ParticleId {
        self.id
    }

    pub fn record(&self) -> &R {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut R {
        &mut self.record
    }

    pub fn original(&self) -> &R {
        &self.original
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.record.value(key)
    }

    pub fn set(&mut self, key: &str, value: f64) -> Result<(), DataError> {
        if self.record.set_value(key, value) {
            Ok(())
        } else {
            Err(DataError::UnknownAttribute(key.to_string()))
        }
    }

    pub fn role(&self, role: Role) -> f64 {
        self.record.role(role)
    }

    pub fn is_modified(&self) -> bool {
        self.record != self.original
    }

    pub fn reset(&mut self) {
        self.record = self.original.clone();
    }

    pub(crate) fn commit(&mut self) {
        self.original = self.record.clone();
    }
}
