//! Records: ordered, named collections of typed fields.

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::error::DmapError;
use crate::value::{DmapArray, DmapScalar, DmapValue};

/// An ordered collection of named scalar and vector fields.
///
/// Field order is the declaration order and is preserved on the wire; names
/// are unique within each group. A field's wire type is fixed when it is
/// declared; later assignments may change the value (and, for arrays, the
/// shape) but never the type.
///
/// Records are built from a [`crate::RecordBuilder`] or one of the schema
/// constructors, mutated by overrides, serialized once, and discarded.
#[derive(Debug, Clone, Default)]
pub struct Record {
    scalars: Vec<(String, DmapScalar)>,
    vectors: Vec<(String, DmapArray)>,
}

impl Record {
    /// Creates an empty record with no declared fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a scalar field, or overwrites the value of an existing one
    /// in place (position and type are kept).
    pub fn add_scalar(&mut self, name: &str, value: DmapScalar) {
        if let Some(slot) = self.scalars.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value;
        } else {
            self.scalars.push((name.to_owned(), value));
        }
    }

    /// Declares a vector field filled uniformly with `fill`, or overwrites
    /// an existing one in place.
    pub fn add_vector_blank(
        &mut self,
        name: &str,
        fill: &DmapScalar,
        shape: &[usize],
    ) -> Result<(), DmapError> {
        let array = DmapArray::filled(fill, shape)?;
        if let Some(slot) = self.vectors.iter_mut().find(|(n, _)| n == name) {
            slot.1 = array;
        } else {
            self.vectors.push((name.to_owned(), array));
        }
        Ok(())
    }

    /// Sets the value of a declared scalar field.
    ///
    /// Fails with [`DmapError::UnknownField`] when `name` was never
    /// declared and [`DmapError::TypeMismatch`] when the value's wire type
    /// differs from the field's.
    pub fn set_scalar(&mut self, name: &str, value: DmapScalar) -> Result<(), DmapError> {
        let slot = self
            .scalars
            .iter_mut()
            .find(|(n, _)| n == name)
            .ok_or_else(|| DmapError::UnknownField(name.to_owned()))?;
        if slot.1.wire_type() != value.wire_type() {
            return Err(DmapError::TypeMismatch(format!(
                "scalar `{name}` holds {}, got {}",
                slot.1.wire_type(),
                value.wire_type()
            )));
        }
        slot.1 = value;
        Ok(())
    }

    /// Sets the value of a declared vector field.
    ///
    /// The element type is fixed at declaration; the shape may change
    /// (arrays can be resized through this setter, unlike through
    /// [`Record::apply_overrides`]).
    pub fn set_vector(&mut self, name: &str, value: DmapArray) -> Result<(), DmapError> {
        let slot = self
            .vectors
            .iter_mut()
            .find(|(n, _)| n == name)
            .ok_or_else(|| DmapError::UnknownField(name.to_owned()))?;
        if slot.1.wire_type() != value.wire_type() {
            return Err(DmapError::TypeMismatch(format!(
                "vector `{name}` holds {}, got {}",
                slot.1.wire_type(),
                value.wire_type()
            )));
        }
        slot.1 = value;
        Ok(())
    }

    /// Applies a caller-supplied bulk override of scalar and vector values.
    ///
    /// Overrides only touch declared fields (unknown names fail with
    /// [`DmapError::UnknownField`]) and never change a declared vector
    /// shape ([`DmapError::ShapeMismatch`]). Every override is validated
    /// before any is applied, so a failed call leaves the record unchanged.
    pub fn apply_overrides(
        &mut self,
        scalars: &[(&str, DmapScalar)],
        vectors: &[(&str, DmapArray)],
    ) -> Result<(), DmapError> {
        for (name, value) in scalars {
            let (_, current) = self
                .scalars
                .iter()
                .find(|(n, _)| n == name)
                .ok_or_else(|| DmapError::UnknownField((*name).to_owned()))?;
            if current.wire_type() != value.wire_type() {
                return Err(DmapError::TypeMismatch(format!(
                    "scalar `{name}` holds {}, got {}",
                    current.wire_type(),
                    value.wire_type()
                )));
            }
        }
        for (name, value) in vectors {
            let (_, current) = self
                .vectors
                .iter()
                .find(|(n, _)| n == name)
                .ok_or_else(|| DmapError::UnknownField((*name).to_owned()))?;
            if current.wire_type() != value.wire_type() {
                return Err(DmapError::TypeMismatch(format!(
                    "vector `{name}` holds {}, got {}",
                    current.wire_type(),
                    value.wire_type()
                )));
            }
            if current.shape() != value.shape() {
                return Err(DmapError::ShapeMismatch(format!(
                    "vector `{name}` declared {:?}, override has {:?}",
                    current.shape(),
                    value.shape()
                )));
            }
        }
        for (name, value) in scalars {
            self.set_scalar(name, value.clone())?;
        }
        for (name, value) in vectors {
            self.set_vector(name, value.clone())?;
        }
        Ok(())
    }

    /// Decomposes a timestamp into the seven base time fields: `time.yr`,
    /// `time.mo`, `time.dy`, `time.hr`, `time.mt`, `time.sc` (short) and
    /// `time.us` (int).
    ///
    /// The update is atomic: every target field is checked for presence
    /// and type before any is written, so a record missing one of them is
    /// left untouched.
    pub fn set_timestamp(&mut self, t: NaiveDateTime) -> Result<(), DmapError> {
        let year = i16::try_from(t.year()).map_err(|_| {
            DmapError::TypeMismatch(format!("year {} does not fit time.yr", t.year()))
        })?;
        let shorts: [(&str, i16); 6] = [
            ("time.yr", year),
            ("time.mo", t.month() as i16),
            ("time.dy", t.day() as i16),
            ("time.hr", t.hour() as i16),
            ("time.mt", t.minute() as i16),
            ("time.sc", t.second() as i16),
        ];
        // nanosecond() exceeds 1e9 on a leap second; clamp rather than wrap.
        let micros = (t.nanosecond() / 1_000).min(999_999) as i32;

        let scalar_overrides: Vec<(&str, DmapScalar)> = shorts
            .iter()
            .map(|&(name, v)| (name, DmapScalar::Short(v)))
            .chain(std::iter::once(("time.us", DmapScalar::Int(micros))))
            .collect();
        // apply_overrides validates all seven before writing any.
        self.apply_overrides(&scalar_overrides, &[])
    }

    /// Looks up a declared field by name in either group.
    pub fn get(&self, name: &str) -> Option<DmapValue> {
        if let Some((_, s)) = self.scalars.iter().find(|(n, _)| n == name) {
            return Some(DmapValue::Scalar(s.clone()));
        }
        self.vectors
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, a)| DmapValue::Array(a.clone()))
    }

    /// Looks up a declared scalar field.
    pub fn scalar(&self, name: &str) -> Option<&DmapScalar> {
        self.scalars.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    /// Looks up a declared vector field.
    pub fn vector(&self, name: &str) -> Option<&DmapArray> {
        self.vectors.iter().find(|(n, _)| n == name).map(|(_, a)| a)
    }

    /// Scalar fields in declaration order.
    pub fn scalars(&self) -> impl Iterator<Item = (&str, &DmapScalar)> {
        self.scalars.iter().map(|(n, s)| (n.as_str(), s))
    }

    /// Vector fields in declaration order.
    pub fn vectors(&self) -> impl Iterator<Item = (&str, &DmapArray)> {
        self.vectors.iter().map(|(n, a)| (n.as_str(), a))
    }

    /// Number of declared scalar fields.
    pub fn scalar_count(&self) -> usize {
        self.scalars.len()
    }

    /// Number of declared vector fields.
    pub fn vector_count(&self) -> usize {
        self.vectors.len()
    }
}
