//! Typed values: wire type tags, scalars, and n-dimensional arrays.

use std::fmt;

use crate::error::DmapError;

/// One-byte wire type tag identifying a field's storage type.
///
/// Only `Char` (unsigned 8-bit, matching the historical producers),
/// `Short`, `Int`, `Float`, and `String` are carried by this codec. The
/// remaining tags are part of the format and are recognized on decode, but
/// attempting to decode a field of one of them fails with
/// [`DmapError::UnsupportedType`] rather than silently mis-decoding the
/// payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    /// Unsigned 8-bit integer (code 1).
    Char,
    /// Signed 16-bit integer (code 2).
    Short,
    /// Signed 32-bit integer (code 3).
    Int,
    /// 32-bit float (code 4).
    Float,
    /// 64-bit float (code 8). Reserved.
    Double,
    /// Zero-terminated text (code 9).
    String,
    /// Signed 64-bit integer (code 10). Reserved.
    Long,
    /// Unsigned 8-bit integer (code 16). Reserved.
    Uchar,
    /// Unsigned 16-bit integer (code 17). Reserved.
    Ushort,
    /// Unsigned 32-bit integer (code 18). Reserved.
    Uint,
    /// Unsigned 64-bit integer (code 19). Reserved.
    Ulong,
}

impl WireType {
    /// Returns the numeric tag code emitted on the wire.
    pub fn code(self) -> u8 {
        match self {
            WireType::Char => 1,
            WireType::Short => 2,
            WireType::Int => 3,
            WireType::Float => 4,
            WireType::Double => 8,
            WireType::String => 9,
            WireType::Long => 10,
            WireType::Uchar => 16,
            WireType::Ushort => 17,
            WireType::Uint => 18,
            WireType::Ulong => 19,
        }
    }

    /// Looks up a tag code in the known-type table.
    pub fn from_code(code: u8) -> Result<Self, DmapError> {
        match code {
            1 => Ok(WireType::Char),
            2 => Ok(WireType::Short),
            3 => Ok(WireType::Int),
            4 => Ok(WireType::Float),
            8 => Ok(WireType::Double),
            9 => Ok(WireType::String),
            10 => Ok(WireType::Long),
            16 => Ok(WireType::Uchar),
            17 => Ok(WireType::Ushort),
            18 => Ok(WireType::Uint),
            19 => Ok(WireType::Ulong),
            other => Err(DmapError::UnknownType(other)),
        }
    }

    /// Fixed payload width in bytes, or `None` for zero-terminated text.
    pub fn width(self) -> Option<usize> {
        match self {
            WireType::Char | WireType::Uchar => Some(1),
            WireType::Short | WireType::Ushort => Some(2),
            WireType::Int | WireType::Uint | WireType::Float => Some(4),
            WireType::Long | WireType::Ulong | WireType::Double => Some(8),
            WireType::String => None,
        }
    }

    /// Whether this codec can carry values of this type.
    pub fn is_supported(self) -> bool {
        matches!(
            self,
            WireType::Char
                | WireType::Short
                | WireType::Int
                | WireType::Float
                | WireType::String
        )
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WireType::Char => "char",
            WireType::Short => "short",
            WireType::Int => "int",
            WireType::Float => "float",
            WireType::Double => "double",
            WireType::String => "string",
            WireType::Long => "long",
            WireType::Uchar => "uchar",
            WireType::Ushort => "ushort",
            WireType::Uint => "uint",
            WireType::Ulong => "ulong",
        };
        write!(f, "{name}")
    }
}

/// A single typed scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum DmapScalar {
    Char(u8),
    Short(i16),
    Int(i32),
    Float(f32),
    Str(String),
}

impl DmapScalar {
    /// Returns the wire type this value is stored as.
    pub fn wire_type(&self) -> WireType {
        match self {
            DmapScalar::Char(_) => WireType::Char,
            DmapScalar::Short(_) => WireType::Short,
            DmapScalar::Int(_) => WireType::Int,
            DmapScalar::Float(_) => WireType::Float,
            DmapScalar::Str(_) => WireType::String,
        }
    }

    /// Exact byte count of the value payload on the wire.
    pub fn encoded_len(&self) -> usize {
        match self {
            DmapScalar::Str(s) => s.len() + 1,
            other => other.wire_type().width().unwrap_or(0),
        }
    }
}

/// Flat element storage for an array, tagged by element type.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Char(Vec<u8>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Float(Vec<f32>),
}

impl ArrayData {
    /// Returns the element wire type.
    pub fn wire_type(&self) -> WireType {
        match self {
            ArrayData::Char(_) => WireType::Char,
            ArrayData::Short(_) => WireType::Short,
            ArrayData::Int(_) => WireType::Int,
            ArrayData::Float(_) => WireType::Float,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Char(v) => v.len(),
            ArrayData::Short(v) => v.len(),
            ArrayData::Int(v) => v.len(),
            ArrayData::Float(v) => v.len(),
        }
    }

    /// Returns `true` if the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An n-dimensional typed array.
///
/// `shape` lists dimensions from the slowest-varying (outermost) axis to
/// the fastest; `data` is the row-major flattening of that shape. On the
/// wire the dimension list is emitted in the opposite order (innermost
/// axis first) while the payload bytes stay row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct DmapArray {
    shape: Vec<usize>,
    data: ArrayData,
}

impl DmapArray {
    /// Builds an array from a shape and matching flat data.
    ///
    /// Fails with [`DmapError::ShapeMismatch`] when `data.len()` differs
    /// from the product of `shape`.
    pub fn new(shape: Vec<usize>, data: ArrayData) -> Result<Self, DmapError> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(DmapError::ShapeMismatch(format!(
                "{} elements do not fill shape {:?}",
                data.len(),
                shape
            )));
        }
        Ok(Self { shape, data })
    }

    /// Builds a uniformly filled array of the given shape.
    ///
    /// Fails with [`DmapError::TypeMismatch`] when `fill` is a text value;
    /// text arrays are not part of the format.
    pub fn filled(fill: &DmapScalar, shape: &[usize]) -> Result<Self, DmapError> {
        let n: usize = shape.iter().product();
        let data = match fill {
            DmapScalar::Char(v) => ArrayData::Char(vec![*v; n]),
            DmapScalar::Short(v) => ArrayData::Short(vec![*v; n]),
            DmapScalar::Int(v) => ArrayData::Int(vec![*v; n]),
            DmapScalar::Float(v) => ArrayData::Float(vec![*v; n]),
            DmapScalar::Str(_) => {
                return Err(DmapError::TypeMismatch(
                    "text values cannot fill an array field".into(),
                ))
            }
        };
        Ok(Self {
            shape: shape.to_vec(),
            data,
        })
    }

    /// Returns the element wire type.
    pub fn wire_type(&self) -> WireType {
        self.data.wire_type()
    }

    /// Dimensions, outermost axis first.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Flat row-major element storage.
    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Exact byte count of the value payload on the wire: dimension count,
    /// dimension list, and tightly packed elements.
    pub fn encoded_len(&self) -> usize {
        let width = self.wire_type().width().unwrap_or(0);
        4 + 4 * self.shape.len() + width * self.data.len()
    }
}

/// A decoded or stored field value: either a scalar or an array.
#[derive(Debug, Clone, PartialEq)]
pub enum DmapValue {
    Scalar(DmapScalar),
    Array(DmapArray),
}

impl DmapValue {
    /// Returns the wire type of the underlying value.
    pub fn wire_type(&self) -> WireType {
        match self {
            DmapValue::Scalar(s) => s.wire_type(),
            DmapValue::Array(a) => a.wire_type(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_codes_roundtrip() {
        for code in [1u8, 2, 3, 4, 8, 9, 10, 16, 17, 18, 19] {
            let ty = WireType::from_code(code).unwrap();
            assert_eq!(ty.code(), code);
        }
    }

    #[test]
    fn unknown_codes_rejected() {
        for code in [0u8, 5, 7, 11, 200, 255] {
            assert!(matches!(
                WireType::from_code(code),
                Err(DmapError::UnknownType(c)) if c == code
            ));
        }
    }

    #[test]
    fn array_shape_must_match_data() {
        let err = DmapArray::new(vec![2, 3], ArrayData::Short(vec![0; 5])).unwrap_err();
        assert!(matches!(err, DmapError::ShapeMismatch(_)));
        let ok = DmapArray::new(vec![2, 3], ArrayData::Short(vec![0; 6])).unwrap();
        assert_eq!(ok.len(), 6);
    }

    #[test]
    fn filled_rejects_text() {
        let err = DmapArray::filled(&DmapScalar::Str("x".into()), &[4]).unwrap_err();
        assert!(matches!(err, DmapError::TypeMismatch(_)));
    }

    #[test]
    fn scalar_encoded_len() {
        assert_eq!(DmapScalar::Char(0).encoded_len(), 1);
        assert_eq!(DmapScalar::Short(0).encoded_len(), 2);
        assert_eq!(DmapScalar::Int(0).encoded_len(), 4);
        assert_eq!(DmapScalar::Float(0.0).encoded_len(), 4);
        assert_eq!(DmapScalar::Str("".into()).encoded_len(), 1);
        assert_eq!(DmapScalar::Str("abc".into()).encoded_len(), 4);
    }

    #[test]
    fn array_encoded_len_counts_dims() {
        let a = DmapArray::filled(&DmapScalar::Short(0), &[4, 3, 2]).unwrap();
        assert_eq!(a.encoded_len(), 4 + 12 + 2 * 24);
    }
}
