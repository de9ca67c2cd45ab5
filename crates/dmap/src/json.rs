//! Projection of decoded records into plain JSON trees.
//!
//! Projection erases wire type tags: every scalar becomes a JSON
//! primitive and every vector a nested JSON array matching its shape.
//! Nothing else is lost, so a projected record is suitable for display or
//! transport to consumers that never see the wire format.

use serde_json::{Map, Number, Value};

use crate::decoder::DecodedRecord;
use crate::value::{ArrayData, DmapArray, DmapScalar};

/// Projects a decoded record into a single JSON object keyed by field
/// name, scalars first, in wire order.
///
/// Non-finite floats have no JSON representation and project to `null`.
pub fn project(record: &DecodedRecord) -> Value {
    let mut map = Map::new();
    for (name, value) in &record.scalars {
        map.insert(name.clone(), scalar_value(value));
    }
    for (name, value) in &record.vectors {
        map.insert(name.clone(), array_value(value));
    }
    Value::Object(map)
}

fn scalar_value(value: &DmapScalar) -> Value {
    match value {
        DmapScalar::Char(v) => Value::Number((*v).into()),
        DmapScalar::Short(v) => Value::Number((*v).into()),
        DmapScalar::Int(v) => Value::Number((*v).into()),
        DmapScalar::Float(v) => float_value(*v),
        DmapScalar::Str(s) => Value::String(s.clone()),
    }
}

fn float_value(v: f32) -> Value {
    Number::from_f64(f64::from(v)).map_or(Value::Null, Value::Number)
}

fn array_value(array: &DmapArray) -> Value {
    let flat: Vec<Value> = match array.data() {
        ArrayData::Char(v) => v.iter().map(|e| Value::Number((*e).into())).collect(),
        ArrayData::Short(v) => v.iter().map(|e| Value::Number((*e).into())).collect(),
        ArrayData::Int(v) => v.iter().map(|e| Value::Number((*e).into())).collect(),
        ArrayData::Float(v) => v.iter().map(|e| float_value(*e)).collect(),
    };
    nest(array.shape(), flat)
}

/// Folds a flat element list into nested arrays, innermost axis first.
fn nest(shape: &[usize], flat: Vec<Value>) -> Value {
    let mut values = flat;
    for &dim in shape.iter().skip(1).rev() {
        if dim == 0 {
            values = Vec::new();
            break;
        }
        values = values
            .chunks(dim)
            .map(|chunk| Value::Array(chunk.to_vec()))
            .collect();
    }
    Value::Array(values)
}
