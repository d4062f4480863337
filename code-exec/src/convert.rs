use rhai::Dynamic;
use serde_json::{Map, Number, Value};

use crate::{error::Error, record::Record};

/// Converts a JSON object into a `Record`, nested objects included, keeping key order.
pub(crate) fn object_to_record(object: &Map<String, Value>) -> Result<Record, Error> {
    let mut record = Record::new();
    for (key, value) in object {
        record.insert(key.as_str(), json_to_dynamic(value, key)?);
    }
    Ok(record)
}

fn json_to_dynamic(value: &Value, key: &str) -> Result<Dynamic, Error> {
    Ok(match value {
        Value::Null => Dynamic::UNIT,
        Value::Bool(b) => Dynamic::from_bool(*b),
        Value::Number(n) => number_to_dynamic(n, key)?,
        Value::String(s) => Dynamic::from(s.clone()),
        Value::Array(items) => Dynamic::from_array(
            items
                .iter()
                .map(|item| json_to_dynamic(item, key))
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(object) => Dynamic::from(object_to_record(object)?),
    })
}

// Script integers are i64; anything wider is refused rather than rounded.
fn number_to_dynamic(n: &Number, key: &str) -> Result<Dynamic, Error> {
    if let Some(int) = n.as_i64() {
        return Ok(Dynamic::from_int(int));
    }
    match n.as_f64() {
        Some(float) if n.is_f64() => Ok(Dynamic::from_float(float)),
        _ => Err(Error::InvalidInputs(format!(
            "`{}`: {} does not fit in a 64-bit signed integer",
            key, n
        ))),
    }
}

/// Converts a script value back to JSON.
///
/// Records keep insertion order; `#{...}` maps come out in key order.
pub(crate) fn dynamic_to_json(value: &Dynamic) -> Result<Value, Error> {
    if let Some(record) = value.read_lock::<Record>() {
        let mut object = Map::with_capacity(record.len());
        for (key, item) in record.iter() {
            object.insert(key.to_string(), dynamic_to_json(item)?);
        }
        return Ok(Value::Object(object));
    }
    if let Ok(items) = value.as_array_ref() {
        return items
            .iter()
            .map(dynamic_to_json)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array);
    }
    if let Ok(map) = value.as_map_ref() {
        let mut object = Map::with_capacity(map.len());
        for (key, item) in map.iter() {
            object.insert(key.to_string(), dynamic_to_json(item)?);
        }
        return Ok(Value::Object(object));
    }

    rhai::serde::from_dynamic::<Value>(value).map_err(|e| Error::Conversion(e.to_string()))
}
