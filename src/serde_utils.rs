//! Lenient deserializers for upstream JSON.
//!
//! GTFS-RT JSON exports follow the protobuf JSON mapping, which writes 64-bit
//! integers as strings, while hand-written exports use plain numbers. Both are
//! accepted here.

use serde::{Deserialize, Deserializer, de::Error};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Float(f64),
    Str(String),
}

/// deserialize a number or a numeric string as i64
/// null and empty strings become 0
pub fn de_lenient_i64<'de, D>(de: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(de)? {
        None => Ok(0),
        Some(NumberOrString::Int(i)) => Ok(i),
        Some(NumberOrString::Float(f)) => Ok(f as i64),
        Some(NumberOrString::Str(s)) => {
            let s = s.trim();
            if s.is_empty() {
                Ok(0)
            } else {
                s.parse()
                    .map_err(|_| D::Error::custom(format!("{s:?} is not an integer")))
            }
        }
    }
}

/// deserialize a string, or a number rendered as a string
/// enum fields arrive either by name or by ordinal depending on the exporter
pub fn de_lenient_string<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumberOrString>::deserialize(de)? {
        None => String::new(),
        Some(NumberOrString::Int(i)) => i.to_string(),
        Some(NumberOrString::Float(f)) => f.to_string(),
        Some(NumberOrString::Str(s)) => s,
    })
}

/// deserialize null as the type's default value
/// absent fields are covered by `#[serde(default)]`, explicit nulls are not
pub fn de_null_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(de).map(Option::unwrap_or_default)
}
