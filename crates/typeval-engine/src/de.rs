//! # Instance Deserializer
//!
//! Lets any `T: DeserializeOwned` whose shape mirrors a validated record be
//! built straight from an [`Instance`]. Records and dicts present as maps,
//! lists and sets as sequences, `None` as unit (or `None` for `Option`).

use serde::de::value::{Error as DeError, MapDeserializer, SeqDeserializer};
use serde::de::{self, DeserializeOwned, Error as _, IntoDeserializer, Unexpected, Visitor};
use serde::forward_to_deserialize_any;

use crate::instance::Instance;

/// Build `T` from a validated instance.
pub fn from_instance<T: DeserializeOwned>(instance: Instance) -> Result<T, DeError> {
    T::deserialize(instance)
}

impl<'de> de::Deserializer<'de> for Instance {
    type Error = DeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        match self {
            Instance::None => visitor.visit_unit(),
            Instance::Bool(b) => visitor.visit_bool(b),
            Instance::Int(i) => visitor.visit_i64(i),
            Instance::Float(f) => visitor.visit_f64(f),
            Instance::Str(s) => visitor.visit_string(s),
            Instance::List(items) | Instance::Set(items) => {
                let mut seq: SeqDeserializer<_, DeError> = SeqDeserializer::new(items.into_iter());
                let value = visitor.visit_seq(&mut seq)?;
                seq.end()?;
                Ok(value)
            }
            Instance::Dict(pairs) => {
                let mut map: MapDeserializer<'de, _, DeError> =
                    MapDeserializer::new(pairs.into_iter());
                let value = visitor.visit_map(&mut map)?;
                map.end()?;
                Ok(value)
            }
            Instance::Record { fields, .. } => {
                let entries = fields.into_iter().map(|(k, v)| (Instance::Str(k), v));
                let mut map: MapDeserializer<'de, _, DeError> = MapDeserializer::new(entries);
                let value = visitor.visit_map(&mut map)?;
                map.end()?;
                Ok(value)
            }
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        match self {
            Instance::None => visitor.visit_none(),
            other => visitor.visit_some(other),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DeError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DeError> {
        match self {
            Instance::Str(variant) => visitor.visit_enum(variant.into_deserializer()),
            other => Err(DeError::invalid_type(
                Unexpected::Other(other.kind()),
                &"a unit variant name",
            )),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

impl<'de> IntoDeserializer<'de, DeError> for Instance {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde::Deserialize;
    use std::collections::{BTreeMap, BTreeSet};
    use typeval_core::RecordId;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Leaf {
        label: String,
        weight: Option<f64>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "lowercase")]
    enum Color {
        Red,
        Green,
    }

    fn record(name: &str, fields: Vec<(&str, Instance)>) -> Instance {
        Instance::Record {
            class_type: RecordId::new(name),
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect::<IndexMap<_, _>>(),
        }
    }

    #[test]
    fn test_record_into_struct() {
        let inst = record(
            "Leaf",
            vec![("label", Instance::Str("a".into())), ("weight", Instance::None)],
        );
        let leaf: Leaf = from_instance(inst).unwrap();
        assert_eq!(
            leaf,
            Leaf {
                label: "a".into(),
                weight: None
            }
        );
    }

    #[test]
    fn test_set_and_dict_into_collections() {
        let set: BTreeSet<i64> =
            from_instance(Instance::Set(vec![Instance::Int(2), Instance::Int(1)])).unwrap();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), [1, 2]);

        let dict: BTreeMap<i64, String> = from_instance(Instance::Dict(vec![(
            Instance::Int(1),
            Instance::Str("foo".into()),
        )]))
        .unwrap();
        assert_eq!(dict[&1], "foo");
    }

    #[test]
    fn test_unit_enum_from_string() {
        let color: Color = from_instance(Instance::Str("green".into())).unwrap();
        assert_eq!(color, Color::Green);
        let color: Color = from_instance(Instance::Str("red".into())).unwrap();
        assert_eq!(color, Color::Red);
        assert!(from_instance::<Color>(Instance::Int(1)).is_err());
    }

    #[test]
    fn test_shape_mismatch_is_an_error() {
        let inst = record("Leaf", vec![("label", Instance::Int(3))]);
        assert!(from_instance::<Leaf>(inst).is_err());
    }
}
