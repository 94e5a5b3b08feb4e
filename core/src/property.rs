//! Named, typed values and containers of them.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{Colour, Direction, Error, Index, Result};

/// Value stored in a [`Property`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Single precision float.
    Float(f32),
    /// Double precision float.
    Double(f64),
    /// Text.
    Str(String),
    /// Two-dimensional vector.
    Vec2(Vec2),
    /// Grid index.
    Index(Index),
    /// Compass direction.
    Direction(Direction),
    /// Colour.
    Colour(Colour),
}

impl PropertyValue {
    /// Human-readable name of the stored type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Int(_) => "int",
            PropertyValue::UInt(_) => "uint",
            PropertyValue::Float(_) => "float",
            PropertyValue::Double(_) => "double",
            PropertyValue::Str(_) => "string",
            PropertyValue::Vec2(_) => "vec2",
            PropertyValue::Index(_) => "index",
            PropertyValue::Direction(_) => "direction",
            PropertyValue::Colour(_) => "colour",
        }
    }
}

/// Conversion from a stored [`PropertyValue`] back into a concrete type.
pub trait FromPropertyValue: Sized {
    /// Name of the type, used in mismatch errors.
    const TYPE_NAME: &'static str;

    /// Extracts the value if the variant matches.
    fn from_property_value(value: &PropertyValue) -> Option<Self>;
}

macro_rules! property_value_conversions {
    ($($ty:ty => $variant:ident, $name:literal;)*) => {
        $(
            impl From<$ty> for PropertyValue {
                fn from(value: $ty) -> Self {
                    PropertyValue::$variant(value)
                }
            }

            impl FromPropertyValue for $ty {
                const TYPE_NAME: &'static str = $name;

                fn from_property_value(value: &PropertyValue) -> Option<Self> {
                    match value {
                        PropertyValue::$variant(inner) => Some(inner.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

property_value_conversions! {
    bool => Bool, "bool";
    i64 => Int, "int";
    u64 => UInt, "uint";
    f32 => Float, "float";
    f64 => Double, "double";
    String => Str, "string";
    Vec2 => Vec2, "vec2";
    Index => Index, "index";
    Direction => Direction, "direction";
    Colour => Colour, "colour";
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Str(value.to_owned())
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Int(i64::from(value))
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        PropertyValue::UInt(u64::from(value))
    }
}

/// Named value, optionally empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Property {
    name: String,
    value: Option<PropertyValue>,
}

impl Property {
    /// Creates a property without a value.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// Creates a property holding `value`.
    #[must_use]
    pub fn with_value(name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Name of the property.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reports whether a value is stored.
    #[must_use]
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// Replaces the stored value.
    pub fn set_value(&mut self, value: impl Into<PropertyValue>) {
        self.value = Some(value.into());
    }

    /// Stored value without conversion.
    #[must_use]
    pub fn raw_value(&self) -> Option<&PropertyValue> {
        self.value.as_ref()
    }

    /// Stored value converted to `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when the property is empty or holds
    /// a value of a different type.
    pub fn value<T: FromPropertyValue>(&self) -> Result<T> {
        let value = self.value.as_ref().ok_or_else(|| {
            Error::invalid_argument(format!("property '{}' has no value", self.name))
        })?;

        T::from_property_value(value).ok_or_else(|| {
            Error::invalid_argument(format!(
                "property '{}' holds a {} value, not a {}",
                self.name,
                value.type_name(),
                T::TYPE_NAME
            ))
        })
    }
}

/// Collection of properties addressed by name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyContainer {
    properties: BTreeMap<String, Property>,
}

impl PropertyContainer {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `property` unless one with the same name already exists.
    ///
    /// Returns `false` when the name is taken; the stored property is left
    /// untouched.
    pub fn add(&mut self, property: Property) -> bool {
        if self.properties.contains_key(property.name()) {
            return false;
        }
        let _ = self.properties.insert(property.name().to_owned(), property);
        true
    }

    /// Stores `value` under `name`, creating the property when needed.
    pub fn set_value(&mut self, name: &str, value: impl Into<PropertyValue>) {
        self.properties
            .entry(name.to_owned())
            .or_insert_with(|| Property::new(name))
            .set_value(value);
    }

    /// Value stored under `name`, converted to `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when no such property exists, it is
    /// empty, or it holds a value of a different type.
    pub fn value<T: FromPropertyValue>(&self, name: &str) -> Result<T> {
        self.properties
            .get(name)
            .ok_or_else(|| Error::invalid_argument(format!("no property named '{name}'")))?
            .value()
    }

    /// Property stored under `name`.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// Reports whether a property named `name` exists.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Removes the property named `name`.
    pub fn remove(&mut self, name: &str) -> bool {
        self.properties.remove(name).is_some()
    }

    /// Removes every property.
    pub fn clear(&mut self) {
        self.properties.clear();
    }

    /// Number of stored properties.
    #[must_use]
    pub fn count(&self) -> usize {
        self.properties.len()
    }

    /// Visits every property in name order.
    pub fn for_each<F: FnMut(&Property)>(&self, mut visit: F) {
        for property in self.properties.values() {
            visit(property);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_access_rejects_mismatches() {
        let property = Property::with_value("speed", 2.5_f32);
        assert_eq!(property.value::<f32>(), Ok(2.5));
        assert!(matches!(
            property.value::<bool>(),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            Property::new("empty").value::<i64>(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn container_add_is_not_an_overwrite() {
        let mut container = PropertyContainer::new();
        assert!(container.add(Property::with_value("lives", 3)));
        assert!(!container.add(Property::with_value("lives", 5)));
        assert_eq!(container.value::<i64>("lives"), Ok(3));

        container.set_value("lives", 4);
        assert_eq!(container.value::<i64>("lives"), Ok(4));
    }

    #[test]
    fn clear_leaves_an_empty_container() {
        let mut container = PropertyContainer::new();
        container.set_value("a", true);
        container.set_value("b", "text");
        assert_eq!(container.count(), 2);
        assert!(container.remove("a"));
        assert!(!container.has("a"));

        container.clear();
        assert_eq!(container.count(), 0);
    }
}
