//! Typed key/value preferences and their line-based file format.
//!
//! Every line of a preference file holds one entry written as
//! `KEY:TYPE=VALUE`. Keys match `[A-Za-z_][A-Za-z0-9_]*`, the type tag is one
//! of `STRING`, `BOOL`, `INT`, `UINT`, `FLOAT` or `DOUBLE`, booleans are
//! written as `0` or `1`, and everything after the first `=` is the value,
//! whitespace included. Comments and blank lines are rejected.

use std::{fmt, fs, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, FromPropertyValue, PropertyValue, Result};

/// Type tag of a preference entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrefType {
    /// Text, written verbatim.
    String,
    /// Boolean, written as `0` or `1`.
    Bool,
    /// Signed integer.
    Int,
    /// Unsigned integer.
    UInt,
    /// Single precision float.
    Float,
    /// Double precision float.
    Double,
}

impl PrefType {
    /// Tag used in the file format.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            PrefType::String => "STRING",
            PrefType::Bool => "BOOL",
            PrefType::Int => "INT",
            PrefType::UInt => "UINT",
            PrefType::Float => "FLOAT",
            PrefType::Double => "DOUBLE",
        }
    }

    fn of(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Str(_) => Some(PrefType::String),
            PropertyValue::Bool(_) => Some(PrefType::Bool),
            PropertyValue::Int(_) => Some(PrefType::Int),
            PropertyValue::UInt(_) => Some(PrefType::UInt),
            PropertyValue::Float(_) => Some(PrefType::Float),
            PropertyValue::Double(_) => Some(PrefType::Double),
            _ => None,
        }
    }

    fn parse_value(self, text: &str) -> std::result::Result<PropertyValue, String> {
        fn number<T: FromStr>(text: &str, tag: &str) -> std::result::Result<T, String> {
            text.parse()
                .map_err(|_| format!("'{text}' is not a valid {tag} value"))
        }

        match self {
            PrefType::String => Ok(PropertyValue::Str(text.to_owned())),
            PrefType::Bool => match text {
                "0" => Ok(PropertyValue::Bool(false)),
                "1" => Ok(PropertyValue::Bool(true)),
                other => Err(format!("'{other}' is not a valid BOOL value, expected 0 or 1")),
            },
            PrefType::Int => number(text, self.tag()).map(PropertyValue::Int),
            PrefType::UInt => number(text, self.tag()).map(PropertyValue::UInt),
            PrefType::Float => match number::<f32>(text, self.tag())? {
                value if value.is_finite() => Ok(PropertyValue::Float(value)),
                _ => Err(format!("'{text}' is not a finite FLOAT value")),
            },
            PrefType::Double => match number::<f64>(text, self.tag())? {
                value if value.is_finite() => Ok(PropertyValue::Double(value)),
                _ => Err(format!("'{text}' is not a finite DOUBLE value")),
            },
        }
    }
}

impl fmt::Display for PrefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for PrefType {
    type Err = String;

    fn from_str(tag: &str) -> std::result::Result<Self, Self::Err> {
        match tag {
            "STRING" => Ok(PrefType::String),
            "BOOL" => Ok(PrefType::Bool),
            "INT" => Ok(PrefType::Int),
            "UINT" => Ok(PrefType::UInt),
            "FLOAT" => Ok(PrefType::Float),
            "DOUBLE" => Ok(PrefType::Double),
            other => Err(format!("unknown type tag '{other}'")),
        }
    }
}

/// Single typed preference entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Preference {
    key: String,
    pref_type: PrefType,
    value: PropertyValue,
}

impl Preference {
    /// Key of the entry.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Declared type of the entry.
    #[must_use]
    pub fn pref_type(&self) -> PrefType {
        self.pref_type
    }

    /// Stored value.
    #[must_use]
    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    fn to_line(&self) -> String {
        let value = match &self.value {
            PropertyValue::Bool(flag) => u8::from(*flag).to_string(),
            PropertyValue::Int(number) => number.to_string(),
            PropertyValue::UInt(number) => number.to_string(),
            PropertyValue::Float(number) => number.to_string(),
            PropertyValue::Double(number) => number.to_string(),
            PropertyValue::Str(text) => text.clone(),
            other => format!("{other:?}"),
        };
        format!("{}:{}={}", self.key, self.pref_type, value)
    }
}

/// Ordered collection of typed preferences.
///
/// Entries keep the order in which they were first added, which is also the
/// order in which they are saved.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PrefContainer {
    entries: Vec<Preference>,
}

impl PrefContainer {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new entry. Returns `false` when the key is already present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for malformed keys, values of a type
    /// the file format cannot express, strings containing line breaks and
    /// NaN or infinite numbers.
    pub fn add(&mut self, key: &str, value: impl Into<PropertyValue>) -> Result<bool> {
        if self.has(key) {
            return Ok(false);
        }
        let value = value.into();
        let pref_type = validate(key, &value)?;
        self.entries.push(Preference {
            key: key.to_owned(),
            pref_type,
            value,
        });
        Ok(true)
    }

    /// Stores `value` under `key`, adding the entry when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when the value cannot be stored or
    /// its type differs from the type of the existing entry.
    pub fn set_value(&mut self, key: &str, value: impl Into<PropertyValue>) -> Result<()> {
        let value = value.into();
        let pref_type = validate(key, &value)?;
        match self.entries.iter_mut().find(|entry| entry.key == key) {
            Some(entry) if entry.pref_type != pref_type => Err(Error::invalid_argument(format!(
                "preference '{key}' is a {} entry, not {pref_type}",
                entry.pref_type
            ))),
            Some(entry) => {
                entry.value = value;
                Ok(())
            }
            None => {
                self.entries.push(Preference {
                    key: key.to_owned(),
                    pref_type,
                    value,
                });
                Ok(())
            }
        }
    }

    /// Value stored under `key`, converted to `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when the key is missing or holds a
    /// value of a different type.
    pub fn value<T: FromPropertyValue>(&self, key: &str) -> Result<T> {
        let entry = self
            .get(key)
            .ok_or_else(|| Error::invalid_argument(format!("no preference named '{key}'")))?;
        T::from_property_value(&entry.value).ok_or_else(|| {
            Error::invalid_argument(format!(
                "preference '{key}' is a {} entry, not {}",
                entry.pref_type,
                T::TYPE_NAME
            ))
        })
    }

    /// Entry stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Preference> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    /// Reports whether `key` is present.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Removes the entry stored under `key`.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.key != key);
        before != self.entries.len()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Preference> {
        self.entries.iter()
    }

    /// Parses a preference document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParse`] naming the first malformed line.
    pub fn parse(text: &str) -> Result<Self> {
        let mut container = Self::new();
        for (number, line) in text.lines().enumerate() {
            let line_number = number + 1;
            let invalid = |reason: String| Error::InvalidParse {
                line: line_number,
                reason,
            };

            let (key, rest) = line
                .split_once(':')
                .ok_or_else(|| invalid("missing ':' after the key".to_owned()))?;
            if !is_valid_key(key) {
                return Err(invalid(format!("'{key}' is not a valid key")));
            }
            let (tag, raw_value) = rest
                .split_once('=')
                .ok_or_else(|| invalid("missing '=' after the type".to_owned()))?;
            let pref_type: PrefType = tag.parse().map_err(invalid)?;
            let value = pref_type.parse_value(raw_value).map_err(invalid)?;

            if container.has(key) {
                log::warn!("preference '{key}' defined twice, keeping line {line_number}");
            }
            container.upsert(key, pref_type, value);
        }
        Ok(container)
    }

    /// Loads entries from `path`, replacing entries with the same key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileNotFound`] when the file cannot be read and
    /// [`Error::InvalidParse`] when its content is malformed. The container is
    /// left untouched on error.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|error| Error::FileNotFound {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })?;
        let loaded = Self::parse(&text)?;
        log::debug!("loaded {} preferences from {}", loaded.count(), path.display());
        for entry in loaded.entries {
            self.upsert(&entry.key, entry.pref_type, entry.value);
        }
        Ok(())
    }

    /// Writes every entry to `path`, one per line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileNotFound`] when the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_pref_string()).map_err(|error| Error::FileNotFound {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })
    }

    /// Serialises the container in the preference file format.
    #[must_use]
    pub fn to_pref_string(&self) -> String {
        let mut text = String::new();
        for entry in &self.entries {
            text.push_str(&entry.to_line());
            text.push('\n');
        }
        text
    }

    fn upsert(&mut self, key: &str, pref_type: PrefType, value: PropertyValue) {
        match self.entries.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => {
                entry.pref_type = pref_type;
                entry.value = value;
            }
            None => self.entries.push(Preference {
                key: key.to_owned(),
                pref_type,
                value,
            }),
        }
    }
}

fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn validate(key: &str, value: &PropertyValue) -> Result<PrefType> {
    if !is_valid_key(key) {
        return Err(Error::invalid_argument(format!(
            "'{key}' is not a valid preference key"
        )));
    }
    if let PropertyValue::Str(text) = value {
        if text.contains(['\n', '\r']) {
            return Err(Error::invalid_argument(format!(
                "preference '{key}' cannot hold a line break"
            )));
        }
    }
    let finite = match value {
        PropertyValue::Float(number) => number.is_finite(),
        PropertyValue::Double(number) => number.is_finite(),
        _ => true,
    };
    if !finite {
        return Err(Error::invalid_argument(format!(
            "preference '{key}' must be a finite number"
        )));
    }
    PrefType::of(value).ok_or_else(|| {
        Error::invalid_argument(format!(
            "preference '{key}' cannot store a {} value",
            value.type_name()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_type_tag() {
        let text = "TITLE:STRING=Hello, world = yes\nFULL:BOOL=1\nW:INT=-600\nU:UINT=7\nF:FLOAT=0.5\nD:DOUBLE=2.25\n";
        let prefs = PrefContainer::parse(text).expect("valid document");

        assert_eq!(prefs.count(), 6);
        assert_eq!(
            prefs.value::<String>("TITLE"),
            Ok("Hello, world = yes".to_owned())
        );
        assert_eq!(prefs.value::<bool>("FULL"), Ok(true));
        assert_eq!(prefs.value::<i64>("W"), Ok(-600));
        assert_eq!(prefs.value::<u64>("U"), Ok(7));
        assert_eq!(prefs.value::<f32>("F"), Ok(0.5));
        assert_eq!(prefs.value::<f64>("D"), Ok(2.25));
    }

    #[test]
    fn string_values_keep_surrounding_whitespace() {
        let prefs = PrefContainer::parse("NAME:STRING=  padded  ").expect("valid document");
        assert_eq!(prefs.value::<String>("NAME"), Ok("  padded  ".to_owned()));
    }

    #[test]
    fn malformed_lines_report_their_number() {
        let cases = [
            ("OK:INT=1\nbroken", 2),
            ("9KEY:INT=1", 1),
            ("KEY:COLOUR=red", 1),
            ("KEY:BOOL=true", 1),
            ("KEY:UINT=-1", 1),
            ("A:INT=1\n\nB:INT=2", 2),
            ("KEY:INT", 1),
            ("KEY:FLOAT=NaN", 1),
            ("A:INT=1\nKEY:DOUBLE=inf", 2),
        ];
        for (text, expected) in cases {
            match PrefContainer::parse(text) {
                Err(Error::InvalidParse { line, .. }) => assert_eq!(line, expected, "{text:?}"),
                other => panic!("expected a parse error for {text:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn set_value_keeps_the_declared_type() {
        let mut prefs = PrefContainer::new();
        assert_eq!(prefs.add("WIDTH", 600), Ok(true));
        assert_eq!(prefs.add("WIDTH", 800), Ok(false));
        assert!(prefs.set_value("WIDTH", 800).is_ok());
        assert!(matches!(
            prefs.set_value("WIDTH", "wide"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            prefs.set_value("TEXT", "two\nlines"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            prefs.add("bad key", 1),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(prefs.value::<i64>("WIDTH"), Ok(800));
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        let mut prefs = PrefContainer::new();
        prefs.set_value("SCALE", 1.5_f32).expect("float");

        for value in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            assert!(matches!(
                prefs.set_value("SCALE", value),
                Err(Error::InvalidArgument(_))
            ));
        }
        assert!(matches!(
            prefs.add("RATIO", f64::NAN),
            Err(Error::InvalidArgument(_))
        ));
        assert!(!prefs.has("RATIO"));

        let parsed = PrefContainer::parse(&prefs.to_pref_string()).expect("round trip");
        assert_eq!(parsed, prefs);
        assert_eq!(parsed.value::<f32>("SCALE"), Ok(1.5));
    }

    #[test]
    fn clear_empties_the_container() {
        let mut prefs = PrefContainer::parse("A:BOOL=0\nB:BOOL=1").expect("valid document");
        assert!(prefs.remove("A"));
        assert_eq!(prefs.count(), 1);
        prefs.clear();
        assert_eq!(prefs.count(), 0);
    }

    #[test]
    fn saved_text_parses_back_to_the_same_container() {
        let mut prefs = PrefContainer::new();
        prefs.set_value("TITLE", "Maze: the return").expect("string");
        prefs.set_value("V_SYNC", false).expect("bool");
        prefs.set_value("SCORE", -42_i64).expect("int");
        prefs.set_value("SEED", 9_u64).expect("uint");
        prefs.set_value("SCALE", 0.1_f32).expect("float");
        prefs.set_value("RATIO", 1.0_f64 / 3.0).expect("double");

        let parsed = PrefContainer::parse(&prefs.to_pref_string()).expect("round trip");
        assert_eq!(parsed, prefs);
    }
}
