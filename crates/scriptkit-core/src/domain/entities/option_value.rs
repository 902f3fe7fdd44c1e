use serde::ser::{Serialize, SerializeMap, Serializer};

/// Value observed for one option after parsing.
///
/// Which variant appears is decided by the option's spec:
///
/// | takes value | repeatable | variant     |
/// |-------------|------------|-------------|
/// | yes         | no         | `Scalar`    |
/// | yes         | yes        | `Sequence`  |
/// | no          | yes        | `Counter`   |
/// | no          | no         | `Counter(1)`|
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OptionValue {
    #[default]
    Absent,
    Scalar(String),
    Sequence(Vec<String>),
    Counter(u32),
}

impl OptionValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> &[String] {
        match self {
            Self::Sequence(v) => v,
            _ => &[],
        }
    }

    pub fn count(&self) -> u32 {
        match self {
            Self::Counter(n) => *n,
            _ => 0,
        }
    }
}

impl Serialize for OptionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Absent => serializer.serialize_none(),
            Self::Scalar(s) => serializer.serialize_str(s),
            Self::Sequence(v) => v.serialize(serializer),
            Self::Counter(n) => serializer.serialize_u32(*n),
        }
    }
}

static ABSENT: OptionValue = OptionValue::Absent;

/// Parsed option map, keyed by canonical option name, in declaration order.
///
/// Only options that were observed (or defaulted) have entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionValues {
    entries: Vec<(String, OptionValue)>,
}

impl OptionValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value for `name`, keeping first-insertion order.
    pub fn insert(&mut self, name: impl Into<String>, value: OptionValue) {
        let name = name.into();
        if value.is_absent() {
            self.entries.retain(|(n, _)| *n != name);
            return;
        }
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> &OptionValue {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .unwrap_or(&ABSENT)
    }

    pub fn scalar(&self, name: &str) -> Option<&str> {
        self.get(name).as_scalar()
    }

    pub fn sequence(&self, name: &str) -> &[String] {
        self.get(name).as_sequence()
    }

    pub fn count(&self, name: &str) -> u32 {
        self.get(name).count()
    }

    /// `true` if the option was given at least once (or has a default).
    pub fn is_set(&self, name: &str) -> bool {
        !self.get(name).is_absent()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for OptionValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<K: Into<String>> FromIterator<(K, OptionValue)> for OptionValues {
    fn from_iter<I: IntoIterator<Item = (K, OptionValue)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (k, v) in iter {
            values.insert(k, v);
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_names_read_as_absent() {
        let values = OptionValues::new();
        assert!(values.get("file").is_absent());
        assert_eq!(values.count("x"), 0);
        assert!(values.sequence("i").is_empty());
    }

    #[test]
    fn insert_keeps_first_position() {
        let mut values = OptionValues::new();
        values.insert("file", OptionValue::Scalar("a".into()));
        values.insert("x", OptionValue::Counter(1));
        values.insert("file", OptionValue::Scalar("b".into()));

        let names: Vec<_> = values.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["file", "x"]);
        assert_eq!(values.scalar("file"), Some("b"));
    }

    #[test]
    fn serializes_as_plain_json_map() {
        let values: OptionValues = [
            ("file", OptionValue::Scalar("out.txt".into())),
            (
                "i",
                OptionValue::Sequence(vec!["one.csv".into(), "two.csv".into()]),
            ),
            ("x", OptionValue::Counter(3)),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(
            json,
            r#"{"file":"out.txt","i":["one.csv","two.csv"],"x":3}"#
        );
    }
}
