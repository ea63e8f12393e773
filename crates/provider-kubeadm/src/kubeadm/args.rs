//! Extra-args containers for both kubeadm API generations.
//!
//! Decoding is lenient: either generation accepts a map or a list, and
//! scalar values (`event-qps: 0`) are coerced to strings. Encoding always
//! uses the generation's own shape.

use std::collections::BTreeMap;
use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Read access to extra-args, independent of their wire shape.
pub trait ExtraArgs:
    Debug + Clone + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync
{
    /// Value of `name`; the last occurrence wins.
    fn get(&self, name: &str) -> Option<&str>;

    /// Flatten into a map; later duplicates override earlier ones.
    fn to_map(&self) -> BTreeMap<String, String>;

    /// Whether no args are set.
    fn is_empty(&self) -> bool;
}

/// One `{name, value}` record of a v1beta4 arg list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arg {
    pub name: String,
    pub value: String,
}

impl Arg {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// v1beta3 extra-args: `flag: value`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ArgMap(pub BTreeMap<String, String>);

/// v1beta4 extra-args: `- name: flag\n  value: value`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ArgList(pub Vec<Arg>);

impl ExtraArgs for ArgMap {
    fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    fn to_map(&self) -> BTreeMap<String, String> {
        self.0.clone()
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl ExtraArgs for ArgList {
    fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|arg| arg.name == name)
            .map(|arg| arg.value.as_str())
    }

    fn to_map(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|arg| (arg.name.clone(), arg.value.clone()))
            .collect()
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn scalar_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

#[derive(Deserialize)]
struct RawArg {
    name: String,
    #[serde(default)]
    value: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawArgs {
    Map(BTreeMap<String, serde_json::Value>),
    List(Vec<RawArg>),
}

impl RawArgs {
    fn into_pairs(self) -> Vec<(String, String)> {
        match self {
            Self::Map(map) => map
                .into_iter()
                .map(|(k, v)| (k, scalar_to_string(v)))
                .collect(),
            Self::List(list) => list
                .into_iter()
                .map(|arg| (arg.name, scalar_to_string(arg.value)))
                .collect(),
        }
    }
}

impl<'de> Deserialize<'de> for ArgMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<RawArgs>::deserialize(deserializer)?;
        Ok(Self(
            raw.map(RawArgs::into_pairs)
                .unwrap_or_default()
                .into_iter()
                .collect(),
        ))
    }
}

impl<'de> Deserialize<'de> for ArgList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<RawArgs>::deserialize(deserializer)?;
        Ok(Self(
            raw.map(RawArgs::into_pairs)
                .unwrap_or_default()
                .into_iter()
                .map(|(name, value)| Arg { name, value })
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_map_accepts_scalars() {
        let args: ArgMap =
            serde_json::from_value(json!({"node-ip": "10.0.0.1", "event-qps": 0})).unwrap();
        assert_eq!(args.get("node-ip"), Some("10.0.0.1"));
        assert_eq!(args.get("event-qps"), Some("0"));
    }

    #[test]
    fn test_list_last_occurrence_wins() {
        let args: ArgList = serde_json::from_value(json!([
            {"name": "v", "value": "2"},
            {"name": "node-ip", "value": "10.0.0.2"},
            {"name": "v", "value": "4"},
        ]))
        .unwrap();
        assert_eq!(args.get("v"), Some("4"));
        assert_eq!(args.to_map()["v"], "4");
        assert_eq!(args.0.len(), 3);
    }

    #[test]
    fn test_shapes_are_interchangeable_on_input() {
        let list: ArgList = serde_json::from_value(json!({"node-ip": "10.0.0.1"})).unwrap();
        assert_eq!(list.0, vec![Arg::new("node-ip", "10.0.0.1")]);

        let map: ArgMap =
            serde_json::from_value(json!([{"name": "node-ip", "value": "10.0.0.1"}])).unwrap();
        assert_eq!(map.get("node-ip"), Some("10.0.0.1"));
    }

    #[test]
    fn test_output_shape_follows_generation() {
        let list = ArgList(vec![Arg::new("node-ip", "10.0.0.1")]);
        assert_eq!(
            serde_json::to_value(&list).unwrap(),
            json!([{"name": "node-ip", "value": "10.0.0.1"}])
        );

        let map: ArgMap = serde_json::from_value(json!({"node-ip": "10.0.0.1"})).unwrap();
        assert_eq!(
            serde_json::to_value(&map).unwrap(),
            json!({"node-ip": "10.0.0.1"})
        );
    }

    #[test]
    fn test_null_is_empty() {
        let map: ArgMap = serde_json::from_value(json!(null)).unwrap();
        assert!(map.is_empty());
    }
}
