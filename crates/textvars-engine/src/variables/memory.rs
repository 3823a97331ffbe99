use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{CollectionId, VariableId, VariableStore};
use crate::host::{ElementId, HostError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariableType {
    String,
    Float,
    Boolean,
    Color,
}

/// A variable with one value per mode, keyed by mode name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryVariable {
    #[serde(rename = "type")]
    pub kind: VariableType,
    #[serde(default)]
    pub values_by_mode: BTreeMap<String, String>,
}

impl MemoryVariable {
    /// A variable whose only value lives in the default mode.
    pub fn new(kind: VariableType, default_value: &str) -> Self {
        Self {
            kind,
            values_by_mode: BTreeMap::from([(String::new(), default_value.to_string())]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryCollection {
    pub name: String,
    pub modes: Vec<String>,
    pub default_mode: String,
    #[serde(default)]
    pub variables: BTreeMap<String, MemoryVariable>,
}

/// In-memory variable store with per-consumer mode selection.
///
/// Collection handles are `collection:<index>`; variable handles are
/// `collection:<index>/<variable name>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryVariableStore {
    #[serde(default)]
    pub collections: Vec<MemoryCollection>,
    /// consumer -> collection name -> mode name
    #[serde(default)]
    pub consumer_modes: BTreeMap<ElementId, BTreeMap<String, String>>,
}

const COLLECTION_PREFIX: &str = "collection:";

impl MemoryVariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut store: Self = serde_json::from_str(json)?;
        for collection in &mut store.collections {
            collection.normalize_default_values();
        }
        Ok(store)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Adds a collection whose first mode is the default. An existing
    /// collection of the same name is left untouched.
    pub fn add_collection(&mut self, name: &str, modes: &[&str]) {
        if self.position(name).is_some() {
            return;
        }
        let modes: Vec<String> = if modes.is_empty() {
            vec!["Mode 1".to_string()]
        } else {
            modes.iter().map(|m| m.to_string()).collect()
        };
        self.collections.push(MemoryCollection {
            name: name.to_string(),
            default_mode: modes[0].clone(),
            modes,
            variables: BTreeMap::new(),
        });
    }

    /// Sets a string variable's default-mode value, creating both the
    /// collection and the variable as needed.
    pub fn set_string(&mut self, collection: &str, name: &str, value: &str) {
        let default_mode = self.collection_mut(collection).default_mode.clone();
        self.set_string_for_mode(collection, name, &default_mode, value);
    }

    pub fn set_string_for_mode(&mut self, collection: &str, name: &str, mode: &str, value: &str) {
        let collection = self.collection_mut(collection);
        if !collection.modes.iter().any(|m| m == mode) {
            collection.modes.push(mode.to_string());
        }
        let variable = collection
            .variables
            .entry(name.to_string())
            .or_insert_with(|| MemoryVariable {
                kind: VariableType::String,
                values_by_mode: BTreeMap::new(),
            });
        variable.values_by_mode.insert(mode.to_string(), value.to_string());
    }

    pub fn set_variable(&mut self, collection: &str, name: &str, variable: MemoryVariable) {
        let collection = self.collection_mut(collection);
        collection.variables.insert(name.to_string(), variable);
        collection.normalize_default_values();
    }

    /// Makes `consumer` resolve `collection` in `mode`.
    pub fn set_consumer_mode(&mut self, consumer: &ElementId, collection: &str, mode: &str) {
        self.consumer_modes
            .entry(consumer.clone())
            .or_default()
            .insert(collection.to_string(), mode.to_string());
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.collections.iter().position(|c| c.name == name)
    }

    fn collection_mut(&mut self, name: &str) -> &mut MemoryCollection {
        let index = match self.position(name) {
            Some(index) => index,
            None => {
                self.add_collection(name, &[]);
                self.collections.len() - 1
            }
        };
        &mut self.collections[index]
    }

    fn collection_by_id(&self, id: &CollectionId) -> Result<&MemoryCollection, HostError> {
        id.0.strip_prefix(COLLECTION_PREFIX)
            .and_then(|index| index.parse::<usize>().ok())
            .and_then(|index| self.collections.get(index))
            .ok_or_else(|| HostError::Lookup(format!("unknown collection {}", id.0)))
    }

    fn variable_by_id(
        &self,
        id: &VariableId,
    ) -> Result<(&MemoryCollection, &MemoryVariable), HostError> {
        let unknown = || HostError::Lookup(format!("unknown variable {}", id.0));
        let (collection_id, name) = id.0.split_once('/').ok_or_else(unknown)?;
        let collection = self.collection_by_id(&CollectionId(collection_id.to_string()))?;
        let variable = collection.variables.get(name).ok_or_else(unknown)?;
        Ok((collection, variable))
    }
}

impl MemoryCollection {
    /// Moves values stored under the empty mode name (see
    /// [`MemoryVariable::new`]) to the collection's default mode.
    fn normalize_default_values(&mut self) {
        for variable in self.variables.values_mut() {
            if let Some(value) = variable.values_by_mode.remove("") {
                variable
                    .values_by_mode
                    .entry(self.default_mode.clone())
                    .or_insert(value);
            }
        }
    }
}

impl VariableStore for MemoryVariableStore {
    fn collection_names(&self) -> Vec<String> {
        self.collections.iter().map(|c| c.name.clone()).collect()
    }

    fn get_or_create_collection(&mut self, name: &str) -> Result<CollectionId, HostError> {
        let index = match self.position(name) {
            Some(index) => index,
            None => {
                log::info!("Creating variable collection {name:?}");
                self.add_collection(name, &[]);
                self.collections.len() - 1
            }
        };
        Ok(CollectionId(format!("{COLLECTION_PREFIX}{index}")))
    }

    fn find_string_variable(
        &self,
        key: &str,
        collection: &CollectionId,
    ) -> Result<Option<VariableId>, HostError> {
        let found = self.collection_by_id(collection)?.variables.get(key);
        Ok(found
            .filter(|variable| variable.kind == VariableType::String)
            .map(|_| VariableId(format!("{}/{key}", collection.0))))
    }

    fn resolve_for_consumer(
        &self,
        variable: &VariableId,
        consumer: &ElementId,
    ) -> Result<Option<String>, HostError> {
        let (collection, variable) = self.variable_by_id(variable)?;
        let mode = self
            .consumer_modes
            .get(consumer)
            .and_then(|modes| modes.get(&collection.name));
        Ok(mode.and_then(|mode| variable.values_by_mode.get(mode).cloned()))
    }

    fn default_value(&self, variable: &VariableId) -> Result<Option<String>, HostError> {
        let (collection, variable) = self.variable_by_id(variable)?;
        Ok(variable.values_by_mode.get(&collection.default_mode).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn handles_round_trip_through_lookups() {
        let mut store = MemoryVariableStore::new();
        store.set_string("Copy", "a/b", "value");

        let collection = store.get_or_create_collection("Copy").unwrap();
        let variable = store.find_string_variable("a/b", &collection).unwrap().unwrap();

        assert_eq!(variable.0, "collection:0/a/b");
        assert_eq!(store.default_value(&variable).unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn unknown_handles_are_lookup_errors() {
        let store = MemoryVariableStore::new();
        let result = store.default_value(&VariableId("collection:9/x".to_string()));
        assert!(matches!(result, Err(HostError::Lookup(_))));
    }

    #[test]
    fn loads_from_json() {
        let json = r#"{
            "collections": [{
                "name": "Copy",
                "modes": ["en", "fr"],
                "defaultMode": "en",
                "variables": {
                    "title": { "type": "STRING", "valuesByMode": { "en": "Title", "fr": "Titre" } },
                    "gap": { "type": "FLOAT", "valuesByMode": { "en": "4" } }
                }
            }],
            "consumerModes": { "1:2": { "Copy": "fr" } }
        }"#;
        let store = MemoryVariableStore::from_json(json).unwrap();

        let collection = CollectionId("collection:0".to_string());
        let title = store.find_string_variable("title", &collection).unwrap().unwrap();
        assert_eq!(store.find_string_variable("gap", &collection).unwrap(), None);
        assert_eq!(
            store
                .resolve_for_consumer(&title, &ElementId::from("1:2"))
                .unwrap()
                .as_deref(),
            Some("Titre")
        );
    }

    #[test]
    fn set_variable_places_default_value_in_default_mode() {
        let mut store = MemoryVariableStore::new();
        store.add_collection("Copy", &["light", "dark"]);
        store.set_variable("Copy", "tone", MemoryVariable::new(VariableType::String, "soft"));

        let variable = VariableId("collection:0/tone".to_string());
        assert_eq!(store.default_value(&variable).unwrap().as_deref(), Some("soft"));
    }
}
