//! # Variable Resolution
//!
//! Placeholders resolve against named collections of string variables held
//! by an external store. [`resolve`] wraps the store's lookups into a single
//! never-failing call: every failure is logged and reported as `None`, which
//! the substitution engine treats as "leave this placeholder alone".

pub mod memory;

use serde::{Deserialize, Serialize};

use crate::host::{ElementId, HostError};

pub use memory::{MemoryCollection, MemoryVariable, MemoryVariableStore, VariableType};

/// Opaque handle to a variable collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionId(pub String);

/// Opaque handle to a variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariableId(pub String);

/// Lookups the engine needs from the variable store.
pub trait VariableStore {
    fn collection_names(&self) -> Vec<String>;

    fn get_or_create_collection(&mut self, name: &str) -> Result<CollectionId, HostError>;

    /// Finds a string-typed variable named `key` in `collection`.
    fn find_string_variable(
        &self,
        key: &str,
        collection: &CollectionId,
    ) -> Result<Option<VariableId>, HostError>;

    /// Value of `variable` in the mode that applies to `consumer`, if the
    /// consumer selects a mode for the variable's collection.
    fn resolve_for_consumer(
        &self,
        variable: &VariableId,
        consumer: &ElementId,
    ) -> Result<Option<String>, HostError>;

    /// Value of `variable` in its collection's default mode.
    fn default_value(&self, variable: &VariableId) -> Result<Option<String>, HostError>;
}

/// Resolves `key` in the collection named `collection_name` for `consumer`.
///
/// Tries the key verbatim, then with `.` rewritten to `/` so dotted paths
/// reach grouped variables. The consumer's mode wins over the default value.
/// An empty string is a valid value; `None` means the key is unresolved.
pub fn resolve<V: VariableStore + ?Sized>(
    store: &mut V,
    key: &str,
    collection_name: &str,
    consumer: &ElementId,
) -> Option<String> {
    let collection = match store.get_or_create_collection(collection_name) {
        Ok(collection) => collection,
        Err(e) => {
            log::warn!("Cannot open collection {collection_name:?}: {e}");
            return None;
        }
    };

    let variable = match find_variable(store, key, &collection) {
        Ok(Some(variable)) => variable,
        Ok(None) => {
            log::debug!("@{key} not found in {collection_name:?}");
            return None;
        }
        Err(e) => {
            log::warn!("Lookup of @{key} in {collection_name:?} failed: {e}");
            return None;
        }
    };

    match store.resolve_for_consumer(&variable, consumer) {
        Ok(Some(value)) => return Some(value),
        Ok(None) => {}
        Err(e) => log::debug!("No consumer value for @{key} on {consumer}: {e}"),
    }

    match store.default_value(&variable) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Default value of @{key} unavailable: {e}");
            None
        }
    }
}

fn find_variable<V: VariableStore + ?Sized>(
    store: &V,
    key: &str,
    collection: &CollectionId,
) -> Result<Option<VariableId>, HostError> {
    if let Some(found) = store.find_string_variable(key, collection)? {
        return Ok(Some(found));
    }
    if key.contains('.') {
        return store.find_string_variable(&key.replace('.', "/"), collection);
    }
    Ok(None)
}
