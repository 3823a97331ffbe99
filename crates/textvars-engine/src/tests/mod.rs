//! Cross-module tests: scan, resolve, substitute and restore together over
//! a table of texts.


use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::engine::{Restoration, Substitution, load_backup, restore, substitute};
use crate::host::{ElementId, Font, MemoryDocument, TextHost};
use crate::settings::DocumentSettings;
use crate::variables::MemoryVariableStore;

fn store() -> MemoryVariableStore {
    let mut vars = MemoryVariableStore::new();
    for (key, value) in [
        ("a", "XXXX"),
        ("bb", "Y"),
        ("name", "Ada Lovelace"),
        ("empty", ""),
        ("brand/tagline", "Ship it"),
        ("emoji", "🎉"),
        ("icon/star", "★"),
    ] {
        vars.set_string("Text Variables", key, value);
    }
    vars
}

fn document(text: &str) -> (MemoryDocument, ElementId) {
    let mut doc = MemoryDocument::new();
    let id = doc.add_text("Label", text, Font::new("Inter", "Regular"));
    (doc, id)
}

#[rstest]
#[case("@a @bb", "XXXX Y")]
#[case("Hello @name!", "Hello Ada Lovelace!")]
#[case("[@empty]", "[]")]
#[case("@brand.tagline.", "Ship it.")]
#[case("Party @emoji time @emoji", "Party 🎉 time 🎉")]
#[case("héllo @name ünïcode", "héllo Ada Lovelace ünïcode")]
#[case("@icon/star @a@bb", "★ XXXXY")]
fn substitution_then_restore_round_trips(#[case] text: &str, #[case] substituted: &str) {
    let (mut doc, id) = document(text);
    let mut vars = store();

    let outcome = substitute(&mut doc, &mut vars, &id, &DocumentSettings::default()).unwrap();
    assert!(outcome.is_changed());
    assert_eq!(doc.text(&id).unwrap(), substituted);

    let backup = load_backup(&doc, &id).unwrap().unwrap();
    assert_eq!(backup.original_text, text);
    invariants::check(substituted, &backup);

    assert_eq!(restore(&mut doc, &id).unwrap(), Restoration::Restored);
    assert_eq!(doc.text(&id).unwrap(), text);
}

#[rstest]
#[case("")]
#[case("no placeholders here")]
#[case("email@")]
#[case("@missing and @also.missing")]
// Greedy: the whole dotted path is the key, and it does not resolve
#[case("mail me@name.example")]
fn nothing_actionable_is_unchanged(#[case] text: &str) {
    let (mut doc, id) = document(text);
    let mut vars = store();

    let outcome = substitute(&mut doc, &mut vars, &id, &DocumentSettings::default()).unwrap();

    assert_eq!(outcome, Substitution::Unchanged);
    assert_eq!(doc.text(&id).unwrap(), text);
    assert_eq!(load_backup(&doc, &id).unwrap(), None);
}
