use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use textvars_engine::engine::has_backup;
use textvars_engine::host::{DocumentFile, TextHost};
use textvars_engine::{
    Dispatcher, DocumentSettings, ElementId, Event, MemoryDocument, MemoryVariableStore, Session,
    Transition,
};

const QUIET: Duration = Duration::from_millis(200);

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!(
        "{}/tests/fixtures/{name}",
        env!("CARGO_MANIFEST_DIR")
    ))
    .unwrap()
}

fn load() -> (MemoryDocument, MemoryVariableStore) {
    let doc = DocumentFile::from_json(&fixture("card.json"))
        .unwrap()
        .into_document();
    let vars = MemoryVariableStore::from_json(&fixture("card.vars.json")).unwrap();
    (doc, vars)
}

fn title() -> ElementId {
    ElementId::from("1:1")
}

fn price() -> ElementId {
    ElementId::from("1:2")
}

fn dispatcher() -> Dispatcher<MemoryDocument, MemoryVariableStore> {
    let (doc, vars) = load();
    let session = Session::load(&doc, DocumentSettings::default(), true);
    Dispatcher::new(doc, vars, session, QUIET)
}

/// Selects `ids` and lets the selection settle.
fn select(
    dispatcher: &mut Dispatcher<MemoryDocument, MemoryVariableStore>,
    ids: &[ElementId],
    now: &mut Instant,
) -> Option<Transition> {
    dispatcher.handle(Event::SelectionChanged(ids.to_vec()), *now);
    *now += QUIET;
    dispatcher.tick(*now)
}

#[test]
fn selecting_away_and_back_cycles_the_element() {
    let mut dispatcher = dispatcher();
    let mut now = Instant::now();

    // Given the title is being edited
    select(&mut dispatcher, &[title()], &mut now);

    // When the price is selected, the title shows its value
    let transition = select(&mut dispatcher, &[price()], &mut now);
    assert_eq!(
        transition,
        Some(Transition::Handled {
            substituted: Some(title()),
            restored: None,
        })
    );
    assert_eq!(dispatcher.host().text(&title()).unwrap(), "Desk Lamp");
    assert!(has_backup(dispatcher.host(), &title()));

    // When the title is selected again, the placeholder is back
    let transition = select(&mut dispatcher, &[title()], &mut now);
    assert_eq!(
        transition,
        Some(Transition::Handled {
            substituted: Some(price()),
            restored: Some(title()),
        })
    );
    assert_eq!(dispatcher.host().text(&title()).unwrap(), "@product.name");
    assert!(!has_backup(dispatcher.host(), &title()));

    // The price resolved in its consumer's mode
    assert_eq!(dispatcher.host().text(&price()).unwrap(), "Only $49 today");
}

#[test]
fn bursts_of_selection_only_act_on_the_last() {
    let mut dispatcher = dispatcher();
    let mut now = Instant::now();
    select(&mut dispatcher, &[title()], &mut now);

    // Rapid clicks through the card, ending back on the title
    for ids in [vec![price()], vec![ElementId::from("1:3")], vec![title()]] {
        dispatcher.handle(Event::SelectionChanged(ids), now);
        now += Duration::from_millis(50);
        assert_eq!(dispatcher.tick(now), None);
    }
    now += QUIET;
    let transition = dispatcher.tick(now);

    assert_eq!(
        transition,
        Some(Transition::Handled {
            substituted: None,
            restored: None,
        })
    );
    assert_eq!(dispatcher.host().text(&title()).unwrap(), "@product.name");
}

#[test]
fn backups_survive_saving_the_document() {
    let mut dispatcher = dispatcher();
    let mut now = Instant::now();
    select(&mut dispatcher, &[title()], &mut now);
    select(&mut dispatcher, &[], &mut now);
    assert_eq!(dispatcher.host().text(&title()).unwrap(), "Desk Lamp");

    // Save and reopen, as a front end does between runs
    let (doc, vars, _) = dispatcher.into_parts();
    let saved = DocumentFile::from_document(&doc).to_json().unwrap();
    let reopened = DocumentFile::from_json(&saved).unwrap().into_document();
    let session = Session::load(&reopened, DocumentSettings::default(), true);
    let mut dispatcher = Dispatcher::new(reopened, vars, session, QUIET);

    select(&mut dispatcher, &[title()], &mut now);
    assert_eq!(dispatcher.host().text(&title()).unwrap(), "@product.name");
}
