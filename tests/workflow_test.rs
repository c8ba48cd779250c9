use std::rc::Rc;

use lexdesk::app::{App, AppParts};
use lexdesk::bus::names;
use lexdesk::config::Config;
use lexdesk::entity::{
    Difficulty, ItemType, LegalTextStatus, NewFavorite, NewLegalText, NewNewsItem,
    NewProcedure, NewSavedSearch, NewTemplate, ProcedureStep,
};
use lexdesk::files::{FileGateway, MemoryFiles};
use lexdesk::notify::{Level, NotificationLog};
use lexdesk::presenter::{ActionKey, Block, Choice, ItemRef, ScriptedSurface};
use lexdesk::search::Filters;
use lexdesk::store::CatalogStore;
use lexdesk::{LexdeskError, Result};
use serde_json::json;

struct Harness {
    app: App,
    surface: ScriptedSurface,
    log: NotificationLog,
    files: MemoryFiles,
}

fn harness(replies: Vec<Choice>) -> Harness {
    let surface = ScriptedSurface::new(replies);
    let log = NotificationLog::new();
    let files = MemoryFiles::new();
    let config = Config {
        download_delay_ms: 0,
        ..Config::default()
    };
    let app = App::with_store(
        config,
        CatalogStore::in_memory(),
        AppParts {
            surface: Box::new(surface.clone()),
            notifier: Rc::new(log.clone()),
            files: Rc::new(files.clone()),
        },
    );
    Harness {
        app,
        surface,
        log,
        files,
    }
}

fn add_law(h: &Harness, title: &str) -> String {
    h.app
        .store_mut()
        .add_legal_text(NewLegalText {
            title: title.to_string(),
            content: format!("{} content", title),
            category: "Civil".to_string(),
            ..Default::default()
        })
        .unwrap()
        .base
        .id
}

#[test]
fn test_view_unknown_text_shows_synthesized_document() {
    let h = harness(vec![]);

    h.app
        .dispatch(names::VIEW_LEGAL_TEXT, json!({"textId": "missing", "title": "Ghost"}))
        .unwrap();

    let dialog = h.surface.last().unwrap();
    assert_eq!(dialog.title, "Document viewer");
    assert!(dialog.body.contains(&Block::Heading("Ghost".to_string())));
    assert!(dialog.offers(&ActionKey::Download));
    assert_eq!(h.app.store().legal_texts().len(), 0);
}

#[test]
fn test_confirmed_delete_removes_text_and_its_favorites() {
    let h = harness(vec![Choice::select(ActionKey::Confirm)]);
    let id = add_law(&h, "Code civil");
    h.app
        .store_mut()
        .add_favorite(NewFavorite {
            item_id: id.clone(),
            item_type: ItemType::LegalText,
            title: "Code civil".to_string(),
        })
        .unwrap();
    let listeners = h.app.bus().subscriber_count(names::CONFIRM_DELETE);

    h.app
        .dispatch(names::DELETE_LEGAL_TEXT, json!({"textId": id}))
        .unwrap();

    assert!(h.app.store().get_legal_text(&id).is_none());
    assert!(h.app.store().favorites(None).is_empty());
    assert_eq!(h.log.titles(), vec!["Deleted".to_string()]);
    assert_eq!(h.app.bus().subscriber_count(names::CONFIRM_DELETE), listeners);
}

#[test]
fn test_cancelled_delete_keeps_text() {
    let h = harness(vec![Choice::select(ActionKey::Cancel)]);
    let id = add_law(&h, "Code civil");

    h.app
        .dispatch(names::DELETE_LEGAL_TEXT, json!({"textId": id}))
        .unwrap();

    assert!(h.app.store().get_legal_text(&id).is_some());
    assert!(h.log.is_empty());
}

#[test]
fn test_dismissed_confirmation_leaves_no_listener_behind() {
    let h = harness(vec![]);
    let id = add_law(&h, "Code civil");
    let listeners = h.app.bus().subscriber_count(names::CONFIRM_DELETE);

    h.app
        .dispatch(names::DELETE_LEGAL_TEXT, json!({"textId": id}))
        .unwrap();
    assert_eq!(h.app.bus().subscriber_count(names::CONFIRM_DELETE), listeners);

    // A stray confirmation must not delete anything.
    h.app
        .dispatch(names::CONFIRM_DELETE, json!({"type": "legal-text", "id": id}))
        .unwrap();
    assert!(h.app.store().get_legal_text(&id).is_some());
}

#[test]
fn test_only_the_confirmed_request_is_deleted() {
    let h = harness(vec![
        Choice::select(ActionKey::Cancel),
        Choice::select(ActionKey::Confirm),
    ]);
    let first = add_law(&h, "Premier");
    let second = add_law(&h, "Second");

    h.app
        .dispatch(names::DELETE_LEGAL_TEXT, json!({"textId": first}))
        .unwrap();
    h.app
        .dispatch(names::DELETE_LEGAL_TEXT, json!({"textId": second}))
        .unwrap();

    assert!(h.app.store().get_legal_text(&first).is_some());
    assert!(h.app.store().get_legal_text(&second).is_none());
}

#[test]
fn test_failed_import_leaves_catalog_untouched() {
    let h = harness(vec![]);
    add_law(&h, "Code civil");
    let before = h.app.store().state().clone();
    h.files.select("{ not json");

    h.app.dispatch(names::IMPORT_DATA, json!({})).unwrap();

    assert_eq!(*h.app.store().state(), before);
    let last = h.log.last().unwrap();
    assert_eq!(last.title, "Import failed");
    assert_eq!(last.level, Level::Error);
}

#[test]
fn test_export_then_import_round_trips_through_files() {
    let h = harness(vec![]);
    add_law(&h, "Code civil");
    h.app.dispatch(names::EXPORT_DATA, json!({})).unwrap();
    let exported = h.files.saved_named("application_data.json").unwrap();

    let other = harness(vec![]);
    other.files.select(exported);
    other.app.dispatch(names::IMPORT_DATA, json!({})).unwrap();

    assert_eq!(other.app.store().legal_texts().len(), 1);
    assert_eq!(other.log.titles(), vec!["Import complete".to_string()]);
}

#[test]
fn test_import_with_nothing_picked_does_nothing() {
    let h = harness(vec![]);
    h.app.dispatch(names::IMPORT_DATA, json!({})).unwrap();
    assert!(h.log.is_empty());
}

#[test]
fn test_panicking_listener_does_not_stop_the_workflow() {
    let h = harness(vec![]);
    h.app
        .bus()
        .subscribe(names::ADD_TO_FAVORITES, |_| panic!("listener bug"));

    let report = h
        .app
        .dispatch(
            names::ADD_TO_FAVORITES,
            json!({"itemType": "news", "itemId": "n1", "itemName": "Réforme"}),
        )
        .unwrap();

    assert_eq!(report.failed, 1);
    assert!(report.delivered >= 1);
    assert!(h.app.store().is_favorite("n1", ItemType::News));
}

#[test]
fn test_add_to_favorites_twice_reports_duplicate() {
    let h = harness(vec![]);
    let payload = json!({"itemType": "procedure", "itemId": "p1", "itemName": "Permis"});

    h.app.dispatch(names::ADD_TO_FAVORITES, payload.clone()).unwrap();
    h.app.dispatch(names::ADD_TO_FAVORITES, payload).unwrap();

    assert_eq!(h.app.store().favorites(None).len(), 1);
    assert_eq!(
        h.log.titles(),
        vec!["Added to favorites".to_string(), "Already in favorites".to_string()]
    );
}

#[test]
fn test_download_announces_start_then_completion() {
    let h = harness(vec![]);
    let id = add_law(&h, "Code civil");

    h.app
        .dispatch(names::DOWNLOAD_LEGAL_TEXT, json!({"textId": id, "format": "PDF"}))
        .unwrap();

    assert_eq!(h.log.titles(), vec!["Download started".to_string()]);
    assert_eq!(h.app.timers().pending(), 1);

    h.app.finish();
    assert_eq!(
        h.log.titles(),
        vec!["Download started".to_string(), "Download completed".to_string()]
    );
    let body = h.files.saved_named("Code civil.pdf").unwrap();
    assert!(body.contains("Code civil content"));
}

#[test]
fn test_search_result_opens_the_document() {
    let h = harness(vec![]);
    let id = add_law(&h, "Code du travail");
    h.surface.push(Choice::select(ActionKey::Open(ItemRef {
        item_type: ItemType::LegalText,
        id: id.clone(),
        title: "Code du travail".to_string(),
    })));

    h.app
        .dispatch(names::IMMERSIVE_SEARCH, json!({"query": "travail"}))
        .unwrap();

    let shown = h.surface.shown();
    assert_eq!(shown.len(), 2);
    assert_eq!(shown[0].title, "Search results");
    assert_eq!(shown[1].title, "Document viewer");
    assert!(shown[1]
        .body
        .contains(&Block::Heading("Code du travail".to_string())));
    assert_eq!(h.surface.peak_live(), 1);
}

#[test]
fn test_saving_a_search_from_results_keeps_filters() {
    let h = harness(vec![Choice::select(ActionKey::SaveSearch)]);
    add_law(&h, "Code du travail");

    h.app
        .dispatch(
            names::IMMERSIVE_SEARCH,
            json!({"searchType": "all", "query": "category:Civil travail"}),
        )
        .unwrap();

    let store = h.app.store();
    let searches = store.saved_searches();
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].query, "travail");
    assert_eq!(searches[0].filters.get("category"), Some(&json!("Civil")));
    assert_eq!(h.log.titles(), vec!["Search saved".to_string()]);
}

#[test]
fn test_add_legal_text_through_form() {
    let h = harness(vec![Choice::submit([
        ("title", "Loi sur l'eau"),
        ("type", "law"),
        ("tags", "eau, environnement"),
        ("content", "Article 1"),
    ])]);

    h.app
        .dispatch(names::ADD_LEGAL_TEXT, json!({}))
        .unwrap();

    let store = h.app.store();
    let texts = store.legal_texts();
    assert_eq!(texts.len(), 1);
    assert_eq!(texts[0].title, "Loi sur l'eau");
    assert_eq!(texts[0].status, LegalTextStatus::Draft);
    assert_eq!(texts[0].author, store.current_user());
    assert_eq!(texts[0].tags, vec!["eau", "environnement"]);
    assert_eq!(h.log.titles(), vec!["Text created".to_string()]);
}

#[test]
fn test_blank_title_is_rejected_with_notification() {
    let h = harness(vec![Choice::submit([("title", "   ")])]);

    h.app
        .dispatch(names::ADD_LEGAL_TEXT, json!({}))
        .unwrap();

    assert!(h.app.store().legal_texts().is_empty());
    let last = h.log.last().unwrap();
    assert_eq!(last.title, "Invalid legal text");
    assert_eq!(last.level, Level::Error);
}

#[test]
fn test_read_news_marks_it_read() {
    let h = harness(vec![]);
    let id = h
        .app
        .store_mut()
        .add_news(NewNewsItem {
            title: "Réforme".to_string(),
            ..Default::default()
        })
        .unwrap()
        .base
        .id;
    let user = h.app.store().current_user().to_string();
    assert_eq!(h.app.store().unread_news(&user).len(), 1);

    h.app
        .dispatch(names::READ_NEWS, json!({"newsId": id}))
        .unwrap();

    assert!(h.app.store().unread_news(&user).is_empty());
    assert_eq!(h.surface.last().unwrap().title, "News");
}

#[test]
fn test_use_template_fills_and_saves_document() {
    let h = harness(vec![Choice::submit([("nom", "Dupont")])]);
    let id = h
        .app
        .store_mut()
        .add_template(NewTemplate {
            name: "Mise en demeure".to_string(),
            content: "Monsieur {{nom}},".to_string(),
            ..Default::default()
        })
        .unwrap()
        .base
        .id;

    h.app
        .dispatch(names::USE_TEMPLATE, json!({"templateId": id}))
        .unwrap();

    assert_eq!(
        h.files.saved_named("Mise en demeure.txt").as_deref(),
        Some("Monsieur Dupont,")
    );
    assert_eq!(h.app.store().get_template(&id).unwrap().usage_count, 1);
    assert_eq!(h.log.titles(), vec!["Document generated".to_string()]);
}

#[test]
fn test_favorites_view_opens_procedure() {
    let h = harness(vec![]);
    h.app
        .store_mut()
        .add_favorite(NewFavorite {
            item_id: "p1".to_string(),
            item_type: ItemType::Procedure,
            title: "Permis".to_string(),
        })
        .unwrap();
    h.surface.push(Choice::select(ActionKey::Open(ItemRef {
        item_type: ItemType::Procedure,
        id: "p1".to_string(),
        title: "Permis".to_string(),
    })));

    h.app.dispatch(names::VIEW_FAVORITES, json!({})).unwrap();

    let shown = h.surface.shown();
    assert_eq!(shown[0].title, "My favorites");
    assert_eq!(shown[1].title, "Administrative procedure");
    assert!(shown[1].body.contains(&Block::Heading("Permis".to_string())));
}

#[test]
fn test_reject_document_carries_reason() {
    let h = harness(vec![Choice::submit([("reason", "Missing signature")])]);

    h.app
        .dispatch(
            names::REJECT_DOCUMENT,
            json!({"documentId": "d1", "documentTitle": "Contrat"}),
        )
        .unwrap();

    let last = h.log.last().unwrap();
    assert_eq!(last.title, "Document rejected");
    assert!(last.description.contains("Missing signature"));
}

#[test]
fn test_invalid_payload_counts_as_failure() {
    let h = harness(vec![]);
    let report = h
        .app
        .dispatch(names::VIEW_PROCEDURE, json!({"title": "no id"}))
        .unwrap();
    assert_eq!(report.failed, 1);
    assert!(h.surface.shown().is_empty());
}

fn add_procedure(h: &Harness) -> String {
    h.app
        .store_mut()
        .add_procedure(NewProcedure {
            title: "Carte grise".to_string(),
            steps: vec![
                ProcedureStep::new(1, "Dépôt", "Au guichet"),
                ProcedureStep::new(2, "Retrait", ""),
            ],
            ..Default::default()
        })
        .unwrap()
        .base
        .id
}

/// A file chooser whose selection can no longer be read
struct UnreadableFile;

impl FileGateway for UnreadableFile {
    fn pick_file(&self, _accept: &str) -> Result<Option<String>> {
        Err(LexdeskError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "backup.json vanished",
        )))
    }

    fn save_file(&self, _name: &str, _content: &str) -> Result<()> {
        Ok(())
    }
}

#[test]
fn test_unreadable_import_file_reports_failure() {
    let log = NotificationLog::new();
    let app = App::with_store(
        Config::default(),
        CatalogStore::in_memory(),
        AppParts {
            surface: Box::new(ScriptedSurface::new([])),
            notifier: Rc::new(log.clone()),
            files: Rc::new(UnreadableFile),
        },
    );

    let report = app.dispatch(names::IMPORT_DATA, json!({})).unwrap();

    assert_eq!(report.failed, 0);
    let last = log.last().unwrap();
    assert_eq!(last.title, "Import failed");
    assert_eq!(last.level, Level::Error);
    assert!(last.description.contains("backup.json vanished"));
}

#[test]
fn test_execute_saved_search_counts_use_and_shows_results() {
    let h = harness(vec![]);
    add_law(&h, "Code du travail");
    let id = h
        .app
        .store_mut()
        .save_search(NewSavedSearch {
            name: "Travail".to_string(),
            query: "travail".to_string(),
            filters: Filters::new(),
        })
        .unwrap()
        .base
        .id;

    h.app
        .dispatch(names::EXECUTE_SAVED_SEARCH, json!({"searchId": id}))
        .unwrap();

    let dialog = h.surface.last().unwrap();
    assert_eq!(dialog.title, "Search results");
    assert!(dialog
        .body
        .iter()
        .any(|b| matches!(b, Block::Item(line) if line.starts_with("Code du travail"))));
    assert_eq!(h.app.store().get_saved_search(&id).unwrap().use_count, 1);
    assert!(h.log.is_empty());
}

#[test]
fn test_share_legal_text_copies_link() {
    let h = harness(vec![Choice::select(ActionKey::CopyLink)]);

    h.app
        .dispatch(names::SHARE_LEGAL_TEXT, json!({"textId": "t1", "title": "Code civil"}))
        .unwrap();

    let dialog = h.surface.last().unwrap();
    assert_eq!(dialog.title, "Share: Code civil");
    assert!(dialog.body.contains(&Block::Fact(
        "Link".to_string(),
        "http://localhost/document/t1".to_string()
    )));
    assert_eq!(h.log.titles(), vec!["Link copied".to_string()]);
}

#[test]
fn test_edit_legal_text_changes_only_edited_fields() {
    let h = harness(vec![Choice::submit([("title", "Code civil 2024")])]);
    let id = h
        .app
        .store_mut()
        .add_legal_text(NewLegalText {
            title: "Code civil".to_string(),
            content: "  Article 1\n".to_string(),
            ..Default::default()
        })
        .unwrap()
        .base
        .id;

    h.app
        .dispatch(names::EDIT_LEGAL_TEXT, json!({"textId": id}))
        .unwrap();

    let store = h.app.store();
    let text = store.get_legal_text(&id).unwrap();
    assert_eq!(text.title, "Code civil 2024");
    assert_eq!(text.content, "  Article 1\n");
    assert_eq!(h.log.titles(), vec!["Text updated".to_string()]);
}

#[test]
fn test_edit_without_changes_keeps_modification_date() {
    let h = harness(vec![Choice::submit(Vec::<(String, String)>::new())]);
    let id = add_law(&h, "Code civil");
    let before = h.app.store().get_legal_text(&id).unwrap().clone();

    h.app
        .dispatch(names::EDIT_LEGAL_TEXT, json!({"textId": id}))
        .unwrap();

    assert_eq!(*h.app.store().get_legal_text(&id).unwrap(), before);
    assert_eq!(h.log.titles(), vec!["No changes".to_string()]);
}

#[test]
fn test_edit_procedure_reorders_steps_and_keeps_details() {
    let h = harness(vec![Choice::submit([
        ("difficulty", "hard"),
        ("steps", "Retrait; Dépôt"),
    ])]);
    let id = add_procedure(&h);

    h.app
        .dispatch(names::EDIT_PROCEDURE, json!({"procedureId": id}))
        .unwrap();

    let store = h.app.store();
    let procedure = store.get_procedure(&id).unwrap();
    assert_eq!(procedure.difficulty, Difficulty::Hard);
    assert_eq!(procedure.title, "Carte grise");
    assert_eq!(procedure.steps[0].title, "Retrait");
    assert_eq!(procedure.steps[0].order, 1);
    assert_eq!(procedure.steps[1].title, "Dépôt");
    assert_eq!(procedure.steps[1].description, "Au guichet");
    assert_ne!(procedure.steps[0].id, procedure.steps[1].id);
    assert_eq!(h.log.titles(), vec!["Procedure updated".to_string()]);
}

#[test]
fn test_add_procedure_with_repeated_step_titles() {
    let h = harness(vec![Choice::submit([
        ("title", "Passeport"),
        ("steps", "Formulaire; Paiement; Formulaire"),
    ])]);

    h.app.dispatch(names::ADD_PROCEDURE, json!({})).unwrap();

    let store = h.app.store();
    let procedures = store.procedures();
    assert_eq!(procedures.len(), 1);
    let ids: Vec<&str> = procedures[0].steps.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(h.log.titles(), vec!["Procedure created".to_string()]);
}

#[test]
fn test_delete_procedure_after_confirmation() {
    let h = harness(vec![Choice::select(ActionKey::Confirm)]);
    let id = add_procedure(&h);

    h.app
        .dispatch(names::DELETE_PROCEDURE, json!({"procedureId": id}))
        .unwrap();

    assert!(h.app.store().get_procedure(&id).is_none());
    assert_eq!(h.log.titles(), vec!["Deleted".to_string()]);
}

#[test]
fn test_edit_news_marks_it_important() {
    let h = harness(vec![Choice::submit([("important", "oui")])]);
    let id = h
        .app
        .store_mut()
        .add_news(NewNewsItem {
            title: "Réforme".to_string(),
            content: "Texte".to_string(),
            ..Default::default()
        })
        .unwrap()
        .base
        .id;

    h.app
        .dispatch(names::EDIT_NEWS, json!({"newsId": id}))
        .unwrap();

    let store = h.app.store();
    let item = store.get_news(&id).unwrap();
    assert!(item.is_important);
    assert_eq!(item.content, "Texte");
    assert_eq!(h.log.titles(), vec!["News updated".to_string()]);
}

#[test]
fn test_create_template_derives_variables() {
    let h = harness(vec![Choice::submit([
        ("name", "Convocation"),
        ("category", "RH"),
        ("public", "yes"),
        ("content", "Cher {{nom}}, rendez-vous le {{date}}."),
    ])]);

    h.app.dispatch(names::CREATE_TEMPLATE, json!({})).unwrap();

    let store = h.app.store();
    let templates = store.templates();
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].variables, vec!["nom", "date"]);
    assert!(templates[0].is_public);
    assert_eq!(templates[0].created_by, store.current_user());
    assert_eq!(h.log.titles(), vec!["Template created".to_string()]);
}

#[test]
fn test_edit_template_content_rederives_variables() {
    let h = harness(vec![Choice::submit([(
        "content",
        "Bonjour {{nom}}, de {{ville}}",
    )])]);
    let id = h
        .app
        .store_mut()
        .add_template(NewTemplate {
            name: "Lettre".to_string(),
            content: "Bonjour {{nom}}".to_string(),
            ..Default::default()
        })
        .unwrap()
        .base
        .id;

    h.app
        .dispatch(names::EDIT_TEMPLATE, json!({"templateId": id}))
        .unwrap();

    let store = h.app.store();
    let template = store.get_template(&id).unwrap();
    assert_eq!(template.name, "Lettre");
    assert_eq!(template.variables, vec!["nom", "ville"]);
    assert_eq!(h.log.titles(), vec!["Template updated".to_string()]);
}

#[test]
fn test_edit_saved_search_renames_it() {
    let h = harness(vec![Choice::submit([("name", "Droit du travail")])]);
    let id = h
        .app
        .store_mut()
        .save_search(NewSavedSearch {
            name: "Travail".to_string(),
            query: "travail".to_string(),
            filters: Filters::new(),
        })
        .unwrap()
        .base
        .id;

    h.app
        .dispatch(names::EDIT_SAVED_SEARCH, json!({"searchId": id}))
        .unwrap();

    let store = h.app.store();
    let search = store.get_saved_search(&id).unwrap();
    assert_eq!(search.name, "Droit du travail");
    assert_eq!(search.query, "travail");
    assert_eq!(h.log.titles(), vec!["Search updated".to_string()]);
}

#[test]
fn test_approve_document_announces_success() {
    let h = harness(vec![]);

    h.app
        .dispatch(
            names::APPROVE_DOCUMENT,
            json!({"documentId": "d1", "documentTitle": "Contrat"}),
        )
        .unwrap();

    let last = h.log.last().unwrap();
    assert_eq!(last.title, "Document approved");
    assert_eq!(last.level, Level::Success);
    assert!(h.surface.shown().is_empty());
}

#[test]
fn test_request_changes_carries_reason() {
    let h = harness(vec![Choice::submit([("reason", "Clause 3 unclear")])]);

    h.app
        .dispatch(
            names::REQUEST_CHANGES_DOCUMENT,
            json!({"documentId": "d1", "documentTitle": "Contrat"}),
        )
        .unwrap();

    let last = h.log.last().unwrap();
    assert_eq!(last.title, "Changes requested");
    assert_eq!(last.level, Level::Info);
    assert!(last.description.contains("Clause 3 unclear"));
}
