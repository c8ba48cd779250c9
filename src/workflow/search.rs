use std::rc::Rc;

use chrono::Local;
use tracing::{debug, info};

use super::{changed_text, confirm, on, report_invalid, report_unchanged, Services};
use crate::bus::names;
use crate::bus::payload::{
    LegalTextRef, NewsRef, ProcedureRef, SavedSearchRef, SearchRequest, TemplateRef,
};
use crate::entity::{ItemType, NewSavedSearch, RecordKind, SavedSearchPatch};
use crate::error::Result;
use crate::notify::Notification;
use crate::presenter::{ActionKey, Choice, Dialog, FormField, ItemRef};
use crate::search::{parse_query, Filters, SearchResults};

pub(super) fn install(services: &Rc<Services>) {
    on(services, names::IMMERSIVE_SEARCH, immersive_search);
    on(services, names::SAVE_SEARCH, save_search);
    on(services, names::EXECUTE_SAVED_SEARCH, execute_saved_search);
    on(services, names::EDIT_SAVED_SEARCH, edit_saved_search);
    on(services, names::DELETE_SAVED_SEARCH, delete_saved_search);
}

fn excerpt(text: &str) -> String {
    const LIMIT: usize = 100;
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(LIMIT).collect();
    if chars.next().is_some() {
        format!("{}...", head.trim_end())
    } else {
        head
    }
}

/// Keep only the section named by `search_type`, when it names one.
fn narrow(results: SearchResults, search_type: Option<&str>) -> SearchResults {
    let Some(item_type) = search_type.and_then(|t| t.parse::<ItemType>().ok()) else {
        return results;
    };
    SearchResults {
        legal_texts: if item_type == ItemType::LegalText { results.legal_texts } else { Vec::new() },
        procedures: if item_type == ItemType::Procedure { results.procedures } else { Vec::new() },
        news: if item_type == ItemType::News { results.news } else { Vec::new() },
        templates: if item_type == ItemType::Template { results.templates } else { Vec::new() },
    }
}

fn section<'a, T: 'a>(
    mut dialog: Dialog,
    heading: &str,
    records: &'a [T],
    preview: usize,
    describe: impl Fn(&'a T) -> (ItemRef, String),
) -> Dialog {
    if records.is_empty() {
        return dialog;
    }
    dialog = dialog.heading(format!("{} ({})", heading, records.len()));
    for record in records.iter().take(preview) {
        let (item, summary) = describe(record);
        dialog = dialog.item(format!("{}: {}", item.title, excerpt(&summary)));
        let label = format!("Open \"{}\"", item.title);
        dialog = dialog.action(ActionKey::Open(item), label);
    }
    dialog
}

fn results_dialog(results: &SearchResults, query: Option<&str>, preview: usize) -> Dialog {
    let summary = match query.filter(|q| !q.is_empty()) {
        Some(q) => format!("{} results found for \"{}\"", results.len(), q),
        None => format!("{} results found", results.len()),
    };
    let mut dialog = Dialog::new("Search results").paragraph(summary);

    dialog = section(dialog, "Legal texts", &results.legal_texts, preview, |t| {
        (
            ItemRef {
                item_type: ItemType::LegalText,
                id: t.base.id.clone(),
                title: t.title.clone(),
            },
            t.content.clone(),
        )
    });
    dialog = section(dialog, "Procedures", &results.procedures, preview, |p| {
        (
            ItemRef {
                item_type: ItemType::Procedure,
                id: p.base.id.clone(),
                title: p.title.clone(),
            },
            p.description.clone(),
        )
    });
    dialog = section(dialog, "News", &results.news, preview, |n| {
        (
            ItemRef {
                item_type: ItemType::News,
                id: n.base.id.clone(),
                title: n.title.clone(),
            },
            n.content.clone(),
        )
    });
    dialog = section(dialog, "Templates", &results.templates, preview, |t| {
        (
            ItemRef {
                item_type: ItemType::Template,
                id: t.base.id.clone(),
                title: t.name.clone(),
            },
            t.content.clone(),
        )
    });

    dialog
        .action(ActionKey::SaveSearch, "Save this search")
        .action(ActionKey::Close, "Close")
}

/// Raise the command that opens `item`.
pub(super) fn open_item(services: &Services, item: &ItemRef) -> Result<()> {
    let title = Some(item.title.clone());
    match item.item_type {
        ItemType::LegalText => services.dispatch(
            names::VIEW_LEGAL_TEXT,
            &LegalTextRef {
                text_id: item.id.clone(),
                title,
            },
        )?,
        ItemType::Procedure => services.dispatch(
            names::VIEW_PROCEDURE,
            &ProcedureRef {
                procedure_id: item.id.clone(),
                title,
            },
        )?,
        ItemType::News => services.dispatch(
            names::READ_NEWS,
            &NewsRef {
                news_id: Some(item.id.clone()),
                news_title: title,
            },
        )?,
        ItemType::Template => services.dispatch(
            names::USE_TEMPLATE,
            &TemplateRef {
                template_id: item.id.clone(),
            },
        )?,
    };
    Ok(())
}

/// Show results and follow up on the chosen action.
fn show_results(
    services: &Services,
    results: &SearchResults,
    query: &str,
    filters: &Filters,
) -> Result<()> {
    let dialog = results_dialog(results, Some(query), services.config.results_preview);
    match services.present(dialog) {
        Choice::Selected {
            action: ActionKey::Open(item),
            ..
        } => open_item(services, &item),
        Choice::Selected {
            action: ActionKey::SaveSearch,
            ..
        } => {
            let draft = NewSavedSearch {
                name: format!("Search {}", Local::now().format("%H:%M:%S")),
                query: query.to_string(),
                filters: filters.clone(),
            };
            services.dispatch(names::SAVE_SEARCH, &draft)?;
            Ok(())
        }
        _ => Ok(()),
    }
}

fn immersive_search(services: &Rc<Services>, payload: SearchRequest) -> Result<()> {
    let (query, filters) = parse_query(&payload.query);
    let results = services.store().search_all(&query, &filters);
    let results = narrow(results, payload.search_type.as_deref());
    info!(query = %payload.query, results = results.len(), "Search");
    show_results(services, &results, &query, &filters)
}

fn save_search(services: &Rc<Services>, payload: NewSavedSearch) -> Result<()> {
    let saved = services.store_mut().save_search(payload);
    match saved {
        Ok(search) => services.notify(Notification::success(
            "Search saved",
            format!("The search \"{}\" was saved.", search.name),
        )),
        Err(e) => report_invalid(services, "saved search", &e),
    }
    Ok(())
}

fn execute_saved_search(services: &Rc<Services>, payload: SavedSearchRef) -> Result<()> {
    let search = services.store().get_saved_search(&payload.search_id).cloned();
    let Some(search) = search else {
        debug!(id = %payload.search_id, "Unknown saved search");
        let results = SearchResults::default();
        return show_results(services, &results, "", &Filters::new());
    };
    let results = services.store_mut().execute_saved_search(&search.base.id);
    show_results(services, &results, &search.query, &search.filters)
}

fn edit_saved_search(services: &Rc<Services>, payload: SavedSearchRef) -> Result<()> {
    let Some(search) = services.store().get_saved_search(&payload.search_id).cloned() else {
        debug!(id = %payload.search_id, "Nothing to edit");
        return Ok(());
    };
    let dialog = Dialog::new("Edit saved search")
        .field(FormField::new("name", "Name", &search.name))
        .field(FormField::new("query", "Query", &search.query))
        .action(ActionKey::Submit, "Save")
        .action(ActionKey::Cancel, "Cancel");
    let Choice::Selected {
        action: ActionKey::Submit,
        input,
    } = services.present(dialog)
    else {
        return Ok(());
    };

    let patch = SavedSearchPatch {
        name: changed_text(&input, "name", &search.name),
        query: changed_text(&input, "query", &search.query),
        filters: None,
    };
    if patch == SavedSearchPatch::default() {
        report_unchanged(services, "saved search");
        return Ok(());
    }
    let updated = services.store_mut().update_saved_search(&search.base.id, patch);
    match updated {
        Ok(true) => services.notify(Notification::success(
            "Search updated",
            "The saved search was updated.",
        )),
        Ok(false) => debug!(id = %search.base.id, "Saved search vanished before saving"),
        Err(e) => report_invalid(services, "saved search", &e),
    }
    Ok(())
}

fn delete_saved_search(services: &Rc<Services>, payload: SavedSearchRef) -> Result<()> {
    confirm::request(services, RecordKind::SavedSearch, &payload.search_id)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        let long = "é".repeat(150);
        let short = excerpt(&long);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), 103);
        assert_eq!(excerpt("court"), "court");
    }

    #[test]
    fn test_results_dialog_caps_open_actions() {
        use crate::entity::{LegalText, NewLegalText, RecordBase};
        let texts: Vec<LegalText> = (0..5)
            .map(|i| {
                LegalText::from_draft(
                    RecordBase::new(format!("t{}", i)),
                    NewLegalText {
                        title: format!("Loi {}", i),
                        ..Default::default()
                    },
                )
            })
            .collect();
        let results = SearchResults {
            legal_texts: texts,
            ..Default::default()
        };
        let dialog = results_dialog(&results, Some("loi"), 3);
        let opens = dialog
            .actions
            .iter()
            .filter(|a| matches!(a.key, ActionKey::Open(_)))
            .count();
        assert_eq!(opens, 3);
        assert!(dialog.offers(&ActionKey::SaveSearch));
    }

    #[test]
    fn test_narrow_keeps_one_section() {
        use crate::entity::{NewNewsItem, NewsItem, RecordBase};
        let results = SearchResults {
            news: vec![NewsItem::from_draft(
                RecordBase::new("n".to_string()),
                NewNewsItem::default(),
            )],
            ..Default::default()
        };
        assert_eq!(narrow(results.clone(), Some("procedure")).len(), 0);
        assert_eq!(narrow(results.clone(), Some("news")).len(), 1);
        assert_eq!(narrow(results, Some("everything")).len(), 1);
    }
}
