use std::rc::Rc;

use tracing::debug;

use super::{
    changed, changed_text, confirm, input_value, on, placeholder, report_invalid,
    report_unchanged, Services,
};
use crate::bus::names;
use crate::bus::payload::{FavoriteRequest, LegalTextRef, NewsRef, Prefill};
use crate::entity::{split_list, ItemType, NewNewsItem, NewsItem, NewsPatch, RecordKind};
use crate::error::Result;
use crate::notify::Notification;
use crate::presenter::{ActionKey, Choice, Dialog, FormField};

pub(super) fn install(services: &Rc<Services>) {
    on(services, names::READ_NEWS, read);
    on(services, names::ADD_NEWS, add);
    on(services, names::EDIT_NEWS, edit);
    on(services, names::DELETE_NEWS, delete);
}

fn news_dialog(item: &NewsItem) -> Dialog {
    let mut dialog = Dialog::new("News")
        .heading(&item.title)
        .fact("By", &item.author)
        .fact("Published", item.base.date_created.format("%Y-%m-%d").to_string())
        .fact("Category", &item.category);
    if item.is_important {
        dialog = dialog.fact("Priority", "important");
    }
    dialog
        .paragraph(&item.content)
        .action(ActionKey::AddToFavorites, "Add to favorites")
        .action(ActionKey::Share, "Share")
        .action(ActionKey::Close, "Close")
}

fn read(services: &Rc<Services>, payload: NewsRef) -> Result<()> {
    let id = payload
        .news_id
        .clone()
        .filter(|id| !id.is_empty())
        .or_else(|| payload.news_title.clone())
        .unwrap_or_default();

    if payload.news_id.is_some() {
        let user = services.current_user();
        let newly_read = services.store_mut().mark_news_read(&id, &user);
        if newly_read {
            debug!(id = %id, user = %user, "News marked read");
        }
    }

    let stored = services.store().get_news(&id).cloned();
    let item = stored.unwrap_or_else(|| {
        debug!(id = %id, "News not found, synthesizing");
        placeholder::synthesize_news(&id, payload.news_title.as_deref())
    });

    match services.present(news_dialog(&item)).action() {
        Some(ActionKey::AddToFavorites) => {
            services.dispatch(
                names::ADD_TO_FAVORITES,
                &FavoriteRequest {
                    item_type: ItemType::News,
                    item_id: Some(item.base.id.clone()),
                    item_name: Some(item.title.clone()),
                },
            )?;
        }
        Some(ActionKey::Share) => {
            services.dispatch(
                names::SHARE_LEGAL_TEXT,
                &LegalTextRef {
                    text_id: item.base.id.clone(),
                    title: Some(item.title.clone()),
                },
            )?;
        }
        _ => {}
    }
    Ok(())
}

fn news_form(title: &str, seed: &NewNewsItem, submit: &str) -> Dialog {
    Dialog::new(title)
        .field(FormField::new("title", "Title", &seed.title))
        .field(FormField::new("category", "Category", &seed.category))
        .field(FormField::new("tags", "Tags (comma separated)", seed.tags.join(", ")))
        .field(FormField::new(
            "important",
            "Important (yes/no)",
            if seed.is_important { "yes" } else { "no" },
        ))
        .field(FormField::new("content", "Content", &seed.content))
        .action(ActionKey::Submit, submit)
        .action(ActionKey::Cancel, "Cancel")
}

fn is_yes(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "yes" | "y" | "true" | "1" | "oui"
    )
}

fn add(services: &Rc<Services>, payload: Prefill<NewNewsItem>) -> Result<()> {
    let seed = payload.data.unwrap_or_default();
    let Choice::Selected {
        action: ActionKey::Submit,
        input,
    } = services.present(news_form("New news item", &seed, "Publish"))
    else {
        return Ok(());
    };

    let draft = NewNewsItem {
        title: input_value(&input, "title"),
        content: input_value(&input, "content"),
        category: input_value(&input, "category"),
        author: services.current_user(),
        tags: split_list(&input_value(&input, "tags")),
        is_important: is_yes(&input_value(&input, "important")),
    };

    let added = services.store_mut().add_news(draft);
    match added {
        Ok(item) => services.notify(Notification::success(
            "News published",
            format!("\"{}\" was published.", item.title),
        )),
        Err(e) => report_invalid(services, "news item", &e),
    }
    Ok(())
}

fn edit(services: &Rc<Services>, payload: NewsRef) -> Result<()> {
    let id = payload.news_id.unwrap_or_default();
    let Some(item) = services.store().get_news(&id).cloned() else {
        debug!(id = %id, "Nothing to edit");
        return Ok(());
    };
    let seed = NewNewsItem {
        title: item.title.clone(),
        content: item.content.clone(),
        category: item.category.clone(),
        author: item.author.clone(),
        tags: item.tags.clone(),
        is_important: item.is_important,
    };
    let Choice::Selected {
        action: ActionKey::Submit,
        input,
    } = services.present(news_form("Edit news item", &seed, "Save"))
    else {
        return Ok(());
    };

    let patch = NewsPatch {
        title: changed_text(&input, "title", &item.title),
        content: changed_text(&input, "content", &item.content),
        category: changed_text(&input, "category", &item.category),
        tags: changed(split_list(&input_value(&input, "tags")), &item.tags),
        is_important: changed(is_yes(&input_value(&input, "important")), &item.is_important),
        author: None,
    };
    if patch == NewsPatch::default() {
        report_unchanged(services, "news item");
        return Ok(());
    }

    let updated = services.store_mut().update_news(&id, patch);
    match updated {
        Ok(true) => services.notify(Notification::success(
            "News updated",
            "The news item was updated.",
        )),
        Ok(false) => debug!(id = %id, "News vanished before saving"),
        Err(e) => report_invalid(services, "news item", &e),
    }
    Ok(())
}

fn delete(services: &Rc<Services>, payload: NewsRef) -> Result<()> {
    let id = payload.news_id.unwrap_or_default();
    confirm::request(services, RecordKind::News, &id)?;
    Ok(())
}
