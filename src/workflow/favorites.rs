use std::rc::Rc;

use tracing::debug;

use super::search::open_item;
use super::{on, report_invalid, Services};
use crate::bus::names;
use crate::bus::payload::{FavoriteRequest, FavoritesView};
use crate::entity::NewFavorite;
use crate::error::Result;
use crate::notify::Notification;
use crate::presenter::{ActionKey, Choice, Dialog, ItemRef};

pub(super) fn install(services: &Rc<Services>) {
    on(services, names::ADD_TO_FAVORITES, add);
    on(services, names::REMOVE_FROM_FAVORITES, remove);
    on(services, names::VIEW_FAVORITES, view);
}

fn add(services: &Rc<Services>, payload: FavoriteRequest) -> Result<()> {
    let name = payload.item_name.unwrap_or_default();
    let item_id = payload
        .item_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| name.clone());

    if services.store().is_favorite(&item_id, payload.item_type) {
        services.notify(Notification::info(
            "Already in favorites",
            format!("\"{}\" is already in your favorites.", name),
        ));
        return Ok(());
    }

    let added = services.store_mut().add_favorite(NewFavorite {
        item_id,
        item_type: payload.item_type,
        title: name.clone(),
    });
    match added {
        Ok(_) => services.notify(Notification::success(
            "Added to favorites",
            format!("\"{}\" was added to your favorites.", name),
        )),
        Err(e) => report_invalid(services, "favorite", &e),
    }
    Ok(())
}

fn remove(services: &Rc<Services>, payload: FavoriteRequest) -> Result<()> {
    let item_id = payload.item_id.unwrap_or_default();
    let removed = services
        .store_mut()
        .remove_favorite(&item_id, payload.item_type);
    debug!(item_id = %item_id, item_type = %payload.item_type, removed, "Favorite removal");
    services.notify(Notification::success(
        "Removed from favorites",
        "The item was removed from your favorites.",
    ));
    Ok(())
}

fn view(services: &Rc<Services>, payload: FavoritesView) -> Result<()> {
    let favorites: Vec<_> = services
        .store()
        .favorites(payload.item_type)
        .into_iter()
        .cloned()
        .collect();

    let mut dialog = Dialog::new("My favorites");
    if favorites.is_empty() {
        dialog = dialog.paragraph("No favorites yet.");
    }
    for favorite in &favorites {
        dialog = dialog.item(format!(
            "{} ({}, added {})",
            favorite.title,
            favorite.item_type,
            favorite.date_added.format("%Y-%m-%d")
        ));
        let item = ItemRef {
            item_type: favorite.item_type,
            id: favorite.item_id.clone(),
            title: favorite.title.clone(),
        };
        dialog = dialog.action(ActionKey::Open(item), format!("Open \"{}\"", favorite.title));
    }
    dialog = dialog.action(ActionKey::Close, "Close");

    if let Choice::Selected {
        action: ActionKey::Open(item),
        ..
    } = services.present(dialog)
    {
        open_item(services, &item)?;
    }
    Ok(())
}
