use std::rc::Rc;

use chrono::Local;
use tracing::{info, warn};

use super::{on, Services};
use crate::bus::names;
use crate::bus::payload::{Empty, ResourceRequest};
use crate::error::Result;
use crate::notify::Notification;

pub const EXPORT_FILE: &str = "application_data.json";

pub(super) fn install(services: &Rc<Services>) {
    on(services, names::EXPORT_DATA, export);
    on(services, names::IMPORT_DATA, import);
    on(services, names::DOWNLOAD_RESOURCE, download_resource);
}

fn export(services: &Rc<Services>, _payload: Empty) -> Result<()> {
    let body = services.store().export()?;
    services.files.save_file(EXPORT_FILE, &body)?;
    info!(file = EXPORT_FILE, bytes = body.len(), "Catalog exported");
    services.notify(Notification::success(
        "Export complete",
        "Your data was exported successfully.",
    ));
    Ok(())
}

fn import(services: &Rc<Services>, _payload: Empty) -> Result<()> {
    let body = match services.files.pick_file(".json") {
        Ok(Some(body)) => body,
        Ok(None) => return Ok(()),
        Err(e) => {
            warn!(error = %e, "Import file could not be read");
            services.notify(Notification::error(
                "Import failed",
                format!("The selected file could not be read: {}", e),
            ));
            return Ok(());
        }
    };
    let imported = services.store_mut().import(&body);
    match imported {
        Ok(counts) => {
            info!(?counts, "Catalog imported");
            services.notify(Notification::success(
                "Import complete",
                "Your data was imported successfully.",
            ));
        }
        Err(e) => {
            warn!(error = %e, "Import failed");
            services.notify(Notification::error(
                "Import failed",
                "The file is not a valid export document.",
            ));
        }
    }
    Ok(())
}

fn resource_body(name: &str, kind: &str) -> String {
    format!(
        "Resource: {}\nType: {}\nDownloaded: {}\n",
        name,
        kind,
        Local::now().format("%Y-%m-%d %H:%M:%S")
    )
}

fn download_resource(services: &Rc<Services>, payload: ResourceRequest) -> Result<()> {
    let file_name = format!("{}.txt", payload.resource_name);
    services.deliver_download(
        &file_name,
        &resource_body(&payload.resource_name, &payload.resource_type),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_body_names_resource_and_type() {
        let body = resource_body("Guide", "procedure");
        assert!(body.starts_with("Resource: Guide\nType: procedure\nDownloaded: "));
    }
}
