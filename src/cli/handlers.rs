use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;

use serde_json::Value;
use tracing::warn;

use crate::app::App;
use crate::bus::{names, CATALOG};
use crate::entity::{ItemType, RecordKind};
use crate::error::{LexdeskError, Result};
use crate::files::DirectoryFiles;
use crate::search::parse_query;

fn parse_payload(raw: Option<&str>) -> Result<Value> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        Some(raw) => Ok(serde_json::from_str(raw)?),
        None => Ok(Value::Object(Default::default())),
    }
}

fn raise(app: &App, command: &str, payload: Value) -> Result<()> {
    let report = app.dispatch(command, payload)?;
    if report.failed > 0 {
        eprintln!(
            "'{}' failed in {} of {} handler(s); see the log for details.",
            command,
            report.failed,
            report.failed + report.delivered
        );
    }
    Ok(())
}

pub fn handle_dispatch(app: &App, command: String, payload: Option<String>) -> Result<()> {
    let payload = parse_payload(payload.as_deref())?;
    raise(app, &command, payload)
}

pub fn handle_shell(app: &App) -> Result<()> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let result = parse_payload(Some(rest)).and_then(|payload| raise(app, command, payload));
        if let Err(e) = result {
            warn!(command = %command, error = %e, "Shell command failed");
            eprintln!("Error: {}", e);
        }
        app.timers().fire_due(std::time::Instant::now());
    }
    Ok(())
}

pub fn handle_search(app: &App, query: String, json: bool) -> Result<()> {
    let (text, filters) = parse_query(&query);
    let results = app.store().search_all(&text, &filters);

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if results.is_empty() {
        println!("No results found for '{}'.", query);
    } else {
        println!("{} result(s) for '{}':\n", results.len(), query);
        for t in &results.legal_texts {
            println!("  ({}) [legal-text|{}] {}", t.base.id, t.text_type, t.title);
        }
        for p in &results.procedures {
            println!("  ({}) [procedure|{}] {}", p.base.id, p.difficulty, p.title);
        }
        for n in &results.news {
            println!("  ({}) [news|{}] {}", n.base.id, n.category, n.title);
        }
        for t in &results.templates {
            println!("  ({}) [template|{}] {}", t.base.id, t.category, t.name);
        }
    }

    Ok(())
}

/// `None` names the favorites list. Plural forms are accepted.
fn parse_list_type(raw: &str) -> Result<Option<RecordKind>> {
    let raw = raw.trim().to_lowercase();
    if raw == "favorite" || raw == "favorites" {
        return Ok(None);
    }
    raw.parse::<RecordKind>()
        .or_else(|e| raw.strip_suffix('s').ok_or(e)?.parse())
        .map(Some)
        .map_err(|_| LexdeskError::InvalidItemType(raw.clone()))
}

pub fn handle_list(app: &App, item_type: String, json: bool) -> Result<()> {
    let kind = parse_list_type(&item_type)?;
    let store = app.store();

    match kind {
        None => {
            let favorites = store.favorites(None);
            if json {
                println!("{}", serde_json::to_string_pretty(&favorites)?);
            } else if favorites.is_empty() {
                println!("No favorites found.");
            } else {
                println!("Favorites:\n");
                for f in favorites {
                    println!(
                        "  ({}) [{}] {} added {}",
                        f.item_id,
                        f.item_type,
                        f.title,
                        f.date_added.format("%Y-%m-%d")
                    );
                }
            }
        }
        Some(RecordKind::LegalText) => {
            let texts = store.legal_texts();
            if json {
                println!("{}", serde_json::to_string_pretty(texts)?);
            } else if texts.is_empty() {
                println!("No legal texts found.");
            } else {
                println!("Legal texts:\n");
                for t in texts {
                    println!("  ({}) [{}|{}] {}", t.base.id, t.text_type, t.status, t.title);
                    if !t.tags.is_empty() {
                        println!("      tags: {}", t.tags.join(", "));
                    }
                }
            }
        }
        Some(RecordKind::Procedure) => {
            let procedures = store.procedures();
            if json {
                println!("{}", serde_json::to_string_pretty(procedures)?);
            } else if procedures.is_empty() {
                println!("No procedures found.");
            } else {
                println!("Procedures:\n");
                for p in procedures {
                    println!(
                        "  ({}) [{}|{} step(s)] {}",
                        p.base.id,
                        p.difficulty,
                        p.steps.len(),
                        p.title
                    );
                }
            }
        }
        Some(RecordKind::News) => {
            let news = store.news();
            let user = store.current_user();
            if json {
                println!("{}", serde_json::to_string_pretty(news)?);
            } else if news.is_empty() {
                println!("No news found.");
            } else {
                println!("News:\n");
                for n in news {
                    let marker = if n.is_read_by(user) { " " } else { "*" };
                    let important = if n.is_important { " !" } else { "" };
                    println!("  {}({}) [{}]{} {}", marker, n.base.id, n.category, important, n.title);
                }
            }
        }
        Some(RecordKind::Template) => {
            let templates = store.templates();
            if json {
                println!("{}", serde_json::to_string_pretty(templates)?);
            } else if templates.is_empty() {
                println!("No templates found.");
            } else {
                println!("Templates:\n");
                for t in templates {
                    let vars = if t.variables.is_empty() {
                        String::new()
                    } else {
                        format!(" vars: {}", t.variables.join(", "))
                    };
                    println!("  ({}) [{}|used {}] {}{}", t.base.id, t.category, t.usage_count, t.name, vars);
                }
            }
        }
        Some(RecordKind::SavedSearch) => {
            let searches = store.saved_searches();
            if json {
                println!("{}", serde_json::to_string_pretty(searches)?);
            } else if searches.is_empty() {
                println!("No saved searches found.");
            } else {
                println!("Saved searches:\n");
                for s in searches {
                    println!(
                        "  ({}) {} \"{}\" used {} time(s)",
                        s.base.id, s.name, s.query, s.use_count
                    );
                }
            }
        }
    }

    Ok(())
}

pub fn handle_export(app: &App, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            let body = app.store().export()?;
            fs::write(&path, body)?;
            println!("Exported catalog to {}", path.display());
            Ok(())
        }
        None => raise(app, names::EXPORT_DATA, Value::Null),
    }
}

pub fn handle_import(app: &App, files: &DirectoryFiles, file: PathBuf) -> Result<()> {
    files.select(file);
    raise(app, names::IMPORT_DATA, Value::Null)?;
    let counts = app.store().counts();
    println!(
        "Catalog: {} legal text(s), {} procedure(s), {} news item(s), {} template(s)",
        counts.legal_texts, counts.procedures, counts.news, counts.templates
    );
    Ok(())
}

pub fn handle_commands() -> Result<()> {
    println!("Commands:\n");
    for (name, fields) in CATALOG {
        if fields.is_empty() {
            println!("  {}", name);
        } else {
            println!("  {:<28} {{{}}}", name, fields);
        }
    }
    let item_types = [
        ItemType::LegalText,
        ItemType::Procedure,
        ItemType::News,
        ItemType::Template,
    ];
    let listed: Vec<String> = item_types.iter().map(ToString::to_string).collect();
    println!("\nItem types: {}", listed.join(", "));
    Ok(())
}
