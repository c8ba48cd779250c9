//! The catalog store: canonical collections, CRUD, search and snapshots.
//!
//! Every mutating operation ends with a write-through [`CatalogStore::persist`].
//! Absent ids are silent no-ops for `update_*`/`delete_*`, reported as `false`.

mod storage;
mod validate;

pub use storage::{MemorySnapshots, SnapshotStorage, SqliteSnapshots, SNAPSHOT_NAME};
pub use validate::Validate;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::entity::{
    generate_id, DocumentTemplate, Favorite, ItemType, LegalText, LegalTextPatch, NewFavorite,
    NewLegalText, NewNewsItem, NewProcedure, NewSavedSearch, NewTemplate, NewsItem, NewsPatch,
    Procedure, ProcedurePatch, RecordBase, RecordKind, SavedSearchPatch, SearchQuery,
    TemplatePatch,
};
use crate::error::{ImportError, LexdeskError, Result, ValidationError};
use crate::search::{filter_records, Filters, SearchResults};

pub const DEFAULT_USER: &str = "user-1";

fn default_user() -> String {
    DEFAULT_USER.to_string()
}

/// Everything that is persisted between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogState {
    #[serde(default)]
    pub legal_texts: Vec<LegalText>,
    #[serde(default)]
    pub procedures: Vec<Procedure>,
    #[serde(default)]
    pub news: Vec<NewsItem>,
    #[serde(default)]
    pub saved_searches: Vec<SearchQuery>,
    #[serde(default)]
    pub favorites: Vec<Favorite>,
    #[serde(default)]
    pub templates: Vec<DocumentTemplate>,
    #[serde(default = "default_user")]
    pub current_user: String,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            legal_texts: Vec::new(),
            procedures: Vec::new(),
            news: Vec::new(),
            saved_searches: Vec::new(),
            favorites: Vec::new(),
            templates: Vec::new(),
            current_user: default_user(),
        }
    }
}

/// Export document: the six content collections, no user.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument<'a> {
    legal_texts: &'a [LegalText],
    procedures: &'a [Procedure],
    news: &'a [NewsItem],
    saved_searches: &'a [SearchQuery],
    favorites: &'a [Favorite],
    templates: &'a [DocumentTemplate],
}

/// Import document: collections that are present replace the current ones.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportDocument {
    legal_texts: Option<Vec<LegalText>>,
    procedures: Option<Vec<Procedure>>,
    news: Option<Vec<NewsItem>>,
    saved_searches: Option<Vec<SearchQuery>>,
    favorites: Option<Vec<Favorite>>,
    templates: Option<Vec<DocumentTemplate>>,
}

/// Record counts per collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogCounts {
    pub legal_texts: usize,
    pub procedures: usize,
    pub news: usize,
    pub saved_searches: usize,
    pub favorites: usize,
    pub templates: usize,
}

pub struct CatalogStore {
    state: CatalogState,
    storage: Box<dyn SnapshotStorage>,
    strict: bool,
}

fn unique_id(taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = generate_id();
        if !taken(&id) {
            return id;
        }
    }
}

impl CatalogStore {
    /// An empty store persisting to memory only.
    pub fn in_memory() -> Self {
        Self {
            state: CatalogState::default(),
            storage: Box::new(MemorySnapshots::new()),
            strict: true,
        }
    }

    /// Load the persisted snapshot from `storage`; a missing snapshot yields an empty store.
    pub fn open(storage: Box<dyn SnapshotStorage>) -> Result<Self> {
        let state = match storage.load()? {
            Some(body) => serde_json::from_str(&body)
                .map_err(|e| LexdeskError::CorruptSnapshot(e.to_string()))?,
            None => CatalogState::default(),
        };
        debug!(
            legal_texts = state.legal_texts.len(),
            procedures = state.procedures.len(),
            news = state.news.len(),
            "Catalog loaded"
        );
        Ok(Self {
            state,
            storage,
            strict: true,
        })
    }

    /// Turn field validation on or off. Off accepts any record as given.
    pub fn with_validation(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    fn check<T: Validate>(&self, input: &T) -> std::result::Result<(), ValidationError> {
        if self.strict {
            input.validate()?;
        }
        Ok(())
    }

    /// Write the persisted subset of state. Failures are logged and swallowed.
    pub fn persist(&self) {
        let body = match serde_json::to_string(&self.state) {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "Snapshot serialization failed");
                return;
            }
        };
        if let Err(e) = self.storage.save(&body) {
            error!(error = %e, "Snapshot write failed, durable state unchanged");
        }
    }

    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    pub fn counts(&self) -> CatalogCounts {
        CatalogCounts {
            legal_texts: self.state.legal_texts.len(),
            procedures: self.state.procedures.len(),
            news: self.state.news.len(),
            saved_searches: self.state.saved_searches.len(),
            favorites: self.state.favorites.len(),
            templates: self.state.templates.len(),
        }
    }

    pub fn current_user(&self) -> &str {
        &self.state.current_user
    }

    pub fn set_current_user(&mut self, user: impl Into<String>) {
        self.state.current_user = user.into();
        self.persist();
    }

    fn drop_favorites_for(&mut self, item_id: &str, item_type: ItemType) {
        self.state
            .favorites
            .retain(|fav| !fav.refers_to(item_id, item_type));
    }

    // Legal texts

    pub fn add_legal_text(
        &mut self,
        draft: NewLegalText,
    ) -> std::result::Result<LegalText, ValidationError> {
        self.check(&draft)?;
        let id = unique_id(|id| self.state.legal_texts.iter().any(|t| t.base.id == id));
        let text = LegalText::from_draft(RecordBase::new(id), draft);
        debug!(id = %text.base.id, title = %text.title, "Legal text added");
        self.state.legal_texts.push(text.clone());
        self.persist();
        Ok(text)
    }

    pub fn update_legal_text(
        &mut self,
        id: &str,
        patch: LegalTextPatch,
    ) -> std::result::Result<bool, ValidationError> {
        self.check(&patch)?;
        let Some(text) = self.state.legal_texts.iter_mut().find(|t| t.base.id == id) else {
            return Ok(false);
        };
        text.apply(patch);
        self.persist();
        Ok(true)
    }

    pub fn delete_legal_text(&mut self, id: &str) -> bool {
        let before = self.state.legal_texts.len();
        self.state.legal_texts.retain(|t| t.base.id != id);
        let removed = self.state.legal_texts.len() != before;
        if removed {
            self.drop_favorites_for(id, ItemType::LegalText);
            self.persist();
        }
        removed
    }

    pub fn get_legal_text(&self, id: &str) -> Option<&LegalText> {
        self.state.legal_texts.iter().find(|t| t.base.id == id)
    }

    pub fn legal_texts(&self) -> &[LegalText] {
        &self.state.legal_texts
    }

    pub fn search_legal_texts(&self, query: &str, filters: &Filters) -> Vec<LegalText> {
        filter_records(&self.state.legal_texts, query, filters)
    }

    // Procedures

    pub fn add_procedure(
        &mut self,
        draft: NewProcedure,
    ) -> std::result::Result<Procedure, ValidationError> {
        self.check(&draft)?;
        let id = unique_id(|id| self.state.procedures.iter().any(|p| p.base.id == id));
        let procedure = Procedure::from_draft(RecordBase::new(id), draft);
        debug!(id = %procedure.base.id, title = %procedure.title, "Procedure added");
        self.state.procedures.push(procedure.clone());
        self.persist();
        Ok(procedure)
    }

    pub fn update_procedure(
        &mut self,
        id: &str,
        patch: ProcedurePatch,
    ) -> std::result::Result<bool, ValidationError> {
        self.check(&patch)?;
        let Some(procedure) = self.state.procedures.iter_mut().find(|p| p.base.id == id) else {
            return Ok(false);
        };
        procedure.apply(patch);
        self.persist();
        Ok(true)
    }

    pub fn delete_procedure(&mut self, id: &str) -> bool {
        let before = self.state.procedures.len();
        self.state.procedures.retain(|p| p.base.id != id);
        let removed = self.state.procedures.len() != before;
        if removed {
            self.drop_favorites_for(id, ItemType::Procedure);
            self.persist();
        }
        removed
    }

    pub fn get_procedure(&self, id: &str) -> Option<&Procedure> {
        self.state.procedures.iter().find(|p| p.base.id == id)
    }

    pub fn procedures(&self) -> &[Procedure] {
        &self.state.procedures
    }

    pub fn search_procedures(&self, query: &str, filters: &Filters) -> Vec<Procedure> {
        filter_records(&self.state.procedures, query, filters)
    }

    // News

    pub fn add_news(&mut self, draft: NewNewsItem) -> std::result::Result<NewsItem, ValidationError> {
        self.check(&draft)?;
        let id = unique_id(|id| self.state.news.iter().any(|n| n.base.id == id));
        let item = NewsItem::from_draft(RecordBase::new(id), draft);
        debug!(id = %item.base.id, title = %item.title, "News added");
        self.state.news.push(item.clone());
        self.persist();
        Ok(item)
    }

    pub fn update_news(
        &mut self,
        id: &str,
        patch: NewsPatch,
    ) -> std::result::Result<bool, ValidationError> {
        self.check(&patch)?;
        let Some(item) = self.state.news.iter_mut().find(|n| n.base.id == id) else {
            return Ok(false);
        };
        item.apply(patch);
        self.persist();
        Ok(true)
    }

    pub fn delete_news(&mut self, id: &str) -> bool {
        let before = self.state.news.len();
        self.state.news.retain(|n| n.base.id != id);
        let removed = self.state.news.len() != before;
        if removed {
            self.drop_favorites_for(id, ItemType::News);
            self.persist();
        }
        removed
    }

    pub fn get_news(&self, id: &str) -> Option<&NewsItem> {
        self.state.news.iter().find(|n| n.base.id == id)
    }

    pub fn news(&self) -> &[NewsItem] {
        &self.state.news
    }

    pub fn search_news(&self, query: &str, filters: &Filters) -> Vec<NewsItem> {
        filter_records(&self.state.news, query, filters)
    }

    /// Add `user` to the item's readers. Returns true only when the set changed.
    pub fn mark_news_read(&mut self, news_id: &str, user: &str) -> bool {
        let changed = self
            .state
            .news
            .iter_mut()
            .find(|n| n.base.id == news_id)
            .map(|item| item.mark_read(user))
            .unwrap_or(false);
        if changed {
            self.persist();
        }
        changed
    }

    pub fn unread_news(&self, user: &str) -> Vec<&NewsItem> {
        self.state
            .news
            .iter()
            .filter(|n| !n.is_read_by(user))
            .collect()
    }

    // Saved searches

    pub fn save_search(
        &mut self,
        draft: NewSavedSearch,
    ) -> std::result::Result<SearchQuery, ValidationError> {
        self.check(&draft)?;
        let id = unique_id(|id| self.state.saved_searches.iter().any(|s| s.base.id == id));
        let search = SearchQuery::from_draft(RecordBase::new(id), draft);
        debug!(id = %search.base.id, name = %search.name, "Search saved");
        self.state.saved_searches.push(search.clone());
        self.persist();
        Ok(search)
    }

    pub fn update_saved_search(
        &mut self,
        id: &str,
        patch: SavedSearchPatch,
    ) -> std::result::Result<bool, ValidationError> {
        self.check(&patch)?;
        let Some(search) = self.state.saved_searches.iter_mut().find(|s| s.base.id == id) else {
            return Ok(false);
        };
        search.apply(patch);
        self.persist();
        Ok(true)
    }

    pub fn delete_saved_search(&mut self, id: &str) -> bool {
        let before = self.state.saved_searches.len();
        self.state.saved_searches.retain(|s| s.base.id != id);
        let removed = self.state.saved_searches.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    pub fn get_saved_search(&self, id: &str) -> Option<&SearchQuery> {
        self.state.saved_searches.iter().find(|s| s.base.id == id)
    }

    pub fn saved_searches(&self) -> &[SearchQuery] {
        &self.state.saved_searches
    }

    /// Replay a saved search. Usage is recorded before the results are computed;
    /// an unknown id yields empty results and changes nothing.
    pub fn execute_saved_search(&mut self, id: &str) -> SearchResults {
        let Some(search) = self.state.saved_searches.iter_mut().find(|s| s.base.id == id) else {
            return SearchResults::default();
        };
        search.record_use();
        let query = search.query.clone();
        let filters = search.filters.clone();
        self.persist();
        self.search_all(&query, &filters)
    }

    // Favorites

    /// Bookmark an item. An existing bookmark for the same `(item_id, item_type)` is returned
    /// unchanged instead of creating a duplicate.
    pub fn add_favorite(
        &mut self,
        draft: NewFavorite,
    ) -> std::result::Result<Favorite, ValidationError> {
        self.check(&draft)?;
        if let Some(existing) = self
            .state
            .favorites
            .iter()
            .find(|f| f.refers_to(&draft.item_id, draft.item_type))
        {
            return Ok(existing.clone());
        }
        let id = unique_id(|id| self.state.favorites.iter().any(|f| f.id == id));
        let favorite = Favorite::new(id, draft);
        self.state.favorites.push(favorite.clone());
        self.persist();
        Ok(favorite)
    }

    pub fn remove_favorite(&mut self, item_id: &str, item_type: ItemType) -> bool {
        let before = self.state.favorites.len();
        self.drop_favorites_for(item_id, item_type);
        let removed = self.state.favorites.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    pub fn is_favorite(&self, item_id: &str, item_type: ItemType) -> bool {
        self.state
            .favorites
            .iter()
            .any(|f| f.refers_to(item_id, item_type))
    }

    /// Favorites, optionally restricted to one item type
    pub fn favorites(&self, item_type: Option<ItemType>) -> Vec<&Favorite> {
        self.state
            .favorites
            .iter()
            .filter(|f| item_type.map_or(true, |t| f.item_type == t))
            .collect()
    }

    // Templates

    pub fn add_template(
        &mut self,
        draft: NewTemplate,
    ) -> std::result::Result<DocumentTemplate, ValidationError> {
        self.check(&draft)?;
        let id = unique_id(|id| self.state.templates.iter().any(|t| t.base.id == id));
        let template = DocumentTemplate::from_draft(RecordBase::new(id), draft);
        debug!(id = %template.base.id, name = %template.name, "Template added");
        self.state.templates.push(template.clone());
        self.persist();
        Ok(template)
    }

    pub fn update_template(
        &mut self,
        id: &str,
        patch: TemplatePatch,
    ) -> std::result::Result<bool, ValidationError> {
        self.check(&patch)?;
        let Some(template) = self.state.templates.iter_mut().find(|t| t.base.id == id) else {
            return Ok(false);
        };
        template.apply(patch);
        self.persist();
        Ok(true)
    }

    pub fn delete_template(&mut self, id: &str) -> bool {
        let before = self.state.templates.len();
        self.state.templates.retain(|t| t.base.id != id);
        let removed = self.state.templates.len() != before;
        if removed {
            self.drop_favorites_for(id, ItemType::Template);
            self.persist();
        }
        removed
    }

    pub fn get_template(&self, id: &str) -> Option<&DocumentTemplate> {
        self.state.templates.iter().find(|t| t.base.id == id)
    }

    pub fn templates(&self) -> &[DocumentTemplate] {
        &self.state.templates
    }

    pub fn search_templates(&self, query: &str, filters: &Filters) -> Vec<DocumentTemplate> {
        filter_records(&self.state.templates, query, filters)
    }

    /// Count one use of a template and return it as it is after the increment.
    pub fn use_template(&mut self, id: &str) -> Option<DocumentTemplate> {
        let template = self.state.templates.iter_mut().find(|t| t.base.id == id)?;
        template.usage_count += 1;
        let used = template.clone();
        self.persist();
        Some(used)
    }

    pub fn templates_by_category(&self, category: &str) -> Vec<&DocumentTemplate> {
        self.state
            .templates
            .iter()
            .filter(|t| t.category == category)
            .collect()
    }

    /// Delete any record by kind, cascading favorites where applicable.
    pub fn delete(&mut self, kind: RecordKind, id: &str) -> bool {
        match kind {
            RecordKind::LegalText => self.delete_legal_text(id),
            RecordKind::Procedure => self.delete_procedure(id),
            RecordKind::News => self.delete_news(id),
            RecordKind::Template => self.delete_template(id),
            RecordKind::SavedSearch => self.delete_saved_search(id),
        }
    }

    // Search

    /// The substring predicate over the four searchable collections.
    pub fn global_search(&self, query: &str) -> SearchResults {
        self.search_all(query, &Filters::new())
    }

    /// Like [`global_search`](Self::global_search) with field filters applied to every collection.
    pub fn search_all(&self, query: &str, filters: &Filters) -> SearchResults {
        SearchResults {
            legal_texts: self.search_legal_texts(query, filters),
            procedures: self.search_procedures(query, filters),
            news: self.search_news(query, filters),
            templates: self.search_templates(query, filters),
        }
    }

    // Import / export

    /// Pretty-printed export document with the six content collections.
    pub fn export(&self) -> Result<String> {
        let document = ExportDocument {
            legal_texts: &self.state.legal_texts,
            procedures: &self.state.procedures,
            news: &self.state.news,
            saved_searches: &self.state.saved_searches,
            favorites: &self.state.favorites,
            templates: &self.state.templates,
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    /// Replace every collection present in `body`. Nothing changes if it does not parse.
    pub fn import(&mut self, body: &str) -> std::result::Result<CatalogCounts, ImportError> {
        let document: ImportDocument = match serde_json::from_str(body) {
            Ok(document) => document,
            Err(e) => {
                warn!(error = %e, "Import rejected, catalog unchanged");
                return Err(ImportError(e));
            }
        };

        if let Some(legal_texts) = document.legal_texts {
            self.state.legal_texts = legal_texts;
        }
        if let Some(procedures) = document.procedures {
            self.state.procedures = procedures;
        }
        if let Some(news) = document.news {
            self.state.news = news;
        }
        if let Some(saved_searches) = document.saved_searches {
            self.state.saved_searches = saved_searches;
        }
        if let Some(favorites) = document.favorites {
            self.state.favorites = favorites;
        }
        if let Some(templates) = document.templates {
            self.state.templates = templates;
        }
        self.persist();
        Ok(self.counts())
    }
}
