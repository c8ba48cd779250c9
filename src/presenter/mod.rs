//! Modal presenter: one dialog at a time, one choice per dialog.

mod render;
mod scripted;
mod terminal;

pub use render::render;
pub use scripted::ScriptedSurface;
pub use terminal::TerminalSurface;

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::entity::ItemType;

/// Values typed into a dialog's form fields, by field name
pub type FormInput = BTreeMap<String, String>;

/// A catalog item an "open" action points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRef {
    pub item_type: ItemType,
    pub id: String,
    pub title: String,
}

/// What an action button means to the workflow that offered it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKey {
    Download,
    DownloadGuide,
    Share,
    CopyLink,
    AddToFavorites,
    SaveSearch,
    Open(ItemRef),
    Submit,
    Confirm,
    Cancel,
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub key: ActionKey,
    pub label: String,
}

impl Action {
    pub fn new(key: ActionKey, label: impl Into<String>) -> Self {
        Self {
            key,
            label: label.into(),
        }
    }

    pub fn close() -> Self {
        Self::new(ActionKey::Close, "Close")
    }
}

/// A piece of dialog content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading(String),
    Paragraph(String),
    /// A labelled value, e.g. `Status: published`
    Fact(String, String),
    /// One entry of a bulleted list
    Item(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub value: String,
}

impl FormField {
    pub fn new(name: &str, label: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dialog {
    pub title: String,
    pub body: Vec<Block>,
    pub fields: Vec<FormField>,
    pub actions: Vec<Action>,
}

impl Dialog {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn heading(mut self, text: impl Into<String>) -> Self {
        self.body.push(Block::Heading(text.into()));
        self
    }

    pub fn paragraph(mut self, text: impl Into<String>) -> Self {
        self.body.push(Block::Paragraph(text.into()));
        self
    }

    pub fn fact(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.body.push(Block::Fact(label.into(), value.into()));
        self
    }

    pub fn item(mut self, text: impl Into<String>) -> Self {
        self.body.push(Block::Item(text.into()));
        self
    }

    pub fn field(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn action(mut self, key: ActionKey, label: impl Into<String>) -> Self {
        self.actions.push(Action::new(key, label));
        self
    }

    pub fn offers(&self, key: &ActionKey) -> bool {
        self.actions.iter().any(|a| &a.key == key)
    }

    /// Form values the user left untouched keep their prefilled value.
    pub fn merge_input(&self, input: &FormInput) -> FormInput {
        self.fields
            .iter()
            .map(|f| {
                let value = input.get(&f.name).cloned().unwrap_or_else(|| f.value.clone());
                (f.name.clone(), value)
            })
            .collect()
    }
}

/// How a dialog was closed without choosing an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    /// Clicked outside the dialog
    Outside,
    /// The explicit close control
    CloseControl,
    /// No interactive user is attached
    NoUser,
}

/// The single outcome of presenting a dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Selected { action: ActionKey, input: FormInput },
    Dismissed(DismissReason),
}

impl Choice {
    pub fn select(action: ActionKey) -> Self {
        Choice::Selected {
            action,
            input: FormInput::new(),
        }
    }

    /// Select `Submit` with the given form values.
    pub fn submit<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Choice::Selected {
            action: ActionKey::Submit,
            input: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn dismissed() -> Self {
        Choice::Dismissed(DismissReason::CloseControl)
    }

    pub fn action(&self) -> Option<&ActionKey> {
        match self {
            Choice::Selected { action, .. } => Some(action),
            Choice::Dismissed(_) => None,
        }
    }
}

/// Where dialogs are actually shown
pub trait Surface {
    /// Show `dialog` and block until the user picks an action or dismisses it.
    fn show(&mut self, dialog: &Dialog) -> Choice;

    /// Drop everything the surface holds for the current dialog.
    fn release(&mut self) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ModalState {
    Closed,
    Open { title: String },
}

/// Owns the surface and enforces at most one live dialog.
pub struct ModalPresenter {
    surface: Box<dyn Surface>,
    state: ModalState,
    shown: u64,
}

impl ModalPresenter {
    pub fn new(surface: Box<dyn Surface>) -> Self {
        Self {
            surface,
            state: ModalState::Closed,
            shown: 0,
        }
    }

    /// Present `dialog` and return the user's choice.
    ///
    /// The surface is released before this returns, whatever the exit path, so the
    /// caller acts on the choice with no dialog open. A choice naming an action the
    /// dialog does not offer is treated as a dismissal.
    pub fn present(&mut self, dialog: Dialog) -> Choice {
        if let ModalState::Open { title } = &self.state {
            debug!(replaced = %title, "Replacing open dialog");
            self.surface.release();
        }
        self.state = ModalState::Open {
            title: dialog.title.clone(),
        };
        self.shown += 1;
        debug!(title = %dialog.title, actions = dialog.actions.len(), "Presenting dialog");

        let choice = match self.surface.show(&dialog) {
            Choice::Selected { action, .. } if !dialog.offers(&action) => {
                warn!(title = %dialog.title, ?action, "Surface chose an action the dialog does not offer");
                Choice::Dismissed(DismissReason::CloseControl)
            }
            Choice::Selected { action, input } => Choice::Selected {
                input: dialog.merge_input(&input),
                action,
            },
            dismissed => dismissed,
        };

        self.surface.release();
        self.state = ModalState::Closed;
        choice
    }

    pub fn is_open(&self) -> bool {
        self.state != ModalState::Closed
    }

    /// Number of dialogs presented so far
    pub fn shown(&self) -> u64 {
        self.shown
    }
}
