use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::{Choice, Dialog, Surface};

#[derive(Default)]
struct Script {
    replies: VecDeque<Choice>,
    shown: Vec<Dialog>,
    live: usize,
    peak_live: usize,
}

/// A surface that answers from a prepared queue of choices and records what it showed.
///
/// Clones share the same script, so a test can keep a handle after handing one to the
/// presenter. Once the queue runs dry every dialog is dismissed.
#[derive(Clone, Default)]
pub struct ScriptedSurface {
    script: Rc<RefCell<Script>>,
}

impl ScriptedSurface {
    pub fn new(replies: impl IntoIterator<Item = Choice>) -> Self {
        let surface = Self::default();
        surface.script.borrow_mut().replies.extend(replies);
        surface
    }

    /// Queue the reply to a later dialog.
    pub fn push(&self, reply: Choice) {
        self.script.borrow_mut().replies.push_back(reply);
    }

    /// Every dialog shown so far, oldest first.
    pub fn shown(&self) -> Vec<Dialog> {
        self.script.borrow().shown.clone()
    }

    pub fn last(&self) -> Option<Dialog> {
        self.script.borrow().shown.last().cloned()
    }

    /// Dialogs currently held by the surface
    pub fn live(&self) -> usize {
        self.script.borrow().live
    }

    /// Most dialogs ever held at once
    pub fn peak_live(&self) -> usize {
        self.script.borrow().peak_live
    }

    pub fn pending_replies(&self) -> usize {
        self.script.borrow().replies.len()
    }
}

impl Surface for ScriptedSurface {
    fn show(&mut self, dialog: &Dialog) -> Choice {
        let mut script = self.script.borrow_mut();
        script.shown.push(dialog.clone());
        script.live += 1;
        script.peak_live = script.peak_live.max(script.live);
        script.replies.pop_front().unwrap_or_else(Choice::dismissed)
    }

    fn release(&mut self) {
        self.script.borrow_mut().live = 0;
    }
}
