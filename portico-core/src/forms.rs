use crate::constants::UNSAVED_FORM_PROMPT;
use crate::context::Context;
use crate::host::Host;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

/// Decides whether the page behind `ctx` may be left.
pub trait FormGuard {
    fn allow_leave(&self, ctx: &Context) -> bool;
}

/// Tracks forms with unsaved edits and asks before navigating away from them.
#[derive(Clone)]
pub struct ProtectedForms {
    host: Rc<dyn Host>,
    changed: Rc<RefCell<BTreeSet<String>>>,
}

impl ProtectedForms {
    #[must_use]
    pub fn new(host: Rc<dyn Host>) -> Self {
        Self {
            host,
            changed: Rc::new(RefCell::new(BTreeSet::new())),
        }
    }

    pub fn mark_changed(&self, form_id: &str) {
        self.changed.borrow_mut().insert(form_id.to_string());
    }

    pub fn mark_saved(&self, form_id: &str) {
        self.changed.borrow_mut().remove(form_id);
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.changed.borrow().is_empty()
    }
}

impl FormGuard for ProtectedForms {
    fn allow_leave(&self, ctx: &Context) -> bool {
        if !self.has_changes() {
            return true;
        }
        if self.host.confirm(UNSAVED_FORM_PROMPT) {
            self.changed.borrow_mut().clear();
            return true;
        }
        self.host.restore_url(&ctx.canonical_path);
        false
    }
}

impl fmt::Debug for ProtectedForms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtectedForms")
            .field("changed", &self.changed.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostEvent, MemoryHost};

    #[test]
    fn clean_forms_leave_without_prompt() {
        let host = Rc::new(MemoryHost::new());
        let forms = ProtectedForms::new(host.clone());
        assert!(forms.allow_leave(&Context::new("/editor", "")));
        assert!(host.events().is_empty());
    }

    #[test]
    fn confirmed_leave_clears_changes() {
        let host = Rc::new(MemoryHost::new());
        let forms = ProtectedForms::new(host.clone());
        forms.mark_changed("post");
        assert!(forms.allow_leave(&Context::new("/editor", "")));
        assert!(!forms.has_changes());
    }

    #[test]
    fn cancelled_leave_restores_url() {
        let host = Rc::new(MemoryHost::new());
        host.set_confirm_answer(false);
        let forms = ProtectedForms::new(host.clone());
        forms.mark_changed("post");
        assert!(!forms.allow_leave(&Context::new("/editor?id=4", "")));
        assert!(forms.has_changes());
        assert_eq!(
            host.events().last(),
            Some(&HostEvent::UrlRestored("/editor?id=4".into()))
        );

        forms.mark_saved("post");
        assert!(forms.allow_leave(&Context::new("/editor?id=4", "")));
    }
}
