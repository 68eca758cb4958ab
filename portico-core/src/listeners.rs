use std::rc::Rc;

/// Handle returned by every `subscribe`-style registration; pass it back to
/// unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Ordered listener registry shared by the store, i18n runtime and current user.
///
/// Callers take a [`snapshot`](Self::snapshot) before notifying so a listener
/// may subscribe, unsubscribe, or dispatch without holding a borrow.
pub(crate) struct Listeners<F: ?Sized> {
    next_id: u64,
    entries: Vec<(SubscriptionId, Rc<F>)>,
}

impl<F: ?Sized> Listeners<F> {
    pub(crate) const fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, listener: Rc<F>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub(crate) fn snapshot(&self) -> Vec<Rc<F>> {
        self.entries.iter().map(|(_, f)| Rc::clone(f)).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
