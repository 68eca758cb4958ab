use crate::constants::{
    NOTICE_CONNECTION_LOST, NOTICE_CONNECTION_RESTORED, NOTICE_CONNECTION_STATUS,
};
use crate::host::Host;
use crate::store::{Action, ConnectionState, Notice, NoticeStatus, Store};
use std::rc::Rc;

/// Mirrors browser connectivity into the store and posts a status notice
/// whenever it flips.
pub struct ConnectionWatcher;

impl ConnectionWatcher {
    /// Record the initial state and start listening for changes.
    pub fn init(store: &Store, host: &Rc<dyn Host>) {
        let online = host.is_online();
        log::debug!("connectivity watcher starting (online: {online})");
        store.dispatch(Action::ConnectionChanged { online });

        let store = store.clone();
        host.on_connectivity_change(Box::new(move |online| {
            Self::apply(&store, online);
        }));
    }

    fn apply(store: &Store, online: bool) {
        let previous = store.select(|state| state.connection);
        let next = if online {
            ConnectionState::Online
        } else {
            ConnectionState::Offline
        };
        if previous == next {
            return;
        }
        store.dispatch(Action::ConnectionChanged { online });

        let notice = if online {
            log::info!("connection restored");
            Notice::new(
                NOTICE_CONNECTION_STATUS,
                NoticeStatus::Success,
                NOTICE_CONNECTION_RESTORED,
            )
        } else {
            log::warn!("connection lost");
            Notice::new(
                NOTICE_CONNECTION_STATUS,
                NoticeStatus::Warning,
                NOTICE_CONNECTION_LOST,
            )
            .persistent()
        };
        store.dispatch(Action::NoticeCreate { notice });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;

    #[test]
    fn initial_state_has_no_notice() {
        let store = Store::default();
        let host: Rc<dyn Host> = Rc::new(MemoryHost::new());
        ConnectionWatcher::init(&store, &host);
        assert_eq!(store.state().connection, ConnectionState::Online);
        assert!(store.state().notices.is_empty());
    }

    #[test]
    fn flips_post_notices_and_repeats_are_ignored() {
        let store = Store::default();
        let memory = Rc::new(MemoryHost::new());
        let host: Rc<dyn Host> = memory.clone();
        ConnectionWatcher::init(&store, &host);

        memory.set_online(false);
        memory.set_online(false);
        let state = store.state();
        assert_eq!(state.connection, ConnectionState::Offline);
        assert_eq!(state.notices.len(), 1);
        assert_eq!(state.notices[0].status, NoticeStatus::Warning);
        assert!(state.notices[0].persistent);

        memory.set_online(true);
        let state = store.state();
        assert_eq!(state.notices.len(), 1);
        assert_eq!(state.notices[0].status, NoticeStatus::Success);
        assert!(!state.notices[0].persistent);
    }
}
