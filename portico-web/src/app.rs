//! The yew shell: notices plus the active section, redrawn from the store.

use portico_core::{Notice, NoticeStatus};
use yew::prelude::*;

const fn status_class(status: NoticeStatus) -> &'static str {
    match status {
        NoticeStatus::Info => "is-info",
        NoticeStatus::Success => "is-success",
        NoticeStatus::Warning => "is-warning",
        NoticeStatus::Error => "is-error",
    }
}

#[derive(Properties, Clone, PartialEq)]
pub struct NoticeListProps {
    pub notices: Vec<Notice>,
}

#[function_component(NoticeList)]
pub fn notice_list(props: &NoticeListProps) -> Html {
    if props.notices.is_empty() {
        return Html::default();
    }
    html! {
        <ul class="notices" role="status" aria-live="polite">
            { for props.notices.iter().map(|notice| html! {
                <li key={notice.id.clone()} class={classes!("notice", status_class(notice.status))}>
                    { notice.text.clone() }
                </li>
            }) }
        </ul>
    }
}

#[derive(Properties, Clone, PartialEq)]
pub struct PageViewProps {
    /// Section owning the current route, if any.
    pub section: Option<AttrValue>,
    pub heading: AttrValue,
    pub notices: Vec<Notice>,
    #[prop_or_default]
    pub offline: bool,
}

#[function_component(PageView)]
pub fn page_view(props: &PageViewProps) -> Html {
    let section = props.section.clone().unwrap_or_else(|| AttrValue::from("none"));
    html! {
        <div class={classes!("layout", props.offline.then_some("is-offline"))} data-section={section}>
            <a class="sr-only" href="#main">{ "Skip to content" }</a>
            <NoticeList notices={props.notices.clone()} />
            <main id="main" role="main">
                <h1>{ props.heading.clone() }</h1>
            </main>
        </div>
    }
}

#[cfg(target_arch = "wasm32")]
mod shell {
    use super::PageView;
    use crate::bootstrap::{Bootstrap, LocalStorageToken, builtin_sections};
    use crate::host::BrowserHost;
    use crate::i18n::WebLocaleTarget;
    use portico_core::{
        AppState, BootHandles, ConnectionState, CurrentUser, I18n, Notice, Router, Services,
        Store, run,
    };
    use std::cell::RefCell;
    use std::rc::Rc;
    use yew::prelude::*;
    use yew_router::prelude::*;

    /// Everything the booted app shares with its components.
    #[derive(Clone)]
    pub struct Portal {
        pub services: Services,
        pub store: Store,
        pub router: Rc<RefCell<Router>>,
        pub host: BrowserHost,
        _handles: Rc<BootHandles>,
    }

    impl PartialEq for Portal {
        fn eq(&self, other: &Self) -> bool {
            self.store.ptr_eq(&other.store) && Rc::ptr_eq(&self.router, &other.router)
        }
    }

    impl Portal {
        /// Run the boot sequence against the browser.
        #[must_use]
        pub fn boot(bootstrap: Bootstrap) -> Self {
            let config = crate::paths::resolve_base(bootstrap.config);
            let host = BrowserHost::new(config.router_base());
            let i18n = I18n::new();
            let mut services = Services::new(config, Rc::new(host.clone()))
                .with_i18n(i18n.clone())
                .with_user(CurrentUser::new(bootstrap.user))
                .with_tokens(Rc::new(LocalStorageToken))
                .with_sections(builtin_sections())
                .with_bootstrap_locale(bootstrap.locale_strings);
            services.locale_target = Rc::new(WebLocaleTarget::new(
                i18n,
                Rc::clone(&services.config),
            ));

            let store = Store::default();
            let mut router = services.new_router();
            let handles = run(&services, &store, &mut router);
            Self {
                services,
                store,
                router: Rc::new(RefCell::new(router)),
                host,
                _handles: Rc::new(handles),
            }
        }
    }

    #[hook]
    fn use_store_state(store: &Store) -> AppState {
        let state = use_state(|| store.state());
        {
            let state = state.clone();
            let store = store.clone();
            use_effect_with((), move |()| {
                let id = store.subscribe(move |next| state.set(next.clone()));
                move || {
                    store.unsubscribe(id);
                }
            });
        }
        (*state).clone()
    }

    #[derive(Properties, Clone, PartialEq)]
    pub struct AppProps {
        pub portal: Portal,
    }

    #[function_component(App)]
    pub fn app(props: &AppProps) -> Html {
        let router_base = crate::paths::router_base(&props.portal.services.config).map(AttrValue::from);
        html! {
            <BrowserRouter basename={router_base}>
                <Shell portal={props.portal.clone()} />
            </BrowserRouter>
        }
    }

    #[function_component(Shell)]
    fn shell(props: &AppProps) -> Html {
        crate::routing::use_router_sync(&props.portal);
        let state = use_store_state(&props.portal.store);

        let services = &props.portal.services;
        let section = services
            .sections
            .section_for(&state.route.path)
            .map(|section| AttrValue::from(section.name.clone()));
        let heading = section.clone().unwrap_or_else(|| {
            AttrValue::from(services.i18n.translate("Page not available"))
        });
        let notices: Vec<Notice> = state
            .visible_notices()
            .map(|notice| Notice {
                text: services.i18n.translate(&notice.text),
                ..notice.clone()
            })
            .collect();

        html! {
            <PageView
                section={section}
                heading={heading}
                notices={notices}
                offline={state.connection == ConnectionState::Offline}
            />
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use shell::{App, AppProps, Portal};
