#![forbid(unsafe_code)]
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod app;
pub mod bootstrap;
pub mod dom;
#[cfg(target_arch = "wasm32")]
pub mod host;
pub mod i18n;
pub mod paths;
pub mod routing;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());

    let portal = app::Portal::boot(bootstrap::Bootstrap::from_window());
    yew::Renderer::<app::App>::with_props(app::AppProps { portal }).render();
}
