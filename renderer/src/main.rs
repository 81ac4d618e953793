//! Overlay renderer loaded inside the alternative's page when the results
//! viewer opens it in an iframe (`?nab-result=true`).

#[cfg(any(target_arch = "wasm32", test))]
mod session;

#[cfg(target_arch = "wasm32")]
mod dom;

#[cfg(target_arch = "wasm32")]
fn main() {
    let _ = dioxus::logger::init(dioxus::logger::tracing::Level::INFO);
    dom::start();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("the heatmap overlay renderer only runs in the browser (wasm32 target)");
}
