//! Platform glue: spawning futures and timers on the browser event loop or
//! on native runtimes.

use std::future::Future;

#[cfg(target_arch = "wasm32")]
pub fn spawn_future<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_future<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    dioxus::prelude::spawn(future);
}

/// Sleep for `ms` milliseconds. Zero resolves immediately on every target.
pub async fn sleep_ms(ms: u64) {
    if ms == 0 {
        return;
    }

    #[cfg(target_arch = "wasm32")]
    {
        gloo_timers::future::TimeoutFuture::new(ms.min(u32::MAX as u64) as u32).await;
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
    }
}
