//! Browser effects: page navigation and the native share sheet.
//!
//! Native builds have no page to leave, so these report `false` and the
//! caller falls back.

/// Reloads the page. Returns `false` where there is no page.
pub fn reload() -> bool {
    #[cfg(target_arch = "wasm32")]
    {
        match web_sys::window().map(|window| window.location().reload()) {
            Some(Ok(())) => true,
            Some(Err(err)) => {
                log::error!("Failed to reload: {err:?}");
                false
            }
            None => false,
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        false
    }
}

/// Navigates to `path` on the current origin. Returns `false` where there is no page.
pub fn redirect(path: &str) -> bool {
    #[cfg(target_arch = "wasm32")]
    {
        match web_sys::window().map(|window| window.location().set_href(path)) {
            Some(Ok(())) => true,
            Some(Err(err)) => {
                log::error!("Failed to redirect to {path}: {err:?}");
                false
            }
            None => false,
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        log::info!("Redirect to {path} requested");
        false
    }
}

/// Whether `navigator.share` exists.
pub fn native_share_available() -> bool {
    #[cfg(target_arch = "wasm32")]
    {
        use web_sys::js_sys::Reflect;

        web_sys::window()
            .map(|window| window.navigator())
            .is_some_and(|navigator| {
                Reflect::has(&navigator, &wasm_bindgen::JsValue::from_str("share")).unwrap_or(false)
            })
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        false
    }
}

/// Opens the share sheet for `url`. The promise result (including the user
/// dismissing the sheet) is only logged.
pub fn native_share(url: &str) {
    #[cfg(target_arch = "wasm32")]
    {
        let Some(window) = web_sys::window() else {
            return;
        };
        let data = web_sys::ShareData::new();
        data.set_url(url);
        let promise = window.navigator().share_with_data(&data);

        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = wasm_bindgen_futures::JsFuture::from(promise).await {
                log::info!("Share dismissed: {err:?}");
            }
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        log::warn!("Native share is not available, ignoring {url}");
    }
}
