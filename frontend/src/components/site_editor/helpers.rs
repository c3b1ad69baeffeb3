//! Browser utilities for the site editor.
//!
//! - **User feedback**: toasts and blocking confirmations.
//! - **Navigation guard**: the global `app_dirty` flag read by the page's
//!   `beforeunload` handler.
//! - **Location**: reading the `?site=` handle.
//! - **Export**: handing a document to the browser as a file download.

use js_sys::{Array, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, HtmlElement, Url, UrlSearchParams};

use common::model::editable::ElementKind;

const TOAST_MS: u32 = 3000;

/// Displays a temporary notification at the bottom of the screen.
///
/// The message is set as text, never parsed as markup, so reasons coming back
/// from the server can be shown as they are.
pub fn show_toast(message: &str) {
    if let Some(window) = web_sys::window() {
        if let Some(document) = window.document() {
            if let (Ok(toast), Some(body)) = (document.create_element("div"), document.body()) {
                toast.set_text_content(Some(message));
                let html_toast: HtmlElement = toast.unchecked_into();
                let style = html_toast.style();
                style.set_property("position", "fixed").ok();
                style.set_property("bottom", "20px").ok();
                style.set_property("left", "50%").ok();
                style.set_property("transform", "translateX(-50%)").ok();
                style.set_property("background", "rgba(0, 0, 0, 0.8)").ok();
                style.set_property("color", "#fff").ok();
                style.set_property("padding", "10px 20px").ok();
                style.set_property("border-radius", "4px").ok();
                style.set_property("z-index", "10000").ok();
                style.set_property("font-family", "Arial, sans-serif").ok();

                if body.append_child(&html_toast).is_ok() {
                    wasm_bindgen_futures::spawn_local(async move {
                        gloo_timers::future::TimeoutFuture::new(TOAST_MS).await;
                        if let Some(parent) = html_toast.parent_node() {
                            parent.remove_child(&html_toast).ok();
                        }
                    });
                }
            }
        }
    }
}

/// Blocking yes/no question. Without a window the answer is no.
pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(message).ok())
        .unwrap_or(false)
}

/// Sets the global `app_dirty` flag consulted before leaving the page.
pub fn set_window_dirty_flag(dirty: bool) {
    if let Some(window) = web_sys::window() {
        let _ = Reflect::set(
            &window,
            &JsValue::from_str("app_dirty"),
            &JsValue::from_bool(dirty),
        );
    }
}

/// Value of `name` in the page's query string.
pub fn query_param(name: &str) -> Option<String> {
    let search = web_sys::window()?.location().search().ok()?;
    UrlSearchParams::new_with_str(&search)
        .ok()?
        .get(name)
        .filter(|value| !value.trim().is_empty())
}

/// Offers `html` as a download named after the last segment of `file_path`.
pub fn download_html(file_path: &str, html: &str) -> Result<(), String> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| "No hay documento disponible".to_string())?;

    let options = BlobPropertyBag::new();
    options.set_type("text/html;charset=utf-8");
    let blob = Blob::new_with_str_sequence_and_options(
        &Array::of1(&JsValue::from_str(html)),
        &options,
    )
    .map_err(|err| format!("{:?}", err))?;
    let url = Url::create_object_url_with_blob(&blob).map_err(|err| format!("{:?}", err))?;

    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(|err| format!("{:?}", err))?
        .unchecked_into();
    anchor.set_href(&url);
    anchor.set_download(&export_file_name(file_path));
    anchor.click();

    Url::revoke_object_url(&url).map_err(|err| format!("{:?}", err))
}

fn export_file_name(file_path: &str) -> String {
    match file_path.rsplit('/').next() {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => "sitio.html".to_string(),
    }
}

/// Label shown in the edit panel header.
pub fn kind_label(kind: ElementKind) -> &'static str {
    match kind {
        ElementKind::Text => "Texto",
        ElementKind::Image => "Imagen",
        ElementKind::BackgroundImage => "Imagen de fondo",
        ElementKind::ServiceContainer => "Servicios",
    }
}
