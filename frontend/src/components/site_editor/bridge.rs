//! Sandbox rendering and click selection.
//!
//! The working document is written wholesale into a sandboxed iframe on every
//! revision; nothing in the sandbox is patched in place. After the write, each
//! catalog entry is resolved against the fresh DOM through `SandboxTree` and
//! the resolved elements get an affordance class and a click listener.
//!
//! The iframe carries `sandbox="allow-same-origin"`: the parent can reach into
//! the document, the generated page's own scripts never run.

use common::editor::bridge::{bind_catalog, needs_navigation_guard};
use common::editor::dom::LiveTree;
use common::editor::Catalog;
use js_sys::Array;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, HtmlCollection, HtmlDocument, HtmlIFrameElement};
use yew::Callback;

pub const SANDBOX_POLICY: &str = "allow-same-origin";

const AFFORDANCE_STYLE_ID: &str = "site-editor-affordances";

const AFFORDANCE_STYLES: &str = r#"
.editable-text, .editable-image, .editable-background, .editable-services {
    cursor: pointer;
    outline-offset: 2px;
    transition: outline-color 0.15s ease-in-out;
}
.editable-text:hover { outline: 2px dashed #1976d2; }
.editable-image:hover { outline: 2px dashed #43a047; }
.editable-background:hover { outline: 2px dashed #fb8c00; }
.editable-services:hover { outline: 2px dashed #8e24aa; }
"#;

/// `LiveTree` over the sandbox document.
pub struct SandboxTree {
    document: Document,
}

impl SandboxTree {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl LiveTree for SandboxTree {
    type Element = Element;

    fn document_element(&self) -> Option<Element> {
        self.document.document_element()
    }

    fn parent_element(&self, element: &Element) -> Option<Element> {
        element.parent_element()
    }

    fn child_elements(&self, element: &Element) -> Vec<Element> {
        collect(element.children())
    }

    fn preceding_sibling_elements(&self, element: &Element) -> Vec<Element> {
        let mut siblings = Vec::new();
        let mut current = element.previous_element_sibling();
        while let Some(sibling) = current {
            current = sibling.previous_element_sibling();
            siblings.push(sibling);
        }
        siblings
    }

    fn tag_name(&self, element: &Element) -> String {
        element.local_name().to_ascii_lowercase()
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn text_content(&self, element: &Element) -> String {
        element.text_content().unwrap_or_default()
    }

    fn elements_by_tag(&self, tag: &str) -> Vec<Element> {
        collect(self.document.get_elements_by_tag_name(tag))
    }

    fn query_selector(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }
}

fn collect(collection: HtmlCollection) -> Vec<Element> {
    (0..collection.length())
        .filter_map(|index| collection.item(index))
        .collect()
}

/// Keeps the listeners of the current render alive until the next one.
#[derive(Default)]
pub struct SandboxBridge {
    listeners: Vec<Closure<dyn FnMut(Event)>>,
}

impl SandboxBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrites the sandbox with `document` and wires selection for every
    /// entry of `catalog` that resolves. Returns the number of interactive
    /// elements.
    pub fn render(
        &mut self,
        iframe: &HtmlIFrameElement,
        document: &str,
        catalog: &Catalog,
        on_select: Callback<String>,
    ) -> Result<usize, String> {
        let sandbox: HtmlDocument = iframe
            .content_document()
            .ok_or_else(|| "La vista previa no tiene documento".to_string())?
            .dyn_into()
            .map_err(|_| "La vista previa no es un documento HTML".to_string())?;

        sandbox.open().map_err(js_error)?;
        sandbox
            .write(&Array::of1(&JsValue::from_str(document)))
            .map_err(js_error)?;
        sandbox.close().map_err(js_error)?;
        self.listeners.clear();

        let sandbox: Document = sandbox.into();
        let tree = SandboxTree::new(sandbox.clone());
        let bindings = bind_catalog(&tree, catalog);

        for binding in &bindings {
            binding
                .element
                .class_list()
                .add_1(binding.affordance_class())
                .map_err(js_error)?;

            let element_id = binding.element_id.clone();
            let on_select = on_select.clone();
            let listener = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                event.prevent_default();
                event.stop_propagation();
                on_select.emit(element_id.clone());
            });
            binding
                .element
                .add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())
                .map_err(js_error)?;
            self.listeners.push(listener);
        }

        if needs_navigation_guard(&bindings) {
            self.guard(&sandbox, "click")?;
        }
        self.guard(&sandbox, "submit")?;
        inject_affordance_styles(&sandbox)?;

        Ok(bindings.len())
    }

    /// Capturing listener cancelling the default action of `event_type`.
    fn guard(&mut self, sandbox: &Document, event_type: &str) -> Result<(), String> {
        let listener = Closure::<dyn FnMut(Event)>::new(|event: Event| event.prevent_default());
        sandbox
            .add_event_listener_with_callback_and_bool(
                event_type,
                listener.as_ref().unchecked_ref(),
                true,
            )
            .map_err(js_error)?;
        self.listeners.push(listener);
        Ok(())
    }
}

fn inject_affordance_styles(sandbox: &Document) -> Result<(), String> {
    if sandbox.get_element_by_id(AFFORDANCE_STYLE_ID).is_some() {
        return Ok(());
    }
    let style = sandbox.create_element("style").map_err(js_error)?;
    style.set_id(AFFORDANCE_STYLE_ID);
    style.set_text_content(Some(AFFORDANCE_STYLES));

    let parent: Element = match sandbox.head() {
        Some(head) => head.into(),
        None => sandbox
            .document_element()
            .ok_or_else(|| "La vista previa está vacía".to_string())?,
    };
    parent.append_child(&style).map_err(js_error)?;
    Ok(())
}

fn js_error(err: JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}
