//! Site editor: root module wiring the Yew `Component` implementation with
//! submodules for state, update logic, view rendering and the sandbox bridge.
//!
//! Responsibilities
//! - Re-export selected types (`Msg`, `SiteEditorProps`, `SiteEditorComponent`).
//! - Provide the `Component` implementation that delegates to `update::update`
//!   and `view::view`.
//! - On first render, load the site named by the `site_path` prop.
//! - After every render, rewrite the sandbox when the session revision moved
//!   or the iframe was remounted.

use gloo_console::{error, log};
use gloo_net::http::Request;
use web_sys::HtmlIFrameElement;
use yew::platform::spawn_local;
use yew::prelude::*;

use common::model::site::GeneratedSite;

mod bridge;
mod dialogs;
mod helpers;
mod messages;
mod props;
mod state;
mod storage;
mod update;
mod view;

use helpers::show_toast;
pub use helpers::query_param;
pub use messages::Msg;
pub use props::SiteEditorProps;
pub use state::SiteEditorComponent;

impl Component for SiteEditorComponent {
    type Message = Msg;
    type Properties = SiteEditorProps;

    fn create(_ctx: &Context<Self>) -> Self {
        SiteEditorComponent::new()
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        update::update(self, ctx, msg)
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        view::view(self, ctx)
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        if first_render && !self.loaded {
            self.loaded = true;

            match &ctx.props().site_path {
                Some(site_path) => load_site(ctx.link().clone(), site_path.clone()),
                None => show_toast("No se indicó ningún sitio. Abre el editor con ?site=<ruta>."),
            }
        }

        self.render_sandbox(ctx);
    }
}

impl SiteEditorComponent {
    fn render_sandbox(&mut self, ctx: &Context<Self>) {
        if self.active_tab != "editor" {
            return;
        }
        let Some(frame) = self.sandbox_ref.cast::<HtmlIFrameElement>() else {
            return;
        };
        if !self.needs_render(&frame) {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let on_select = ctx.link().callback(Msg::SelectElement);
        let (document, catalog) = session.view();
        match self.bridge.render(&frame, document, catalog, on_select) {
            Ok(bound) => log!(format!(
                "vista previa actualizada: {} de {} elementos editables",
                bound,
                catalog.len()
            )),
            Err(err) => {
                error!(format!("no se pudo escribir la vista previa: {}", err));
                show_toast("No se pudo mostrar la vista previa del sitio.");
            }
        }

        self.rendered_revision = Some(session.revision());
        self.rendered_frame = Some(frame);
    }
}

fn load_site(link: yew::html::Scope<SiteEditorComponent>, site_path: String) {
    spawn_local(async move {
        let url = format!("/api/sites/{}", String::from(js_sys::encode_uri(&site_path)));
        match Request::get(&url).send().await {
            Ok(response) if response.status() == 200 => {
                match response.json::<GeneratedSite>().await {
                    Ok(site) => link.send_message(Msg::SiteLoaded(site)),
                    Err(err) => link.send_message(Msg::LoadFailed(err.to_string())),
                }
            }
            Ok(response) => {
                let reason = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("HTTP {}", response.status()));
                link.send_message(Msg::LoadFailed(reason));
            }
            Err(err) => link.send_message(Msg::LoadFailed(err.to_string())),
        }
    });
}
