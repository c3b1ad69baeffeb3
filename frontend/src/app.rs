use crate::components::site_editor::{query_param, SiteEditorComponent};
use yew::{html, Component, Context, Html};

/// Query parameter carrying the handle of the site to edit.
const SITE_PARAM: &str = "site";

pub struct App {
    site_path: Option<String>,
}

impl Component for App {
    type Message = ();
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            site_path: query_param(SITE_PARAM),
        }
    }

    fn view(&self, _ctx: &Context<Self>) -> Html {
        html! {
            <div>
                <SiteEditorComponent site_path={self.site_path.clone()} />
            </div>
        }
    }
}
