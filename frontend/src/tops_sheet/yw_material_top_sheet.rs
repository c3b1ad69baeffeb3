use gloo_timers::callback::Timeout;
use uuid::Uuid;
use web_sys::HtmlElement;
use yew::{html, Component, Context, Html, NodeRef, Properties};

/// Class toggled on the sheet container; the page stylesheet animates it in.
const SHOWN_CLASS: &str = "show";

/// Delay before toggling, so a sheet rendered in the same pass can animate.
const TOGGLE_DELAY_MS: u32 = 50;

pub struct YwMaterialTopSheet {
    pub id: String,
}

#[derive(Properties, PartialEq)]
pub struct Props {
    #[prop_or_default]
    pub children: Html,
    pub node_ref: NodeRef,
}

impl Component for YwMaterialTopSheet {
    type Message = ();
    type Properties = Props;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            id: format!("id-{}", Uuid::new_v4()),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="top-sheet" id={self.id.clone()} ref={ctx.props().node_ref.clone()}>
                { ctx.props().children.clone() }
            </div>
        }
    }
}

pub fn open_top_sheet(top_sheet_ref: NodeRef) {
    set_shown(top_sheet_ref, true);
}

pub fn close_top_sheet(top_sheet_ref: NodeRef) {
    set_shown(top_sheet_ref, false);
}

fn set_shown(top_sheet_ref: NodeRef, shown: bool) {
    if let Some(top_sheet) = top_sheet_ref.cast::<HtmlElement>() {
        Timeout::new(TOGGLE_DELAY_MS, move || {
            let classes = top_sheet.class_list();
            let _ = if shown {
                classes.add_1(SHOWN_CLASS)
            } else {
                classes.remove_1(SHOWN_CLASS)
            };
        })
        .forget();
    }
}
