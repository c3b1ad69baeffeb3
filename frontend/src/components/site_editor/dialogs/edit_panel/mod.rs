use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::html::Scope;
use yew::prelude::*;

use common::model::editable::{EditableElement, ElementKind};

use crate::components::site_editor::helpers::kind_label;
use crate::components::site_editor::messages::ServiceField;
use crate::components::site_editor::{Msg, SiteEditorComponent};
use crate::tops_sheet::yw_material_top_sheet::YwMaterialTopSheet;

const BUTTON_STYLE: &str = "padding:0.5rem 1rem;font-size:1rem;border:none;border-radius:4px;cursor:pointer;";

/// Side sheet with the form for the selected element. "Aplicar" keeps the
/// panel open for follow-up edits, "Listo" applies and closes.
pub fn edit_panel(component: &SiteEditorComponent, link: &Scope<SiteEditorComponent>) -> Html {
    html! {
        <YwMaterialTopSheet node_ref={component.edit_panel_ref.clone()}>
            <div style="position:fixed;top:0;right:0;width:360px;max-width:100vw;height:100vh;background:#fff;box-shadow:-4px 0 16px rgba(0,0,0,0.2);z-index:9999;display:flex;flex-direction:column;padding:24px;box-sizing:border-box;gap:16px;">
                <button
                    onclick={link.callback(|_| Msg::CloseEditPanel)}
                    style="position:absolute;top:16px;right:16px;padding:0.25rem 0.75rem;font-size:1.25rem;background:#fff;border:none;cursor:pointer;"
                >
                    { "✕" }
                </button>
                {
                    match &component.selected {
                        Some(element) => panel_body(component, element, link),
                        None => html! { <span style="color:#666;">{"No hay elemento seleccionado"}</span> },
                    }
                }
            </div>
        </YwMaterialTopSheet>
    }
}

fn panel_body(
    component: &SiteEditorComponent,
    element: &EditableElement,
    link: &Scope<SiteEditorComponent>,
) -> Html {
    let form = match element.kind {
        ElementKind::Text => text_form(component, link),
        ElementKind::Image | ElementKind::BackgroundImage => url_form(component, link),
        ElementKind::ServiceContainer => service_form(component, link),
    };
    let apply_label = if element.kind == ElementKind::ServiceContainer {
        "Añadir servicio"
    } else {
        "Aplicar"
    };

    html! {
        <>
            <div>
                <div style="font-size:0.8rem;text-transform:uppercase;color:#888;">{ kind_label(element.kind) }</div>
                <h3 style="margin:4px 0 0 0;">{ element.display_name.clone() }</h3>
            </div>
            { form }
            <div style="display:flex;gap:8px;margin-top:auto;">
                <button
                    style={format!("{}background:#1976d2;color:#fff;", BUTTON_STYLE)}
                    onclick={link.callback(|_| Msg::ApplyEdit)}
                >
                    { apply_label }
                </button>
                <button
                    style={format!("{}background:#2e7d32;color:#fff;", BUTTON_STYLE)}
                    onclick={link.batch_callback(|_| vec![Msg::ApplyEdit, Msg::CloseEditPanel])}
                >
                    { "Listo" }
                </button>
                <button
                    style={format!("{}background:#eee;color:#333;", BUTTON_STYLE)}
                    onclick={link.callback(|_| Msg::CloseEditPanel)}
                >
                    { "Cancelar" }
                </button>
            </div>
        </>
    }
}

fn text_form(component: &SiteEditorComponent, link: &Scope<SiteEditorComponent>) -> Html {
    html! {
        <textarea
            value={component.draft.clone()}
            rows={6}
            style="width:100%;resize:vertical;font-family:inherit;font-size:1rem;"
            oninput={link.callback(|e: InputEvent| {
                Msg::UpdateDraft(e.target_unchecked_into::<HtmlTextAreaElement>().value())
            })}
        />
    }
}

fn url_form(component: &SiteEditorComponent, link: &Scope<SiteEditorComponent>) -> Html {
    let preview = component.draft.trim().to_string();
    html! {
        <>
            <label style="display:flex;flex-direction:column;gap:4px;">
                {"URL de la imagen"}
                <input
                    type="url"
                    value={component.draft.clone()}
                    oninput={link.callback(|e: InputEvent| {
                        Msg::UpdateDraft(e.target_unchecked_into::<HtmlInputElement>().value())
                    })}
                />
            </label>
            {
                if preview.is_empty() {
                    html! {}
                } else {
                    html! {
                        <img src={preview} alt="Vista previa" style="max-width:100%;max-height:200px;object-fit:contain;border:1px solid #eee;" />
                    }
                }
            }
        </>
    }
}

fn service_form(component: &SiteEditorComponent, link: &Scope<SiteEditorComponent>) -> Html {
    let draft = &component.service_draft;
    html! {
        <>
            { service_input("Icono", &draft.icon, ServiceField::Icon, link) }
            { service_input("Título", &draft.title, ServiceField::Title, link) }
            <label style="display:flex;flex-direction:column;gap:4px;">
                {"Descripción"}
                <textarea
                    value={draft.description.clone()}
                    rows={4}
                    oninput={link.callback(|e: InputEvent| {
                        Msg::UpdateServiceDraft(
                            ServiceField::Description,
                            e.target_unchecked_into::<HtmlTextAreaElement>().value(),
                        )
                    })}
                />
            </label>
        </>
    }
}

fn service_input(
    label: &str,
    value: &str,
    field: ServiceField,
    link: &Scope<SiteEditorComponent>,
) -> Html {
    html! {
        <label style="display:flex;flex-direction:column;gap:4px;">
            { label.to_string() }
            <input
                type="text"
                value={value.to_string()}
                oninput={link.callback(move |e: InputEvent| {
                    Msg::UpdateServiceDraft(field, e.target_unchecked_into::<HtmlInputElement>().value())
                })}
            />
        </label>
    }
}
