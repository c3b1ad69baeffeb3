//! View rendering for the site editor component.
//!
//! Two tabs: "Editor" (the sandboxed live page plus the edit panel) and
//! "HTML" (the exported source, read only). The toolbar carries history,
//! reset, save and export actions and shows the save status.
//!
//! The sandbox iframe is rendered empty here; its content is written by the
//! bridge from `rendered`, never through the virtual DOM.

use common::editor::SaveStatus;
use yew::html::Scope;
use yew::prelude::*;

use super::bridge::SANDBOX_POLICY;
use super::dialogs::edit_panel::edit_panel;
use super::messages::Msg;
use super::state::SiteEditorComponent;

pub fn view(component: &SiteEditorComponent, ctx: &Context<SiteEditorComponent>) -> Html {
    let link = ctx.link();

    if component.session.is_none() {
        return build_empty_state(component, ctx.props().site_path.is_some());
    }

    html! {
        <div
            class="site-editor-root"
            tabindex="0"
            onkeydown={link.batch_callback(|e: KeyboardEvent| {
                if e.ctrl_key() && e.key() == "z" {
                    vec![Msg::Undo]
                } else if e.ctrl_key() && e.key() == "y" {
                    vec![Msg::Redo]
                } else if e.ctrl_key() && e.key() == "s" {
                    e.prevent_default();
                    vec![Msg::Save]
                } else {
                    vec![]
                }
            })}
        >
            { build_toolbar(component, link) }
            { build_tab_bar(component, link) }

            {
                if component.active_tab == "editor" {
                    build_editor_tab(component, link)
                } else {
                    build_source_tab(component)
                }
            }
        </div>
    }
}

fn build_empty_state(component: &SiteEditorComponent, requested: bool) -> Html {
    let message = match &component.load_error {
        Some(reason) => format!("No se pudo cargar el sitio: {}", reason),
        None if requested => "Cargando sitio...".to_string(),
        None => "No hay sitio seleccionado.".to_string(),
    };
    html! {
        <div class="site-editor-empty" style="padding:48px;text-align:center;color:#666;">
            { message }
        </div>
    }
}

fn build_toolbar(component: &SiteEditorComponent, link: &Scope<SiteEditorComponent>) -> Html {
    let (can_undo, can_redo, saving) = component
        .session
        .as_ref()
        .map(|session| {
            (
                session.can_undo(),
                session.can_redo(),
                *session.save_status() == SaveStatus::Saving,
            )
        })
        .unwrap_or_default();

    html! {
        <div class="icon-toolbar">
            { icon_button("undo", "Deshacer", link.callback(|_| Msg::Undo), !can_undo) }
            { icon_button("redo", "Rehacer", link.callback(|_| Msg::Redo), !can_redo) }
            { icon_button("restart_alt", "Restablecer", link.callback(|_| Msg::Reset), false) }
            { icon_button("save", "Guardar", link.callback(|_| Msg::Save), saving) }
            { icon_button("download", "Exportar", link.callback(|_| Msg::Export), false) }
            { save_status_badge(component) }
        </div>
    }
}

fn save_status_badge(component: &SiteEditorComponent) -> Html {
    let Some(session) = &component.session else {
        return html! {};
    };
    let (label, color) = match session.save_status() {
        SaveStatus::Idle => return html! {},
        SaveStatus::Saving => ("Guardando...".to_string(), "#1976d2"),
        SaveStatus::Success => ("Guardado".to_string(), "#2e7d32"),
        SaveStatus::Error(reason) => (format!("Error: {}", reason), "#d32f2f"),
    };
    html! {
        <span class="save-status" style={format!("margin-left:12px;align-self:center;color:{};font-size:0.9rem;", color)}>
            { label }
        </span>
    }
}

/// Tab bar; a red dot on "Editor" marks unsaved changes.
fn build_tab_bar(component: &SiteEditorComponent, link: &Scope<SiteEditorComponent>) -> Html {
    html! {
        <div class="tab-bar">
            <button
                class={classes!("tab-btn", if component.active_tab == "editor" { "active" } else { "" })}
                onclick={link.callback(|_| Msg::SetTab("editor".to_string()))}
                style="position: relative;"
            >
                {"Editor"}
                {
                    if component.is_dirty() {
                        html! {
                            <span
                                title="Cambios sin guardar"
                                style="
                                        position: absolute;
                                        top: 4px;
                                        right: 6px;
                                        width: 8px;
                                        height: 8px;
                                        background: #e53935;
                                        border-radius: 50%;
                                        display: inline-block;
                                        vertical-align: middle;
                                    "
                            />
                        }
                    } else {
                        html! {}
                    }
                }
            </button>
            <button
                class={classes!("tab-btn", if component.active_tab == "html" { "active" } else { "" })}
                onclick={link.callback(|_| Msg::SetTab("html".to_string()))}
            >
                {"HTML"}
            </button>
        </div>
    }
}

fn build_editor_tab(component: &SiteEditorComponent, link: &Scope<SiteEditorComponent>) -> Html {
    html! {
        <>
            <iframe
                ref={component.sandbox_ref.clone()}
                class="site-sandbox"
                title="Vista previa del sitio"
                sandbox={SANDBOX_POLICY}
                style="width:100%;height:calc(100vh - 140px);border:1px solid #ddd;border-radius:4px;background:#fff;"
            />
            { edit_panel(component, link) }
        </>
    }
}

fn build_source_tab(component: &SiteEditorComponent) -> Html {
    let source = component
        .session
        .as_ref()
        .map(|session| session.export_document())
        .unwrap_or_default();
    html! {
        <pre
            class="site-source"
            style="white-space:pre-wrap;word-break:break-all;font-size:12px;font-family:monospace;background:#fafafa;padding:12px;max-height:calc(100vh - 140px);overflow:auto;"
        >
            { source }
        </pre>
    }
}

/// Renders a toolbar button with a Material icon and a label.
fn icon_button(icon_name: &str, label: &str, on_click: Callback<MouseEvent>, disabled: bool) -> Html {
    html! {
        <button class="icon-btn" onclick={on_click} disabled={disabled}>
            <i class="material-icons">{icon_name}</i>
            <span class="icon-label">{label}</span>
        </button>
    }
}
