//! Update function for the site editor component.
//!
//! Elm-style: receives the current `SiteEditorComponent`, the `Context` and a
//! `Msg`, mutates the state and returns whether the view should re-render.
//! Every document change goes through the edit session; this module only
//! translates panel input into edits and talks to the persistence endpoint.
//! User-facing messages are in Spanish.

use gloo_console::warn;
use gloo_net::http::Request;
use yew::platform::spawn_local;
use yew::prelude::*;

use common::editor::{Edit, EditOutcome, EditSession, SessionError, SAVE_STATUS_RESET_MS};
use common::model::editable::ElementKind;
use common::model::service_block::ServiceBlock;
use common::requests::{SaveSiteRequest, SaveSiteResponse};

use crate::tops_sheet::yw_material_top_sheet::{close_top_sheet, open_top_sheet};

use super::helpers::{confirm, download_html, set_window_dirty_flag, show_toast};
use super::messages::{Msg, ServiceField};
use super::state::SiteEditorComponent;
use super::storage::LocalRecoveryStore;

/// Central update function for the component.
///
/// Contract
/// - Mutates `component` based on `msg`.
/// - May dispatch further messages via `ctx.link()` (save completion, status
///   auto-reset).
/// - Returns `true` to re-render the view, `false` when nothing visible changed.
pub fn update(
    component: &mut SiteEditorComponent,
    ctx: &Context<SiteEditorComponent>,
    msg: Msg,
) -> bool {
    match msg {
        Msg::SiteLoaded(site) => {
            let mut session = EditSession::mount(site, LocalRecoveryStore::open());

            if session.pending_recovery().is_some() {
                let resolved = if confirm(
                    "Hay cambios sin guardar de una sesión anterior. ¿Deseas recuperarlos?",
                ) {
                    session.restore_recovery()
                } else {
                    session.discard_recovery()
                };
                if let Err(err) = resolved {
                    warn!(err.to_string());
                }
            }

            let recovered = session.is_dirty();
            component.session = Some(session);
            component.load_error = None;
            clear_selection(component);
            component.invalidate_render();
            set_window_dirty_flag(recovered);

            if recovered {
                show_toast("Cambios recuperados. Recuerda guardar el sitio.");
            } else {
                show_toast("Sitio cargado correctamente.");
            }
            true
        }
        Msg::LoadFailed(reason) => {
            show_toast(&format!("Error cargando el sitio: {}", reason));
            component.load_error = Some(reason);
            true
        }
        Msg::SetTab(tab) => {
            if component.active_tab != tab {
                if let Some(session) = component.session.as_mut() {
                    session.close_panel();
                }
                clear_selection(component);
                component.active_tab = tab;
                component.invalidate_render();
            }
            true
        }
        Msg::SelectElement(id) => {
            let Some(session) = component.session.as_mut() else {
                return false;
            };
            if let Err(err) = session.select_element(&id) {
                warn!(format!("selección ignorada: {}", err));
                return false;
            }

            component.selected = session.selected_element();
            component.draft = match &component.selected {
                Some(element) if element.kind != ElementKind::ServiceContainer => {
                    element.content.clone()
                }
                _ => String::new(),
            };
            component.service_draft = ServiceBlock::default();
            open_top_sheet(component.edit_panel_ref.clone());
            true
        }
        Msg::UpdateDraft(value) => {
            component.draft = value;
            true
        }
        Msg::UpdateServiceDraft(field, value) => {
            let draft = &mut component.service_draft;
            match field {
                ServiceField::Icon => draft.icon = value,
                ServiceField::Title => draft.title = value,
                ServiceField::Description => draft.description = value,
            }
            true
        }
        Msg::ApplyEdit => apply_edit(component),
        Msg::CloseEditPanel => {
            if let Some(session) = component.session.as_mut() {
                session.close_panel();
            }
            clear_selection(component);
            true
        }
        Msg::Undo => {
            let changed = component.session.as_mut().is_some_and(|session| session.undo());
            if changed {
                after_history_move(component);
            }
            changed
        }
        Msg::Redo => {
            let changed = component.session.as_mut().is_some_and(|session| session.redo());
            if changed {
                after_history_move(component);
            }
            changed
        }
        Msg::Reset => {
            let Some(session) = component.session.as_mut() else {
                return false;
            };
            let reset = session.reset(|| {
                confirm("¿Descartar todos los cambios sin guardar y volver a la última versión guardada?")
            });
            if reset {
                clear_selection(component);
                set_window_dirty_flag(false);
                show_toast("Cambios descartados.");
            }
            reset
        }
        Msg::Save => {
            let Some(session) = component.session.as_mut() else {
                return false;
            };
            let request = match session.begin_save() {
                Ok(request) => request,
                Err(SessionError::SaveInProgress) => {
                    show_toast("Ya hay un guardado en curso.");
                    return false;
                }
                Err(err) => {
                    show_toast(&format!("No se puede guardar: {}", err));
                    return false;
                }
            };

            let link = ctx.link().clone();
            spawn_local(async move {
                let result = persist(&request).await;
                link.send_message(Msg::SaveFinished(result));
            });
            true
        }
        Msg::SaveFinished(result) => {
            let Some(session) = component.session.as_mut() else {
                return false;
            };
            let failure = result.as_ref().err().cloned();
            if let Err(err) = session.finish_save(result) {
                warn!(format!("respuesta de guardado inesperada: {}", err));
                return false;
            }

            match failure {
                None => show_toast("Sitio guardado correctamente."),
                Some(reason) => show_toast(&format!("Error al guardar el sitio: {}", reason)),
            }
            set_window_dirty_flag(session.is_dirty());

            let generation = session.save_generation();
            let link = ctx.link().clone();
            spawn_local(async move {
                gloo_timers::future::TimeoutFuture::new(SAVE_STATUS_RESET_MS).await;
                link.send_message(Msg::SettleSaveStatus(generation));
            });
            true
        }
        Msg::SettleSaveStatus(generation) => component
            .session
            .as_mut()
            .is_some_and(|session| session.settle_save_status(generation)),
        Msg::Export => {
            if let Some(session) = &component.session {
                match download_html(session.file_path(), &session.export_document()) {
                    Ok(()) => show_toast("Sitio exportado."),
                    Err(err) => show_toast(&format!("Error al exportar el sitio: {}", err)),
                }
            }
            false
        }
    }
}

fn apply_edit(component: &mut SiteEditorComponent) -> bool {
    let Some(selected) = component.selected.clone() else {
        return false;
    };

    let edit = match selected.kind {
        ElementKind::Text => Edit::Text(component.draft.clone()),
        ElementKind::Image => Edit::Image(component.draft.trim().to_string()),
        ElementKind::BackgroundImage => Edit::BackgroundImage(component.draft.trim().to_string()),
        ElementKind::ServiceContainer => {
            if component.service_draft.is_blank() {
                show_toast("El servicio necesita un título.");
                return false;
            }
            Edit::AppendService(component.service_draft.clone())
        }
    };

    let Some(session) = component.session.as_mut() else {
        return false;
    };
    match session.submit_edit(&selected.id, edit) {
        Ok(EditOutcome::Applied) => {
            set_window_dirty_flag(session.is_dirty());
            if selected.kind == ElementKind::ServiceContainer {
                component.service_draft = ServiceBlock::default();
                show_toast("Servicio añadido.");
            }
            refresh_selection(component);
            true
        }
        Ok(EditOutcome::Unchanged) => {
            show_toast("No hubo cambios en el elemento.");
            false
        }
        Err(err) => {
            warn!(format!("edición ignorada: {}", err));
            false
        }
    }
}

fn after_history_move(component: &mut SiteEditorComponent) {
    set_window_dirty_flag(component.is_dirty());
    refresh_selection(component);
}

/// Re-reads the selected entry from the recomputed catalog and closes the
/// panel when it no longer exists.
fn refresh_selection(component: &mut SiteEditorComponent) {
    let Some(session) = component.session.as_mut() else {
        return;
    };
    if session.selected_element_id().is_none() {
        return;
    }

    let Some(element) = session.selected_element() else {
        session.close_panel();
        clear_selection(component);
        return;
    };
    if element.kind != ElementKind::ServiceContainer {
        component.draft = element.content.clone();
    }
    component.selected = Some(element);
}

fn clear_selection(component: &mut SiteEditorComponent) {
    component.selected = None;
    component.draft.clear();
    component.service_draft = ServiceBlock::default();
    close_top_sheet(component.edit_panel_ref.clone());
}

/// Hands the payload to the persistence endpoint.
async fn persist(request: &SaveSiteRequest) -> Result<SaveSiteResponse, String> {
    let response = Request::post("/api/sites/save")
        .json(request)
        .map_err(|err| err.to_string())?
        .send()
        .await
        .map_err(|err| err.to_string())?;

    if response.status() == 200 {
        response
            .json::<SaveSiteResponse>()
            .await
            .map_err(|err| err.to_string())
    } else {
        Err(response
            .text()
            .await
            .unwrap_or_else(|_| format!("HTTP {}", response.status())))
    }
}
