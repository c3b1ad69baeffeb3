use common::model::site::GeneratedSite;
use common::requests::SaveSiteResponse;

/// Field of the service block form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceField {
    Icon,
    Title,
    Description,
}

pub enum Msg {
    SiteLoaded(GeneratedSite),
    LoadFailed(String),
    SetTab(String),
    SelectElement(String),
    UpdateDraft(String),
    UpdateServiceDraft(ServiceField, String),
    ApplyEdit,
    CloseEditPanel,
    Undo,
    Redo,
    Reset,
    Save,
    SaveFinished(Result<SaveSiteResponse, String>),
    /// Carries the save generation that started the timer.
    SettleSaveStatus(u64),
    Export,
}
