//! Properties for the `SiteEditorComponent`.

use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct SiteEditorProps {
    /// Opaque handle of the site to load on first render, as accepted by
    /// `GET /api/sites/{filePath}`.
    ///
    /// With `None` the editor shows an empty state; generating a site is not
    /// this component's job.
    #[prop_or_default]
    pub site_path: Option<String>,
}
