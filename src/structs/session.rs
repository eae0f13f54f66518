use serde::Serialize;

use crate::models::scheme::SchemeType;
use crate::services::session::EditorSession;
use crate::structs::qr_request::QrRequest;
use crate::structs::render_config::RenderConfigView;

/// Everything the editor needs to redraw after a change.
#[derive(Serialize)]
pub struct SessionResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub scheme: SchemeType,
    pub request: QrRequest,
    pub payload: String,
    pub config: RenderConfigView,
    pub svg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render_error: Option<String>,
}

impl SessionResponse {
    pub fn new(id: &str, session: &EditorSession) -> Self {
        Self {
            id: id.to_string(),
            scheme: session.active_scheme(),
            request: session.request(),
            payload: session.payload().to_string(),
            config: RenderConfigView::from(session.config()),
            svg: session.symbol().map(|symbol| symbol.svg().to_string()),
            render_error: session.render_error().map(String::from),
        }
    }
}
