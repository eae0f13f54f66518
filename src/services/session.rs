use crate::error::AppError;
use crate::models::history_item::NewHistoryEntry;
use crate::models::scheme::SchemeType;
use crate::services::logo::Logo;
use crate::services::payload;
use crate::services::renderer::{RenderedSymbol, render};
use crate::structs::qr_request::QrRequest;
use crate::structs::render_config::{ConfigUpdate, RenderConfig};

const NAME_PREVIEW_CHARS: usize = 40;

/// Stored form fields for every scheme. Switching the active scheme keeps the
/// others around so they can be edited again later.
#[derive(Debug, Clone)]
struct FormState {
    forms: Vec<QrRequest>,
}

impl Default for FormState {
    fn default() -> Self {
        let forms = [
            SchemeType::Url,
            SchemeType::Text,
            SchemeType::Wifi,
            SchemeType::Vcard,
            SchemeType::Sms,
            SchemeType::Email,
        ]
        .into_iter()
        .map(QrRequest::empty)
        .collect();
        Self { forms }
    }
}

impl FormState {
    fn get(&self, scheme: SchemeType) -> QrRequest {
        self.forms
            .iter()
            .find(|form| form.scheme() == scheme)
            .cloned()
            .unwrap_or_else(|| QrRequest::empty(scheme))
    }

    fn set(&mut self, request: QrRequest) {
        let scheme = request.scheme();
        match self.forms.iter_mut().find(|form| form.scheme() == scheme) {
            Some(slot) => *slot = request,
            None => self.forms.push(request),
        }
    }
}

/// One user's editing state: active request, render settings, and the
/// symbol derived from them. Payload and symbol are recomputed after every
/// change, never edited directly.
#[derive(Debug, Clone)]
pub struct EditorSession {
    forms: FormState,
    active: SchemeType,
    config: RenderConfig,
    payload: String,
    symbol: Option<RenderedSymbol>,
    render_error: Option<String>,
}

impl Default for EditorSession {
    fn default() -> Self {
        let mut session = Self {
            forms: FormState::default(),
            active: SchemeType::Url,
            config: RenderConfig::default(),
            payload: String::new(),
            symbol: None,
            render_error: None,
        };
        session.refresh();
        session
    }
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_scheme(&self) -> SchemeType {
        self.active
    }

    pub fn request(&self) -> QrRequest {
        self.forms.get(self.active)
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn symbol(&self) -> Option<&RenderedSymbol> {
        self.symbol.as_ref()
    }

    /// Why the last render produced no symbol, if it didn't.
    pub fn render_error(&self) -> Option<&str> {
        self.render_error.as_deref()
    }

    /// Store the request's fields and make its scheme the active one.
    pub fn apply_request(&mut self, request: QrRequest) {
        self.active = request.scheme();
        self.forms.set(request);
        self.refresh();
    }

    pub fn switch_scheme(&mut self, scheme: SchemeType) {
        self.active = scheme;
        self.refresh();
    }

    /// Blank out the active scheme's fields.
    pub fn clear_active(&mut self) {
        self.forms.set(QrRequest::empty(self.active));
        self.refresh();
    }

    pub fn update_config(&mut self, update: ConfigUpdate) -> Result<(), AppError> {
        self.config.apply(update)?;
        self.refresh();
        Ok(())
    }

    pub fn reset_config(&mut self) {
        self.config.reset();
        self.refresh();
    }

    pub fn set_logo(&mut self, logo: Logo) {
        self.config.set_logo(logo);
        self.refresh();
    }

    pub fn clear_logo(&mut self) {
        self.config.clear_logo();
        self.refresh();
    }

    /// Snapshot of what a history store records for this session.
    pub fn history_entry(&self, name: Option<String>) -> NewHistoryEntry {
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| default_name(&self.payload));
        NewHistoryEntry {
            scheme: self.active,
            payload: self.payload.clone(),
            name,
            foreground: self.config.foreground.clone(),
            background: self.config.background.clone(),
            level: self.config.level,
        }
    }

    fn refresh(&mut self) {
        self.payload = payload::build(&self.request());
        match render(&self.payload, &self.config) {
            Ok(symbol) => {
                self.symbol = Some(symbol);
                self.render_error = None;
            }
            Err(e) => {
                log::warn!("Could not render {} payload: {}", self.active.as_str(), e);
                self.symbol = None;
                self.render_error = Some(e.to_string());
            }
        }
    }
}

fn default_name(payload: &str) -> String {
    let first_line = payload.lines().next().unwrap_or("").trim();
    let preview: String = first_line.chars().take(NAME_PREVIEW_CHARS).collect();
    if preview.is_empty() {
        "Untitled".to_string()
    } else {
        preview
    }
}
