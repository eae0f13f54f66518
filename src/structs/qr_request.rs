use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::scheme::SchemeType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WifiEncryption {
    #[default]
    #[serde(rename = "WPA")]
    Wpa,
    #[serde(rename = "WEP")]
    Wep,
    #[serde(rename = "none", alias = "nopass")]
    None,
}

impl WifiEncryption {
    /// Token used in the `T:` field of a WiFi payload.
    pub fn token(&self) -> &'static str {
        match self {
            WifiEncryption::Wpa => "WPA",
            WifiEncryption::Wep => "WEP",
            WifiEncryption::None => "nopass",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "WPA" => Some(WifiEncryption::Wpa),
            "WEP" => Some(WifiEncryption::Wep),
            "nopass" | "" => Some(WifiEncryption::None),
            _ => None,
        }
    }
}

/// What the user wants to encode. Only the active variant's fields feed the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QrRequest {
    Url {
        #[serde(default)]
        value: String,
    },
    Text {
        #[serde(default)]
        value: String,
    },
    Wifi {
        #[serde(default)]
        ssid: String,
        #[serde(default)]
        password: String,
        #[serde(default)]
        encryption: WifiEncryption,
    },
    Vcard {
        #[serde(default)]
        full_name: String,
        #[serde(default)]
        organization: String,
        #[serde(default)]
        phone: String,
        #[serde(default)]
        email: String,
    },
    Sms {
        #[serde(default)]
        phone: String,
        #[serde(default)]
        message: String,
    },
    Email {
        #[serde(default)]
        address: String,
        #[serde(default)]
        subject: String,
        #[serde(default)]
        body: String,
    },
}

impl QrRequest {
    pub fn scheme(&self) -> SchemeType {
        match self {
            QrRequest::Url { .. } => SchemeType::Url,
            QrRequest::Text { .. } => SchemeType::Text,
            QrRequest::Wifi { .. } => SchemeType::Wifi,
            QrRequest::Vcard { .. } => SchemeType::Vcard,
            QrRequest::Sms { .. } => SchemeType::Sms,
            QrRequest::Email { .. } => SchemeType::Email,
        }
    }

    /// The variant for `scheme` with every field blank.
    pub fn empty(scheme: SchemeType) -> Self {
        match scheme {
            SchemeType::Url => QrRequest::Url {
                value: String::new(),
            },
            SchemeType::Text => QrRequest::Text {
                value: String::new(),
            },
            SchemeType::Wifi => QrRequest::Wifi {
                ssid: String::new(),
                password: String::new(),
                encryption: WifiEncryption::default(),
            },
            SchemeType::Vcard => QrRequest::Vcard {
                full_name: String::new(),
                organization: String::new(),
                phone: String::new(),
                email: String::new(),
            },
            SchemeType::Sms => QrRequest::Sms {
                phone: String::new(),
                message: String::new(),
            },
            SchemeType::Email => QrRequest::Email {
                address: String::new(),
                subject: String::new(),
                body: String::new(),
            },
        }
    }
}

#[derive(Deserialize)]
pub struct SwitchSchemeRequest {
    #[serde(rename = "type")]
    pub scheme: SchemeType,
}

#[derive(Deserialize, Default)]
pub struct CreateSessionRequest {
    pub request: Option<QrRequest>,
}

#[derive(Serialize)]
pub struct PayloadResponse {
    #[serde(rename = "type")]
    pub scheme: SchemeType,
    pub payload: String,
}

/// Save the current session into a history store
#[derive(Deserialize, Validate, Default)]
pub struct SaveHistoryRequest {
    #[validate(length(max = 80, message = "Name must be at most 80 characters"))]
    pub name: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct SaveCodeRequest {
    #[validate(length(min = 1, message = "Session id is required"))]
    pub session_id: String,
    #[validate(length(max = 80, message = "Name must be at most 80 characters"))]
    pub name: Option<String>,
}
