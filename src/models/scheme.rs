use serde::{Deserialize, Serialize};
use std::fmt;

/// Payload scheme of a QR request; the discriminant of [`QrRequest`](crate::structs::qr_request::QrRequest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SchemeType {
    #[default]
    Url,
    Text,
    Wifi,
    Vcard,
    Sms,
    Email,
}

impl SchemeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemeType::Url => "url",
            SchemeType::Text => "text",
            SchemeType::Wifi => "wifi",
            SchemeType::Vcard => "vcard",
            SchemeType::Sms => "sms",
            SchemeType::Email => "email",
        }
    }
}

impl fmt::Display for SchemeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemeType::Url => write!(f, "URL"),
            SchemeType::Text => write!(f, "Text"),
            SchemeType::Wifi => write!(f, "WiFi"),
            SchemeType::Vcard => write!(f, "Contact"),
            SchemeType::Sms => write!(f, "SMS"),
            SchemeType::Email => write!(f, "Email"),
        }
    }
}
