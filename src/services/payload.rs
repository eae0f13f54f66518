use crate::structs::qr_request::{QrRequest, WifiEncryption};

/// Characters that must be backslash-escaped inside WiFi `S:` and `P:` fields.
const WIFI_RESERVED: [char; 4] = ['\\', ';', ',', ':'];

/// Build the payload for the active variant.
pub fn build(request: &QrRequest) -> String {
    match request {
        QrRequest::Url { value } | QrRequest::Text { value } => passthrough(value),
        QrRequest::Wifi {
            ssid,
            password,
            encryption,
        } => wifi(ssid, password, *encryption),
        QrRequest::Vcard {
            full_name,
            organization,
            phone,
            email,
        } => vcard(full_name, organization, phone, email),
        QrRequest::Sms { phone, message } => sms(phone, message),
        QrRequest::Email {
            address,
            subject,
            body,
        } => email(address, subject, body),
    }
}

/// Text and URLs go through untouched; an empty value becomes a single space
/// because the encoder refuses empty input.
pub fn passthrough(value: &str) -> String {
    if value.is_empty() {
        " ".to_string()
    } else {
        value.to_string()
    }
}

pub fn wifi(ssid: &str, password: &str, encryption: WifiEncryption) -> String {
    format!(
        "WIFI:S:{};T:{};P:{};;",
        escape_wifi(ssid),
        encryption.token(),
        escape_wifi(password)
    )
}

pub fn vcard(full_name: &str, organization: &str, phone: &str, email: &str) -> String {
    [
        "BEGIN:VCARD".to_string(),
        "VERSION:3.0".to_string(),
        format!("FN:{}", escape_vcard(full_name)),
        format!("ORG:{}", escape_vcard(organization)),
        format!("TEL:{}", escape_vcard(phone)),
        format!("EMAIL:{}", escape_vcard(email)),
        "END:VCARD".to_string(),
    ]
    .join("\n")
}

pub fn sms(phone: &str, message: &str) -> String {
    format!("SMSTO:{}:{}", phone, message)
}

pub fn email(address: &str, subject: &str, body: &str) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        address,
        urlencoding::encode(subject),
        urlencoding::encode(body)
    )
}

fn escape_wifi(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if WIFI_RESERVED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// vCard 3.0 TEXT escaping, so every property stays on a single line
fn escape_vcard(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ',' => escaped.push_str("\\,"),
            ';' => escaped.push_str("\\;"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Network credentials recovered from a `WIFI:` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    pub ssid: String,
    pub password: String,
    pub encryption: WifiEncryption,
}

/// Parse a `WIFI:S:..;T:..;P:..;;` payload, honoring backslash escapes.
/// Returns `None` for anything that is not a well-formed WiFi payload.
pub fn parse_wifi(payload: &str) -> Option<WifiCredentials> {
    let body = payload.strip_prefix("WIFI:")?;

    // Split on unescaped ';', keeping escapes in place so ':' inside a
    // value can't be mistaken for the key separator.
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut terminated = false;
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                current.push('\\');
                current.push(chars.next()?);
            }
            ';' if current.is_empty() => {
                terminated = true;
                break;
            }
            ';' => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    if !terminated || chars.next().is_some() {
        return None;
    }

    let mut ssid = None;
    let mut password = String::new();
    let mut encryption = WifiEncryption::None;
    for field in fields {
        let (key, raw) = field.split_once(':')?;
        let value = unescape_wifi(raw);
        match key {
            "S" => ssid = Some(value),
            "P" => password = value,
            "T" => encryption = WifiEncryption::from_token(&value)?,
            // Hidden-network flag and vendor extensions carry nothing we model
            _ => {}
        }
    }

    Some(WifiCredentials {
        ssid: ssid?,
        password,
        encryption,
    })
}

fn unescape_wifi(raw: &str) -> String {
    let mut value = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                value.push(next);
            }
        } else {
            value.push(c);
        }
    }
    value
}
