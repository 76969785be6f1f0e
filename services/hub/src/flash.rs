//! One-shot notices carried across a redirect in a signed cookie

use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Error,
    Info,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Error => "error",
            FlashLevel::Info => "info",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(FlashLevel::Success),
            "error" => Some(FlashLevel::Error),
            "info" => Some(FlashLevel::Info),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn new(level: FlashLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    // Hex keeps arbitrary text (quotes, semicolons, non-ASCII) cookie-safe.
    fn encode(&self) -> String {
        format!("{}.{}", self.level.as_str(), hex::encode(self.message.as_bytes()))
    }

    fn decode(value: &str) -> Option<Self> {
        let (level, encoded) = value.split_once('.')?;
        let bytes = hex::decode(encoded).ok()?;
        Some(Self {
            level: FlashLevel::parse(level)?,
            message: String::from_utf8(bytes).ok()?,
        })
    }
}

/// Queue a notice for the next rendered page.
pub fn set_flash(jar: SignedCookieJar, flash: Flash) -> SignedCookieJar {
    let cookie = Cookie::build((FLASH_COOKIE, flash.encode()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    jar.add(cookie)
}

/// Pop the pending notice, if any.
pub fn take_flash(jar: SignedCookieJar) -> (SignedCookieJar, Option<Flash>) {
    let flash = jar
        .get(FLASH_COOKIE)
        .and_then(|cookie| Flash::decode(cookie.value()));
    let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
    (jar, flash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode() {
        let flash = Flash::new(FlashLevel::Success, "File 'notes; \"v2\".pdf' uploaded, résumé ok");
        assert_eq!(Flash::decode(&flash.encode()), Some(flash));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(Flash::decode("warning.6869"), None);
        assert_eq!(Flash::decode("info.6"), None);
        assert_eq!(Flash::decode("info"), None);
        assert_eq!(Flash::decode("info.zz"), None);
        assert_eq!(Flash::decode("info.ff"), None);
    }
}
