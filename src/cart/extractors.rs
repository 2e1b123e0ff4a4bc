use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderValue},
};
use std::convert::Infallible;
use uuid::Uuid;

use crate::state::AppState;

/// Cart session identity carried by a cookie.
///
/// Never fails: requests without a (valid) cookie get a freshly minted id
/// with `is_new` set, and handlers that mutate the cart emit the Set-Cookie.
#[derive(Debug, Clone, Copy)]
pub struct CartSession {
    pub id: Uuid,
    pub is_new: bool,
}

#[async_trait]
impl FromRequestParts<AppState> for CartSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookie_name = &state.config.site.cart_cookie;
        let existing = parts
            .headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|raw| cookie_value(raw, cookie_name))
            .and_then(|v| Uuid::parse_str(v).ok());

        Ok(match existing {
            Some(id) => CartSession { id, is_new: false },
            None => CartSession {
                id: Uuid::new_v4(),
                is_new: true,
            },
        })
    }
}

impl CartSession {
    /// Set-Cookie value binding this session id to the browser.
    pub fn to_set_cookie(&self, cookie_name: &str) -> HeaderValue {
        let value = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", cookie_name, self.id);
        HeaderValue::from_str(&value).expect("cookie value is ascii")
    }
}

fn cookie_value<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
    raw.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then_some(v)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_cookie_among_others() {
        let raw = "theme=dark; cart_session=8f14e45f-ceea-4e67-b2c0-9a1b6e0a6f1b; lang=en";
        assert_eq!(
            cookie_value(raw, "cart_session"),
            Some("8f14e45f-ceea-4e67-b2c0-9a1b6e0a6f1b")
        );
    }

    #[test]
    fn missing_cookie_returns_none() {
        assert_eq!(cookie_value("theme=dark", "cart_session"), None);
        assert_eq!(cookie_value("", "cart_session"), None);
    }

    #[test]
    fn set_cookie_header_is_well_formed() {
        let session = CartSession {
            id: Uuid::nil(),
            is_new: true,
        };
        let header = session.to_set_cookie("cart_session");
        let value = header.to_str().unwrap();
        assert!(value.starts_with("cart_session=00000000-"));
        assert!(value.contains("HttpOnly"));
    }
}
