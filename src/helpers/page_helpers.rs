use actix_web::{
    cookie::Cookie,
    http::{header, Uri},
    HttpRequest, HttpResponse,
};
use serde::{Deserialize, Serialize};

use crate::helpers::validation_helpers::FieldErrors;

pub const FLASH_COOKIE: &str = "flash";

/// One-shot message carried from a form submission to the next page.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: FieldErrors,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Flash {
            success: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Flash {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn errors(errors: FieldErrors) -> Self {
        Flash {
            errors,
            ..Default::default()
        }
    }

    /// Hex keeps the JSON inside the cookie value character set.
    pub fn encode(&self) -> String {
        serde_json::to_vec(self)
            .map(hex::encode)
            .unwrap_or_default()
    }

    pub fn decode(raw: &str) -> Option<Flash> {
        let bytes = hex::decode(raw).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

#[derive(Debug, Serialize)]
pub struct Page<P: Serialize> {
    pub component: &'static str,
    pub props: P,
    pub url: String,
    pub flash: Flash,
}

fn flash_cookie(value: String) -> Cookie<'static> {
    Cookie::build(FLASH_COOKIE, value)
        .path("/")
        .http_only(true)
        .finish()
}

/// Reads the pending flash, if any.
pub fn take_flash(req: &HttpRequest) -> Option<Flash> {
    req.cookie(FLASH_COOKIE)
        .and_then(|cookie| Flash::decode(cookie.value()))
}

/// Renders a page payload and clears the flash it consumed.
pub fn render_page<P: Serialize>(req: &HttpRequest, component: &'static str, props: P) -> HttpResponse {
    let flash = take_flash(req);
    let mut response = HttpResponse::Ok();

    if req.cookie(FLASH_COOKIE).is_some() {
        let mut removal = flash_cookie(String::new());
        removal.make_removal();
        response.cookie(removal);
    }

    let url = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.path().to_string());

    response.json(Page {
        component,
        props,
        url,
        flash: flash.unwrap_or_default(),
    })
}

pub fn redirect_with_flash(location: &str, flash: Flash) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .cookie(flash_cookie(flash.encode()))
        .finish()
}

/// Path of the page that submitted the form, taken from `Referer`.
pub fn back_location(req: &HttpRequest, fallback: &str) -> String {
    req.headers()
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .and_then(|referer| referer.parse::<Uri>().ok())
        .and_then(|uri| uri.path_and_query().map(|pq| pq.as_str().to_string()))
        .filter(|path| path.starts_with('/'))
        .unwrap_or_else(|| fallback.to_string())
}

pub fn redirect_back(req: &HttpRequest, fallback: &str, flash: Flash) -> HttpResponse {
    redirect_with_flash(&back_location(req, fallback), flash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn flash_survives_the_cookie() {
        let mut errors = FieldErrors::default();
        errors.add("amount", "Insufficient balance");
        let flash = Flash::errors(errors);

        let encoded = flash.encode();
        assert!(encoded.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(Flash::decode(&encoded), Some(flash));
        assert_eq!(Flash::decode("not hex"), None);
    }

    #[test]
    fn back_uses_referer_path() {
        let req = TestRequest::default()
            .insert_header((header::REFERER, "http://localhost:8000/wallet?tab=history"))
            .to_http_request();
        assert_eq!(back_location(&req, "/"), "/wallet?tab=history");

        let req = TestRequest::default().to_http_request();
        assert_eq!(back_location(&req, "/profile/verify"), "/profile/verify");
    }

    #[test]
    fn redirect_is_see_other_with_flash_cookie() {
        let response = redirect_with_flash("/wallet", Flash::success("done"));
        assert_eq!(response.status(), actix_web::http::StatusCode::SEE_OTHER);
        assert_eq!(
            response
                .headers()
                .get(header::LOCATION)
                .unwrap()
                .to_str()
                .unwrap(),
            "/wallet"
        );
        let cookie = response.cookies().find(|c| c.name() == FLASH_COOKIE).unwrap();
        assert_eq!(
            Flash::decode(cookie.value()).unwrap().success.as_deref(),
            Some("done")
        );
    }
}
