use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::header, http::request::Parts};

/// Scheme and host the client used to reach us, e.g. `https://shop.example`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin(pub String);

impl RequestOrigin {
    pub fn from_parts(parts: &Parts) -> Self {
        let scheme = parts
            .headers
            .get("x-forwarded-proto")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or("http");
        let host = parts
            .headers
            .get("x-forwarded-host")
            .or_else(|| parts.headers.get(header::HOST))
            .and_then(|value| value.to_str().ok())
            .or_else(|| parts.uri.authority().map(|a| a.as_str()))
            .unwrap_or("localhost");
        RequestOrigin(format!("{scheme}://{host}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for RequestOrigin
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RequestOrigin::from_parts(parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(request: Request<()>) -> Parts {
        request.into_parts().0
    }

    #[test]
    fn uses_host_header_and_defaults_to_http() {
        let request = Request::builder()
            .uri("/api/orders")
            .header(header::HOST, "shop.test:5000")
            .body(())
            .unwrap();
        assert_eq!(RequestOrigin::from_parts(&parts(request)).as_str(), "http://shop.test:5000");
    }

    #[test]
    fn honours_forwarded_proto() {
        let request = Request::builder()
            .uri("/api/orders")
            .header(header::HOST, "shop.test")
            .header("x-forwarded-proto", "https")
            .body(())
            .unwrap();
        assert_eq!(RequestOrigin::from_parts(&parts(request)).as_str(), "https://shop.test");
    }
}
