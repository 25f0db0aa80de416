use std::sync::Arc;

use tracing::debug;

use docket_base::DocketResult;
use docket_base::pal::http::{HttpMethod, HttpRequest, HttpResponse, HttpService};

use crate::model::{DocumentModel, Format};

const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

const CORS_HEADERS: [(&str, &str); 4] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", ALLOWED_METHODS),
    ("Access-Control-Allow-Headers", "Content-Type, Authorization"),
    ("Access-Control-Max-Age", "86400"),
];

/// Serves one finished document.
///
/// YAML unless the client asks for JSON, either with `?format=JSON` or an
/// `Accept` header naming `application/json`. An explicit `format` query
/// parameter beats the `Accept` header.
#[derive(Debug, Clone)]
pub struct OpenApiHttpHandler {
    document: Arc<DocumentModel>,
}

impl OpenApiHttpHandler {
    pub fn new(document: Arc<DocumentModel>) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &DocumentModel {
        &self.document
    }

    fn negotiate(request: &HttpRequest) -> Format {
        if let Some(format) = request.query_param("format").and_then(Format::parse) {
            return format;
        }
        let wants_json = request
            .headers()
            .get("Accept")
            .is_some_and(|accept| accept.contains("application/json"));
        if wants_json { Format::Json } else { Format::Yaml }
    }
}

impl HttpService for OpenApiHttpHandler {
    fn handle_request(&self, request: HttpRequest) -> DocketResult<HttpResponse> {
        let response = match request.method() {
            HttpMethod::Get | HttpMethod::Head => {
                let format = Self::negotiate(&request);
                debug!(path = request.path(), %format, "serving API description");
                let body = self.document.serialize(format)?;
                let response = HttpResponse::ok().with_content_type(format.media_type());
                if *request.method() == HttpMethod::Head {
                    response.with_header("Content-Length", body.len().to_string())
                } else {
                    response.with_body(body)
                }
            }
            HttpMethod::Options => HttpResponse::ok().with_header("Allow", ALLOWED_METHODS),
            _ => HttpResponse::method_not_allowed().with_header("Allow", ALLOWED_METHODS),
        };
        Ok(CORS_HEADERS
            .iter()
            .fold(response, |response, (name, value)| {
                response.with_header(*name, *value)
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_base::pal::http::HttpStatusCode;
    use expect_test::expect;
    use serde_json::json;

    fn handler() -> OpenApiHttpHandler {
        let document = DocumentModel::from_value(json!({
            "openapi": "3.0.3",
            "paths": {"/orders": {"get": {"summary": "list orders"}}}
        }))
        .unwrap();
        OpenApiHttpHandler::new(Arc::new(document))
    }

    fn get(target: &str) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, target)
    }

    fn content_type(response: &HttpResponse) -> Option<&str> {
        response.headers().get("Content-Type").map(String::as_str)
    }

    #[test]
    fn test_yaml_by_default() {
        let response = handler().handle_request(get("/openapi")).unwrap();

        assert_eq!(response.status(), HttpStatusCode::Ok);
        assert_eq!(content_type(&response), Some("application/yaml;charset=utf-8"));
        expect![[r#"
            openapi: 3.0.3
            paths:
              /orders:
                get:
                  summary: list orders
        "#]]
        .assert_eq(&response.body().as_string().unwrap());
    }

    #[test]
    fn test_json_by_query() {
        let response = handler().handle_request(get("/openapi?format=JSON")).unwrap();

        assert_eq!(content_type(&response), Some("application/json;charset=utf-8"));
        let body: serde_json::Value =
            serde_json::from_str(&response.body().as_string().unwrap()).unwrap();
        assert_eq!(body["openapi"], json!("3.0.3"));
    }

    #[test]
    fn test_json_by_accept_header() {
        let request = get("/openapi").with_header("accept", "application/json, */*;q=0.5");
        let response = handler().handle_request(request).unwrap();
        assert_eq!(content_type(&response), Some("application/json;charset=utf-8"));
    }

    #[test]
    fn test_query_beats_accept_header() {
        let request = get("/openapi?format=yaml").with_header("Accept", "application/json");
        let response = handler().handle_request(request).unwrap();
        assert_eq!(content_type(&response), Some("application/yaml;charset=utf-8"));
    }

    #[test]
    fn test_head_has_no_body() {
        let response = handler()
            .handle_request(HttpRequest::new(HttpMethod::Head, "/openapi"))
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::Ok);
        assert!(response.body().is_empty());
        assert!(response.headers().contains("Content-Length"));
    }

    #[test]
    fn test_options_and_cors() {
        let response = handler()
            .handle_request(HttpRequest::new(HttpMethod::Options, "/openapi"))
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::Ok);
        assert_eq!(
            response.headers().get("Allow").map(String::as_str),
            Some("GET, HEAD, OPTIONS")
        );
        assert_eq!(
            response
                .headers()
                .get("Access-Control-Allow-Origin")
                .map(String::as_str),
            Some("*")
        );
        assert!(response.headers().contains("Access-Control-Max-Age"));
    }

    #[test]
    fn test_other_methods_rejected() {
        let response = handler()
            .handle_request(HttpRequest::new(HttpMethod::Post, "/openapi").with_body("{}"))
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::MethodNotAllowed);
        assert!(response.headers().contains("Access-Control-Allow-Origin"));
    }

    #[test]
    fn test_trace_and_connect_get_allow_header() {
        for method in [HttpMethod::Trace, HttpMethod::Connect] {
            let response = handler()
                .handle_request(HttpRequest::new(method.clone(), "/openapi"))
                .unwrap();

            assert_eq!(response.status(), HttpStatusCode::MethodNotAllowed, "{}", method);
            assert_eq!(
                response.headers().get("Allow").map(String::as_str),
                Some(ALLOWED_METHODS)
            );
        }
    }
}
