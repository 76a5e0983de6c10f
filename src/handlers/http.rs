use serde_json::json;

use crate::handler::HandlerError;
use crate::model::NodeDoc;
use crate::register_handler;
use crate::template;

const REQUEST: &str = r#"import requests

response = requests.request({{py method}}, {{py url}}{{#if headers}}, headers={{py headers}}{{/if}}{{#if query}}, params={{py query}}{{/if}}{{#if body}}, json={{py body}}{{/if}})
print(response.status_code)"#;

const METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

/// `Http Request`: issues a request with `requests`; optional `headers`,
/// `query` and JSON `body`.
pub fn handle_http_request(node: &NodeDoc) -> Result<String, HandlerError> {
    let url = node.require_str("url")?;
    let method = node.str_or("method", "GET")?.to_ascii_uppercase();
    if !METHODS.contains(&method.as_str()) {
        return Err(HandlerError::invalid("method", "an HTTP method"));
    }
    for key in ["headers", "query"] {
        if let Some(value) = node.param(key)
            && !value.is_object()
        {
            return Err(HandlerError::invalid(key, "an object"));
        }
    }
    template::render(
        REQUEST,
        &json!({
            "method": method,
            "url": url,
            "headers": node.param("headers"),
            "query": node.param("query"),
            "body": node.param("body"),
        }),
    )
}

register_handler!(handle_http_request);
