//! API Gateway proxy event and response shapes.
//!
//! Both the v1 (`path`, `httpMethod`) and v2 (`rawPath`,
//! `requestContext.http.method`) payloads are accepted; unknown fields are
//! ignored.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::responder::StaticSite;
use crate::response::{ResponseBody, SiteResponse};

const DEFAULT_STAGE: &str = "$default";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEvent {
    #[serde(default)]
    pub raw_path: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub request_context: Option<RequestContext>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestContext {
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub http: Option<HttpContext>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpContext {
    #[serde(default)]
    pub method: Option<String>,
}

impl GatewayEvent {
    /// Request method, upper-cased. Defaults to `GET`.
    pub fn method(&self) -> String {
        self.request_context
            .as_ref()
            .and_then(|ctx| ctx.http.as_ref())
            .and_then(|http| http.method.as_deref())
            .or(self.http_method.as_deref())
            .unwrap_or("GET")
            .to_ascii_uppercase()
    }

    /// Request path with any named stage prefix removed.
    pub fn path(&self) -> String {
        let raw = self
            .raw_path
            .as_deref()
            .or(self.path.as_deref())
            .unwrap_or("/");

        let stage = self
            .request_context
            .as_ref()
            .and_then(|ctx| ctx.stage.as_deref())
            .filter(|stage| !stage.is_empty() && *stage != DEFAULT_STAGE);

        if let Some(stage) = stage {
            if let Some(rest) = raw.strip_prefix('/').and_then(|r| r.strip_prefix(stage)) {
                // `/prod` and `/prod/...` are stage-prefixed; `/products` is not.
                if rest.is_empty() {
                    return "/".to_string();
                }
                if rest.starts_with('/') {
                    return rest.to_string();
                }
            }
        }

        if raw.is_empty() {
            "/".to_string()
        } else {
            raw.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: u16,
    #[serde(with = "ordered_headers")]
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl From<SiteResponse> for GatewayResponse {
    fn from(response: SiteResponse) -> Self {
        let (body, is_base64_encoded) = match response.body {
            ResponseBody::Empty => (String::new(), false),
            ResponseBody::Text(text) => (text, false),
            ResponseBody::Asset {
                bytes,
                binary: true,
            } => (BASE64.encode(bytes), true),
            ResponseBody::Asset {
                bytes,
                binary: false,
            } => (String::from_utf8_lossy(&bytes).into_owned(), false),
        };
        Self {
            status_code: response.status,
            headers: response.headers,
            body,
            is_base64_encoded,
        }
    }
}

impl StaticSite {
    /// Answer one gateway event.
    pub fn handle_event(&self, event: &GatewayEvent) -> GatewayResponse {
        self.respond(&event.method(), &event.path()).into()
    }
}

/// Headers as a JSON object, keeping insertion order.
mod ordered_headers {
    use super::*;

    pub fn serialize<S: Serializer>(
        headers: &[(String, String)],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(headers.len()))?;
        for (name, value) in headers {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<(String, String)>, D::Error> {
        struct HeaderVisitor;

        impl<'de> Visitor<'de> for HeaderVisitor {
            type Value = Vec<(String, String)>;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a map of header names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut headers = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, String>()? {
                    headers.push(entry);
                }
                Ok(headers)
            }
        }

        deserializer.deserialize_map(HeaderVisitor)
    }
}
