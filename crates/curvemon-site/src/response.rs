//! Transport-neutral response produced by the responder.

/// Response body as stored in the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    Empty,
    /// Generated text such as error pages and the config script.
    Text(String),
    /// File contents exactly as read from disk. Sent raw over HTTP; in gateway
    /// responses `binary` assets are base64-encoded and the rest decoded as
    /// UTF-8.
    Asset { bytes: Vec<u8>, binary: bool },
}

impl ResponseBody {
    pub fn is_empty(&self) -> bool {
        match self {
            ResponseBody::Empty => true,
            ResponseBody::Text(text) => text.is_empty(),
            ResponseBody::Asset { bytes, .. } => bytes.is_empty(),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            ResponseBody::Empty => Vec::new(),
            ResponseBody::Text(text) => text.into_bytes(),
            ResponseBody::Asset { bytes, .. } => bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteResponse {
    pub status: u16,
    /// Header name/value pairs in emission order.
    pub headers: Vec<(String, String)>,
    pub body: ResponseBody,
}

impl SiteResponse {
    pub fn new(status: u16, body: ResponseBody) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body,
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self::new(status, ResponseBody::Text(body.to_string()))
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Same status and headers with the body dropped.
    pub fn head(&self) -> Self {
        Self {
            status: self.status,
            headers: self.headers.clone(),
            body: ResponseBody::Empty,
        }
    }
}
