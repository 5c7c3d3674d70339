/// Request handling for the `/devices/view/{id}/devices` resource.
///
/// The transport layer hands over the raw request body; the view answers
/// with a status code and a JSON body. Paging is by position in the view's
/// insertion order, computed from one consistent scan.
use crate::config::PageConfig;
use crate::protocol::{ErrorResponse, PageResponse, RawPageRequest};
use crate::view::{DeviceView, TrackedDevice};
use crate::workers::KeyListWorker;

pub const VIEW_URI_PREFIX: &str = "/devices/view/";
pub const VIEW_URI_SUFFIX: &str = "/devices";

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Resource path for the view `id`.
pub fn view_uri(id: &str) -> String {
    format!("{VIEW_URI_PREFIX}{id}{VIEW_URI_SUFFIX}")
}

/// Extract the view id from a resource path, if it is a view path.
pub fn parse_view_id(uri: &str) -> Option<&str> {
    let id = uri.strip_prefix(VIEW_URI_PREFIX)?.strip_suffix(VIEW_URI_SUFFIX)?;
    (!id.is_empty() && !id.contains('/')).then_some(id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    #[error("request body is not a valid page request")]
    BadRequest,
    #[error("response did not fit the output buffer")]
    ResponseOverflow,
}

impl EndpointError {
    pub fn status(&self) -> u16 {
        match self {
            EndpointError::BadRequest => STATUS_BAD_REQUEST,
            EndpointError::ResponseOverflow => STATUS_INTERNAL_ERROR,
        }
    }
}

/// A resolved page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub start: usize,
    pub length: usize,
}

/// Parse a request body. Empty or whitespace-only bodies select the first
/// page with the default length.
pub fn parse_request(body: &[u8], page: &PageConfig) -> Result<PageRequest, EndpointError> {
    let trimmed = body.trim_ascii();
    let raw = if trimmed.is_empty() {
        RawPageRequest::default()
    } else {
        serde_json_core::from_slice::<RawPageRequest>(trimmed)
            .map(|(raw, _)| raw)
            .map_err(|_| EndpointError::BadRequest)?
    };

    Ok(PageRequest {
        start: raw.start.unwrap_or(0),
        length: page.clamp(raw.length),
    })
}

/// Status code plus serialized JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl EndpointResponse {
    fn error(err: EndpointError) -> Self {
        let msg = ErrorResponse {
            error: match err {
                EndpointError::BadRequest => "bad request",
                EndpointError::ResponseOverflow => "response too large",
            },
        };
        let mut body = vec![0u8; 64];
        let len = serde_json_core::to_slice(&msg, &mut body).unwrap_or(0);
        body.truncate(len);
        Self {
            status: err.status(),
            body,
        }
    }
}

impl<D: TrackedDevice> DeviceView<D> {
    /// Serve one page of this view's device keys.
    pub fn handle_request(&self, body: &[u8], page: &PageConfig) -> EndpointResponse {
        match self.render_page(body, page) {
            Ok(body) => EndpointResponse {
                status: STATUS_OK,
                body,
            },
            Err(e) => {
                log::warn!("{}: {}", self.endpoint_uri(), e);
                EndpointResponse::error(e)
            }
        }
    }

    fn render_page(&self, body: &[u8], page: &PageConfig) -> Result<Vec<u8>, EndpointError> {
        let req = parse_request(body, page)?;

        let mut worker = KeyListWorker::default();
        self.do_device_work(&mut worker);

        let total = worker.keys.len();
        let start = req.start.min(total);
        let end = start.saturating_add(req.length).min(total);

        let msg = PageResponse {
            view: self.id(),
            total,
            start,
            keys: &worker.keys[start..end],
        };

        // Fixed fields plus two 20-digit counts; id bytes may escape to \u00XX
        let mut out = vec![0u8; 96 + self.id().len() * 6 + (end - start) * 21];
        let len = serde_json_core::to_slice(&msg, &mut out)
            .map_err(|_| EndpointError::ResponseOverflow)?;
        out.truncate(len);
        Ok(out)
    }
}
