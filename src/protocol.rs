/// JSON wire types for the device view endpoint.
///
/// Requests are small flat objects deserialized with `serde_json_core`;
/// responses are serialized into caller-provided buffers. No allocation.
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::frame::MacAddr;

/// Stable, unique device identity as exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceKey(pub u64);

impl From<MacAddr> for DeviceKey {
    fn from(mac: MacAddr) -> Self {
        let m = mac.0;
        Self(u64::from_be_bytes([0, 0, m[0], m[1], m[2], m[3], m[4], m[5]]))
    }
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:012X}", self.0)
    }
}

/// Wire format for a page request. Both fields optional; an empty body
/// means "first page, default length".
#[derive(Debug, Default, Deserialize, PartialEq)]
pub(crate) struct RawPageRequest {
    #[serde(default)]
    pub start: Option<usize>,
    #[serde(default)]
    pub length: Option<usize>,
}

/// One page of a view's device keys.
#[derive(Debug, Serialize)]
pub struct PageResponse<'a> {
    /// View id
    pub view: &'a str,
    /// Devices in the view at scan time
    pub total: usize,
    /// Index of the first key in this page
    pub start: usize,
    pub keys: &'a [DeviceKey],
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse<'a> {
    pub error: &'a str,
}

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
