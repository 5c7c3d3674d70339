/// Runtime configuration for frame observation and the view endpoint.
///
/// Plain `Copy` structs with compiled-in defaults so the host can adjust
/// behavior without rebuilding.
use crate::frame::ByteOrder;

/// How captured frames are interpreted by [`crate::capture::observe_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Byte order of the capture source (from capture metadata, not the host)
    pub byte_order: ByteOrder,
    /// Whether frames classified as Unknown still produce an observation
    pub report_unknown: bool,
    /// Whether control frames (no SSID, often no transmitter) are reported
    pub report_control: bool,
}

impl CaptureConfig {
    pub const fn new() -> Self {
        Self {
            byte_order: ByteOrder::Little,
            report_unknown: false,
            report_control: false,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Paging limits for the `/devices/view/{id}/devices` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageConfig {
    /// Page length used when the request omits `length`
    pub default_length: usize,
    /// Upper bound on a single page; larger requests are clamped
    pub max_length: usize,
}

impl PageConfig {
    pub const fn new() -> Self {
        Self {
            default_length: 50,
            max_length: MAX_PAGE_LEN,
        }
    }

    /// Resolve a requested page length against the limits.
    pub fn clamp(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_length)
            .min(self.max_length)
            .min(MAX_PAGE_LEN)
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Hard ceiling on keys in one response; sizes the response buffer.
pub const MAX_PAGE_LEN: usize = 100;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_defaults() {
        let cfg = CaptureConfig::default();
        assert_eq!(cfg.byte_order, ByteOrder::Little);
        assert!(!cfg.report_unknown);
        assert!(!cfg.report_control);
    }

    #[test]
    fn page_clamp() {
        let cfg = PageConfig::new();
        assert_eq!(cfg.clamp(None), 50);
        assert_eq!(cfg.clamp(Some(10)), 10);
        assert_eq!(cfg.clamp(Some(10_000)), MAX_PAGE_LEN);

        let tight = PageConfig {
            default_length: 5,
            max_length: 8,
        };
        assert_eq!(tight.clamp(None), 5);
        assert_eq!(tight.clamp(Some(9)), 8);
        assert_eq!(tight.clamp(Some(0)), 0);
    }
}
