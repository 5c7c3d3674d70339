/// Frame observation feed for the device tracker.
///
/// Turns a raw captured 802.11 frame into an [`Observation`]: who sent it,
/// which BSS it belongs to, what it is, and which security mechanisms the
/// header reveals. Management frames carrying an SSID (beacons, probes) are
/// additionally parsed with the ieee80211 crate for SSID extraction.
///
/// No allocation, no blocking; safe to call from a capture callback.
use heapless::String;

use ieee80211::match_frames;
use ieee80211::mgmt_frame::{BeaconFrame, ProbeRequestFrame, ProbeResponseFrame};

use crate::config::CaptureConfig;
use crate::crypto::CryptoFlags;
use crate::frame::{self, FrameCategory, MacAddr, ManagementSubtype};

/// SSIDs are at most 32 bytes; one spare for a truncated multibyte char.
pub type SsidString = String<33>;

/// What the tracker learns from one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Address 2, when the frame carries one
    pub transmitter: Option<MacAddr>,
    pub bssid: Option<MacAddr>,
    /// Empty for hidden networks and frames without an SSID element
    pub ssid: SsidString,
    pub category: FrameCategory,
    pub crypto: CryptoFlags,
    pub sequence: Option<u16>,
}

impl Observation {
    /// Frame label for reporting, e.g. "beacon".
    pub fn frame_label(&self) -> &'static str {
        self.category.label()
    }
}

/// Decode a captured frame into an observation.
///
/// Returns `None` for frames too short to carry a header and, depending on
/// `config`, for control and unclassified frames.
pub fn observe_frame(frame: &[u8], config: &CaptureConfig) -> Option<Observation> {
    let decoded = match frame::decode(frame, config.byte_order) {
        Ok(decoded) => decoded,
        Err(e) => {
            log::trace!("dropping frame: {}", e);
            return None;
        }
    };

    match decoded.category {
        FrameCategory::Unknown { .. } if !config.report_unknown => return None,
        FrameCategory::Control(_) if !config.report_control => return None,
        _ => {}
    }

    let ssid = match decoded.category {
        FrameCategory::Management(
            ManagementSubtype::Beacon
            | ManagementSubtype::ProbeRequest
            | ManagementSubtype::ProbeResponse,
        ) => extract_ssid(frame),
        _ => SsidString::new(),
    };

    Some(Observation {
        transmitter: decoded.addr2,
        bssid: decoded.bssid(),
        ssid,
        category: decoded.category,
        crypto: decoded.crypto(),
        sequence: decoded.sequence.map(|s| s.sequence_number),
    })
}

/// Pull the SSID element out of a beacon or probe frame.
fn extract_ssid(frame: &[u8]) -> SsidString {
    let result = match_frames! {
        frame,
        beacon = BeaconFrame<'_> => {
            to_ssid(beacon.body.ssid().unwrap_or(""))
        }
        probe_req = ProbeRequestFrame<'_> => {
            to_ssid(probe_req.body.ssid().unwrap_or(""))
        }
        probe_resp = ProbeResponseFrame<'_> => {
            to_ssid(probe_resp.body.ssid().unwrap_or(""))
        }
    };

    result.unwrap_or_else(|_| {
        log::trace!("management body did not parse, SSID unknown");
        SsidString::new()
    })
}

fn to_ssid(ssid: &str) -> SsidString {
    let mut out = SsidString::new();
    for c in ssid.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
