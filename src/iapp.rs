/// IAPP (inter-access-point roaming protocol) PDU decoder.
///
/// Wire format: a 2-byte message header `[version][type]` followed by PDUs
/// `[type:1][length:2][payload:length]` until the buffer is exhausted.
/// Multi-byte fields are network (big-endian) order. Auth-info PDUs nest
/// sub-elements with the same framing.
///
/// Decoding is zero-copy: PDUs borrow their payload from the input buffer.
/// A declared length that runs past the end of the buffer yields
/// [`PduError::Truncated`]; nothing is ever read out of bounds.
use crate::frame::MacAddr;

/// `[type:1][length:2]`
pub const PDU_HEADER_LEN: usize = 3;

/// `[version:1][type:1]`
pub const MESSAGE_HEADER_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PduError {
    #[error("IAPP message too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("IAPP PDU at offset {offset} declares {declared} bytes, {available} available")]
    Truncated {
        offset: usize,
        declared: usize,
        available: usize,
    },
}

// ── Message header ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IappMessageType {
    AnnounceRequest,
    AnnounceResponse,
    HandoverRequest,
    HandoverResponse,
    Other(u8),
}

impl From<u8> for IappMessageType {
    fn from(val: u8) -> Self {
        match val {
            0 => Self::AnnounceRequest,
            1 => Self::AnnounceResponse,
            2 => Self::HandoverRequest,
            3 => Self::HandoverResponse,
            other => Self::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IappHeader {
    pub version: u8,
    pub message_type: IappMessageType,
}

/// Split an IAPP message into its header and a lazy PDU sequence.
pub fn decode_message(buf: &[u8]) -> Result<(IappHeader, IappPdus<'_>), PduError> {
    if buf.len() < MESSAGE_HEADER_LEN {
        return Err(PduError::TooShort {
            needed: MESSAGE_HEADER_LEN,
            actual: buf.len(),
        });
    }
    let header = IappHeader {
        version: buf[0],
        message_type: IappMessageType::from(buf[1]),
    };
    Ok((header, pdus(&buf[MESSAGE_HEADER_LEN..])))
}

// ── PDUs ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PduType {
    Ssid,
    Bssid,
    OldBssid,
    StationMac,
    Capability,
    AnnounceInterval,
    HandoverTimeout,
    MessageId,
    PhyType,
    RegulatoryDomain,
    Channel,
    BeaconInterval,
    OuiIdentifier,
    AuthInfo,
    /// Preserved so callers keep protocol fidelity
    Unknown(u8),
}

impl From<u8> for PduType {
    fn from(val: u8) -> Self {
        match val {
            0x00 => Self::Ssid,
            0x01 => Self::Bssid,
            0x02 => Self::OldBssid,
            0x03 => Self::StationMac,
            0x04 => Self::Capability,
            0x05 => Self::AnnounceInterval,
            0x06 => Self::HandoverTimeout,
            0x07 => Self::MessageId,
            0x10 => Self::PhyType,
            0x11 => Self::RegulatoryDomain,
            0x12 => Self::Channel,
            0x13 => Self::BeaconInterval,
            0x80 => Self::OuiIdentifier,
            0x81 => Self::AuthInfo,
            other => Self::Unknown(other),
        }
    }
}

impl PduType {
    pub fn code(self) -> u8 {
        match self {
            Self::Ssid => 0x00,
            Self::Bssid => 0x01,
            Self::OldBssid => 0x02,
            Self::StationMac => 0x03,
            Self::Capability => 0x04,
            Self::AnnounceInterval => 0x05,
            Self::HandoverTimeout => 0x06,
            Self::MessageId => 0x07,
            Self::PhyType => 0x10,
            Self::RegulatoryDomain => 0x11,
            Self::Channel => 0x12,
            Self::BeaconInterval => 0x13,
            Self::OuiIdentifier => 0x80,
            Self::AuthInfo => 0x81,
            Self::Unknown(code) => code,
        }
    }
}

/// IAPP capability bits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IappCapability {
    pub forwarding: bool,
    pub wep: bool,
}

impl From<u8> for IappCapability {
    fn from(val: u8) -> Self {
        Self {
            forwarding: val & 0x40 != 0,
            wep: val & 0x20 != 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IappPhyType {
    Proprietary,
    Fhss,
    Dsss,
    Infrared,
    Ofdm,
    Other(u8),
}

impl From<u8> for IappPhyType {
    fn from(val: u8) -> Self {
        match val {
            0x00 => Self::Proprietary,
            0x01 => Self::Fhss,
            0x02 => Self::Dsss,
            0x03 => Self::Infrared,
            0x04 => Self::Ofdm,
            other => Self::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegulatoryDomain {
    Fcc,
    Ic,
    Etsi,
    Spain,
    France,
    Mkk,
    Other(u8),
}

impl From<u8> for RegulatoryDomain {
    fn from(val: u8) -> Self {
        match val {
            0x10 => Self::Fcc,
            0x20 => Self::Ic,
            0x30 => Self::Etsi,
            0x31 => Self::Spain,
            0x32 => Self::France,
            0x40 => Self::Mkk,
            other => Self::Other(other),
        }
    }
}

/// One typed, length-delimited PDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IappPdu<'a> {
    pub pdu_type: PduType,
    pub payload: &'a [u8],
}

impl<'a> IappPdu<'a> {
    /// Address payload of the BSSID / old-BSSID / station-MAC PDUs.
    pub fn as_mac(&self) -> Option<MacAddr> {
        match self.pdu_type {
            PduType::Bssid | PduType::OldBssid | PduType::StationMac => {
                <[u8; 6]>::try_from(self.payload).ok().map(MacAddr)
            }
            _ => None,
        }
    }

    pub fn as_ssid(&self) -> Option<&'a str> {
        match self.pdu_type {
            PduType::Ssid => core::str::from_utf8(self.payload).ok(),
            _ => None,
        }
    }

    /// Single-byte payloads (capability, PHY type, domain, channel).
    pub fn as_u8(&self) -> Option<u8> {
        match self.payload {
            [b] => Some(*b),
            _ => None,
        }
    }

    /// Two-byte payloads (intervals, timeouts, message id).
    pub fn as_u16(&self) -> Option<u16> {
        match self.payload {
            [hi, lo] => Some(u16::from_be_bytes([*hi, *lo])),
            _ => None,
        }
    }

    pub fn capability(&self) -> Option<IappCapability> {
        (self.pdu_type == PduType::Capability)
            .then(|| self.as_u8().map(IappCapability::from))
            .flatten()
    }

    pub fn phy_type(&self) -> Option<IappPhyType> {
        (self.pdu_type == PduType::PhyType)
            .then(|| self.as_u8().map(IappPhyType::from))
            .flatten()
    }

    pub fn regulatory_domain(&self) -> Option<RegulatoryDomain> {
        (self.pdu_type == PduType::RegulatoryDomain)
            .then(|| self.as_u8().map(RegulatoryDomain::from))
            .flatten()
    }

    /// Sub-elements of an auth-info PDU.
    pub fn auth_elements(&self) -> Option<AuthElements<'a>> {
        (self.pdu_type == PduType::AuthInfo).then(|| auth_elements(self.payload))
    }
}

/// Read one `[type:1][length:2][payload]` element at `offset`.
///
/// Returns the type code, the payload and the offset of the next element.
fn read_tlv(buf: &[u8], offset: usize) -> Result<(u8, &[u8], usize), PduError> {
    let rest = &buf[offset..];
    if rest.len() < PDU_HEADER_LEN {
        return Err(PduError::Truncated {
            offset,
            declared: PDU_HEADER_LEN,
            available: rest.len(),
        });
    }

    let declared = u16::from_be_bytes([rest[1], rest[2]]) as usize;
    let body = &rest[PDU_HEADER_LEN..];
    let payload = body.get(..declared).ok_or(PduError::Truncated {
        offset,
        declared,
        available: body.len(),
    })?;

    Ok((rest[0], payload, offset + PDU_HEADER_LEN + declared))
}

/// Lazy, finite PDU sequence in encounter order.
///
/// Yields `Err` once for a truncated PDU and then ends.
#[derive(Debug, Clone)]
pub struct IappPdus<'a> {
    buf: &'a [u8],
    pos: usize,
    done: bool,
}

/// Iterate the PDUs of a PDU stream (no message header).
pub fn pdus(buf: &[u8]) -> IappPdus<'_> {
    IappPdus {
        buf,
        pos: 0,
        done: false,
    }
}

impl<'a> Iterator for IappPdus<'a> {
    type Item = Result<IappPdu<'a>, PduError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos >= self.buf.len() {
            return None;
        }

        let (code, payload, next) = match read_tlv(self.buf, self.pos) {
            Ok(tlv) => tlv,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        let pdu_type = PduType::from(code);
        if let PduType::Unknown(code) = pdu_type {
            log::trace!("IAPP PDU type {:#04x} kept as opaque ({} bytes)", code, payload.len());
        }

        self.pos = next;
        Some(Ok(IappPdu { pdu_type, payload }))
    }
}

impl core::iter::FusedIterator for IappPdus<'_> {}

// ── Auth-info sub-elements ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IappAuthType {
    Status,
    Username,
    ProviderName,
    RxPackets,
    TxPackets,
    RxBytes,
    TxBytes,
    LoginTime,
    TimeLimit,
    VolumeLimit,
    AccountingCycle,
    RxGigawords,
    TxGigawords,
    IpAddr,
    Trailer,
    Other(u8),
}

impl From<u8> for IappAuthType {
    fn from(val: u8) -> Self {
        match val {
            0x01 => Self::Status,
            0x02 => Self::Username,
            0x03 => Self::ProviderName,
            0x04 => Self::RxPackets,
            0x05 => Self::TxPackets,
            0x06 => Self::RxBytes,
            0x07 => Self::TxBytes,
            0x08 => Self::LoginTime,
            0x09 => Self::TimeLimit,
            0x0a => Self::VolumeLimit,
            0x0b => Self::AccountingCycle,
            0x0c => Self::RxGigawords,
            0x0d => Self::TxGigawords,
            0x0e => Self::IpAddr,
            0xff => Self::Trailer,
            other => Self::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IappAuthElement<'a> {
    pub auth_type: IappAuthType,
    pub value: &'a [u8],
}

impl<'a> IappAuthElement<'a> {
    /// Username and provider name.
    pub fn as_str(&self) -> Option<&'a str> {
        match self.auth_type {
            IappAuthType::Username | IappAuthType::ProviderName => {
                core::str::from_utf8(self.value).ok()
            }
            _ => None,
        }
    }

    /// Four-byte counters and limits, network order.
    pub fn as_u32(&self) -> Option<u32> {
        <[u8; 4]>::try_from(self.value).ok().map(u32::from_be_bytes)
    }

    pub fn as_ipv4(&self) -> Option<[u8; 4]> {
        match self.auth_type {
            IappAuthType::IpAddr => <[u8; 4]>::try_from(self.value).ok(),
            _ => None,
        }
    }
}

/// Sub-elements of an auth-info payload, same framing as PDUs.
///
/// Yields `Err` once for a truncated element and then ends.
#[derive(Debug, Clone)]
pub struct AuthElements<'a> {
    buf: &'a [u8],
    pos: usize,
    done: bool,
}

pub fn auth_elements(payload: &[u8]) -> AuthElements<'_> {
    AuthElements {
        buf: payload,
        pos: 0,
        done: false,
    }
}

impl<'a> Iterator for AuthElements<'a> {
    type Item = Result<IappAuthElement<'a>, PduError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos >= self.buf.len() {
            return None;
        }

        match read_tlv(self.buf, self.pos) {
            Ok((code, value, next)) => {
                self.pos = next;
                Some(Ok(IappAuthElement {
                    auth_type: IappAuthType::from(code),
                    value,
                }))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl core::iter::FusedIterator for AuthElements<'_> {}

/// Decode every PDU eagerly. All-or-nothing.
#[cfg(feature = "std")]
pub fn decode_all(buf: &[u8]) -> Result<std::vec::Vec<IappPdu<'_>>, PduError> {
    pdus(buf).collect()
}
