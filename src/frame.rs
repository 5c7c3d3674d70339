/// 802.11 MAC header decoder.
///
/// Decodes Frame Control, addressing, Sequence Control and, for beacon /
/// probe response / association response frames, the Fixed Parameters
/// block. Bit positions are taken from an explicit per-byte-order layout
/// table selected by the capture metadata, never by the host target.
///
/// Safe on untrusted input: the only failure is a buffer shorter than the
/// 10-byte minimum header. Unrecognized type/subtype combinations decode to
/// [`FrameCategory::Unknown`].
use core::fmt;

use crate::crypto::{self, CryptoFlags};

/// Smallest frame we accept: frame control + duration + address 1 (ACK/CTS).
pub const MIN_HEADER_LEN: usize = 10;

/// Three-address management/data header length.
pub const MGMT_HEADER_LEN: usize = 24;

/// Timestamp (8) + beacon interval (2) + capability (2).
pub const FIXED_PARAMS_LEN: usize = 12;

/// Byte order of the capture the buffer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

impl ByteOrder {
    #[inline]
    pub const fn read_u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            ByteOrder::Little => u16::from_le_bytes(bytes),
            ByteOrder::Big => u16::from_be_bytes(bytes),
        }
    }

    #[inline]
    pub const fn write_u16(self, word: u16) -> [u8; 2] {
        match self {
            ByteOrder::Little => word.to_le_bytes(),
            ByteOrder::Big => word.to_be_bytes(),
        }
    }

    #[inline]
    pub const fn read_u64(self, bytes: [u8; 8]) -> u64 {
        match self {
            ByteOrder::Little => u64::from_le_bytes(bytes),
            ByteOrder::Big => u64::from_be_bytes(bytes),
        }
    }

    const fn frame_control_layout(self) -> &'static FrameControlLayout {
        match self {
            ByteOrder::Little => &FC_LAYOUT_LE,
            ByteOrder::Big => &FC_LAYOUT_BE,
        }
    }

    const fn sequence_layout(self) -> &'static SequenceLayout {
        match self {
            ByteOrder::Little => &SEQ_LAYOUT_LE,
            ByteOrder::Big => &SEQ_LAYOUT_BE,
        }
    }

    const fn capability_layout(self) -> &'static CapabilityLayout {
        match self {
            ByteOrder::Little => &CAP_LAYOUT_LE,
            ByteOrder::Big => &CAP_LAYOUT_BE,
        }
    }
}

// ── Bit layout tables ─────────────────────────────────────────────────

/// A run of `width` bits starting at `shift` within a 16-bit word.
#[derive(Debug, Clone, Copy)]
struct BitField {
    shift: u8,
    width: u8,
}

impl BitField {
    const fn new(shift: u8, width: u8) -> Self {
        Self { shift, width }
    }

    const fn bit(shift: u8) -> Self {
        Self::new(shift, 1)
    }

    #[inline]
    const fn mask(self) -> u16 {
        ((1u32 << self.width) - 1) as u16
    }

    #[inline]
    const fn get(self, word: u16) -> u16 {
        (word >> self.shift) & self.mask()
    }

    #[inline]
    const fn flag(self, word: u16) -> bool {
        self.get(word) != 0
    }

    /// Place `value` (truncated to the field width) into its bits.
    #[inline]
    const fn put(self, value: u16) -> u16 {
        (value & self.mask()) << self.shift
    }
}

struct FrameControlLayout {
    version: BitField,
    frame_type: BitField,
    subtype: BitField,
    to_ds: BitField,
    from_ds: BitField,
    more_fragments: BitField,
    retry: BitField,
    power_management: BitField,
    more_data: BitField,
    wep_protected: BitField,
    order: BitField,
}

// Little-endian capture: first wire byte is the low byte of the word.
const FC_LAYOUT_LE: FrameControlLayout = FrameControlLayout {
    version: BitField::new(0, 2),
    frame_type: BitField::new(2, 2),
    subtype: BitField::new(4, 4),
    to_ds: BitField::bit(8),
    from_ds: BitField::bit(9),
    more_fragments: BitField::bit(10),
    retry: BitField::bit(11),
    power_management: BitField::bit(12),
    more_data: BitField::bit(13),
    wep_protected: BitField::bit(14),
    order: BitField::bit(15),
};

// Big-endian capture: first wire byte is the high byte of the word.
const FC_LAYOUT_BE: FrameControlLayout = FrameControlLayout {
    version: BitField::new(8, 2),
    frame_type: BitField::new(10, 2),
    subtype: BitField::new(12, 4),
    to_ds: BitField::bit(0),
    from_ds: BitField::bit(1),
    more_fragments: BitField::bit(2),
    retry: BitField::bit(3),
    power_management: BitField::bit(4),
    more_data: BitField::bit(5),
    wep_protected: BitField::bit(6),
    order: BitField::bit(7),
};

/// The 12-bit sequence number is split in two runs in the big-endian word.
struct SequenceLayout {
    fragment: BitField,
    sequence_low: BitField,
    sequence_high: BitField,
}

const SEQ_LAYOUT_LE: SequenceLayout = SequenceLayout {
    fragment: BitField::new(0, 4),
    sequence_low: BitField::new(4, 4),
    sequence_high: BitField::new(8, 8),
};

const SEQ_LAYOUT_BE: SequenceLayout = SequenceLayout {
    fragment: BitField::new(8, 4),
    sequence_low: BitField::new(12, 4),
    sequence_high: BitField::new(0, 8),
};

struct CapabilityLayout {
    ess: BitField,
    ibss: BitField,
    wep: BitField,
    short_preamble: BitField,
    pbcc: BitField,
    agility: BitField,
}

const CAP_LAYOUT_LE: CapabilityLayout = CapabilityLayout {
    ess: BitField::bit(0),
    ibss: BitField::bit(1),
    wep: BitField::bit(4),
    short_preamble: BitField::bit(5),
    pbcc: BitField::bit(6),
    agility: BitField::bit(7),
};

const CAP_LAYOUT_BE: CapabilityLayout = CapabilityLayout {
    ess: BitField::bit(8),
    ibss: BitField::bit(9),
    wep: BitField::bit(12),
    short_preamble: BitField::bit(13),
    pbcc: BitField::bit(14),
    agility: BitField::bit(15),
};

// ── Header fields ─────────────────────────────────────────────────────

/// Frame Control: the first 16 bits of every 802.11 header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameControl {
    /// Protocol version (2 bits)
    pub version: u8,
    /// 0 = management, 1 = control/phy, 2 = data (2 bits)
    pub frame_type: u8,
    /// Meaning depends on `frame_type` (4 bits)
    pub subtype: u8,
    pub to_ds: bool,
    pub from_ds: bool,
    pub more_fragments: bool,
    pub retry: bool,
    pub power_management: bool,
    pub more_data: bool,
    pub wep_protected: bool,
    pub order: bool,
}

impl FrameControl {
    /// Decode a Frame Control word already read in `order`.
    pub fn from_word(word: u16, order: ByteOrder) -> Self {
        let l = order.frame_control_layout();
        Self {
            version: l.version.get(word) as u8,
            frame_type: l.frame_type.get(word) as u8,
            subtype: l.subtype.get(word) as u8,
            to_ds: l.to_ds.flag(word),
            from_ds: l.from_ds.flag(word),
            more_fragments: l.more_fragments.flag(word),
            retry: l.retry.flag(word),
            power_management: l.power_management.flag(word),
            more_data: l.more_data.flag(word),
            wep_protected: l.wep_protected.flag(word),
            order: l.order.flag(word),
        }
    }

    pub fn from_bytes(bytes: [u8; 2], order: ByteOrder) -> Self {
        Self::from_word(order.read_u16(bytes), order)
    }

    /// Encode back into a word for `order`. Values wider than their field
    /// are truncated.
    pub fn to_word(&self, order: ByteOrder) -> u16 {
        let l = order.frame_control_layout();
        l.version.put(self.version as u16)
            | l.frame_type.put(self.frame_type as u16)
            | l.subtype.put(self.subtype as u16)
            | l.to_ds.put(self.to_ds as u16)
            | l.from_ds.put(self.from_ds as u16)
            | l.more_fragments.put(self.more_fragments as u16)
            | l.retry.put(self.retry as u16)
            | l.power_management.put(self.power_management as u16)
            | l.more_data.put(self.more_data as u16)
            | l.wep_protected.put(self.wep_protected as u16)
            | l.order.put(self.order as u16)
    }

    pub fn to_bytes(&self, order: ByteOrder) -> [u8; 2] {
        order.write_u16(self.to_word(order))
    }

    pub fn distribution(&self) -> Distribution {
        match (self.to_ds, self.from_ds) {
            (false, false) => Distribution::Adhoc,
            (false, true) => Distribution::From,
            (true, false) => Distribution::To,
            (true, true) => Distribution::Inter,
        }
    }
}

/// Sequence Control: 4-bit fragment number, 12-bit sequence number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceControl {
    pub fragment_number: u8,
    pub sequence_number: u16,
}

impl SequenceControl {
    pub fn from_word(word: u16, order: ByteOrder) -> Self {
        let l = order.sequence_layout();
        Self {
            fragment_number: l.fragment.get(word) as u8,
            sequence_number: l.sequence_low.get(word) | (l.sequence_high.get(word) << 4),
        }
    }

    pub fn to_word(&self, order: ByteOrder) -> u16 {
        let l = order.sequence_layout();
        l.fragment.put(self.fragment_number as u16)
            | l.sequence_low.put(self.sequence_number)
            | l.sequence_high.put(self.sequence_number >> 4)
    }
}

/// Capability bits carried in the Fixed Parameters block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub ess: bool,
    pub ibss: bool,
    pub wep: bool,
    pub short_preamble: bool,
    pub pbcc: bool,
    pub agility: bool,
}

impl Capabilities {
    pub fn from_word(word: u16, order: ByteOrder) -> Self {
        let l = order.capability_layout();
        Self {
            ess: l.ess.flag(word),
            ibss: l.ibss.flag(word),
            wep: l.wep.flag(word),
            short_preamble: l.short_preamble.flag(word),
            pbcc: l.pbcc.flag(word),
            agility: l.agility.flag(word),
        }
    }

    pub fn to_word(&self, order: ByteOrder) -> u16 {
        let l = order.capability_layout();
        l.ess.put(self.ess as u16)
            | l.ibss.put(self.ibss as u16)
            | l.wep.put(self.wep as u16)
            | l.short_preamble.put(self.short_preamble as u16)
            | l.pbcc.put(self.pbcc as u16)
            | l.agility.put(self.agility as u16)
    }
}

/// Fixed Parameters of beacon / probe response / association response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedParameters {
    /// TSF timestamp, host order
    pub timestamp: u64,
    /// Beacon interval in time units (1024 µs), host order
    pub beacon_interval: u16,
    pub capabilities: Capabilities,
}

impl FixedParameters {
    /// Decode the 12-byte block. `block` must hold at least
    /// [`FIXED_PARAMS_LEN`] bytes.
    fn decode(block: &[u8], order: ByteOrder) -> Option<Self> {
        let timestamp: [u8; 8] = block.get(0..8)?.try_into().ok()?;
        let interval: [u8; 2] = block.get(8..10)?.try_into().ok()?;
        let capability: [u8; 2] = block.get(10..12)?.try_into().ok()?;
        Some(Self {
            timestamp: order.read_u64(timestamp),
            beacon_interval: order.read_u16(interval),
            capabilities: Capabilities::from_word(order.read_u16(capability), order),
        })
    }

    pub fn beacon_interval_micros(&self) -> u32 {
        self.beacon_interval as u32 * 1024
    }
}

/// 6-byte IEEE MAC address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    pub const BROADCAST: MacAddr = MacAddr([0xff; 6]);

    pub fn from_slice(data: &[u8]) -> Option<Self> {
        let bytes: [u8; 6] = data.get(..6)?.try_into().ok()?;
        Some(Self(bytes))
    }

    pub fn oui(&self) -> [u8; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }

    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            m[0], m[1], m[2], m[3], m[4], m[5]
        )
    }
}

/// Traffic direction derived from the DS bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distribution {
    /// Neither bit: IBSS or management traffic
    Adhoc,
    /// From the distribution system (AP to station)
    From,
    /// To the distribution system (station to AP)
    To,
    /// Both bits: WDS bridge
    Inter,
}

// ── Classification ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagementSubtype {
    AssociationRequest,
    AssociationResponse,
    ReassociationRequest,
    ReassociationResponse,
    ProbeRequest,
    ProbeResponse,
    TimingAdvertisement,
    Beacon,
    Atim,
    Disassociation,
    Authentication,
    Deauthentication,
    Action,
    ActionNoAck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSubtype {
    ControlWrapper,
    BlockAckRequest,
    BlockAck,
    PsPoll,
    Rts,
    Cts,
    Ack,
    CfEnd,
    CfEndAck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSubtype {
    Data,
    DataCfAck,
    DataCfPoll,
    DataCfAckPoll,
    Null,
    CfAck,
    CfPoll,
    CfAckPoll,
    QosData,
    QosDataCfAck,
    QosDataCfPoll,
    QosDataCfAckPoll,
    QosNull,
    QosNullCfAck,
    QosCfPoll,
    QosCfAckPoll,
}

/// Closed classification of a frame's type/subtype pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameCategory {
    Management(ManagementSubtype),
    Control(ControlSubtype),
    Data(DataSubtype),
    /// Reserved or unhandled combination; not an error.
    Unknown { frame_type: u8, subtype: u8 },
}

impl FrameCategory {
    pub fn classify(frame_type: u8, subtype: u8) -> Self {
        use ControlSubtype as C;
        use DataSubtype as D;
        use ManagementSubtype as M;

        let category = match (frame_type, subtype) {
            (0, 0) => Some(Self::Management(M::AssociationRequest)),
            (0, 1) => Some(Self::Management(M::AssociationResponse)),
            (0, 2) => Some(Self::Management(M::ReassociationRequest)),
            (0, 3) => Some(Self::Management(M::ReassociationResponse)),
            (0, 4) => Some(Self::Management(M::ProbeRequest)),
            (0, 5) => Some(Self::Management(M::ProbeResponse)),
            (0, 6) => Some(Self::Management(M::TimingAdvertisement)),
            (0, 8) => Some(Self::Management(M::Beacon)),
            (0, 9) => Some(Self::Management(M::Atim)),
            (0, 10) => Some(Self::Management(M::Disassociation)),
            (0, 11) => Some(Self::Management(M::Authentication)),
            (0, 12) => Some(Self::Management(M::Deauthentication)),
            (0, 13) => Some(Self::Management(M::Action)),
            (0, 14) => Some(Self::Management(M::ActionNoAck)),

            (1, 7) => Some(Self::Control(C::ControlWrapper)),
            (1, 8) => Some(Self::Control(C::BlockAckRequest)),
            (1, 9) => Some(Self::Control(C::BlockAck)),
            (1, 10) => Some(Self::Control(C::PsPoll)),
            (1, 11) => Some(Self::Control(C::Rts)),
            (1, 12) => Some(Self::Control(C::Cts)),
            (1, 13) => Some(Self::Control(C::Ack)),
            (1, 14) => Some(Self::Control(C::CfEnd)),
            (1, 15) => Some(Self::Control(C::CfEndAck)),

            (2, 0) => Some(Self::Data(D::Data)),
            (2, 1) => Some(Self::Data(D::DataCfAck)),
            (2, 2) => Some(Self::Data(D::DataCfPoll)),
            (2, 3) => Some(Self::Data(D::DataCfAckPoll)),
            (2, 4) => Some(Self::Data(D::Null)),
            (2, 5) => Some(Self::Data(D::CfAck)),
            (2, 6) => Some(Self::Data(D::CfPoll)),
            (2, 7) => Some(Self::Data(D::CfAckPoll)),
            (2, 8) => Some(Self::Data(D::QosData)),
            (2, 9) => Some(Self::Data(D::QosDataCfAck)),
            (2, 10) => Some(Self::Data(D::QosDataCfPoll)),
            (2, 11) => Some(Self::Data(D::QosDataCfAckPoll)),
            (2, 12) => Some(Self::Data(D::QosNull)),
            (2, 13) => Some(Self::Data(D::QosNullCfAck)),
            (2, 14) => Some(Self::Data(D::QosCfPoll)),
            (2, 15) => Some(Self::Data(D::QosCfAckPoll)),
            _ => None,
        };

        category.unwrap_or_else(|| {
            log::trace!("unclassified frame type {} subtype {}", frame_type, subtype);
            Self::Unknown {
                frame_type,
                subtype,
            }
        })
    }

    /// Short report label, e.g. "beacon" or "qos_data".
    pub fn label(&self) -> &'static str {
        use ControlSubtype as C;
        use DataSubtype as D;
        use ManagementSubtype as M;

        match self {
            Self::Management(m) => match m {
                M::AssociationRequest => "assoc_req",
                M::AssociationResponse => "assoc_resp",
                M::ReassociationRequest => "reassoc_req",
                M::ReassociationResponse => "reassoc_resp",
                M::ProbeRequest => "probe_req",
                M::ProbeResponse => "probe_resp",
                M::TimingAdvertisement => "timing_adv",
                M::Beacon => "beacon",
                M::Atim => "atim",
                M::Disassociation => "disassoc",
                M::Authentication => "auth",
                M::Deauthentication => "deauth",
                M::Action => "action",
                M::ActionNoAck => "action_noack",
            },
            Self::Control(c) => match c {
                C::ControlWrapper => "ctrl_wrapper",
                C::BlockAckRequest => "block_ack_req",
                C::BlockAck => "block_ack",
                C::PsPoll => "ps_poll",
                C::Rts => "rts",
                C::Cts => "cts",
                C::Ack => "ack",
                C::CfEnd => "cf_end",
                C::CfEndAck => "cf_end_ack",
            },
            Self::Data(d) => match d {
                D::Data => "data",
                D::DataCfAck => "data_cf_ack",
                D::DataCfPoll => "data_cf_poll",
                D::DataCfAckPoll => "data_cf_ack_poll",
                D::Null => "null",
                D::CfAck => "cf_ack",
                D::CfPoll => "cf_poll",
                D::CfAckPoll => "cf_ack_poll",
                D::QosData => "qos_data",
                D::QosDataCfAck => "qos_data_cf_ack",
                D::QosDataCfPoll => "qos_data_cf_poll",
                D::QosDataCfAckPoll => "qos_data_cf_ack_poll",
                D::QosNull => "qos_null",
                D::QosNullCfAck => "qos_null_cf_ack",
                D::QosCfPoll => "qos_cf_poll",
                D::QosCfAckPoll => "qos_cf_ack_poll",
            },
            Self::Unknown { .. } => "unknown",
        }
    }

    /// Whether the frame body starts with a Fixed Parameters block.
    pub fn has_fixed_parameters(&self) -> bool {
        matches!(
            self,
            Self::Management(
                ManagementSubtype::Beacon
                    | ManagementSubtype::ProbeResponse
                    | ManagementSubtype::AssociationResponse
            )
        )
    }

    fn control_has_transmitter(&self) -> bool {
        matches!(
            self,
            Self::Control(
                ControlSubtype::Rts
                    | ControlSubtype::PsPoll
                    | ControlSubtype::CfEnd
                    | ControlSubtype::CfEndAck
                    | ControlSubtype::BlockAck
                    | ControlSubtype::BlockAckRequest
            )
        )
    }
}

// ── Decoding ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("frame too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
}

/// A decoded MAC header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFrame {
    pub byte_order: ByteOrder,
    pub control: FrameControl,
    pub category: FrameCategory,
    /// Duration/ID, host order
    pub duration: u16,
    /// Receiver address
    pub addr1: MacAddr,
    /// Transmitter address
    pub addr2: Option<MacAddr>,
    pub addr3: Option<MacAddr>,
    pub sequence: Option<SequenceControl>,
    /// Only present on WDS data frames
    pub addr4: Option<MacAddr>,
    pub fixed: Option<FixedParameters>,
    /// Offset of the frame body (after Fixed Parameters when decoded)
    pub body_offset: usize,
}

impl DecodedFrame {
    pub fn distribution(&self) -> Distribution {
        self.control.distribution()
    }

    pub fn bssid(&self) -> Option<MacAddr> {
        match self.distribution() {
            Distribution::Adhoc => self.addr3,
            Distribution::From => self.addr2,
            Distribution::To => Some(self.addr1),
            Distribution::Inter => None,
        }
    }

    pub fn source(&self) -> Option<MacAddr> {
        match self.distribution() {
            Distribution::Adhoc | Distribution::To => self.addr2,
            Distribution::From => self.addr3,
            Distribution::Inter => self.addr4,
        }
    }

    pub fn destination(&self) -> Option<MacAddr> {
        match self.distribution() {
            Distribution::Adhoc | Distribution::From => Some(self.addr1),
            Distribution::To | Distribution::Inter => self.addr3,
        }
    }

    /// Security mechanisms visible in the header alone.
    ///
    /// Uses the capability bits when Fixed Parameters were decoded,
    /// otherwise the protected bit of Frame Control stands in for WEP.
    pub fn crypto(&self) -> CryptoFlags {
        let capabilities = match self.fixed {
            Some(fixed) => fixed.capabilities,
            None => Capabilities {
                wep: self.control.wep_protected,
                ..Default::default()
            },
        };
        crypto::classify(capabilities, &[])
    }
}

/// Decode a raw 802.11 frame captured with `order`.
///
/// All-or-nothing: either the full header that fits in `buf` is returned
/// or [`FrameError::TooShort`].
pub fn decode(buf: &[u8], order: ByteOrder) -> Result<DecodedFrame, FrameError> {
    if buf.len() < MIN_HEADER_LEN {
        return Err(FrameError::TooShort {
            needed: MIN_HEADER_LEN,
            actual: buf.len(),
        });
    }

    let control = FrameControl::from_bytes([buf[0], buf[1]], order);
    let category = FrameCategory::classify(control.frame_type, control.subtype);
    let duration = order.read_u16([buf[2], buf[3]]);
    let addr1 = mac_at(buf, 4);

    let mut frame = DecodedFrame {
        byte_order: order,
        control,
        category,
        duration,
        addr1,
        addr2: None,
        addr3: None,
        sequence: None,
        addr4: None,
        fixed: None,
        body_offset: MIN_HEADER_LEN,
    };

    match category {
        FrameCategory::Control(_) => {
            if category.control_has_transmitter() && buf.len() >= 16 {
                frame.addr2 = Some(mac_at(buf, 10));
                frame.body_offset = 16;
            }
        }
        FrameCategory::Management(_) | FrameCategory::Data(_) => {
            decode_addressing(buf, &mut frame);
        }
        FrameCategory::Unknown { .. } => {}
    }

    if category.has_fixed_parameters() && frame.sequence.is_some() {
        if let Some(block) = buf.get(MGMT_HEADER_LEN..MGMT_HEADER_LEN + FIXED_PARAMS_LEN) {
            frame.fixed = FixedParameters::decode(block, order);
            frame.body_offset = MGMT_HEADER_LEN + FIXED_PARAMS_LEN;
        }
    }

    Ok(frame)
}

/// Address at `offset`. Callers check `buf.len() >= offset + 6` first.
fn mac_at(buf: &[u8], offset: usize) -> MacAddr {
    let mut addr = [0u8; 6];
    addr.copy_from_slice(&buf[offset..offset + 6]);
    MacAddr(addr)
}

fn decode_addressing(buf: &[u8], frame: &mut DecodedFrame) {
    if buf.len() >= 16 {
        frame.addr2 = Some(mac_at(buf, 10));
        frame.body_offset = 16;
    }
    if buf.len() < MGMT_HEADER_LEN {
        return;
    }

    frame.addr3 = Some(mac_at(buf, 16));
    let word = frame.byte_order.read_u16([buf[22], buf[23]]);
    frame.sequence = Some(SequenceControl::from_word(word, frame.byte_order));
    frame.body_offset = MGMT_HEADER_LEN;

    let wds = frame.control.to_ds && frame.control.from_ds;
    if wds && matches!(frame.category, FrameCategory::Data(_)) && buf.len() >= 30 {
        frame.addr4 = Some(mac_at(buf, 24));
        frame.body_offset = 30;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    const AP: [u8; 6] = [0x00, 0x11, 0x22, 0x33, 0x44, 0x55];
    const STA: [u8; 6] = [0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB];

    /// 24-byte three-address header with the given first two bytes.
    pub(crate) fn header(fc: [u8; 2], a1: [u8; 6], a2: [u8; 6], a3: [u8; 6]) -> std::vec::Vec<u8> {
        let mut buf = std::vec::Vec::new();
        buf.extend_from_slice(&fc);
        buf.extend_from_slice(&[0x00, 0x00]);
        buf.extend_from_slice(&a1);
        buf.extend_from_slice(&a2);
        buf.extend_from_slice(&a3);
        buf.extend_from_slice(&[0x10, 0x00]);
        buf
    }

    /// Management header plus a 12-byte Fixed Parameters block.
    fn with_fixed_block(fc: [u8; 2], cap: [u8; 2]) -> std::vec::Vec<u8> {
        let mut buf = header(fc, MacAddr::BROADCAST.0, AP, AP);
        buf.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        buf.extend_from_slice(&[0x64, 0x00]);
        buf.extend_from_slice(&cap);
        buf
    }

    fn beacon(cap: [u8; 2]) -> std::vec::Vec<u8> {
        with_fixed_block([0x80, 0x00], cap)
    }

    // ── Frame Control layout ────────────────────────────────────────

    #[test]
    fn frame_control_round_trips_every_word_both_orders() {
        for order in [ByteOrder::Little, ByteOrder::Big] {
            for word in 0..=u16::MAX {
                let fc = FrameControl::from_word(word, order);
                assert_eq!(fc.to_word(order), word, "{order:?} word {word:#06x}");
            }
        }
    }

    #[test]
    fn same_wire_bytes_decode_identically_in_both_orders() {
        for b0 in 0..=u8::MAX {
            for b1 in [0x00, 0x01, 0x02, 0x40, 0x41, 0xFF] {
                let le = FrameControl::from_bytes([b0, b1], ByteOrder::Little);
                let be = FrameControl::from_bytes([b0, b1], ByteOrder::Big);
                assert_eq!(le, be);
            }
        }
    }

    #[test]
    fn layouts_place_fields_at_different_offsets() {
        // Beacon, to_ds set
        let fc = FrameControl {
            frame_type: 0,
            subtype: 8,
            to_ds: true,
            ..Default::default()
        };
        assert_eq!(fc.to_word(ByteOrder::Little), 0x0180);
        assert_eq!(fc.to_word(ByteOrder::Big), 0x8001);
        assert_eq!(fc.to_bytes(ByteOrder::Little), fc.to_bytes(ByteOrder::Big));
    }

    #[test]
    fn frame_control_flags() {
        let fc = FrameControl::from_bytes([0x08, 0x42], ByteOrder::Little);
        assert_eq!(fc.frame_type, 2);
        assert_eq!(fc.subtype, 0);
        assert!(fc.from_ds);
        assert!(!fc.to_ds);
        assert!(fc.wep_protected);
        assert!(!fc.retry);
        assert_eq!(fc.distribution(), Distribution::From);
    }

    #[test]
    fn encode_truncates_oversized_fields() {
        let fc = FrameControl {
            version: 0xFF,
            subtype: 0x1F,
            ..Default::default()
        };
        let back = FrameControl::from_word(fc.to_word(ByteOrder::Little), ByteOrder::Little);
        assert_eq!(back.version, 3);
        assert_eq!(back.subtype, 0x0F);
        assert_eq!(back.frame_type, 0);
    }

    // ── Sequence Control ────────────────────────────────────────────

    #[test]
    fn sequence_control_from_wire() {
        for order in [ByteOrder::Little, ByteOrder::Big] {
            let sc = SequenceControl::from_word(order.read_u16([0x15, 0x32]), order);
            assert_eq!(sc.fragment_number, 5);
            assert_eq!(sc.sequence_number, 0x321);
        }
    }

    #[test]
    fn sequence_control_round_trips_both_orders() {
        for order in [ByteOrder::Little, ByteOrder::Big] {
            for word in (0..=u16::MAX).step_by(7) {
                let sc = SequenceControl::from_word(word, order);
                assert!(sc.fragment_number < 16);
                assert!(sc.sequence_number < 4096);
                assert_eq!(sc.to_word(order), word);
            }
        }
    }

    // ── decode ──────────────────────────────────────────────────────

    #[test]
    fn rejects_short_buffer() {
        assert_eq!(
            decode(&[0x80, 0x00, 0x00], ByteOrder::Little),
            Err(FrameError::TooShort {
                needed: MIN_HEADER_LEN,
                actual: 3
            })
        );
        assert!(decode(&[], ByteOrder::Big).is_err());
    }

    #[test]
    fn beacon_with_fixed_parameters() {
        let buf = beacon([0x11, 0x04]);
        let frame = decode(&buf, ByteOrder::Little).unwrap();
        assert_eq!(
            frame.category,
            FrameCategory::Management(ManagementSubtype::Beacon)
        );
        assert_eq!(frame.category.label(), "beacon");
        assert_eq!(frame.addr2, Some(MacAddr(AP)));
        assert_eq!(frame.sequence.unwrap().sequence_number, 1);

        let fixed = frame.fixed.expect("fixed parameters");
        assert_eq!(fixed.timestamp, 0x0807060504030201);
        assert_eq!(fixed.beacon_interval, 100);
        assert_eq!(fixed.beacon_interval_micros(), 102_400);
        assert!(fixed.capabilities.ess);
        assert!(fixed.capabilities.wep);
        assert!(!fixed.capabilities.ibss);
        assert_eq!(frame.body_offset, 36);
        assert_eq!(frame.crypto(), CryptoFlags::WEP);
    }

    #[test]
    fn header_only_beacon_has_no_fixed_parameters() {
        let buf = header([0x80, 0x00], MacAddr::BROADCAST.0, AP, AP);
        assert_eq!(buf.len(), 24);
        let frame = decode(&buf, ByteOrder::Little).unwrap();
        assert_eq!(frame.category.label(), "beacon");
        assert!(frame.fixed.is_none());
        assert_eq!(frame.body_offset, 24);
    }

    #[test]
    fn beacon_interval_follows_capture_order() {
        let buf = beacon([0x01, 0x00]);
        let le = decode(&buf, ByteOrder::Little).unwrap().fixed.unwrap();
        let be = decode(&buf, ByteOrder::Big).unwrap().fixed.unwrap();
        assert_eq!(le.beacon_interval, 100);
        assert_eq!(be.beacon_interval, 0x6400);
        assert_eq!(be.timestamp, 0x0102030405060708);
        // Capability bits sit in the same wire positions either way
        assert_eq!(le.capabilities, be.capabilities);
        assert!(be.capabilities.ess);
    }

    #[test]
    fn probe_and_assoc_response_carry_fixed_parameters() {
        for (fc, label) in [([0x50, 0x00], "probe_resp"), ([0x10, 0x00], "assoc_resp")] {
            let buf = with_fixed_block(fc, [0x01, 0x00]);
            assert_eq!(buf.len(), 36);
            let frame = decode(&buf, ByteOrder::Little).unwrap();
            assert_eq!(frame.category.label(), label);
            let fixed = frame.fixed.expect(label);
            assert_eq!(fixed.beacon_interval, 100);
            assert!(fixed.capabilities.ess);
            assert_eq!(frame.body_offset, 36);
        }
    }

    #[test]
    fn other_management_subtypes_skip_fixed_parameters() {
        for (fc, label) in [([0x30, 0x00], "reassoc_resp"), ([0xB0, 0x00], "auth")] {
            let buf = with_fixed_block(fc, [0x01, 0x00]);
            let frame = decode(&buf, ByteOrder::Little).unwrap();
            assert_eq!(frame.category.label(), label);
            assert!(frame.fixed.is_none(), "{label}");
            assert_eq!(frame.body_offset, 24);
        }
    }

    #[test]
    fn probe_request_has_no_fixed_parameters() {
        let mut buf = header([0x40, 0x00], MacAddr::BROADCAST.0, STA, MacAddr::BROADCAST.0);
        buf.extend_from_slice(&[0u8; 12]);
        let frame = decode(&buf, ByteOrder::Little).unwrap();
        assert_eq!(frame.category.label(), "probe_req");
        assert!(frame.fixed.is_none());
    }

    #[test]
    fn reserved_type_is_unknown_not_error() {
        // type 3
        let frame = decode(&[0x0C, 0x00, 0, 0, 1, 2, 3, 4, 5, 6], ByteOrder::Little).unwrap();
        assert_eq!(
            frame.category,
            FrameCategory::Unknown {
                frame_type: 3,
                subtype: 0
            }
        );
        assert_eq!(frame.category.label(), "unknown");
        assert_eq!(frame.addr1, MacAddr([1, 2, 3, 4, 5, 6]));
        assert!(frame.addr2.is_none());
    }

    #[test]
    fn minimum_header_reads_receiver_and_ignores_trailing_bytes() {
        let mut buf = [0xEEu8; 15];
        buf[..2].copy_from_slice(&[0xC4, 0x00]);
        buf[4..10].copy_from_slice(&AP);
        for len in [MIN_HEADER_LEN, 15] {
            let frame = decode(&buf[..len], ByteOrder::Big).unwrap();
            assert_eq!(frame.category, FrameCategory::Control(ControlSubtype::Cts));
            assert_eq!(frame.addr1, MacAddr(AP));
            assert!(frame.addr2.is_none());
        }
    }

    #[test]
    fn reserved_management_subtype_is_unknown() {
        let buf = header([0xF0, 0x00], AP, STA, AP);
        let frame = decode(&buf, ByteOrder::Little).unwrap();
        assert!(matches!(frame.category, FrameCategory::Unknown { frame_type: 0, subtype: 15 }));
    }

    #[test]
    fn ack_carries_only_receiver() {
        let mut buf = [0u8; 14];
        buf[0] = 0xD4;
        buf[4..10].copy_from_slice(&STA);
        let frame = decode(&buf, ByteOrder::Little).unwrap();
        assert_eq!(frame.category, FrameCategory::Control(ControlSubtype::Ack));
        assert_eq!(frame.addr1, MacAddr(STA));
        assert!(frame.addr2.is_none());
        assert!(frame.sequence.is_none());
    }

    #[test]
    fn rts_carries_transmitter() {
        let mut buf = [0u8; 16];
        buf[0] = 0xB4;
        buf[4..10].copy_from_slice(&AP);
        buf[10..16].copy_from_slice(&STA);
        let frame = decode(&buf, ByteOrder::Little).unwrap();
        assert_eq!(frame.category.label(), "rts");
        assert_eq!(frame.addr2, Some(MacAddr(STA)));
    }

    #[test]
    fn short_data_frame_keeps_partial_addressing() {
        let buf = header([0x08, 0x01], AP, STA, AP);
        let frame = decode(&buf[..18], ByteOrder::Little).unwrap();
        assert_eq!(frame.addr2, Some(MacAddr(STA)));
        assert!(frame.addr3.is_none());
        assert!(frame.sequence.is_none());
    }

    #[test]
    fn wds_data_frame_has_fourth_address() {
        let mut buf = header([0x08, 0x03], AP, STA, AP);
        buf.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x01]);
        let frame = decode(&buf, ByteOrder::Little).unwrap();
        assert_eq!(frame.distribution(), Distribution::Inter);
        assert_eq!(frame.addr4, Some(MacAddr([0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x01])));
        assert_eq!(frame.source(), frame.addr4);
        assert_eq!(frame.bssid(), None);
        assert_eq!(frame.body_offset, 30);
    }

    #[test]
    fn to_ds_addressing_helpers() {
        let buf = header([0x88, 0x41], AP, STA, [9; 6]);
        let frame = decode(&buf, ByteOrder::Little).unwrap();
        assert_eq!(frame.category.label(), "qos_data");
        assert_eq!(frame.distribution(), Distribution::To);
        assert_eq!(frame.bssid(), Some(MacAddr(AP)));
        assert_eq!(frame.source(), Some(MacAddr(STA)));
        assert_eq!(frame.destination(), Some(MacAddr([9; 6])));
        assert_eq!(frame.crypto(), CryptoFlags::WEP);
    }

    // ── MacAddr ─────────────────────────────────────────────────────

    #[test]
    fn mac_display_and_flags() {
        use std::string::ToString;

        let mac = MacAddr([0xB4, 0x1E, 0x52, 0xAB, 0xCD, 0xEF]);
        assert_eq!(mac.to_string(), "b4:1e:52:ab:cd:ef");
        assert_eq!(mac.oui(), [0xB4, 0x1E, 0x52]);
        assert!(!mac.is_multicast());
        assert!(MacAddr::BROADCAST.is_broadcast());
        assert!(MacAddr::BROADCAST.is_multicast());
        assert!(MacAddr::from_slice(&[1, 2, 3]).is_none());
    }
}
