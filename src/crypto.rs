/// Security mechanism classification.
///
/// Combines the capability bits seen in management frames with cipher
/// indicators the caller derived from higher-layer traffic into a single
/// bitmask. This module only combines bits; it never inspects traffic.
use core::fmt;

use crate::frame::Capabilities;

/// Bitmask of detected security mechanisms.
///
/// Multiple bits can be set at once. For a given device the mask only
/// grows: use [`CryptoFlags::merge`] to fold in newer observations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CryptoFlags(u32);

impl CryptoFlags {
    pub const NONE: Self = Self(0);
    pub const UNKNOWN: Self = Self(1);
    pub const WEP: Self = Self(1 << 1);
    pub const LAYER3: Self = Self(1 << 2);
    // Derived from WPA headers
    pub const WEP40: Self = Self(1 << 3);
    pub const WEP104: Self = Self(1 << 4);
    pub const TKIP: Self = Self(1 << 5);
    pub const WPA: Self = Self(1 << 6);
    pub const PSK: Self = Self(1 << 7);
    pub const AES_OCB: Self = Self(1 << 8);
    pub const AES_CCM: Self = Self(1 << 9);
    // Derived from data traffic
    pub const LEAP: Self = Self(1 << 10);
    pub const TTLS: Self = Self(1 << 11);
    pub const TLS: Self = Self(1 << 12);
    pub const PEAP: Self = Self(1 << 13);
    pub const ISAKMP: Self = Self(1 << 14);
    pub const PPTP: Self = Self(1 << 15);

    /// Every named bit with its report label, in bit order.
    pub const NAMED: &'static [(CryptoFlags, &'static str)] = &[
        (Self::UNKNOWN, "unknown"),
        (Self::WEP, "wep"),
        (Self::LAYER3, "layer3"),
        (Self::WEP40, "wep40"),
        (Self::WEP104, "wep104"),
        (Self::TKIP, "tkip"),
        (Self::WPA, "wpa"),
        (Self::PSK, "psk"),
        (Self::AES_OCB, "aes_ocb"),
        (Self::AES_CCM, "aes_ccm"),
        (Self::LEAP, "leap"),
        (Self::TTLS, "ttls"),
        (Self::TLS, "tls"),
        (Self::PEAP, "peap"),
        (Self::ISAKMP, "isakmp"),
        (Self::PPTP, "pptp"),
    ];

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Build a mask from raw bits. Bits outside the named set are dropped.
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & 0xFFFF)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if every bit of `other` is also set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Fold a newer observation into an accumulated mask.
    pub fn merge(&mut self, observed: Self) {
        if !self.contains(observed) {
            log::trace!("crypto mask {:#06x} grows by {:#06x}", self.0, observed.0 & !self.0);
        }
        self.insert(observed);
    }

    /// Labels of the set bits, in bit order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMED
            .iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
    }
}

impl core::ops::BitOr for CryptoFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl core::ops::BitOrAssign for CryptoFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for CryptoFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let mut first = true;
        for name in self.names() {
            if !first {
                f.write_str("+")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}

/// Cipher indicators observed by the caller outside the MAC header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherHint {
    /// Protected traffic whose mechanism could not be identified
    Unknown,
    /// Encryption seen only above the link layer
    Layer3,
    Wep40,
    Wep104,
    Tkip,
    Wpa,
    Psk,
    AesOcb,
    AesCcm,
    Leap,
    Ttls,
    Tls,
    Peap,
    Isakmp,
    Pptp,
}

impl CipherHint {
    pub const fn flag(self) -> CryptoFlags {
        match self {
            CipherHint::Unknown => CryptoFlags::UNKNOWN,
            CipherHint::Layer3 => CryptoFlags::LAYER3,
            CipherHint::Wep40 => CryptoFlags::WEP40,
            CipherHint::Wep104 => CryptoFlags::WEP104,
            CipherHint::Tkip => CryptoFlags::TKIP,
            CipherHint::Wpa => CryptoFlags::WPA,
            CipherHint::Psk => CryptoFlags::PSK,
            CipherHint::AesOcb => CryptoFlags::AES_OCB,
            CipherHint::AesCcm => CryptoFlags::AES_CCM,
            CipherHint::Leap => CryptoFlags::LEAP,
            CipherHint::Ttls => CryptoFlags::TTLS,
            CipherHint::Tls => CryptoFlags::TLS,
            CipherHint::Peap => CryptoFlags::PEAP,
            CipherHint::Isakmp => CryptoFlags::ISAKMP,
            CipherHint::Pptp => CryptoFlags::PPTP,
        }
    }
}

/// Combine capability bits and observed hints into a mask.
///
/// Deterministic and monotonic: a superset of hints never yields a mask
/// missing a bit the subset produced.
pub fn classify(capabilities: Capabilities, hints: &[CipherHint]) -> CryptoFlags {
    let mut flags = CryptoFlags::NONE;

    if capabilities.wep {
        flags.insert(CryptoFlags::WEP);
    }

    for hint in hints {
        flags.insert(hint.flag());
    }

    flags
}
