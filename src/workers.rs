/// Stock view workers.
///
/// Each worker is a predicate over a device's attributes. Workers record
/// the keys of the devices a scan matched so callers can read the result
/// after [`DeviceView::do_device_work`](crate::view::DeviceView::do_device_work).
use std::sync::Arc;

use crate::crypto::CryptoFlags;
use crate::frame::MacAddr;
use crate::view::{DeviceKey, TrackedDevice, ViewWorker};

/// Attributes the stock workers read from a device's locked state.
pub trait DeviceAttributes {
    fn mac(&self) -> MacAddr;
    /// Last advertised or probed SSID; empty if none
    fn ssid(&self) -> &str;
    /// Last signal strength in dBm
    fn rssi(&self) -> i8;
    /// Accumulated security mechanisms
    fn crypto(&self) -> CryptoFlags;
}

fn collect_keys<D: TrackedDevice>(devices: &[Arc<D>]) -> Vec<DeviceKey> {
    devices.iter().map(|d| d.key()).collect()
}

/// How [`SsidWorker`] compares SSIDs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SsidMatch {
    Exact,
    /// Case-insensitive substring
    Contains,
}

/// Devices whose SSID equals, or contains, a given string.
#[derive(Debug, Clone)]
pub struct SsidWorker {
    needle: String,
    mode: SsidMatch,
    pub matched: Vec<DeviceKey>,
}

impl SsidWorker {
    pub fn new(ssid: &str, mode: SsidMatch) -> Self {
        let needle = match mode {
            SsidMatch::Exact => ssid.to_owned(),
            SsidMatch::Contains => ssid.to_ascii_lowercase(),
        };
        Self {
            needle,
            mode,
            matched: Vec::new(),
        }
    }

    fn matches(&self, ssid: &str) -> bool {
        match self.mode {
            SsidMatch::Exact => ssid == self.needle,
            SsidMatch::Contains => ssid.to_ascii_lowercase().contains(&self.needle),
        }
    }
}

impl<D> ViewWorker<D> for SsidWorker
where
    D: TrackedDevice,
    D::State: DeviceAttributes,
{
    fn match_device(&mut self, _device: &D, state: &D::State) -> bool {
        self.matches(state.ssid())
    }

    fn set_matched_devices(&mut self, devices: &[Arc<D>]) {
        self.matched = collect_keys(devices);
    }
}

/// Devices whose MAC starts with one of a set of OUI prefixes.
#[derive(Debug, Clone)]
pub struct MacPrefixWorker {
    prefixes: Vec<[u8; 3]>,
    pub matched: Vec<DeviceKey>,
}

impl MacPrefixWorker {
    pub fn new(prefixes: &[[u8; 3]]) -> Self {
        Self {
            prefixes: prefixes.to_vec(),
            matched: Vec::new(),
        }
    }
}

impl<D> ViewWorker<D> for MacPrefixWorker
where
    D: TrackedDevice,
    D::State: DeviceAttributes,
{
    fn match_device(&mut self, _device: &D, state: &D::State) -> bool {
        let oui = state.mac().oui();
        self.prefixes.contains(&oui)
    }

    fn set_matched_devices(&mut self, devices: &[Arc<D>]) {
        self.matched = collect_keys(devices);
    }
}

/// Devices with signal at or above a threshold.
#[derive(Debug, Clone)]
pub struct SignalWorker {
    min_rssi: i8,
    pub matched: Vec<DeviceKey>,
}

impl SignalWorker {
    pub fn new(min_rssi: i8) -> Self {
        Self {
            min_rssi,
            matched: Vec::new(),
        }
    }
}

impl<D> ViewWorker<D> for SignalWorker
where
    D: TrackedDevice,
    D::State: DeviceAttributes,
{
    fn match_device(&mut self, _device: &D, state: &D::State) -> bool {
        state.rssi() >= self.min_rssi
    }

    fn set_matched_devices(&mut self, devices: &[Arc<D>]) {
        self.matched = collect_keys(devices);
    }
}

/// Devices whose crypto mask contains every bit of `required`.
/// `CryptoFlags::NONE` selects open devices only.
#[derive(Debug, Clone)]
pub struct CryptoWorker {
    required: CryptoFlags,
    pub matched: Vec<DeviceKey>,
}

impl CryptoWorker {
    pub fn new(required: CryptoFlags) -> Self {
        Self {
            required,
            matched: Vec::new(),
        }
    }
}

impl<D> ViewWorker<D> for CryptoWorker
where
    D: TrackedDevice,
    D::State: DeviceAttributes,
{
    fn match_device(&mut self, _device: &D, state: &D::State) -> bool {
        let crypto = state.crypto();
        if self.required.is_empty() {
            crypto.is_empty()
        } else {
            crypto.contains(self.required)
        }
    }

    fn set_matched_devices(&mut self, devices: &[Arc<D>]) {
        self.matched = collect_keys(devices);
    }
}

/// Matches every device; keeps the ordered key list. Used by the endpoint.
#[derive(Debug, Clone, Default)]
pub struct KeyListWorker {
    pub keys: Vec<DeviceKey>,
}

impl<D: TrackedDevice> ViewWorker<D> for KeyListWorker {
    fn match_device(&mut self, _device: &D, _state: &D::State) -> bool {
        true
    }

    fn set_matched_devices(&mut self, devices: &[Arc<D>]) {
        self.keys = collect_keys(devices);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::tests::{device, TestDevice};
    use crate::view::DeviceView;

    fn populated() -> (DeviceView<TestDevice>, Vec<Arc<TestDevice>>) {
        let view = DeviceView::new(
            "all",
            Some(Box::new(|_: &TestDevice| true)),
            Some(Box::new(|_: &TestDevice| true)),
        );
        let devices: Vec<_> = (1..=4).map(|n| device(n, n % 2 == 1)).collect();
        for d in &devices {
            view.new_device(d);
        }
        (view, devices)
    }

    #[test]
    fn ssid_exact_and_contains() {
        let (view, devices) = populated();
        devices[2].state().lock().ssid = "Flock-A1B2C3".into();

        let mut exact = SsidWorker::new("net-2", SsidMatch::Exact);
        view.do_device_work(&mut exact);
        assert_eq!(exact.matched, vec![devices[1].key()]);

        let mut contains = SsidWorker::new("FLOCK", SsidMatch::Contains);
        view.do_device_work(&mut contains);
        assert_eq!(contains.matched, vec![devices[2].key()]);

        let mut exact_case = SsidWorker::new("NET-2", SsidMatch::Exact);
        assert!(view.do_device_work(&mut exact_case).is_empty());
    }

    #[test]
    fn mac_prefix() {
        let (view, devices) = populated();
        devices[3].state().lock().mac = MacAddr([0xB4, 0x1E, 0x52, 0, 0, 1]);

        let mut worker = MacPrefixWorker::new(&[[0xB4, 0x1E, 0x52], [0x58, 0x8E, 0x81]]);
        view.do_device_work(&mut worker);
        assert_eq!(worker.matched, vec![devices[3].key()]);

        let mut fixture_prefix = MacPrefixWorker::new(&[[0x02, 0x00, 0x00]]);
        assert_eq!(view.do_device_work(&mut fixture_prefix).len(), 3);
    }

    #[test]
    fn signal_threshold_is_inclusive() {
        let (view, devices) = populated();
        // rssi = -40 - n
        let mut worker = SignalWorker::new(-42);
        view.do_device_work(&mut worker);
        assert_eq!(worker.matched, vec![devices[0].key(), devices[1].key()]);
    }

    #[test]
    fn crypto_requirement() {
        let (view, devices) = populated();
        devices[0].state().lock().crypto = CryptoFlags::WPA | CryptoFlags::PSK;
        devices[1].state().lock().crypto = CryptoFlags::WEP;

        let mut wpa = CryptoWorker::new(CryptoFlags::WPA);
        view.do_device_work(&mut wpa);
        assert_eq!(wpa.matched, vec![devices[0].key()]);

        let mut open = CryptoWorker::new(CryptoFlags::NONE);
        view.do_device_work(&mut open);
        assert_eq!(open.matched, vec![devices[2].key(), devices[3].key()]);
    }

    #[test]
    fn key_list_keeps_view_order() {
        let (view, devices) = populated();
        let mut worker = KeyListWorker::default();
        view.do_device_work(&mut worker);
        let expected: Vec<_> = devices.iter().map(|d| d.key()).collect();
        assert_eq!(worker.keys, expected);
    }
}
