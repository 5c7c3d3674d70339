//! Named, continuously filtered views over the tracked device population.
//!
//! A [`DeviceView`] holds an insertion-ordered list of device handles plus a
//! presence set keyed by [`DeviceKey`]. Both live behind one view lock and
//! are always changed together, so a key is present iff its device is in
//! the list.
//!
//! Two lock tiers:
//! 1. The view lock guards the list and presence set. It is held only for
//!    copies, splices and set updates, never across predicate evaluation.
//! 2. Each device's own lock guards its attributes. A scan takes it around
//!    one `match_device` call at a time, never while holding the view lock.
//!
//! Scans run against a snapshot copied under the view lock, so mutations
//! proceed while a slow worker is still evaluating.
//!
//! Lock order: membership callbacks run with the view lock held and may
//! take a device lock. Workers run with a device lock held and must not
//! call back into the view.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

pub use crate::protocol::DeviceKey;

/// A device owned by the external tracker.
pub trait TrackedDevice: Send + Sync {
    /// Mutable attributes guarded by the per-device lock.
    type State;

    /// Unique and stable for the device's lifetime. Must not take the
    /// device lock.
    fn key(&self) -> DeviceKey;

    fn state(&self) -> &Mutex<Self::State>;
}

/// A predicate run over a view's devices.
///
/// `match_device` is called with the device's lock held. A panic aborts
/// the scan and propagates to the caller; `set_matched_devices` is then
/// never called.
pub trait ViewWorker<D: TrackedDevice> {
    fn match_device(&mut self, device: &D, state: &D::State) -> bool;

    /// Receives every matched device, in view order, once the scan ends.
    fn set_matched_devices(&mut self, _devices: &[Arc<D>]) {}
}

/// Membership callback supplied at construction.
pub type DevicePredicate<D> = Box<dyn Fn(&D) -> bool + Send + Sync>;

struct Membership<D> {
    devices: Vec<Arc<D>>,
    present: HashSet<DeviceKey>,
}

impl<D: TrackedDevice> Membership<D> {
    fn insert(&mut self, device: &Arc<D>) -> bool {
        if !self.present.insert(device.key()) {
            return false;
        }
        self.devices.push(Arc::clone(device));
        true
    }

    /// Linear in view size.
    fn remove(&mut self, device: &Arc<D>) -> bool {
        let key = device.key();
        if !self.present.remove(&key) {
            return false;
        }
        if let Some(pos) = self
            .devices
            .iter()
            .position(|d| Arc::ptr_eq(d, device) || d.key() == key)
        {
            self.devices.remove(pos);
        }
        true
    }
}

pub struct DeviceView<D: TrackedDevice> {
    id: String,
    uri: String,
    new_cb: Option<DevicePredicate<D>>,
    update_cb: Option<DevicePredicate<D>>,
    members: Mutex<Membership<D>>,
}

impl<D: TrackedDevice> DeviceView<D> {
    /// Create an empty view.
    ///
    /// An absent `new_cb` means new devices are never admitted; an absent
    /// `update_cb` means updates never change membership. Only explicit
    /// removal works on such a view.
    pub fn new(
        id: impl Into<String>,
        new_cb: Option<DevicePredicate<D>>,
        update_cb: Option<DevicePredicate<D>>,
    ) -> Self {
        let id = id.into();
        let uri = crate::endpoint::view_uri(&id);
        log::debug!("created device view {} at {}", id, uri);
        Self {
            id,
            uri,
            new_cb,
            update_cb,
            members: Mutex::new(Membership {
                devices: Vec::new(),
                present: HashSet::new(),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Resource path this view is served under.
    pub fn endpoint_uri(&self) -> &str {
        &self.uri
    }

    pub fn len(&self) -> usize {
        self.members.lock().devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: DeviceKey) -> bool {
        self.members.lock().present.contains(&key)
    }

    /// Copy of the device list as of now, in insertion order.
    pub fn snapshot(&self) -> Vec<Arc<D>> {
        self.members.lock().devices.clone()
    }

    /// A device appeared upstream. Admitted if `new_cb` accepts it.
    ///
    /// A device whose key is already present is left where it is.
    pub fn new_device(&self, device: &Arc<D>) {
        let Some(new_cb) = &self.new_cb else {
            return;
        };

        let mut members = self.members.lock();
        if new_cb(device.as_ref()) && members.insert(device) {
            log::debug!("view {}: admitted {}", self.id, device.key());
        }
    }

    /// A device changed upstream. Re-evaluates membership with `update_cb`.
    ///
    /// absent + retain → appended; present + !retain → removed; otherwise
    /// nothing changes.
    pub fn update_device(&self, device: &Arc<D>) {
        let Some(update_cb) = &self.update_cb else {
            return;
        };

        let mut members = self.members.lock();
        let retain = update_cb(device.as_ref());
        let present = members.present.contains(&device.key());

        if retain && !present {
            members.insert(device);
            log::debug!("view {}: {} now matches", self.id, device.key());
        } else if !retain && present {
            members.remove(device);
            log::debug!("view {}: {} no longer matches", self.id, device.key());
        }
    }

    /// A device was deleted upstream. Removed regardless of the callbacks.
    pub fn remove_device(&self, device: &Arc<D>) {
        if self.members.lock().remove(device) {
            log::debug!("view {}: removed {}", self.id, device.key());
        }
    }

    /// Run `worker` over a snapshot of the view.
    ///
    /// The view lock is held only while copying the list.
    pub fn do_device_work<W: ViewWorker<D>>(&self, worker: &mut W) -> Vec<Arc<D>> {
        let snapshot = self.snapshot();
        scan_devices(worker, &snapshot)
    }

    /// Run `worker` over a caller-supplied device list, e.g. the result of
    /// an earlier scan.
    pub fn do_device_work_on<W: ViewWorker<D>>(
        &self,
        worker: &mut W,
        devices: &[Arc<D>],
    ) -> Vec<Arc<D>> {
        scan_devices(worker, devices)
    }
}

/// Evaluate `worker` on each device under that device's lock and hand the
/// matches, in order, to `set_matched_devices`.
pub fn scan_devices<D, W>(worker: &mut W, devices: &[Arc<D>]) -> Vec<Arc<D>>
where
    D: TrackedDevice,
    W: ViewWorker<D>,
{
    let mut matched = Vec::new();

    for device in devices {
        let hit = {
            let state = device.state().lock();
            worker.match_device(device.as_ref(), &state)
        };
        if hit {
            matched.push(Arc::clone(device));
        }
    }

    worker.set_matched_devices(&matched);
    matched
}
