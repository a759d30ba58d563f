//! Input source registry
//!
//! Versioned record arena keyed by logical device. Mutations take effect
//! on the live record set immediately, but [`list`](InputSourceRegistry::list)
//! keeps returning the snapshot published at the last frame boundary until
//! [`commit`](InputSourceRegistry::commit) is called.

use hashbrown::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::InputError;
use crate::event::InputSourcesChangeEvent;
use crate::gamepad::XrGamepad;
use crate::source::{DeviceId, InputSource, InputSourceDescriptor, InputSourceId};

/// Callback invoked once per frame boundary with a non-empty change set
pub type ChangeListener = Box<dyn FnMut(&InputSourcesChangeEvent)>;

/// Live record for one logical device
struct Record {
    device: DeviceId,
    descriptor: InputSourceDescriptor,
    source: Arc<InputSource>,
}

/// Active input sources and their change notifications
#[derive(Default)]
pub struct InputSourceRegistry {
    /// Live records in enumeration (connection) order
    records: Vec<Record>,
    /// Snapshot visible to callers for the current frame
    published: Vec<Arc<InputSource>>,
    /// Sources created since the last commit, in creation order
    introduced: Vec<Arc<InputSource>>,
    /// Sources retired since the last commit, in retirement order
    departed: Vec<Arc<InputSource>>,
    listeners: Vec<ChangeListener>,
    next_source: u64,
}

impl InputSourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a fresh source identity
    pub fn allocate_id(&mut self) -> InputSourceId {
        self.next_source += 1;
        InputSourceId(self.next_source)
    }

    /// Register a listener for change notifications
    pub fn subscribe(&mut self, listener: ChangeListener) {
        self.listeners.push(listener);
    }

    /// Frame-stable snapshot of the active sources
    pub fn list(&self) -> &[Arc<InputSource>] {
        &self.published
    }

    /// Number of live sources, including uncommitted changes
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Live source for a device, including uncommitted changes
    pub fn get(&self, device: DeviceId) -> Option<&Arc<InputSource>> {
        self.record(device).map(|record| &record.source)
    }

    /// Descriptor the live source of a device was built from
    pub fn descriptor(&self, device: DeviceId) -> Option<&InputSourceDescriptor> {
        self.record(device).map(|record| &record.descriptor)
    }

    /// Live sources in enumeration order
    pub fn live(&self) -> impl Iterator<Item = &Arc<InputSource>> {
        self.records.iter().map(|record| &record.source)
    }

    /// Latest snapshot of a source instance, live or retired since the last commit
    pub fn find(&self, id: InputSourceId) -> Option<&Arc<InputSource>> {
        self.live()
            .chain(self.departed.iter())
            .find(|source| source.id() == id)
    }

    /// Sources created since the last commit
    pub fn introduced(&self) -> &[Arc<InputSource>] {
        &self.introduced
    }

    /// Sources retired since the last commit
    pub fn departed(&self) -> &[Arc<InputSource>] {
        &self.departed
    }

    fn record(&self, device: DeviceId) -> Option<&Record> {
        self.records.iter().find(|record| record.device == device)
    }

    fn position(&self, device: DeviceId) -> Result<usize, InputError> {
        self.records
            .iter()
            .position(|record| record.device == device)
            .ok_or(InputError::UnknownDevice(device))
    }

    /// Add a source for a device that has none
    pub fn insert(
        &mut self,
        descriptor: InputSourceDescriptor,
        source: InputSource,
    ) -> Result<Arc<InputSource>, InputError> {
        let device = source.device();
        if self.record(device).is_some() {
            return Err(InputError::DuplicateDevice(device));
        }
        let source = Arc::new(source);
        info!(
            "Input source {} added for device {} ({}, {})",
            source.id(),
            device,
            source.target_ray_mode().as_str(),
            source.handedness().as_str()
        );
        self.introduced.push(source.clone());
        self.records.push(Record {
            device,
            descriptor,
            source: source.clone(),
        });
        Ok(source)
    }

    /// Retire a device's source and publish a new one in the same position
    pub fn replace(
        &mut self,
        descriptor: InputSourceDescriptor,
        source: InputSource,
    ) -> Result<Arc<InputSource>, InputError> {
        let device = source.device();
        let index = self.position(device)?;
        let source = Arc::new(source);
        let record = &mut self.records[index];
        let old = std::mem::replace(&mut record.source, source.clone());
        record.descriptor = descriptor;
        info!(
            "Input source {} replaced by {} for device {}",
            old.id(),
            source.id(),
            device
        );
        self.departed.push(old.clone());
        self.introduced.push(source);
        Ok(old)
    }

    /// Retire a device's source
    pub fn remove(&mut self, device: DeviceId) -> Result<Arc<InputSource>, InputError> {
        let index = self.position(device)?;
        let record = self.records.remove(index);
        info!(
            "Input source {} removed for device {}",
            record.source.id(),
            device
        );
        self.departed.push(record.source.clone());
        Ok(record.source)
    }

    /// Republish a device's source with new gamepad readings, same identity
    pub fn update_gamepad(
        &mut self,
        device: DeviceId,
        gamepad: XrGamepad,
    ) -> Result<Arc<InputSource>, InputError> {
        let index = self.position(device)?;
        let record = &mut self.records[index];
        record.source = Arc::new(record.source.with_gamepad(gamepad));
        Ok(record.source.clone())
    }

    /// Sources added and removed between two snapshots, by identity
    pub fn diff(old: &[Arc<InputSource>], new: &[Arc<InputSource>]) -> InputSourcesChangeEvent {
        let old_ids: HashSet<InputSourceId> = old.iter().map(|s| s.id()).collect();
        let new_ids: HashSet<InputSourceId> = new.iter().map(|s| s.id()).collect();
        InputSourcesChangeEvent {
            added: new
                .iter()
                .filter(|s| !old_ids.contains(&s.id()))
                .cloned()
                .collect(),
            removed: old
                .iter()
                .filter(|s| !new_ids.contains(&s.id()))
                .cloned()
                .collect(),
        }
    }

    /// Publish the live set at a frame boundary.
    ///
    /// Listeners are notified, and the change returned, only when the
    /// published set actually changed.
    pub fn commit(&mut self) -> Option<InputSourcesChangeEvent> {
        let next: Vec<Arc<InputSource>> = self.live().cloned().collect();
        let change = Self::diff(&self.published, &next);
        self.published = next;
        self.introduced.clear();
        self.departed.clear();

        if change.is_empty() {
            return None;
        }
        debug!(
            "Publishing input source change: {} added, {} removed",
            change.added.len(),
            change.removed.len()
        );
        for listener in &mut self.listeners {
            listener(&change);
        }
        Some(change)
    }
}
