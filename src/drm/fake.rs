//! In-memory KMS device for tests

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io;
use std::rc::Rc;

use super::atomic::{AtomicRequest, Entry};
use super::object::{ObjectKind, Property, ValueKind};
use super::{Inventory, KmsDevice, KmsError};

/// What the device saw, shared with the test after the device is consumed
#[derive(Debug, Default)]
pub struct FakeLog {
    /// One element per commit call: (entries, allow_modeset)
    pub commits: Vec<(Vec<Entry>, bool)>,
    pub closed: bool,
}

pub struct FakeDevice {
    inventory: Inventory,
    objects: HashMap<(ObjectKind, u32), Vec<Property>>,
    stale: HashSet<(ObjectKind, u32)>,
    rejected: HashSet<u32>,
    commit_errno: Option<i32>,
    next_prop_id: u32,
    log: Rc<RefCell<FakeLog>>,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self {
            inventory: Inventory::default(),
            objects: HashMap::new(),
            stale: HashSet::new(),
            rejected: HashSet::new(),
            commit_errno: None,
            next_prop_id: 100,
            log: Rc::new(RefCell::new(FakeLog::default())),
        }
    }

    pub fn connector(self, id: u32, props: &[&str]) -> Self {
        self.object(ObjectKind::Connector, id, props)
    }

    pub fn crtc(self, id: u32, props: &[&str]) -> Self {
        self.object(ObjectKind::Crtc, id, props)
    }

    pub fn plane(self, id: u32, props: &[&str]) -> Self {
        self.object(ObjectKind::Plane, id, props)
    }

    /// Listed in the inventory but gone by the time it is queried
    pub fn stale(mut self, kind: ObjectKind, id: u32) -> Self {
        self.list(kind, id);
        self.stale.insert((kind, id));
        self
    }

    /// Refuse atomic entries for every property called `name`
    pub fn reject(mut self, name: &str) -> Self {
        let ids = self
            .objects
            .values()
            .flatten()
            .filter(|p| p.name == name)
            .map(|p| p.id);
        self.rejected.extend(ids);
        self
    }

    pub fn fail_commit(mut self, errno: i32) -> Self {
        self.commit_errno = Some(errno);
        self
    }

    pub fn log(&self) -> Rc<RefCell<FakeLog>> {
        Rc::clone(&self.log)
    }

    /// Property ID of `name` on an object
    pub fn prop_id(&self, kind: ObjectKind, id: u32, name: &str) -> u32 {
        self.objects[&(kind, id)]
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.id)
            .unwrap()
    }

    fn object(mut self, kind: ObjectKind, id: u32, props: &[&str]) -> Self {
        self.list(kind, id);
        let props = props
            .iter()
            .map(|name| {
                self.next_prop_id += 1;
                Property {
                    name: name.to_string(),
                    id: self.next_prop_id,
                    current: 1,
                    kind: ValueKind::Range,
                }
            })
            .collect();
        self.objects.insert((kind, id), props);
        self
    }

    fn list(&mut self, kind: ObjectKind, id: u32) {
        let ids = match kind {
            ObjectKind::Connector => &mut self.inventory.connectors,
            ObjectKind::Crtc => &mut self.inventory.crtcs,
            ObjectKind::Plane => &mut self.inventory.planes,
        };
        ids.push(id);
    }
}

pub struct FakeRequest {
    pub entries: Vec<Entry>,
    rejected: HashSet<u32>,
}

impl AtomicRequest for FakeRequest {
    fn add(
        &mut self,
        _kind: ObjectKind,
        object: u32,
        property: u32,
        value: u64,
    ) -> Result<(), KmsError> {
        if self.rejected.contains(&property) {
            return Err(KmsError::InvalidEntry { object, property });
        }
        self.entries.push(Entry {
            object,
            property,
            value,
        });
        Ok(())
    }
}

impl KmsDevice for FakeDevice {
    type Request = FakeRequest;

    fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    fn object_properties(&self, id: u32, kind: ObjectKind) -> Result<Vec<Property>, KmsError> {
        if self.stale.contains(&(kind, id)) {
            return Err(KmsError::property_query(
                id,
                kind,
                io::Error::from_raw_os_error(libc::ENOENT),
            ));
        }
        Ok(self.objects.get(&(kind, id)).cloned().unwrap_or_default())
    }

    fn new_request(&self) -> FakeRequest {
        FakeRequest {
            entries: Vec::new(),
            rejected: self.rejected.clone(),
        }
    }

    fn commit(&self, request: FakeRequest, allow_modeset: bool) -> Result<(), KmsError> {
        self.log
            .borrow_mut()
            .commits
            .push((request.entries, allow_modeset));
        match self.commit_errno {
            Some(errno) => Err(KmsError::Commit(io::Error::from_raw_os_error(errno))),
            None => Ok(()),
        }
    }

    fn close(self) {
        self.log.borrow_mut().closed = true;
    }
}
