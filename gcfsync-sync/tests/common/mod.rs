//! In-memory backends and log capture for driver tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io;
use std::sync::{Arc, Mutex};

use gcfsync_core::{
    error::Backend, GroupId, Identity, ListId, MembershipMapping, SyncError,
};
use gcfsync_sync::{AllowList, IdentitySource};

pub fn mapping(pairs: &[(&str, &str)]) -> MembershipMapping {
    pairs
        .iter()
        .map(|(k, v)| (Identity::from(*k), v.to_string()))
        .collect()
}

pub fn ids(keys: &[&str]) -> Vec<Identity> {
    keys.iter().map(|k| Identity::from(*k)).collect()
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeDirectory {
    pub groups: BTreeMap<GroupId, MembershipMapping>,
    pub search_results: Vec<GroupId>,
    /// Groups whose member listing fails with a server error.
    pub broken: Vec<GroupId>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeDirectory {
    pub fn with_group(mut self, group: &str, members: &[(&str, &str)]) -> Self {
        self.groups.insert(GroupId::from(group), mapping(members));
        self
    }

    pub fn with_search(mut self, groups: &[&str]) -> Self {
        self.search_results = groups.iter().map(|g| GroupId::from(*g)).collect();
        self
    }
}

impl IdentitySource for FakeDirectory {
    fn group_members(&self, group: &GroupId) -> Result<MembershipMapping, SyncError> {
        self.calls.borrow_mut().push(format!("members:{group}"));
        if self.broken.contains(group) {
            return Err(SyncError::Api {
                backend: Backend::Directory,
                status: 500,
                message: "backend exploded".to_string(),
            });
        }
        self.groups
            .get(group)
            .cloned()
            .ok_or_else(|| SyncError::NotFound {
                backend: Backend::Directory,
                resource: format!("group {group}"),
            })
    }

    fn groups_matching(&self, pattern: &str) -> Result<Vec<GroupId>, SyncError> {
        self.calls.borrow_mut().push(format!("search:{pattern}"));
        Ok(self.search_results.clone())
    }
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Seat {
    pub user_id: String,
    pub access: bool,
    pub gateway: bool,
}

#[derive(Default)]
pub struct FakeGateway {
    /// name → (id, members)
    pub lists: RefCell<BTreeMap<String, (ListId, MembershipMapping)>>,
    pub seats: RefCell<BTreeMap<Identity, Seat>>,
    /// Identities whose seat disappears right before revocation.
    pub vanishing: Vec<Identity>,
    pub fail_patch_for: Option<String>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeGateway {
    pub fn with_list(self, name: &str, members: &[&str]) -> Self {
        let id = ListId::from(format!("id-{name}"));
        let items = members
            .iter()
            .map(|m| (Identity::from(*m), id.0.clone()))
            .collect();
        self.lists.borrow_mut().insert(name.to_string(), (id, items));
        self
    }

    pub fn with_seat(self, email: &str, access: bool, gateway: bool) -> Self {
        self.seats.borrow_mut().insert(
            Identity::from(email),
            Seat {
                user_id: format!("user-{email}"),
                access,
                gateway,
            },
        );
        self
    }

    pub fn members_of(&self, name: &str) -> Vec<String> {
        self.lists
            .borrow()
            .get(name)
            .map(|(_, m)| m.keys().map(|k| k.0.clone()).collect())
            .unwrap_or_default()
    }

    pub fn seat(&self, email: &str) -> Option<Seat> {
        self.seats.borrow().get(&Identity::from(email)).cloned()
    }

    pub fn mutating_calls(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with("create:") || c.starts_with("patch:") || c.starts_with("revoke:"))
            .cloned()
            .collect()
    }

    fn name_of(&self, list: &ListId) -> Option<String> {
        self.lists
            .borrow()
            .iter()
            .find(|(_, (id, _))| id == list)
            .map(|(name, _)| name.clone())
    }
}

impl AllowList for FakeGateway {
    fn find_list(&self, name: &str) -> Result<Option<ListId>, SyncError> {
        self.calls.borrow_mut().push(format!("find:{name}"));
        Ok(self.lists.borrow().get(name).map(|(id, _)| id.clone()))
    }

    fn ensure_list(&self, name: &str) -> Result<ListId, SyncError> {
        if let Some((id, _)) = self.lists.borrow().get(name) {
            self.calls.borrow_mut().push(format!("ensure:{name}"));
            return Ok(id.clone());
        }
        self.calls.borrow_mut().push(format!("create:{name}"));
        let id = ListId::from(format!("id-{name}"));
        self.lists
            .borrow_mut()
            .insert(name.to_string(), (id.clone(), MembershipMapping::new()));
        Ok(id)
    }

    fn list_members(&self, list: &ListId) -> Result<MembershipMapping, SyncError> {
        self.calls.borrow_mut().push(format!("items:{list}"));
        let lists = self.lists.borrow();
        let found = lists
            .values()
            .find(|(id, _)| id == list)
            .map(|(_, members)| members.clone());
        found.ok_or_else(|| SyncError::Api {
                backend: Backend::Gateway,
                status: 404,
                message: format!("list {list} missing"),
            })
    }

    fn seat_holders(&self) -> Result<MembershipMapping, SyncError> {
        self.calls.borrow_mut().push("seat_holders".to_string());
        Ok(self
            .seats
            .borrow()
            .iter()
            .filter(|(_, seat)| seat.access || seat.gateway)
            .map(|(identity, seat)| (identity.clone(), seat.user_id.clone()))
            .collect())
    }

    fn patch(
        &self,
        list: &ListId,
        to_add: &MembershipMapping,
        to_remove: &MembershipMapping,
    ) -> Result<(), SyncError> {
        let name = self.name_of(list).unwrap_or_default();
        self.calls.borrow_mut().push(format!("patch:{name}"));
        if self.fail_patch_for.as_deref() == Some(name.as_str()) {
            return Err(SyncError::Api {
                backend: Backend::Gateway,
                status: 400,
                message: "patch rejected".to_string(),
            });
        }
        let mut lists = self.lists.borrow_mut();
        if let Some((id, members)) = lists.get_mut(&name) {
            for identity in to_remove.keys() {
                members.remove(identity);
            }
            for identity in to_add.keys() {
                members.insert(identity.clone(), id.0.clone());
            }
        }
        Ok(())
    }

    fn revoke_seats(&self, identity: &Identity) -> Result<bool, SyncError> {
        self.calls.borrow_mut().push(format!("revoke:{identity}"));
        if self.vanishing.contains(identity) {
            self.seats.borrow_mut().remove(identity);
            return Ok(false);
        }
        match self.seats.borrow_mut().get_mut(identity) {
            Some(seat) => {
                seat.access = false;
                seat.gateway = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ---------------------------------------------------------------------------
// Log capture
// ---------------------------------------------------------------------------

/// A clonable in-memory sink for a scoped `tracing` subscriber.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn lines_at(&self, level: &str) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|l| l.contains(level))
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Ok(mut inner) = self.0.lock() {
            inner.extend_from_slice(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a subscriber that writes into the returned buffer.
pub fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, LogBuffer) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, buffer)
}
