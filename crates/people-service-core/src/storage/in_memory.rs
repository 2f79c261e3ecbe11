//! In-memory document database
//!
//! Reference implementation of [`DocumentDatabase`] used for tests and
//! local runs. Records live in an index owned by the store instance and are
//! copied on the way in and on the way out, so no caller ever holds a
//! reference into stored state.
//!
//! Natural order is insertion order. The index keeps its own sequence
//! number per record, so ordering never depends on the clock bits inside
//! an [`ObjectId`].

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use crate::constants::ID_FIELD;
use crate::storage::DocumentDatabase;
use crate::types::envelope::{Cursor, UpdateCmd, UpdateFieldCommand};
use crate::types::{Conditions, Error, Fields, ObjectId, ObjectIdGenerator, Record, Result, Sort};
use crate::{log_debug, log_error, log_info, log_warn};

const INVALID_ID: &str = "_id is invalid";

fn invalid_id() -> Error {
    Error::bad_request(INVALID_ID)
}

fn parse_id(id: Option<&str>) -> Result<ObjectId> {
    id.and_then(|id| id.parse().ok()).ok_or_else(invalid_id)
}

/// Records in insertion order, addressable by `_id`
#[derive(Debug, Default)]
struct Index {
    /// Insertion sequence to stored record
    records: BTreeMap<u64, Record>,

    /// `_id` to insertion sequence
    positions: HashMap<ObjectId, u64>,

    next_seq: u64,
}

impl Index {
    /// Insert or overwrite; an overwritten record keeps its position
    fn insert(&mut self, id: ObjectId, record: Record) -> Option<Record> {
        match self.positions.get(&id) {
            Some(seq) => self.records.insert(*seq, record),
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.positions.insert(id, seq);
                self.records.insert(seq, record)
            }
        }
    }

    fn get(&self, id: &ObjectId) -> Option<&Record> {
        self.positions.get(id).and_then(|seq| self.records.get(seq))
    }

    fn get_mut(&mut self, id: &ObjectId) -> Option<&mut Record> {
        let seq = self.positions.get(id)?;
        self.records.get_mut(seq)
    }

    fn remove(&mut self, id: &ObjectId) -> Option<Record> {
        let seq = self.positions.remove(id)?;
        self.records.remove(&seq)
    }

    /// Records in insertion order
    fn values(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

/// In-memory store with value semantics
pub struct InMemoryDb {
    /// Database name, used in log output
    name: String,

    /// Name of the record type held, used in log output
    typename: String,

    /// Gate for every CRUD operation
    connected: AtomicBool,

    /// Stored records
    index: RwLock<Index>,

    /// Source of fresh identities
    ids: ObjectIdGenerator,
}

impl InMemoryDb {
    /// Create a new, disconnected store
    pub fn new(name: impl Into<String>, typename: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            typename: typename.into(),
            connected: AtomicBool::new(false),
            index: RwLock::new(Index::default()),
            ids: ObjectIdGenerator::new(),
        }
    }

    /// Database name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record type name
    pub fn typename(&self) -> &str {
        &self.typename
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.index.read().len() == 0
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            log_warn!(db = %self.name, "operation attempted while disconnected");
            Err(Error::NotConnected)
        }
    }
}

#[async_trait]
impl DocumentDatabase for InMemoryDb {
    async fn connect(&self) -> Result<()> {
        self.connected.store(true, Ordering::SeqCst);
        log_info!(db = %self.name, typename = %self.typename, "connected");
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.connected.store(false, Ordering::SeqCst);
        log_info!(db = %self.name, "disconnected");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn create(&self, obj: &Record) -> Result<Record> {
        self.ensure_connected()?;
        if obj.has_id() {
            return Err(Error::bad_request("_id isnt allowed for create"));
        }

        let id = self.ids.next_id();
        let mut stored = obj.clone();
        stored.set_id(id.to_hex());
        let created = stored.clone();

        let mut index = self.index.write();
        if index.insert(id, stored).is_some() {
            log_warn!(db = %self.name, "overwriting object in index with _id={}", id);
        }
        log_debug!(db = %self.name, "created _id={}, count now {}", id, index.len());
        Ok(created)
    }

    async fn read(&self, id: Option<&str>) -> Result<Record> {
        self.ensure_connected()?;
        let id = parse_id(id)?;
        self.index.read().get(&id).cloned().ok_or_else(invalid_id)
    }

    async fn replace(&self, obj: &Record) -> Result<Record> {
        self.ensure_connected()?;
        let id = parse_id(obj.id())?;

        let mut index = self.index.write();
        let slot = index.get_mut(&id).ok_or_else(invalid_id)?;
        let mut replacement = obj.clone();
        replacement.set_id(id.to_hex());
        *slot = replacement;
        Ok(slot.clone())
    }

    async fn update(&self, conditions: &Conditions, updates: &[UpdateFieldCommand]) -> Result<Record> {
        self.ensure_connected()?;
        let id = parse_id(conditions.get(ID_FIELD).and_then(Value::as_str))?;

        let mut index = self.index.write();
        let record = index.get_mut(&id).ok_or_else(invalid_id)?;

        let [update] = updates else {
            log_error!(db = %self.name, count = updates.len(), "update called with wrong number of commands");
            return Err(Error::misuse("update only supports one UpdateFieldCommand at a time"));
        };
        if update.cmd != UpdateCmd::Set {
            log_error!(db = %self.name, cmd = ?update.cmd, "update called with unsupported command");
            return Err(Error::misuse("update only supports UpdateFieldCommand.cmd==set"));
        }
        if update.field == ID_FIELD {
            return Err(Error::bad_request("_id cannot be updated"));
        }

        // A set without a value leaves the field absent
        match &update.value {
            Some(value) => record.insert(update.field.clone(), value.clone()),
            None => record.remove(&update.field),
        };
        Ok(record.clone())
    }

    async fn del(&self, id: Option<&str>) -> Result<()> {
        self.ensure_connected()?;
        let id = id.ok_or_else(invalid_id)?;

        // An id that does not parse cannot be in the index
        if let Ok(key) = id.parse::<ObjectId>() {
            self.index.write().remove(&key);
        }
        Ok(())
    }

    async fn find(
        &self,
        conditions: Option<&Conditions>,
        fields: Option<&Fields>,
        sort: Option<&Sort>,
        cursor: Option<&Cursor>,
    ) -> Result<Vec<Record>> {
        self.ensure_connected()?;

        let condition = match conditions {
            Some(conditions) if conditions.len() > 1 => {
                return Err(Error::bad_request("find only supports conditions on a single field"));
            }
            Some(conditions) => conditions.iter().next(),
            None => None,
        };
        if fields.is_some() || sort.is_some() {
            log_debug!(db = %self.name, "find does not apply fields or sort");
        }

        let (start, count) = Cursor::window(cursor);
        let index = self.index.read();
        let results = index
            .values()
            .filter(|record| match condition {
                Some((field, value)) => record.get(field) == Some(value),
                None => true,
            })
            .skip(start)
            .take(count)
            .cloned()
            .collect();
        Ok(results)
    }
}
