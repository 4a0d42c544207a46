#![allow(dead_code)]

use stratum::{mapping::ClassBuilder, ClassMapping, Repository};
use stratum_core::{
    async_trait,
    driver::{LargeObject, LobTarget, ObjectId, ResultRow, Select},
    stmt::{TypeEnum, Value},
    Dictionary, Result, StateManager, Store,
};

use indexmap::IndexMap;
use std::sync::{Arc, Mutex};

/// A managed instance kept in memory.
#[derive(Debug, Clone)]
pub struct Instance {
    class: String,
    id: Option<ObjectId>,
    fields: IndexMap<usize, Value>,
    unloaded: Vec<usize>,
    version: Value,
    next_version: Value,
}

impl Instance {
    pub fn new(class: &str) -> Instance {
        Instance {
            class: class.to_string(),
            id: None,
            fields: IndexMap::new(),
            unloaded: vec![],
            version: Value::Null,
            next_version: Value::Null,
        }
    }

    pub fn with_id(mut self, key: impl Into<Value>) -> Instance {
        self.id = Some(ObjectId::new(self.class.as_str(), key));
        self
    }

    pub fn with(mut self, field: usize, value: impl Into<Value>) -> Instance {
        self.fields.insert(field, value.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<Value>) -> Instance {
        self.version = version.into();
        self
    }

    /// Marks a field as not fetched yet.
    pub fn unload(mut self, field: usize) -> Instance {
        self.unloaded.push(field);
        self
    }

    pub fn get(&self, field: usize) -> Option<&Value> {
        self.fields.get(&field)
    }

    pub fn next_version(&self) -> &Value {
        &self.next_version
    }
}

impl StateManager for Instance {
    fn managed_instance(&self) -> String {
        format!("{}@memory", self.class)
    }

    fn class_name(&self) -> &str {
        &self.class
    }

    fn object_id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }

    fn set_object_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }

    fn fetch(&self, field: usize) -> Value {
        self.fields.get(&field).cloned().unwrap_or(Value::Null)
    }

    fn is_loaded(&self, field: usize) -> bool {
        !self.unloaded.contains(&field)
    }

    fn store(&mut self, field: usize, value: Value) {
        self.unloaded.retain(|f| *f != field);
        self.fields.insert(field, value);
    }

    fn version(&self) -> Value {
        self.version.clone()
    }

    fn set_version(&mut self, version: Value) {
        self.version = version;
    }

    fn set_next_version(&mut self, version: Value) {
        self.next_version = version;
    }
}

/// Rows keyed by object id, plus every large object written.
#[derive(Debug)]
pub struct MemoryStore {
    dictionary: Dictionary,
    rows: Mutex<IndexMap<String, ResultRow>>,
    selects: Mutex<Vec<Select>>,
    lobs: Arc<Mutex<IndexMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new(dictionary: Dictionary) -> MemoryStore {
        MemoryStore {
            dictionary,
            rows: Mutex::new(IndexMap::new()),
            selects: Mutex::new(vec![]),
            lobs: Arc::new(Mutex::new(IndexMap::new())),
        }
    }

    pub fn put(&self, id: &ObjectId, row: ResultRow) {
        self.rows.lock().unwrap().insert(id.to_string(), row);
    }

    /// Content of the large object `table.column` of the row `id`.
    pub fn lob(&self, table: &str, column: &str, id: &ObjectId) -> Option<Value> {
        self.lobs
            .lock()
            .unwrap()
            .get(&lob_key(table, column, id))
            .cloned()
    }

    pub fn lob_count(&self) -> usize {
        self.lobs.lock().unwrap().len()
    }

    pub fn last_select(&self) -> Option<Select> {
        self.selects.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    async fn select(&self, select: &Select, id: &ObjectId) -> Result<Option<ResultRow>> {
        self.selects.lock().unwrap().push(select.clone());
        Ok(self.rows.lock().unwrap().get(&id.to_string()).cloned())
    }

    async fn open_large_object(&self, target: &LobTarget) -> Result<Box<dyn LargeObject>> {
        Ok(Box::new(MemoryLob {
            key: lob_key(&target.table.name, &target.column.name, &target.id),
            lobs: self.lobs.clone(),
        }))
    }
}

struct MemoryLob {
    key: String,
    lobs: Arc<Mutex<IndexMap<String, Value>>>,
}

#[async_trait]
impl LargeObject for MemoryLob {
    async fn truncate(&mut self) -> Result<()> {
        self.lobs.lock().unwrap().insert(self.key.clone(), Value::Null);
        Ok(())
    }

    async fn write_bytes(&mut self, offset: u64, bytes: &[u8]) -> Result<()> {
        let mut lobs = self.lobs.lock().unwrap();
        let entry = lobs.entry(self.key.clone()).or_insert(Value::Null);

        match entry {
            Value::Bytes(content) => {
                content.truncate(offset as usize);
                content.extend_from_slice(bytes);
            }
            entry => *entry = Value::Bytes(bytes.to_vec()),
        }

        Ok(())
    }

    async fn write_text(&mut self, _offset: u64, text: &str) -> Result<()> {
        let mut lobs = self.lobs.lock().unwrap();
        let entry = lobs.entry(self.key.clone()).or_insert(Value::Null);

        match entry {
            Value::String(content) => content.push_str(text),
            entry => *entry = Value::String(text.to_string()),
        }

        Ok(())
    }
}

fn lob_key(table: &str, column: &str, id: &ObjectId) -> String {
    format!("{table}.{column}/{id}")
}

pub fn repository(dictionary: Dictionary, enums: Vec<TypeEnum>) -> Repository {
    let mut builder = Repository::builder();
    builder.dictionary(dictionary).enums(enums);
    builder.build().unwrap()
}

/// Adds `cls` to `repo` and maps everything registered so far.
pub fn map(repo: &mut Repository, cls: &ClassBuilder) -> Arc<ClassMapping> {
    let cls = repo.add_class(cls).unwrap();
    repo.map_all().unwrap();
    cls
}
