#![allow(dead_code)]

use clasp::{
    Connection, DriverArray, DriverCursor, DriverLob, Error, ParameterStore, Result, Value,
};
use log::debug;
use std::sync::{Arc, Mutex};

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Default)]
pub struct Stats {
    pub lobs_created: usize,
    pub lobs_freed: usize,
    pub arrays_created: usize,
    pub arrays_freed: usize,
    pub rows_advanced: usize,
    pub cursors_closed: usize,
}

/// Shared instrumentation the tests observe backend activity through.
#[derive(Default, Clone)]
pub struct Instrumentation(Arc<Mutex<Stats>>);

impl Instrumentation {
    pub fn lobs_created(&self) -> usize {
        self.0.lock().unwrap().lobs_created
    }
    pub fn lobs_freed(&self) -> usize {
        self.0.lock().unwrap().lobs_freed
    }
    pub fn arrays_created(&self) -> usize {
        self.0.lock().unwrap().arrays_created
    }
    pub fn arrays_freed(&self) -> usize {
        self.0.lock().unwrap().arrays_freed
    }
    pub fn rows_advanced(&self) -> usize {
        self.0.lock().unwrap().rows_advanced
    }
    pub fn cursors_closed(&self) -> usize {
        self.0.lock().unwrap().cursors_closed
    }
    fn update(&self, f: impl FnOnce(&mut Stats)) {
        f(&mut self.0.lock().unwrap());
    }
}

pub struct MemoryConnection {
    pub stats: Instrumentation,
    pub releasable: bool,
    pub fail_free: bool,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self {
            stats: Instrumentation::default(),
            releasable: true,
            fail_free: false,
        }
    }
    pub fn without_release(mut self) -> Self {
        self.releasable = false;
        self
    }
    pub fn failing_free(mut self) -> Self {
        self.fail_free = true;
        self
    }
    fn lob(&self) -> Box<dyn DriverLob> {
        self.stats.update(|s| s.lobs_created += 1);
        Box::new(MemoryLob {
            data: Vec::new(),
            freed: false,
            fail_free: self.fail_free,
            stats: self.stats.clone(),
        })
    }
}

impl Connection for MemoryConnection {
    fn create_array(&mut self, elements: Vec<Value>) -> Result<Box<dyn DriverArray>> {
        self.stats.update(|s| s.arrays_created += 1);
        Ok(Box::new(MemoryArray {
            elements,
            stats: self.stats.clone(),
        }))
    }
    fn create_blob(&mut self) -> Result<Box<dyn DriverLob>> {
        Ok(self.lob())
    }
    fn create_clob(&mut self) -> Result<Box<dyn DriverLob>> {
        Ok(self.lob())
    }
    fn create_xml(&mut self) -> Result<Box<dyn DriverLob>> {
        Ok(self.lob())
    }
    fn supports_release(&self) -> bool {
        self.releasable
    }
}

pub struct MemoryLob {
    pub data: Vec<u8>,
    pub freed: bool,
    pub fail_free: bool,
    stats: Instrumentation,
}

impl DriverLob for MemoryLob {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.data.extend_from_slice(bytes);
        Ok(())
    }
    fn read_all(&mut self) -> Result<Box<[u8]>> {
        Ok(self.data.clone().into())
    }
    fn free(&mut self) -> Result<()> {
        if self.fail_free {
            return Err(Error::msg("the backend refused to free the large object"));
        }
        self.freed = true;
        self.stats.update(|s| s.lobs_freed += 1);
        Ok(())
    }
}

pub struct MemoryArray {
    pub elements: Vec<Value>,
    stats: Instrumentation,
}

impl DriverArray for MemoryArray {
    fn elements(&mut self) -> Result<Vec<Value>> {
        Ok(self.elements.clone())
    }
    fn free(&mut self) -> Result<()> {
        self.stats.update(|s| s.arrays_freed += 1);
        Ok(())
    }
}

/// In-memory cursor over pre-baked rows. Data rows are addressed 1-based, the
/// way the lazy cache sees them.
pub struct MemoryCursor {
    rows: Vec<ParameterStore>,
    /// Absolute position, 0 is before the first data row.
    at: usize,
    scroll: bool,
    updates: bool,
    inserting: bool,
    pending: Vec<(String, Value)>,
    pub stats: Instrumentation,
}

impl MemoryCursor {
    pub fn new(rows: Vec<ParameterStore>) -> Self {
        Self {
            rows,
            at: 0,
            scroll: false,
            updates: false,
            inserting: false,
            pending: Vec::new(),
            stats: Instrumentation::default(),
        }
    }
    pub fn with_scroll(mut self) -> Self {
        self.scroll = true;
        self
    }
    pub fn with_updates(mut self) -> Self {
        self.updates = true;
        self
    }
    pub fn with_stats(mut self, stats: Instrumentation) -> Self {
        self.stats = stats;
        self
    }
}

impl DriverCursor for MemoryCursor {
    fn scrollable(&self) -> bool {
        self.scroll
    }
    fn updatable(&self) -> bool {
        self.updates
    }
    fn next_row(&mut self) -> Result<Option<ParameterStore>> {
        if self.at >= self.rows.len() {
            return Ok(None);
        }
        self.at += 1;
        self.stats.update(|s| s.rows_advanced += 1);
        debug!("cursor advanced to row {}", self.at);
        Ok(Some(self.rows[self.at - 1].clone()))
    }
    fn move_to(&mut self, row: u64) -> Result<()> {
        self.at = row as usize;
        Ok(())
    }
    fn move_relative(&mut self, offset: i64) -> Result<()> {
        self.at = self.at.saturating_add_signed(offset as isize);
        Ok(())
    }
    fn write_column(&mut self, name: &str, value: &Value) -> Result<()> {
        self.pending.push((name.into(), value.clone()));
        Ok(())
    }
    fn update_row(&mut self) -> Result<()> {
        if self.at == 0 || self.at > self.rows.len() {
            return Err(Error::msg("no current row to update"));
        }
        let row = &mut self.rows[self.at - 1];
        for (name, value) in self.pending.drain(..) {
            row.set(&name, value);
        }
        Ok(())
    }
    fn begin_insert(&mut self) -> Result<()> {
        self.inserting = true;
        self.pending.clear();
        Ok(())
    }
    fn insert_row(&mut self) -> Result<()> {
        if !self.inserting {
            return Err(Error::msg("begin_insert was not called"));
        }
        let mut row = ParameterStore::new();
        for (name, value) in self.pending.drain(..) {
            row.set(&name, value);
        }
        self.rows.push(row);
        self.inserting = false;
        Ok(())
    }
    fn close(&mut self) -> Result<()> {
        self.stats.update(|s| s.cursors_closed += 1);
        debug!("cursor closed after row {}", self.at);
        Ok(())
    }
}

pub fn row(columns: &[(&str, Value)]) -> ParameterStore {
    let mut store = ParameterStore::new();
    for (name, value) in columns {
        store.set(name, value.clone());
    }
    store
}

pub fn header(rows_affected: i64) -> ParameterStore {
    let mut store = ParameterStore::new();
    store.set("rows_affected", Value::Int64(Some(rows_affected)));
    store
}
