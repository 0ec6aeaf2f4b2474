use crate::{Fault, ParameterStore, Result, Value};
use std::{
    fmt::{self, Debug},
    io::Read,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

/// Factory surface of a live backend connection.
///
/// The pipeline asks the connection for driver native containers right before
/// a statement is executed. Connection establishment, transactions and
/// statement execution itself are the adapter's business and never appear
/// here.
pub trait Connection {
    /// Create a native array holding the given elements.
    fn create_array(&mut self, elements: Vec<Value>) -> Result<Box<dyn DriverArray>>;
    /// Create an empty native binary large object.
    fn create_blob(&mut self) -> Result<Box<dyn DriverLob>>;
    /// Create an empty native character large object.
    fn create_clob(&mut self) -> Result<Box<dyn DriverLob>>;
    /// Create an empty native XML container.
    fn create_xml(&mut self) -> Result<Box<dyn DriverLob>>;
    /// Whether temporary containers created by this connection can be freed
    /// once used. A pipeline refuses to register against a backend that
    /// cannot, leaks must fail loudly at configuration time.
    fn supports_release(&self) -> bool {
        true
    }
}

/// A driver native large object, binary or character.
pub trait DriverLob: Send {
    fn write(&mut self, bytes: &[u8]) -> Result<()>;
    fn read_all(&mut self) -> Result<Box<[u8]>>;
    fn free(&mut self) -> Result<()>;
}

/// A driver native array of scalar values.
pub trait DriverArray: Send {
    fn elements(&mut self) -> Result<Vec<Value>>;
    fn free(&mut self) -> Result<()>;
}

/// An open result cursor.
///
/// Row indexing is absolute: index 0 is the position before the first data
/// row (the slot the lazy cache reserves for the header), the first data row
/// is 1. `move_to(n)` positions the cursor on row n so that a following
/// `next_row` yields row n + 1. The positioning and update methods default to
/// capability faults, a forward-only adapter implements the advance path
/// only.
pub trait DriverCursor: Send {
    fn scrollable(&self) -> bool {
        false
    }
    fn updatable(&self) -> bool {
        false
    }
    /// Advance to the next row and read its columns, `None` once exhausted.
    fn next_row(&mut self) -> Result<Option<ParameterStore>>;
    fn move_to(&mut self, row: u64) -> Result<()> {
        let _ = row;
        Err(Fault::capability("the cursor does not support absolute positioning"))
    }
    fn move_relative(&mut self, offset: i64) -> Result<()> {
        let _ = offset;
        Err(Fault::capability("the cursor does not support relative positioning"))
    }
    fn write_column(&mut self, name: &str, value: &Value) -> Result<()> {
        let _ = (name, value);
        Err(Fault::capability("the cursor does not support column writes"))
    }
    /// Push the pending column writes onto the current row.
    fn update_row(&mut self) -> Result<()> {
        Err(Fault::capability("the cursor does not support row updates"))
    }
    /// Move to the insert slot, column writes then target the new row.
    fn begin_insert(&mut self) -> Result<()> {
        Err(Fault::capability("the cursor does not support row inserts"))
    }
    fn insert_row(&mut self) -> Result<()> {
        Err(Fault::capability("the cursor does not support row inserts"))
    }
    /// Release the cursor and the statement that owns it.
    fn close(&mut self) -> Result<()>;
}

// The shared handles below keep ParamValue cloneable: a clone shares the
// underlying driver object instead of duplicating it. The core is single
// threaded by contract so the mutexes are never contended, poisoning is
// absorbed rather than propagated.
fn relock<T: ?Sized>(lock: &Mutex<Box<T>>) -> MutexGuard<'_, Box<T>> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Shared handle to a driver native large object.
#[derive(Clone)]
pub struct LobHandle(Arc<Mutex<Box<dyn DriverLob>>>);

impl LobHandle {
    pub fn new(lob: Box<dyn DriverLob>) -> Self {
        Self(Arc::new(Mutex::new(lob)))
    }
    pub fn write(&self, bytes: &[u8]) -> Result<()> {
        relock(&self.0).write(bytes)
    }
    pub fn read_all(&self) -> Result<Box<[u8]>> {
        relock(&self.0).read_all()
    }
    pub fn free(&self) -> Result<()> {
        relock(&self.0).free()
    }
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Debug for LobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LobHandle")
    }
}

/// Shared handle to a driver native array.
#[derive(Clone)]
pub struct ArrayHandle(Arc<Mutex<Box<dyn DriverArray>>>);

impl ArrayHandle {
    pub fn new(array: Box<dyn DriverArray>) -> Self {
        Self(Arc::new(Mutex::new(array)))
    }
    pub fn elements(&self) -> Result<Vec<Value>> {
        relock(&self.0).elements()
    }
    pub fn free(&self) -> Result<()> {
        relock(&self.0).free()
    }
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Debug for ArrayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArrayHandle")
    }
}

/// Shared handle to an open cursor carried as a parameter value, typically a
/// cursor typed OUT parameter waiting to be materialized.
#[derive(Clone)]
pub struct CursorHandle(Arc<Mutex<Box<dyn DriverCursor>>>);

impl CursorHandle {
    pub fn new(cursor: Box<dyn DriverCursor>) -> Self {
        Self(Arc::new(Mutex::new(cursor)))
    }
    pub fn next_row(&self) -> Result<Option<ParameterStore>> {
        relock(&self.0).next_row()
    }
    pub fn close(&self) -> Result<()> {
        relock(&self.0).close()
    }
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Debug for CursorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CursorHandle")
    }
}

/// Shared handle to a blocking byte stream supplied by the caller as a large
/// object source.
#[derive(Clone)]
pub struct ByteSource(Arc<Mutex<Box<dyn Read + Send>>>);

impl ByteSource {
    pub fn new(reader: impl Read + Send + 'static) -> Self {
        Self(Arc::new(Mutex::new(Box::new(reader))))
    }
    /// Drain the stream to its end.
    pub fn read_all(&self) -> Result<Box<[u8]>> {
        let mut buffer = Vec::new();
        relock(&self.0).read_to_end(&mut buffer)?;
        Ok(buffer.into())
    }
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Debug for ByteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteSource")
    }
}
