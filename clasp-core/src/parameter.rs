use crate::{
    ArrayHandle, AsValue, ByteSource, CursorHandle, Fault, LobHandle, Result, Value,
};
use std::collections::HashMap;

/// Direction of a parameter with respect to the statement.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    #[default]
    In,
    Out,
    InOut,
}

impl Direction {
    pub fn is_output(&self) -> bool {
        matches!(self, Direction::Out | Direction::InOut)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "IN" => Some(Direction::In),
            "OUT" => Some(Direction::Out),
            "INOUT" => Some(Direction::InOut),
            _ => None,
        }
    }
}

/// Declared logical type of a parameter.
///
/// Only the container kinds and `Cursor` are meaningful to the coercion
/// pipeline, the open-ended set of ordinary scalar type names all map to
/// `Scalar` and pass through unconverted.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    #[default]
    Scalar,
    Array,
    Blob,
    Clob,
    Xml,
    Cursor,
}

impl ParamType {
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            ParamType::Array | ParamType::Blob | ParamType::Clob | ParamType::Xml
        )
    }

    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "ARRAY" => ParamType::Array,
            "BLOB" => ParamType::Blob,
            "CLOB" => ParamType::Clob,
            "XML" | "SQLXML" => ParamType::Xml,
            "CURSOR" | "REF_CURSOR" => ParamType::Cursor,
            _ => ParamType::Scalar,
        }
    }
}

/// The value slot of a parameter entry.
///
/// Before execution an entry holds a host representation (`Host` or
/// `Stream`), the pipeline swaps it for a driver native handle, and after
/// execution drains the handle back into a host representation. Cloning
/// shares the underlying driver object.
#[derive(Debug, Clone)]
pub enum ParamValue {
    Host(Value),
    Stream(ByteSource),
    Array(ArrayHandle),
    Blob(LobHandle),
    Clob(LobHandle),
    Xml(LobHandle),
    Cursor(CursorHandle),
    /// Rows materialized out of a cursor typed parameter.
    Rows(Vec<ParameterStore>),
}

impl ParamValue {
    /// Whether the value already is a driver native handle.
    pub fn is_native(&self) -> bool {
        matches!(
            self,
            ParamValue::Array(..)
                | ParamValue::Blob(..)
                | ParamValue::Clob(..)
                | ParamValue::Xml(..)
                | ParamValue::Cursor(..)
        )
    }

    pub fn as_host(&self) -> Option<&Value> {
        match self {
            ParamValue::Host(v) => Some(v),
            _ => None,
        }
    }
}

impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ParamValue::Host(l), ParamValue::Host(r)) => l == r,
            (ParamValue::Stream(l), ParamValue::Stream(r)) => l.ptr_eq(r),
            (ParamValue::Array(l), ParamValue::Array(r)) => l.ptr_eq(r),
            (ParamValue::Blob(l), ParamValue::Blob(r)) => l.ptr_eq(r),
            (ParamValue::Clob(l), ParamValue::Clob(r)) => l.ptr_eq(r),
            (ParamValue::Xml(l), ParamValue::Xml(r)) => l.ptr_eq(r),
            (ParamValue::Cursor(l), ParamValue::Cursor(r)) => l.ptr_eq(r),
            (ParamValue::Rows(l), ParamValue::Rows(r)) => l == r,
            _ => false,
        }
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        ParamValue::Host(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Host(value.into())
    }
}

impl<T: AsValue> From<T> for ParamValue {
    fn from(value: T) -> Self {
        ParamValue::Host(value.as_value())
    }
}

/// One named parameter: value, declared type, direction and bind position.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterEntry {
    pub name: String,
    pub value: ParamValue,
    pub ty: ParamType,
    pub direction: Direction,
    pub position: usize,
}

/// Ordered named parameter container.
///
/// Name lookup goes through a folded-name index (case-insensitive by
/// default), position lookup through an array rebuilt whenever positions
/// change. The same logical name may occupy several positions, every
/// occurrence then carries the identical value. Cloning copies the index
/// structures while sharing any driver native values.
#[derive(Default, Debug, Clone)]
pub struct ParameterStore {
    entries: Vec<ParameterEntry>,
    /// Folded name -> indices into `entries`.
    index: HashMap<String, Vec<usize>>,
    /// Position -> index into `entries`, `None` marks a gap.
    by_position: Vec<Option<usize>>,
    case_sensitive: bool,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Switch the name matching mode, rebuilding the lookup index. Entries
    /// that only differ by case become distinct once enabled and share one
    /// index key again once disabled.
    pub fn set_case_sensitive(&mut self, enabled: bool) {
        if self.case_sensitive == enabled {
            return;
        }
        self.case_sensitive = enabled;
        self.rebuild_index();
    }

    fn fold(&self, name: &str) -> String {
        if self.case_sensitive {
            name.into()
        } else {
            name.to_lowercase()
        }
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for i in 0..self.entries.len() {
            let key = self.fold(&self.entries[i].name);
            self.index.entry(key).or_default().push(i);
        }
    }

    fn rebuild_positions(&mut self) {
        let len = self
            .entries
            .iter()
            .map(|e| e.position + 1)
            .max()
            .unwrap_or(0);
        self.by_position = vec![None; len];
        for (i, entry) in self.entries.iter().enumerate() {
            self.by_position[entry.position] = Some(i);
        }
    }

    fn next_free_position(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.position + 1)
            .max()
            .unwrap_or(0)
    }

    /// Insert or overwrite a value. A name already present keeps its declared
    /// type and direction and takes the new value at every occurrence, a new
    /// name is appended at the next free position.
    pub fn set(&mut self, name: &str, value: impl Into<ParamValue>) -> &mut Self {
        let value = value.into();
        let key = self.fold(name);
        if let Some(indices) = self.index.get(&key) {
            for &i in indices {
                self.entries[i].value = value.clone();
            }
        } else {
            self.append(name, value, ParamType::default(), Direction::default(), None);
        }
        self
    }

    /// As [`set`](Self::set) but also assigns the declared type and direction.
    pub fn set_as(
        &mut self,
        name: &str,
        value: impl Into<ParamValue>,
        ty: ParamType,
        direction: Direction,
    ) -> &mut Self {
        let value = value.into();
        let key = self.fold(name);
        if let Some(indices) = self.index.get(&key) {
            for &i in indices {
                let entry = &mut self.entries[i];
                entry.value = value.clone();
                entry.ty = ty;
                entry.direction = direction;
            }
        } else {
            self.append(name, value, ty, direction, None);
        }
        self
    }

    /// Explicit-position form. Updating an existing (name, position) pair is
    /// in place, claiming a position owned by a different name is an ordering
    /// fault, an unused position appends a new occurrence (possibly leaving a
    /// gap until [`assert_order`](Self::assert_order)).
    pub fn set_at(
        &mut self,
        name: &str,
        value: impl Into<ParamValue>,
        ty: ParamType,
        direction: Direction,
        position: usize,
    ) -> Result<&mut Self> {
        let value = value.into();
        if let Some(&Some(i)) = self.by_position.get(position) {
            if self.fold(&self.entries[i].name) != self.fold(name) {
                return Err(Fault::ordering(format!(
                    "position {} is already bound to `{}`",
                    position, self.entries[i].name,
                )));
            }
            let entry = &mut self.entries[i];
            entry.value = value;
            entry.ty = ty;
            entry.direction = direction;
        } else {
            self.append(name, value, ty, direction, Some(position));
        }
        Ok(self)
    }

    fn append(
        &mut self,
        name: &str,
        value: ParamValue,
        ty: ParamType,
        direction: Direction,
        position: Option<usize>,
    ) {
        let position = position.unwrap_or_else(|| self.next_free_position());
        let key = self.fold(name);
        self.entries.push(ParameterEntry {
            name: name.into(),
            value,
            ty,
            direction,
            position,
        });
        self.index
            .entry(key)
            .or_default()
            .push(self.entries.len() - 1);
        if position >= self.by_position.len() {
            self.by_position.resize(position + 1, None);
        }
        self.by_position[position] = Some(self.entries.len() - 1);
    }

    /// Value of the first occurrence of the name.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entry(name).map(|e| &e.value)
    }

    /// First occurrence of the name.
    pub fn entry(&self, name: &str) -> Option<&ParameterEntry> {
        self.index
            .get(&self.fold(name))
            .and_then(|indices| indices.first())
            .map(|&i| &self.entries[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&self.fold(name))
    }

    /// Every position the name is bound at, in ascending order.
    pub fn positions(&self, name: &str) -> Vec<usize> {
        let mut positions: Vec<_> = self
            .index
            .get(&self.fold(name))
            .map(|indices| indices.iter().map(|&i| self.entries[i].position).collect())
            .unwrap_or_default();
        positions.sort_unstable();
        positions
    }

    pub fn get_by_position(&self, position: usize) -> Option<&ParamValue> {
        self.entry_by_position(position).map(|e| &e.value)
    }

    pub fn name_at(&self, position: usize) -> Option<&str> {
        self.entry_by_position(position).map(|e| e.name.as_str())
    }

    pub fn entry_by_position(&self, position: usize) -> Option<&ParameterEntry> {
        self.by_position
            .get(position)
            .copied()
            .flatten()
            .map(|i| &self.entries[i])
    }

    /// Remove every occurrence of the name and compact the remaining
    /// positions back to a dense range, preserving their relative order.
    pub fn remove(&mut self, name: &str) -> bool {
        let key = self.fold(name);
        if self.index.remove(&key).is_none() {
            return false;
        }
        let case_sensitive = self.case_sensitive;
        let folded = move |s: &str| {
            if case_sensitive {
                s.to_owned()
            } else {
                s.to_lowercase()
            }
        };
        self.entries.retain(|e| folded(&e.name) != key);
        // Compact by relative position without disturbing insertion order.
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by_key(|&i| self.entries[i].position);
        for (position, i) in order.into_iter().enumerate() {
            self.entries[i].position = position;
        }
        self.rebuild_index();
        self.rebuild_positions();
        true
    }

    /// Bulk-assign values by position, one slot per position. With
    /// `only_output` set, only OUT and INOUT entries take their slot's value,
    /// the others are skipped. Used to push returned values back into a
    /// caller supplied store after execution.
    pub fn update_values(
        &mut self,
        values: Vec<ParamValue>,
        only_output: bool,
    ) -> Result<()> {
        self.assert_order()?;
        if values.len() != self.entries.len() {
            return Err(Fault::binding(format!(
                "expected {} values in position order, got {}",
                self.entries.len(),
                values.len(),
            )));
        }
        for (position, value) in values.into_iter().enumerate() {
            let i = self.by_position[position].expect("dense positions were just asserted");
            let entry = &mut self.entries[i];
            if only_output && !entry.direction.is_output() {
                continue;
            }
            entry.value = value;
        }
        Ok(())
    }

    /// Fails unless positions form the dense range 0..N-1. Precondition for
    /// binding to a positional execution API, not for general use.
    pub fn assert_order(&self) -> Result<()> {
        if self.by_position.len() != self.entries.len() {
            let gap = self
                .by_position
                .iter()
                .position(Option::is_none)
                .unwrap_or(self.entries.len());
            return Err(Fault::ordering(format!(
                "parameter positions are not dense, position {} is unbound while {} parameters are present",
                gap,
                self.entries.len(),
            )));
        }
        Ok(())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ParameterEntry> {
        self.entries.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut ParameterEntry> {
        self.entries.iter_mut()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }
}

impl PartialEq for ParameterStore {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries && self.case_sensitive == other.case_sensitive
    }
}
