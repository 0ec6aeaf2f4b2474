use crate::{DriverCursor, Fault, ParamValue, ParameterStore, Result};
use std::collections::HashMap;

struct CachedRow {
    row: ParameterStore,
    /// Visit stamp, the smallest one is the eviction candidate.
    stamp: u64,
}

/// Bounded cache, index addressable view over an open cursor that must not be
/// fully materialized.
///
/// Absolute index 0 is a permanently retained header row carrying call
/// metadata (affected row counts and the like), it is never coerced and never
/// evicted. Data rows start at index 1 and are fetched forward on demand,
/// every row passed on the way is cached. Once the cache holds `max_cache`
/// non header rows, the least recently visited one is dropped to make room
/// for the next insertion.
///
/// The cursor is exclusively owned: [`close`](Self::close) consumes the view
/// and cascades to the backend cursor and the statement owning it.
pub struct LazyCursor {
    cursor: Box<dyn DriverCursor>,
    header: ParameterStore,
    cache: HashMap<u64, CachedRow>,
    max_cache: Option<usize>,
    /// Absolute index the next forward advance will produce.
    next_fetch: u64,
    /// Absolute position of the cursor, tracked for the scroll extension.
    position: u64,
    exhausted: bool,
    scrolled: bool,
    stamp: u64,
}

impl LazyCursor {
    pub fn new(cursor: Box<dyn DriverCursor>, header: ParameterStore) -> Self {
        Self {
            cursor,
            header,
            cache: HashMap::new(),
            max_cache: None,
            next_fetch: 1,
            position: 0,
            exhausted: false,
            scrolled: false,
            stamp: 0,
        }
    }

    /// Bound the cache to at most `limit` non header rows. Unbounded by
    /// default.
    pub fn with_cache_limit(mut self, limit: usize) -> Self {
        self.max_cache = Some(limit);
        self
    }

    /// The header row.
    pub fn header(&self) -> &ParameterStore {
        &self.header
    }

    /// Row at absolute index `i`, fetching and caching forward as needed.
    /// `None` once the cursor is exhausted before reaching `i`, or when the
    /// row was evicted and cannot be reached forward anymore.
    pub fn get(&mut self, i: u64) -> Result<Option<&ParameterStore>> {
        if i == 0 {
            return Ok(Some(&self.header));
        }
        if self.cache.contains_key(&i) {
            self.stamp += 1;
            let slot = self.cache.get_mut(&i).expect("presence was just checked");
            slot.stamp = self.stamp;
            return Ok(Some(&slot.row));
        }
        if i < self.next_fetch || self.exhausted {
            return Ok(None);
        }
        if self.scrolled {
            // An explicit scroll moved the backend cursor, reposition it on
            // the last fetched row so the forward cache stays consistent.
            self.cursor.move_to(self.next_fetch - 1)?;
            self.scrolled = false;
        }
        while self.next_fetch <= i {
            let Some(row) = self.cursor.next_row()? else {
                self.exhausted = true;
                return Ok(None);
            };
            let index = self.next_fetch;
            self.next_fetch += 1;
            self.position = index;
            self.insert(index, row);
        }
        Ok(self.cache.get(&i).map(|slot| &slot.row))
    }

    fn insert(&mut self, index: u64, row: ParameterStore) {
        if let Some(max) = self.max_cache {
            if self.cache.len() >= max {
                let evict = self
                    .cache
                    .iter()
                    .min_by_key(|(_, slot)| slot.stamp)
                    .map(|(&i, _)| i);
                if let Some(i) = evict {
                    self.cache.remove(&i);
                }
            }
        }
        self.stamp += 1;
        self.cache.insert(
            index,
            CachedRow {
                row,
                stamp: self.stamp,
            },
        );
    }

    /// Number of cached rows, the header included. Grows only when a
    /// previously unvisited index is first visited.
    pub fn size_cached(&self) -> usize {
        self.cache.len() + 1
    }

    /// Row at absolute index `i`, cached rows only. Asking about a row that
    /// is not in the cache is an out of range fault.
    pub fn get_cached(&self, i: u64) -> Result<&ParameterStore> {
        if i == 0 {
            return Ok(&self.header);
        }
        self.cache
            .get(&i)
            .map(|slot| &slot.row)
            .ok_or_else(|| Fault::out_of_range(i))
    }

    /// The total row count is unknowable without draining the cursor.
    pub fn len(&self) -> Result<usize> {
        Err(Fault::unsupported(
            "the size of a lazy cursor is not known without consuming it entirely",
        ))
    }

    /// Full materialization is not part of the lazy contract.
    pub fn all_rows(&self) -> Result<Vec<ParameterStore>> {
        Err(Fault::unsupported(
            "materializing every row of a lazy cursor is not supported",
        ))
    }

    /// Substitute a fully coerced row for a previously cached raw one. Index
    /// 0 replaces the header.
    pub fn replace(&mut self, i: u64, row: ParameterStore) -> Result<()> {
        if i == 0 {
            self.header = row;
            return Ok(());
        }
        let slot = self.cache.get_mut(&i).ok_or_else(|| Fault::out_of_range(i))?;
        slot.row = row;
        Ok(())
    }

    fn require_scrollable(&self, operation: &str) -> Result<()> {
        if !self.cursor.scrollable() {
            return Err(Fault::capability(format!(
                "{} requires a scroll capable cursor, this one is forward only",
                operation,
            )));
        }
        Ok(())
    }

    fn require_updatable(&self, operation: &str) -> Result<()> {
        if !self.cursor.updatable() {
            return Err(Fault::capability(format!(
                "{} requires an update capable cursor, this one is read only",
                operation,
            )));
        }
        Ok(())
    }

    /// Position the backend cursor on absolute row `row`.
    pub fn move_to(&mut self, row: u64) -> Result<()> {
        self.require_scrollable("move_to")?;
        self.cursor.move_to(row)?;
        self.position = row;
        self.scrolled = true;
        Ok(())
    }

    /// Move the backend cursor by `offset` rows relative to its position.
    pub fn move_relative(&mut self, offset: i64) -> Result<()> {
        self.require_scrollable("move_relative")?;
        self.cursor.move_relative(offset)?;
        self.position = self.position.saturating_add_signed(offset);
        self.scrolled = true;
        Ok(())
    }

    /// Absolute position of the backend cursor.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Push the host values of `row` onto the current cursor row.
    pub fn update_current(&mut self, row: &ParameterStore) -> Result<()> {
        self.require_updatable("update_current")?;
        self.write_columns(row)?;
        self.cursor.update_row()
    }

    /// Append a new cursor row holding the host values of `row`.
    pub fn insert_new(&mut self, row: &ParameterStore) -> Result<()> {
        self.require_updatable("insert_new")?;
        self.cursor.begin_insert()?;
        self.write_columns(row)?;
        self.cursor.insert_row()
    }

    fn write_columns(&mut self, row: &ParameterStore) -> Result<()> {
        for entry in row.iter() {
            let ParamValue::Host(value) = &entry.value else {
                return Err(Fault::conversion(format!(
                    "column `{}` holds an unconverted driver value, post convert the row before writing it back",
                    entry.name,
                )));
            };
            self.cursor.write_column(&entry.name, value)?;
        }
        Ok(())
    }

    /// Release the backend cursor and the statement owning it. Consuming the
    /// view makes a second close unrepresentable.
    pub fn close(mut self) -> Result<()> {
        self.cursor.close()
    }
}
