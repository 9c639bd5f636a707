//! Generic table controller: stable sorting and pagination over in-memory records.
//!
//! Every list screen owns one [`TableController`]. Records expose their columns
//! through [`FieldAccessor`], so the controller never inspects record internals.

use std::cmp::Ordering;
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use tracing::trace;

/// Comparable value of one record field.
///
/// Ordering across kinds: `Missing` (and NaN) < numbers < dates < text.
/// Integers and floats compare numerically with each other. Text compares
/// lexically by Unicode scalar value, independent of locale.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Missing,
    Integer(i64),
    Float(f64),
    Date(DateTime<Utc>),
    Text(String),
}

impl SortValue {
    fn rank(&self) -> u8 {
        match self {
            SortValue::Missing => 0,
            SortValue::Float(f) if f.is_nan() => 0,
            SortValue::Integer(_) | SortValue::Float(_) => 1,
            SortValue::Date(_) => 2,
            SortValue::Text(_) => 3,
        }
    }

    /// Total order used by [`TableController`].
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        let (ra, rb) = (self.rank(), other.rank());
        if ra != rb {
            return ra.cmp(&rb);
        }
        match (self, other) {
            (SortValue::Integer(a), SortValue::Integer(b)) => a.cmp(b),
            (SortValue::Integer(a), SortValue::Float(b)) => cmp_int_float(*a, *b),
            (SortValue::Float(a), SortValue::Integer(b)) => cmp_int_float(*b, *a).reverse(),
            (SortValue::Float(a), SortValue::Float(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (SortValue::Date(a), SortValue::Date(b)) => a.cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            // Same rank with different variants only happens for Missing vs NaN.
            _ => Ordering::Equal,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.rank() == 0
    }
}

/// Exact comparison of an integer with a non-NaN float. Casting the integer
/// to `f64` would round above 2^53 and break transitivity.
fn cmp_int_float(i: i64, f: f64) -> Ordering {
    // 2^63: every float in [-2^63, 2^63) truncates to a valid i64.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f >= LIMIT {
        return Ordering::Less;
    }
    if f < -LIMIT {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(f - whole)).unwrap_or(Ordering::Equal),
        other => other,
    }
}

impl From<i64> for SortValue {
    fn from(v: i64) -> Self {
        SortValue::Integer(v)
    }
}

impl From<u8> for SortValue {
    fn from(v: u8) -> Self {
        SortValue::Integer(v as i64)
    }
}

impl From<f64> for SortValue {
    fn from(v: f64) -> Self {
        SortValue::Float(v)
    }
}

impl From<&str> for SortValue {
    fn from(v: &str) -> Self {
        SortValue::Text(v.to_string())
    }
}

impl From<String> for SortValue {
    fn from(v: String) -> Self {
        SortValue::Text(v)
    }
}

impl From<DateTime<Utc>> for SortValue {
    fn from(v: DateTime<Utc>) -> Self {
        SortValue::Date(v)
    }
}

impl<T: Into<SortValue>> From<Option<T>> for SortValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SortValue::Missing)
    }
}

/// Sort direction of the active sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn is_ascending(self) -> bool {
        self == SortDirection::Ascending
    }
}

/// Errors raised when a caller breaks the controller's contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Page size must be at least 1.
    InvalidPageSize(usize),
    /// A sort key name did not match any field of the record type.
    UnknownField(String),
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableError::InvalidPageSize(n) => write!(f, "invalid page size {}: must be >= 1", n),
            TableError::UnknownField(name) => write!(f, "unknown field '{}'", name),
        }
    }
}

impl std::error::Error for TableError {}

/// Column access for table rows.
///
/// Typed records use a field enum; schema-less rows use a field name newtype.
pub trait FieldAccessor {
    /// Field identifier.
    type Field: Clone + PartialEq + Debug;

    /// Columns in display order. Typed records ignore `records`;
    /// schema-less records derive the column set from them.
    fn columns(records: &[Self]) -> Vec<Self::Field>
    where
        Self: Sized;

    /// Column header text.
    fn field_name(field: &Self::Field) -> String;

    /// Sort value of the field. Absent values are [`SortValue::Missing`].
    fn field_value(&self, field: &Self::Field) -> SortValue;

    /// Cell text for the field.
    fn display_value(&self, field: &Self::Field) -> String;

    /// Stable identifier for selection tracking across re-sorts.
    fn row_id(&self) -> u64;

    /// Case-insensitive substring match over all displayed fields.
    fn matches_filter(&self, filter: &str) -> bool
    where
        Self: Sized,
    {
        let needle = filter.to_lowercase();
        Self::columns(std::slice::from_ref(self))
            .iter()
            .any(|f| self.display_value(f).to_lowercase().contains(&needle))
    }
}

/// Pagination summary rendered by pager controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub current_page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl PageInfo {
    /// 1-based inclusive item range of the current page, `None` when empty.
    pub fn item_range(&self) -> Option<(usize, usize)> {
        if self.total_items == 0 {
            return None;
        }
        let first = (self.current_page - 1)
            .saturating_mul(self.page_size)
            .saturating_add(1);
        let last = first
            .saturating_add(self.page_size - 1)
            .min(self.total_items);
        Some((first, last))
    }
}

/// Sort + paginate engine over an owned record set.
#[derive(Debug, Clone)]
pub struct TableController<R: FieldAccessor> {
    records: Vec<R>,
    /// Record indices in sorted order.
    order: Vec<usize>,
    sort_key: Option<R::Field>,
    direction: SortDirection,
    current_page: usize,
    page_size: usize,
}

impl<R: FieldAccessor> TableController<R> {
    /// Creates a controller on page 1, sorted ascending by `sort_key` if given.
    pub fn new(
        records: Vec<R>,
        page_size: usize,
        sort_key: Option<R::Field>,
    ) -> Result<Self, TableError> {
        check_page_size(page_size)?;
        let mut controller = Self {
            records,
            order: Vec::new(),
            sort_key,
            direction: SortDirection::Ascending,
            current_page: 1,
            page_size,
        };
        controller.apply_sort();
        Ok(controller)
    }

    /// Same key toggles the direction; a new key sorts ascending.
    pub fn set_sort_key(&mut self, key: R::Field) {
        if self.sort_key.as_ref() == Some(&key) {
            self.direction = self.direction.toggled();
        } else {
            self.sort_key = Some(key);
            self.direction = SortDirection::Ascending;
        }
        self.apply_sort();
    }

    /// Drops the sort key; rows return to input order.
    pub fn clear_sort(&mut self) {
        self.sort_key = None;
        self.direction = SortDirection::Ascending;
        self.apply_sort();
    }

    /// Changes the page size and clamps the current page into range.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<(), TableError> {
        check_page_size(page_size)?;
        self.page_size = page_size;
        self.clamp_page();
        Ok(())
    }

    /// Moves to `page`, clamped into `[1, max(1, total_pages)]`.
    pub fn set_page(&mut self, page: usize) {
        self.current_page = page;
        self.clamp_page();
    }

    pub fn next_page(&mut self) {
        if self.current_page < self.total_pages() {
            self.current_page += 1;
        }
    }

    pub fn previous_page(&mut self) {
        if self.current_page > 1 {
            self.current_page -= 1;
        }
    }

    pub fn first_page(&mut self) {
        self.current_page = 1;
    }

    pub fn last_page(&mut self) {
        self.current_page = self.total_pages().max(1);
    }

    /// Replaces the record set, keeping sort key, direction and page (clamped).
    pub fn set_records(&mut self, records: Vec<R>) {
        self.records = records;
        self.apply_sort();
        self.clamp_page();
    }

    /// Rows of the current page in sorted order.
    pub fn sorted_and_paginated_view(&self) -> Vec<&R> {
        let start = (self.current_page - 1).saturating_mul(self.page_size);
        self.order
            .iter()
            .skip(start)
            .take(self.page_size)
            .filter_map(|&idx| self.records.get(idx))
            .collect()
    }

    /// All rows in sorted order (every page, in page order).
    pub fn sorted_records(&self) -> impl Iterator<Item = &R> {
        self.order.iter().filter_map(|&idx| self.records.get(idx))
    }

    pub fn page_info(&self) -> PageInfo {
        PageInfo {
            current_page: self.current_page,
            page_size: self.page_size,
            total_items: self.records.len(),
            total_pages: self.total_pages(),
        }
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn columns(&self) -> Vec<R::Field> {
        R::columns(&self.records)
    }

    pub fn sort_key(&self) -> Option<&R::Field> {
        self.sort_key.as_ref()
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self) -> usize {
        self.records.len().div_ceil(self.page_size)
    }

    fn clamp_page(&mut self) {
        self.current_page = self.current_page.clamp(1, self.total_pages().max(1));
    }

    /// Recomputes the sorted index order. `sort_by` is stable, and reversing
    /// the comparator keeps ties in input order for descending sorts too.
    fn apply_sort(&mut self) {
        let mut order: Vec<usize> = (0..self.records.len()).collect();
        if let Some(key) = &self.sort_key {
            let keys: Vec<SortValue> = self.records.iter().map(|r| r.field_value(key)).collect();
            let direction = self.direction;
            order.sort_by(|&a, &b| {
                let cmp = keys[a].total_cmp(&keys[b]);
                match direction {
                    SortDirection::Ascending => cmp,
                    SortDirection::Descending => cmp.reverse(),
                }
            });
        }
        trace!(
            "Sorted {} rows by {:?} ({:?})",
            order.len(),
            self.sort_key,
            self.direction
        );
        self.order = order;
    }
}

fn check_page_size(page_size: usize) -> Result<(), TableError> {
    if page_size == 0 {
        return Err(TableError::InvalidPageSize(page_size));
    }
    Ok(())
}
