//! Source and accessor resolution
//!
//! A `<source>` pairs a flat typed array with an accessor describing how to
//! read fixed-width tuples out of it. Resolution slices the array into
//! `count` tuples, skipping stride gaps and unnamed params.
//!
//! All functions here are pure lookups over borrowed document data.

use nether_dae::{fragment, Accessor, DataArray, HasId, Source};
use smallvec::SmallVec;

use crate::error::{AssemblyError, Result};

/// Typed tuple data produced by resolving an accessor
#[derive(Debug, Clone, PartialEq)]
pub enum TupleValues {
    Float(Vec<f32>),
    Int(Vec<i64>),
    Bool(Vec<bool>),
    /// `Name_array` and `IDREF_array` contents
    Name(Vec<String>),
}

/// `count` tuples of `width` components, stored back to back
#[derive(Debug, Clone, PartialEq)]
pub struct Tuples {
    width: usize,
    count: usize,
    values: TupleValues,
}

impl Tuples {
    /// Components per tuple
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of tuples
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn values(&self) -> &TupleValues {
        &self.values
    }

    pub fn as_f32(&self) -> Option<TupleView<'_, f32>> {
        match &self.values {
            TupleValues::Float(values) => Some(TupleView::new(self.width, values)),
            _ => None,
        }
    }

    pub fn as_ints(&self) -> Option<TupleView<'_, i64>> {
        match &self.values {
            TupleValues::Int(values) => Some(TupleView::new(self.width, values)),
            _ => None,
        }
    }

    pub fn as_names(&self) -> Option<TupleView<'_, String>> {
        match &self.values {
            TupleValues::Name(values) => Some(TupleView::new(self.width, values)),
            _ => None,
        }
    }

    pub(crate) fn expect_f32(&self, context: &str) -> Result<TupleView<'_, f32>> {
        self.as_f32()
            .ok_or_else(|| wrong_type(context, "float_array", &self.values))
    }

    pub(crate) fn expect_names(&self, context: &str) -> Result<TupleView<'_, String>> {
        self.as_names()
            .ok_or_else(|| wrong_type(context, "Name_array or IDREF_array", &self.values))
    }
}

fn wrong_type(context: &str, expected: &str, values: &TupleValues) -> AssemblyError {
    let found = match values {
        TupleValues::Float(_) => "float_array",
        TupleValues::Int(_) => "int_array",
        TupleValues::Bool(_) => "bool_array",
        TupleValues::Name(_) => "Name_array",
    };
    AssemblyError::reference(
        expected,
        format!("{context}: source holds {found}, expected {expected}"),
    )
}

/// Borrowed view over tuple data of one element type
#[derive(Debug, Clone, Copy)]
pub struct TupleView<'a, T> {
    width: usize,
    values: &'a [T],
}

impl<'a, T> TupleView<'a, T> {
    fn new(width: usize, values: &'a [T]) -> Self {
        Self { width, values }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.values.len() / self.width
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tuple `index`, or `None` past the end
    pub fn get(&self, index: usize) -> Option<&'a [T]> {
        let start = index.checked_mul(self.width)?;
        let end = start.checked_add(self.width)?;
        if self.width == 0 {
            return None;
        }
        self.values.get(start..end)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a [T]> + 'a {
        let values: &'a [T] = self.values;
        let values = if self.width == 0 { &values[..0] } else { values };
        values.chunks_exact(self.width.max(1))
    }

    /// Flat component values
    pub fn flat(&self) -> &'a [T] {
        self.values
    }
}

/// Find a source by `#id` among the sources in scope.
pub fn resolve_source<'a>(
    sources: &'a [Source],
    reference: &str,
    context: &str,
) -> Result<&'a Source> {
    let id = fragment(reference).ok_or_else(|| AssemblyError::reference(reference, context))?;
    sources
        .iter()
        .find(|source| source.id() == Some(id))
        .ok_or_else(|| AssemblyError::reference(reference, context))
}

/// Resolve `reference` to a source in scope and read its accessor.
pub fn resolve_accessor(sources: &[Source], reference: &str, context: &str) -> Result<Tuples> {
    let source = resolve_source(sources, reference, context)?;
    read_source(sources, source, context)
}

/// Read every tuple of `source` through its accessor.
///
/// The accessor's `source` attribute normally names the array inside the
/// same `<source>`; other arrays in `scope` are searched when it does not.
pub fn read_source(scope: &[Source], source: &Source, context: &str) -> Result<Tuples> {
    let label = source.id().unwrap_or("<anonymous>");
    let accessor = source.accessor.as_ref().ok_or_else(|| {
        AssemblyError::reference(label, format!("{context}: source has no accessor"))
    })?;
    let array = backing_array(scope, source, accessor, context)?;

    let bounds_context = format!("{context}: accessor of source '{label}'");
    let required = accessor.required_len().unwrap_or(usize::MAX);
    if required > array.len() {
        return Err(AssemblyError::bounds(bounds_context, required, array.len()));
    }
    // Overlapping elements would read more tuples than the array holds
    let span = accessor.element_span().max(1);
    if accessor.count > 1 && accessor.stride < span {
        return Err(AssemblyError::bounds(
            format!("{bounds_context} stride"),
            span,
            accessor.stride,
        ));
    }

    let slots = param_slots(accessor);
    let width = slots.iter().map(|&(_, w)| w).sum();
    let values = match array {
        DataArray::Float { values, .. } => {
            TupleValues::Float(gather(values, accessor, &slots, &bounds_context)?)
        }
        DataArray::Int { values, .. } => {
            TupleValues::Int(gather(values, accessor, &slots, &bounds_context)?)
        }
        DataArray::Bool { values, .. } => {
            TupleValues::Bool(gather(values, accessor, &slots, &bounds_context)?)
        }
        DataArray::Name { values, .. } | DataArray::IdRef { values, .. } => {
            TupleValues::Name(gather(values, accessor, &slots, &bounds_context)?)
        }
    };

    Ok(Tuples {
        width,
        count: accessor.count,
        values,
    })
}

fn backing_array<'a>(
    scope: &'a [Source],
    source: &'a Source,
    accessor: &Accessor,
    context: &str,
) -> Result<&'a DataArray> {
    let id = fragment(&accessor.source)
        .ok_or_else(|| AssemblyError::reference(&accessor.source, context))?;
    match source.array.id() {
        None => return Ok(&source.array),
        Some(own) if own == id => return Ok(&source.array),
        Some(_) => {}
    }
    scope
        .iter()
        .map(|s| &s.array)
        .find(|array| array.id() == Some(id))
        .ok_or_else(|| AssemblyError::reference(&accessor.source, context))
}

/// `(offset within element, width)` of every named param.
///
/// An accessor without params reads one value per element.
fn param_slots(accessor: &Accessor) -> SmallVec<[(usize, usize); 4]> {
    if accessor.params.is_empty() {
        return SmallVec::from_slice(&[(0, 1)]);
    }
    let mut slots = SmallVec::new();
    let mut cursor = 0;
    for param in &accessor.params {
        let width = param.width();
        if !param.is_skip() {
            slots.push((cursor, width));
        }
        cursor += width;
    }
    slots
}

fn gather<T: Clone>(
    values: &[T],
    accessor: &Accessor,
    slots: &[(usize, usize)],
    context: &str,
) -> Result<Vec<T>> {
    let width: usize = slots.iter().map(|&(_, w)| w).sum();
    let total = accessor
        .count
        .checked_mul(width)
        .ok_or_else(|| AssemblyError::bounds(context, usize::MAX, values.len()))?;
    let mut out = Vec::with_capacity(total);
    for i in 0..accessor.count {
        let base = i
            .checked_mul(accessor.stride)
            .and_then(|b| b.checked_add(accessor.offset));
        for &(slot, w) in slots {
            let run = base
                .and_then(|b| b.checked_add(slot))
                .and_then(|start| values.get(start..start.checked_add(w)?))
                .ok_or_else(|| AssemblyError::bounds(context, usize::MAX, values.len()))?;
            out.extend_from_slice(run);
        }
    }
    Ok(out)
}
