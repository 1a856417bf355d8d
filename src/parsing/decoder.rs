//! Flat record decoder
//!
//! A `Schema` is built once per record shape: it maps each JSON field name
//! to a typed setter on the record. Decoding then walks the token stream
//! and calls the setters directly, with no intermediate JSON values.
//!
//! Only flat shapes of string and float fields are supported. Any other
//! field kind fails schema construction.

use super::iterator::ByteStreamIterator;
use super::number::{parse_f64_best_effort, strip_quotes};
use super::StreamLimits;
use crate::{Error, Result};
use std::fmt;
use std::io::Read;
use std::marker::PhantomData;

/// Field kinds a record shape can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Float64,
    Int64,
    Bool,
    Object,
    Array,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::String => "string",
            FieldKind::Float64 => "float64",
            FieldKind::Int64 => "int64",
            FieldKind::Bool => "bool",
            FieldKind::Object => "object",
            FieldKind::Array => "array",
        };
        f.write_str(name)
    }
}

/// One field of a record shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDesc {
    /// JSON key, without quotes
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDesc {
    pub const fn string(name: &'static str) -> Self {
        Self { name, kind: FieldKind::String }
    }

    pub const fn float64(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Float64 }
    }
}

/// A flat record decodable from a JSON object
///
/// `FIELDS[slot]` describes the field written by `set_str(slot, ..)` or
/// `set_f64(slot, ..)`.
pub trait Record: Default {
    const FIELDS: &'static [FieldDesc];

    /// Raw string bytes, quotes stripped, already cut to the string capacity
    fn set_str(&mut self, slot: usize, value: &[u8]);

    fn set_f64(&mut self, slot: usize, value: f64);
}

#[derive(Debug, Clone, Copy)]
enum Setter {
    Str(usize),
    Float(usize),
}

#[derive(Debug)]
struct Binding {
    key: Box<[u8]>,
    bit: u64,
    setter: Setter,
}

/// Field name → setter table for one record shape
pub struct Schema<T> {
    bindings: Vec<Binding>,
    full_mask: u64,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Schema<T> {
    /// Bind every field of `T`
    ///
    /// # Errors
    /// `UnsupportedFieldKind` for any field that is not string or float64,
    /// `ShapeTooWide` for shapes over 64 fields.
    pub fn build() -> Result<Self> {
        let fields = T::FIELDS;
        if fields.len() > u64::BITS as usize {
            return Err(Error::ShapeTooWide(fields.len()));
        }

        let mut bindings = Vec::with_capacity(fields.len());
        for (slot, field) in fields.iter().enumerate() {
            let setter = match field.kind {
                FieldKind::String => Setter::Str(slot),
                FieldKind::Float64 => Setter::Float(slot),
                kind => {
                    return Err(Error::UnsupportedFieldKind {
                        field: field.name,
                        kind,
                    })
                }
            };
            bindings.push(Binding {
                key: field.name.as_bytes().into(),
                bit: 1 << slot,
                setter,
            });
        }

        let full_mask = match fields.len() {
            64 => u64::MAX,
            n => (1u64 << n) - 1,
        };

        Ok(Self {
            bindings,
            full_mask,
            _record: PhantomData,
        })
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Linear scan: shapes are a handful of fields
    #[inline]
    fn lookup(&self, raw_key: &[u8]) -> Option<(u64, Setter)> {
        let key = strip_quotes(raw_key.trim_ascii());
        self.bindings
            .iter()
            .find(|b| &*b.key == key)
            .map(|b| (b.bit, b.setter))
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema").field("bindings", &self.bindings).finish()
    }
}

#[inline]
fn apply<T: Record>(record: &mut T, setter: Setter, raw: &[u8], string_capacity: usize) {
    match setter {
        Setter::Str(slot) => {
            let value = strip_quotes(raw);
            record.set_str(slot, &value[..value.len().min(string_capacity)]);
        }
        Setter::Float(slot) => record.set_f64(slot, parse_f64_best_effort(raw)),
    }
}

/// Decodes successive objects of an array into `T`
///
/// `level` is the number of containers entered before the record array:
/// 1 for a bare `[{..},{..}]` body, 0 for concatenated top-level objects.
pub struct RecordDecoder<'s, T, R> {
    iter: ByteStreamIterator<R>,
    schema: &'s Schema<T>,
    level: usize,
    entered: bool,
    /// The enclosing container closed on the last `read`
    completed: bool,
    truncated_tokens: u64,
    string_capacity: usize,
}

impl<'s, T: Record, R: Read> RecordDecoder<'s, T, R> {
    pub fn new(schema: &'s Schema<T>, source: R, level: usize) -> Self {
        Self::with_limits(schema, source, level, &StreamLimits::default())
    }

    pub fn with_limits(schema: &'s Schema<T>, source: R, level: usize, limits: &StreamLimits) -> Self {
        Self {
            iter: ByteStreamIterator::with_limits(source, limits),
            schema,
            level,
            entered: false,
            completed: false,
            truncated_tokens: 0,
            string_capacity: limits.string_capacity,
        }
    }

    /// Decode records until the enclosing array or the stream ends
    ///
    /// The callback sees records in stream order. Its first error stops
    /// decoding and is returned unchanged. Returns the number of records
    /// delivered. An object cut off by end of stream is not delivered.
    /// `completed()` tells whether the enclosing array was closed and
    /// `source_error()` whether a read failed.
    pub fn read<F, E>(&mut self, mut callback: F) -> std::result::Result<usize, E>
    where
        F: FnMut(&T) -> std::result::Result<(), E>,
    {
        self.completed = false;
        if !self.enter() {
            return Ok(0);
        }

        let mut delivered = 0;
        loop {
            match self.iter.peek() {
                // Top-level objects have no closing bracket
                None => {
                    self.completed = self.level == 0;
                    break;
                }
                Some(b',') => {
                    self.iter.bump();
                    continue;
                }
                Some(b']') | Some(b'}') => {
                    self.iter.bump();
                    self.completed = true;
                    break;
                }
                Some(b'{') => self.iter.bump(),
                Some(_) => {
                    // Non-object element
                    if !self.iter.skip_value() {
                        break;
                    }
                    continue;
                }
            }

            let mut record = T::default();
            if !self.decode_object(&mut record) {
                break;
            }
            delivered += 1;
            callback(&record)?;
        }
        Ok(delivered)
    }

    /// Enter `level` containers once
    fn enter(&mut self) -> bool {
        if !self.entered {
            for _ in 0..self.level {
                if !self.iter.start_container() {
                    return false;
                }
            }
            self.entered = true;
        }
        true
    }

    /// Fill `record` from the object whose `{` was just consumed
    ///
    /// Returns false if the stream ended inside the object.
    fn decode_object(&mut self, record: &mut T) -> bool {
        let mut matched = 0u64;
        loop {
            match self.iter.peek() {
                None => return false,
                Some(b'}') => {
                    self.iter.bump();
                    return true;
                }
                Some(b',') => {
                    self.iter.bump();
                    continue;
                }
                Some(_) => {}
            }

            let field = match self.iter.read_key() {
                Some(key) => self.schema.lookup(key),
                None => return false,
            };
            self.count_truncation();

            match field {
                Some((bit, setter)) => {
                    let Some(raw) = self.iter.read_value() else {
                        return false;
                    };
                    apply(record, setter, raw, self.string_capacity);
                    self.count_truncation();
                    matched |= bit;
                    if matched == self.schema.full_mask {
                        // Every field seen: skip the rest of the object
                        return self.iter.end_container();
                    }
                }
                None => {
                    if !self.iter.skip_value() {
                        return false;
                    }
                }
            }
        }
    }

    #[inline]
    fn count_truncation(&mut self) {
        if self.iter.last_token_truncated() {
            self.truncated_tokens += 1;
        }
    }

    /// True if the last `read` consumed the close of the record array
    ///
    /// False when the stream ended early, a read failed or the callback
    /// aborted. With `level` 0 a clean end between objects counts as closed.
    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Keys and mapped values cut at the spill capacity so far
    pub fn truncated_tokens(&self) -> u64 {
        self.truncated_tokens
    }

    /// Error recorded by the byte source, if decoding stopped on one
    pub fn source_error(&self) -> Option<&std::io::Error> {
        self.iter.error()
    }

    pub fn take_source_error(&mut self) -> Option<std::io::Error> {
        self.iter.take_error()
    }

    pub fn iterator(&self) -> &ByteStreamIterator<R> {
        &self.iter
    }
}
