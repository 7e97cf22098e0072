//! Object-description boundary consumed by the collector.
//!
//! The collector never inspects object layout. Each managed type carries a
//! static [`TypeDescriptor`] tagging every field with a [`FieldKind`], and
//! exposes the contents of its reference-bearing fields through the
//! [`GcObject`] accessors. [`enumerate_references`] is the only capability
//! the mark phase consumes.

use std::any::Any;

use crate::pool::GcRef;

/// Kind of a described field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Plain data; never holds a managed reference
    Scalar,
    /// A single nullable reference to a managed object
    Reference,
    /// An iterable sequence of nullable references
    ReferenceList,
}

impl FieldKind {
    /// Whether a field of this kind may hold managed references.
    pub fn is_reference(self) -> bool {
        matches!(self, FieldKind::Reference | FieldKind::ReferenceList)
    }
}

/// Static description of one field
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    /// Field name, for diagnostics
    pub name: &'static str,
    /// Field kind
    pub kind: FieldKind,
}

/// Static description of a managed type's shape
#[derive(Debug, Clone, Copy)]
pub struct TypeDescriptor {
    /// Type name, for diagnostics
    pub name: &'static str,
    /// Fields in declaration order
    pub fields: &'static [FieldDescriptor],
}

/// A managed object.
///
/// `Send + Sync` because parallel mark reads objects from worker threads;
/// the graph itself is never mutated while a cycle runs.
pub trait GcObject: Send + Sync + 'static {
    /// Static shape of this object.
    fn descriptor(&self) -> &'static TypeDescriptor;

    /// Reference stored in the [`FieldKind::Reference`] field at `field`.
    ///
    /// Only called for fields of that kind; types without such fields can
    /// rely on the default.
    fn reference(&self, field: usize) -> Option<GcRef> {
        let _ = field;
        None
    }

    /// References stored in the [`FieldKind::ReferenceList`] field at `field`.
    ///
    /// Must yield a finite sequence.
    fn references(&self, field: usize) -> Box<dyn Iterator<Item = Option<GcRef>> + '_> {
        let _ = field;
        Box::new(std::iter::empty())
    }

    /// Upcast for callers that need the concrete type back.
    fn as_any(&self) -> &dyn Any;

    /// Mutable variant of [`GcObject::as_any`].
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Yields every non-null outgoing reference of `object`, in field order.
///
/// Deterministic and finite for any well-formed object; collection fields
/// are flattened, null slots are skipped.
pub fn enumerate_references<'a>(object: &'a dyn GcObject) -> impl Iterator<Item = GcRef> + 'a {
    object
        .descriptor()
        .fields
        .iter()
        .enumerate()
        .flat_map(move |(index, field)| match field.kind {
            FieldKind::Scalar => {
                Box::new(std::iter::empty()) as Box<dyn Iterator<Item = Option<GcRef>> + 'a>
            }
            FieldKind::Reference => Box::new(std::iter::once(object.reference(index))),
            FieldKind::ReferenceList => object.references(index),
        })
        .flatten()
}
