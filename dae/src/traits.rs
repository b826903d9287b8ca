//! Capability traits for the identity fields shared by many element kinds.
//!
//! Not every element carries every field (a `<source>` has an id but no sid,
//! a `<transform>` has a sid but no id), so each kind implements only the
//! traits it actually supports.

/// Element addressable by a document-unique `id`
pub trait HasId {
    fn id(&self) -> Option<&str>;
}

/// Element with a human-readable `name`
pub trait HasName {
    fn name(&self) -> Option<&str>;
}

/// Element addressable by a scoped `sid` (used by animation target paths)
pub trait HasSid {
    fn sid(&self) -> Option<&str>;
}

/// Best label for log messages: name, then id, then a placeholder.
pub fn label<T: HasId + HasName>(element: &T) -> &str {
    element
        .name()
        .or_else(|| element.id())
        .unwrap_or("<unnamed>")
}

macro_rules! impl_has_id {
    ($($ty:ty),* $(,)?) => {
        $(impl $crate::traits::HasId for $ty {
            fn id(&self) -> Option<&str> {
                self.id.as_deref()
            }
        })*
    };
}

macro_rules! impl_has_name {
    ($($ty:ty),* $(,)?) => {
        $(impl $crate::traits::HasName for $ty {
            fn name(&self) -> Option<&str> {
                self.name.as_deref()
            }
        })*
    };
}

macro_rules! impl_has_sid {
    ($($ty:ty),* $(,)?) => {
        $(impl $crate::traits::HasSid for $ty {
            fn sid(&self) -> Option<&str> {
                self.sid.as_deref()
            }
        })*
    };
}

pub(crate) use {impl_has_id, impl_has_name, impl_has_sid};
