// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{Display, Formatter};
use std::ops::BitOr;

use serde_json::Value;

/// The kind of a sub-document operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubdocOpKind {
    /// Checks whether a path exists.
    Exists,
    /// Reads the value at a path.
    Get,
    /// Counts the elements of the array or object at a path.
    Count,
    /// Adds a value at a path that must not exist.
    Insert,
    /// Adds or replaces the value at a path.
    Upsert,
    /// Replaces the value at a path that must exist.
    Replace,
    /// Removes the value at a path.
    Remove,
    /// Adds a delta to the number at a path.
    Counter,
    /// Appends a value to an array unless it is already present.
    ArrayAddUnique,
    /// Appends values to the end of an array.
    ArrayAppend,
    /// Prepends values to the start of an array.
    ArrayPrepend,
    /// Inserts values at an array position.
    ArrayInsert,
}

impl SubdocOpKind {
    /// Returns `true` for kinds that only read the document.
    #[must_use]
    pub fn is_lookup(self) -> bool {
        matches!(self, Self::Exists | Self::Get | Self::Count)
    }

    /// Returns the `snake_case` name of the kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exists => "exists",
            Self::Get => "get",
            Self::Count => "count",
            Self::Insert => "insert",
            Self::Upsert => "upsert",
            Self::Replace => "replace",
            Self::Remove => "remove",
            Self::Counter => "counter",
            Self::ArrayAddUnique => "array_add_unique",
            Self::ArrayAppend => "array_append",
            Self::ArrayPrepend => "array_prepend",
            Self::ArrayInsert => "array_insert",
        }
    }
}

impl Display for SubdocOpKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-path flags of a sub-document operation.
///
/// ```
/// use pail::SubdocFlags;
///
/// let flags = SubdocFlags::CREATE_PARENTS | SubdocFlags::XATTR;
///
/// assert!(flags.contains(SubdocFlags::XATTR));
/// assert!(!flags.contains(SubdocFlags::EXPAND_MACROS));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SubdocFlags(u8);

impl SubdocFlags {
    /// No flags.
    pub const NONE: Self = Self(0);
    /// Creates missing parent paths.
    pub const CREATE_PARENTS: Self = Self(0x01);
    /// The path addresses an extended attribute.
    pub const XATTR: Self = Self(0x02);
    /// Server macros in the value are expanded.
    pub const EXPAND_MACROS: Self = Self(0x04);

    /// Returns `true` when every flag in `other` is set.
    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the raw bits.
    #[must_use]
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` when no flag is set.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for SubdocFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// The value carried by a sub-document operation.
#[derive(Debug, Clone, PartialEq)]
pub enum SubdocValue {
    /// One JSON value.
    Single(Value),
    /// Several values written in one array operation.
    Multi(Vec<Value>),
    /// The signed delta of a counter operation.
    Delta(i64),
}

/// One sub-document operation record.
///
/// Records are created by the [`LookupIn`][crate::LookupIn] and [`MutateIn`][crate::MutateIn]
/// builders and handed to the client in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct SubdocOp {
    path: String,
    kind: SubdocOpKind,
    value: Option<SubdocValue>,
    flags: SubdocFlags,
}

impl SubdocOp {
    pub(crate) fn new(kind: SubdocOpKind, path: impl Into<String>, value: Option<SubdocValue>, flags: SubdocFlags) -> Self {
        Self {
            path: path.into(),
            kind,
            value,
            flags,
        }
    }

    /// The path inside the document.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The kind of operation.
    #[must_use]
    pub fn kind(&self) -> SubdocOpKind {
        self.kind
    }

    /// The value to write, if the kind carries one.
    #[must_use]
    pub fn value(&self) -> Option<&SubdocValue> {
        self.value.as_ref()
    }

    /// The per-path flags.
    #[must_use]
    pub fn flags(&self) -> SubdocFlags {
        self.flags
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn flags_combine() {
        let flags = SubdocFlags::CREATE_PARENTS | SubdocFlags::EXPAND_MACROS;

        assert_eq!(flags.bits(), 0x05);
        assert!(flags.contains(SubdocFlags::CREATE_PARENTS));
        assert!(!flags.contains(SubdocFlags::XATTR));
        assert!(flags.contains(SubdocFlags::NONE));
        assert!(SubdocFlags::default().is_empty());
    }

    #[test]
    fn lookup_kinds() {
        assert!(SubdocOpKind::Exists.is_lookup());
        assert!(SubdocOpKind::Count.is_lookup());
        assert!(!SubdocOpKind::Counter.is_lookup());
        assert!(!SubdocOpKind::ArrayInsert.is_lookup());
        assert_eq!(SubdocOpKind::ArrayAddUnique.to_string(), "array_add_unique");
    }

    #[test]
    fn op_accessors() {
        let op = SubdocOp::new(
            SubdocOpKind::Upsert,
            "profile.name",
            Some(SubdocValue::Single(json!("pail"))),
            SubdocFlags::CREATE_PARENTS,
        );

        assert_eq!(op.path(), "profile.name");
        assert_eq!(op.kind(), SubdocOpKind::Upsert);
        assert_eq!(op.value(), Some(&SubdocValue::Single(json!("pail"))));
        assert_eq!(op.flags(), SubdocFlags::CREATE_PARENTS);
    }
}
