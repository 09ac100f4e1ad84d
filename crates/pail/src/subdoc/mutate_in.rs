// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use serde_json::Value;

use crate::{
    Cas, Collection, MultiResult, MutateInOptions, RetryContext, RetryError, RetryOptions, StoreSemantics,
    SubdocFlags, SubdocOp, SubdocOpKind, SubdocValue,
};

/// Builds a batch of sub-document mutations applied atomically to one document.
///
/// Each chaining call appends one operation record; [`MutateIn::execute`] submits the whole batch
/// as a single request. A transient failure resubmits the full batch, never a partial one.
///
/// # Examples
///
/// ```
/// use pail::{Collection, MultiResult, MutateIn, RetryError, RetryOptions, StoreSemantics, SubdocFlags};
/// use serde_json::json;
///
/// async fn register<C: Collection>(collection: &C, options: &RetryOptions) -> Result<MultiResult, RetryError<C::Error>> {
///     MutateIn::new(collection, options, "user::1")
///         .upsert_with("profile.name", json!("pail"), SubdocFlags::CREATE_PARENTS)
///         .array_append("events", json!("registered"))
///         .counter("logins", 1)
///         .store_semantics(StoreSemantics::Upsert)
///         .execute()
///         .await
/// }
/// ```
#[derive(Debug)]
#[must_use = "the mutations are only sent by `execute`"]
pub struct MutateIn<'a, C> {
    collection: &'a C,
    retry_options: &'a RetryOptions,
    key: String,
    ops: Vec<SubdocOp>,
    options: MutateInOptions,
}

impl<'a, C: Collection> MutateIn<'a, C> {
    /// Starts an empty batch for the document `key`.
    pub fn new(collection: &'a C, retry_options: &'a RetryOptions, key: impl Into<String>) -> Self {
        Self {
            collection,
            retry_options,
            key: key.into(),
            ops: Vec::new(),
            options: MutateInOptions::default(),
        }
    }

    /// Adds `value` at a `path` that must not exist.
    pub fn insert(self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert_with(path, value, SubdocFlags::NONE)
    }

    /// Adds `value` at a `path` that must not exist, with flags.
    pub fn insert_with(self, path: impl Into<String>, value: impl Into<Value>, flags: SubdocFlags) -> Self {
        self.push(SubdocOpKind::Insert, path, Some(SubdocValue::Single(value.into())), flags)
    }

    /// Adds or replaces the value at `path`.
    pub fn upsert(self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.upsert_with(path, value, SubdocFlags::NONE)
    }

    /// Adds or replaces the value at `path`, with flags.
    pub fn upsert_with(self, path: impl Into<String>, value: impl Into<Value>, flags: SubdocFlags) -> Self {
        self.push(SubdocOpKind::Upsert, path, Some(SubdocValue::Single(value.into())), flags)
    }

    /// Replaces the value at a `path` that must exist.
    pub fn replace(self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.replace_with(path, value, SubdocFlags::NONE)
    }

    /// Replaces the value at a `path` that must exist, with flags.
    pub fn replace_with(self, path: impl Into<String>, value: impl Into<Value>, flags: SubdocFlags) -> Self {
        self.push(SubdocOpKind::Replace, path, Some(SubdocValue::Single(value.into())), flags)
    }

    /// Removes the value at `path`.
    pub fn remove(self, path: impl Into<String>) -> Self {
        self.remove_with(path, SubdocFlags::NONE)
    }

    /// Removes the value at `path`, with flags.
    pub fn remove_with(self, path: impl Into<String>, flags: SubdocFlags) -> Self {
        self.push(SubdocOpKind::Remove, path, None, flags)
    }

    /// Adds `delta` to the number at `path`.
    pub fn counter(self, path: impl Into<String>, delta: i64) -> Self {
        self.counter_with(path, delta, SubdocFlags::NONE)
    }

    /// Adds `delta` to the number at `path`, with flags.
    pub fn counter_with(self, path: impl Into<String>, delta: i64, flags: SubdocFlags) -> Self {
        self.push(SubdocOpKind::Counter, path, Some(SubdocValue::Delta(delta)), flags)
    }

    /// Appends `value` to the array at `path` unless it is already present.
    pub fn array_add_unique(self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.array_add_unique_with(path, value, SubdocFlags::NONE)
    }

    /// Appends `value` to the array at `path` unless it is already present, with flags.
    pub fn array_add_unique_with(self, path: impl Into<String>, value: impl Into<Value>, flags: SubdocFlags) -> Self {
        self.push(SubdocOpKind::ArrayAddUnique, path, Some(SubdocValue::Single(value.into())), flags)
    }

    /// Appends `value` to the array at `path`.
    pub fn array_append(self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.array_append_with(path, value, SubdocFlags::NONE)
    }

    /// Appends `value` to the array at `path`, with flags.
    pub fn array_append_with(self, path: impl Into<String>, value: impl Into<Value>, flags: SubdocFlags) -> Self {
        self.push(SubdocOpKind::ArrayAppend, path, Some(SubdocValue::Single(value.into())), flags)
    }

    /// Appends several values to the array at `path` in one operation.
    pub fn array_append_multi(self, path: impl Into<String>, values: Vec<Value>) -> Self {
        self.array_append_multi_with(path, values, SubdocFlags::NONE)
    }

    /// Appends several values to the array at `path` in one operation, with flags.
    pub fn array_append_multi_with(self, path: impl Into<String>, values: Vec<Value>, flags: SubdocFlags) -> Self {
        self.push(SubdocOpKind::ArrayAppend, path, Some(SubdocValue::Multi(values)), flags)
    }

    /// Prepends `value` to the array at `path`.
    pub fn array_prepend(self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.array_prepend_with(path, value, SubdocFlags::NONE)
    }

    /// Prepends `value` to the array at `path`, with flags.
    pub fn array_prepend_with(self, path: impl Into<String>, value: impl Into<Value>, flags: SubdocFlags) -> Self {
        self.push(SubdocOpKind::ArrayPrepend, path, Some(SubdocValue::Single(value.into())), flags)
    }

    /// Prepends several values to the array at `path` in one operation.
    pub fn array_prepend_multi(self, path: impl Into<String>, values: Vec<Value>) -> Self {
        self.array_prepend_multi_with(path, values, SubdocFlags::NONE)
    }

    /// Prepends several values to the array at `path` in one operation, with flags.
    pub fn array_prepend_multi_with(self, path: impl Into<String>, values: Vec<Value>, flags: SubdocFlags) -> Self {
        self.push(SubdocOpKind::ArrayPrepend, path, Some(SubdocValue::Multi(values)), flags)
    }

    /// Inserts `value` at the array position `path`, for example `tags[2]`.
    pub fn array_insert(self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.array_insert_with(path, value, SubdocFlags::NONE)
    }

    /// Inserts `value` at the array position `path`, with flags.
    pub fn array_insert_with(self, path: impl Into<String>, value: impl Into<Value>, flags: SubdocFlags) -> Self {
        self.push(SubdocOpKind::ArrayInsert, path, Some(SubdocValue::Single(value.into())), flags)
    }

    /// Inserts several values at the array position `path` in one operation.
    pub fn array_insert_multi(self, path: impl Into<String>, values: Vec<Value>) -> Self {
        self.array_insert_multi_with(path, values, SubdocFlags::NONE)
    }

    /// Inserts several values at the array position `path` in one operation, with flags.
    pub fn array_insert_multi_with(self, path: impl Into<String>, values: Vec<Value>, flags: SubdocFlags) -> Self {
        self.push(SubdocOpKind::ArrayInsert, path, Some(SubdocValue::Multi(values)), flags)
    }

    /// Makes the batch conditional on the document still having this CAS value.
    pub fn cas(mut self, cas: Cas) -> Self {
        self.options = self.options.cas(cas);
        self
    }

    /// Sets the document expiry.
    pub fn expiry(mut self, expiry: Duration) -> Self {
        self.options = self.options.expiry(expiry);
        self
    }

    /// Sets how the document itself is written.
    pub fn store_semantics(mut self, store_semantics: StoreSemantics) -> Self {
        self.options = self.options.store_semantics(store_semantics);
        self
    }

    /// Sets the document-level options of the request, replacing earlier settings.
    pub fn options(self, options: MutateInOptions) -> Self {
        Self { options, ..self }
    }

    /// The document key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The operation records declared so far, in order.
    #[must_use]
    pub fn ops(&self) -> &[SubdocOp] {
        &self.ops
    }

    /// Submits the batch with retries.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError`] when the request fails permanently or the retry budget runs out.
    pub async fn execute(self) -> Result<MultiResult, RetryError<C::Error>> {
        let Self {
            collection,
            retry_options,
            key,
            ops,
            options,
        } = self;

        let (key, ops, options) = (key.as_str(), ops.as_slice(), &options);

        RetryContext::collection("mutate_in", retry_options, collection, move |collection, args| async move {
            collection.mutate_in(key, ops, &args.options(Some(options))).await
        })
        .run()
        .await
    }

    fn push(mut self, kind: SubdocOpKind, path: impl Into<String>, value: Option<SubdocValue>, flags: SubdocFlags) -> Self {
        self.ops.push(SubdocOp::new(kind, path, value, flags));
        self
    }
}
