// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::{
    Collection, LookupInOptions, MultiResult, RetryContext, RetryError, RetryOptions, SubdocFlags, SubdocOp,
    SubdocOpKind,
};

/// Builds a batch of sub-document lookups against one document.
///
/// Each chaining call appends one operation record; [`LookupIn::execute`] submits the whole batch
/// as a single request and resubmits all of it after a transient failure.
///
/// # Examples
///
/// ```
/// use pail::{Collection, LookupIn, MultiResult, RetryError, RetryOptions};
///
/// async fn profile<C: Collection>(collection: &C, options: &RetryOptions) -> Result<MultiResult, RetryError<C::Error>> {
///     LookupIn::new(collection, options, "user::1")
///         .get("name")
///         .exists("email")
///         .count("orders")
///         .execute()
///         .await
/// }
/// ```
#[derive(Debug)]
#[must_use = "the lookups are only sent by `execute`"]
pub struct LookupIn<'a, C> {
    collection: &'a C,
    retry_options: &'a RetryOptions,
    key: String,
    ops: Vec<SubdocOp>,
    options: LookupInOptions,
}

impl<'a, C: Collection> LookupIn<'a, C> {
    /// Starts an empty batch for the document `key`.
    pub fn new(collection: &'a C, retry_options: &'a RetryOptions, key: impl Into<String>) -> Self {
        Self {
            collection,
            retry_options,
            key: key.into(),
            ops: Vec::new(),
            options: LookupInOptions::default(),
        }
    }

    /// Checks whether `path` exists.
    pub fn exists(self, path: impl Into<String>) -> Self {
        self.exists_with(path, SubdocFlags::NONE)
    }

    /// Checks whether `path` exists, with flags.
    pub fn exists_with(self, path: impl Into<String>, flags: SubdocFlags) -> Self {
        self.push(SubdocOpKind::Exists, path, flags)
    }

    /// Reads the value at `path`.
    pub fn get(self, path: impl Into<String>) -> Self {
        self.get_with(path, SubdocFlags::NONE)
    }

    /// Reads the value at `path`, with flags.
    pub fn get_with(self, path: impl Into<String>, flags: SubdocFlags) -> Self {
        self.push(SubdocOpKind::Get, path, flags)
    }

    /// Counts the elements at `path`.
    pub fn count(self, path: impl Into<String>) -> Self {
        self.count_with(path, SubdocFlags::NONE)
    }

    /// Counts the elements at `path`, with flags.
    pub fn count_with(self, path: impl Into<String>, flags: SubdocFlags) -> Self {
        self.push(SubdocOpKind::Count, path, flags)
    }

    /// Sets the document-level options of the request.
    pub fn options(self, options: LookupInOptions) -> Self {
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

        RetryContext::collection("lookup_in", retry_options, collection, move |collection, args| async move {
            collection.lookup_in(key, ops, &args.options(Some(options))).await
        })
        .run()
        .await
    }

    fn push(mut self, kind: SubdocOpKind, path: impl Into<String>, flags: SubdocFlags) -> Self {
        self.ops.push(SubdocOp::new(kind, path, None, flags));
        self
    }
}
