// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Batched sub-document requests.
//!
//! [`LookupIn`] and [`MutateIn`] collect an ordered list of [`SubdocOp`] records against one
//! document key and submit them as a single request through a [`RetryContext`][crate::RetryContext].
//! Retries always resubmit the whole batch.

mod lookup_in;
mod mutate_in;
mod op;
mod result;

pub use lookup_in::LookupIn;
pub use mutate_in::MutateIn;
pub use op::{SubdocFlags, SubdocOp, SubdocOpKind, SubdocValue};
pub use result::{FieldResult, FieldStatus, MultiResult};
