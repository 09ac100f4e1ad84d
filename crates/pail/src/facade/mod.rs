// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Retrying wrappers around store client handles.
//!
//! The wrappers only forward calls: each one builds a [`RetryContext`][crate::RetryContext] and
//! runs the single client call inside it.

mod cluster;
mod collection;
mod index_manager;

pub use cluster::RetryCluster;
pub use collection::RetryCollection;
pub use index_manager::RetryIndexManager;
