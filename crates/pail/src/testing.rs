// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::io::Write;
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;

use crate::{ErrorKind, StoreError};

/// Collects formatted retry events in memory.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventLog {
    text: Arc<Mutex<String>>,
}

impl EventLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn text(&self) -> String {
        self.text.lock().expect("lock poisoned").clone()
    }

    pub(crate) fn assert_logged(&self, fragment: &str) {
        let text = self.text();
        assert!(text.contains(fragment), "expected '{fragment}' in event log:\n{text}");
    }

    /// A subscriber formatting every event into this log; install it with `set_default()`.
    pub(crate) fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync + use<> {
        let layer = tracing_subscriber::fmt::layer().with_ansi(false).with_writer(self.clone());
        tracing_subscriber::registry().with(layer)
    }
}

impl<'a> MakeWriter<'a> for EventLog {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl Write for EventLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.text.lock().expect("lock poisoned").push_str(&String::from_utf8_lossy(buf));
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub(crate) fn transient() -> StoreError {
    StoreError::from_kind(ErrorKind::Timeout)
}

pub(crate) fn permanent() -> StoreError {
    StoreError::from_kind(ErrorKind::DocumentNotFound)
}
