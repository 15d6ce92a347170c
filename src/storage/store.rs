use std::sync::{Mutex, PoisonError};

use crate::config::DEFAULT_STORE_KEY;
use crate::foundation::error::{AdError, AdResult, ErrorReport};
use crate::model::template::AdTemplate;
use crate::storage::backend::StorageBackend;

/// Persisted template list stored as one JSON array under a single key.
///
/// Every operation is best-effort: failures are logged and kept in [`TemplateStore::last_error`]
/// instead of being returned. Mutations never write when the current contents cannot be read,
/// so unreadable data is left exactly as it was.
#[derive(Debug)]
pub struct TemplateStore<B> {
    backend: B,
    key: String,
    last_error: Mutex<Option<ErrorReport>>,
}

impl<B: StorageBackend> TemplateStore<B> {
    pub fn new(backend: B) -> Self {
        Self::with_key(backend, DEFAULT_STORE_KEY)
    }

    pub fn with_key(backend: B, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            last_error: Mutex::new(None),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Report of the most recent failed operation; cleared by the next success.
    pub fn last_error(&self) -> Option<ErrorReport> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// All stored templates; empty when nothing is stored or the data is unreadable.
    pub fn list(&self) -> Vec<AdTemplate> {
        let loaded = self.load();
        self.settle("load templates", loaded).unwrap_or_default()
    }

    pub fn get(&self, id: &str) -> Option<AdTemplate> {
        self.list().into_iter().find(|t| t.id == id)
    }

    /// Add `template` at the end of the list.
    pub fn append(&self, template: AdTemplate) {
        self.mutate("save template", |templates| templates.push(template));
    }

    /// Drop every template with this id.
    pub fn delete(&self, id: &str) {
        self.mutate("delete template", |templates| templates.retain(|t| t.id != id));
    }

    /// Replace every template with this id; other entries are untouched.
    pub fn update(&self, id: &str, template: AdTemplate) {
        self.mutate("update template", |templates| {
            for t in templates.iter_mut().filter(|t| t.id == id) {
                *t = template.clone();
            }
        });
    }

    pub fn clear(&self) {
        let removed = self.backend.remove(&self.key);
        self.settle("clear templates", removed);
    }

    fn load(&self) -> AdResult<Vec<AdTemplate>> {
        match self.backend.read(&self.key)? {
            None => Ok(Vec::new()),
            Some(text) => serde_json::from_str(&text)
                .map_err(|e| AdError::storage(format!("stored templates are unreadable: {e}"))),
        }
    }

    fn mutate(&self, operation: &str, f: impl FnOnce(&mut Vec<AdTemplate>)) {
        let result = self.load().and_then(|mut templates| {
            f(&mut templates);
            let text = serde_json::to_string(&templates)
                .map_err(|e| AdError::serde(format!("encode templates: {e}")))?;
            self.backend.write(&self.key, &text)
        });
        self.settle(operation, result);
    }

    fn settle<T>(&self, operation: &str, result: AdResult<T>) -> Option<T> {
        let mut last = self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match result {
            Ok(v) => {
                *last = None;
                Some(v)
            }
            Err(e) => {
                let report = ErrorReport::storage(&e, operation);
                tracing::error!(operation, error = %e, "{}", report.user_message());
                *last = Some(report);
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/storage/store.rs"]
mod tests;
