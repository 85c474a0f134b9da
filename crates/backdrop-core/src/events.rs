//! Catalog event fan-out
//!
//! Observers are called synchronously, in registration order, after the
//! persistence step that triggered the event has completed.

use crate::model::AssetRecord;

/// Notifications emitted by the catalog manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    /// `initialize` finished; carries the loaded records
    CatalogLoaded { records: Vec<AssetRecord> },
    AssetAdded(AssetRecord),
    AssetDeleted(AssetRecord),
    /// The current selection now points at this record
    CurrentChanged(AssetRecord),
}

impl CatalogEvent {
    /// Stable event name, as used in logs
    pub fn name(&self) -> &'static str {
        match self {
            CatalogEvent::CatalogLoaded { .. } => "catalog-loaded",
            CatalogEvent::AssetAdded(_) => "asset-added",
            CatalogEvent::AssetDeleted(_) => "asset-deleted",
            CatalogEvent::CurrentChanged(_) => "current-changed",
        }
    }
}

/// Receiver of catalog events
pub trait CatalogObserver: Send + Sync {
    fn on_event(&self, event: &CatalogEvent);
}

impl<F> CatalogObserver for F
where
    F: Fn(&CatalogEvent) + Send + Sync,
{
    fn on_event(&self, event: &CatalogEvent) {
        self(event)
    }
}

/// Handle returned by [`ObserverRegistry::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Ordered list of observers
#[derive(Default)]
pub struct ObserverRegistry {
    next_id: u64,
    observers: Vec<(ObserverId, Box<dyn CatalogObserver>)>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, observer: Box<dyn CatalogObserver>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// Remove an observer; returns false if the id was not registered
    pub fn unregister(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn dispatch(&self, event: &CatalogEvent) {
        tracing::debug!(
            event_name = event.name(),
            observers = self.observers.len(),
            "dispatching catalog event"
        );
        for (_, observer) in &self.observers {
            observer.on_event(event);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder(tag: &'static str, log: Arc<Mutex<Vec<String>>>) -> Box<dyn CatalogObserver> {
        Box::new(move |event: &CatalogEvent| {
            log.lock()
                .unwrap()
                .push(format!("{}:{}", tag, event.name()));
        })
    }

    #[test]
    fn test_dispatch_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ObserverRegistry::new();
        registry.register(recorder("first", log.clone()));
        registry.register(recorder("second", log.clone()));

        registry.dispatch(&CatalogEvent::AssetAdded(AssetRecord::default_record()));

        assert_eq!(
            *log.lock().unwrap(),
            vec!["first:asset-added", "second:asset-added"]
        );
    }

    #[test]
    fn test_unregister() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ObserverRegistry::new();
        let first = registry.register(recorder("first", log.clone()));
        registry.register(recorder("second", log.clone()));

        assert!(registry.unregister(first));
        assert!(!registry.unregister(first));
        registry.dispatch(&CatalogEvent::CurrentChanged(AssetRecord::default_record()));

        assert_eq!(*log.lock().unwrap(), vec!["second:current-changed"]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_event_names() {
        let record = AssetRecord::default_record();
        assert_eq!(
            CatalogEvent::CatalogLoaded { records: vec![] }.name(),
            "catalog-loaded"
        );
        assert_eq!(CatalogEvent::AssetDeleted(record).name(), "asset-deleted");
    }
}
