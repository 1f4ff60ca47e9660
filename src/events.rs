//! Layer events and their listeners

use crate::{core::constants::EVENT_HISTORY_CAPACITY, prelude::HashMap};
use std::collections::VecDeque;
use std::fmt;

/// Events a tile layer emits or reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum LayerEvent {
    /// The layer dropped everything it had drawn
    Clear { layer_id: String },
    /// The map switched to another spatial reference
    SpatialReferenceChange,
    /// The map's base layer was replaced or removed
    BaseLayerChange { layer_id: Option<String> },
}

impl LayerEvent {
    /// Name listeners register under
    pub fn name(&self) -> &'static str {
        match self {
            LayerEvent::Clear { .. } => "clear",
            LayerEvent::SpatialReferenceChange => "spatialreferencechange",
            LayerEvent::BaseLayerChange { .. } => "baselayerchange",
        }
    }
}

/// Event callback type
pub type EventCallback = Box<dyn Fn(&LayerEvent) + Send + Sync>;

/// Event manager for layer events
#[derive(Default)]
pub struct EventManager {
    /// Event listeners by event type
    listeners: HashMap<String, Vec<EventCallback>>,
    /// Most recent events, oldest first
    history: VecDeque<LayerEvent>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event listener
    pub fn on<F>(&mut self, event_type: &str, callback: F)
    where
        F: Fn(&LayerEvent) + Send + Sync + 'static,
    {
        self.listeners
            .entry(event_type.to_string())
            .or_default()
            .push(Box::new(callback));
    }

    /// Run every listener registered for the event's name
    pub fn fire(&mut self, event: LayerEvent) {
        if let Some(callbacks) = self.listeners.get(event.name()) {
            for callback in callbacks {
                callback(&event);
            }
        }
        if self.history.len() == EVENT_HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(event);
    }

    pub fn listener_count(&self, event_type: &str) -> usize {
        self.listeners.get(event_type).map_or(0, Vec::len)
    }

    /// Takes the remembered events, oldest first
    pub fn drain_history(&mut self) -> Vec<LayerEvent> {
        self.history.drain(..).collect()
    }
}

impl fmt::Debug for EventManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventManager")
            .field("listeners", &self.listeners.keys().collect::<Vec<_>>())
            .field("history", &self.history)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[test]
    fn test_listeners_run_by_name() {
        let mut events = EventManager::new();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        events.on("clear", move |event| {
            assert!(matches!(event, LayerEvent::Clear { .. }));
            seen.fetch_add(1, Ordering::SeqCst);
        });

        events.fire(LayerEvent::Clear {
            layer_id: "osm".to_string(),
        });
        events.fire(LayerEvent::SpatialReferenceChange);

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(events.listener_count("clear"), 1);
        assert_eq!(events.listener_count("baselayerchange"), 0);
    }

    #[test]
    fn test_history_drains_in_order() {
        let mut events = EventManager::new();
        events.fire(LayerEvent::SpatialReferenceChange);
        events.fire(LayerEvent::BaseLayerChange { layer_id: None });

        let names: Vec<_> = events.drain_history().iter().map(LayerEvent::name).collect();
        assert_eq!(names, vec!["spatialreferencechange", "baselayerchange"]);
        assert!(events.drain_history().is_empty());
    }

    #[test]
    fn test_history_keeps_latest_events() {
        let mut events = EventManager::new();
        for i in 0..EVENT_HISTORY_CAPACITY * 3 {
            events.fire(LayerEvent::Clear {
                layer_id: i.to_string(),
            });
        }
        events.fire(LayerEvent::SpatialReferenceChange);

        let history = events.drain_history();
        assert_eq!(history.len(), EVENT_HISTORY_CAPACITY);
        assert_eq!(
            history[0],
            LayerEvent::Clear {
                layer_id: (EVENT_HISTORY_CAPACITY * 2 + 1).to_string()
            }
        );
        assert_eq!(history.last(), Some(&LayerEvent::SpatialReferenceChange));
    }
}
