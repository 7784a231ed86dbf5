//! Open/done transitions on a built tree.
//!
//! Each operation touches exactly one node, then notifies the persistence
//! hooks. Unknown keys are ignored and return `None`.
//!
//! Node state machine: closed <-> open via `toggle`/`set_open`; the stop's
//! back-to-overview control only ever goes open -> closed.

use crate::itinerary::state::PersistenceHooks;
use crate::itinerary::view_models::{DisclosureNode, DisclosureTree, NodeKey};

impl DisclosureTree {
    /// Flip a node's open flag. Returns the new value.
    pub fn toggle(&mut self, key: &NodeKey, hooks: &mut dyn PersistenceHooks) -> Option<bool> {
        let node = self.find_node_mut(key)?;
        let open = !node.is_open();
        node.set_open(open);
        hooks.on_node_open_changed(key, open);
        Some(open)
    }

    /// Set a node's open flag; notifies only when the flag actually changes.
    pub fn set_open(
        &mut self,
        key: &NodeKey,
        open: bool,
        hooks: &mut dyn PersistenceHooks,
    ) -> Option<bool> {
        let node = self.find_node_mut(key)?;
        if node.is_open() != open {
            node.set_open(open);
            hooks.on_node_open_changed(key, open);
        }
        Some(open)
    }

    /// The stop's "back to overview" control: close that stop and leave its
    /// siblings and parent day alone. No-op when already closed.
    pub fn back_to_overview(
        &mut self,
        stop_key: &NodeKey,
        hooks: &mut dyn PersistenceHooks,
    ) -> Option<bool> {
        let (day, idx) = self.find_stop_mut(stop_key)?;
        let stop = &mut day.stops[idx];
        if stop.open {
            stop.open = false;
            hooks.on_node_open_changed(stop_key, false);
        }
        Some(false)
    }

    /// Check or uncheck a stop. The parent day's progress is re-derived.
    pub fn set_stop_done(
        &mut self,
        stop_key: &NodeKey,
        done: bool,
        hooks: &mut dyn PersistenceHooks,
    ) -> Option<bool> {
        let (day, idx) = self.find_stop_mut(stop_key)?;
        let stop = &mut day.stops[idx];
        if stop.done != done {
            stop.done = done;
            hooks.on_stop_done_changed(stop.persistence_id(), done);
            day.recompute_progress();
        }
        Some(done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::itinerary::state::{NoopPersistence, StateStore};
    use crate::itinerary::types::Document;
    use crate::itinerary::view_builder::build;
    use serde_json::json;

    fn sample_tree() -> DisclosureTree {
        let document = Document::from_value(&json!({ "days": [
            {
                "date": "2024-05-01",
                "open": true,
                "stops": [
                    { "id": "louvre", "name": "Louvre", "open": true, "tips": ["Arrive early"] },
                    { "id": "orsay", "name": "Orsay", "open": true },
                    { "name": "Seine walk" }
                ]
            },
            { "date": "2024-05-02", "stops": [] }
        ]}))
        .unwrap();
        build(&document)
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl PersistenceHooks for Recorder {
        fn on_stop_done_changed(&mut self, stop_id: &str, done: bool) {
            self.events.push(format!("done {} {}", stop_id, done));
        }

        fn on_node_open_changed(&mut self, key: &NodeKey, open: bool) {
            self.events.push(format!("open {} {}", key, open));
        }
    }

    #[test]
    fn test_back_to_overview_closes_only_that_stop() {
        let mut tree = sample_tree();
        let mut hooks = Recorder::default();

        let result = tree.back_to_overview(&NodeKey::from("stop:louvre"), &mut hooks);

        assert_eq!(result, Some(false));
        let day = &tree.days[0];
        assert!(!day.stops[0].open);
        assert!(day.stops[1].open);
        assert!(!day.stops[2].open);
        assert!(day.open);
        assert!(!tree.days[1].open);
        assert_eq!(hooks.events, vec!["open stop:louvre false"]);
    }

    #[test]
    fn test_back_to_overview_on_closed_stop_is_noop() {
        let mut tree = sample_tree();
        let mut hooks = Recorder::default();
        let before = tree.clone();

        tree.back_to_overview(&NodeKey::from("stop#1-3"), &mut hooks);

        assert_eq!(tree, before);
        assert!(hooks.events.is_empty());
    }

    #[test]
    fn test_toggle_any_node() {
        let mut tree = sample_tree();
        let mut hooks = Recorder::default();

        assert_eq!(tree.toggle(&NodeKey::from("day:2024-05-02"), &mut hooks), Some(true));
        assert_eq!(tree.toggle(&NodeKey::from("stop:louvre:tips"), &mut hooks), Some(true));
        assert_eq!(tree.toggle(&NodeKey::from("stop:louvre"), &mut hooks), Some(false));
        assert_eq!(tree.toggle(&NodeKey::from("stop:missing"), &mut hooks), None);

        assert!(tree.days[1].open);
        assert!(tree.days[0].stops[0].sections().next().unwrap().open);
        assert_eq!(hooks.events.len(), 3);
    }

    #[test]
    fn test_set_open_notifies_only_on_change() {
        let mut tree = sample_tree();
        let mut hooks = Recorder::default();

        tree.set_open(&NodeKey::from("day:2024-05-01"), true, &mut hooks);
        assert!(hooks.events.is_empty());

        tree.set_open(&NodeKey::from("day:2024-05-01"), false, &mut hooks);
        assert_eq!(hooks.events, vec!["open day:2024-05-01 false"]);
    }

    #[test]
    fn test_set_stop_done_updates_progress() {
        let mut tree = sample_tree();
        let mut hooks = Recorder::default();

        tree.set_stop_done(&NodeKey::from("stop:louvre"), true, &mut hooks);
        tree.set_stop_done(&NodeKey::from("stop#1-3"), true, &mut hooks);

        let progress = tree.days[0].progress;
        assert_eq!(progress.completed, 2);
        assert_eq!(progress.percent, 67);
        assert_eq!(hooks.events, vec!["done louvre true", "done stop#1-3 true"]);
    }

    #[test]
    fn test_state_store_as_hooks_restores_on_rebuild() {
        let document = Document::from_value(&json!([{
            "date": "2024-05-01",
            "stops": [{ "id": "louvre", "name": "Louvre" }]
        }]))
        .unwrap();

        let mut store = StateStore::new();
        let mut tree = build(&document);
        tree.toggle(&NodeKey::from("stop:louvre"), &mut store);
        tree.set_stop_done(&NodeKey::from("stop:louvre"), true, &mut store);

        let rebuilt = crate::itinerary::TreeBuilder::new()
            .with_state(&store)
            .build(&document);
        assert_eq!(rebuilt, tree);

        let mut noop = NoopPersistence;
        assert_eq!(tree.toggle(&NodeKey::from("stop:louvre"), &mut noop), Some(false));
    }
}
