//! View Builder - converts an itinerary document to a disclosure tree
//!
//! Day -> stop -> section -> item. Every node gets a key that is unique within
//! the tree and an initial open flag:
//! - days and stops: stored state, else the document's `open`, else closed
//! - sections: stored state, else closed
//!
//! Source keys (date, stop id, section slug) are used once; an empty or
//! repeated source falls back to the positional key.
//!
//! Completion statistics are derived from the effective done flags.

use rustc_hash::FxHashSet;
use serde_json::Value;

use crate::error::Result;
use crate::itinerary::classify::classify;
use crate::itinerary::state::StateStore;
use crate::itinerary::types::{Day, Document, Stop};
use crate::itinerary::view_models::*;

/// Build a tree using only the document's own flags.
pub fn build(document: &Document) -> DisclosureTree {
    TreeBuilder::new().build(document)
}

/// Parse and build in one step. A malformed document yields no tree at all.
pub fn build_from_value(value: &Value) -> Result<DisclosureTree> {
    let document = Document::from_value(value)?;
    Ok(build(&document))
}

/// Keys already handed out in the tree being built.
#[derive(Default)]
struct KeyRegistry {
    used: FxHashSet<NodeKey>,
}

impl KeyRegistry {
    /// The source key if it is still free, otherwise the positional key.
    fn claim(&mut self, source: Option<NodeKey>, positional: NodeKey) -> NodeKey {
        let key = match source {
            Some(key) if !self.used.contains(&key) => key,
            _ => positional,
        };
        self.used.insert(key.clone());
        key
    }
}

/// Tree builder with optional persisted state.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeBuilder<'a> {
    state: Option<&'a StateStore>,
}

impl<'a> TreeBuilder<'a> {
    pub fn new() -> Self {
        Self { state: None }
    }

    /// Overlay open/done flags saved by the presentation layer.
    pub fn with_state(mut self, state: &'a StateStore) -> Self {
        self.state = Some(state);
        self
    }

    pub fn build(&self, document: &Document) -> DisclosureTree {
        let mut keys = KeyRegistry::default();
        let days: Vec<DayNode> = document
            .days
            .iter()
            .enumerate()
            .map(|(i, day)| self.build_day(&mut keys, i + 1, day))
            .collect();

        tracing::debug!(
            "Built itinerary tree: {} days, {} stops",
            days.len(),
            days.iter().map(|d| d.stops.len()).sum::<usize>()
        );

        DisclosureTree { days }
    }

    fn build_day(&self, keys: &mut KeyRegistry, position: usize, day: &Day) -> DayNode {
        let source = Some(day.date.as_str())
            .filter(|date| !date.is_empty())
            .map(NodeKey::day);
        let key = keys.claim(source, NodeKey::day_at(position));
        let total = day.stops.len();

        let stops: Vec<StopNode> = day
            .stops
            .iter()
            .enumerate()
            .map(|(i, stop)| self.build_stop(keys, position, i + 1, total, stop))
            .collect();

        let completed = stops.iter().filter(|s| s.done).count();

        DayNode {
            open: self.initial_open(&key, day.open),
            key,
            date: day.date.clone(),
            title: day.title.clone(),
            start: day.start.clone(),
            end: day.end.clone(),
            progress: Progress::from_counts(completed, total),
            stops,
        }
    }

    fn build_stop(
        &self,
        keys: &mut KeyRegistry,
        day_position: usize,
        position: usize,
        total: usize,
        stop: &Stop,
    ) -> StopNode {
        let source = stop
            .id
            .as_deref()
            .filter(|id| !id.is_empty() && !id.starts_with(POSITIONAL_STOP_PREFIX))
            .map(NodeKey::stop);
        let key = keys.claim(source, NodeKey::stop_at(day_position, position));
        let mut body = Vec::new();

        if let Some(text) = &stop.description {
            body.push(StopBlock::Description { text: text.clone() });
        }

        for (i, section) in classify(stop).into_iter().enumerate() {
            let section_key = keys.claim(
                Some(NodeKey::section(&key, &section.title)),
                NodeKey::section_at(day_position, position, i + 1),
            );
            body.push(StopBlock::Section(SectionNode {
                open: self.initial_open(&section_key, None),
                key: section_key,
                title: section.title,
                items: section.items,
            }));
        }

        if let Some(coordinates) = &stop.coordinates {
            let id = match key.source_stop_id() {
                Some(id) => format!("map-{}", id),
                None => format!("map#{}-{}", day_position, position),
            };
            body.push(StopBlock::Map(MapPlaceholder {
                id,
                coordinates: coordinates.clone(),
            }));
        }

        body.push(StopBlock::BackToOverview);

        let mut node = StopNode {
            open: self.initial_open(&key, stop.open),
            key,
            stop_id: stop.id.clone(),
            position,
            total,
            name: stop.name.clone().unwrap_or_default(),
            time: stop.time.clone(),
            done: stop.done,
            body,
        };
        if let Some(done) = self.state.and_then(|s| s.done(node.persistence_id())) {
            node.done = done;
        }
        node
    }

    fn initial_open(&self, key: &NodeKey, document_open: Option<bool>) -> bool {
        self.state
            .and_then(|s| s.open(key))
            .or(document_open)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        Document::from_value(&value).unwrap()
    }

    #[test]
    fn test_day_open_defaults_closed() {
        let tree = build(&doc(json!({ "days": [
            { "date": "2024-05-01", "stops": [] },
            { "date": "2024-05-02", "open": true, "stops": [] }
        ]})));
        assert!(!tree.days[0].open);
        assert!(tree.days[1].open);
    }

    #[test]
    fn test_progress_and_positions() {
        let tree = build(&doc(json!([{
            "date": "2024-05-01",
            "stops": [
                { "name": "A", "done": true },
                { "name": "B", "done": true },
                { "name": "C", "done": true },
                { "name": "D" }
            ]
        }])));
        let day = &tree.days[0];
        assert_eq!(day.progress, Progress { completed: 3, total: 4, percent: 75 });
        assert_eq!(day.stops[3].position_label(), "4/4");
        assert_eq!(day.stops[0].key.as_str(), "stop#1-1");
    }

    #[test]
    fn test_empty_day_is_zero_percent() {
        let tree = build(&doc(json!([{ "date": "2024-05-01", "stops": [] }])));
        assert_eq!(tree.days[0].progress.percent, 0);
    }

    #[test]
    fn test_stop_body_order() {
        let tree = build(&doc(json!([{
            "date": "2024-05-01",
            "stops": [{
                "id": "louvre",
                "name": "Louvre",
                "description": "Art museum",
                "tips": ["Arrive early"],
                "activities": ["Mona Lisa"],
                "coordinates": "48.8606,2.3376"
            }]
        }])));
        let stop = &tree.days[0].stops[0];
        let kinds: Vec<&str> = stop
            .body
            .iter()
            .map(|b| match b {
                StopBlock::Description { .. } => "description",
                StopBlock::Section(_) => "section",
                StopBlock::Map(_) => "map",
                StopBlock::BackToOverview => "back",
            })
            .collect();
        assert_eq!(kinds, vec!["description", "section", "section", "map", "back"]);

        let titles: Vec<&str> = stop.sections().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Activities", "Tips"]);
        assert!(stop.sections().all(|s| !s.open));

        let map = stop.map().unwrap();
        assert_eq!(map.id, "map-louvre");
        assert_eq!(map.coordinates, "48.8606,2.3376");
    }

    #[test]
    fn test_no_description_or_map_when_absent() {
        let tree = build(&doc(json!([{
            "date": "2024-05-01",
            "stops": [{ "name": "Walk", "description": "" }]
        }])));
        let stop = &tree.days[0].stops[0];
        assert_eq!(stop.body, vec![StopBlock::BackToOverview]);
    }

    #[test]
    fn test_state_overrides_document_flags() {
        let document = doc(json!([{
            "date": "2024-05-01",
            "open": true,
            "stops": [
                { "id": "louvre", "name": "Louvre", "tips": ["x"] },
                { "name": "Seine walk", "done": true }
            ]
        }]));

        let mut state = StateStore::new();
        state.set_open(NodeKey::from("day:2024-05-01"), false);
        state.set_open(NodeKey::from("stop:louvre"), true);
        state.set_open(NodeKey::from("stop:louvre:tips"), true);
        state.set_done("louvre", true);
        state.set_done("stop#1-2", false);

        let tree = TreeBuilder::new().with_state(&state).build(&document);
        let day = &tree.days[0];
        assert!(!day.open);
        assert!(day.stops[0].open);
        assert!(day.stops[0].sections().next().unwrap().open);
        assert!(day.stops[0].done);
        assert!(!day.stops[1].done);
        assert_eq!(day.progress.completed, 1);
        assert_eq!(day.progress.percent, 50);
    }

    #[test]
    fn test_build_from_value_fails_fast() {
        assert!(build_from_value(&json!({ "days": 3 })).is_err());
        assert!(build_from_value(&json!(null)).is_err());
    }

    #[test]
    fn test_repeated_dates_fall_back_to_position() {
        let tree = build(&doc(json!([
            { "date": "2024-05-01", "stops": [] },
            { "date": "2024-05-01", "stops": [] },
            { "date": "", "stops": [] }
        ])));
        let keys: Vec<&str> = tree.days.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, vec!["day:2024-05-01", "day#2", "day#3"]);
    }

    #[test]
    fn test_stop_ids_never_share_a_key() {
        let tree = build(&doc(json!([{
            "date": "2024-05-01",
            "stops": [
                { "id": "1-2", "coordinates": "1,2" },
                { "name": "no id", "coordinates": "3,4" },
                { "id": "1-2", "coordinates": "5,6" },
                { "id": "stop#1-1" }
            ]
        }])));
        let stops = &tree.days[0].stops;
        let keys: Vec<&str> = stops.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["stop:1-2", "stop#1-2", "stop#1-3", "stop#1-4"]);

        let ids: Vec<&str> = stops.iter().map(|s| s.persistence_id()).collect();
        assert_eq!(ids, vec!["1-2", "stop#1-2", "stop#1-3", "stop#1-4"]);

        let maps: Vec<&str> = tree.map_placeholders().map(|m| m.id.as_str()).collect();
        assert_eq!(maps, vec!["map-1-2", "map#1-2", "map#1-3"]);
    }

    #[test]
    fn test_section_slugs_are_disambiguated() {
        let tree = build(&doc(json!([{
            "date": "2024-05-01",
            "stops": [
                { "id": "s", "extraInfo": ["a"], "extra_info": ["b"], "tips": ["c"] },
                { "id": "s:tips", "tips": ["d"] }
            ]
        }])));
        let first = &tree.days[0].stops[0];
        let keys: Vec<&str> = first.sections().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["stop:s:extra-info", "section#1-1-2", "stop:s:tips"]);

        // the second stop's id spells the first stop's section key
        let second = &tree.days[0].stops[1];
        assert_eq!(second.key.as_str(), "stop#1-2");
        assert_eq!(
            second.sections().next().map(|s| s.key.as_str()),
            Some("stop#1-2:tips")
        );
    }

    #[test]
    fn test_stop_done_from_state_uses_persistence_id() {
        let document = doc(json!([{
            "date": "2024-05-01",
            "stops": [{ "id": "louvre" }, { "id": "louvre" }]
        }]));
        let mut state = StateStore::new();
        state.set_done("stop#1-2", true);

        let tree = TreeBuilder::new().with_state(&state).build(&document);
        assert!(!tree.days[0].stops[0].done);
        assert!(tree.days[0].stops[1].done);
    }
}
