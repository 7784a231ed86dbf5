//! View models for the itinerary tree.
//!
//! A built tree is plain data: every node carries its key, label parts and
//! open flag, and serializes as-is for the JSON formatter and the HTTP API.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::slugify;

// ============================================================================
// Node identity
// ============================================================================

/// Stable identity of a disclosure node across render passes.
///
/// Keys come in two families that can never meet:
/// - source keys: `day:<date>`, `stop:<id>`, `<stop key>:<title slug>`
/// - positional keys: `day#<n>`, `stop#<d>-<i>`, `section#<d>-<i>-<n>`
///
/// The builder hands out a source key only once per tree and falls back to
/// the positional key for empty or repeated sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKey(String);

/// Prefix of positional stop keys; a stop id starting with it never gets a
/// source key.
pub const POSITIONAL_STOP_PREFIX: &str = "stop#";

impl NodeKey {
    /// `day:<date>`
    pub fn day(date: &str) -> Self {
        NodeKey(format!("day:{}", date))
    }

    /// `day#<position>`
    pub fn day_at(position: usize) -> Self {
        NodeKey(format!("day#{}", position))
    }

    /// `stop:<id>`
    pub fn stop(id: &str) -> Self {
        NodeKey(format!("stop:{}", id))
    }

    /// `stop#<day>-<position>`
    pub fn stop_at(day_position: usize, position: usize) -> Self {
        NodeKey(format!("{}{}-{}", POSITIONAL_STOP_PREFIX, day_position, position))
    }

    /// `<stop key>:<title slug>`
    pub fn section(stop: &NodeKey, title: &str) -> Self {
        NodeKey(format!("{}:{}", stop.0, slugify(title)))
    }

    /// `section#<day>-<stop>-<position>`
    pub fn section_at(day_position: usize, stop_position: usize, position: usize) -> Self {
        NodeKey(format!("section#{}-{}-{}", day_position, stop_position, position))
    }

    /// Source id carried by a `stop:<id>` key.
    pub fn source_stop_id(&self) -> Option<&str> {
        self.0.strip_prefix("stop:")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeKey {
    fn from(s: &str) -> Self {
        NodeKey(s.to_string())
    }
}

impl From<String> for NodeKey {
    fn from(s: String) -> Self {
        NodeKey(s)
    }
}

/// Common surface of every collapsible node.
pub trait DisclosureNode {
    fn key(&self) -> &NodeKey;
    fn label(&self) -> String;
    fn is_open(&self) -> bool;
    fn set_open(&mut self, open: bool);
}

// ============================================================================
// Sections
// ============================================================================

/// A titled group of display items derived from one stop field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub items: Vec<String>,
}

impl Section {
    pub fn new(title: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            title: title.into(),
            items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionNode {
    pub key: NodeKey,
    pub title: String,
    pub items: Vec<String>,
    pub open: bool,
}

impl DisclosureNode for SectionNode {
    fn key(&self) -> &NodeKey {
        &self.key
    }

    fn label(&self) -> String {
        self.title.clone()
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn set_open(&mut self, open: bool) {
        self.open = open;
    }
}

// ============================================================================
// Stops
// ============================================================================

/// Map slot handed to the map collaborator; coordinates are passed through raw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapPlaceholder {
    pub id: String,
    pub coordinates: String,
}

/// One entry of a stop body, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StopBlock {
    Description { text: String },
    Section(SectionNode),
    Map(MapPlaceholder),
    /// Closes the enclosing stop and nothing else
    BackToOverview,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopNode {
    pub key: NodeKey,
    /// Source `id`, if the stop had one
    pub stop_id: Option<String>,
    /// 1-based position within the day
    pub position: usize,
    /// Stop count of the parent day
    pub total: usize,
    pub name: String,
    pub time: Option<String>,
    pub done: bool,
    pub open: bool,
    pub body: Vec<StopBlock>,
}

impl StopNode {
    /// Identity reported to `on_stop_done_changed`: the source id when the
    /// stop kept it as its key, otherwise the positional node key.
    pub fn persistence_id(&self) -> &str {
        self.key.source_stop_id().unwrap_or(self.key.as_str())
    }

    /// "idx/total"
    pub fn position_label(&self) -> String {
        format!("{}/{}", self.position, self.total)
    }

    pub fn sections(&self) -> impl Iterator<Item = &SectionNode> {
        self.body.iter().filter_map(|b| match b {
            StopBlock::Section(s) => Some(s),
            _ => None,
        })
    }

    pub fn sections_mut(&mut self) -> impl Iterator<Item = &mut SectionNode> {
        self.body.iter_mut().filter_map(|b| match b {
            StopBlock::Section(s) => Some(s),
            _ => None,
        })
    }

    pub fn description(&self) -> Option<&str> {
        self.body.iter().find_map(|b| match b {
            StopBlock::Description { text } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn map(&self) -> Option<&MapPlaceholder> {
        self.body.iter().find_map(|b| match b {
            StopBlock::Map(m) => Some(m),
            _ => None,
        })
    }
}

impl DisclosureNode for StopNode {
    fn key(&self) -> &NodeKey {
        &self.key
    }

    fn label(&self) -> String {
        match &self.time {
            Some(time) => format!("{} {} ({})", self.position_label(), self.name, time),
            None => format!("{} {}", self.position_label(), self.name),
        }
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn set_open(&mut self, open: bool) {
        self.open = open;
    }
}

// ============================================================================
// Days
// ============================================================================

/// Completion statistics, always derived from the stops' done flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub percent: u32,
}

impl Progress {
    /// Percent rounded half up; an empty day is 0%.
    pub fn from_counts(completed: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0
        } else {
            ((200 * completed + total) / (2 * total)) as u32
        };
        Self {
            completed,
            total,
            percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayNode {
    pub key: NodeKey,
    pub date: String,
    pub title: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub progress: Progress,
    pub open: bool,
    pub stops: Vec<StopNode>,
}

impl DayNode {
    /// "start–end", with empty sides when a bound is missing.
    pub fn range_label(&self) -> String {
        format!(
            "{}\u{2013}{}",
            self.start.as_deref().unwrap_or(""),
            self.end.as_deref().unwrap_or("")
        )
    }

    pub fn recompute_progress(&mut self) {
        let completed = self.stops.iter().filter(|s| s.done).count();
        self.progress = Progress::from_counts(completed, self.stops.len());
    }
}

impl DisclosureNode for DayNode {
    fn key(&self) -> &NodeKey {
        &self.key
    }

    fn label(&self) -> String {
        let mut label = self.date.clone();
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            label.push(' ');
            label.push_str(title);
        }
        format!(
            "{} | {} | {} stops | {}% done",
            label,
            self.range_label(),
            self.progress.total,
            self.progress.percent
        )
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn set_open(&mut self, open: bool) {
        self.open = open;
    }
}

// ============================================================================
// Tree
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DisclosureTree {
    pub days: Vec<DayNode>,
}

impl DisclosureTree {
    pub fn day(&self, key: &NodeKey) -> Option<&DayNode> {
        self.days.iter().find(|d| &d.key == key)
    }

    pub fn stop(&self, key: &NodeKey) -> Option<&StopNode> {
        self.stops().find(|s| &s.key == key)
    }

    /// Stop whose `persistence_id` matches, i.e. the id a checkbox reports.
    pub fn stop_by_persistence_id(&self, id: &str) -> Option<&StopNode> {
        self.stops().find(|s| s.persistence_id() == id)
    }

    pub fn stops(&self) -> impl Iterator<Item = &StopNode> {
        self.days.iter().flat_map(|d| d.stops.iter())
    }

    /// Mutable stop plus its parent day.
    pub fn find_stop_mut(&mut self, key: &NodeKey) -> Option<(&mut DayNode, usize)> {
        self.days.iter_mut().find_map(|day| {
            let idx = day.stops.iter().position(|s| &s.key == key)?;
            Some((day, idx))
        })
    }

    /// Any node (day, stop or section) by key.
    pub fn find_node_mut(&mut self, key: &NodeKey) -> Option<&mut dyn DisclosureNode> {
        for day in &mut self.days {
            if &day.key == key {
                return Some(day);
            }
            for stop in &mut day.stops {
                if &stop.key == key {
                    return Some(stop);
                }
                for section in stop.sections_mut() {
                    if &section.key == key {
                        return Some(section);
                    }
                }
            }
        }
        None
    }

    pub fn map_placeholders(&self) -> impl Iterator<Item = &MapPlaceholder> {
        self.stops().filter_map(StopNode::map)
    }
}
