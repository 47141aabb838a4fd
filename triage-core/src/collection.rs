use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Call, Category, Severity, TriageError, TriageResult};

/// Calls for one encounter, optionally narrowed to a single category.
///
/// Filtering never mutates the receiver; it derives a new collection. "First" and
/// "final" only make sense within one category, so they require a scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CallCollection {
    calls: Vec<Call>,
    #[serde(default, rename = "rule")]
    scope: Option<Category>,
}

#[derive(Clone, Copy)]
pub(crate) enum Edge {
    First,
    Final,
}

impl Edge {
    fn query(self) -> &'static str {
        match self {
            Edge::First => "first",
            Edge::Final => "final",
        }
    }
}

impl CallCollection {
    pub fn new(calls: Vec<Call>) -> Self {
        Self { calls, scope: None }
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn scope(&self) -> Option<Category> {
        self.scope
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Calls of one category, scoped to it.
    pub fn for_category(&self, category: Category) -> CallCollection {
        CallCollection {
            calls: self
                .calls
                .iter()
                .filter(|call| call.category() == category)
                .cloned()
                .collect(),
            scope: Some(category),
        }
    }

    /// Calls of any of the given categories. The result spans categories, so it is
    /// left unscoped.
    pub fn for_categories(&self, categories: &[Category]) -> CallCollection {
        CallCollection {
            calls: self
                .calls
                .iter()
                .filter(|call| categories.contains(&call.category()))
                .cloned()
                .collect(),
            scope: None,
        }
    }

    pub(crate) fn edge(&self, edge: Edge) -> Option<&Call> {
        // min_by_key keeps the earliest-listed tie, max_by_key the latest-listed one.
        match edge {
            Edge::First => self.calls.iter().min_by_key(|call| call.time()),
            Edge::Final => self.calls.iter().max_by_key(|call| call.time()),
        }
    }

    fn scoped_edge(&self, edge: Edge) -> TriageResult<Option<&Call>> {
        if self.scope.is_none() {
            return Err(TriageError::NoScope { query: edge.query() });
        }
        Ok(self.edge(edge))
    }

    pub fn first(&self) -> TriageResult<Option<&Call>> {
        self.scoped_edge(Edge::First)
    }

    pub fn final_call(&self) -> TriageResult<Option<&Call>> {
        self.scoped_edge(Edge::Final)
    }

    pub fn first_color(&self) -> TriageResult<Option<Severity>> {
        Ok(self.first()?.map(Call::color))
    }

    pub fn final_color(&self) -> TriageResult<Option<Severity>> {
        Ok(self.final_call()?.map(Call::color))
    }

    /// `None` when there is no first call, so "no data" differs from "no match".
    pub fn first_is_color(&self, color: Severity) -> TriageResult<Option<bool>> {
        Ok(self.first_color()?.map(|first| first == color))
    }

    pub fn final_is_color(&self, color: Severity) -> TriageResult<Option<bool>> {
        Ok(self.final_color()?.map(|last| last == color))
    }

    /// Colour of every call regardless of category; `None` for an empty collection.
    pub fn colors_seen(&self) -> Option<BTreeSet<Severity>> {
        if self.calls.is_empty() {
            return None;
        }
        Some(self.calls.iter().map(Call::color).collect())
    }

    pub fn worst_color(&self) -> Option<Severity> {
        self.colors_seen()
            .and_then(|colors| Severity::worst(colors.into_iter()))
    }

    pub fn ever_had_color(&self, color: Severity) -> Option<bool> {
        self.colors_seen().map(|colors| colors.contains(&color))
    }

    fn edge_colors_per_category(&self, edge: Edge) -> BTreeSet<Option<Severity>> {
        Category::ALL
            .into_iter()
            .map(|category| {
                self.for_category(category)
                    .edge(edge)
                    .map(Call::color)
            })
            .collect()
    }

    /// Whether the final call of any category, present in the data or not, has `color`.
    pub fn any_final_color(&self, color: Severity) -> bool {
        self.edge_colors_per_category(Edge::Final)
            .contains(&Some(color))
    }

    pub fn any_first_color(&self, color: Severity) -> bool {
        self.edge_colors_per_category(Edge::First)
            .contains(&Some(color))
    }

    pub fn final_red(&self) -> TriageResult<Option<bool>> {
        self.final_is_color(Severity::Red)
    }

    pub fn first_red(&self) -> TriageResult<Option<bool>> {
        self.first_is_color(Severity::Red)
    }

    pub fn final_red_yellow(&self) -> TriageResult<Option<bool>> {
        Ok(either(
            self.final_is_color(Severity::Red)?,
            self.final_is_color(Severity::Yellow)?,
        ))
    }

    pub fn ever_red(&self) -> Option<bool> {
        self.ever_had_color(Severity::Red)
    }

    pub fn ever_red_yellow(&self) -> Option<bool> {
        either(
            self.ever_had_color(Severity::Red),
            self.ever_had_color(Severity::Yellow),
        )
    }

    pub fn any_final_red(&self) -> bool {
        self.any_final_color(Severity::Red)
    }

    pub fn any_first_red(&self) -> bool {
        self.any_first_color(Severity::Red)
    }

    pub fn any_final_red_yellow(&self) -> bool {
        self.any_final_color(Severity::Red) || self.any_final_color(Severity::Yellow)
    }
}

impl FromIterator<Call> for CallCollection {
    fn from_iter<T: IntoIterator<Item = Call>>(iter: T) -> Self {
        CallCollection::new(iter.into_iter().collect())
    }
}

/// Short-circuit "or" over optional answers: a positive first answer wins, anything
/// else defers to the second.
fn either(first: Option<bool>, second: Option<bool>) -> Option<bool> {
    match first {
        Some(true) => first,
        _ => second,
    }
}
