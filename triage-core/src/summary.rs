use serde::{Deserialize, Serialize};

use crate::collection::Edge;
use crate::{Call, CallCollection, Category, Severity};

/// Signal for a single category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategorySignal {
    pub category: Category,
    pub calls: usize,
    pub first_color: Option<Severity>,
    pub final_color: Option<Severity>,
    pub worst_color: Option<Severity>,
}

/// Snapshot of every signal a report needs from one encounter's calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignalSummary {
    pub categories: Vec<CategorySignal>,
    pub worst_color: Option<Severity>,
    pub ever_red: Option<bool>,
    pub ever_red_yellow: Option<bool>,
    pub any_final_red: bool,
    pub any_first_red: bool,
    pub any_final_red_yellow: bool,
}

impl CallCollection {
    /// Summarize the collection across every category.
    pub fn summarize(&self) -> SignalSummary {
        let categories = Category::ALL
            .into_iter()
            .map(|category| {
                let scoped = self.for_category(category);
                CategorySignal {
                    category,
                    calls: scoped.len(),
                    first_color: scoped.edge(Edge::First).map(Call::color),
                    final_color: scoped.edge(Edge::Final).map(Call::color),
                    worst_color: scoped.worst_color(),
                }
            })
            .collect();

        SignalSummary {
            categories,
            worst_color: self.worst_color(),
            ever_red: self.ever_red(),
            ever_red_yellow: self.ever_red_yellow(),
            any_final_red: self.any_final_red(),
            any_first_red: self.any_first_red(),
            any_final_red_yellow: self.any_final_red_yellow(),
        }
    }
}

impl SignalSummary {
    pub fn category(&self, category: Category) -> Option<&CategorySignal> {
        self.categories
            .iter()
            .find(|signal| signal.category == category)
    }
}
