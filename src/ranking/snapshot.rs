use std::collections::HashMap;

/// Immutable usage ranking: item id to position, `0` being the most used.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankSnapshot {
    order: Vec<(String, f64)>,
    positions: HashMap<String, usize>,
}

impl RankSnapshot {
    /// Rank items by weighted count, descending, ties broken by id.
    pub fn from_counts(counts: HashMap<String, f64>) -> Self {
        let mut order: Vec<(String, f64)> = counts.into_iter().collect();
        order.sort_by(|(a_id, a), (b_id, b)| b.total_cmp(a).then_with(|| a_id.cmp(b_id)));
        let positions = order
            .iter()
            .enumerate()
            .map(|(position, (id, _))| (id.clone(), position))
            .collect();
        Self { order, positions }
    }

    /// Position of `id`, or `None` if it has no recorded usage.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Sort key: unranked items come after every ranked one.
    pub(super) fn rank_of(&self, id: &str) -> usize {
        self.position(id).unwrap_or(usize::MAX)
    }

    /// Ranked items with their weighted counts, best first.
    pub fn entries(&self) -> impl Iterator<Item = (&str, f64)> {
        self.order.iter().map(|(id, weight)| (id.as_str(), *weight))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
