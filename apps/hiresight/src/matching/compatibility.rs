use std::collections::HashMap;

use crate::config::StyleAffinity;
use crate::models::analysis::WorkStyle;

/// Symmetric work-style compatibility lookup.
#[derive(Debug, Clone)]
pub struct StyleCompatibility {
    table: HashMap<(WorkStyle, WorkStyle), f64>,
    default_affinity: f64,
}

impl StyleCompatibility {
    pub fn new(affinities: &[StyleAffinity], default_affinity: f64) -> Self {
        let mut table = HashMap::with_capacity(affinities.len() * 2);
        for entry in affinities {
            table.insert((entry.a, entry.b), entry.score);
            table.insert((entry.b, entry.a), entry.score);
        }
        Self {
            table,
            default_affinity,
        }
    }

    /// 0.0 – 1.0. Identical styles always score 1.0.
    pub fn affinity(&self, candidate: WorkStyle, desired: WorkStyle) -> f64 {
        if candidate == desired {
            return 1.0;
        }
        self.table
            .get(&(candidate, desired))
            .copied()
            .unwrap_or(self.default_affinity)
    }

    /// Collaboration fit on a 0 – 100 scale. A role without a stated
    /// preference gives full credit.
    pub fn collaboration_fit(&self, candidate: WorkStyle, desired: Option<WorkStyle>) -> f64 {
        match desired {
            Some(desired) => 100.0 * self.affinity(candidate, desired),
            None => 100.0,
        }
    }
}
