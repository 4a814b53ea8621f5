// Probability-weighted random selection.
//
// Stores choices against a running cumulative weight and picks one by
// drawing a uniform value in [0, total). The chance of a given choice is
// its weight divided by the sum of all weights. Built once at configuration
// load, queried at summon time; there is no removal — a reload replaces the
// whole structure.
//
// See also: `shape.rs` (summon lists) and `archetype.rs` (escort lists),
// the two owners of weighted selections.

use effigy_prng::SummonRng;

/// An append-only collection of weighted choices.
#[derive(Clone, Debug, Default)]
pub struct WeightedSelection<T> {
    /// `(cumulative weight, value)` pairs; cumulative weights are strictly
    /// increasing because non-positive weights are never admitted.
    cumulative: Vec<(f64, T)>,
    total: f64,
}

impl<T> WeightedSelection<T> {
    pub fn new() -> Self {
        Self {
            cumulative: Vec::new(),
            total: 0.0,
        }
    }

    /// Add a choice with the given probability weight. Ignored unless the
    /// weight is greater than zero.
    pub fn add_choice(&mut self, value: T, weight: f64) {
        if weight > 0.0 {
            self.total += weight;
            self.cumulative.push((self.total, value));
        }
    }

    /// Pick a choice at random, weighted, or `None` if nothing was added.
    ///
    /// Ceiling semantics: the chosen entry is the one with the smallest
    /// cumulative bound >= the drawn value, so a draw landing exactly on a
    /// bucket boundary belongs to that bucket, not the one above.
    pub fn choose(&self, rng: &mut SummonRng) -> Option<&T> {
        if self.cumulative.is_empty() {
            return None;
        }
        let u = rng.next_f64() * self.total;
        let i = self.cumulative.partition_point(|(bound, _)| *bound < u);
        // partition_point can only return len() if u exceeds every bound,
        // which a draw in [0, total) cannot; clamp regardless.
        let i = i.min(self.cumulative.len() - 1);
        Some(&self.cumulative[i].1)
    }

    /// Sum of all admitted weights.
    pub fn total_weight(&self) -> f64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// Iterate `(individual weight, value)` pairs in insertion order —
    /// used to render percentage breakdowns in descriptions.
    pub fn entries(&self) -> impl Iterator<Item = (f64, &T)> {
        let mut previous = 0.0;
        self.cumulative.iter().map(move |(bound, value)| {
            let weight = bound - previous;
            previous = *bound;
            (weight, value)
        })
    }
}
