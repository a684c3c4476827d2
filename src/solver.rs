//! Exact and overlapping cover search drivers over a [`CoverageLinks`]
//! matrix.
//!
//! Both drivers share the same recursive depth-first skeleton (choose the
//! most constrained item, try each option covering it, recurse, backtrack)
//! and differ only in which pair of cover/uncover primitives they call and
//! in how re-covering the same item at the same recursion level is handled
//! (forbidden for exact cover, suppressed-but-allowed for overlapping
//! cover, see [`CoverageLinks::overlapping_coverages`]).

use std::collections::BTreeSet;

use crate::links::CoverageLinks;
use crate::ranked_set::RankedSet;
use crate::type_encoding::TypeEncoding;

impl CoverageLinks {
    /// Finds every exact cover reachable within `depth` choices: solutions
    /// where every visible item is covered by exactly one chosen option.
    ///
    /// Returns the solutions sorted by ascending rank (ties broken by
    /// member set) and whether the search stopped early because it hit
    /// [`CoverageLinks::max_output`].
    pub fn exact_coverages(&mut self, depth: i64) -> (BTreeSet<RankedSet<TypeEncoding>>, bool) {
        self.clear_hit_limit();
        let mut output = BTreeSet::new();
        let mut coverage = RankedSet::new();
        tracing::debug!(depth, "starting exact cover search");
        self.exact_search(&mut coverage, depth, &mut output);
        tracing::debug!(
            solutions = output.len(),
            hit_limit = self.reached_output_limit(),
            "exact cover search finished"
        );
        (output, self.reached_output_limit())
    }

    fn exact_search(
        &mut self,
        coverage: &mut RankedSet<TypeEncoding>,
        depth: i64,
        output: &mut BTreeSet<RankedSet<TypeEncoding>>,
    ) {
        if self.items_ring_empty() {
            if depth >= 0 {
                output.insert(coverage.clone());
            }
            return;
        }
        if depth <= 0 {
            return;
        }
        let item = self.choose_item();
        if item == 0 {
            return;
        }

        let mut node = self.next_in_column(item);
        while node != item {
            let (name, score) = self.cover_type(node);
            tracing::trace!(%name, score, "exact cover: covered option");
            coverage.insert_ranked(score, name);

            self.exact_search(coverage, depth - 1, output);

            if output.len() == self.max_output() {
                self.set_hit_limit();
                self.uncover_type(node);
                return;
            }

            coverage.erase_ranked(score, &name);
            self.uncover_type(node);
            node = self.next_in_column(node);
        }
    }

    /// Finds every overlapping cover reachable within `depth` choices:
    /// solutions where every visible item is covered by at least one
    /// chosen option, but an option already claimed at the current
    /// recursion level is not claimed again by a sibling branch.
    ///
    /// The underlying recursion can revisit the same combination of
    /// options in a different order, producing duplicate candidate sets;
    /// the `BTreeSet<RankedSet<_>>` output naturally deduplicates those
    /// (see the crate-level documentation's open-questions note).
    pub fn overlapping_coverages(
        &mut self,
        depth: i64,
    ) -> (BTreeSet<RankedSet<TypeEncoding>>, bool) {
        self.clear_hit_limit();
        let mut output = BTreeSet::new();
        let mut coverage = RankedSet::new();
        tracing::debug!(depth, "starting overlapping cover search");
        self.overlapping_search(&mut coverage, depth, &mut output);
        tracing::debug!(
            solutions = output.len(),
            hit_limit = self.reached_output_limit(),
            "overlapping cover search finished"
        );
        (output, self.reached_output_limit())
    }

    fn overlapping_search(
        &mut self,
        coverage: &mut RankedSet<TypeEncoding>,
        depth: i64,
        output: &mut BTreeSet<RankedSet<TypeEncoding>>,
    ) {
        if self.items_ring_empty() {
            if depth >= 0 {
                output.insert(coverage.clone());
            }
            return;
        }
        if depth <= 0 {
            return;
        }
        let item = self.choose_item();
        if item == 0 {
            return;
        }

        let mut node = self.next_in_column(item);
        while node != item {
            let depth_tag = depth as i32;
            let (name, score) = self.overlapping_cover_type(node, depth_tag);
            tracing::trace!(%name, score, depth_tag, "overlapping cover: covered option");
            coverage.insert_ranked(score, name);

            self.overlapping_search(coverage, depth - 1, output);

            if output.len() == self.max_output() {
                self.set_hit_limit();
                self.overlapping_uncover_type(node);
                return;
            }

            coverage.erase_ranked(score, &name);
            self.overlapping_uncover_type(node);
            node = self.next_in_column(node);
        }
    }
}
