//! Least-loaded selection over a candidate pool
//!
//! Pure functions plus the batch planner that keeps the in-memory running
//! counter for a single batch run. Ordering is ascending by load count with
//! a staff-id tie-break so the same pool always yields the same pick.

use std::collections::HashMap;

/// A candidate staff member together with their committed load count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateLoad {
    pub staff_id: i64,
    pub count: i64,
}

impl CandidateLoad {
    pub fn new(staff_id: i64, count: i64) -> Self {
        Self { staff_id, count }
    }
}

/// Pick the least-loaded candidate. Ties break by ascending staff id;
/// an empty pool yields `None`.
pub fn select_least(candidates: &[CandidateLoad]) -> Option<i64> {
    candidates
        .iter()
        .min_by_key(|c| (c.count, c.staff_id))
        .map(|c| c.staff_id)
}

/// Full ranking of the pool, least loaded first. Used when the caller
/// wants fallback candidates without re-querying.
pub fn rank(candidates: &[CandidateLoad]) -> Vec<i64> {
    let mut ordered: Vec<CandidateLoad> = candidates.to_vec();
    ordered.sort_by_key(|c| (c.count, c.staff_id));
    ordered.into_iter().map(|c| c.staff_id).collect()
}

/// Running counter for one batch-coordinator invocation.
///
/// Committed counts are fetched once per scope; picks made earlier in the
/// same batch are layered on top so load balances across the whole batch
/// without a database round-trip per item. The counter is confined to one
/// coordinator call, so no synchronization is needed.
#[derive(Debug, Default)]
pub struct BatchPlanner {
    picked: HashMap<i64, i64>,
}

impl BatchPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select from the committed pool adjusted by picks already made in
    /// this batch, and record the pick.
    pub fn pick(&mut self, committed: &[CandidateLoad]) -> Option<i64> {
        let adjusted: Vec<CandidateLoad> = committed
            .iter()
            .map(|c| CandidateLoad {
                staff_id: c.staff_id,
                count: c.count + self.picks_for(c.staff_id),
            })
            .collect();

        let staff_id = select_least(&adjusted)?;
        *self.picked.entry(staff_id).or_insert(0) += 1;
        Some(staff_id)
    }

    /// Release a pick whose transaction failed, so the load the counter
    /// anticipated but that never committed stops skewing later picks.
    pub fn unpick(&mut self, staff_id: i64) {
        if let Some(count) = self.picked.get_mut(&staff_id) {
            *count -= 1;
            if *count <= 0 {
                self.picked.remove(&staff_id);
            }
        }
    }

    /// How many picks this batch has already given a staff member.
    pub fn picks_for(&self, staff_id: i64) -> i64 {
        self.picked.get(&staff_id).copied().unwrap_or(0)
    }

    pub fn total_picks(&self) -> i64 {
        self.picked.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(counts: &[(i64, i64)]) -> Vec<CandidateLoad> {
        counts
            .iter()
            .map(|&(staff_id, count)| CandidateLoad::new(staff_id, count))
            .collect()
    }

    #[test]
    fn empty_pool_selects_nothing() {
        assert_eq!(select_least(&[]), None);
        assert_eq!(BatchPlanner::new().pick(&[]), None);
    }

    #[test]
    fn lowest_count_wins() {
        let candidates = pool(&[(1, 5), (2, 2), (3, 9)]);
        assert_eq!(select_least(&candidates), Some(2));
    }

    #[test]
    fn ties_break_by_ascending_staff_id() {
        let candidates = pool(&[(9, 3), (4, 3), (7, 3)]);
        assert_eq!(select_least(&candidates), Some(4));
        // Input order must not matter.
        let shuffled = pool(&[(7, 3), (9, 3), (4, 3)]);
        assert_eq!(select_least(&shuffled), Some(4));
    }

    #[test]
    fn rank_orders_by_count_then_id() {
        let candidates = pool(&[(3, 1), (1, 0), (2, 0)]);
        assert_eq!(rank(&candidates), vec![1, 2, 3]);
    }

    #[test]
    fn planner_walks_the_pool_round_robin() {
        // Roster A(0), B(0), C(1): expected picks A, B, then the three are
        // level and A wins the tie again.
        let committed = pool(&[(1, 0), (2, 0), (3, 1)]);
        let mut planner = BatchPlanner::new();
        assert_eq!(planner.pick(&committed), Some(1));
        assert_eq!(planner.pick(&committed), Some(2));
        assert_eq!(planner.pick(&committed), Some(1));
        assert_eq!(planner.pick(&committed), Some(2));
        assert_eq!(planner.pick(&committed), Some(3));
    }

    #[test]
    fn unpick_releases_a_failed_assignment() {
        let committed = pool(&[(1, 0), (2, 0)]);
        let mut planner = BatchPlanner::new();
        assert_eq!(planner.pick(&committed), Some(1));

        // The assignment for staff 1 rolls back; the counter must forget it
        // so staff 1 is still the least loaded for the next subject.
        planner.unpick(1);
        assert_eq!(planner.picks_for(1), 0);
        assert_eq!(planner.total_picks(), 0);
        assert_eq!(planner.pick(&committed), Some(1));
        assert_eq!(planner.pick(&committed), Some(2));
    }

    #[test]
    fn unpick_of_unknown_staff_is_a_no_op() {
        let committed = pool(&[(1, 0), (2, 0)]);
        let mut planner = BatchPlanner::new();
        planner.unpick(99);
        assert_eq!(planner.total_picks(), 0);
        assert_eq!(planner.pick(&committed), Some(1));
    }

    #[test]
    fn planner_balances_within_one() {
        let committed = pool(&[(1, 0), (2, 0), (3, 0), (4, 0)]);
        let mut planner = BatchPlanner::new();
        for _ in 0..21 {
            planner.pick(&committed).unwrap();
        }
        let picks: Vec<i64> = (1..=4).map(|id| planner.picks_for(id)).collect();
        let max = *picks.iter().max().unwrap();
        let min = *picks.iter().min().unwrap();
        assert!(max - min <= 1, "unbalanced picks: {picks:?}");
        assert_eq!(planner.total_picks(), 21);
    }
}
