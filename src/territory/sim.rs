use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, warn};

use crate::contract::Player;
use crate::map::{EdgeId, NodeId, RailMap, traverse};
use crate::random::weighted_pick;
use crate::territory::{TerritoryId, TerritoryLedger};

/// Share of the candidate edge pool seeded as independent territory.
const SEED_SHARE: f64 = 0.05;

const NAME_ATTEMPTS: usize = 100;
const GROWTH_ATTEMPTS: usize = 100;

/// Occupancy cap of the growth model, in percent of available edges.
const OCCUPANCY_CAP: u32 = 25;

/// Per-occupancy-band distribution of round growth, in percentage points.
/// Low occupancy favors expansion; near the cap most rounds are quiet.
/// A drawn delta of zero is a normal no-growth round.
const GROWTH_DELTAS: [(u32, [(u32, u32); 4]); 5] = [
    (4, [(0, 2), (1, 5), (2, 4), (3, 2)]),
    (9, [(0, 3), (1, 5), (2, 3), (3, 1)]),
    (14, [(0, 5), (1, 4), (2, 2), (3, 1)]),
    (19, [(0, 7), (1, 3), (2, 1), (3, 0)]),
    (OCCUPANCY_CAP, [(0, 9), (1, 1), (2, 0), (3, 0)]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub territories: usize,
    pub edges_claimed: usize,
    pub pool: usize,
}

/// Seed initial independent territories: shuffle the candidate edges (those
/// with no endpoint in `exclude_zone`) and greedily claim until 5% of the
/// pool is held or candidates run out. Names come from the caller's opaque
/// generator; a candidate whose claim the ledger rejects is skipped and its
/// just-created territory dissolved.
pub fn seed_independents<N, R>(
    map: &RailMap,
    ledger: &mut TerritoryLedger,
    mut namer: N,
    exclude_zone: &HashSet<NodeId>,
    rng: &mut R,
) -> SeedSummary
where
    N: FnMut() -> String,
    R: Rng,
{
    let mut candidates: Vec<EdgeId> = map
        .edge_ids()
        .filter(|edge| {
            let (a, b) = *edge;
            !exclude_zone.contains(&a) && !exclude_zone.contains(&b)
        })
        .collect();
    candidates.sort_unstable();
    candidates.shuffle(rng);

    let pool = candidates.len();
    let target = (pool as f64 * SEED_SHARE).ceil() as usize;
    let mut summary = SeedSummary {
        territories: 0,
        edges_claimed: 0,
        pool,
    };

    for edge in candidates {
        if summary.edges_claimed >= target {
            break;
        }
        let Some(name) = unique_name(ledger, &mut namer) else {
            warn!("seeding stopped: name generator exhausted");
            break;
        };
        let Ok(id) = ledger.create(name, None) else {
            // Name was vetted above; a rejection here means the generator
            // raced the ledger, so skip this candidate.
            continue;
        };
        match ledger.assign_edge(map, id, edge) {
            Ok(()) => {
                summary.territories += 1;
                summary.edges_claimed += 1;
            }
            Err(err) => {
                debug!(?edge, %err, "seed claim rejected");
                let _ = ledger.dissolve(id);
            }
        }
    }
    summary
}

/// Grow independent territories by one round. Occupancy of the available
/// edges (those clear of every participant's one-hop neighborhood) selects a
/// weighted growth delta; the resulting edge demand is filled by expanding
/// randomly chosen independents along their frontiers, every claim running
/// through the ledger. Returns the newly claimed edges; empty means the round
/// rolled zero or growth stalled.
pub fn grow_independents<R: Rng>(
    map: &RailMap,
    ledger: &mut TerritoryLedger,
    players: &[Player],
    rng: &mut R,
) -> Vec<EdgeId> {
    let actives: Vec<NodeId> = players
        .iter()
        .flat_map(|p| p.active.iter().copied())
        .collect();
    let player_zone = traverse::reachable_within(map, &actives, 1, |_| true, true);

    let mut available: Vec<EdgeId> = map
        .edge_ids()
        .filter(|edge| {
            let (a, b) = *edge;
            !player_zone.contains(&a) && !player_zone.contains(&b)
        })
        .collect();
    available.sort_unstable();
    if available.is_empty() {
        debug!("growth stalled: no edge clear of player territory");
        return Vec::new();
    }
    let available_set: HashSet<EdgeId> = available.iter().copied().collect();

    let held = available
        .iter()
        .filter(|edge| {
            ledger
                .owner_of_edge(**edge)
                .and_then(|id| ledger.territory(id))
                .is_some_and(|t| t.is_independent())
        })
        .count();
    let total = available.len();
    let occupancy = ((100.0 * held as f64 / total as f64).round() as u32).min(OCCUPANCY_CAP);

    let delta = draw_growth_delta(occupancy, rng);
    if delta == 0 {
        debug!(occupancy, "growth rolled a quiet round");
        return Vec::new();
    }

    let target_pct = (occupancy + delta).min(OCCUPANCY_CAP);
    let target_edges = (target_pct as f64 / 100.0 * total as f64).round() as usize;
    let mut needed = target_edges.saturating_sub(held);
    if needed == 0 {
        // Rounding swallowed the delta: a fair coin forces one edge or stops.
        if rng.gen_bool(0.5) {
            needed = 1;
        } else {
            debug!(occupancy, delta, "growth rounded away");
            return Vec::new();
        }
    }

    let independents = ledger.independents();
    if independents.is_empty() {
        debug!("growth stalled: no independent territory on the board");
        return Vec::new();
    }

    let mut claimed = Vec::new();
    for _ in 0..GROWTH_ATTEMPTS {
        if claimed.len() >= needed {
            break;
        }
        let Some(&id) = independents.choose(rng) else {
            break;
        };
        let frontier = frontier_of(map, ledger, &independents, id, &available_set);
        if frontier.is_empty() {
            continue;
        }
        let Some(&edge) = frontier.choose(rng) else {
            continue;
        };
        match ledger.assign_edge(map, id, edge) {
            Ok(()) => claimed.push(edge),
            Err(err) => debug!(?edge, %err, "growth claim rejected"),
        }
    }
    if claimed.len() < needed {
        debug!(
            claimed = claimed.len(),
            needed, "growth exhausted its attempt budget"
        );
    }
    claimed
}

fn unique_name<N: FnMut() -> String>(ledger: &TerritoryLedger, namer: &mut N) -> Option<String> {
    for _ in 0..NAME_ATTEMPTS {
        let name = namer();
        if !ledger.name_taken(&name) {
            return Some(name);
        }
    }
    None
}

fn draw_growth_delta<R: Rng>(occupancy: u32, rng: &mut R) -> u32 {
    let band = GROWTH_DELTAS
        .iter()
        .find(|entry| occupancy <= entry.0)
        .map(|entry| &entry.1)
        .unwrap_or(&GROWTH_DELTAS[GROWTH_DELTAS.len() - 1].1);
    let entries: Vec<(u32, u32)> = band
        .iter()
        .copied()
        .filter(|(_, weight)| *weight > 0)
        .collect();
    *weighted_pick(&entries, rng)
}

/// Legal next claims for one independent territory: edges incident to its
/// nodes, minus edges it already holds, minus anything inside the one-hop
/// exclusion zone of every other independent, intersected with the available
/// set. Sorted for deterministic replay under a seeded RNG.
fn frontier_of(
    map: &RailMap,
    ledger: &TerritoryLedger,
    independents: &[TerritoryId],
    id: TerritoryId,
    available: &HashSet<EdgeId>,
) -> Vec<EdgeId> {
    let Some(territory) = ledger.territory(id) else {
        return Vec::new();
    };

    let mut rival_zone: HashSet<NodeId> = HashSet::new();
    for &other in independents {
        if other == id {
            continue;
        }
        let Some(rival) = ledger.territory(other) else {
            continue;
        };
        let origins: Vec<NodeId> = rival.nodes.iter().copied().collect();
        rival_zone.extend(traverse::reachable_within(map, &origins, 1, |_| true, true));
    }

    let mut frontier: Vec<EdgeId> = territory
        .nodes
        .iter()
        .flat_map(|node| map.incident_edges(*node).iter().copied())
        .filter(|edge| {
            if territory.edges.contains(edge) || !available.contains(edge) {
                return false;
            }
            let (a, b) = *edge;
            !rival_zone.contains(&a) && !rival_zone.contains(&b)
        })
        .collect();
    frontier.sort_unstable();
    frontier.dedup();
    frontier
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{fixture_map, grid_map};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn counting_namer() -> impl FnMut() -> String {
        let mut n = 0;
        move || {
            n += 1;
            format!("Shortline {n}")
        }
    }

    #[test]
    fn seeding_claims_at_most_five_percent() {
        let map = grid_map(6, 6);
        for seed in 0..10 {
            let mut ledger = TerritoryLedger::new();
            let mut rng = StdRng::seed_from_u64(seed);
            let summary = seed_independents(
                &map,
                &mut ledger,
                counting_namer(),
                &HashSet::new(),
                &mut rng,
            );
            let target = (summary.pool as f64 * 0.05).ceil() as usize;
            assert!(summary.edges_claimed <= target);
            assert_eq!(summary.territories, summary.edges_claimed);
            assert_eq!(
                ledger.territories().filter(|t| t.is_independent()).count(),
                summary.territories
            );
        }
    }

    #[test]
    fn seeding_respects_exclusion_zone() {
        let map = grid_map(6, 6);
        let zone: HashSet<_> = traverse::reachable_within(
            &map,
            &[map.city_id("C0-0").unwrap()],
            2,
            |_| true,
            true,
        );
        let mut ledger = TerritoryLedger::new();
        let mut rng = StdRng::seed_from_u64(9);
        seed_independents(&map, &mut ledger, counting_namer(), &zone, &mut rng);
        for territory in ledger.territories() {
            for node in &territory.nodes {
                assert!(!zone.contains(node));
            }
        }
    }

    #[test]
    fn seeding_stops_when_names_run_out() {
        let map = grid_map(6, 6);
        let mut ledger = TerritoryLedger::new();
        let mut rng = StdRng::seed_from_u64(4);
        let summary = seed_independents(
            &map,
            &mut ledger,
            || "Wabash".to_string(),
            &HashSet::new(),
            &mut rng,
        );
        // One unique name available, so at most one territory forms.
        assert!(summary.territories <= 1);
    }

    #[test]
    fn growth_avoids_player_neighborhood() {
        let map = grid_map(6, 6);
        let mut ledger = TerritoryLedger::new();
        let mut rng = StdRng::seed_from_u64(11);
        seed_independents(&map, &mut ledger, counting_namer(), &HashSet::new(), &mut rng);

        let players = [Player {
            id: 0,
            name: "UP".to_string(),
            active: vec![map.city_id("C2-2").unwrap(), map.city_id("C3-2").unwrap()],
        }];
        let actives: Vec<_> = players[0].active.clone();
        let zone = traverse::reachable_within(&map, &actives, 1, |_| true, true);

        for _round in 0..20 {
            let claimed = grow_independents(&map, &mut ledger, &players, &mut rng);
            for edge in claimed {
                let (a, b) = edge;
                assert!(!zone.contains(&a) && !zone.contains(&b));
            }
        }
    }

    #[test]
    fn growth_preserves_partition_invariant() {
        let map = grid_map(6, 6);
        let mut ledger = TerritoryLedger::new();
        let mut rng = StdRng::seed_from_u64(23);
        seed_independents(&map, &mut ledger, counting_namer(), &HashSet::new(), &mut rng);
        for _round in 0..30 {
            grow_independents(&map, &mut ledger, &[], &mut rng);
        }
        let mut node_holder = std::collections::HashMap::new();
        let mut edge_holder = std::collections::HashMap::new();
        for territory in ledger.territories() {
            for node in &territory.nodes {
                assert!(node_holder.insert(*node, territory.id).is_none());
            }
            for edge in &territory.edges {
                assert!(edge_holder.insert(*edge, territory.id).is_none());
            }
        }
    }

    #[test]
    fn growth_without_independents_returns_nothing() {
        let map = fixture_map();
        let mut ledger = TerritoryLedger::new();
        let mut rng = StdRng::seed_from_u64(2);
        assert!(grow_independents(&map, &mut ledger, &[], &mut rng).is_empty());
    }

    #[test]
    fn grown_territories_stay_connected() {
        let map = grid_map(6, 6);
        let mut ledger = TerritoryLedger::new();
        let mut rng = StdRng::seed_from_u64(31);
        seed_independents(&map, &mut ledger, counting_namer(), &HashSet::new(), &mut rng);
        for _round in 0..30 {
            grow_independents(&map, &mut ledger, &[], &mut rng);
        }
        for territory in ledger.territories() {
            if territory.edges.is_empty() {
                continue;
            }
            // Flood from one edge over shared endpoints must reach them all.
            let mut seen: HashSet<EdgeId> = HashSet::new();
            let mut stack = vec![*territory.edges.iter().next().unwrap()];
            while let Some(edge) = stack.pop() {
                if !seen.insert(edge) {
                    continue;
                }
                for other in &territory.edges {
                    if seen.contains(other) {
                        continue;
                    }
                    let (a, b) = edge;
                    let (c, d) = *other;
                    if a == c || a == d || b == c || b == d {
                        stack.push(*other);
                    }
                }
            }
            assert_eq!(seen.len(), territory.edges.len());
        }
    }
}
