use std::collections::HashSet;

use itertools::Itertools;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::contract::{Contract, GameView, PlayerId, value_of_node};
use crate::map::{GoodId, NodeId, traverse};
use crate::random::weighted_pick;
use crate::types::{ContractKind, Sector};

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("expected exactly two starting nodes, got {0}")]
    BadStartingNodes(usize),
    #[error("unknown participant {0}")]
    UnknownPlayer(PlayerId),
    #[error("participant {0} has no active nodes")]
    NoActiveNodes(PlayerId),
    #[error("no reachable destination candidates")]
    NoCandidates,
    #[error("no candidates in the {0} bucket")]
    EmptyDirection(Sector),
    #[error("no valid good remains after filtering")]
    NoGood,
    #[error("no destination lacks the chosen good")]
    NoDestination,
}

/// Result of starting-contract generation. The caller sets the participant's
/// active roster to `active`; the generator itself mutates nothing.
#[derive(Debug, Clone)]
pub struct StartingDraw {
    pub contract: Contract,
    pub active: [NodeId; 2],
}

/// Base direction weights when all four sectors are in play: coastward pulls
/// (east/west) outweigh north/south.
const STARTING_DIRECTION_WEIGHTS: [(Sector, u32); 4] = [
    (Sector::North, 3),
    (Sector::South, 3),
    (Sector::East, 7),
    (Sector::West, 7),
];

/// Generate the opening contract for a participant placed on exactly two
/// starting settlements. Candidates lie within two hops avoiding difficult
/// terrain, bucketed by bearing from both starting nodes.
pub fn generate_starting_contract<R: Rng>(
    view: &GameView<'_>,
    player: PlayerId,
    starts: &[NodeId],
    rng: &mut R,
) -> Result<StartingDraw, GenerateError> {
    let &[first, second] = starts else {
        return Err(GenerateError::BadStartingNodes(starts.len()));
    };

    let candidates = traverse::reachable_within(view.map, starts, 2, |s| !s.rough, false);
    if candidates.is_empty() {
        debug!(player, "starting contract: no candidates within two hops");
        return Err(GenerateError::NoCandidates);
    }

    let buckets = traverse::bucket_by_direction(view.map, starts, &candidates);
    let populated = buckets.populated();
    if populated.is_empty() {
        debug!(player, "starting contract: all direction buckets empty");
        return Err(GenerateError::NoCandidates);
    }

    // After opposite-bucket fallback either one axis survives or both do.
    // A lone axis is a coin flip; otherwise the full weight table applies.
    let weights: Vec<(Sector, u32)> = if populated.len() == 2 {
        populated.into_iter().map(|sector| (sector, 1)).collect()
    } else {
        STARTING_DIRECTION_WEIGHTS.to_vec()
    };
    let sector = *weighted_pick(&weights, rng);
    let bucket = buckets.get(sector);
    if bucket.is_empty() {
        debug!(player, %sector, "starting contract: chosen bucket empty");
        return Err(GenerateError::EmptyDirection(sector));
    }

    // Goods supplied by every candidate discriminate nothing and are dropped.
    let ubiquitous = goods_at_every(view, bucket);
    let good_pool: Vec<GoodId> = view
        .map
        .goods_at(&[first, second])
        .into_iter()
        .filter(|good| !ubiquitous.contains(good))
        .sorted_unstable()
        .collect();
    let Some(good) = good_pool.choose(rng).copied() else {
        debug!(player, "starting contract: no discriminating good");
        return Err(GenerateError::NoGood);
    };

    let destination_pool: Vec<(NodeId, u32)> = bucket
        .iter()
        .copied()
        .filter(|node| !view.map.city(*node).supplies(good))
        .sorted_unstable()
        .map(|node| (node, value_of_node(view, node)))
        .collect();
    if destination_pool.is_empty() {
        debug!(player, good, "starting contract: every candidate supplies the good");
        return Err(GenerateError::NoDestination);
    }
    let destination = *weighted_pick(&destination_pool, rng);

    Ok(StartingDraw {
        contract: Contract::new(destination, good, ContractKind::Private, Some(player)),
        active: [first, second],
    })
}

/// Generate a private contract for one participant, biased by which coast the
/// participant's current settlement sits near so contracts do not point into
/// open water.
pub fn generate_private_contract<R: Rng>(
    view: &GameView<'_>,
    player: PlayerId,
    rng: &mut R,
) -> Result<Contract, GenerateError> {
    let participant = view
        .players
        .iter()
        .find(|p| p.id == player)
        .ok_or(GenerateError::UnknownPlayer(player))?;
    let current = participant
        .current()
        .ok_or(GenerateError::NoActiveNodes(player))?;

    let current_city = view.map.city(current);
    let (east, west) = if current_city.east_coast {
        (3, 11)
    } else if current_city.west_coast {
        (11, 3)
    } else {
        (7, 7)
    };
    let weights = [
        (Sector::North, 3),
        (Sector::South, 3),
        (Sector::East, east),
        (Sector::West, west),
    ];
    let sector = *weighted_pick(&weights, rng);

    let candidates = traverse::reachable_within(view.map, &participant.active, 2, |_| true, false);
    let buckets = traverse::bucket_by_direction(view.map, &[current], &candidates);
    let bucket = buckets.get(sector);
    if bucket.is_empty() {
        debug!(player, %sector, "private contract: chosen bucket empty");
        return Err(GenerateError::EmptyDirection(sector));
    }

    let destination_pool: Vec<(NodeId, u32)> = bucket
        .iter()
        .copied()
        .sorted_unstable()
        .map(|node| (node, value_of_node(view, node)))
        .collect();
    let destination = *weighted_pick(&destination_pool, rng);

    let near: Vec<NodeId> = traverse::reachable_within(view.map, &participant.active, 1, |_| true, true)
        .into_iter()
        .collect();
    let destination_goods = view.map.goods_at(&[destination]);
    let good_pool: Vec<GoodId> = view
        .map
        .goods_at(&near)
        .into_iter()
        .filter(|good| !destination_goods.contains(good))
        .sorted_unstable()
        .collect();
    let Some(good) = good_pool.choose(rng).copied() else {
        debug!(player, destination, "private contract: no good to carry");
        return Err(GenerateError::NoGood);
    };

    Ok(Contract::new(
        destination,
        good,
        ContractKind::Private,
        Some(player),
    ))
}

/// Generate an open market contract around the union of every participant's
/// active settlements. The surviving good pool guarantees the payout spans at
/// least two hops.
pub fn generate_market_contract<R: Rng>(
    view: &GameView<'_>,
    rng: &mut R,
) -> Result<Contract, GenerateError> {
    let actives = view.active_union();
    let destinations = traverse::reachable_within(view.map, &actives, 2, |_| true, false);
    if destinations.is_empty() {
        debug!("market contract: no destination within two hops of play");
        return Err(GenerateError::NoCandidates);
    }
    let destination_pool: Vec<(NodeId, u32)> = destinations
        .into_iter()
        .sorted_unstable()
        .map(|node| (node, value_of_node(view, node)))
        .collect();
    let destination = *weighted_pick(&destination_pool, rng);

    let near: Vec<NodeId> = traverse::reachable_within(view.map, &actives, 1, |_| true, true)
        .into_iter()
        .collect();
    let destination_goods = view.map.goods_at(&[destination]);
    let good_pool: Vec<GoodId> = view
        .map
        .goods_at(&near)
        .into_iter()
        .filter(|good| !destination_goods.contains(good))
        .filter(|good| {
            // Keep only goods whose nearest supplier is two or more hops out,
            // so every market payout clears the two-hop floor.
            let supplies = |node: NodeId| view.map.city(node).supplies(*good);
            matches!(
                traverse::hop_distance(view.map, destination, supplies, |_| true),
                Some(hops) if hops >= 2
            )
        })
        .sorted_unstable()
        .collect();
    let Some(good) = good_pool.choose(rng).copied() else {
        debug!(destination, "market contract: no good survives filtering");
        return Err(GenerateError::NoGood);
    };

    Ok(Contract::new(destination, good, ContractKind::Market, None))
}

/// Goods supplied at *every* node of `nodes`. Empty input yields the empty set.
fn goods_at_every(view: &GameView<'_>, nodes: &HashSet<NodeId>) -> HashSet<GoodId> {
    let mut iter = nodes.iter();
    let Some(&first) = iter.next() else {
        return HashSet::new();
    };
    let mut common: HashSet<GoodId> = view.map.city(first).goods.iter().copied().collect();
    for &node in iter {
        let here: HashSet<GoodId> = view.map.city(node).goods.iter().copied().collect();
        common.retain(|good| here.contains(good));
        if common.is_empty() {
            break;
        }
    }
    common
}
