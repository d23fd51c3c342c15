use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::map::{GoodId, NodeId, RailMap, traverse};
use crate::types::{ContractKind, Region};

pub mod generate;

pub use generate::{
    GenerateError, StartingDraw, generate_market_contract, generate_private_contract,
    generate_starting_contract,
};

pub type PlayerId = usize;

/// Payout rate per hop between a contract's destination and the nearest
/// supplier of its good.
pub const PAYOUT_PER_HOP: u32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    pub id: Uuid,
    pub destination: NodeId,
    pub good: GoodId,
    pub kind: ContractKind,
    pub fulfilled: bool,
    pub owner: Option<PlayerId>,
}

impl Contract {
    fn new(destination: NodeId, good: GoodId, kind: ContractKind, owner: Option<PlayerId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            destination,
            good,
            kind,
            fulfilled: false,
            owner,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Claimed footprint in acquisition order; the last entry is "current".
    pub active: Vec<NodeId>,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            active: Vec::new(),
        }
    }

    pub fn current(&self) -> Option<NodeId> {
        self.active.last().copied()
    }
}

/// Immutable snapshot the generators read. Generators are pure functions of
/// a view and an RNG; the caller merges any returned entity into its state.
#[derive(Debug, Clone, Copy)]
pub struct GameView<'a> {
    pub map: &'a RailMap,
    pub contracts: &'a [Contract],
    pub players: &'a [Player],
}

impl GameView<'_> {
    /// Union of every participant's active nodes, deduplicated and ordered.
    pub fn active_union(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self
            .players
            .iter()
            .flat_map(|p| p.active.iter().copied())
            .collect();
        nodes.sort_unstable();
        nodes.dedup();
        nodes
    }
}

/// Destination desirability. Recomputed from current contract state on every
/// call so it rises as contracts are fulfilled at or near a node.
pub fn value_of_node(view: &GameView<'_>, node: NodeId) -> u32 {
    let city = view.map.city(node);
    let base = 1
        + u32::from(city.has_goods())
        + u32::from(city.large)
        + 3 * u32::from(city.west_terminus());
    let fulfilled_at = view
        .contracts
        .iter()
        .filter(|c| c.fulfilled && c.destination == node)
        .count() as u32;
    let fulfilled_for_goods_here = view
        .contracts
        .iter()
        .filter(|c| c.fulfilled && city.supplies(c.good))
        .count() as u32;
    2 * base + 2 * fulfilled_at + fulfilled_for_goods_here
}

/// Hop distance from the destination to the nearest supplier of the
/// contract's good, times the per-hop rate.
pub fn payout(map: &RailMap, contract: &Contract) -> u32 {
    let good = contract.good;
    traverse::hop_distance(
        map,
        contract.destination,
        |node| map.city(node).supplies(good),
        |_| true,
    )
    .unwrap_or(0)
        * PAYOUT_PER_HOP
}

/// (destination region, producing region) -> tie reward. Same-region ties
/// reward least, cross-map ties most.
static TIE_REWARDS: Lazy<HashMap<(Region, Region), u32>> = Lazy::new(|| {
    HashMap::from([
        ((Region::West, Region::West), 2),
        ((Region::West, Region::Central), 3),
        ((Region::West, Region::East), 5),
        ((Region::Central, Region::West), 3),
        ((Region::Central, Region::Central), 2),
        ((Region::Central, Region::East), 3),
        ((Region::East, Region::West), 5),
        ((Region::East, Region::Central), 3),
        ((Region::East, Region::East), 2),
    ])
});

/// Fixed small reward for tying the destination to the good's producing
/// regions, minimum across all regions that produce the good.
pub fn tie_reward(map: &RailMap, contract: &Contract) -> u32 {
    let destination_region = map.city(contract.destination).region;
    map.good(contract.good)
        .regions
        .iter()
        .filter_map(|region| TIE_REWARDS.get(&(destination_region, *region)).copied())
        .min()
        .unwrap_or(0)
}
