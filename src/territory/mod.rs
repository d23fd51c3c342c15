use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::contract::PlayerId;
use crate::map::{EdgeId, NodeId, RailMap};

pub mod sim;

pub type TerritoryId = u32;

/// A named, connected, non-overlapping collection of track segments held by
/// one company. `nodes` is maintained incrementally on every successful edge
/// assignment and is always the endpoint set of `edges`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Territory {
    pub id: TerritoryId,
    pub name: String,
    /// Participant owner; independent companies have none.
    pub owner: Option<PlayerId>,
    pub edges: HashSet<EdgeId>,
    pub nodes: HashSet<NodeId>,
}

impl Territory {
    pub fn is_independent(&self) -> bool {
        self.owner.is_none()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("territory name {0} already taken")]
    NameTaken(String),
    #[error("unknown territory {0}")]
    UnknownTerritory(TerritoryId),
    #[error("edge {0:?} is not on the map")]
    UnknownEdge(EdgeId),
    #[error("edge {0:?} already owned")]
    EdgeOwned(EdgeId),
    #[error("node {0} already claimed by another territory")]
    NodeOwned(NodeId),
    #[error("edge {0:?} does not touch the territory's network")]
    Disconnected(EdgeId),
    #[error("territory {0} still holds edges")]
    NotEmpty(TerritoryId),
}

/// Single authority for edge and node ownership. Both seeding and growth go
/// through `assign_edge`; there is no secondary bookkeeping to drift from it.
#[derive(Debug, Clone, Default)]
pub struct TerritoryLedger {
    territories: HashMap<TerritoryId, Territory>,
    names: HashMap<String, TerritoryId>,
    edge_owner: HashMap<EdgeId, TerritoryId>,
    node_owner: HashMap<NodeId, TerritoryId>,
    next_id: TerritoryId,
}

impl TerritoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        name: impl Into<String>,
        owner: Option<PlayerId>,
    ) -> Result<TerritoryId, LedgerError> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(LedgerError::NameTaken(name));
        }
        let id = self.next_id;
        self.next_id += 1;
        self.names.insert(name.clone(), id);
        self.territories.insert(
            id,
            Territory {
                id,
                name,
                owner,
                edges: HashSet::new(),
                nodes: HashSet::new(),
            },
        );
        Ok(id)
    }

    /// Remove a territory that never claimed an edge (seeding rollback).
    pub fn dissolve(&mut self, id: TerritoryId) -> Result<(), LedgerError> {
        let territory = self
            .territories
            .get(&id)
            .ok_or(LedgerError::UnknownTerritory(id))?;
        if !territory.edges.is_empty() {
            return Err(LedgerError::NotEmpty(id));
        }
        let name = territory.name.clone();
        self.territories.remove(&id);
        self.names.remove(&name);
        Ok(())
    }

    /// Claim an edge for a territory. Rejects edges already owned, edges whose
    /// endpoint belongs to a different territory (first-claim exclusivity),
    /// and edges disjoint from the territory's network (unless it is empty).
    /// On rejection the ledger is unchanged.
    pub fn assign_edge(
        &mut self,
        map: &RailMap,
        id: TerritoryId,
        edge: EdgeId,
    ) -> Result<(), LedgerError> {
        let territory = self
            .territories
            .get(&id)
            .ok_or(LedgerError::UnknownTerritory(id))?;
        let segment = map.segment(edge).ok_or(LedgerError::UnknownEdge(edge))?;
        if self.edge_owner.contains_key(&edge) {
            return Err(LedgerError::EdgeOwned(edge));
        }
        let (a, b) = segment.endpoints;
        for node in [a, b] {
            if let Some(holder) = self.node_owner.get(&node)
                && *holder != id
            {
                return Err(LedgerError::NodeOwned(node));
            }
        }
        if !territory.edges.is_empty() && !territory.nodes.contains(&a) && !territory.nodes.contains(&b)
        {
            return Err(LedgerError::Disconnected(edge));
        }

        let territory = self
            .territories
            .get_mut(&id)
            .ok_or(LedgerError::UnknownTerritory(id))?;
        territory.edges.insert(edge);
        territory.nodes.insert(a);
        territory.nodes.insert(b);
        self.edge_owner.insert(edge, id);
        self.node_owner.insert(a, id);
        self.node_owner.insert(b, id);
        Ok(())
    }

    pub fn owner_of_edge(&self, edge: EdgeId) -> Option<TerritoryId> {
        self.edge_owner.get(&edge).copied()
    }

    pub fn owner_of_node(&self, node: NodeId) -> Option<TerritoryId> {
        self.node_owner.get(&node).copied()
    }

    pub fn territory(&self, id: TerritoryId) -> Option<&Territory> {
        self.territories.get(&id)
    }

    pub fn name_taken(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn territories(&self) -> impl Iterator<Item = &Territory> {
        self.territories.values()
    }

    /// Independent company ids, ordered for deterministic iteration.
    pub fn independents(&self) -> Vec<TerritoryId> {
        let mut ids: Vec<TerritoryId> = self
            .territories
            .values()
            .filter(|t| t.is_independent())
            .map(|t| t.id)
            .collect();
        ids.sort_unstable();
        ids
    }
}
