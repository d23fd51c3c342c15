use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::types::Region;

pub mod traverse;

pub type NodeId = u16;
pub type GoodId = u16;

/// Edge identity is derived from its endpoints: smaller node id first.
pub type EdgeId = (NodeId, NodeId);

pub fn edge_id(a: NodeId, b: NodeId) -> EdgeId {
    if a <= b { (a, b) } else { (b, a) }
}

/// Geographic position in degrees. Only consumed by bearing classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    pub id: NodeId,
    pub name: String,
    pub region: Region,
    pub large: bool,
    /// Primary coastal terminus.
    pub terminus: bool,
    pub west_coast: bool,
    pub east_coast: bool,
    pub position: GeoPoint,
    pub goods: Vec<GoodId>,
    pub edges: Vec<EdgeId>,
}

impl City {
    pub fn supplies(&self, good: GoodId) -> bool {
        self.goods.contains(&good)
    }

    pub fn has_goods(&self) -> bool {
        !self.goods.is_empty()
    }

    pub fn west_terminus(&self) -> bool {
        self.terminus && self.west_coast
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub id: EdgeId,
    pub endpoints: (NodeId, NodeId),
    pub cost: u32,
    /// Difficult terrain flag.
    pub rough: bool,
}

impl Segment {
    pub fn touches(&self, node: NodeId) -> bool {
        self.endpoints.0 == node || self.endpoints.1 == node
    }

    pub fn other_end(&self, node: NodeId) -> NodeId {
        if self.endpoints.0 == node {
            self.endpoints.1
        } else {
            self.endpoints.0
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Good {
    pub id: GoodId,
    pub name: String,
    /// Regions that produce this good.
    pub regions: Vec<Region>,
    /// Cities that supply this good, derived from the city good lists at load.
    pub sources: Vec<NodeId>,
}

/// Externally supplied map dataset, keyed by name. The engine is agnostic to
/// its size or topology beyond "connected graph of named nodes joined by edges".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapData {
    pub cities: Vec<CityData>,
    pub segments: Vec<SegmentData>,
    pub goods: Vec<GoodData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityData {
    pub name: String,
    pub region: Region,
    #[serde(default)]
    pub large: bool,
    #[serde(default)]
    pub terminus: bool,
    #[serde(default)]
    pub west_coast: bool,
    #[serde(default)]
    pub east_coast: bool,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub goods: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentData {
    pub from: String,
    pub to: String,
    pub cost: u32,
    #[serde(default)]
    pub rough: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoodData {
    pub name: String,
    pub regions: Vec<Region>,
}

#[derive(Debug, thiserror::Error)]
pub enum MapLoadError {
    #[error("malformed map dataset: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] MapError),
}

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("city {0} declared twice")]
    DuplicateCity(String),
    #[error("good {0} declared twice")]
    DuplicateGood(String),
    #[error("unknown city {0}")]
    UnknownCity(String),
    #[error("unknown good {0}")]
    UnknownGood(String),
    #[error("segment {0}-{1} declared twice")]
    DuplicateSegment(String, String),
    #[error("segment endpoints must differ: {0}")]
    SelfLoop(String),
}

/// The world graph: immutable after load, shareable across sessions.
#[derive(Debug, Clone)]
pub struct RailMap {
    pub cities: Vec<City>,
    pub segments: HashMap<EdgeId, Segment>,
    pub goods: Vec<Good>,
    pub node_neighbors: HashMap<NodeId, HashSet<NodeId>>,
    pub node_edges: HashMap<NodeId, Vec<EdgeId>>,
    city_ids: HashMap<String, NodeId>,
    good_ids: HashMap<String, GoodId>,
}

impl RailMap {
    /// Load a dataset serialized as JSON, the interchange format the
    /// data-loading collaborator hands over.
    pub fn from_json(raw: &str) -> Result<Self, MapLoadError> {
        let data: MapData = serde_json::from_str(raw)?;
        Ok(Self::from_data(data)?)
    }

    pub fn from_data(data: MapData) -> Result<Self, MapError> {
        let mut city_ids: HashMap<String, NodeId> = HashMap::new();
        for (idx, city) in data.cities.iter().enumerate() {
            if city_ids.insert(city.name.clone(), idx as NodeId).is_some() {
                return Err(MapError::DuplicateCity(city.name.clone()));
            }
        }

        let mut good_ids: HashMap<String, GoodId> = HashMap::new();
        let mut goods: Vec<Good> = Vec::with_capacity(data.goods.len());
        for (idx, good) in data.goods.iter().enumerate() {
            if good_ids.insert(good.name.clone(), idx as GoodId).is_some() {
                return Err(MapError::DuplicateGood(good.name.clone()));
            }
            goods.push(Good {
                id: idx as GoodId,
                name: good.name.clone(),
                regions: good.regions.clone(),
                sources: Vec::new(),
            });
        }

        let mut cities: Vec<City> = Vec::with_capacity(data.cities.len());
        for (idx, city) in data.cities.iter().enumerate() {
            let id = idx as NodeId;
            let mut supplied = Vec::with_capacity(city.goods.len());
            for good_name in &city.goods {
                let good_id = *good_ids
                    .get(good_name)
                    .ok_or_else(|| MapError::UnknownGood(good_name.clone()))?;
                supplied.push(good_id);
                goods[good_id as usize].sources.push(id);
            }
            cities.push(City {
                id,
                name: city.name.clone(),
                region: city.region,
                large: city.large,
                terminus: city.terminus,
                west_coast: city.west_coast,
                east_coast: city.east_coast,
                position: GeoPoint {
                    lat: city.lat,
                    lon: city.lon,
                },
                goods: supplied,
                edges: Vec::new(),
            });
        }

        let mut segments: HashMap<EdgeId, Segment> = HashMap::new();
        let mut node_neighbors: HashMap<NodeId, HashSet<NodeId>> = HashMap::new();
        let mut node_edges: HashMap<NodeId, Vec<EdgeId>> = HashMap::new();
        for segment in &data.segments {
            let a = *city_ids
                .get(&segment.from)
                .ok_or_else(|| MapError::UnknownCity(segment.from.clone()))?;
            let b = *city_ids
                .get(&segment.to)
                .ok_or_else(|| MapError::UnknownCity(segment.to.clone()))?;
            if a == b {
                return Err(MapError::SelfLoop(segment.from.clone()));
            }
            let id = edge_id(a, b);
            if segments.contains_key(&id) {
                return Err(MapError::DuplicateSegment(
                    segment.from.clone(),
                    segment.to.clone(),
                ));
            }
            segments.insert(
                id,
                Segment {
                    id,
                    endpoints: id,
                    cost: segment.cost,
                    rough: segment.rough,
                },
            );
            node_neighbors.entry(a).or_default().insert(b);
            node_neighbors.entry(b).or_default().insert(a);
            node_edges.entry(a).or_default().push(id);
            node_edges.entry(b).or_default().push(id);
            cities[a as usize].edges.push(id);
            cities[b as usize].edges.push(id);
        }

        Ok(Self {
            cities,
            segments,
            goods,
            node_neighbors,
            node_edges,
            city_ids,
            good_ids,
        })
    }

    pub fn city(&self, id: NodeId) -> &City {
        &self.cities[id as usize]
    }

    pub fn good(&self, id: GoodId) -> &Good {
        &self.goods[id as usize]
    }

    pub fn city_id(&self, name: &str) -> Option<NodeId> {
        self.city_ids.get(name).copied()
    }

    pub fn good_id(&self, name: &str) -> Option<GoodId> {
        self.good_ids.get(name).copied()
    }

    pub fn segment(&self, id: EdgeId) -> Option<&Segment> {
        self.segments.get(&id)
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.segments.keys().copied()
    }

    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node_neighbors
            .get(&node)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn incident_edges(&self, node: NodeId) -> &[EdgeId] {
        self.node_edges
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Goods supplied at any node of `nodes`.
    pub fn goods_at<'a>(&self, nodes: impl IntoIterator<Item = &'a NodeId>) -> HashSet<GoodId> {
        nodes
            .into_iter()
            .flat_map(|&node| self.city(node).goods.iter().copied())
            .collect()
    }
}
