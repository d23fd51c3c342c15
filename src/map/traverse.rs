use std::collections::{HashSet, VecDeque};

use crate::map::{GeoPoint, NodeId, RailMap, Segment};
use crate::types::Sector;

/// Breadth-first expansion from `origins`, hop-limited, restricted to edges
/// accepted by `edge_filter`. Origins are excluded from the result unless
/// `include_origins` is set. Monotonic in `max_hops`.
pub fn reachable_within<F>(
    map: &RailMap,
    origins: &[NodeId],
    max_hops: u32,
    edge_filter: F,
    include_origins: bool,
) -> HashSet<NodeId>
where
    F: Fn(&Segment) -> bool,
{
    let mut visited: HashSet<NodeId> = origins.iter().copied().collect();
    let mut frontier: Vec<NodeId> = origins.to_vec();
    let mut reached: HashSet<NodeId> = HashSet::new();

    for _ in 0..max_hops {
        let mut next = Vec::new();
        for node in frontier {
            for edge in map.incident_edges(node) {
                let Some(segment) = map.segment(*edge) else {
                    continue;
                };
                if !edge_filter(segment) {
                    continue;
                }
                let other = segment.other_end(node);
                if visited.insert(other) {
                    reached.insert(other);
                    next.push(other);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    if include_origins {
        reached.extend(origins.iter().copied());
    }
    reached
}

/// Layered breadth-first search from `from` until some visited node satisfies
/// `matches`. Returns the hop count (0 when the origin itself matches), or
/// `None` when no match exists in the connected component. Cost is edge-count,
/// never the segment's traversal-cost attribute.
pub fn hop_distance<M, F>(map: &RailMap, from: NodeId, matches: M, edge_filter: F) -> Option<u32>
where
    M: Fn(NodeId) -> bool,
    F: Fn(&Segment) -> bool,
{
    if matches(from) {
        return Some(0);
    }

    let mut visited: HashSet<NodeId> = HashSet::from([from]);
    let mut queue: VecDeque<(NodeId, u32)> = VecDeque::from([(from, 0)]);

    while let Some((node, hops)) = queue.pop_front() {
        for edge in map.incident_edges(node) {
            let Some(segment) = map.segment(*edge) else {
                continue;
            };
            if !edge_filter(segment) {
                continue;
            }
            let other = segment.other_end(node);
            if !visited.insert(other) {
                continue;
            }
            if matches(other) {
                return Some(hops + 1);
            }
            queue.push_back((other, hops + 1));
        }
    }
    None
}

/// Initial great-circle bearing from `from` to `to`, in degrees [0, 360).
pub fn bearing_degrees(from: GeoPoint, to: GeoPoint) -> f64 {
    let phi1 = from.lat.to_radians();
    let phi2 = to.lat.to_radians();
    let delta_lambda = (to.lon - from.lon).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();
    (x.atan2(y).to_degrees() + 360.0) % 360.0
}

/// Classify the bearing from `from` to `to` into a compass sector:
/// North (315, 45], East (45, 135], South (135, 225], West (225, 315].
pub fn bearing_sector(from: GeoPoint, to: GeoPoint) -> Sector {
    let bearing = bearing_degrees(from, to);
    if bearing > 45.0 && bearing <= 135.0 {
        Sector::East
    } else if bearing > 135.0 && bearing <= 225.0 {
        Sector::South
    } else if bearing > 225.0 && bearing <= 315.0 {
        Sector::West
    } else {
        Sector::North
    }
}

/// Candidates grouped by the compass sector they lie in from a set of origins.
#[derive(Debug, Clone, Default)]
pub struct DirectionBuckets {
    north: HashSet<NodeId>,
    east: HashSet<NodeId>,
    south: HashSet<NodeId>,
    west: HashSet<NodeId>,
}

impl DirectionBuckets {
    pub fn get(&self, sector: Sector) -> &HashSet<NodeId> {
        match sector {
            Sector::North => &self.north,
            Sector::East => &self.east,
            Sector::South => &self.south,
            Sector::West => &self.west,
        }
    }

    fn get_mut(&mut self, sector: Sector) -> &mut HashSet<NodeId> {
        match sector {
            Sector::North => &mut self.north,
            Sector::East => &mut self.east,
            Sector::South => &mut self.south,
            Sector::West => &mut self.west,
        }
    }

    pub fn populated(&self) -> Vec<Sector> {
        Sector::ALL
            .into_iter()
            .filter(|sector| !self.get(*sector).is_empty())
            .collect()
    }
}

/// Bucket every (origin, candidate) pair by bearing sector. A candidate may
/// land in several buckets when there are multiple origins. An empty bucket
/// inherits its opposite bucket's members (computed from the pre-fallback
/// contents), so no bucket is spuriously empty while its opposite has members.
pub fn bucket_by_direction(
    map: &RailMap,
    origins: &[NodeId],
    candidates: &HashSet<NodeId>,
) -> DirectionBuckets {
    let mut raw = DirectionBuckets::default();
    for &origin in origins {
        let from = map.city(origin).position;
        for &candidate in candidates {
            if candidate == origin {
                continue;
            }
            let sector = bearing_sector(from, map.city(candidate).position);
            raw.get_mut(sector).insert(candidate);
        }
    }

    let mut buckets = raw.clone();
    for sector in Sector::ALL {
        if raw.get(sector).is_empty() {
            *buckets.get_mut(sector) = raw.get(sector.opposite()).clone();
        }
    }
    buckets
}
