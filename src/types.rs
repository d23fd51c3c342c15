use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Coarse map region a settlement sits in (and a good is produced in).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Region {
    West,
    Central,
    East,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::West, Region::Central, Region::East];
}

/// Compass sector a bearing falls into. Used for direction bucketing only.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Sector {
    North,
    East,
    South,
    West,
}

impl Sector {
    pub const ALL: [Sector; 4] = [Sector::North, Sector::East, Sector::South, Sector::West];

    pub fn opposite(self) -> Sector {
        match self {
            Sector::North => Sector::South,
            Sector::South => Sector::North,
            Sector::East => Sector::West,
            Sector::West => Sector::East,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractKind {
    Market,
    Private,
}
