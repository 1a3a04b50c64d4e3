use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;

pub const NUM_RESOURCES: usize = 5;
pub const NUM_PORT_KINDS: usize = 6;
pub const NUM_DEV_CARD_KINDS: usize = 5;

/// The five resources, in the fixed order used by every per-resource array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resource {
    Clay,
    Ore,
    Sheep,
    Wheat,
    Wood,
}

impl Resource {
    pub const ALL: [Resource; NUM_RESOURCES] = [
        Resource::Clay,
        Resource::Ore,
        Resource::Sheep,
        Resource::Wheat,
        Resource::Wood,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Resource::Clay => "clay",
            Resource::Ore => "ore",
            Resource::Sheep => "sheep",
            Resource::Wheat => "wheat",
            Resource::Wood => "wood",
        };

        write!(f, "{}", name)
    }
}

impl FromStr for Resource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .iter()
            .find(|r| r.to_string() == s)
            .copied()
            .ok_or_else(|| anyhow!("Unknown resource: {}", s))
    }
}

/// Port kinds ordered `[misc, clay, ore, sheep, wheat, wood]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortKind {
    Misc,
    Specific(Resource),
}

impl PortKind {
    pub const ALL: [PortKind; NUM_PORT_KINDS] = [
        PortKind::Misc,
        PortKind::Specific(Resource::Clay),
        PortKind::Specific(Resource::Ore),
        PortKind::Specific(Resource::Sheep),
        PortKind::Specific(Resource::Wheat),
        PortKind::Specific(Resource::Wood),
    ];

    pub fn index(self) -> usize {
        match self {
            PortKind::Misc => 0,
            PortKind::Specific(resource) => resource.index() + 1,
        }
    }
}

/// Development card kinds. Per-kind arrays are ordered
/// `[knight, road building, discovery, monopoly, victory point]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DevCard {
    Knight,
    RoadBuilding,
    Discovery,
    Monopoly,
    VictoryPoint,
}

impl DevCard {
    pub const ALL: [DevCard; NUM_DEV_CARD_KINDS] = [
        DevCard::Knight,
        DevCard::RoadBuilding,
        DevCard::Discovery,
        DevCard::Monopoly,
        DevCard::VictoryPoint,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Number of copies of each kind in a fresh deck.
    pub fn initial_count(self) -> i32 {
        match self {
            DevCard::Knight => 14,
            DevCard::RoadBuilding => 2,
            DevCard::Discovery => 2,
            DevCard::Monopoly => 2,
            DevCard::VictoryPoint => 5,
        }
    }
}

pub const DEV_DECK_SIZE: i32 = 25;

/// Building costs indexed by resource.
pub const ROAD_COST: [i32; NUM_RESOURCES] = [1, 0, 0, 0, 1];
pub const SETTLEMENT_COST: [i32; NUM_RESOURCES] = [1, 0, 1, 1, 1];
pub const CITY_COST: [i32; NUM_RESOURCES] = [0, 3, 0, 2, 0];
pub const DEV_CARD_COST: [i32; NUM_RESOURCES] = [0, 1, 1, 1, 0];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_index_round_trips() {
        for (i, resource) in Resource::ALL.iter().enumerate() {
            assert_eq!(resource.index(), i);
            assert_eq!(Resource::from_index(i), Some(*resource));
        }

        assert_eq!(Resource::from_index(5), None);
    }

    #[test]
    fn test_port_kind_index() {
        assert_eq!(PortKind::Misc.index(), 0);
        assert_eq!(PortKind::Specific(Resource::Clay).index(), 1);
        assert_eq!(PortKind::Specific(Resource::Wood).index(), 5);
    }

    #[test]
    fn test_deck_totals_twenty_five() {
        let total: i32 = DevCard::ALL.iter().map(|c| c.initial_count()).sum();
        assert_eq!(total, DEV_DECK_SIZE);
    }

    #[test]
    fn test_resource_parse() {
        assert_eq!("wheat".parse::<Resource>().unwrap(), Resource::Wheat);
        assert!("gold".parse::<Resource>().is_err());
    }
}
