use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::quantizer::{self as q, Quantizer};

pub const NUM_OPPONENTS: usize = 3;
pub const NUM_NEXT_LEGAL: usize = 11;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Encoding {
    Binary,
    Numeric,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Revision {
    Current,
    Legacy(u32),
}

/// Identifies the table a vector was written with. Vectors of different versions never mix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayoutVersion {
    pub encoding: Encoding,
    pub revision: Revision,
}

impl LayoutVersion {
    pub const BINARY: LayoutVersion = LayoutVersion {
        encoding: Encoding::Binary,
        revision: Revision::Current,
    };

    pub const NUMERIC: LayoutVersion = LayoutVersion {
        encoding: Encoding::Numeric,
        revision: Revision::Current,
    };
}

impl Display for LayoutVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let encoding = match self.encoding {
            Encoding::Binary => "binary",
            Encoding::Numeric => "numeric",
        };

        match self.revision {
            Revision::Current => write!(f, "{}", encoding),
            Revision::Legacy(n) => write!(f, "{}-legacy-{}", encoding, n),
        }
    }
}

impl FromStr for LayoutVersion {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        let (encoding, revision) = match s.split_once("-legacy-") {
            Some((encoding, n)) => (encoding, Revision::Legacy(n.parse()?)),
            None => (s.as_str(), Revision::Current),
        };

        let encoding = match encoding {
            "binary" => Encoding::Binary,
            "numeric" => Encoding::Numeric,
            other => return Err(anyhow!("Unknown layout {}", other)),
        };

        Ok(Self { encoding, revision })
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    #[error("vector layouts differ: expected {expected}, found {found}")]
    Mismatch {
        expected: LayoutVersion,
        found: LayoutVersion,
    },
    #[error("no table for layout {0}")]
    UnsupportedVersion(LayoutVersion),
    #[error("field {0:?} is not part of this layout")]
    FieldAbsent(Field),
}

/// Features of one opponent, repeated per opponent slot in play order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpponentField {
    Score,
    LargestArmy,
    LongestRoadHolder,
    LongestRoadLength,
    PlayedKnights,
    HasDevCards,
    AffectedByRobber,
    TotalResources,
    Roads,
    Settlements,
    Cities,
    TouchingPorts,
    Production,
    Access,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Bias,
    CurrentTurn,
    DiceResult,
    TotalSettlements,
    TotalRoads,
    TotalCities,
    AnyDevCardsLeft,
    ResourceBlocked,
    NumberBlocked,
    PlayersAffected,
    BoardPosition,
    HasPlayedDevCard,
    Score,
    LongestRoadHolder,
    LargestArmyHolder,
    LongestRoadLength,
    Roads,
    Settlements,
    Cities,
    ResourceInHand,
    TouchingPorts,
    Production,
    Access,
    AffectedByRobber,
    PiecesAffected,
    PlayedKnights,
    PlayedDevCards,
    OldDevCards,
    NewDevCards,
    VpCards,
    CanBuyCard,
    CanBuildRoad,
    CanBuildSettlement,
    CanBuildCity,
    CanBankTrade,
    Over7Cards,
    ExpansionPossibility,
    NextLegalProductivity,
    Opponent(usize, OpponentField),
}

impl Field {
    /// Fields an action can change, in state layout order.
    pub const ACTION: [Field; 32] = [
        Field::CurrentTurn,
        Field::DiceResult,
        Field::ResourceBlocked,
        Field::NumberBlocked,
        Field::PlayersAffected,
        Field::HasPlayedDevCard,
        Field::Score,
        Field::LongestRoadHolder,
        Field::LargestArmyHolder,
        Field::LongestRoadLength,
        Field::Roads,
        Field::Settlements,
        Field::Cities,
        Field::ResourceInHand,
        Field::TouchingPorts,
        Field::Production,
        Field::Access,
        Field::AffectedByRobber,
        Field::PiecesAffected,
        Field::PlayedKnights,
        Field::PlayedDevCards,
        Field::OldDevCards,
        Field::NewDevCards,
        Field::VpCards,
        Field::CanBuyCard,
        Field::CanBuildRoad,
        Field::CanBuildSettlement,
        Field::CanBuildCity,
        Field::CanBankTrade,
        Field::Over7Cards,
        Field::ExpansionPossibility,
        Field::NextLegalProductivity,
    ];
}

/// How a raw magnitude is written into a slot's channel.
#[derive(Clone, Copy, Debug)]
pub enum Rule {
    /// The magnitude itself.
    Raw,
    /// `1` when the magnitude is positive.
    Flag,
    /// One-hot over `n` indicators chosen by the quantizer.
    Buckets(usize, Quantizer),
}

impl Rule {
    pub fn width(&self) -> usize {
        match self {
            Rule::Raw | Rule::Flag => 1,
            Rule::Buckets(n, _) => *n,
        }
    }

    pub fn write(&self, raw: i32, out: &mut [i32]) {
        match self {
            Rule::Raw => out[0] = raw,
            Rule::Flag => out[0] = (raw > 0) as i32,
            Rule::Buckets(n, quantize) => {
                if let Some(i) = quantize(raw) {
                    out[i.min(n - 1)] = 1;
                }
            }
        }
    }

    /// Writes a fractional magnitude. Bucketed channels split the weight between the two
    /// buckets either side of `raw`.
    pub fn write_expected(&self, raw: f64, out: &mut [f64]) {
        match self {
            Rule::Raw => out[0] = raw,
            Rule::Flag => out[0] = raw.clamp(0.0, 1.0),
            Rule::Buckets(n, quantize) => {
                let low = raw.floor();
                let frac = raw - low;
                if let Some(i) = quantize(low as i32) {
                    out[i.min(n - 1)] += 1.0 - frac;
                }
                if frac > 0.0 {
                    if let Some(i) = quantize(low as i32 + 1) {
                        out[i.min(n - 1)] += frac;
                    }
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Slot {
    pub field: Field,
    pub channels: usize,
    pub rule: Rule,
    pub offset: usize,
}

impl Slot {
    pub fn width(&self) -> usize {
        self.channels * self.rule.width()
    }

    pub fn channel_range(&self, channel: usize) -> std::ops::Range<usize> {
        let start = self.offset + channel * self.rule.width();
        start..start + self.rule.width()
    }
}

/// Declaration table for one layout version: every field with its offset, channel count and
/// encoding rule.
#[derive(Clone, Debug)]
pub struct Layout {
    version: LayoutVersion,
    slots: Vec<Slot>,
    index: HashMap<Field, usize>,
    len: usize,
    action_slots: Vec<Slot>,
    action_index: HashMap<Field, usize>,
    action_len: usize,
}

impl Layout {
    pub fn new(version: LayoutVersion) -> Result<Self, LayoutError> {
        let table = match version {
            LayoutVersion {
                encoding: Encoding::Binary,
                revision: Revision::Current,
            } => binary_table(),
            LayoutVersion {
                encoding: Encoding::Numeric,
                revision: Revision::Current,
            } => numeric_table(),
            _ => return Err(LayoutError::UnsupportedVersion(version)),
        };

        let mut slots = Vec::with_capacity(table.len());
        let mut index = HashMap::new();
        let mut len = 0;
        for (field, channels, rule) in table {
            let slot = Slot {
                field,
                channels,
                rule,
                offset: len,
            };
            len += slot.width();
            index.insert(field, slots.len());
            slots.push(slot);
        }

        let mut action_slots = vec![];
        let mut action_index = HashMap::new();
        let mut action_len = 0;
        for field in Field::ACTION {
            if let Some(i) = index.get(&field) {
                let slot = Slot {
                    offset: action_len,
                    ..slots[*i]
                };
                action_len += slot.width();
                action_index.insert(field, action_slots.len());
                action_slots.push(slot);
            }
        }

        Ok(Self {
            version,
            slots,
            index,
            len,
            action_slots,
            action_index,
            action_len,
        })
    }

    pub fn version(&self) -> LayoutVersion {
        self.version
    }

    pub fn encoding(&self) -> Encoding {
        self.version.encoding
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn action_len(&self) -> usize {
        self.action_len
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn action_slots(&self) -> &[Slot] {
        &self.action_slots
    }

    pub fn contains(&self, field: Field) -> bool {
        self.index.contains_key(&field)
    }

    pub fn slot(&self, field: Field) -> Result<&Slot, LayoutError> {
        self.index
            .get(&field)
            .map(|i| &self.slots[*i])
            .ok_or(LayoutError::FieldAbsent(field))
    }

    pub fn action_slot(&self, field: Field) -> Result<&Slot, LayoutError> {
        self.action_index
            .get(&field)
            .map(|i| &self.action_slots[*i])
            .ok_or(LayoutError::FieldAbsent(field))
    }

    pub fn offset_of(&self, field: Field) -> Result<usize, LayoutError> {
        self.slot(field).map(|s| s.offset)
    }

    pub fn width_of(&self, field: Field) -> Result<usize, LayoutError> {
        self.slot(field).map(|s| s.width())
    }

    pub fn action_offset_of(&self, field: Field) -> Result<usize, LayoutError> {
        self.action_slot(field).map(|s| s.offset)
    }

    /// Fails with [`LayoutError::Mismatch`] unless `found` is this layout's version.
    pub fn check(&self, found: LayoutVersion) -> Result<(), LayoutError> {
        if found != self.version {
            return Err(LayoutError::Mismatch {
                expected: self.version,
                found,
            });
        }

        Ok(())
    }
}

type Table = Vec<(Field, usize, Rule)>;

fn binary_table() -> Table {
    use Field::*;
    use Rule::*;

    let mut table = vec![
        (Bias, 1, Raw),
        (DiceResult, 1, Buckets(6, q::dice)),
        (TotalSettlements, 1, Buckets(5, q::total_settlements)),
        (TotalRoads, 1, Buckets(5, q::total_roads)),
        (TotalCities, 1, Buckets(5, q::total_cities)),
        (AnyDevCardsLeft, 1, Flag),
        (ResourceBlocked, 5, Flag),
        (NumberBlocked, 1, Buckets(5, q::number_blocked)),
        (PlayersAffected, 1, Buckets(3, q::players_affected)),
        (BoardPosition, 1, Buckets(4, q::board_position)),
        (HasPlayedDevCard, 1, Flag),
        (Score, 1, Buckets(10, q::score)),
        (LongestRoadHolder, 1, Flag),
        (LargestArmyHolder, 1, Flag),
        (LongestRoadLength, 1, Buckets(15, q::longest_road)),
        (Roads, 1, Buckets(5, q::roads)),
        (Settlements, 1, Buckets(5, q::settlements)),
        (Cities, 1, Buckets(4, q::cities)),
        (ResourceInHand, 5, Buckets(5, q::in_hand)),
        (TouchingPorts, 6, Flag),
        (Production, 5, Buckets(9, q::production)),
        (Access, 5, Buckets(8, q::access)),
        (AffectedByRobber, 1, Flag),
        (PiecesAffected, 1, Buckets(6, q::pieces_affected)),
        (PlayedKnights, 1, Buckets(5, q::knights)),
        (PlayedDevCards, 3, Buckets(2, q::played_special)),
        (OldDevCards, 4, Flag),
        (NewDevCards, 4, Flag),
        (VpCards, 1, Buckets(5, q::vp_cards)),
        (CanBuyCard, 1, Flag),
        (CanBuildRoad, 1, Flag),
        (CanBuildSettlement, 1, Flag),
        (CanBuildCity, 1, Flag),
        (CanBankTrade, 1, Flag),
        (Over7Cards, 1, Flag),
    ];

    for i in 0..NUM_OPPONENTS {
        table.extend([
            (Opponent(i, OpponentField::Score), 1, Buckets(4, q::opponent_score)),
            (Opponent(i, OpponentField::LargestArmy), 1, Flag),
            (Opponent(i, OpponentField::LongestRoadHolder), 1, Flag),
            (
                Opponent(i, OpponentField::LongestRoadLength),
                1,
                Buckets(4, q::opponent_longest_road),
            ),
            (Opponent(i, OpponentField::PlayedKnights), 1, Buckets(2, q::opponent_knights)),
            (Opponent(i, OpponentField::HasDevCards), 1, Flag),
            (Opponent(i, OpponentField::AffectedByRobber), 1, Flag),
        ]);
    }

    table
}

fn numeric_table() -> Table {
    use Field::*;
    use Rule::*;

    let mut table = vec![
        (Bias, 1, Raw),
        (CurrentTurn, 1, Raw),
        (DiceResult, 1, Raw),
        (TotalSettlements, 1, Raw),
        (TotalRoads, 1, Raw),
        (TotalCities, 1, Raw),
        (AnyDevCardsLeft, 1, Flag),
        (ResourceBlocked, 5, Flag),
        (NumberBlocked, 1, Raw),
        (PlayersAffected, 1, Raw),
        (BoardPosition, 1, Raw),
        (HasPlayedDevCard, 1, Flag),
        (Score, 1, Raw),
        (LongestRoadHolder, 1, Flag),
        (LargestArmyHolder, 1, Flag),
        (LongestRoadLength, 1, Raw),
        (Roads, 1, Raw),
        (Settlements, 1, Raw),
        (Cities, 1, Raw),
        (ResourceInHand, 5, Raw),
        (TouchingPorts, 6, Flag),
        (Production, 5, Raw),
        (Access, 5, Raw),
        (AffectedByRobber, 1, Flag),
        (PiecesAffected, 1, Raw),
        (PlayedKnights, 1, Raw),
        (PlayedDevCards, 3, Raw),
        (OldDevCards, 4, Raw),
        (NewDevCards, 4, Raw),
        (VpCards, 1, Raw),
        (CanBuyCard, 1, Flag),
        (CanBuildRoad, 1, Flag),
        (CanBuildSettlement, 1, Flag),
        (CanBuildCity, 1, Flag),
        (CanBankTrade, 1, Flag),
        (Over7Cards, 1, Flag),
        (ExpansionPossibility, 1, Raw),
        (NextLegalProductivity, NUM_NEXT_LEGAL, Raw),
    ];

    for i in 0..NUM_OPPONENTS {
        let opponent = |field| Opponent(i, field);
        table.extend([
            (opponent(OpponentField::Score), 1, Raw),
            (opponent(OpponentField::LargestArmy), 1, Flag),
            (opponent(OpponentField::LongestRoadHolder), 1, Flag),
            (opponent(OpponentField::LongestRoadLength), 1, Raw),
            (opponent(OpponentField::PlayedKnights), 1, Raw),
            (opponent(OpponentField::HasDevCards), 1, Flag),
            (opponent(OpponentField::AffectedByRobber), 1, Flag),
            (opponent(OpponentField::TotalResources), 1, Raw),
            (opponent(OpponentField::Roads), 1, Raw),
            (opponent(OpponentField::Settlements), 1, Raw),
            (opponent(OpponentField::Cities), 1, Raw),
            (opponent(OpponentField::TouchingPorts), 6, Flag),
            (opponent(OpponentField::Production), 5, Raw),
            (opponent(OpponentField::Access), 5, Raw),
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_binary_lengths() {
        let layout = Layout::new(LayoutVersion::BINARY).unwrap();
        assert_eq!(layout.len(), 277);
        assert_eq!(layout.action_len(), 214);
    }

    #[test]
    fn test_numeric_lengths() {
        let layout = Layout::new(LayoutVersion::NUMERIC).unwrap();
        assert_eq!(layout.len(), 158);
        assert_eq!(layout.action_len(), 71);
        assert!(!Layout::new(LayoutVersion::BINARY)
            .unwrap()
            .contains(Field::ExpansionPossibility));
    }

    #[test]
    fn test_slots_are_contiguous() {
        for version in [LayoutVersion::BINARY, LayoutVersion::NUMERIC] {
            let layout = Layout::new(version).unwrap();
            let mut expected = 0;
            for slot in layout.slots() {
                assert_eq!(slot.offset, expected);
                expected += slot.width();
            }
            assert_eq!(expected, layout.len());

            let mut expected = 0;
            for slot in layout.action_slots() {
                assert_eq!(slot.offset, expected);
                expected += slot.width();
            }
            assert_eq!(expected, layout.action_len());
        }
    }

    #[test]
    fn test_offsets() {
        let layout = Layout::new(LayoutVersion::BINARY).unwrap();
        assert_eq!(layout.offset_of(Field::Bias), Ok(0));
        assert_eq!(layout.offset_of(Field::DiceResult), Ok(1));
        assert_eq!(layout.width_of(Field::ResourceInHand), Ok(25));
        assert_eq!(layout.action_offset_of(Field::DiceResult), Ok(0));
        assert_eq!(
            layout.offset_of(Field::Opponent(0, OpponentField::Score)),
            Ok(277 - 3 * 14)
        );
    }

    #[test]
    fn test_absent_fields() {
        let binary = Layout::new(LayoutVersion::BINARY).unwrap();
        assert_eq!(
            binary.offset_of(Field::CurrentTurn),
            Err(LayoutError::FieldAbsent(Field::CurrentTurn))
        );
        let total = Field::Opponent(1, OpponentField::TotalResources);
        assert_eq!(binary.width_of(total), Err(LayoutError::FieldAbsent(total)));
        assert_eq!(
            binary.action_offset_of(Field::BoardPosition),
            Err(LayoutError::FieldAbsent(Field::BoardPosition))
        );

        let numeric = Layout::new(LayoutVersion::NUMERIC).unwrap();
        assert!(numeric.contains(total));
    }

    #[test]
    fn test_legacy_versions_are_rejected() {
        let legacy = LayoutVersion {
            encoding: Encoding::Numeric,
            revision: Revision::Legacy(2),
        };
        assert_eq!(
            Layout::new(legacy).unwrap_err(),
            LayoutError::UnsupportedVersion(legacy)
        );
    }

    #[test]
    fn test_parse_version() {
        assert_eq!("binary".parse::<LayoutVersion>().unwrap(), LayoutVersion::BINARY);
        assert_eq!(" Numeric ".parse::<LayoutVersion>().unwrap(), LayoutVersion::NUMERIC);
        let legacy: LayoutVersion = "binary-legacy-3".parse().unwrap();
        assert_eq!(legacy.revision, Revision::Legacy(3));
        assert_eq!(legacy.to_string(), "binary-legacy-3");
        assert!("ternary".parse::<LayoutVersion>().is_err());
    }

    #[test]
    fn test_check_version() {
        let layout = Layout::new(LayoutVersion::BINARY).unwrap();
        assert!(layout.check(LayoutVersion::BINARY).is_ok());
        assert_eq!(
            layout.check(LayoutVersion::NUMERIC),
            Err(LayoutError::Mismatch {
                expected: LayoutVersion::BINARY,
                found: LayoutVersion::NUMERIC
            })
        );
    }

    #[test]
    fn test_bucket_rule() {
        let rule = Rule::Buckets(5, q::in_hand);
        let mut out = [0; 5];
        rule.write(3, &mut out);
        assert_eq!(out, [0, 0, 1, 0, 0]);

        let mut out = [0; 5];
        rule.write(0, &mut out);
        assert_eq!(out, [0; 5]);
    }

    #[test]
    fn test_bucket_rule_interpolates() {
        let rule = Rule::Buckets(5, q::in_hand);
        let mut out = [0.0; 5];
        rule.write_expected(1.25, &mut out);
        assert_approx_eq!(out[0], 0.75);
        assert_approx_eq!(out[1], 0.25);

        let mut out = [0.0; 5];
        rule.write_expected(0.4, &mut out);
        assert_approx_eq!(out[0], 0.4);
        assert_approx_eq!(out.iter().sum::<f64>(), 0.4);

        let mut out = [0.0; 5];
        rule.write_expected(2.0, &mut out);
        assert_eq!(out, [0.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_flag_rule() {
        let mut out = [0];
        Rule::Flag.write(3, &mut out);
        assert_eq!(out, [1]);

        let mut out = [0.0];
        Rule::Flag.write_expected(0.3, &mut out);
        assert_approx_eq!(out[0], 0.3);
    }
}
