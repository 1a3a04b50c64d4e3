use std::fmt;

use super::resource::{Resource, NUM_RESOURCES};

/// A move in the simulator. Chance outcomes (dice, stolen card, drawn card) are not part of
/// the action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    BuildSettlement(usize),
    BuildRoad(usize),
    BuildCity(usize),
    RollDice,
    EndTurn,
    BankTrade {
        give: Resource,
        amount: i32,
        receive: Resource,
    },
    Discard([i32; NUM_RESOURCES]),
    PlaceRobber {
        hex: usize,
        victim: Option<usize>,
    },
    BuyCard,
    PlayKnight {
        hex: usize,
        victim: Option<usize>,
    },
    PlayRoadBuilding,
    PlayDiscovery(Resource, Resource),
    PlayMonopoly(Resource),
}

/// Coarse action categories shared by logged and simulated moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionKind {
    PortTrade,
    EndTurn,
    RollDice,
    BuildRoad,
    BuildSettlement,
    BuildCity,
    MoveRobber,
    ChoosePlayer,
    Discard,
    BuyCard,
    PlayKnight,
    PlayMonopoly,
    PlayDiscovery,
    PlayRoadBuilding,
}

impl ActionKind {
    pub const ALL: [ActionKind; 14] = [
        ActionKind::PortTrade,
        ActionKind::EndTurn,
        ActionKind::RollDice,
        ActionKind::BuildRoad,
        ActionKind::BuildSettlement,
        ActionKind::BuildCity,
        ActionKind::MoveRobber,
        ActionKind::ChoosePlayer,
        ActionKind::Discard,
        ActionKind::BuyCard,
        ActionKind::PlayKnight,
        ActionKind::PlayMonopoly,
        ActionKind::PlayDiscovery,
        ActionKind::PlayRoadBuilding,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ActionKind::PortTrade => "port trade",
            ActionKind::EndTurn => "end turn",
            ActionKind::RollDice => "roll dice",
            ActionKind::BuildRoad => "build road",
            ActionKind::BuildSettlement => "build settlement",
            ActionKind::BuildCity => "build city",
            ActionKind::MoveRobber => "move robber",
            ActionKind::ChoosePlayer => "choose player",
            ActionKind::Discard => "discard",
            ActionKind::BuyCard => "buy card",
            ActionKind::PlayKnight => "play knight",
            ActionKind::PlayMonopoly => "play monopoly",
            ActionKind::PlayDiscovery => "play discovery",
            ActionKind::PlayRoadBuilding => "play road building",
        };

        write!(f, "{}", name)
    }
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::BuildSettlement(_) => ActionKind::BuildSettlement,
            Action::BuildRoad(_) => ActionKind::BuildRoad,
            Action::BuildCity(_) => ActionKind::BuildCity,
            Action::RollDice => ActionKind::RollDice,
            Action::EndTurn => ActionKind::EndTurn,
            Action::BankTrade { .. } => ActionKind::PortTrade,
            Action::Discard(_) => ActionKind::Discard,
            Action::PlaceRobber { .. } => ActionKind::MoveRobber,
            Action::BuyCard => ActionKind::BuyCard,
            Action::PlayKnight { .. } => ActionKind::PlayKnight,
            Action::PlayRoadBuilding => ActionKind::PlayRoadBuilding,
            Action::PlayDiscovery(..) => ActionKind::PlayDiscovery,
            Action::PlayMonopoly(_) => ActionKind::PlayMonopoly,
        }
    }

    /// The opponent a robber move steals from, if any.
    pub fn victim(&self) -> Option<usize> {
        match self {
            Action::PlaceRobber { victim, .. } | Action::PlayKnight { victim, .. } => *victim,
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Action::BuildSettlement(v) => write!(f, "settlement@{}", v),
            Action::BuildRoad(e) => write!(f, "road@{}", e),
            Action::BuildCity(v) => write!(f, "city@{}", v),
            Action::RollDice => write!(f, "roll"),
            Action::EndTurn => write!(f, "end"),
            Action::BankTrade {
                give,
                amount,
                receive,
            } => write!(f, "trade {}x{}->{}", amount, give, receive),
            Action::Discard(cards) => write!(
                f,
                "discard {}",
                cards.iter().map(|c| c.to_string()).collect::<Vec<_>>().join("/")
            ),
            Action::PlaceRobber { hex, victim } => match victim {
                Some(p) => write!(f, "robber@{} steal p{}", hex, p),
                None => write!(f, "robber@{}", hex),
            },
            Action::BuyCard => write!(f, "buy"),
            Action::PlayKnight { hex, victim } => match victim {
                Some(p) => write!(f, "knight@{} steal p{}", hex, p),
                None => write!(f, "knight@{}", hex),
            },
            Action::PlayRoadBuilding => write!(f, "road building"),
            Action::PlayDiscovery(a, b) => write!(f, "discovery {}+{}", a, b),
            Action::PlayMonopoly(r) => write!(f, "monopoly {}", r),
        }
    }
}
