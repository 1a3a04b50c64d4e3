use anyhow::{anyhow, Result};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// The decision points a corpus is extracted for. The numeric ids name the output files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {
    RoadBuilding,
    InitialPlacement,
    NormalPlay,
    BeforeRoll,
    Discard,
    MoveRobber,
}

impl Task {
    pub const ALL: [Task; 6] = [
        Task::RoadBuilding,
        Task::InitialPlacement,
        Task::NormalPlay,
        Task::BeforeRoll,
        Task::Discard,
        Task::MoveRobber,
    ];

    pub fn id(self) -> usize {
        self as usize
    }

    pub fn from_id(id: usize) -> Option<Self> {
        Self::ALL.get(id).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Task::RoadBuilding => "road_building",
            Task::InitialPlacement => "initial_placement",
            Task::NormalPlay => "normal_play",
            Task::BeforeRoll => "before_roll",
            Task::Discard => "discard",
            Task::MoveRobber => "move_robber",
        }
    }

    /// Parses `all` or a comma separated list of task names or ids.
    pub fn parse_list(list: &str) -> Result<Vec<Task>> {
        if list.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::ALL.to_vec());
        }

        let mut tasks = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Task>>>()?;
        tasks.sort();
        tasks.dedup();

        Ok(tasks)
    }
}

impl Display for Task {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Task {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase();
        if let Ok(id) = s.parse::<usize>() {
            return Self::from_id(id).ok_or_else(|| anyhow!("Unknown task id {}", id));
        }

        Self::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| anyhow!("Unknown task {}", s))
    }
}
