use anyhow::Result;
use catan::{ActionRow, ActionType, Bridge, LoggedSnapshot, LoggedState, NUM_PLAYERS};
use features::{ActionEncoder, ActionVector, Layout, StateEncoder};
use log::debug;

use super::diagnostics::{DiagnosticKind, Diagnostics};
use super::game::{is_normal_play, Attempt, Failure, LoggedGame};
use super::labels::logged_label;
use super::legal::legal_action_vectors;
use super::matcher::{find_match, Matching};
use super::sample::Sample;
use super::storage::GameLog;
use super::task::Task;

/// Rows of a game that can hold an initial-placement decision.
const INITIAL_PLACEMENT_ROWS: usize = 24;

/// Rebuilds the decisions recorded in logged games as training samples.
pub struct Reconstructor {
    states: StateEncoder,
    actions: ActionEncoder,
    epsilon: f64,
}

enum Decision {
    Matched { sample: Sample, label: ActionVector },
    Missed,
    SingleOption,
}

struct Options {
    matching: Matching,
    skip_single_option: bool,
}

impl Options {
    fn exact() -> Self {
        Self {
            matching: Matching::Exact,
            skip_single_option: false,
        }
    }
}

/// Samples and diagnostics of one task over one game.
struct Run<'a> {
    game_id: u64,
    task: Task,
    samples: Vec<Sample>,
    labels: Vec<ActionVector>,
    diagnostics: &'a mut Diagnostics,
}

impl Run<'_> {
    fn record(&mut self, row_id: usize, kind: DiagnosticKind) {
        self.diagnostics.record(self.game_id, row_id, self.task, kind);
    }

    /// Keeps a matched sample, recording a miss unless `report_miss` is false.
    fn settle(
        &mut self,
        row_id: usize,
        action_type: ActionType,
        attempt: Attempt<Decision>,
        report_miss: bool,
    ) -> Result<()> {
        match attempt {
            Ok(Decision::Matched { sample, label }) => {
                self.samples.push(sample);
                self.labels.push(label);
            }
            Ok(Decision::Missed) if report_miss => {
                self.record(row_id, DiagnosticKind::NoMatch(action_type))
            }
            Ok(Decision::Missed) | Ok(Decision::SingleOption) => {}
            Err(Failure::Skip(kind)) => self.record(row_id, kind),
            Err(Failure::Fatal(err)) => return Err(err),
        }

        Ok(())
    }
}

impl Reconstructor {
    pub fn new(layout: Layout, epsilon: f64) -> Self {
        Self {
            states: StateEncoder::new(layout.clone()),
            actions: ActionEncoder::new(layout),
            epsilon,
        }
    }

    pub fn layout(&self) -> &Layout {
        self.states.layout()
    }

    /// Every sample of `task` in one game. Samples that cannot be rebuilt are skipped and
    /// reported through `diagnostics`; only storage and layout failures are returned.
    pub fn extract<L: GameLog + ?Sized>(
        &self,
        log: &L,
        game_id: u64,
        task: Task,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<Sample>> {
        Ok(self.extract_labelled(log, game_id, task, diagnostics)?.0)
    }

    /// Like [`Reconstructor::extract`], also returning the logged label each sample was
    /// matched against.
    fn extract_labelled<L: GameLog + ?Sized>(
        &self,
        log: &L,
        game_id: u64,
        task: Task,
        diagnostics: &mut Diagnostics,
    ) -> Result<(Vec<Sample>, Vec<ActionVector>)> {
        let game = LoggedGame::new(log, game_id);
        let mut run = Run {
            game_id,
            task,
            samples: vec![],
            labels: vec![],
            diagnostics,
        };

        match task {
            Task::RoadBuilding => self.road_building(&game, &mut run)?,
            Task::InitialPlacement => self.initial_placement(&game, &mut run)?,
            Task::NormalPlay => self.normal_play(&game, &mut run)?,
            Task::BeforeRoll => self.before_roll(&game, &mut run)?,
            Task::Discard => self.discard(&game, &mut run)?,
            Task::MoveRobber => self.move_robber(&game, &mut run)?,
        }

        debug!("Game {}: {} {} samples", game_id, run.samples.len(), task);

        Ok((run.samples, run.labels))
    }

    fn initial_placement<L: GameLog + ?Sized>(&self, game: &LoggedGame<L>, run: &mut Run<'_>) -> Result<()> {
        for i in 1..INITIAL_PLACEMENT_ROWS {
            let (Some(mut before), Some(action)) = (game.find_row(i)?, game.find_action(i + 1)?) else {
                continue;
            };
            if !matches!(before.observed.state, LoggedState::Start1A | LoggedState::Start2A)
                || action.action_type == ActionType::EndTurn
            {
                continue;
            }

            before.observed.correct_initial_vp();
            let attempt = self.decide(game, &before, &action, Options::exact(), run);
            run.settle(i, action.action_type, attempt, true)?;
        }

        Ok(())
    }

    fn road_building<L: GameLog + ?Sized>(&self, game: &LoggedGame<L>, run: &mut Run<'_>) -> Result<()> {
        for i in 1..game.table_size()? {
            let Some(action) = game.find_action(i + 1)? else {
                continue;
            };
            if action.action_type != ActionType::BuildRoad {
                continue;
            }

            let Some(mut before) = game.find_row(i)? else {
                continue;
            };
            if !matches!(before.observed.state, LoggedState::Start1B | LoggedState::Start2B) {
                let card = Some(ActionType::PlayRoadBuilding);
                if game.action_type(i)? != card && game.action_type(i.saturating_sub(1))? != card {
                    continue;
                }
                before.observed.state = LoggedState::PlacingFreeRoad1;
            }

            let attempt = self.decide(game, &before, &action, Options::exact(), run);
            run.settle(i, action.action_type, attempt, true)?;
        }

        Ok(())
    }

    fn discard<L: GameLog + ?Sized>(&self, game: &LoggedGame<L>, run: &mut Run<'_>) -> Result<()> {
        for i in 1..=game.action_table_size()? {
            let Some(action) = game.find_action(i)? else {
                continue;
            };
            if action.action_type != ActionType::Discard {
                continue;
            }

            let rows = game.row(i - 1).and_then(|before| Ok((before, game.row(i)?)));
            let (before, after) = match rows {
                Ok(rows) => rows,
                Err(failure) => {
                    run.settle(i - 1, action.action_type, Err(failure), true)?;
                    continue;
                }
            };

            for player in 0..NUM_PLAYERS {
                if before.observed.players[player].resources == after.observed.players[player].resources {
                    continue;
                }

                let mut discarding = before.clone();
                discarding.observed.current_player = player;
                discarding.observed.state = LoggedState::WaitingForDiscards;
                let attempt = self.decide(game, &discarding, &action, Options::exact(), run);
                run.settle(i - 1, action.action_type, attempt, true)?;
            }
        }

        Ok(())
    }

    fn move_robber<L: GameLog + ?Sized>(&self, game: &LoggedGame<L>, run: &mut Run<'_>) -> Result<()> {
        for i in 1..=game.action_table_size()? {
            let Some(action) = game.find_action(i)? else {
                continue;
            };
            let robber = match action.action_type {
                ActionType::MoveRobber => true,
                ActionType::ChoosePlayer => game.action_type(i - 1)? != Some(ActionType::MoveRobber),
                _ => false,
            };
            if !robber {
                continue;
            }

            let attempt = game.row(i - 1).and_then(|mut before| {
                before.observed.state = LoggedState::PlacingRobber;
                self.decide(game, &before, &action, Options::exact(), run)
            });
            run.settle(i - 1, action.action_type, attempt, true)?;
        }

        Ok(())
    }

    fn normal_play<L: GameLog + ?Sized>(&self, game: &LoggedGame<L>, run: &mut Run<'_>) -> Result<()> {
        let start = game.first_roll()?.unwrap_or(1);

        for i in start..game.table_size()? {
            let (Some(action), Some(mut before)) = (game.find_action(i + 1)?, game.find_row(i)?) else {
                continue;
            };
            if !is_normal_play(action.action_type, before.observed.dice) {
                continue;
            }

            // Free roads are also logged as BUILDROAD from these rows; they never match here.
            let paid_road = action.action_type == ActionType::BuildRoad;
            let options = Options {
                matching: if paid_road { Matching::Exact } else { Matching::Approximate },
                skip_single_option: false,
            };

            before.observed.state = LoggedState::Play1;
            let attempt = self.decide(game, &before, &action, options, run);
            run.settle(i, action.action_type, attempt, !paid_road)?;
        }

        Ok(())
    }

    fn before_roll<L: GameLog + ?Sized>(&self, game: &LoggedGame<L>, run: &mut Run<'_>) -> Result<()> {
        let mut start = 1;

        if let Some(roll) = game.first_roll()? {
            start = roll - 1;
            if let Some(action) = game.find_action(roll)? {
                let attempt = game.row(roll - 1).and_then(|mut before| {
                    before.observed.state = LoggedState::Play;
                    let options = Options {
                        matching: Matching::Exact,
                        skip_single_option: true,
                    };
                    self.decide(game, &before, &action, options, run)
                });
                run.settle(roll - 1, action.action_type, attempt, true)?;
            }
        }

        for i in start..=game.action_table_size()? {
            if game.action_type(i)? != Some(ActionType::EndTurn) {
                continue;
            }
            let Some(action) = game.find_action(i + 1)? else {
                continue;
            };
            // Other development cards played before the roll are not modelled.
            if action.action_type > ActionType::PlayKnight {
                continue;
            }

            let attempt = game.row(i).and_then(|mut before| {
                before.observed.state = LoggedState::Play;
                let options = Options {
                    matching: Matching::Approximate,
                    skip_single_option: true,
                };
                self.decide(game, &before, &action, options, run)
            });
            run.settle(i, action.action_type, attempt, true)?;
        }

        Ok(())
    }

    /// Labels the logged action, enumerates the legal alternatives from the same row and
    /// finds the label among them.
    fn decide<L: GameLog + ?Sized>(
        &self,
        game: &LoggedGame<L>,
        before: &LoggedSnapshot,
        action: &ActionRow,
        options: Options,
        run: &mut Run<'_>,
    ) -> Attempt<Decision> {
        let bridge = Bridge::for_row(&before.observed)?;
        let label = logged_label(game, before, action, &bridge, &self.states, &self.actions)?;
        if let Some(err) = label.unresolved {
            run.record(before.observed.id, DiagnosticKind::UnresolvedChance(err));
        }

        let state = self
            .states
            .encode_logged(&before.observed, &before.extended, &bridge)?;
        let simulated = bridge.translate(&before.observed, &before.extended)?;
        let legal_actions: Vec<ActionVector> =
            legal_action_vectors(bridge.board(), &simulated, &self.states, &self.actions)?
                .into_iter()
                .map(|candidate| candidate.vector)
                .collect();

        if options.skip_single_option && legal_actions.len() == 1 {
            return Ok(Decision::SingleOption);
        }

        let found = find_match(&label.vector, &legal_actions, options.matching, self.epsilon)?;
        let decision = match found {
            Some(found) => Decision::Matched {
                sample: Sample {
                    state,
                    legal_actions,
                    chosen_index: found.index(),
                },
                label: label.vector,
            },
            None => Decision::Missed,
        };

        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::EPSILON;
    use crate::storage::GameRecord;
    use catan::fixtures::RowBuilder;
    use features::{Field, LayoutVersion};

    const GAME: u64 = 42;

    fn record(rows: Vec<RowBuilder>, actions: &[ActionType]) -> GameRecord {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(id, row)| row.id(id).snapshot().unwrap())
            .collect();
        let actions = actions
            .iter()
            .enumerate()
            .map(|(i, action_type)| ActionRow {
                id: i + 1,
                action_type: *action_type,
                before: i,
                after: i + 1,
            })
            .collect();

        GameRecord::new(GAME, rows, actions)
    }

    fn reconstructor() -> Reconstructor {
        Reconstructor::new(Layout::new(LayoutVersion::NUMERIC).unwrap(), 0.00001)
    }

    fn extract(record: &GameRecord, task: Task) -> (Vec<Sample>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let samples = reconstructor()
            .extract(record, GAME, task, &mut diagnostics)
            .unwrap();
        (samples, diagnostics)
    }

    fn discard_game() -> GameRecord {
        let before = || RowBuilder::new().dice(7).settlement(0x67, 2);
        record(
            vec![
                RowBuilder::new(),
                before().hand(0, [1, 0, 0, 0, 0]).hand(2, [2, 2, 2, 2, 0]),
                before().hand(0, [1, 0, 0, 0, 0]).hand(2, [1, 1, 1, 1, 0]),
            ],
            &[ActionType::Roll, ActionType::Discard],
        )
    }

    fn initial_placement_game() -> GameRecord {
        record(
            vec![
                RowBuilder::new(),
                RowBuilder::new().state(LoggedState::Start1A),
                RowBuilder::new()
                    .state(LoggedState::Start1B)
                    .settlement(0x67, 0),
            ],
            &[ActionType::EndTurn, ActionType::BuildSettlement],
        )
    }

    fn normal_play_game() -> GameRecord {
        let turn = || RowBuilder::new().dice(6).hand(0, [1, 0, 0, 0, 0]);
        record(
            vec![
                RowBuilder::new(),
                turn(),
                turn(),
                turn().hand(0, [0, 0, 0, 1, 0]).hand(1, [1, 0, 0, 0, 0]),
            ],
            &[ActionType::Roll, ActionType::EndTurn, ActionType::Trade],
        )
    }

    fn before_roll_game() -> GameRecord {
        let turn = || {
            RowBuilder::new()
                .settlement(0x67, 0)
                .with_player(0, |p| p.old_dev_cards = [1, 0, 0, 0])
        };
        record(
            vec![turn().state(LoggedState::Play), turn().dice(8).hand(0, [0, 0, 0, 0, 1])],
            &[ActionType::Roll],
        )
    }

    fn robber_game() -> GameRecord {
        let bridge = Bridge::for_row(&RowBuilder::new().build()).unwrap();
        let land = catan::coords::LOGGED_HEX_IDS
            .iter()
            .copied()
            .find(|id| {
                bridge
                    .robber(*id)
                    .map_or(false, |h| bridge.board().tile(h).resource().is_some())
            })
            .unwrap();

        let row = || RowBuilder::new().dice(7).hand(1, [1, 1, 0, 0, 0]);
        record(vec![row(), row().robber(land)], &[ActionType::MoveRobber])
    }

    fn road_building_game() -> GameRecord {
        let bridge = Bridge::for_row(&RowBuilder::new().build()).unwrap();
        let board = bridge.board();
        let (home, first) = (bridge.vertex(0x67).unwrap(), bridge.edge(0x66).unwrap());
        let far = board.edge_vertices(first).into_iter().find(|v| *v != home).unwrap();
        let second = board.vertex_edges(far).iter().copied().find(|e| *e != first).unwrap();
        let second = bridge.logged_edge(second);

        let row = || RowBuilder::new().dice(6).settlement(0x67, 0);
        record(
            vec![
                RowBuilder::new(),
                row(),
                row(),
                row().road(0x66, 0),
                row().road(0x66, 0).road(second, 0),
            ],
            &[
                ActionType::Roll,
                ActionType::PlayRoadBuilding,
                ActionType::BuildRoad,
                ActionType::BuildRoad,
            ],
        )
    }

    #[test]
    fn test_chosen_action_is_the_logged_label() {
        let games = [
            discard_game(),
            initial_placement_game(),
            normal_play_game(),
            before_roll_game(),
            robber_game(),
            road_building_game(),
        ];

        let mut emitted = 0;
        for record in &games {
            for task in Task::ALL {
                let mut diagnostics = Diagnostics::new();
                let (samples, labels) = reconstructor()
                    .extract_labelled(record, GAME, task, &mut diagnostics)
                    .unwrap();
                assert_eq!(samples.len(), labels.len());

                for (sample, label) in samples.iter().zip(&labels) {
                    assert!(sample.chosen_index < sample.legal_actions.len());
                    let distance = label.max_distance(sample.chosen()).unwrap();
                    assert!(distance <= EPSILON, "{} sample off its label by {}", task, distance);
                }
                emitted += samples.len();
            }
        }

        // Every fixture game yields at least one sample for its own task.
        assert!(emitted >= games.len());
    }

    #[test]
    fn test_discard_samples_each_changed_hand() {
        let (samples, diagnostics) = extract(&discard_game(), Task::Discard);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        assert_eq!(samples.len(), 1);

        let layout = reconstructor().layout().clone();
        let hand = layout.action_offset_of(Field::ResourceInHand).unwrap();
        let chosen = samples[0].chosen().values();
        assert_eq!(&chosen[hand..hand + 5], &[-1.0, -1.0, -1.0, -1.0, 0.0]);
        assert_eq!(chosen[layout.action_offset_of(Field::Over7Cards).unwrap()], -1.0);
        assert!(samples[0].num_legal_actions() > 1);
    }

    #[test]
    fn test_initial_placement() {
        let (samples, diagnostics) = extract(&initial_placement_game(), Task::InitialPlacement);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        assert_eq!(samples.len(), 1);

        let layout = reconstructor().layout().clone();
        let chosen = samples[0].chosen().values();
        assert_eq!(chosen[layout.action_offset_of(Field::Settlements).unwrap()], 1.0);
        assert_eq!(chosen[layout.action_offset_of(Field::Score).unwrap()], 1.0);
    }

    #[test]
    fn test_normal_play_end_turn_and_unmodelled_trade() {
        let (samples, diagnostics) = extract(&normal_play_game(), Task::NormalPlay);
        assert_eq!(samples.len(), 1);
        let end_turn = ActionEncoder::new(reconstructor().layout().clone()).end_turn();
        assert_eq!(samples[0].chosen(), &end_turn);
        assert_eq!(
            diagnostics.count(|k| *k == DiagnosticKind::NoMatch(ActionType::Trade)),
            1
        );
    }

    #[test]
    fn test_normal_play_road_misses_are_quiet() {
        let turn = || RowBuilder::new().dice(6).settlement(0x67, 0);
        let record = record(
            vec![RowBuilder::new(), turn(), turn(), turn().road(0x66, 0)],
            &[ActionType::Roll, ActionType::EndTurn, ActionType::BuildRoad],
        );

        let (samples, diagnostics) = extract(&record, Task::NormalPlay);
        assert_eq!(samples.len(), 1);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_before_roll_expected_gain() {
        let (samples, diagnostics) = extract(&before_roll_game(), Task::BeforeRoll);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        assert_eq!(samples.len(), 1);

        let layout = reconstructor().layout().clone();
        let chosen = samples[0].chosen().values();
        assert_eq!(chosen[layout.action_offset_of(Field::DiceResult).unwrap()], 0.0);
        let hand = layout.action_offset_of(Field::ResourceInHand).unwrap();
        assert!(chosen[hand..hand + 5].iter().any(|v| *v > 0.0 && *v < 1.0));
    }

    #[test]
    fn test_before_roll_single_option_skipped() {
        let record = record(
            vec![
                RowBuilder::new().state(LoggedState::Play),
                RowBuilder::new().dice(8),
            ],
            &[ActionType::Roll],
        );

        let (samples, diagnostics) = extract(&record, Task::BeforeRoll);
        assert!(samples.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_move_robber_without_victim() {
        let (samples, diagnostics) = extract(&robber_game(), Task::MoveRobber);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        assert_eq!(samples.len(), 1);

        let layout = reconstructor().layout().clone();
        let hand = layout.action_offset_of(Field::ResourceInHand).unwrap();
        assert!(samples[0].chosen().values()[hand..hand + 5].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_robber_translation_failure_is_skipped() {
        let record = record(
            vec![RowBuilder::new().robber(0x17), RowBuilder::new()],
            &[ActionType::MoveRobber],
        );

        let (samples, diagnostics) = extract(&record, Task::MoveRobber);
        assert!(samples.is_empty());
        assert_eq!(
            diagnostics.count(|k| matches!(k, DiagnosticKind::Translation(_))),
            1
        );
    }

    #[test]
    fn test_free_road_building() {
        let (samples, _) = extract(&road_building_game(), Task::RoadBuilding);
        assert_eq!(samples.len(), 2);

        let layout = reconstructor().layout().clone();
        let roads = layout.action_offset_of(Field::Roads).unwrap();
        assert!(samples.iter().all(|s| s.chosen().values()[roads] == 1.0));
    }
}
