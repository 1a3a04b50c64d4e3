pub trait GameEngine {
    type Action;
    type State;

    fn take_action(&self, game_state: &Self::State, action: &Self::Action) -> Self::State;
    fn player_to_move(&self, game_state: &Self::State) -> usize;
}

/// Exhaustive enumeration of the actions available from a state.
pub trait ValidActions {
    type Action;
    type State;

    fn valid_actions(&self, game_state: &Self::State) -> Vec<Self::Action>;
}
