use super::board::Board;
use super::state::SimState;

/// Length of the longest simple path through `player`'s roads. Opponent buildings cut a road.
pub fn longest_road(board: &Board, state: &SimState, player: usize) -> i32 {
    let mut visited = vec![false; board.num_edges()];
    let mut best = 0;

    for edge in (0..board.num_edges()).filter(|e| state.edges[*e] == Some(player)) {
        let [a, b] = board.edge_vertices(edge);
        visited[edge] = true;
        for end in [a, b] {
            best = best.max(1 + extend(board, state, player, end, &mut visited));
        }
        visited[edge] = false;
    }

    best
}

fn extend(
    board: &Board,
    state: &SimState,
    player: usize,
    vertex: usize,
    visited: &mut [bool],
) -> i32 {
    if matches!(state.vertices[vertex].owner(), Some(owner) if owner != player) {
        return 0;
    }

    let mut best = 0;
    for &edge in board.vertex_edges(vertex) {
        if visited[edge] || state.edges[edge] != Some(player) {
            continue;
        }

        let [a, b] = board.edge_vertices(edge);
        let next = if a == vertex { b } else { a };
        visited[edge] = true;
        best = best.max(1 + extend(board, state, player, next, visited));
        visited[edge] = false;
    }

    best
}
