use std::collections::HashMap;

use super::coords::{hex_id_to_axial, GRID_SIZE, LOGGED_HEX_IDS, NUM_HEXES};
use super::error::TranslationError;
use super::resource::{PortKind, Resource};

pub const NUM_VERTICES: usize = 54;
pub const NUM_EDGES: usize = 72;

/// Axial neighbour directions. Side `k` of a hex borders the hex in direction `k`.
const DIRECTIONS: [(i32, i32); 6] = [(0, 1), (1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1)];

const CENTRE: (i32, i32) = (3, 3);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    Desert,
    Land(Resource),
    Sea,
    Port(PortKind),
}

impl Tile {
    /// Decodes the hex type codes of the logged hex layout.
    pub fn from_code(code: i32) -> Result<Self, TranslationError> {
        let tile = match code {
            0 => Tile::Desert,
            1..=5 => Tile::Land(Resource::ALL[(code - 1) as usize]),
            6 => Tile::Sea,
            7 => Tile::Port(PortKind::Misc),
            8..=12 => Tile::Port(PortKind::Specific(Resource::ALL[(code - 8) as usize])),
            _ => return Err(TranslationError::UnknownHexType(code)),
        };

        Ok(tile)
    }

    pub fn resource(&self) -> Option<Resource> {
        match self {
            Tile::Land(resource) => Some(*resource),
            _ => None,
        }
    }

    pub fn is_land(&self) -> bool {
        matches!(self, Tile::Land(_) | Tile::Desert)
    }
}

/// Board topology plus the tiles and numbers of one game.
///
/// Hexes are indexed in grid order (`x` major, then `y`), vertices and edges in the order
/// they are first reached when walking the corners and sides of the inner 19 hexes.
#[derive(Clone, Debug)]
pub struct Board {
    tiles: Vec<Tile>,
    numbers: Vec<i32>,
    hex_coords: Vec<(usize, usize)>,
    hex_at: [[Option<usize>; GRID_SIZE]; GRID_SIZE],
    hex_vertices: Vec<[Option<usize>; 6]>,
    hex_edges: Vec<[Option<usize>; 6]>,
    vertex_hexes: Vec<Vec<usize>>,
    vertex_vertices: Vec<Vec<usize>>,
    vertex_edges: Vec<Vec<usize>>,
    edge_vertices: Vec<[usize; 2]>,
    vertex_ports: Vec<Option<PortKind>>,
}

impl Board {
    /// Builds a board from the hex type and number layouts stored in the logs (logged hex order).
    pub fn from_logged_layout(
        hex_layout: &[i32],
        number_layout: &[i32],
    ) -> Result<Self, TranslationError> {
        for layout in [hex_layout, number_layout] {
            if layout.len() != NUM_HEXES {
                return Err(TranslationError::LayoutLength {
                    expected: NUM_HEXES,
                    found: layout.len(),
                });
            }
        }

        let mut board = Self::topology();
        for (i, hex_id) in LOGGED_HEX_IDS.iter().enumerate() {
            let hex = board
                .hex_index_of_logged(*hex_id)
                .ok_or(TranslationError::UnknownHex(*hex_id))?;
            board.tiles[hex] = Tile::from_code(hex_layout[i])?;
            board.numbers[hex] = number_layout[i];
        }

        board.assign_ports();

        Ok(board)
    }

    /// All-sea board with the standard topology.
    fn topology() -> Self {
        let mut hex_coords = Vec::with_capacity(NUM_HEXES);
        let mut hex_at = [[None; GRID_SIZE]; GRID_SIZE];
        for x in 0..GRID_SIZE {
            for y in 0..GRID_SIZE {
                if (3..=9).contains(&(x + y)) {
                    hex_at[x][y] = Some(hex_coords.len());
                    hex_coords.push((x, y));
                }
            }
        }

        let mut vertex_keys: HashMap<[(i32, i32); 3], usize> = HashMap::new();
        let mut edge_keys: HashMap<[(i32, i32); 2], usize> = HashMap::new();
        for &(x, y) in hex_coords.iter().filter(|c| is_inner(**c)) {
            let at = (x as i32, y as i32);
            for k in 0..6 {
                let next = vertex_keys.len();
                vertex_keys.entry(corner_key(at, k)).or_insert(next);
                let next = edge_keys.len();
                edge_keys.entry(side_key(at, k)).or_insert(next);
            }
        }

        let hex_vertices: Vec<[Option<usize>; 6]> = hex_coords
            .iter()
            .map(|&(x, y)| {
                let at = (x as i32, y as i32);
                std::array::from_fn(|k| vertex_keys.get(&corner_key(at, k)).copied())
            })
            .collect();

        let hex_edges: Vec<[Option<usize>; 6]> = hex_coords
            .iter()
            .map(|&(x, y)| {
                let at = (x as i32, y as i32);
                std::array::from_fn(|k| edge_keys.get(&side_key(at, k)).copied())
            })
            .collect();

        let num_vertices = vertex_keys.len();
        let num_edges = edge_keys.len();

        let mut vertex_hexes = vec![vec![]; num_vertices];
        for (hex, corners) in hex_vertices.iter().enumerate() {
            for v in corners.iter().flatten() {
                vertex_hexes[*v].push(hex);
            }
        }

        let mut edge_vertices = vec![[0, 0]; num_edges];
        for (hex, sides) in hex_edges.iter().enumerate() {
            for (k, e) in sides.iter().enumerate() {
                if let (Some(e), Some(a), Some(b)) =
                    (e, hex_vertices[hex][k], hex_vertices[hex][(k + 1) % 6])
                {
                    edge_vertices[*e] = if a < b { [a, b] } else { [b, a] };
                }
            }
        }

        let mut vertex_vertices = vec![vec![]; num_vertices];
        let mut vertex_edges = vec![vec![]; num_vertices];
        for (e, [a, b]) in edge_vertices.iter().enumerate() {
            vertex_vertices[*a].push(*b);
            vertex_vertices[*b].push(*a);
            vertex_edges[*a].push(e);
            vertex_edges[*b].push(e);
        }

        Self {
            tiles: vec![Tile::Sea; hex_coords.len()],
            numbers: vec![0; hex_coords.len()],
            hex_coords,
            hex_at,
            hex_vertices,
            hex_edges,
            vertex_hexes,
            vertex_vertices,
            vertex_edges,
            edge_vertices,
            vertex_ports: vec![None; num_vertices],
        }
    }

    /// A port hex serves the two vertices of the side facing its first inner neighbour.
    fn assign_ports(&mut self) {
        for hex in 0..self.num_hexes() {
            let Tile::Port(kind) = self.tiles[hex] else {
                continue;
            };

            let (x, y) = self.hex_coords[hex];
            let facing = (0..6).find(|k| {
                let (dx, dy) = DIRECTIONS[*k];
                is_inner_i32((x as i32 + dx, y as i32 + dy))
            });

            if let Some(k) = facing {
                for corner in [k, (k + 1) % 6] {
                    if let Some(v) = self.hex_vertices[hex][corner] {
                        self.vertex_ports[v] = Some(kind);
                    }
                }
            }
        }
    }

    pub fn num_hexes(&self) -> usize {
        self.hex_coords.len()
    }

    pub fn num_vertices(&self) -> usize {
        self.vertex_hexes.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edge_vertices.len()
    }

    pub fn tile(&self, hex: usize) -> Tile {
        self.tiles[hex]
    }

    pub fn number(&self, hex: usize) -> i32 {
        self.numbers[hex]
    }

    pub fn hex_coord(&self, hex: usize) -> (usize, usize) {
        self.hex_coords[hex]
    }

    pub fn hex_index_at(&self, x: usize, y: usize) -> Option<usize> {
        self.hex_at.get(x).and_then(|col| col.get(y)).copied().flatten()
    }

    pub fn hex_index_of_logged(&self, hex_id: i32) -> Option<usize> {
        hex_id_to_axial(hex_id).and_then(|(x, y)| self.hex_index_at(x, y))
    }

    /// Vertex at corner `k` of a hex, if the corner touches land.
    pub fn hex_corner(&self, hex: usize, k: usize) -> Option<usize> {
        self.hex_vertices[hex][k]
    }

    /// Edge along side `k` of a hex, if the side touches land.
    pub fn hex_side(&self, hex: usize, k: usize) -> Option<usize> {
        self.hex_edges[hex][k]
    }

    pub fn hex_vertices(&self, hex: usize) -> impl Iterator<Item = usize> + '_ {
        self.hex_vertices[hex].iter().flatten().copied()
    }

    pub fn vertex_hexes(&self, vertex: usize) -> &[usize] {
        &self.vertex_hexes[vertex]
    }

    pub fn vertex_neighbors(&self, vertex: usize) -> &[usize] {
        &self.vertex_vertices[vertex]
    }

    pub fn vertex_edges(&self, vertex: usize) -> &[usize] {
        &self.vertex_edges[vertex]
    }

    pub fn edge_vertices(&self, edge: usize) -> [usize; 2] {
        self.edge_vertices[edge]
    }

    pub fn port(&self, vertex: usize) -> Option<PortKind> {
        self.vertex_ports[vertex]
    }

    pub fn is_land(&self, hex: usize) -> bool {
        self.tiles[hex].is_land()
    }

    pub fn land_hexes(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.num_hexes()).filter(|h| self.is_land(*h))
    }

    /// Resource hexes around a vertex with their dice numbers. Desert and sea are skipped.
    pub fn producing_hexes(&self, vertex: usize) -> impl Iterator<Item = (usize, Resource, i32)> + '_ {
        self.vertex_hexes[vertex]
            .iter()
            .filter_map(|h| self.tiles[*h].resource().map(|r| (*h, r, self.numbers[*h])))
    }
}

fn is_inner((x, y): (usize, usize)) -> bool {
    is_inner_i32((x as i32, y as i32))
}

fn is_inner_i32((x, y): (i32, i32)) -> bool {
    let dx = x - CENTRE.0;
    let dy = y - CENTRE.1;
    (dx.abs() + dy.abs() + (dx + dy).abs()) / 2 <= 2
}

fn neighbor((x, y): (i32, i32), k: usize) -> (i32, i32) {
    let (dx, dy) = DIRECTIONS[k % 6];
    (x + dx, y + dy)
}

fn corner_key(at: (i32, i32), k: usize) -> [(i32, i32); 3] {
    let mut key = [at, neighbor(at, k + 5), neighbor(at, k)];
    key.sort();
    key
}

fn side_key(at: (i32, i32), k: usize) -> [(i32, i32); 2] {
    let mut key = [at, neighbor(at, k)];
    key.sort();
    key
}
