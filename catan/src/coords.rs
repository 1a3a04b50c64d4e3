//! Byte-packed coordinates used by the game logs.
//!
//! A hex id is `0xXY`. Vertices and edges live in their own coordinate spaces and are
//! addressed relative to the hexes they touch.

pub const NUM_HEXES: usize = 37;

/// The hex ids in the order the logs store the hex and number layouts.
pub const LOGGED_HEX_IDS: [i32; NUM_HEXES] = [
    0x17, 0x39, 0x5B, 0x7D, //
    0x15, 0x37, 0x59, 0x7B, 0x9D, //
    0x13, 0x35, 0x57, 0x79, 0x9B, 0xBD, //
    0x11, 0x33, 0x55, 0x77, 0x99, 0xBB, 0xDD, //
    0x31, 0x53, 0x75, 0x97, 0xB9, 0xDB, //
    0x51, 0x73, 0x95, 0xB7, 0xD9, //
    0x71, 0x93, 0xB5, 0xD7,
];

/// Offset from a hex id to its six corner vertices. Corner `k` sits between edges `k - 1` and `k`.
pub const VERTEX_OFFSETS: [i32; 6] = [0x01, 0x12, 0x21, 0x10, -0x01, -0x10];

/// Offset from a hex id to its six sides. Edge `k` joins corner `k` and corner `k + 1`.
pub const EDGE_OFFSETS: [i32; 6] = [0x01, 0x11, 0x10, -0x01, -0x11, -0x10];

pub const GRID_SIZE: usize = 7;

/// Translates a logged hex id into axial grid coordinates `(x, y)` with `x + y` in `[3, 9]`.
pub fn hex_id_to_axial(hex_id: i32) -> Option<(usize, usize)> {
    if !(0..=0xFF).contains(&hex_id) {
        return None;
    }

    let xo = hex_id >> 4;
    let yo = hex_id & 0x0F;
    if xo % 2 == 0 || yo % 2 == 0 {
        return None;
    }

    let x = (xo - 1) / 2;
    let y = (yo + 5) / 2 - x;
    let in_grid = (0..GRID_SIZE as i32).contains(&x)
        && (0..GRID_SIZE as i32).contains(&y)
        && (3..=9).contains(&(x + y));

    in_grid.then_some((x as usize, y as usize))
}

/// Position of a hex id within `LOGGED_HEX_IDS`.
pub fn logged_hex_index(hex_id: i32) -> Option<usize> {
    LOGGED_HEX_IDS.iter().position(|h| *h == hex_id)
}
