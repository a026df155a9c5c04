//! The block finder (§4.4): flood-fills a color block from an entry codel
//! and picks the exit codel for a given DP/CC.

use crate::piet::color::Color;
use crate::piet::dp::{CodelChoice, Direction};
use crate::piet::grid::Grid;
use std::collections::VecDeque;

/// A color block: every codel in the maximal 4-connected region of one
/// color, reachable from some entry codel.
pub struct ColorBlock {
    pub color: Color,
    members: Vec<(usize, usize)>,
}

impl ColorBlock {
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// Picks the exit codel for `(dp, cc)` per the DP×CC ordering table in
    /// §4.4, and returns the coordinate one step past it in the `dp`
    /// direction — the "target" codel the navigator will try to enter.
    pub fn exit_target(&self, dp: Direction, cc: CodelChoice) -> (i64, i64) {
        let extreme = match (dp, cc) {
            (Direction::Right, CodelChoice::Left) => {
                *self.members.iter().max_by_key(|&&(x, y)| (x, std::cmp::Reverse(y))).unwrap()
            }
            (Direction::Right, CodelChoice::Right) => {
                *self.members.iter().max_by_key(|&&(x, y)| (x, y)).unwrap()
            }
            (Direction::Down, CodelChoice::Left) => {
                *self.members.iter().max_by_key(|&&(x, y)| (y, x)).unwrap()
            }
            (Direction::Down, CodelChoice::Right) => {
                *self.members.iter().max_by_key(|&&(x, y)| (y, std::cmp::Reverse(x))).unwrap()
            }
            (Direction::Left, CodelChoice::Left) => {
                *self.members.iter().min_by_key(|&&(x, y)| (x, std::cmp::Reverse(y))).unwrap()
            }
            (Direction::Left, CodelChoice::Right) => {
                *self.members.iter().min_by_key(|&&(x, y)| (x, y)).unwrap()
            }
            (Direction::Up, CodelChoice::Left) => {
                *self.members.iter().min_by_key(|&&(x, y)| (y, x)).unwrap()
            }
            (Direction::Up, CodelChoice::Right) => {
                *self.members.iter().min_by_key(|&&(x, y)| (y, std::cmp::Reverse(x))).unwrap()
            }
        };
        let (dx, dy) = dp.delta();
        (extreme.0 as i64 + dx, extreme.1 as i64 + dy)
    }
}

/// Flood-fills the maximal 4-connected block of `grid.at(x, y)`'s color,
/// starting at `(x, y)`.
///
/// Uses an explicit worklist and a visited bitset sized to the grid rather
/// than recursion or grid mutation (§4.4, §9): large blocks never risk a
/// stack overflow, and the grid is untouched so no `Marker` sentinel is ever
/// written — the "no cell holds `Marker`" invariant (§3 invariant 1) holds
/// by construction.
pub fn find_block(grid: &Grid, x: usize, y: usize) -> ColorBlock {
    let color = grid.at(x as i64, y as i64);
    let width = grid.width();
    let mut visited = vec![false; width * grid.height()];
    let mut members = Vec::new();
    let mut queue = VecDeque::new();

    visited[y * width + x] = true;
    queue.push_back((x, y));

    while let Some((cx, cy)) = queue.pop_front() {
        members.push((cx, cy));
        for (dx, dy) in [(1i64, 0i64), (-1, 0), (0, 1), (0, -1)] {
            let nx = cx as i64 + dx;
            let ny = cy as i64 + dy;
            if nx < 0 || ny < 0 {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            if nx >= width || ny >= grid.height() {
                continue;
            }
            if grid.at(nx as i64, ny as i64) != color {
                continue;
            }
            let idx = ny * width + nx;
            if visited[idx] {
                continue;
            }
            visited[idx] = true;
            queue.push_back((nx, ny));
        }
    }

    ColorBlock { color, members }
}
