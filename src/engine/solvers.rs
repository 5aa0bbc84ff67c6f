//! Tile-to-cell assignment over a distance matrix
//!
//! Rows are grid cells and columns are tiles. Every solver returns one tile
//! index per cell and never uses a tile more than `max_repeats` times.

use crate::io::configuration::AUCTION_EPSILON;
use crate::io::error::EngineError;
use crate::protocol::Solver;
use bitvec::prelude::{BitVec, bitvec};
use ndarray::Array2;
use std::collections::VecDeque;

/// Assign a tile to every cell with the chosen solver
///
/// # Errors
///
/// Returns an error if the pool cannot cover every cell within the repeat limit
pub fn solve(
    solver: Solver,
    distances: &Array2<i64>,
    max_repeats: usize,
) -> Result<Vec<usize>, EngineError> {
    let (cells, tiles) = distances.dim();
    let max_repeats = max_repeats.max(1);
    if tiles.saturating_mul(max_repeats) < cells {
        return Err(EngineError::Assignment {
            reason: format!(
                "{tiles} tiles with at most {max_repeats} uses each cannot fill {cells} cells"
            ),
        });
    }
    if cells == 0 {
        return Ok(Vec::new());
    }

    match solver {
        Solver::Greedy => greedy(distances, max_repeats),
        Solver::Optimal => optimal(distances, max_repeats),
        Solver::Auction => auction(distances, max_repeats, AUCTION_EPSILON),
    }
}

/// Closest pairs first until every cell is filled
///
/// # Errors
///
/// Returns an error if a cell is left without a tile
pub fn greedy(distances: &Array2<i64>, max_repeats: usize) -> Result<Vec<usize>, EngineError> {
    let (cells, tiles) = distances.dim();
    let mut pairs: Vec<(i64, usize, usize)> = distances
        .indexed_iter()
        .map(|((cell, tile), &distance)| (distance, cell, tile))
        .collect();
    pairs.sort_unstable();

    let mut filled: BitVec = bitvec![0; cells];
    let mut exhausted: BitVec = bitvec![0; tiles];
    let mut uses = vec![0_usize; tiles];
    let mut assignments = vec![usize::MAX; cells];
    let mut remaining = cells;

    for (_, cell, tile) in pairs {
        if remaining == 0 {
            break;
        }
        if filled.get(cell).is_some_and(|bit| *bit) || exhausted.get(tile).is_some_and(|bit| *bit)
        {
            continue;
        }

        if let Some(slot) = assignments.get_mut(cell) {
            *slot = tile;
        }
        filled.set(cell, true);
        remaining -= 1;

        if let Some(count) = uses.get_mut(tile) {
            *count += 1;
            if *count >= max_repeats {
                exhausted.set(tile, true);
            }
        }
    }

    finish(assignments)
}

/// Minimum total distance assignment
///
/// Each tile is expanded into `max_repeats` identical slots and the
/// rectangular assignment problem is solved with shortest augmenting paths.
///
/// # Errors
///
/// Returns an error if no complete assignment exists
// Indices are bounded by the padded matrix dimensions allocated below
#[allow(clippy::indexing_slicing)]
pub fn optimal(distances: &Array2<i64>, max_repeats: usize) -> Result<Vec<usize>, EngineError> {
    let (rows, tiles) = distances.dim();
    let columns = tiles * max_repeats;
    let cost = |row: usize, column: usize| distances[[row - 1, (column - 1) % tiles]];

    // 1-based potentials; column 0 is the virtual source
    let mut row_potential = vec![0_i64; rows + 1];
    let mut column_potential = vec![0_i64; columns + 1];
    let mut owner = vec![0_usize; columns + 1];
    let mut way = vec![0_usize; columns + 1];

    for row in 1..=rows {
        owner[0] = row;
        let mut current = 0_usize;
        let mut min_slack = vec![i64::MAX; columns + 1];
        let mut used = vec![false; columns + 1];

        loop {
            used[current] = true;
            let active_row = owner[current];
            let mut delta = i64::MAX;
            let mut next = 0_usize;

            for column in 1..=columns {
                if used[column] {
                    continue;
                }
                let slack =
                    cost(active_row, column) - row_potential[active_row] - column_potential[column];
                if slack < min_slack[column] {
                    min_slack[column] = slack;
                    way[column] = current;
                }
                if min_slack[column] < delta {
                    delta = min_slack[column];
                    next = column;
                }
            }

            if next == 0 {
                return Err(EngineError::Assignment {
                    reason: "no augmenting path left".to_string(),
                });
            }

            for column in 0..=columns {
                if used[column] {
                    row_potential[owner[column]] += delta;
                    column_potential[column] -= delta;
                } else {
                    min_slack[column] -= delta;
                }
            }

            current = next;
            if owner[current] == 0 {
                break;
            }
        }

        // Flip the alternating path back to the source
        loop {
            let previous = way[current];
            owner[current] = owner[previous];
            current = previous;
            if current == 0 {
                break;
            }
        }
    }

    let mut assignments = vec![usize::MAX; rows];
    for column in 1..=columns {
        let row = owner[column];
        if row != 0 {
            assignments[row - 1] = (column - 1) % tiles;
        }
    }

    finish(assignments)
}

/// Forward auction over tile slots with a fixed bid increment
///
/// # Errors
///
/// Returns an error if bidding ends with an unassigned cell
// Indices are bounded by the slot and cell counts allocated below
#[allow(clippy::indexing_slicing)]
pub fn auction(
    distances: &Array2<i64>,
    max_repeats: usize,
    epsilon: i64,
) -> Result<Vec<usize>, EngineError> {
    let (cells, tiles) = distances.dim();
    let slots = tiles * max_repeats;
    let epsilon = epsilon.max(1);

    let mut prices = vec![0_i64; slots];
    let mut slot_owner: Vec<Option<usize>> = vec![None; slots];
    let mut cell_slot: Vec<Option<usize>> = vec![None; cells];
    let mut unassigned: VecDeque<usize> = (0..cells).collect();

    while let Some(cell) = unassigned.pop_front() {
        let mut best: Option<(usize, i64)> = None;
        let mut second_value = i64::MIN;

        for slot in 0..slots {
            let value = -distances[[cell, slot % tiles]] - prices[slot];
            match best {
                Some((_, best_value)) if value <= best_value => {
                    second_value = second_value.max(value);
                }
                Some((_, best_value)) => {
                    second_value = best_value;
                    best = Some((slot, value));
                }
                None => best = Some((slot, value)),
            }
        }

        let Some((slot, best_value)) = best else {
            return Err(EngineError::Assignment {
                reason: "auction has no slots to bid on".to_string(),
            });
        };

        let increment = if second_value == i64::MIN {
            epsilon
        } else {
            best_value - second_value + epsilon
        };
        prices[slot] += increment;

        if let Some(previous) = slot_owner[slot].replace(cell) {
            cell_slot[previous] = None;
            unassigned.push_back(previous);
        }
        cell_slot[cell] = Some(slot);
    }

    finish(
        cell_slot
            .into_iter()
            .map(|slot| slot.map_or(usize::MAX, |slot| slot % tiles))
            .collect(),
    )
}

fn finish(assignments: Vec<usize>) -> Result<Vec<usize>, EngineError> {
    if let Some(cell) = assignments.iter().position(|&tile| tile == usize::MAX) {
        return Err(EngineError::Assignment {
            reason: format!("cell {cell} was left without a tile"),
        });
    }
    Ok(assignments)
}
