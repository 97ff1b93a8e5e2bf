//! JavaScript bindings, enabled by the `wasm` feature.

use std::fmt::Display;

use wasm_bindgen::prelude::*;

use crate::encoder::{BridgeRule, EncoderConfig};
use crate::grid::Grid;
use crate::solver::{Outcome, VarisatBackend};

fn to_js_error(err: impl Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

/// Solve a puzzle in the text format, returning the solved grid's display.
/// Throws an `Error` if the puzzle is malformed or has no solution.
#[wasm_bindgen(js_name = solvePuzzle)]
pub fn solve_puzzle(text: &str, straight_bridges: bool) -> Result<String, JsValue> {
    let grid = Grid::parse(text).map_err(to_js_error)?;
    let config = EncoderConfig {
        bridge_rule: if straight_bridges { BridgeRule::Straight } else { BridgeRule::Loose },
    };

    match grid.solve_with(config, &mut VarisatBackend).map_err(to_js_error)? {
        Outcome::Solved(solved) => Ok(solved.to_string()),
        Outcome::Unsatisfiable => Err(to_js_error("no solution")),
    }
}
