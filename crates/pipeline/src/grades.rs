//! Letter-grade scale.
//!
//! Five letters times three modifiers give fifteen evenly spaced steps from
//! `F-` (0) to `A+` (1). A signed grade is accepted with its sign on either
//! side of the letter, for every letter alike.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Letters from worst to best
pub const GRADE_LETTERS: [char; 5] = ['F', 'D', 'C', 'B', 'A'];

/// Modifiers from worst to best (`None` is the plain letter)
const MODIFIERS: [Option<char>; 3] = [Some('-'), None, Some('+')];

const STEPS: usize = GRADE_LETTERS.len() * MODIFIERS.len() - 1;

static GRADE_TABLE: Lazy<HashMap<String, f32>> = Lazy::new(build_grade_table);

fn build_grade_table() -> HashMap<String, f32> {
    let mut table = HashMap::new();

    for (letter_idx, letter) in GRADE_LETTERS.iter().enumerate() {
        for (modifier_idx, modifier) in MODIFIERS.iter().enumerate() {
            let step = letter_idx * MODIFIERS.len() + modifier_idx;
            let score = step as f32 / STEPS as f32;

            match modifier {
                None => {
                    table.insert(letter.to_string(), score);
                }
                Some(sign) => {
                    table.insert(format!("{letter}{sign}"), score);
                    table.insert(format!("{sign}{letter}"), score);
                }
            }
        }
    }
    table
}

/// Score of an already cleaned (upper-case, whitespace-free) grade
pub fn grade_score(cleaned: &str) -> Option<f32> {
    GRADE_TABLE.get(cleaned).copied()
}

/// Distance between two adjacent grades (e.g. `B` and `B+`)
pub fn grade_step() -> f32 {
    1.0 / STEPS as f32
}
