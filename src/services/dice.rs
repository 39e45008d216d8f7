//! Dice roller for `NdM`, `NdM+K` and `NdM-K` expressions.
//!
//! The first expression found anywhere in the input is rolled, so
//! `"attack 1d20+5"` works. Input with no expression yields `None`.

#[cfg(test)]
#[path = "dice_test.rs"]
mod dice_test;

use rand::Rng;

/// Upper bound on dice per roll.
const MAX_DICE: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceExpr {
    pub count: u32,
    pub sides: u32,
    pub modifier: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roll {
    pub expr: DiceExpr,
    /// Individual die results, in roll order.
    pub rolls: Vec<u32>,
    pub total: i64,
}

/// Find the first dice expression in `input`.
#[must_use]
pub fn parse(input: &str) -> Option<DiceExpr> {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() && (i == 0 || !bytes[i - 1].is_ascii_digit()) {
            if let Some(expr) = parse_at(bytes, i) {
                return Some(expr);
            }
        }
        i += 1;
    }
    None
}

fn parse_at(bytes: &[u8], start: usize) -> Option<DiceExpr> {
    let (count, pos) = digits(bytes, start)?;
    if bytes.get(pos) != Some(&b'd') {
        return None;
    }
    let (sides, pos) = digits(bytes, pos + 1)?;

    let modifier = match bytes.get(pos) {
        Some(&sign @ (b'+' | b'-')) => match digits(bytes, pos + 1) {
            Some((k, _)) if sign == b'-' => -i64::from(k),
            Some((k, _)) => i64::from(k),
            None => 0,
        },
        _ => 0,
    };

    if sides == 0 || count > MAX_DICE {
        return None;
    }
    Some(DiceExpr { count, sides, modifier })
}

/// Parse a run of ASCII digits at `start`. Returns the value and the index after it.
fn digits(bytes: &[u8], start: usize) -> Option<(u32, usize)> {
    let end = bytes[start.min(bytes.len())..]
        .iter()
        .position(|b| !b.is_ascii_digit())
        .map_or(bytes.len(), |n| start + n);
    if end <= start {
        return None;
    }
    let text = std::str::from_utf8(&bytes[start..end]).ok()?;
    Some((text.parse().ok()?, end))
}

/// Roll the first expression in `input` with the thread-local generator.
#[must_use]
pub fn roll(input: &str) -> Option<Roll> {
    roll_with(&mut rand::rng(), input)
}

/// Roll with a caller-supplied generator.
pub fn roll_with<R: Rng + ?Sized>(rng: &mut R, input: &str) -> Option<Roll> {
    let expr = parse(input)?;
    let rolls: Vec<u32> = (0..expr.count).map(|_| rng.random_range(1..=expr.sides)).collect();
    let total = rolls.iter().map(|r| i64::from(*r)).sum::<i64>() + expr.modifier;
    Some(Roll { expr, rolls, total })
}
