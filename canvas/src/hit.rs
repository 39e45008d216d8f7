#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::Point;
use crate::scene::{Scene, Token, TokenId};

/// Test which token (if any) is under `world_pt`.
///
/// Tokens are scanned from the top of the draw order down, so when two tokens
/// overlap the one drawn last wins.
#[must_use]
pub fn token_at(scene: &Scene, world_pt: Point) -> Option<TokenId> {
    scene
        .tokens
        .iter()
        .rev()
        .find(|t| contains(t, scene.grid_size, world_pt))
        .map(|t| t.id)
}

/// Whether `world_pt` lies inside the token's bounding square (edges inclusive).
#[must_use]
pub fn contains(token: &Token, grid_size: u32, world_pt: Point) -> bool {
    let extent = token.extent(grid_size);
    world_pt.x >= token.x && world_pt.x <= token.x + extent && world_pt.y >= token.y && world_pt.y <= token.y + extent
}
