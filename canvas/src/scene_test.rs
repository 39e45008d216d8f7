#![allow(clippy::float_cmp)]

use super::*;

fn drawing(points: &[(f64, f64)]) -> Drawing {
    Drawing {
        points: points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        color: "#ff0000".into(),
        stroke_width: 5.0,
    }
}

fn scene_with_initiative(names: &[(&str, i32)]) -> Scene {
    let mut scene = Scene::new();
    for (name, value) in names {
        assert!(scene.add_initiative(name, *value));
    }
    scene
}

// =============================================================
// Defaults
// =============================================================

#[test]
fn default_scene_matches_session_start() {
    let scene = Scene::new();
    assert!(scene.tokens.is_empty());
    assert!(scene.drawings.is_empty());
    assert!(scene.fog_enabled);
    assert_eq!(scene.fog_opacity, 1.0);
    assert_eq!(scene.grid_size, 50);
    assert_eq!(scene.bg_scale, 1.0);
    assert!(scene.fx.grid);
    assert!(!scene.fx.rain && !scene.fx.fog && !scene.fx.vignette && !scene.fx.fire);
    assert_eq!(scene.active_turn_index, 0);
}

// =============================================================
// Tokens
// =============================================================

#[test]
fn token_ids_are_unique_and_monotonic() {
    let mut scene = Scene::new();
    let a = scene.add_token("Goblin", None);
    let b = scene.add_token("Orc", None);
    let c = scene.add_token("Troll", None);
    assert!(a < b && b < c);
}

#[test]
fn token_ids_are_not_reused_after_delete() {
    let mut scene = Scene::new();
    let a = scene.add_token("A", None);
    scene.remove_token(a);
    let b = scene.add_token("B", None);
    assert_ne!(a, b);
}

#[test]
fn blank_token_name_falls_back() {
    let mut scene = Scene::new();
    let id = scene.add_token("  ", None);
    assert_eq!(scene.token(id).map(|t| t.name.as_str()), Some("Token"));
}

#[test]
fn new_token_spawns_at_default_spot() {
    let mut scene = Scene::new();
    let id = scene.add_token("Hero", Some("blob:hero.png".into()));
    let token = scene.token(id).expect("token");
    assert_eq!((token.x, token.y, token.size), (100.0, 100.0, 1.0));
    assert_eq!(token.img_src.as_deref(), Some("blob:hero.png"));
}

#[test]
fn resize_token_never_drops_below_half_cell() {
    let mut scene = Scene::new();
    let id = scene.add_token("Imp", None);
    assert!(scene.resize_token(id, -0.5));
    assert!(scene.resize_token(id, -0.5));
    assert_eq!(scene.token(id).expect("token").size, 0.5);
    assert!(scene.resize_token(id, 2.0));
    assert_eq!(scene.token(id).expect("token").size, 2.5);
}

#[test]
fn operations_on_deleted_token_are_noops() {
    let mut scene = Scene::new();
    let id = scene.add_token("Ghost", None);
    assert!(scene.remove_token(id).is_some());
    assert!(scene.token(id).is_none());
    assert!(!scene.resize_token(id, 1.0));
    assert!(!scene.move_token(id, 5.0, 5.0));
    assert!(scene.remove_token(id).is_none());
}

#[test]
fn token_extent_scales_with_grid() {
    let mut scene = Scene::new();
    let id = scene.add_token("Ogre", None);
    scene.resize_token(id, 1.0);
    let token = scene.token(id).expect("token");
    assert_eq!(token.extent(50), 100.0);
    assert_eq!(token.center(50), Point::new(150.0, 150.0));
}

// =============================================================
// Drawings, fx, fog, grid, map
// =============================================================

#[test]
fn drawings_append_in_order_and_clear() {
    let mut scene = Scene::new();
    scene.add_drawing(drawing(&[(0.0, 0.0)]));
    scene.add_drawing(drawing(&[(1.0, 1.0), (2.0, 2.0)]));
    assert_eq!(scene.drawings.len(), 2);
    assert_eq!(scene.drawings[1].points.len(), 2);
    scene.clear_drawings();
    assert!(scene.drawings.is_empty());
}

#[test]
fn toggle_fx_flips_only_the_named_flag() {
    let mut scene = Scene::new();
    scene.toggle_fx(FxKind::Rain);
    assert!(scene.fx.rain);
    assert!(scene.fx.grid);
    scene.toggle_fx(FxKind::Grid);
    assert!(!scene.fx.grid);
    scene.toggle_fx(FxKind::Rain);
    assert!(!scene.fx.rain);
}

#[test]
fn overlays_exclude_grid() {
    let mut scene = Scene::new();
    scene.toggle_fx(FxKind::Fire);
    scene.toggle_fx(FxKind::Vignette);
    assert_eq!(scene.fx.overlays(), vec![FxKind::Vignette, FxKind::Fire]);
}

#[test]
fn fog_opacity_is_clamped() {
    let mut scene = Scene::new();
    scene.set_fog_opacity(1.7);
    assert_eq!(scene.fog_opacity, 1.0);
    scene.set_fog_opacity(-0.2);
    assert_eq!(scene.fog_opacity, 0.0);
    scene.set_fog_opacity(0.35);
    assert_eq!(scene.fog_opacity, 0.35);
    scene.set_fog_opacity(f64::NAN);
    assert_eq!(scene.fog_opacity, 0.35);
}

#[test]
fn zero_grid_size_is_rejected() {
    let mut scene = Scene::new();
    assert!(!scene.set_grid_size(0));
    assert_eq!(scene.grid_size, 50);
    assert!(scene.set_grid_size(70));
    assert_eq!(scene.grid_size, 70);
}

#[test]
fn set_map_rehomes_camera_translation() {
    let mut scene = Scene::new();
    scene.bg_pos = Point::new(300.0, -20.0);
    scene.bg_scale = 2.0;
    scene.set_map(Some("blob:dungeon.png".into()));
    assert_eq!(scene.bg_pos, Point::default());
    assert_eq!(scene.bg_scale, 2.0);
    assert_eq!(scene.map_src.as_deref(), Some("blob:dungeon.png"));
}

#[test]
fn camera_round_trips_through_scene() {
    let mut scene = Scene::new();
    scene.set_camera(Camera { pan_x: 4.0, pan_y: 8.0, zoom: 1.5 });
    assert_eq!(scene.camera(), Camera { pan_x: 4.0, pan_y: 8.0, zoom: 1.5 });
}

// =============================================================
// Initiative
// =============================================================

#[test]
fn next_turn_cycles_through_three_entries() {
    let mut scene = scene_with_initiative(&[("A", 10), ("B", 5), ("C", 1)]);
    assert_eq!(scene.active_turn_index, 0);
    scene.next_turn();
    assert_eq!(scene.active_turn_index, 1);
    scene.next_turn();
    assert_eq!(scene.active_turn_index, 2);
    scene.next_turn();
    assert_eq!(scene.active_turn_index, 0);
}

#[test]
fn clear_initiative_resets_list_and_index() {
    let mut scene = scene_with_initiative(&[("A", 10), ("B", 5), ("C", 1)]);
    scene.next_turn();
    scene.next_turn();
    scene.clear_initiative();
    assert!(scene.initiative.is_empty());
    assert_eq!(scene.active_turn_index, 0);
    assert!(scene.active_entry().is_none());
}

#[test]
fn next_turn_on_empty_list_is_noop() {
    let mut scene = Scene::new();
    scene.next_turn();
    assert_eq!(scene.active_turn_index, 0);
}

#[test]
fn blank_initiative_name_is_ignored() {
    let mut scene = Scene::new();
    assert!(!scene.add_initiative("", 12));
    assert!(scene.initiative.is_empty());
}

#[test]
fn sort_initiative_is_descending_and_stable() {
    let mut scene = scene_with_initiative(&[("Low", 3), ("TieA", 12), ("High", 20), ("TieB", 12)]);
    scene.sort_initiative();
    let names: Vec<&str> = scene.initiative.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["High", "TieA", "TieB", "Low"]);
}

#[test]
fn removing_entry_before_active_keeps_same_combatant_active() {
    let mut scene = scene_with_initiative(&[("A", 3), ("B", 2), ("C", 1)]);
    scene.next_turn();
    scene.next_turn();
    assert_eq!(scene.active_entry().map(|e| e.name.as_str()), Some("C"));
    scene.remove_initiative(0);
    assert_eq!(scene.active_entry().map(|e| e.name.as_str()), Some("C"));
}

#[test]
fn removing_last_active_entry_wraps_index() {
    let mut scene = scene_with_initiative(&[("A", 3), ("B", 2)]);
    scene.next_turn();
    scene.remove_initiative(1);
    assert_eq!(scene.active_turn_index, 0);
    scene.remove_initiative(0);
    assert_eq!(scene.active_turn_index, 0);
    assert!(scene.remove_initiative(0).is_none());
}

// =============================================================
// Snapshot schema
// =============================================================

#[test]
fn snapshot_uses_camel_case_keys() {
    let mut scene = Scene::new();
    scene.add_token("Bard", Some("blob:bard.png".into()));
    scene.add_drawing(drawing(&[(1.0, 2.0)]));
    let json = serde_json::to_value(&scene).expect("serialize");
    for key in ["tokens", "drawings", "fx", "fogEnabled", "fogOpacity", "gridSize", "bgPos", "bgScale", "mapSrc", "initiative", "activeTurnIndex"] {
        assert!(json.get(key).is_some(), "missing key {key}");
    }
    assert!(json.get("nextTokenId").is_none());
    assert_eq!(json["tokens"][0]["imgSrc"], "blob:bard.png");
    assert_eq!(json["drawings"][0]["strokeWidth"], 5.0);
}

#[test]
fn snapshot_round_trips_without_loss() {
    let mut scene = scene_with_initiative(&[("A", 3)]);
    scene.add_token("Knight", None);
    scene.add_drawing(drawing(&[(0.0, 0.0), (4.0, 4.0)]));
    scene.toggle_fx(FxKind::Rain);
    scene.set_fog_opacity(0.4);
    let json = serde_json::to_string(&scene).expect("serialize");
    let restored: Scene = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(restored.tokens, scene.tokens);
    assert_eq!(restored.drawings, scene.drawings);
    assert_eq!(restored.fx, scene.fx);
    assert_eq!(restored.fog_opacity, 0.4);
    assert_eq!(restored.initiative, scene.initiative);
}
