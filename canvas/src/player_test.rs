use super::*;
use crate::engine::Engine;
use crate::fog::FogRect;
use crate::protocol::{Frame, decode_frame, encode_frame};
use crate::scene::{Drawing, FxKind};

fn synced_scene(pan: Point, zoom: f64) -> Scene {
    let mut scene = Scene::new();
    scene.bg_pos = pan;
    scene.bg_scale = zoom;
    scene
}

fn sync(scene: Scene, sync_view: bool) -> Message {
    Message::Sync { state: scene, sync_view }
}

fn over_wire(frame: &Frame) -> Message {
    let raw = encode_frame(frame).expect("encode");
    decode_frame(&raw).expect("decode").message
}

#[test]
fn renders_nothing_before_first_snapshot() {
    let mut view = PlayerView::new();
    assert_eq!(view.tick(), vec![DrawCmd::Clear]);
    assert!(view.snapshot().is_none());
}

#[test]
fn first_snapshot_adopts_master_camera_even_unsynced() {
    let mut view = PlayerView::new();
    view.apply(sync(synced_scene(Point::new(40.0, 20.0), 2.0), false)).expect("apply");
    assert_eq!(view.camera(), Camera { pan_x: 40.0, pan_y: 20.0, zoom: 2.0 });
}

#[test]
fn unsynced_snapshots_keep_local_camera() {
    let mut view = PlayerView::new();
    view.apply(sync(synced_scene(Point::new(0.0, 0.0), 1.0), false)).expect("apply");
    view.on_pointer_down(Point::new(0.0, 0.0));
    view.on_pointer_move(Point::new(25.0, 5.0));
    view.on_pointer_up();

    view.apply(sync(synced_scene(Point::new(300.0, 300.0), 3.0), false)).expect("apply");
    assert_eq!(view.camera(), Camera { pan_x: 25.0, pan_y: 5.0, zoom: 1.0 });
}

#[test]
fn handle_input_drives_local_camera() {
    let mut view = PlayerView::new();
    view.apply(sync(synced_scene(Point::new(0.0, 0.0), 1.0), false)).expect("apply");
    view.handle_input(PlayerInput::PointerDown(Point::new(10.0, 10.0)));
    view.handle_input(PlayerInput::PointerMove(Point::new(30.0, 0.0)));
    view.handle_input(PlayerInput::PointerUp);
    view.handle_input(PlayerInput::PointerMove(Point::new(90.0, 90.0)));
    assert_eq!(view.camera(), Camera { pan_x: 20.0, pan_y: -10.0, zoom: 1.0 });

    view.handle_input(PlayerInput::Wheel(WheelDelta { dx: 0.0, dy: 1.0 }));
    assert!(view.camera().zoom < 1.0);
}

#[test]
fn synced_snapshots_overwrite_camera_and_lock_input() {
    let mut view = PlayerView::new();
    view.apply(sync(synced_scene(Point::new(10.0, 10.0), 1.5), true)).expect("apply");
    assert!(view.is_synced());

    view.on_pointer_down(Point::new(0.0, 0.0));
    view.on_pointer_move(Point::new(100.0, 100.0));
    view.on_pointer_up();
    view.on_wheel(WheelDelta { dx: 0.0, dy: -1.0 });
    assert_eq!(view.camera(), Camera { pan_x: 10.0, pan_y: 10.0, zoom: 1.5 });

    view.apply(sync(synced_scene(Point::new(-5.0, 7.0), 0.5), true)).expect("apply");
    assert_eq!(view.camera(), Camera { pan_x: -5.0, pan_y: 7.0, zoom: 0.5 });
}

#[test]
fn sync_off_keeps_last_synced_camera() {
    let mut view = PlayerView::new();
    view.apply(sync(synced_scene(Point::new(60.0, 0.0), 2.0), true)).expect("apply");
    view.apply(sync(synced_scene(Point::new(0.0, 0.0), 1.0), false)).expect("apply");
    assert_eq!(view.camera(), Camera { pan_x: 60.0, pan_y: 0.0, zoom: 2.0 });

    view.on_wheel(WheelDelta { dx: 0.0, dy: -1.0 });
    assert!(view.camera().zoom > 2.0);
}

#[test]
fn master_state_survives_the_wire() {
    let mut engine = Engine::new(100);
    let id = engine.create_token("Rogue", Some("blob:rogue.png".into()));
    engine.scene.move_token(id, 220.0, 140.0);
    engine.scene.add_drawing(Drawing { points: vec![Point::new(1.0, 2.0)], color: "#abc".into(), stroke_width: 4.0 });
    engine.toggle_fx(FxKind::Vignette);
    engine.set_fog_opacity(0.25);
    engine.scene.add_initiative("Rogue", 19);

    let mut view = PlayerView::new();
    view.apply(over_wire(&Frame::sync(1, &engine.scene, false))).expect("apply");

    let received = view.snapshot().expect("snapshot");
    assert_eq!(received.tokens, engine.scene.tokens);
    assert_eq!(received.drawings, engine.scene.drawings);
    assert_eq!(received.fx, engine.scene.fx);
    assert_eq!(received.initiative, engine.scene.initiative);
    assert!((received.fog_opacity - 0.25).abs() < f64::EPSILON);
}

#[test]
fn fog_update_round_trips_raster() {
    let mut engine = Engine::new(64);
    engine.fog.reveal(FogRect::new(Point::new(0.0, 0.0), Point::new(32.0, 32.0)));
    let artifact = engine.fog.serialize(1).expect("serialize");

    let mut view = PlayerView::new();
    view.apply(over_wire(&Frame::fog(2, artifact))).expect("apply");

    let fog = view.fog().expect("fog");
    assert_eq!(fog.opacity_at(Point::new(10.0, 10.0)), Some(0));
    assert_eq!(fog.opacity_at(Point::new(40.0, 40.0)), Some(255));
}

#[test]
fn bad_fog_update_keeps_previous_image() {
    let mut engine = Engine::new(16);
    engine.fog.reset(false);
    let artifact = engine.fog.serialize(1).expect("serialize");

    let mut view = PlayerView::new();
    view.apply(Message::FogUpdate { data: artifact.data, width: 16, height: 16 }).expect("apply");
    let bad = Message::FogUpdate { data: "data:image/png;base64,!!!".into(), width: 16, height: 16 };
    assert!(view.apply(bad).is_err());
    assert_eq!(view.fog().and_then(|f| f.opacity_at(Point::new(1.0, 1.0))), Some(0));
}

#[test]
fn fog_layer_drawn_at_player_opacity_over_tokens() {
    let mut engine = Engine::new(32);
    engine.create_token("Ogre", None);
    engine.set_fog_opacity(0.7);
    let mut view = PlayerView::new();
    view.apply(sync(engine.scene.clone(), false)).expect("apply");
    view.apply(over_wire(&Frame::fog(1, engine.fog.serialize(1).expect("serialize")))).expect("apply");

    let cmds = view.tick();
    let token = cmds.iter().position(|c| matches!(c, DrawCmd::PushClipCircle { .. })).expect("token");
    let fog = cmds
        .iter()
        .position(|c| matches!(c, DrawCmd::FogLayer { source: FogSource::Received, alpha, .. } if (*alpha - 0.7).abs() < 1e-12))
        .expect("fog");
    assert!(token < fog);
}

#[test]
fn fog_layer_skipped_when_disabled_or_not_received() {
    let mut view = PlayerView::new();
    view.apply(sync(Scene::new(), false)).expect("apply");
    assert!(!view.tick().iter().any(|c| matches!(c, DrawCmd::FogLayer { .. })));

    let mut engine = Engine::new(16);
    engine.set_fog_enabled(false);
    view.apply(sync(engine.scene.clone(), false)).expect("apply");
    view.apply(Message::FogUpdate { data: engine.fog.serialize(1).expect("serialize").data, width: 16, height: 16 })
        .expect("apply");
    assert!(!view.tick().iter().any(|c| matches!(c, DrawCmd::FogLayer { .. })));
}

#[test]
fn grid_follows_received_fog_extent() {
    let grid_extent = |cmds: &[DrawCmd]| {
        cmds.iter().find_map(|c| match c {
            DrawCmd::Grid { extent, .. } => Some(*extent),
            _ => None,
        })
    };
    let mut view = PlayerView::new();
    view.apply(sync(Scene::new(), false)).expect("apply");
    assert_eq!(grid_extent(&view.tick()), Some(f64::from(FOG_EXTENT)));

    let engine = Engine::new(48);
    view.apply(over_wire(&Frame::fog(1, engine.fog.serialize(1).expect("serialize")))).expect("apply");
    assert_eq!(grid_extent(&view.tick()), Some(48.0));
}

#[test]
fn token_with_pending_image_draws_no_placeholder() {
    let mut scene = Scene::new();
    scene.add_token("Elf", Some("blob:elf.png".into()));
    scene.add_token("Dwarf", None);
    let mut view = PlayerView::new();
    view.apply(sync(scene, false)).expect("apply");

    let cmds = view.tick();
    assert_eq!(cmds.iter().filter(|c| matches!(c, DrawCmd::FillRect { .. })).count(), 1);
    assert!(!cmds.iter().any(|c| matches!(c, DrawCmd::Text { .. })));
    assert_eq!(view.take_image_requests(), vec!["blob:elf.png".to_string()]);

    view.fulfil_image("blob:elf.png", Ok(LoadedImage { reference: "blob:elf.png".into(), width: 8, height: 8 }));
    assert!(view.tick().iter().any(|c| matches!(c, DrawCmd::Image { reference, .. } if reference == "blob:elf.png")));
}

#[test]
fn received_ping_starts_larger_and_decays() {
    let mut view = PlayerView::new();
    view.apply(Message::Ping { x: 3.0, y: 4.0 }).expect("apply");
    view.apply(sync(Scene::new(), false)).expect("apply");

    let cmds = view.tick();
    assert!(cmds.iter().any(|c| matches!(c, DrawCmd::Ring { radius, .. } if (*radius - 10.0).abs() < f64::EPSILON)));
    assert!((view.pings()[0].radius - 12.0).abs() < f64::EPSILON);

    for _ in 0..40 {
        view.tick();
    }
    assert!(view.pings().is_empty());
}
