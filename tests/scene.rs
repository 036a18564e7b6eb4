/// End-to-end scene setup mirroring the reference game: a terrain map
/// resolved through an atlas, a crowd of animated sprite objects, and a
/// camera-driven frame loop.
use loam2d::animation::{Animation, AnimationFrame};
use loam2d::camera::Camera2D;
use loam2d::input::{InputState, KeyCode};
use loam2d::rect::Rect;
use loam2d::scene::{Scene, SceneError};
use loam2d::tilemap::AtlasMapping;
use loam2d::TextureTable;

/// 0: water, 1: grass, 2: mud, 3: sand, 4: rock.
fn tile_mapping() -> AtlasMapping {
    AtlasMapping::from_json(
        r#"{
            "0": [0,  0, 16, 16],
            "1": [16, 0, 16, 16],
            "2": [32, 0, 16, 16],
            "3": [48, 0, 16, 16],
            "4": [64, 0, 16, 16]
        }"#,
    )
    .unwrap()
}

fn island_map() -> Vec<u32> {
    let mut data = vec![0u32; 16 * 16];
    // A grass block with a rock core, roughly like the demo island.
    for y in 4..12 {
        for x in 4..12 {
            data[y * 16 + x] = 1;
        }
    }
    for y in 7..9 {
        for x in 7..9 {
            data[y * 16 + x] = 4;
        }
    }
    data
}

#[test]
fn full_scene_setup_and_edit_flow() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut textures = TextureTable::new();
    let tile_atlas = textures.register("tile_atlas.png", 80, 16);
    textures.register("atlas.png", 128, 32);

    let mut scene = Scene::new("default", 16, 16, 32);
    scene.set_atlas(tile_mapping(), tile_atlas).unwrap();
    scene.load_map(&island_map()).unwrap();

    // Every cell is mapped, so all four chunks batch.
    assert_eq!(scene.render_batches().count(), 4);
    assert_eq!(scene.batcher().dirty_chunk_count(), 0);

    // Interactive edit: cell (1, 3) becomes mud.
    scene.set_tile(1, 3, 2).unwrap();
    assert_eq!(scene.batcher().dirty_chunk_count(), 1);

    let batch = scene
        .render_batches()
        .find(|b| (b.chunk_x, b.chunk_y) == (0, 0))
        .unwrap();
    // Mud rect 32..48 of the 80x16 atlas → u 0.4..0.6.
    let base = (3 * 8 + 1) * 6;
    assert_eq!(batch.vertices[base].uv, [0.4, 0.0]);
    assert_eq!(batch.vertices[base + 2].uv, [0.6, 1.0]);
    assert_eq!(scene.batcher().is_chunk_dirty(0, 0), Some(false));
}

#[test]
fn missing_texture_aborts_object_creation() {
    let textures = TextureTable::new();
    let mut scene = Scene::new("default", 16, 16, 32);
    let err = scene
        .create_sprite_object("pinkface", "pink_face.png", &textures)
        .unwrap_err();
    assert!(matches!(err, SceneError::TextureNotFound(_)));
}

#[test]
fn registered_crowd_animates_through_scene_update() {
    let mut textures = TextureTable::new();
    textures.register("atlas.png", 128, 32);

    let mut scene = Scene::new("default", 16, 16, 32);
    for i in 0..100 {
        let e = scene
            .create_sprite_object("yellowface", "atlas.png", &textures)
            .unwrap();
        scene
            .world_mut()
            .transform_mut(e)
            .unwrap()
            .position
            .x = i as f32;

        let mut anim = Animation::new();
        anim.add_clip(
            "idle",
            (0..4)
                .map(|f| AnimationFrame::new(Rect::new(f as f32 * 32.0, 0.0, 32.0, 32.0), 0.25))
                .collect(),
        );
        scene.world_mut().insert_animation(e, anim);
        scene.register_game_object(e);
    }
    assert_eq!(scene.objects().len(), 100);

    // One frame: camera pans, animations tick.
    let mut camera = Camera2D::new("main", 1280.0, 720.0);
    let mut input = InputState::new();
    input.press(KeyCode::KeyD);
    camera.update(&input, 0.3);
    scene.update(0.3);

    assert!(camera.position.x > 0.0);
    for &e in scene.objects() {
        let anim = scene.world().animation(e).unwrap();
        assert_eq!(anim.frame_index(), 1);
        assert_eq!(
            scene.world().sprite(e).unwrap().source_rect,
            Rect::new(32.0, 0.0, 32.0, 32.0)
        );
    }
}

#[test]
fn draw_order_is_registration_order() {
    let mut textures = TextureTable::new();
    textures.register("a.png", 8, 8);

    let mut scene = Scene::new("default", 8, 8, 32);
    let first = scene.create_sprite_object("first", "a.png", &textures).unwrap();
    let second = scene.create_sprite_object("second", "a.png", &textures).unwrap();
    scene.register_game_object(second);
    scene.register_game_object(first);

    let names: Vec<_> = scene
        .objects()
        .iter()
        .map(|&e| scene.world().name(e).unwrap().to_string())
        .collect();
    assert_eq!(names, ["second", "first"]);
}
