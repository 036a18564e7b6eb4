/// Integration tests for the chunk batcher's invalidation contract.
///
/// Everything here is CPU-only: the batcher emits `Pod` vertex buffers, so
/// tests need no GPU or window.
use loam2d::rect::Rect;
use loam2d::tilemap::{AtlasMapping, ChunkBatcher, TileError, TileMap, CHUNK_SIZE};
use loam2d::TextureHandle;

/// Five-terrain atlas laid out like a 80x16 strip: water, grass, mud, sand, rock.
fn tile_mapping() -> AtlasMapping {
    AtlasMapping::from_entries(&[
        (0, Rect::new(0.0, 0.0, 16.0, 16.0)),
        (1, Rect::new(16.0, 0.0, 16.0, 16.0)),
        (2, Rect::new(32.0, 0.0, 16.0, 16.0)),
        (3, Rect::new(48.0, 0.0, 16.0, 16.0)),
        (4, Rect::new(64.0, 0.0, 16.0, 16.0)),
    ])
}

fn atlas_texture() -> TextureHandle {
    TextureHandle { id: 7, width: 80, height: 16 }
}

/// Expected normalised UV min/max for a source rect in the test atlas.
fn expected_uv(src: Rect) -> ([f32; 2], [f32; 2]) {
    let tex = atlas_texture();
    (
        [src.x / tex.width as f32, src.y / tex.height as f32],
        [src.right() / tex.width as f32, src.bottom() / tex.height as f32],
    )
}

// ── Dirty-flag contract ──────────────────────────────────────────────────────

/// After an edit, the very next batch pass yields the cell's new UVs and the
/// owning chunk reports clean.
#[test]
fn set_tile_then_batches_yields_atlas_uvs_and_clean_chunk() {
    let mut batcher = ChunkBatcher::new(16, 16, 32);
    let src = Rect::new(16.0, 0.0, 16.0, 16.0);
    batcher.set_tile(10, 3, atlas_texture(), src).unwrap();

    let batches: Vec<_> = batcher.render_batches().collect();
    assert_eq!(batches.len(), 1);
    let batch = &batches[0];
    assert_eq!((batch.chunk_x, batch.chunk_y), (1, 0));

    let (uv_min, uv_max) = expected_uv(src);
    assert_eq!(batch.vertices[0].uv, uv_min);
    assert_eq!(batch.vertices[2].uv, uv_max);

    assert_eq!(batcher.is_chunk_dirty(1, 0), Some(false));
}

/// Out-of-range coordinates fail with `InvalidCoordinate` and leave every
/// chunk's dirty bit untouched.
#[test]
fn out_of_range_edit_changes_no_dirty_bits() {
    let mut batcher = ChunkBatcher::new(16, 16, 32);
    batcher.set_tile(0, 0, atlas_texture(), Rect::new(0.0, 0.0, 16.0, 16.0)).unwrap();
    // Flush so all chunks are clean.
    assert_eq!(batcher.render_batches().count(), 1);

    let err = batcher
        .set_tile(16, 3, atlas_texture(), Rect::new(0.0, 0.0, 16.0, 16.0))
        .unwrap_err();
    assert_eq!(
        err,
        TileError::InvalidCoordinate { x: 16, y: 3, width: 16, height: 16 }
    );
    assert_eq!(batcher.dirty_chunk_count(), 0);
}

/// Rebuilding twice with no intervening edits produces byte-identical buffers.
#[test]
fn rebuild_chunk_is_idempotent() {
    let mut batcher = ChunkBatcher::new(16, 16, 32);
    for (x, y, id) in [(0u32, 0u32, 0u32), (1, 3, 2), (7, 7, 4)] {
        let src = tile_mapping().get(id).unwrap();
        batcher.set_tile(x, y, atlas_texture(), src).unwrap();
    }

    batcher.rebuild_chunk(0, 0).unwrap();
    let first: Vec<u8> =
        bytemuck::cast_slice(batcher.chunk_geometry(0, 0).unwrap()).to_vec();
    batcher.rebuild_chunk(0, 0).unwrap();
    let second: &[u8] = bytemuck::cast_slice(batcher.chunk_geometry(0, 0).unwrap());
    assert_eq!(first.as_slice(), second);
}

/// An edit must not force rebuilds of untouched chunks: only the owning
/// chunk's buffer changes across a batch pass.
#[test]
fn single_tile_edit_dirties_exactly_one_chunk() {
    let mut batcher = ChunkBatcher::new(32, 32, 32);
    let mapping = tile_mapping();
    let map = {
        let mut m = TileMap::new(32, 32);
        m.fill(1);
        m
    };
    batcher.populate(&map, &mapping, atlas_texture()).unwrap();
    assert_eq!(batcher.render_batches().count(), 16);
    assert_eq!(batcher.dirty_chunk_count(), 0);

    batcher
        .set_tile(CHUNK_SIZE + 1, CHUNK_SIZE + 1, atlas_texture(), mapping.get(4).unwrap())
        .unwrap();
    assert_eq!(batcher.dirty_chunk_count(), 1);
    assert_eq!(batcher.is_chunk_dirty(1, 1), Some(true));
}

// ── The original 16×16 scenario ─────────────────────────────────────────────

/// A 16×16 all-water map; cell (1, 3) is edited to mud. The next batch pass
/// returns that cell's chunk with the mud UVs and the chunk clean.
#[test]
fn water_map_mud_edit_scenario() {
    let mapping = tile_mapping();
    let texture = atlas_texture();
    let mut map = TileMap::new(16, 16);
    map.fill(0);

    let mut batcher = ChunkBatcher::new(16, 16, 32);
    batcher.populate(&map, &mapping, texture).unwrap();
    assert_eq!(batcher.render_batches().count(), 4);

    let mud = Rect::new(32.0, 0.0, 16.0, 16.0);
    map.set(1, 3, 2).unwrap();
    batcher.set_tile(1, 3, texture, mud).unwrap();

    let batch = batcher
        .render_batches()
        .find(|b| (b.chunk_x, b.chunk_y) == (0, 0))
        .unwrap();

    // Cell (1, 3) is the (3 * 8 + 1)th mapped cell of the fully-mapped chunk,
    // 6 vertices each.
    let base = ((3 * CHUNK_SIZE + 1) * 6) as usize;
    let (uv_min, uv_max) = expected_uv(mud);
    assert_eq!(batch.vertices[base].uv, uv_min);
    assert_eq!(batch.vertices[base + 2].uv, uv_max);
    assert_eq!(batch.vertices[base].position, [32.0, 96.0]);

    assert_eq!(batcher.is_chunk_dirty(0, 0), Some(false));
}

// ── Unmapped ids ─────────────────────────────────────────────────────────────

/// Cells whose tile id has no atlas entry contribute no geometry. Skipped,
/// not an error.
#[test]
fn unmapped_ids_emit_no_geometry() {
    let mapping = AtlasMapping::from_entries(&[(1, Rect::new(16.0, 0.0, 16.0, 16.0))]);
    let mut map = TileMap::new(8, 8);
    map.fill(9); // unmapped everywhere
    map.set(2, 0, 1).unwrap();

    let mut batcher = ChunkBatcher::new(8, 8, 32);
    batcher.populate(&map, &mapping, atlas_texture()).unwrap();

    let batches: Vec<_> = batcher.render_batches().collect();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].vertices.len(), 6, "only the single mapped cell");
}
