use crate::adapters;
use crate::pivox::{PivoxMap, AIR};
use crate::*;

const SIZE: i32 = 8;

const GRASS: u16 = 1;
const DIRT: u16 = 2;
const STONE: u16 = 3;
const GRAVEL: u16 = 4;

fn stable_rand(x: f32) -> f32 {
    ((x * 91.3458).sin() * 47453.5453) % 1.0
}
fn stable_rand_2(x: f32, y: f32) -> f32 {
    ((x * 12.9898 + y * 78.233).sin() * 47453.5453) % 1.0
}
fn stable_rand_3(x: f32, y: f32, z: f32) -> f32 {
    stable_rand_2(x + stable_rand(z), y + stable_rand(z))
}
fn stable_rand_3i(xi: i32, yi: i32, zi: i32) -> f32 {
    let x = (xi as f32 + 0.5) * (1.0 / 8.0);
    let y = (yi as f32 + 0.5) * (1.0 / 8.0);
    let z = (zi as f32 + 0.5) * (1.0 / 8.0);
    stable_rand_3(x, y, z)
}

fn sample_terrain(x: f32, y: f32, z: f32) -> f32 {
    -(x * x + y * y + z * z) + 0.25
}

fn sample_terrain_i(xi: i32, yi: i32, zi: i32) -> f32 {
    let x = (xi as f32 + 0.5) * (1.0 / 8.0);
    let y = (yi as f32 + 0.5) * (1.0 / 8.0);
    let z = (zi as f32 + 0.5) * (1.0 / 8.0);
    sample_terrain(x, y, z)
}

/// Block id for a cell of a sphere centred on the grid, layered by how much
/// solid ground lies above it.
fn sample_block(xi: i32, yi: i32, zi: i32) -> u16 {
    if sample_terrain_i(xi, yi, zi) <= 0.0 {
        return AIR;
    }
    let mut si = 0;
    for _ in 0..16 {
        let sval = sample_terrain_i(xi, yi, zi + si);
        si += 1;
        if sval < 0.0 {
            break;
        }
    }
    if si < 2 {
        GRASS
    } else if si < 4 {
        DIRT
    } else if stable_rand_3i(xi, yi, zi) < 0.5 {
        STONE
    } else {
        GRAVEL
    }
}

/// Grid coordinates run from 0, terrain coordinates are centred on 0.
fn terrain_blocks() -> Vec<u8> {
    let half = SIZE / 2;
    let mut blocks = Vec::with_capacity((SIZE * SIZE * SIZE) as usize);
    for z in 0..SIZE {
        for y in 0..SIZE {
            for x in 0..SIZE {
                blocks.push(sample_block(x - half, y - half, z - half) as u8);
            }
        }
    }
    blocks
}

fn terrain_map() -> PivoxMap {
    let mut map = PivoxMap::new();
    map.set_width(SIZE as u64);
    map.set_height(SIZE as u64);
    map.set_depth(SIZE as u64);
    map.set_name("Procedural");
    map.set_author("Terrain sampler");
    map.add_block("Air", 0, 0, 0);
    map.add_block("Grass", 51, 127, 25);
    map.add_block("Dirt", 102, 76, 51);
    map.add_block("Stone", 91, 86, 86);
    map.add_block("Gravel", 63, 61, 58);
    map
}

#[test]
fn procedural_terrain_round_trip() {
    super::init_logging();
    let blocks = terrain_blocks();
    assert!(blocks.iter().any(|&b| b as u16 == GRASS));
    assert!(blocks.iter().any(|&b| b as u16 == AIR));

    let mut map = terrain_map();
    let full = RegionRange::new(0, 0, 0, SIZE as u64, SIZE as u64, SIZE as u64);
    map.add_area_raster8(&full, &blocks).unwrap();

    let bytes = map.to_container().unwrap().encode().unwrap();
    let container = Context::new().parse::<adapters::Pivox>(&bytes, &()).unwrap();
    assert_eq!(container.name(), Some("Procedural"));
    assert_eq!(container.author(), Some("Terrain sampler"));
    assert_eq!(container.block_count(), 5);

    let grid = container.materialize(&full).unwrap();
    let expected: Vec<u16> = blocks.iter().map(|&b| b as u16).collect();
    assert_eq!(grid.blocks(), expected.as_slice());

    // An octant read back on its own matches the same cells of the full grid.
    let octant = RegionRange::new(4, 4, 4, 4, 4, 4);
    let part = container.materialize(&octant).unwrap();
    for z in 0..4 {
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(part.get(x, y, z), grid.get(x + 4, y + 4, z + 4));
            }
        }
    }
}

#[test]
fn procedural_surface_as_sparse_area() {
    let blocks = terrain_blocks();
    let full = RegionRange::new(0, 0, 0, SIZE as u64, SIZE as u64, SIZE as u64);

    // Only the grass shell, stored as coordinates over a dirt fill.
    let mut surface = Vec::new();
    for (i, &b) in blocks.iter().enumerate() {
        if b as u16 == GRASS {
            let i = i as i32;
            let (x, y, z) = (i % SIZE, (i / SIZE) % SIZE, i / (SIZE * SIZE));
            surface.push([x as u8, y as u8, z as u8, b]);
        }
    }

    let mut map = terrain_map();
    map.add_area_fill(&full, DIRT);
    map.add_area_coord88(&full, &surface);
    let container = map.to_container().unwrap();
    let grid = container.materialize(&full).unwrap();

    for (i, &b) in blocks.iter().enumerate() {
        let expected = if b as u16 == GRASS { GRASS } else { DIRT };
        assert_eq!(grid.blocks()[i], expected);
    }
    assert!(grid.warnings().is_empty());
}
