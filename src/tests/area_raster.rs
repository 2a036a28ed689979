use serde_json::{json, Value};

use crate::pivox::{default_map, AreaEntry, AreaKind, PivoxContainer, PivoxMap};
use crate::*;

fn container(root: Value, data_blocks: Vec<Vec<u8>>) -> PivoxContainer {
    match root {
        Value::Object(root) => PivoxContainer::new(root, data_blocks),
        other => panic!("not an object: {}", other),
    }
}

fn whole(container: &PivoxContainer) -> RegionRange {
    let extent = container.extent();
    RegionRange::new(0, 0, 0, extent.x, extent.y, extent.z)
}

#[test]
fn areas_parse_with_defaults() {
    let map = container(
        json!({
            "areas": [
                { "type": "fill", "block": 2 },
                {
                    "x": 1, "y": 2, "z": 3,
                    "width": 4, "height": 5, "depth": 6,
                    "type": "raster8", "data": 0
                },
                { "type": "coord8.8", "data": 1 },
                { "type": "sphere" },
                { "type": "fill" },
                { "type": "fill", "block": 1, "x": -1 },
                7
            ]
        }),
        Vec::new(),
    );

    let areas = map.areas();
    assert_eq!(areas.len(), 7);

    let fill = areas[0].area().unwrap();
    assert_eq!(fill.bounds, RegionRange::new(0, 0, 0, 1, 1, 1));
    assert_eq!(fill.kind, AreaKind::Fill { block: 2 });

    let raster = areas[1].area().unwrap();
    assert_eq!(raster.bounds, RegionRange::new(1, 2, 3, 4, 5, 6));
    assert_eq!(raster.kind, AreaKind::Raster8 { data: 0 });
    assert_eq!(areas[2].area().map(|a| a.kind.type_name()), Some("coord8.8"));
    assert_eq!(areas[3].area().map(|a| &a.kind), Some(&AreaKind::Unknown("sphere".to_string())));

    for (i, entry) in areas.iter().enumerate().skip(4) {
        assert!(matches!(entry, AreaEntry::Invalid { index, .. } if *index == i));
    }
}

#[test]
fn later_areas_overwrite_earlier() {
    let region = RegionRange::new(0, 0, 0, 6, 6, 6);
    for offset in 0..4 {
        for size in 1..4 {
            let mut map = PivoxMap::new();
            map.set_width(6);
            map.set_height(6);
            map.set_depth(6);
            map.add_area_fill(&RegionRange::new(1, 1, 1, 3, 3, 3), 1);
            map.add_area_fill(&RegionRange::new(offset, offset, 1, size, size, 2), 2);
            let grid = map.to_container().unwrap().materialize(&region).unwrap();

            for z in 0..6 {
                for y in 0..6 {
                    for x in 0..6 {
                        let first = RegionRange::new(1, 1, 1, 3, 3, 3).contains(x, y, z);
                        let second =
                            RegionRange::new(offset, offset, 1, size, size, 2).contains(x, y, z);
                        let expected = match (first, second) {
                            (_, true) => 2,
                            (true, false) => 1,
                            (false, false) => 0,
                        };
                        assert_eq!(grid.get(x, y, z), Some(expected), "cell ({}, {}, {})", x, y, z);
                    }
                }
            }
        }
    }
}

#[test]
fn region_outside_areas_is_air() {
    let map = default_map().unwrap();
    let grid = map.materialize(&RegionRange::new(100, 0, 0, 3, 4, 5)).unwrap();
    assert_eq!(grid.extent(), Extent3D::new(3, 4, 5));
    assert!(grid.blocks().iter().all(|&b| b == 0));
    assert!(grid.warnings().is_empty());

    let grid = map.materialize(&RegionRange::new(0, 0, 0, 0, 4, 4)).unwrap();
    assert!(grid.blocks().is_empty());
}

#[test]
fn raster8_reads_its_own_layout() {
    let mut map = PivoxMap::new();
    let blocks: Vec<u8> = (1..=12).collect();
    map.add_area_raster8(&RegionRange::new(2, 0, 0, 3, 2, 2), &blocks).unwrap();
    let container = map.to_container().unwrap();

    // The requested region is wider than the area and offset from it.
    let grid = container.materialize(&RegionRange::new(1, 0, 1, 5, 2, 1)).unwrap();
    assert_eq!(grid.blocks(), &[0, 7, 8, 9, 0, 0, 10, 11, 12, 0]);
}

#[test]
fn raster8_short_data() {
    let map = container(
        json!({
            "width": 2,
            "height": 2,
            "areas": [{ "width": 2, "height": 2, "type": "raster8", "data": 0 }]
        }),
        vec![vec![4, 5, 6]],
    );

    let res = map.materialize(&whole(&map));
    assert!(matches!(
        res,
        Err(Error::DataBlockTooShort {
            area: 0,
            data: 0,
            needed: 4,
            available: 3
        })
    ));

    let config = MaterializeConfig {
        raster8: Raster8Mode::ZeroFill,
    };
    let grid = map.materialize_with(&whole(&map), &config).unwrap();
    assert_eq!(grid.blocks(), &[4, 5, 6, 0]);
}

#[test]
fn raster8_zero_fill_past_index_range() {
    let map = container(
        json!({
            "areas": [{
                "width": 1u64 << 32,
                "height": 1u64 << 32,
                "depth": 2,
                "type": "raster8",
                "data": 0
            }]
        }),
        vec![vec![7]],
    );
    let config = MaterializeConfig {
        raster8: Raster8Mode::ZeroFill,
    };

    let grid = map.materialize_with(&RegionRange::new(0, 0, 0, 1, 1, 2), &config).unwrap();
    assert_eq!(grid.blocks(), &[7, 0]);

    let res = map.materialize(&RegionRange::new(0, 0, 0, 1, 1, 1));
    assert!(matches!(res, Err(Error::DataBlockTooShort { available: 1, .. })));
}

#[test]
fn huge_map_is_an_error() {
    let map = container(
        json!({
            "width": 1u64 << 40,
            "height": 1u64 << 40,
            "depth": 1u64 << 40,
            "areas": [{ "type": "fill", "block": 1 }]
        }),
        Vec::new(),
    );

    let res = map.materialize(&whole(&map));
    assert!(matches!(res, Err(Error::GridTooLarge { .. })));

    let grid = map.materialize(&RegionRange::new(0, 0, 0, 2, 1, 1)).unwrap();
    assert_eq!(grid.blocks(), &[1, 0]);
}

#[test]
fn raster8_builder_rejects_short_data() {
    let mut map = PivoxMap::new();
    let res = map.add_area_raster8(&RegionRange::new(0, 0, 0, 2, 2, 2), &[1; 7]);
    assert!(matches!(res.map_err(|e| e.error_type()), Err(ErrorType::InvalidContent)));

    // Extra bytes are dropped.
    map.add_area_raster8(&RegionRange::new(0, 0, 0, 1, 1, 2), &[1, 2, 3]).unwrap();
    let container = map.to_container().unwrap();
    assert_eq!(container.data_block(0), Some(&[1u8, 2][..]));
}

#[test]
fn coord88_places_voxels() {
    super::init_logging();
    let mut map = PivoxMap::new();
    map.set_width(4);
    map.set_height(4);
    map.add_area_fill(&RegionRange::new(0, 0, 0, 4, 4, 1), 1);
    map.add_area_coord88(
        &RegionRange::new(1, 1, 0, 2, 2, 1),
        &[[0, 0, 0, 3], [1, 1, 0, 4], [5, 0, 0, 9]],
    );
    let container = map.to_container().unwrap();

    let grid = container.materialize(&whole(&container)).unwrap();
    assert_eq!(grid.get(0, 0, 0), Some(1));
    assert_eq!(grid.get(1, 1, 0), Some(3));
    assert_eq!(grid.get(2, 2, 0), Some(4));
    assert_eq!(grid.get(2, 1, 0), Some(1));
    assert_eq!(grid.warnings(), &[Warning::VoxelOutOfBounds { x: 6, y: 1, z: 0 }]);

    // Voxels outside the requested region are not written.
    let grid = container.materialize(&RegionRange::new(2, 2, 0, 2, 2, 1)).unwrap();
    assert_eq!(grid.blocks(), &[4, 1, 1, 1]);
}

#[test]
fn coord88_near_coordinate_limit() {
    let edge = u64::MAX - 1;
    let map = container(
        json!({ "areas": [{ "x": edge, "type": "coord8.8", "data": 0 }] }),
        vec![vec![5, 0, 0, 1, 0, 0, 0, 3]],
    );

    let grid = map.materialize(&RegionRange::new(edge, 0, 0, 1, 1, 1)).unwrap();
    assert_eq!(grid.blocks(), &[3]);
    assert_eq!(
        grid.warnings(),
        &[Warning::VoxelOutOfBounds {
            x: u64::MAX,
            y: 0,
            z: 0
        }]
    );
}

#[test]
fn coord88_partial_quad() {
    let map = container(
        json!({ "areas": [{ "type": "coord8.8", "data": 0 }] }),
        vec![vec![0, 0, 0, 1, 0, 0]],
    );
    let res = map.materialize(&whole(&map)).map_err(|e| e.error_type());
    assert!(matches!(res, Err(ErrorType::InvalidContent)));
}

#[test]
fn fill_block_must_fit_sixteen_bits() {
    let map = container(
        json!({
            "areas": [{ "type": "fill", "block": 65535 }, { "type": "fill", "block": 65536 }]
        }),
        Vec::new(),
    );
    let res = map.materialize(&whole(&map));
    assert!(matches!(res, Err(Error::BlockIdOutOfRange { area: 1, block: 65536 })));

    let map = container(json!({ "areas": [{ "type": "fill", "block": 65535 }] }), Vec::new());
    assert_eq!(map.materialize(&whole(&map)).unwrap().blocks(), &[65535]);
}

#[test]
fn missing_data_block() {
    let map = container(
        json!({ "areas": [{ "type": "raster8", "data": 3 }] }),
        vec![vec![1]],
    );
    let res = map.materialize(&whole(&map));
    assert!(matches!(res, Err(Error::MissingDataBlock { area: 0, data: 3 })));
}

#[test]
fn unknown_and_invalid_areas_are_skipped() {
    super::init_logging();
    let map = container(
        json!({
            "width": 2,
            "areas": [
                { "width": 2, "type": "fill", "block": 1 },
                { "type": "noise", "seed": 4 },
                { "type": "fill", "block": "two" },
                { "x": 1, "type": "fill", "block": 2 }
            ]
        }),
        Vec::new(),
    );

    let grid = map.materialize(&whole(&map)).unwrap();
    assert_eq!(grid.blocks(), &[1, 2]);
    assert_eq!(grid.warnings().len(), 2);
    assert_eq!(
        grid.warnings()[0],
        Warning::UnknownAreaType {
            area: 1,
            kind: "noise".to_string()
        }
    );
    assert!(matches!(grid.warnings()[1], Warning::InvalidArea { area: 2, .. }));
}

#[test]
fn default_map_layers() {
    let map = default_map().unwrap();
    assert_eq!(map.extent(), Extent3D::new(16, 16, 16));
    assert_eq!(map.name(), Some("Default Map"));
    assert_eq!(map.description(), Some("Default generated map"));
    assert_eq!(map.block_count(), 4);
    assert_eq!(map.block_name(0), Some("Air"));
    assert_eq!(map.block_name(3), Some("Grass"));
    assert_eq!(map.block_color(1), Some(Color::rgb(136, 138, 133)));

    let grid = map.materialize(&whole(&map)).unwrap();
    for (z, expected) in [(0, 1), (3, 1), (4, 2), (6, 2), (7, 3), (8, 0), (15, 0)] {
        assert_eq!(grid.get(5, 9, z), Some(expected), "layer {}", z);
    }
}
