use loaf_core::{
    BuildError, Command, Event, HexLayout, MoveError, PixelPoint, ScoreBoard, SpriteIndex,
    Terrain, TileIndex, TileSnapshot,
};
use loaf_world::{apply, query, HexGrid, SnapshotError};

const GRASSLAND: u32 = 1;
const BADLAND: u32 = 3;
const DESERT: u32 = 5;
const FOREST: u32 = 7;

fn grid_with(width: u32, height: u32, overrides: &[(usize, u32)], start: u32) -> HexGrid {
    let layout = HexLayout::new(width, height, 32, 32);
    let mut raw = vec![GRASSLAND; layout.tile_count()];
    for (slot, value) in overrides {
        raw[*slot] = *value;
    }
    HexGrid::new(layout, &raw, TileIndex::new(start)).expect("grid builds")
}

fn center_of(grid: &HexGrid, index: u32) -> PixelPoint {
    query::tile(grid, TileIndex::new(index))
        .expect("tile exists")
        .center
}

fn walkable_set(grid: &HexGrid) -> Vec<TileIndex> {
    query::tiles(grid)
        .into_iter()
        .filter(|tile| tile.walkable)
        .map(|tile| tile.index)
        .collect()
}

fn sorted_neighbors(tile: &TileSnapshot) -> Vec<TileIndex> {
    let mut neighbors: Vec<TileIndex> = tile.neighbors.into_iter().flatten().collect();
    neighbors.sort();
    neighbors
}

fn player_count(grid: &HexGrid) -> usize {
    query::tiles(grid)
        .into_iter()
        .filter(|tile| tile.has_player)
        .count()
}

fn point_at(grid: &mut HexGrid, index: u32) -> Vec<Event> {
    let mut events = Vec::new();
    let pointer = center_of(grid, index);
    apply(
        grid,
        Command::UpdateHighlight {
            pointer,
            offset: PixelPoint::ZERO,
        },
        &mut events,
    );
    events
}

fn move_player(grid: &mut HexGrid) -> Vec<Event> {
    let mut events = Vec::new();
    apply(grid, Command::MovePlayer, &mut events);
    events
}

fn build(grid: &mut HexGrid, index: u32) {
    let mut events = Vec::new();
    apply(
        grid,
        Command::Build {
            tile: TileIndex::new(index),
        },
        &mut events,
    );
    assert!(
        matches!(events.as_slice(), [Event::BuildingPlaced { .. }]),
        "unexpected events {events:?}"
    );
}

fn road(grid: &mut HexGrid, index: u32) {
    let mut events = Vec::new();
    apply(
        grid,
        Command::BuildRoad {
            tile: TileIndex::new(index),
        },
        &mut events,
    );
    assert_eq!(
        events,
        vec![Event::RoadPlaced {
            tile: TileIndex::new(index)
        }]
    );
}

#[test]
fn four_by_three_start_scenario() {
    let mut grid = grid_with(4, 3, &[(5, DESERT)], 0);

    let player = query::player_tile(&grid).expect("player placed");
    assert_eq!(player.index, TileIndex::new(0));
    assert_eq!(walkable_set(&grid), sorted_neighbors(&player));
    assert_eq!(walkable_set(&grid), vec![TileIndex::new(1), TileIndex::new(2)]);
    assert_eq!(
        query::tile(&grid, TileIndex::new(5)).map(|tile| tile.terrain),
        Some(Terrain::Desert)
    );
    assert_eq!(
        query::highlighted_tile(&grid).map(|tile| tile.index),
        Some(TileIndex::new(0))
    );

    let events = move_player(&mut grid);
    assert_eq!(
        events,
        vec![Event::MoveRejected {
            target: Some(TileIndex::new(0)),
            reason: MoveError::NotWalkable,
        }]
    );
    assert_eq!(grid.player_index(), Some(TileIndex::new(0)));
}

#[test]
fn walkable_ring_follows_the_player() {
    let mut grid = grid_with(4, 4, &[], 0);

    let events = point_at(&mut grid, 1);
    assert_eq!(
        events,
        vec![Event::HighlightChanged {
            tile: Some(TileIndex::new(1))
        }]
    );
    assert_eq!(
        move_player(&mut grid),
        vec![Event::PlayerMoved {
            from: Some(TileIndex::new(0)),
            to: TileIndex::new(1),
        }]
    );

    let player = query::player_tile(&grid).expect("player placed");
    assert_eq!(player.index, TileIndex::new(1));
    assert_eq!(walkable_set(&grid), sorted_neighbors(&player));
    assert!(!walkable_set(&grid).contains(&TileIndex::new(1)));
    assert_eq!(player_count(&grid), 1);
}

#[test]
fn rejected_move_changes_nothing() {
    let mut grid = grid_with(4, 4, &[], 0);
    let _ = point_at(&mut grid, 15);
    let before = query::tiles(&grid);

    let events = move_player(&mut grid);

    assert_eq!(
        events,
        vec![Event::MoveRejected {
            target: Some(TileIndex::new(15)),
            reason: MoveError::NotWalkable,
        }]
    );
    assert_eq!(query::tiles(&grid), before);
}

#[test]
fn single_player_across_a_walk() {
    let mut grid = grid_with(5, 4, &[], 0);
    for step in [1, 7, 8, 12, 11, 17, 19, 13, 14] {
        let _ = point_at(&mut grid, step);
        let events = move_player(&mut grid);
        assert!(
            matches!(events.as_slice(), [Event::PlayerMoved { .. }]),
            "step to {step} produced {events:?}"
        );
        assert_eq!(player_count(&grid), 1);
    }
    assert_eq!(grid.player_index(), Some(TileIndex::new(14)));
}

#[test]
fn highlight_event_only_fires_on_change() {
    let mut grid = grid_with(4, 4, &[], 0);
    assert!(point_at(&mut grid, 0).is_empty());
    assert_eq!(point_at(&mut grid, 9).len(), 1);
    assert!(point_at(&mut grid, 9).is_empty());
}

#[test]
fn hit_testing_is_deterministic() {
    let mut first = grid_with(6, 5, &[], 0);
    let mut second = grid_with(6, 5, &[], 0);
    let offset = PixelPoint::new(40.0, 12.0);
    for pointer in [
        PixelPoint::new(-10.0, -10.0),
        PixelPoint::new(57.0, 33.0),
        PixelPoint::new(120.5, 80.25),
        PixelPoint::new(400.0, 400.0),
    ] {
        let a = first.update_highlight(pointer, offset);
        let b = second.update_highlight(pointer, offset);
        let again = first.update_highlight(pointer, offset);
        assert_eq!(a, b);
        assert_eq!(a, again);

        let tiles = query::tiles(&first);
        let nearest = tiles
            .iter()
            .map(|tile| pointer.distance_squared(tile.center + offset))
            .fold(f32::INFINITY, f32::min);
        let picked = tiles[a.expect("non-empty grid").get() as usize];
        assert_eq!(pointer.distance_squared(picked.center + offset), nearest);
    }
}

#[test]
fn building_is_idempotent() {
    let mut grid = grid_with(3, 3, &[(4, FOREST)], 0);
    build(&mut grid, 4);
    let after_first = query::tiles(&grid);

    let mut events = Vec::new();
    apply(
        &mut grid,
        Command::Build {
            tile: TileIndex::new(4),
        },
        &mut events,
    );
    assert_eq!(
        events,
        vec![Event::BuildRejected {
            tile: TileIndex::new(4),
            reason: BuildError::AlreadyBuilt,
        }]
    );
    assert_eq!(query::tiles(&grid), after_first);
    assert_eq!(
        query::tile(&grid, TileIndex::new(4)).map(|tile| tile.sprite),
        Some(SpriteIndex::FOREST_BUILDING)
    );
}

#[test]
fn road_is_idempotent() {
    let mut grid = grid_with(3, 3, &[], 0);
    road(&mut grid, 2);
    let after_first = query::tiles(&grid);

    let mut events = Vec::new();
    apply(
        &mut grid,
        Command::BuildRoad {
            tile: TileIndex::new(2),
        },
        &mut events,
    );
    assert_eq!(
        events,
        vec![Event::RoadRejected {
            tile: TileIndex::new(2),
            reason: BuildError::AlreadyHasRoad,
        }]
    );
    assert_eq!(query::tiles(&grid), after_first);
}

#[test]
fn building_sprite_tracks_terrain() {
    let mut grid = grid_with(4, 1, &[(1, BADLAND), (2, DESERT), (3, FOREST)], 0);
    for index in 0..4 {
        build(&mut grid, index);
        road(&mut grid, index);
    }
    let sprites: Vec<SpriteIndex> = query::tiles(&grid)
        .into_iter()
        .map(|tile| tile.sprite)
        .collect();
    assert_eq!(sprites, SpriteIndex::NETWORK_TARGETS.to_vec());
}

fn connected_network() -> HexGrid {
    let mut grid = grid_with(
        4,
        4,
        &[(2, GRASSLAND), (5, BADLAND), (9, DESERT), (14, FOREST)],
        0,
    );
    for index in [2, 5, 9, 14] {
        build(&mut grid, index);
    }
    for index in [0, 1, 2, 5, 6, 9, 10, 13, 14] {
        road(&mut grid, index);
    }
    grid
}

#[test]
fn connected_network_short_circuits() {
    let grid = connected_network();
    let report = query::road_network(&grid);
    assert!(report.covers_all_building_types);
    assert_eq!(report.visited, 8);

    let roads = query::tiles(&grid)
        .into_iter()
        .filter(|tile| tile.has_road)
        .count();
    assert!(report.visited < roads);
}

#[test]
fn buildings_without_roads_do_not_count() {
    let mut grid = grid_with(
        4,
        4,
        &[(2, GRASSLAND), (5, BADLAND), (9, DESERT), (14, FOREST)],
        0,
    );
    for index in [2, 5, 9, 14] {
        build(&mut grid, index);
    }
    for index in [0, 1, 6, 10, 13] {
        road(&mut grid, index);
    }
    assert!(!grid.road_network().covers_all_building_types);
}

#[test]
fn disconnected_networks_do_not_win() {
    let mut grid = grid_with(
        4,
        4,
        &[
            (0, GRASSLAND),
            (1, BADLAND),
            (2, DESERT),
            (12, BADLAND),
            (13, DESERT),
            (14, FOREST),
        ],
        5,
    );
    for index in [0, 1, 2, 12, 13, 14] {
        build(&mut grid, index);
        road(&mut grid, index);
    }

    let report = grid.road_network();
    assert!(!report.covers_all_building_types);
    assert_eq!(report.visited, 0);
}

#[test]
fn snapshot_round_trip_is_exact() {
    let mut source = connected_network();
    let _ = point_at(&mut source, 1);
    let _ = move_player(&mut source);
    let _ = point_at(&mut source, 11);
    let scores = ScoreBoard::from_array([3, 1, 2, 0]);
    let snapshot = source.to_snapshot(scores);

    let mut target = grid_with(4, 4, &[], 15);
    let restored = target.restore(&snapshot).expect("snapshot applies");

    assert_eq!(restored, scores);
    assert_eq!(query::tiles(&target), query::tiles(&source));
    assert_eq!(target.highlighted(), Some(TileIndex::new(11)));
    assert_eq!(target.player_index(), Some(TileIndex::new(1)));
    assert_eq!(target.to_snapshot(scores), snapshot);
}

#[test]
fn mismatched_snapshot_leaves_grid_untouched() {
    let source = grid_with(3, 3, &[], 0);
    let mut target = grid_with(4, 4, &[], 6);
    let before = query::tiles(&target);

    let error = target
        .restore(&source.to_snapshot(ScoreBoard::new()))
        .unwrap_err();
    assert!(matches!(error, SnapshotError::LayoutMismatch { .. }));

    let mut truncated = grid_with(4, 4, &[], 0).to_snapshot(ScoreBoard::new());
    let _ = truncated.walkable.pop();
    assert_eq!(
        target.restore(&truncated),
        Err(SnapshotError::FieldLength {
            field: "walkable",
            expected: 16,
            actual: 15,
        })
    );
    assert_eq!(query::tiles(&target), before);
}

#[test]
fn snapshot_highlight_edge_cases() {
    let source = grid_with(4, 4, &[], 0);
    let mut snapshot = source.to_snapshot(ScoreBoard::new());

    snapshot.highlighted = vec![false; 16];
    let mut target = grid_with(4, 4, &[], 0);
    let _ = target.restore(&snapshot).expect("snapshot applies");
    assert_eq!(target.highlighted(), None);

    snapshot.highlighted[9] = true;
    snapshot.highlighted[3] = true;
    let _ = target.restore(&snapshot).expect("snapshot applies");
    assert_eq!(target.highlighted(), Some(TileIndex::new(3)));
}

#[test]
fn snapshot_requires_a_single_player() {
    let source = grid_with(4, 4, &[], 0);
    let mut crowded = source.to_snapshot(ScoreBoard::new());
    crowded.has_player[7] = true;
    let mut empty = source.to_snapshot(ScoreBoard::new());
    empty.has_player[0] = false;

    let mut target = grid_with(4, 4, &[], 0);
    let before = target.to_snapshot(ScoreBoard::new());
    assert_eq!(
        target.restore(&crowded),
        Err(SnapshotError::PlayerCount { count: 2 })
    );
    assert_eq!(
        target.restore(&empty),
        Err(SnapshotError::PlayerCount { count: 0 })
    );
    assert_eq!(target.to_snapshot(ScoreBoard::new()), before);
}
