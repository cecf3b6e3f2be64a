//! Breadth-first survey of road networks used for the win condition.

use std::collections::VecDeque;

use loaf_core::{RoadNetworkReport, SpriteIndex};

use crate::Tile;

/// Searches every connected road component for one that reaches a
/// building-on-road of each terrain.
///
/// Components are explored in ascending order of their lowest road tile. Tiles
/// are marked visited when enqueued, and traversal only follows neighbour
/// slots that also carry a road. The search stops as soon as a component has
/// collected all four building variants and reports how many road tiles had
/// been dequeued at that point, including the completing tile.
pub(crate) fn survey(tiles: &[Tile]) -> RoadNetworkReport {
    let mut visited = vec![false; tiles.len()];
    let mut queue = VecDeque::new();

    for (start, tile) in tiles.iter().enumerate() {
        if !tile.has_road || visited[start] {
            continue;
        }

        visited[start] = true;
        queue.clear();
        queue.push_back(start);

        let mut found = [false; SpriteIndex::NETWORK_TARGETS.len()];
        let mut processed = 0;

        while let Some(slot) = queue.pop_front() {
            let Some(current) = tiles.get(slot) else {
                continue;
            };
            processed += 1;

            if current.has_road && current.has_building {
                if let Some(position) = SpriteIndex::NETWORK_TARGETS
                    .iter()
                    .position(|target| *target == current.sprite)
                {
                    found[position] = true;
                }

                if found.iter().all(|flag| *flag) {
                    return RoadNetworkReport {
                        covers_all_building_types: true,
                        visited: processed,
                    };
                }
            }

            for neighbor in current.neighbors.into_iter().flatten() {
                let next = neighbor.slot();
                let Some(candidate) = tiles.get(next) else {
                    continue;
                };

                if !candidate.has_road || visited[next] {
                    continue;
                }

                visited[next] = true;
                queue.push_back(next);
            }
        }
    }

    RoadNetworkReport::default()
}
