//! Priority-Flood depression filling with flow directions (Barnes et al. 2014)
//! and precipitation-weighted flow accumulation.
//!
//! On a closed sphere there is no boundary outlet; water tiles seed the flood.
//! A waterless planet falls back to its lowest tile.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::tile::{resolve, ClimateQuantity, ClimateView, RiverState, Tile};
use crate::world::PlanetConfig;

#[derive(Clone, Copy, Debug)]
struct HeapItem {
    height: f32,
    idx: usize,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapItem {}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Min-heap by height, ties broken by lower index, via reversed ordering.
impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .height
            .total_cmp(&self.height)
            .then_with(|| other.idx.cmp(&self.idx))
    }
}

/// Output of [`fill_and_route`].
#[derive(Debug, Clone, PartialEq)]
pub struct Routing {
    /// Depression-filled elevation (m).
    pub filled: Vec<f32>,
    /// Receiver of each tile; `None` for outlets.
    pub downstream: Vec<Option<usize>>,
    /// Tiles in the order the flood reached them. Every tile appears after
    /// its receiver.
    pub order: Vec<usize>,
}

/// Fills depressions and assigns each tile the neighbor it drains into.
pub fn fill_and_route(tiles: &[Tile]) -> Routing {
    let total = tiles.len();
    let mut filled: Vec<f32> = tiles.iter().map(|t| t.elevation_m).collect();
    let mut downstream = vec![None; total];
    let mut visited = vec![false; total];
    let mut order = Vec::with_capacity(total);
    let mut heap = BinaryHeap::new();

    for (idx, t) in tiles.iter().enumerate() {
        if t.surface.is_water() {
            visited[idx] = true;
            heap.push(HeapItem {
                height: filled[idx],
                idx,
            });
        }
    }

    // Nothing drains to water: the global minimum becomes the outlet.
    if heap.is_empty() {
        if let Some((idx, &height)) = filled
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1).then(a.0.cmp(&b.0)))
        {
            visited[idx] = true;
            heap.push(HeapItem { height, idx });
        }
    }

    while let Some(HeapItem { height: h_cur, idx }) = heap.pop() {
        order.push(idx);
        for &n in tiles[idx].neighbors() {
            if visited[n] {
                continue;
            }
            visited[n] = true;
            downstream[n] = Some(idx);
            let new_h = filled[n].max(h_cur);
            filled[n] = new_h;
            heap.push(HeapItem {
                height: new_h,
                idx: n,
            });
        }
    }

    // Tiles unreachable from any outlet (disconnected mesh pieces) drain nowhere.
    for (idx, seen) in visited.iter().enumerate() {
        if !seen {
            order.push(idx);
        }
    }

    Routing {
        filled,
        downstream,
        order,
    }
}

/// Routes rivers and writes `river` on every tile. Land tiles contribute
/// their annual precipitation; a land tile is a river once its accumulated
/// flow reaches `threshold_mm`. Returns the number of river tiles.
pub fn route_rivers(tiles: &mut [Tile], planet: &PlanetConfig, threshold_mm: f32) -> usize {
    let routing = fill_and_route(tiles);

    let mut flow: Vec<f32> = tiles
        .iter()
        .map(|t| {
            if t.surface.is_land() {
                resolve(t, ClimateQuantity::Precipitation, ClimateView::Inter, planet)
                    .value
                    .max(0.0)
            } else {
                0.0
            }
        })
        .collect();

    for &idx in routing.order.iter().rev() {
        if let Some(down) = routing.downstream[idx] {
            flow[down] += flow[idx];
        }
    }

    let mut rivers = 0;
    for (idx, t) in tiles.iter_mut().enumerate() {
        let is_river = t.surface.is_land() && flow[idx] >= threshold_mm;
        rivers += usize::from(is_river);
        t.river = RiverState {
            downstream: routing.downstream[idx],
            flow: flow[idx],
            is_river,
        };
    }
    rivers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::SurfaceType;

    fn chain(heights: &[f32]) -> Vec<Tile> {
        let n = heights.len();
        let mut tiles: Vec<Tile> = heights
            .iter()
            .enumerate()
            .map(|(i, &h)| {
                let mut t = Tile::new(i, 0.0, i as f32);
                t.elevation_m = h;
                t.surface = SurfaceType::Plains;
                t
            })
            .collect();
        for i in 0..n {
            let mut nb = Vec::new();
            if i > 0 {
                nb.push(i - 1);
            }
            if i + 1 < n {
                nb.push(i + 1);
            }
            tiles[i].set_neighbors(nb);
        }
        tiles
    }

    #[test]
    fn depression_is_filled_to_its_rim() {
        let mut tiles = chain(&[-10.0, 50.0, 20.0, 80.0]);
        tiles[0].surface = SurfaceType::Ocean;
        let routing = fill_and_route(&tiles);
        assert_eq!(routing.filled[2], 50.0);
        assert_eq!(routing.downstream[0], None);
        assert_eq!(routing.downstream[1], Some(0));
        assert_eq!(routing.downstream[2], Some(1));
        assert_eq!(routing.downstream[3], Some(2));
        assert_eq!(routing.order.len(), 4);
    }

    #[test]
    fn flow_accumulates_downstream() {
        let mut tiles = chain(&[-10.0, 100.0, 200.0, 300.0]);
        tiles[0].surface = SurfaceType::Ocean;
        for t in &mut tiles {
            t.climate.precipitation_mm = Some(1000.0);
        }
        let planet = PlanetConfig::earth_like();
        let rivers = route_rivers(&mut tiles, &planet, 2500.0);
        assert_eq!(tiles[3].river.flow, 1000.0);
        assert_eq!(tiles[1].river.flow, 3000.0);
        assert_eq!(tiles[0].river.flow, 3000.0);
        assert!(tiles[1].river.is_river);
        assert!(!tiles[0].river.is_river);
        assert!(!tiles[2].river.is_river);
        assert_eq!(rivers, 1);
    }

    #[test]
    fn dry_planet_drains_to_lowest_tile() {
        let tiles = chain(&[30.0, 10.0, 40.0]);
        let routing = fill_and_route(&tiles);
        assert_eq!(routing.order[0], 1);
        assert_eq!(routing.downstream[1], None);
        assert_eq!(routing.downstream[0], Some(1));
        assert_eq!(routing.downstream[2], Some(1));
    }
}
