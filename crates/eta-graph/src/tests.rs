//! Unit tests for eta-graph.
//!
//! All tests use hand-crafted graphs so they run without any map data.

#[cfg(test)]
mod helpers {
    use eta_core::{GeoPoint, NodeId};

    use crate::{RawEdge, RoadGraph, RoadGraphBuilder};

    /// Small two-way grid, not yet weighted.
    ///
    /// Nodes (id: lon, lat):
    ///   10:(0,0)  11:(0.01,0)  12:(0.02,0)
    ///   13:(0,0.01)            14:(0.02,0.01)
    ///
    /// Two-way roads: 10-11 primary 1000 m, 11-12 primary 1000 m,
    /// 12-14 primary 1000 m, 10-13 service 500 m, 13-14 service 2000 m.
    pub fn grid_graph() -> RoadGraph {
        let mut b = RoadGraphBuilder::new();
        let pts = [
            (10, 0.0, 0.0),
            (11, 0.01, 0.0),
            (12, 0.02, 0.0),
            (13, 0.0, 0.01),
            (14, 0.02, 0.01),
        ];
        for (id, lon, lat) in pts {
            b.add_node(NodeId(id), Some(GeoPoint::new(lon, lat))).unwrap();
        }
        b.add_road(NodeId(10), NodeId(11), "primary", 1_000.0).unwrap();
        b.add_road(NodeId(11), NodeId(12), "primary", 1_000.0).unwrap();
        b.add_road(NodeId(12), NodeId(14), "primary", 1_000.0).unwrap();
        b.add_road(NodeId(10), NodeId(13), "service", 500.0).unwrap();
        b.add_road(NodeId(13), NodeId(14), "service", 2_000.0).unwrap();
        b.build()
    }

    /// Two nodes joined by three parallel one-way edges 1 → 2.
    pub fn parallel_graph() -> RoadGraph {
        let mut b = RoadGraphBuilder::new();
        b.add_node(NodeId(1), Some(GeoPoint::new(0.0, 0.0))).unwrap();
        b.add_node(NodeId(2), Some(GeoPoint::new(0.01, 0.0))).unwrap();
        b.add_edge(RawEdge::new(NodeId(1), NodeId(2), "service", 900.0)).unwrap();
        b.add_edge(RawEdge::new(NodeId(1), NodeId(2), "motorway", 1_200.0).with_key(1)).unwrap();
        b.add_edge(RawEdge::new(NodeId(1), NodeId(2), "footway", 400.0).with_key(2)).unwrap();
        b.build()
    }

    pub fn speeds() -> [f64; 5] {
        [49.0, 37.0, 26.0, 16.0, 5.0]
    }
}

// ── Builder & graph structure ─────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use eta_core::{GeoPoint, NodeId};

    use crate::{GraphError, RawEdge, RoadGraphBuilder};

    #[test]
    fn empty_build() {
        let g = RoadGraphBuilder::new().build();
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.edge_count(), 0);
        assert!(g.is_empty());
        assert!(g.is_consistent());
    }

    #[test]
    fn csr_degrees() {
        let g = super::helpers::grid_graph();
        assert_eq!(g.edge_count(), 10);
        let ix = |id| g.node_ix(NodeId(id)).unwrap();
        assert_eq!(g.out_degree(ix(10)), 2);
        assert_eq!(g.out_degree(ix(11)), 2);
        assert_eq!(g.out_degree(ix(14)), 2);
        for e in g.out_edges(ix(12)) {
            assert_eq!(g.edge_from[e.index()], ix(12));
        }
    }

    #[test]
    fn duplicate_node_rejected() {
        let mut b = RoadGraphBuilder::new();
        b.add_node(NodeId(7), None).unwrap();
        assert!(matches!(b.add_node(NodeId(7), None), Err(GraphError::DuplicateNode(NodeId(7)))));
    }

    #[test]
    fn edge_to_unknown_node_rejected() {
        let mut b = RoadGraphBuilder::new();
        b.add_node(NodeId(1), None).unwrap();
        let r = b.add_edge(RawEdge::new(NodeId(1), NodeId(99), "residential", 10.0));
        assert!(matches!(r, Err(GraphError::UnknownNode(NodeId(99)))));
    }

    #[test]
    fn parallel_edges_keep_supplier_order() {
        let g = super::helpers::parallel_graph();
        let u = g.node_ix(NodeId(1)).unwrap();
        let v = g.node_ix(NodeId(2)).unwrap();
        let keys: Vec<u32> = g.edges_between(u, v).map(|e| g.edge_key[e.index()]).collect();
        assert_eq!(keys, [0, 1, 2]);
        assert_eq!(g.edges_between(v, u).count(), 0);
    }

    #[test]
    fn edges_start_unweighted() {
        let g = super::helpers::grid_graph();
        assert!(g.edge_travel_min.iter().all(Option::is_none));
        assert!(g.edge_speed_mm.iter().all(Option::is_none));
    }

    #[test]
    fn node_without_coordinates_is_kept() {
        let mut b = RoadGraphBuilder::new();
        let ix = b.add_node(NodeId(5), None).unwrap();
        b.add_node(NodeId(6), Some(GeoPoint::new(1.0, 1.0))).unwrap();
        let g = b.build();
        assert_eq!(g.node_pos(ix), None);
        assert_eq!(g.node_id(ix), NodeId(5));
    }
}

// ── Speed model ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod speed {
    use approx::assert_relative_eq;
    use eta_core::{GeoPoint, NodeId};

    use crate::{kmh_to_mm, GraphError, RawEdge, RoadGraphBuilder, RoadTier, SpeedProfile};

    #[test]
    fn kmh_conversion_rounds_to_two_places() {
        assert_eq!(kmh_to_mm(30.0), 500.0);
        assert_eq!(kmh_to_mm(26.0), 433.33);
        assert_eq!(kmh_to_mm(49.0), 816.67);
        assert_eq!(kmh_to_mm(5.0), 83.33);
    }

    #[test]
    fn tier_table() {
        assert_eq!(RoadTier::of_tag("motorway_link"), RoadTier::Arterial);
        assert_eq!(RoadTier::of_tag("unclassified"), RoadTier::District);
        assert_eq!(RoadTier::of_tag("living_street"), RoadTier::Local);
        assert_eq!(RoadTier::of_tag("track"), RoadTier::Service);
        assert_eq!(RoadTier::of_tag("corridor"), RoadTier::Pedestrian);
        assert_eq!(RoadTier::of_tag("busway"), RoadTier::Pedestrian);
        assert_eq!(RoadTier::Arterial.number(), 1);
        assert_eq!(RoadTier::Pedestrian.number(), 5);
    }

    #[test]
    fn profile_must_have_five_tiers() {
        for bad in [&[40.0; 4][..], &[40.0; 6][..], &[][..]] {
            assert!(matches!(SpeedProfile::from_kmh(bad), Err(GraphError::InvalidProfile(_))));
        }
    }

    #[test]
    fn profile_rejects_non_positive_or_nan() {
        assert!(SpeedProfile::from_kmh(&[49.0, 37.0, -1.0, 16.0, 5.0]).is_err());
        assert!(SpeedProfile::from_kmh(&[49.0, f64::NAN, 26.0, 16.0, 5.0]).is_err());
        assert!(SpeedProfile::from_kmh(&[49.0, 37.0, 26.0, 16.0, f64::INFINITY]).is_err());
    }

    #[test]
    fn multi_tag_edge_uses_mean_tier_speed() {
        let p = SpeedProfile::from_mm(&[100.0, 80.0, 60.0, 40.0, 20.0]).unwrap();
        assert_eq!(p.speed_for_tags(&["trunk", "residential"]), 80.0);
        assert_eq!(p.speed_for_tags(&["unknown"]), 20.0);
        assert_eq!(p.speed_for_tags::<&str>(&[]), 20.0);
    }

    #[test]
    fn travel_time_is_length_over_speed() {
        let mut g = super::helpers::grid_graph();
        g.apply_speeds_kmh(&super::helpers::speeds()).unwrap();
        for e in 0..g.edge_count() {
            let len = g.edge_length_m[e].unwrap();
            let speed = g.edge_speed_mm[e].unwrap();
            assert_relative_eq!(g.edge_travel_min[e].unwrap(), len / speed);
        }
    }

    #[test]
    fn thirty_kmh_kilometre_takes_two_minutes() {
        let mut b = RoadGraphBuilder::new();
        b.add_node(NodeId(1), Some(GeoPoint::new(0.0, 0.0))).unwrap();
        b.add_node(NodeId(2), Some(GeoPoint::new(0.0, 0.01))).unwrap();
        b.add_edge(RawEdge::new(NodeId(1), NodeId(2), "tertiary", 1_000.0)).unwrap();
        let mut g = b.build();
        g.apply_speeds_kmh(&[60.0, 45.0, 30.0, 20.0, 5.0]).unwrap();
        assert_eq!(g.edge_travel_min[0], Some(2.0));
    }

    #[test]
    fn missing_or_zero_length_is_untraversable() {
        let mut b = RoadGraphBuilder::new();
        b.add_node(NodeId(1), None).unwrap();
        b.add_node(NodeId(2), None).unwrap();
        b.add_edge(RawEdge::new(NodeId(1), NodeId(2), "primary", 0.0)).unwrap();
        b.add_edge(RawEdge { length_m: None, ..RawEdge::new(NodeId(2), NodeId(1), "primary", 1.0) })
            .unwrap();
        b.add_edge(RawEdge::new(NodeId(1), NodeId(2), "primary", f64::NAN).with_key(1)).unwrap();
        let mut g = b.build();
        g.apply_speeds_kmh(&super::helpers::speeds()).unwrap();
        assert!(g.edge_travel_min.iter().all(Option::is_none));
        assert!(g.edge_speed_mm.iter().all(Option::is_some));
    }

    #[test]
    fn simplified_graph_is_still_weighted() {
        let mut b = RoadGraphBuilder::new();
        b.add_node(NodeId(1), None).unwrap();
        b.add_node(NodeId(2), None).unwrap();
        b.add_edge(RawEdge::new(NodeId(1), NodeId(2), "service", 100.0)).unwrap();
        b.mark_simplified();
        let mut g = b.build();
        assert!(g.is_simplified());
        g.apply_speeds_kmh(&super::helpers::speeds()).unwrap();
        assert!(g.edge_travel_min[0].is_some());
    }
}

// ── Nearest-node resolution ───────────────────────────────────────────────────

#[cfg(test)]
mod locator {
    use eta_core::{GeoPoint, NodeId};

    use crate::{nearest_node, NodeLocator, RoadGraphBuilder};

    #[test]
    fn exact_position_snaps_to_node() {
        let g = super::helpers::grid_graph();
        let loc = NodeLocator::new(&g);
        assert_eq!(loc.len(), 5);
        assert_eq!(loc.nearest(GeoPoint::new(0.02, 0.01)), Some(NodeId(14)));
        assert_eq!(nearest_node(&g, 0.02, 0.01), Some(NodeId(14)));
    }

    #[test]
    fn nearest_between_nodes() {
        let g = super::helpers::grid_graph();
        let loc = NodeLocator::new(&g);
        assert_eq!(loc.nearest(GeoPoint::new(0.004, 0.0)), Some(NodeId(10)));
        assert_eq!(loc.nearest(GeoPoint::new(0.006, 0.0)), Some(NodeId(11)));
    }

    #[test]
    fn empty_graph_returns_none() {
        let g = RoadGraphBuilder::new().build();
        assert!(NodeLocator::new(&g).nearest(GeoPoint::new(0.0, 0.0)).is_none());
        assert!(nearest_node(&g, 0.0, 0.0).is_none());
    }

    #[test]
    fn nodes_without_coordinates_are_ignored() {
        let mut b = RoadGraphBuilder::new();
        b.add_node(NodeId(1), None).unwrap();
        b.add_node(NodeId(2), Some(GeoPoint::new(f64::NAN, 0.0))).unwrap();
        let g = b.build();
        let loc = NodeLocator::new(&g);
        assert!(loc.is_empty());
        assert!(loc.nearest(GeoPoint::new(0.0, 0.0)).is_none());
        assert!(nearest_node(&g, 0.0, 0.0).is_none());
    }

    #[test]
    fn exact_tie_resolves_to_lowest_id() {
        // Three nodes at the same spot, inserted highest id first.
        let mut b = RoadGraphBuilder::new();
        for id in [30, 10, 20] {
            b.add_node(NodeId(id), Some(GeoPoint::new(12.5, 41.9))).unwrap();
        }
        let g = b.build();
        let q = GeoPoint::new(12.6, 41.8);
        assert_eq!(NodeLocator::new(&g).nearest(q), Some(NodeId(10)));
        assert_eq!(nearest_node(&g, q.lon, q.lat), Some(NodeId(10)));
    }

    #[test]
    fn symmetric_tie_resolves_to_lowest_id() {
        // Query on the meridian halfway between two mirror-image nodes.
        let mut b = RoadGraphBuilder::new();
        b.add_node(NodeId(9), Some(GeoPoint::new(0.5, 10.0))).unwrap();
        b.add_node(NodeId(4), Some(GeoPoint::new(-0.5, 10.0))).unwrap();
        let g = b.build();
        assert_eq!(NodeLocator::new(&g).nearest(GeoPoint::new(0.0, 10.0)), Some(NodeId(4)));
        assert_eq!(nearest_node(&g, 0.0, 10.0), Some(NodeId(4)));
    }

    #[test]
    fn haversine_not_planar_at_high_latitude() {
        // At 70°N one degree of longitude is ~38 km but one degree of
        // latitude is ~111 km: the planar-nearest node is the wrong answer.
        let mut b = RoadGraphBuilder::new();
        b.add_node(NodeId(1), Some(GeoPoint::new(25.0, 70.6))).unwrap(); // 0.6° lat away
        b.add_node(NodeId(2), Some(GeoPoint::new(25.9, 70.0))).unwrap(); // 0.9° lon away
        let g = b.build();
        let q = GeoPoint::new(25.0, 70.0);
        assert_eq!(NodeLocator::new(&g).nearest(q), Some(NodeId(2)));
        assert_eq!(nearest_node(&g, q.lon, q.lat), Some(NodeId(2)));
    }
}

#[cfg(test)]
mod locator_props {
    use eta_core::{GeoPoint, NodeId};
    use proptest::prelude::*;

    use crate::{nearest_node, NodeLocator, RoadGraphBuilder};

    fn coords() -> impl Strategy<Value = Vec<(f64, f64)>> {
        prop::collection::vec((-0.5f64..0.5, 44.5f64..45.5), 1..60)
    }

    proptest! {
        #[test]
        fn locator_is_never_farther_than_any_node(
            nodes in coords(),
            q_lon in -0.5f64..0.5,
            q_lat in 44.5f64..45.5,
        ) {
            let mut b = RoadGraphBuilder::new();
            for (i, (lon, lat)) in nodes.iter().enumerate() {
                b.add_node(NodeId(i as i64), Some(GeoPoint::new(*lon, *lat))).unwrap();
            }
            let g = b.build();
            let q = GeoPoint::new(q_lon, q_lat);

            let found = NodeLocator::new(&g).nearest(q).unwrap();
            let found_m = q.distance_m(g.node_pos(g.node_ix(found).unwrap()).unwrap());
            for pos in g.node_pos.iter().flatten() {
                prop_assert!(found_m <= q.distance_m(*pos) + 1e-6);
            }

            let oracle = nearest_node(&g, q_lon, q_lat).unwrap();
            let oracle_m = q.distance_m(g.node_pos(g.node_ix(oracle).unwrap()).unwrap());
            prop_assert!((found_m - oracle_m).abs() < 1e-6);
        }

        #[test]
        fn lookups_are_deterministic(nodes in coords(), q_lon in -0.5f64..0.5, q_lat in 44.5f64..45.5) {
            let mut b = RoadGraphBuilder::new();
            for (i, (lon, lat)) in nodes.iter().enumerate() {
                b.add_node(NodeId(i as i64), Some(GeoPoint::new(*lon, *lat))).unwrap();
            }
            let g = b.build();
            let q = GeoPoint::new(q_lon, q_lat);
            prop_assert_eq!(NodeLocator::new(&g).nearest(q), NodeLocator::new(&g).nearest(q));
            prop_assert_eq!(nearest_node(&g, q_lon, q_lat), nearest_node(&g, q_lon, q_lat));
        }
    }
}

// ── Dijkstra routing ──────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use approx::assert_relative_eq;
    use eta_core::{GeoPoint, NodeId};

    use crate::{kmh_to_mm, DijkstraRouter, GraphError, RawEdge, RoadGraphBuilder, Router};

    #[test]
    fn one_to_all_times() {
        let mut g = super::helpers::grid_graph();
        g.apply_speeds_kmh(&super::helpers::speeds()).unwrap();
        let src = g.node_ix(NodeId(10)).unwrap();
        let tree = DijkstraRouter.shortest_tree(&g, src);

        let primary = kmh_to_mm(37.0);
        let service = kmh_to_mm(16.0);
        let t = |id| tree.time_to(g.node_ix(NodeId(id)).unwrap()).unwrap();

        assert_eq!(t(10), 0.0);
        assert_relative_eq!(t(11), 1_000.0 / primary);
        assert_relative_eq!(t(13), 500.0 / service);
        // 10→11→12→14 (3 km primary) beats 10→13→14 (2.5 km service).
        assert_relative_eq!(t(14), 3.0 * (1_000.0 / primary));
        assert_eq!(tree.reached().count(), 5);
    }

    #[test]
    fn route_follows_fastest_path() {
        let mut g = super::helpers::grid_graph();
        g.apply_speeds_kmh(&super::helpers::speeds()).unwrap();
        let path = DijkstraRouter.route(&g, NodeId(10), NodeId(14)).unwrap();
        assert_eq!(path, [NodeId(10), NodeId(11), NodeId(12), NodeId(14)]);
    }

    #[test]
    fn trivial_route() {
        let mut g = super::helpers::grid_graph();
        g.apply_speeds_kmh(&super::helpers::speeds()).unwrap();
        assert_eq!(DijkstraRouter.route(&g, NodeId(12), NodeId(12)).unwrap(), [NodeId(12)]);
    }

    #[test]
    fn one_way_blocks_return() {
        let mut b = RoadGraphBuilder::new();
        b.add_node(NodeId(1), Some(GeoPoint::new(0.0, 0.0))).unwrap();
        b.add_node(NodeId(2), Some(GeoPoint::new(0.0, 0.01))).unwrap();
        b.add_edge(RawEdge::new(NodeId(1), NodeId(2), "residential", 300.0)).unwrap();
        let mut g = b.build();
        g.apply_speeds_kmh(&super::helpers::speeds()).unwrap();

        assert!(DijkstraRouter.route(&g, NodeId(1), NodeId(2)).is_ok());
        assert!(matches!(
            DijkstraRouter.route(&g, NodeId(2), NodeId(1)),
            Err(GraphError::NoRoute { .. })
        ));
        let tree = DijkstraRouter.shortest_tree(&g, g.node_ix(NodeId(2)).unwrap());
        assert!(tree.time_to(g.node_ix(NodeId(1)).unwrap()).is_none());
    }

    #[test]
    fn unweighted_graph_reaches_only_source() {
        let g = super::helpers::grid_graph();
        let tree = DijkstraRouter.shortest_tree(&g, g.node_ix(NodeId(10)).unwrap());
        assert_eq!(tree.reached().count(), 1);
    }

    #[test]
    fn unknown_endpoint() {
        let g = super::helpers::grid_graph();
        assert!(matches!(
            DijkstraRouter.route(&g, NodeId(10), NodeId(999)),
            Err(GraphError::UnknownNode(NodeId(999)))
        ));
    }

    #[test]
    fn cheapest_parallel_edge_is_relaxed() {
        let mut g = super::helpers::parallel_graph();
        g.apply_speeds_kmh(&super::helpers::speeds()).unwrap();
        let tree = DijkstraRouter.shortest_tree(&g, g.node_ix(NodeId(1)).unwrap());
        // service 900 m @16 km/h = 3.37 min, motorway 1200 m @49 = 1.47,
        // footway 400 m @5 = 4.8.
        assert_relative_eq!(
            tree.time_to(g.node_ix(NodeId(2)).unwrap()).unwrap(),
            1_200.0 / kmh_to_mm(49.0)
        );
    }
}

// ── Route reconstruction ──────────────────────────────────────────────────────

#[cfg(test)]
mod route {
    use approx::assert_relative_eq;
    use eta_core::{GeoPoint, NodeId};

    use crate::{kmh_to_mm, reconstruct_route, GraphError, RawEdge, RoadGraphBuilder};

    #[test]
    fn picks_fastest_parallel_edge() {
        let mut g = super::helpers::parallel_graph();
        g.apply_speeds_kmh(&super::helpers::speeds()).unwrap();
        let r = reconstruct_route(&g, &[NodeId(1), NodeId(2)]).unwrap();
        assert_relative_eq!(r.travel_time_min, 1_200.0 / kmh_to_mm(49.0));
        assert_eq!(r.length_m, 1_200.0);
        assert_eq!(r.coords.len(), 2);
        assert!(r.is_drawable());
        assert_eq!(r.length_km(), 1.2);
    }

    #[test]
    fn untimed_hop_falls_back_to_first_edge() {
        let mut g = super::helpers::parallel_graph();
        // Never weighted: no edge has a travel time.
        let r = reconstruct_route(&g, &[NodeId(1), NodeId(2)]).unwrap();
        assert_eq!(r.travel_time_min, 0.0);
        assert_eq!(r.length_m, 900.0);

        g.edge_length_m[0] = None;
        let r = reconstruct_route(&g, &[NodeId(1), NodeId(2)]).unwrap();
        assert_eq!(r.length_m, 0.0);
    }

    #[test]
    fn sums_multi_hop_route() {
        let mut g = super::helpers::grid_graph();
        g.apply_speeds_kmh(&super::helpers::speeds()).unwrap();
        let r = reconstruct_route(&g, &[NodeId(10), NodeId(11), NodeId(12), NodeId(14)]).unwrap();
        assert_eq!(r.length_m, 3_000.0);
        assert_relative_eq!(r.travel_time_min, 3_000.0 / kmh_to_mm(37.0), epsilon = 1e-9);
        assert_eq!(r.coords.first(), Some(&GeoPoint::new(0.0, 0.0)));
        assert_eq!(r.coords.last(), Some(&GeoPoint::new(0.02, 0.01)));
    }

    #[test]
    fn nodes_without_coordinates_are_left_out_of_geometry() {
        let mut b = RoadGraphBuilder::new();
        b.add_node(NodeId(1), Some(GeoPoint::new(0.0, 0.0))).unwrap();
        b.add_node(NodeId(2), None).unwrap();
        b.add_edge(RawEdge::new(NodeId(1), NodeId(2), "residential", 100.0)).unwrap();
        let mut g = b.build();
        g.apply_speeds_kmh(&super::helpers::speeds()).unwrap();
        let r = reconstruct_route(&g, &[NodeId(1), NodeId(2)]).unwrap();
        assert_eq!(r.coords.len(), 1);
        assert!(!r.is_drawable());
        assert!(r.travel_time_min > 0.0);
    }

    #[test]
    fn unknown_node_is_an_error() {
        let g = super::helpers::grid_graph();
        assert!(matches!(
            reconstruct_route(&g, &[NodeId(10), NodeId(77)]),
            Err(GraphError::UnknownNode(NodeId(77)))
        ));
    }
}

// ── Graph cache ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod cache {
    use eta_core::Extent;
    use tempfile::TempDir;

    use crate::{CacheKey, GraphCache};

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn extent() -> Extent {
        Extent { min_lon: 37.5, min_lat: 55.6, max_lon: 37.8, max_lat: 55.9 }
    }

    #[test]
    fn put_then_get_round_trips() {
        let dir = tmp();
        let cache = GraphCache::new(dir.path().join("graphs"));
        let mut g = super::helpers::grid_graph();
        g.apply_speeds_kmh(&super::helpers::speeds()).unwrap();

        let key = CacheKey::new(&extent(), 500.0);
        assert!(cache.get(key).is_none());
        assert!(cache.put(key, &g));
        assert!(cache.path_for(key).exists());
        assert_eq!(cache.get(key), Some(g));
    }

    #[test]
    fn last_writer_wins() {
        let dir = tmp();
        let cache = GraphCache::new(dir.path());
        let key = CacheKey::new(&extent(), 500.0);
        assert!(cache.put(key, &super::helpers::grid_graph()));
        assert!(cache.put(key, &super::helpers::parallel_graph()));
        assert_eq!(cache.get(key), Some(super::helpers::parallel_graph()));
    }

    #[test]
    fn corrupt_entry_is_a_miss() {
        let dir = tmp();
        let cache = GraphCache::new(dir.path());
        let key = CacheKey::new(&extent(), 500.0);
        std::fs::write(cache.path_for(key), b"not a graph").unwrap();
        assert!(cache.get(key).is_none());
    }

    #[test]
    fn entry_with_dangling_edge_source_is_a_miss() {
        let dir = tmp();
        let cache = GraphCache::new(dir.path());
        let key = CacheKey::new(&extent(), 500.0);
        let mut g = super::helpers::grid_graph();
        assert!(g.is_consistent());
        g.edge_from[0] = eta_core::NodeIx(u32::try_from(g.node_count()).unwrap() + 7);
        assert!(!g.is_consistent());

        assert!(cache.put(key, &g));
        assert!(cache.get(key).is_none());
    }

    #[test]
    fn unwritable_directory_reports_false() {
        let dir = tmp();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        // A regular file where the cache directory should be.
        let cache = GraphCache::new(&blocker);
        let key = CacheKey::new(&extent(), 500.0);
        assert!(!cache.put(key, &super::helpers::grid_graph()));
        assert!(cache.get(key).is_none());
    }

    #[test]
    fn key_depends_on_extent_and_buffer() {
        let a = CacheKey::new(&extent(), 500.0);
        assert_eq!(a, CacheKey::new(&extent(), 500.0));
        assert_ne!(a, CacheKey::new(&extent(), 600.0));
        let shifted = Extent { min_lon: 37.6, ..extent() };
        assert_ne!(a, CacheKey::new(&shifted, 500.0));
        // Differences below the key precision collapse.
        let jitter = Extent { min_lon: 37.5 + 1e-9, ..extent() };
        assert_eq!(a, CacheKey::new(&jitter, 500.0));
        assert_eq!(a.file_name().len(), 16 + 4);
    }
}

// ── Graph source ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod source {
    use eta_core::Extent;

    use crate::{GraphResult, GraphSource, RoadGraph, StaticGraphSource};

    fn extent() -> Extent {
        Extent { min_lon: 0.0, min_lat: 0.0, max_lon: 1.0, max_lat: 1.0 }
    }

    #[test]
    fn static_source_clones_graph() {
        let g = super::helpers::grid_graph();
        let src = StaticGraphSource::new(g.clone());
        assert_eq!(src.load(&extent(), 500.0).unwrap(), g);
    }

    #[test]
    fn closures_are_sources() {
        let src = |_: &Extent, buffer: f64| -> GraphResult<RoadGraph> {
            assert_eq!(buffer, 250.0);
            Ok(RoadGraph::empty())
        };
        assert!(src.load(&extent(), 250.0).unwrap().is_empty());
    }
}
