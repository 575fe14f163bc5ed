//! Voronoi 图测试

#[cfg(test)]
mod tests {
    use super::super::point::Point;
    use super::super::predicates::circumcenter;
    use super::super::triangulation::triangulate;
    use super::super::utils::convex_hull_size;
    use super::super::voronoi::{compute_voronoi, RegionKind, VoronoiDiagram};
    use crate::error::EngineError;
    use approx::assert_relative_eq;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use std::collections::{BTreeMap, BTreeSet};
    use std::f64::consts::PI;

    fn generate_random_points(seed: u64, n: usize, size: f64) -> Vec<Point> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..n)
            .map(|_| Point::new(rng.random_range(0.0..size), rng.random_range(0.0..size)))
            .collect()
    }

    /// 两圈点加一个中心点：外圈 12 个在凸包上，其余 7 个在内部
    fn flower_points() -> Vec<Point> {
        let center = Point::new(200.0, 200.0);
        let outer = (0..12).map(|i| {
            let angle = i as f64 * PI / 6.0;
            let r = 100.0 + (i % 3) as f64 * 2.1;
            center + Point::new(angle.cos(), angle.sin()) * r
        });
        let inner = (0..6).map(|i| {
            let angle = i as f64 * PI / 3.0 + 0.3;
            let r = 45.0 + i as f64 * 2.5;
            center + Point::new(angle.cos(), angle.sin()) * r
        });
        outer
            .chain(inner)
            .chain(std::iter::once(Point::new(203.0, 198.0)))
            .collect()
    }

    fn diagram_for(points: &[Point]) -> (Vec<[usize; 3]>, VoronoiDiagram) {
        let triangles = triangulate(points).real_triangles();
        let diagram = compute_voronoi(&triangles, points).unwrap();
        (triangles, diagram)
    }

    fn signed_area(polygon: &[Point]) -> f64 {
        let n = polygon.len();
        (0..n)
            .map(|i| {
                let a = polygon[i];
                let b = polygon[(i + 1) % n];
                a.x * b.y - b.x * a.y
            })
            .sum::<f64>()
            / 2.0
    }

    #[test]
    fn test_empty_input() {
        let diagram = compute_voronoi(&[], &[]).unwrap();
        assert_eq!(diagram.vertex_count(), 0);
        assert_eq!(diagram.edge_count(), 0);
        assert!(diagram.regions.is_empty());
        assert!(diagram.region_polygons().is_empty());

        let (vertices, indices) = diagram.get_render_data();
        assert!(vertices.is_empty());
        assert!(indices.is_empty());
    }

    #[test]
    fn test_single_triangle() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(5.0, 8.66),
        ];
        let (_, diagram) = diagram_for(&points);

        assert_eq!(diagram.vertex_count(), 1);
        assert_eq!(diagram.edge_count(), 0);
        assert_eq!(diagram.regions.len(), 3);
        assert_eq!(diagram.open_region_count(), 3);

        for site in 0..3 {
            let region = diagram.region(site).unwrap();
            assert_eq!(region.vertex_indices, vec![0]);
            // [链头远点, 外心, 链尾远点]
            assert_eq!(diagram.region_polygon(site).unwrap().len(), 3);
        }
    }

    #[test]
    fn test_square_dual() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        let (triangles, diagram) = diagram_for(&points);
        assert_eq!(triangles.len(), 2);

        // 两个三角形外心重合于正方形中心
        assert_eq!(diagram.vertex_count(), 2);
        for vertex in &diagram.vertices {
            assert_relative_eq!(vertex.x, 5.0, epsilon = 1e-9);
            assert_relative_eq!(vertex.y, 5.0, epsilon = 1e-9);
        }

        // 只有对角线是内部边
        assert_eq!(diagram.edge_count(), 1);
        assert_eq!(diagram.open_region_count(), 4);

        let (_, indices) = diagram.get_render_data();
        assert_eq!(indices.len(), 2);
    }

    #[test]
    fn test_finite_edges_match_shared_delaunay_edges() {
        let points = generate_random_points(5, 60, 400.0);
        let (triangles, diagram) = diagram_for(&points);

        let mut edge_count: BTreeMap<[usize; 2], usize> = BTreeMap::new();
        for &[a, b, c] in &triangles {
            for (u, v) in [(a, b), (b, c), (c, a)] {
                *edge_count.entry([u.min(v), u.max(v)]).or_default() += 1;
            }
        }
        let shared: BTreeSet<[usize; 2]> = edge_count
            .iter()
            .filter(|(_, &count)| count == 2)
            .map(|(&edge, _)| edge)
            .collect();

        let reported: BTreeSet<[usize; 2]> = diagram
            .edges
            .iter()
            .map(|e| [e.site1, e.site2])
            .collect();
        assert_eq!(reported, shared);

        for edge in &diagram.edges {
            assert_ne!(edge.start_idx, edge.end_idx);
            for t_idx in [edge.start_idx, edge.end_idx] {
                let triangle = triangles[t_idx];
                assert!(triangle.contains(&edge.site1));
                assert!(triangle.contains(&edge.site2));
            }
        }

        for (vertex, &[a, b, c]) in diagram.vertices.iter().zip(&triangles) {
            let expected = circumcenter(points[a], points[b], points[c]);
            assert_relative_eq!(vertex.x, expected.x, epsilon = 1e-9);
            assert_relative_eq!(vertex.y, expected.y, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_open_regions_match_convex_hull() {
        let points = flower_points();
        let (_, diagram) = diagram_for(&points);

        assert_eq!(diagram.regions.len(), points.len());
        assert_eq!(convex_hull_size(&points), 12);
        assert_eq!(diagram.open_region_count(), 12);

        for (site, region) in &diagram.regions {
            match region.kind {
                RegionKind::Open => {
                    assert!(*site < 12, "site {site} should be on the hull");
                    assert!(region.rays.is_some());
                }
                RegionKind::Closed => {
                    assert!(*site >= 12);
                    assert!(region.rays.is_none());
                }
            }
        }
    }

    #[test]
    fn test_open_regions_match_convex_hull_on_random_sets() {
        for seed in 0..60 {
            let n = 3 + (seed as usize * 53) % 180;
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let points: Vec<Point> = (0..n)
                .map(|_| Point::new(rng.random_range(0.0..1000.0), rng.random_range(0.0..800.0)))
                .collect();
            let (_, diagram) = diagram_for(&points);

            assert_eq!(diagram.regions.len(), n, "seed {seed}");
            assert_eq!(
                diagram.open_region_count(),
                convex_hull_size(&points),
                "seed {seed}, {n} points"
            );
        }
    }

    #[test]
    fn test_out_of_range_triangle_index() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(5.0, 8.0),
        ];
        let err = compute_voronoi(&[[0, 1, 7]], &points).unwrap_err();
        assert_eq!(err, EngineError::IndexOutOfRange { index: 7, len: 3 });
        assert!(compute_voronoi(&[[0, 1, 2]], &[]).is_err());
    }

    #[test]
    fn test_region_never_revisits_triangle() {
        let points = generate_random_points(9, 120, 600.0);
        let (triangles, diagram) = diagram_for(&points);

        let mut incident = vec![0usize; points.len()];
        for triangle in &triangles {
            for &v in triangle {
                incident[v] += 1;
            }
        }

        for (site, region) in &diagram.regions {
            let unique: BTreeSet<usize> = region.vertex_indices.iter().copied().collect();
            assert_eq!(unique.len(), region.vertex_indices.len());
            assert_eq!(region.vertex_indices.len(), incident[*site]);
        }
    }

    #[test]
    fn test_closed_regions_are_counter_clockwise() {
        let points = generate_random_points(21, 80, 500.0);
        let (_, diagram) = diagram_for(&points);

        let mut closed = 0;
        for (site, region) in &diagram.regions {
            if region.kind != RegionKind::Closed {
                continue;
            }
            closed += 1;
            let polygon = diagram.region_polygon(*site).unwrap();
            assert!(polygon.len() >= 3);
            assert!(signed_area(&polygon) > 0.0, "region {site} is not CCW");
        }
        assert!(closed > 0);
    }

    #[test]
    fn test_hull_rays_point_outward() {
        let points = flower_points();
        let (_, diagram) = diagram_for(&points);

        let centroid = Point::centroid(&points);
        let diagonal = Point::new(102.1 * 2.0, 102.1 * 2.0).length();

        for region in diagram.regions.values() {
            let Some(rays) = region.rays else {
                continue;
            };
            for ray in rays {
                assert_relative_eq!(ray.direction.length(), 1.0, epsilon = 1e-9);

                let [a, b] = ray.hull_edge;
                assert_eq!(a, region.site);
                let midpoint = points[a].midpoint(points[b]);
                assert!(ray.direction.dot(midpoint - centroid) > 0.0);

                // 射线沿凸包边的法线方向
                let edge = points[b] - points[a];
                assert_relative_eq!(ray.direction.dot(edge), 0.0, epsilon = 1e-6);

                let origin = diagram.vertices[ray.origin_idx];
                assert!(ray.far_point.distance(origin) > diagonal);
                assert!(ray.far_point.distance(centroid) > diagonal);
            }
        }
    }

    #[test]
    fn test_open_polygon_layout() {
        let points = flower_points();
        let (_, diagram) = diagram_for(&points);

        for (site, region) in &diagram.regions {
            let polygon = diagram.region_polygon(*site).unwrap();
            match region.rays {
                Some([head, tail]) => {
                    assert_eq!(polygon.len(), region.vertex_indices.len() + 2);
                    assert_eq!(polygon[0], head.far_point);
                    assert_eq!(polygon[polygon.len() - 1], tail.far_point);
                    assert_eq!(head.origin_idx, region.vertex_indices[0]);
                    assert_eq!(tail.origin_idx, *region.vertex_indices.last().unwrap());
                }
                None => assert_eq!(polygon.len(), region.vertex_indices.len()),
            }
        }
    }

    #[test]
    fn test_voronoi_deterministic() {
        let points = generate_random_points(33, 50, 300.0);
        let (_, first) = diagram_for(&points);
        let (_, second) = diagram_for(&points);
        assert_eq!(first.get_render_data(), second.get_render_data());
        assert_eq!(first.region_polygons(), second.region_polygons());
    }
}
