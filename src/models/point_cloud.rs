use std::collections::BTreeMap;

use crate::alpha_shape::{self, AlphaComplex};
use crate::delaunay::voronoi::{compute_voronoi, VoronoiDiagram};
use crate::delaunay::{FrameConfig, Point, Triangulation};
use crate::error::{EngineError, EngineResult};

/// 点云
///
/// 持有真实点的有序列表和当前三角剖分。每次修改都立即从当前点列表整体重建，
/// 不复用上一次的三角剖分。调用方出错（索引越界）时三角剖分保持不变。
#[derive(Debug, Clone)]
pub struct PointCloud {
    points: Vec<Point>,
    frame: FrameConfig,
    triangulation: Triangulation,
}

impl Default for PointCloud {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl PointCloud {
    pub fn new(points: Vec<Point>) -> Self {
        Self::with_frame(points, FrameConfig::default())
    }

    pub fn with_frame(points: Vec<Point>, frame: FrameConfig) -> Self {
        let triangulation = Triangulation::build(&points, &frame);
        Self {
            points,
            frame,
            triangulation,
        }
    }

    fn rebuild(&mut self) {
        self.triangulation = Triangulation::build(&self.points, &self.frame);
    }

    // ------------------------------------------------------------------------
    // 点
    // ------------------------------------------------------------------------

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn point(&self, index: usize) -> EngineResult<Point> {
        self.points
            .get(index)
            .copied()
            .ok_or(EngineError::IndexOutOfRange {
                index,
                len: self.points.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    pub fn frame(&self) -> &FrameConfig {
        &self.frame
    }

    // ------------------------------------------------------------------------
    // 修改（每次都整体重建）
    // ------------------------------------------------------------------------

    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
        self.rebuild();
    }

    /// 所有点平移 `(dx, dy)`
    pub fn move_all(&mut self, dx: f64, dy: f64) {
        for point in &mut self.points {
            point.x += dx;
            point.y += dy;
        }
        self.rebuild();
    }

    /// 把第 `index` 个点移动到绝对坐标 `(x, y)`
    pub fn move_selected(&mut self, index: usize, x: f64, y: f64) -> EngineResult<()> {
        let len = self.points.len();
        let point = self
            .points
            .get_mut(index)
            .ok_or(EngineError::IndexOutOfRange { index, len })?;
        *point = Point::new(x, y);
        self.rebuild();
        Ok(())
    }

    /// 替换全部点
    pub fn set_points(&mut self, points: Vec<Point>) {
        self.points = points;
        self.rebuild();
    }

    pub fn set_frame(&mut self, frame: FrameConfig) {
        self.frame = frame;
        self.rebuild();
    }

    /// 以原点为中心缩放后的新点云
    pub fn scaled(&self, factor: f64) -> PointCloud {
        PointCloud::with_frame(self.points.iter().map(|&p| p * factor).collect(), self.frame)
    }

    /// 平移后的新点云
    pub fn translated(&self, offset: Point) -> PointCloud {
        PointCloud::with_frame(self.points.iter().map(|&p| p + offset).collect(), self.frame)
    }

    // ------------------------------------------------------------------------
    // 派生数据
    // ------------------------------------------------------------------------

    pub fn triangulation(&self) -> &Triangulation {
        &self.triangulation
    }

    /// 只含真实点的三角形（从 0 开始的外部索引）
    pub fn triangles(&self) -> Vec<[usize; 3]> {
        self.triangulation.real_triangles()
    }

    pub fn alpha_complex(&self, alpha: f64) -> EngineResult<AlphaComplex> {
        alpha_shape::classify(&self.triangles(), &self.points, alpha)
    }

    pub fn filled_triangles(&self, alpha: f64) -> EngineResult<Vec<[usize; 3]>> {
        Ok(self.alpha_complex(alpha)?.filled)
    }

    pub fn wireframe_edges(&self, alpha: f64) -> EngineResult<Vec<[usize; 2]>> {
        Ok(self.alpha_complex(alpha)?.edges)
    }

    /// 三角形来自自身的三角剖分，索引总在范围内
    pub fn voronoi(&self) -> VoronoiDiagram {
        compute_voronoi(&self.triangles(), &self.points).unwrap_or_else(|err| {
            log::error!("voronoi of own triangulation failed: {err}");
            VoronoiDiagram::default()
        })
    }

    /// 站点索引 -> 区域多边形，凸包站点的区域已用射线延伸
    pub fn voronoi_regions(&self) -> BTreeMap<usize, Vec<Point>> {
        self.voronoi().region_polygons()
    }
}

impl<'a> IntoIterator for &'a PointCloud {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn triangle_set(triangles: &[[usize; 3]]) -> BTreeSet<[usize; 3]> {
        triangles
            .iter()
            .map(|t| {
                let mut sorted = *t;
                sorted.sort_unstable();
                sorted
            })
            .collect()
    }

    fn set_a() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(40.0, 5.0),
            Point::new(20.0, 30.0),
            Point::new(5.0, 45.0),
        ]
    }

    fn set_b() -> Vec<Point> {
        vec![
            Point::new(100.0, 100.0),
            Point::new(160.0, 110.0),
            Point::new(150.0, 170.0),
            Point::new(95.0, 160.0),
            Point::new(128.0, 131.0),
        ]
    }

    #[test]
    fn test_empty_cloud() {
        let cloud = PointCloud::default();
        assert!(cloud.is_empty());
        assert!(cloud.triangles().is_empty());
        assert!(cloud.voronoi_regions().is_empty());
        assert!(cloud.wireframe_edges(0.1).unwrap().is_empty());
    }

    #[test]
    fn test_add_point_rebuilds() {
        let mut cloud = PointCloud::new(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
        assert!(cloud.triangles().is_empty());

        cloud.add_point(Point::new(5.0, 8.0));
        assert_eq!(cloud.len(), 3);
        assert_eq!(cloud.triangles().len(), 1);
    }

    #[test]
    fn test_move_selected_is_absolute() {
        let mut cloud = PointCloud::new(set_a());
        cloud.move_selected(2, 7.0, 9.0).unwrap();
        assert_eq!(cloud.point(2).unwrap(), Point::new(7.0, 9.0));
    }

    #[test]
    fn test_move_selected_out_of_range_keeps_state() {
        let mut cloud = PointCloud::new(set_a());
        let before = cloud.triangles();

        let err = cloud.move_selected(4, 1.0, 1.0).unwrap_err();
        assert_eq!(err, EngineError::IndexOutOfRange { index: 4, len: 4 });
        assert_eq!(cloud.points(), set_a().as_slice());
        assert_eq!(cloud.triangles(), before);

        assert!(cloud.point(10).is_err());
    }

    #[test]
    fn test_rebuild_independent_of_prior_state() {
        let mut cloud = PointCloud::new(set_a());
        cloud.move_selected(0, 3.0, 4.0).unwrap();
        cloud.set_points(set_b());

        let fresh = PointCloud::new(set_b());
        assert_eq!(cloud.triangles(), fresh.triangles());
    }

    #[test]
    fn test_move_all_translates_without_changing_topology() {
        let mut cloud = PointCloud::new(set_b());
        let before = triangle_set(&cloud.triangles());

        cloud.move_all(25.0, -10.0);
        assert_eq!(cloud.point(0).unwrap(), Point::new(125.0, 90.0));
        assert_eq!(triangle_set(&cloud.triangles()), before);
    }

    #[test]
    fn test_scaled_and_translated() {
        let cloud = PointCloud::new(set_b());
        let before = triangle_set(&cloud.triangles());

        let scaled = cloud.scaled(0.5);
        assert_eq!(scaled.point(1).unwrap(), Point::new(80.0, 55.0));
        assert_eq!(triangle_set(&scaled.triangles()), before);

        let moved = cloud.translated(Point::new(-100.0, -100.0));
        assert_eq!(moved.point(0).unwrap(), Point::ZERO);
        assert_eq!(triangle_set(&moved.triangles()), before);

        // 原点云不变
        assert_eq!(cloud.points(), set_b().as_slice());
    }

    #[test]
    fn test_invalid_alpha_is_reported() {
        let cloud = PointCloud::new(set_b());
        assert!(matches!(
            cloud.filled_triangles(0.0),
            Err(EngineError::InvalidParameter { .. })
        ));
        assert!(cloud.wireframe_edges(-2.0).is_err());
    }
}
