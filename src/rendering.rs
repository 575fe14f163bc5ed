use egui::{Color32, Painter, Pos2, Rect, Shape, Stroke};

use crate::alpha_shape::AlphaComplex;
use crate::app::UiState;
use crate::delaunay::voronoi::{RegionKind, VoronoiDiagram};
use crate::delaunay::Point;
use crate::models::PointCloud;

/// 绘制颜色与线宽
#[derive(Clone, Debug)]
pub struct Palette {
    pub background: Color32,
    pub fill: Color32,
    pub wire: Stroke,
    pub voronoi: Stroke,
    pub probe: Stroke,
    pub point: Color32,
    pub selected_point: Color32,
    pub point_radius: f32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color32::WHITE,
            fill: Color32::from_rgb(173, 216, 230),
            wire: Stroke::new(2.0, Color32::from_rgb(100, 100, 100)),
            voronoi: Stroke::new(1.0, Color32::from_rgb(0, 128, 128)),
            probe: Stroke::new(2.0, Color32::from_rgb(255, 127, 127)),
            point: Color32::BLACK,
            selected_point: Color32::from_rgb(212, 42, 3),
            point_radius: 5.0,
        }
    }
}

/// 画布坐标原点在画布左上角
fn to_screen(rect: Rect, point: Point) -> Pos2 {
    rect.min + Pos2::from(point).to_vec2()
}

/// 一帧需要绘制的全部内容
pub struct SceneRenderer<'a> {
    pub palette: &'a Palette,
    pub rect: Rect,
}

impl<'a> SceneRenderer<'a> {
    pub fn new(palette: &'a Palette, rect: Rect) -> Self {
        Self { palette, rect }
    }

    /// 按填充面、线框、Voronoi 轮廓、探测圆、点的顺序绘制
    pub fn paint(
        &self,
        painter: &Painter,
        cloud: &PointCloud,
        state: &UiState,
        selected: Option<usize>,
    ) {
        painter.rect_filled(self.rect, 0.0, self.palette.background);

        match cloud.alpha_complex(state.alpha) {
            Ok(complex) => {
                if state.show_filled {
                    self.paint_filled(painter, cloud.points(), &complex);
                }
                if state.show_wireframe {
                    self.paint_wireframe(painter, cloud.points(), &complex);
                }
            }
            Err(err) => log::warn!("skipping alpha shape: {err}"),
        }

        if state.show_voronoi {
            self.paint_voronoi(painter, cloud);
        }

        if state.show_probe_radius && state.alpha > 0.0 {
            self.paint_probe_circles(painter, cloud.points(), (1.0 / state.alpha) as f32);
        }

        self.paint_points(painter, cloud.points(), selected);
    }

    fn paint_filled(&self, painter: &Painter, points: &[Point], complex: &AlphaComplex) {
        let shapes = complex.filled.iter().map(|triangle| {
            let vertices = triangle
                .iter()
                .map(|&v| to_screen(self.rect, points[v]))
                .collect();
            Shape::convex_polygon(vertices, self.palette.fill, Stroke::NONE)
        });
        painter.extend(shapes);
    }

    fn paint_wireframe(&self, painter: &Painter, points: &[Point], complex: &AlphaComplex) {
        for &[a, b] in &complex.edges {
            painter.line_segment(
                [
                    to_screen(self.rect, points[a]),
                    to_screen(self.rect, points[b]),
                ],
                self.palette.wire,
            );
        }
    }

    fn paint_voronoi(&self, painter: &Painter, cloud: &PointCloud) {
        let diagram = cloud.voronoi();
        let shapes = diagram
            .regions
            .keys()
            .filter_map(|&site| self.region_outline(&diagram, site));
        painter.extend(shapes);
    }

    /// 开放区域两端是射线远点，画成折线，不把两个远点连起来
    fn region_outline(&self, diagram: &VoronoiDiagram, site: usize) -> Option<Shape> {
        let region = diagram.region(site)?;
        let polygon = diagram.region_polygon(site)?;
        if polygon.len() < 2 {
            return None;
        }
        let outline = polygon
            .into_iter()
            .map(|p| to_screen(self.rect, p))
            .collect();
        Some(match region.kind {
            RegionKind::Open => Shape::line(outline, self.palette.voronoi),
            RegionKind::Closed => Shape::closed_line(outline, self.palette.voronoi),
        })
    }

    fn paint_probe_circles(&self, painter: &Painter, points: &[Point], radius: f32) {
        for &point in points {
            painter.circle_stroke(to_screen(self.rect, point), radius, self.palette.probe);
        }
    }

    fn paint_points(&self, painter: &Painter, points: &[Point], selected: Option<usize>) {
        for (index, &point) in points.iter().enumerate() {
            let color = if selected == Some(index) {
                self.palette.selected_point
            } else {
                self.palette.point
            };
            painter.circle_filled(
                to_screen(self.rect, point),
                self.palette.point_radius,
                color,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Vec2;

    fn outlines(points: Vec<Point>) -> Vec<(RegionKind, bool)> {
        let palette = Palette::default();
        let rect = Rect::from_min_size(Pos2::ZERO, Vec2::splat(800.0));
        let renderer = SceneRenderer::new(&palette, rect);
        let diagram = PointCloud::new(points).voronoi();
        diagram
            .regions
            .iter()
            .map(|(&site, region)| match renderer.region_outline(&diagram, site) {
                Some(Shape::Path(path)) => (region.kind, path.closed),
                other => panic!("site {site}: unexpected shape {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_open_regions_are_not_closed() {
        let shapes = outlines(vec![
            Point::new(100.0, 100.0),
            Point::new(200.0, 100.0),
            Point::new(200.0, 200.0),
            Point::new(100.0, 200.0),
        ]);
        assert_eq!(shapes.len(), 4);
        assert!(shapes.iter().all(|&(kind, closed)| kind == RegionKind::Open && !closed));
    }

    #[test]
    fn test_closed_regions_stay_closed() {
        // 中心点被四周包围，区域封闭
        let shapes = outlines(vec![
            Point::new(100.0, 100.0),
            Point::new(300.0, 110.0),
            Point::new(310.0, 300.0),
            Point::new(90.0, 290.0),
            Point::new(205.0, 198.0),
        ]);
        assert_eq!(shapes.len(), 5);
        assert_eq!(shapes.iter().filter(|&&(_, closed)| closed).count(), 1);
        for (kind, closed) in shapes {
            assert_eq!(closed, kind == RegionKind::Closed);
        }
    }
}
