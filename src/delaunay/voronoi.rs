//! Voronoi 图生成模块
//!
//! 基于 Delaunay 三角剖分生成 Voronoi 图。
//! Voronoi 图是 Delaunay 图的对偶图，每个 Delaunay 三角形的外心
//! 成为 Voronoi 图的顶点，共享边的三角形外心之间形成 Voronoi 边。
//!
//! # 主要类型
//! - [`VoronoiDiagram`]: 外心、有限边与各站点的区域
//! - [`VoronoiRegion`]: 一个站点的有序区域，闭合环或凸包上的开链
//!
//! # 区域排序
//! 每个与站点 `v` 相邻的三角形旋转成 `(pred, succ, v)`，得到一条绕 `v`
//! 逆时针的链接边 `pred -> succ`。从链头出发，反复寻找 `pred` 等于当前游标的
//! 未访问三角形，直到用完或接不上。内部站点得到闭合环；凸包站点得到开链，
//! 两端由射线延伸到画布之外。
//!
//! # 使用示例
//! ```ignore
//! use alpha_shapes::delaunay::{triangulate, voronoi::compute_voronoi};
//!
//! let triangulation = triangulate(&points);
//! let voronoi = compute_voronoi(&triangulation.real_triangles(), &points)?;
//!
//! // 用于渲染
//! for (site, polygon) in voronoi.region_polygons() { /* ... */ }
//! ```

use super::point::Point;
use super::predicates::circumcenter;
use super::utils::check_triangle_indices;
use crate::error::EngineResult;
use std::collections::{BTreeMap, HashSet};

// ============================================================================
// 公开类型定义
// ============================================================================

/// 有限 Voronoi 边
///
/// 对应一条被两个三角形共享的 Delaunay 边 `(site1, site2)`，
/// 连接这两个三角形的外心。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoronoiEdge {
    /// 边起点在 vertices 数组中的索引
    pub start_idx: usize,
    /// 边终点在 vertices 数组中的索引
    pub end_idx: usize,
    /// 对偶 Delaunay 边的两个端点（`site1 < site2`）
    pub site1: usize,
    pub site2: usize,
}

/// 区域类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    /// 内部站点：外心构成闭合环
    Closed,
    /// 凸包站点：外心构成开链，需要射线延伸
    Open,
}

/// 凸包边对应的射线
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HullRay {
    /// 射线起点（外心）在 vertices 数组中的索引
    pub origin_idx: usize,
    /// 只属于一个三角形的 Delaunay 边 `[site, other]`
    pub hull_edge: [usize; 2],
    /// 指向点集外侧的单位方向
    pub direction: Point,
    /// 沿射线延伸到包围盒之外的远点
    pub far_point: Point,
}

/// 一个站点的 Voronoi 区域
#[derive(Debug, Clone, PartialEq)]
pub struct VoronoiRegion {
    /// 站点索引（外部索引）
    pub site: usize,
    /// 按逆时针排列的外心索引，同一区域内不重复
    pub vertex_indices: Vec<usize>,
    pub kind: RegionKind,
    /// 开链两端的射线 `[链头, 链尾]`，闭合区域为 `None`
    pub rays: Option<[HullRay; 2]>,
}

/// Voronoi 图
#[derive(Debug, Clone, Default)]
pub struct VoronoiDiagram {
    /// 每个三角形一个外心，索引与输入三角形一一对应
    pub vertices: Vec<Point>,
    /// 有限边
    pub edges: Vec<VoronoiEdge>,
    /// 站点索引 -> 区域，只包含至少属于一个三角形的站点
    pub regions: BTreeMap<usize, VoronoiRegion>,
}

impl VoronoiDiagram {
    pub fn region(&self, site: usize) -> Option<&VoronoiRegion> {
        self.regions.get(&site)
    }

    /// 区域的多边形顶点
    ///
    /// 闭合区域为外心环；开放区域为 `[链头远点, 外心..., 链尾远点]`，
    /// 首尾相连的那条边位于画布之外。
    pub fn region_polygon(&self, site: usize) -> Option<Vec<Point>> {
        let region = self.regions.get(&site)?;
        let centers = region
            .vertex_indices
            .iter()
            .filter_map(|&idx| self.vertices.get(idx).copied());

        let polygon = match region.rays {
            Some([head, tail]) => std::iter::once(head.far_point)
                .chain(centers)
                .chain(std::iter::once(tail.far_point))
                .collect(),
            None => centers.collect(),
        };
        Some(polygon)
    }

    /// 所有区域的多边形，开放区域已延伸
    pub fn region_polygons(&self) -> BTreeMap<usize, Vec<Point>> {
        self.regions
            .keys()
            .filter_map(|&site| self.region_polygon(site).map(|polygon| (site, polygon)))
            .collect()
    }

    /// 获取用于线段渲染的数据：顶点与边索引，每两个索引构成一条边
    pub fn get_render_data(&self) -> (Vec<Point>, Vec<u32>) {
        (self.vertices.clone(), edges_to_indices(&self.edges))
    }

    pub fn open_region_count(&self) -> usize {
        self.regions
            .values()
            .filter(|r| r.kind == RegionKind::Open)
            .count()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

// ============================================================================
// 公开 API
// ============================================================================

/// 从 Delaunay 三角剖分计算 Voronoi 图
///
/// # 算法流程
/// 1. 计算每个三角形的外心（作为 Voronoi 顶点）
/// 2. 找出共享边的三角形对，连接外心形成有限边
/// 3. 为每个站点收集相邻三角形并排序成环或链
/// 4. 开链两端沿凸包边的外法线延伸射线
///
/// # 参数
/// - `triangles`: 只含真实点的逆时针三角形（外部索引）
/// - `points`: 真实点坐标
///
/// 三角形引用不存在的点时返回 [`crate::error::EngineError::IndexOutOfRange`]。
pub fn compute_voronoi(
    triangles: &[[usize; 3]],
    points: &[Point],
) -> EngineResult<VoronoiDiagram> {
    check_triangle_indices(triangles, points.len())?;
    if triangles.is_empty() {
        return Ok(VoronoiDiagram::default());
    }

    // Step 1: 外心
    let vertices: Vec<Point> = triangles
        .iter()
        .map(|&[a, b, c]| circumcenter(points[a], points[b], points[c]))
        .collect();

    // Step 2: 有限边
    let edge_to_triangles = build_edge_triangle_map(triangles);
    let edges = build_finite_edges(&edge_to_triangles);

    // Step 3: 区域
    let links = collect_links(triangles, points.len());
    let extent = RayExtent::new(points);

    let regions = links
        .iter()
        .enumerate()
        .filter(|(_, site_links)| !site_links.is_empty())
        .map(|(site, site_links)| {
            let region = build_region(site, site_links, &vertices, points, &extent);
            (site, region)
        })
        .collect::<BTreeMap<_, _>>();

    log::debug!(
        "voronoi: {} vertices, {} finite edges, {} regions ({} open)",
        vertices.len(),
        edges.len(),
        regions.len(),
        regions
            .values()
            .filter(|r| r.kind == RegionKind::Open)
            .count()
    );

    Ok(VoronoiDiagram {
        vertices,
        edges,
        regions,
    })
}

// ============================================================================
// 内部实现
// ============================================================================

/// 射线长度 = 倍数 * (包围盒对角线 + 外心到质心的距离)
const RAY_EXTENT_FACTOR: f64 = 2.0;

/// 站点周围的一条链接边 `pred -> succ`
#[derive(Debug, Clone, Copy)]
struct Link {
    pred: usize,
    succ: usize,
    triangle: usize,
}

/// 射线延伸所需的全局量
struct RayExtent {
    centroid: Point,
    diagonal: f64,
}

impl RayExtent {
    fn new(points: &[Point]) -> Self {
        let finite: Vec<Point> = points.iter().copied().filter(|p| p.is_finite()).collect();
        let (min, max) = finite.iter().fold(
            (
                Point::new(f64::INFINITY, f64::INFINITY),
                Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            ),
            |(min, max), p| {
                (
                    Point::new(min.x.min(p.x), min.y.min(p.y)),
                    Point::new(max.x.max(p.x), max.y.max(p.y)),
                )
            },
        );

        Self {
            centroid: Point::centroid(&finite),
            diagonal: if finite.is_empty() {
                0.0
            } else {
                (max - min).length()
            },
        }
    }

    fn length_from(&self, origin: Point) -> f64 {
        RAY_EXTENT_FACTOR * (self.diagonal + origin.distance(self.centroid)).max(1.0)
    }
}

/// 构建边到三角形的映射表
///
/// 键是有序的边 `(min, max)`，值是使用该边的三角形索引列表。
/// 使用 `BTreeMap` 让边的输出顺序确定。
fn build_edge_triangle_map(triangles: &[[usize; 3]]) -> BTreeMap<(usize, usize), Vec<usize>> {
    let mut edge_to_triangles: BTreeMap<(usize, usize), Vec<usize>> = BTreeMap::new();

    for (t_idx, indices) in triangles.iter().enumerate() {
        for i in 0..3 {
            let j = (i + 1) % 3;
            let edge = if indices[i] < indices[j] {
                (indices[i], indices[j])
            } else {
                (indices[j], indices[i])
            };
            edge_to_triangles.entry(edge).or_default().push(t_idx);
        }
    }

    edge_to_triangles
}

/// 只处理内部边（被两个三角形共享的边）
fn build_finite_edges(
    edge_to_triangles: &BTreeMap<(usize, usize), Vec<usize>>,
) -> Vec<VoronoiEdge> {
    edge_to_triangles
        .iter()
        .filter_map(|(&(site1, site2), tri_indices)| match tri_indices.as_slice() {
            &[start_idx, end_idx] => Some(VoronoiEdge {
                start_idx,
                end_idx,
                site1,
                site2,
            }),
            _ => None,
        })
        .collect()
}

/// 将三角形旋转成 `(pred, succ, site)`，按站点分组
fn collect_links(triangles: &[[usize; 3]], point_count: usize) -> Vec<Vec<Link>> {
    let mut links = vec![Vec::new(); point_count];
    for (triangle, &[a, b, c]) in triangles.iter().enumerate() {
        for (pred, succ, site) in [(b, c, a), (c, a, b), (a, b, c)] {
            if let Some(site_links) = links.get_mut(site) {
                site_links.push(Link {
                    pred,
                    succ,
                    triangle,
                });
            }
        }
    }
    links
}

/// 排序站点周围的链接边
///
/// 返回按顺序访问的链接下标以及区域类型。
/// 有链头（其 `pred` 不是任何链接的 `succ`）时从链头出发，否则从第一个链接出发。
fn order_links(links: &[Link]) -> (Vec<usize>, RegionKind) {
    let succs: HashSet<usize> = links.iter().map(|l| l.succ).collect();
    let head = links
        .iter()
        .position(|l| !succs.contains(&l.pred))
        .unwrap_or(0);

    let start = links[head].pred;
    let mut cursor = start;
    let mut visited = vec![false; links.len()];
    let mut order = Vec::with_capacity(links.len());

    while let Some(next) = (0..links.len()).find(|&i| !visited[i] && links[i].pred == cursor) {
        visited[next] = true;
        order.push(next);
        cursor = links[next].succ;
    }

    let kind = if order.len() == links.len() && cursor == start {
        RegionKind::Closed
    } else {
        if order.len() != links.len() {
            log::debug!(
                "region chain consumed {} of {} incident triangles",
                order.len(),
                links.len()
            );
        }
        RegionKind::Open
    };

    (order, kind)
}

fn build_region(
    site: usize,
    links: &[Link],
    vertices: &[Point],
    points: &[Point],
    extent: &RayExtent,
) -> VoronoiRegion {
    let (order, kind) = order_links(links);
    let vertex_indices: Vec<usize> = order.iter().map(|&i| links[i].triangle).collect();

    let rays = match (kind, order.first(), order.last()) {
        (RegionKind::Open, Some(&head), Some(&tail)) => {
            let head = links[head];
            let tail = links[tail];
            Some([
                hull_ray(site, head.pred, head.succ, head.triangle, vertices, points, extent),
                hull_ray(site, tail.succ, tail.pred, tail.triangle, vertices, points, extent),
            ])
        }
        _ => None,
    };

    VoronoiRegion {
        site,
        vertex_indices,
        kind,
        rays,
    }
}

/// 从三角形外心沿凸包边 `(site, other)` 的外法线延伸射线
///
/// 法线朝向远离点集质心的一侧；质心恰好落在边所在直线上时改为远离三角形的第三个顶点 `third`。
fn hull_ray(
    site: usize,
    other: usize,
    third: usize,
    triangle: usize,
    vertices: &[Point],
    points: &[Point],
    extent: &RayExtent,
) -> HullRay {
    let a = points[site];
    let b = points[other];
    let origin = vertices[triangle];

    let mut direction = (b - a).perp().normalized();
    let midpoint = a.midpoint(b);
    let side = direction.dot(midpoint - extent.centroid);
    if side < 0.0 {
        direction = direction * -1.0;
    } else if side == 0.0 {
        let inside = points[third] - midpoint;
        if direction.dot(inside) > 0.0 {
            direction = direction * -1.0;
        }
    }

    HullRay {
        origin_idx: triangle,
        hull_edge: [site, other],
        direction,
        far_point: origin + direction * extent.length_from(origin),
    }
}

/// 将边列表转换为索引数组
fn edges_to_indices(edges: &[VoronoiEdge]) -> Vec<u32> {
    let mut indices = Vec::with_capacity(edges.len() * 2);
    for edge in edges {
        indices.push(edge.start_idx as u32);
        indices.push(edge.end_idx as u32);
    }
    indices
}
