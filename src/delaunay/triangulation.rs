//! 增量 Delaunay 三角剖分
//!
//! 每次重建都从外框四边形的两个种子三角形开始，按输入顺序逐点插入：
//!
//! ```text
//! 外框顶点 0..4          真实点 4..
//!   3 ────── 2
//!   │ ╲  T2  │           对每个点:
//!   │   ╲    │           1. 全量扫描，找出外接圆包含该点的"坏"三角形
//!   │ T1  ╲  │           2. 沿邻接关系绕行空洞边界
//!   0 ────── 1           3. 删除坏三角形，用新点与边界边扇形填充
//! ```
//!
//! 三角形存放在以整数 id 索引的 arena 中，邻居槽位保存 `Option<TriangleId>`，
//! 不存在循环引用。槽位 *i* 对应顶点 *i* 的对边。

use super::point::Point;
use super::predicates::{in_circumcircle, orientation};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::time::Instant;

// ============================================================================
// 常量与基础类型
// ============================================================================

/// 内部顶点索引。0..4 为外框顶点，其余按插入顺序对应真实点
pub type VertexId = usize;

/// arena 中三角形的稳定 id
pub type TriangleId = usize;

/// 外框顶点数量，真实点的外部索引 = 内部索引 - 4
pub const FRAME_VERTEX_COUNT: usize = 4;

/// 默认外框半径
pub const DEFAULT_FRAME_RADIUS: f64 = 10_000.0;

/// 外框顶点方向：(-1,-1), (1,-1), (1,1), (-1,1)
const FRAME_DIRECTIONS: [(f64, f64); FRAME_VERTEX_COUNT] =
    [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

/// 真实点偏离中心超过 `radius * 0.5` 时触发外框扩展
const FRAME_EXPANSION_THRESHOLD: f64 = 0.5;

/// 扩展后的半径 = 最大偏移 * 2
const FRAME_EXPANSION_FACTOR: f64 = 2.0;

/// 外框半径不小于点集包围盒边长的这个倍数
///
/// 外框顶点离得不够远时，细长凸包三角形的外接圆会包含外框顶点，
/// 凸包边被外框三角形占据，真实三角形就覆盖不了整个凸包。
pub const FRAME_SPAN_FACTOR: f64 = 1e5;

// ============================================================================
// 配置
// ============================================================================

/// 外框配置
///
/// 外框是一个以 `center` 为中心、半边长为 `radius` 的正方形，
/// 需要远大于真实点的分布范围。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub center: Point,
    pub radius: f64,
    /// 点集超出外框时是否自动放大半径
    pub auto_expand: bool,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            center: Point::ZERO,
            radius: DEFAULT_FRAME_RADIUS,
            auto_expand: true,
        }
    }
}

impl FrameConfig {
    /// 四个外框顶点，按逆时针顺序
    pub fn vertices(&self) -> [Point; FRAME_VERTEX_COUNT] {
        FRAME_DIRECTIONS.map(|(dx, dy)| {
            Point::new(
                self.center.x + self.radius * dx,
                self.center.y + self.radius * dy,
            )
        })
    }

    /// 返回能容纳所有点的外框
    ///
    /// 无效半径（非正或非有限）退回 [`DEFAULT_FRAME_RADIUS`]。
    /// `auto_expand` 关闭时除此之外原样返回；开启时中心不变，半径取以下三者最大值：
    ///
    /// - 配置的半径
    /// - 点偏离中心达到半径一半时，最大偏移的 2 倍
    /// - 包围盒边长的 [`FRAME_SPAN_FACTOR`] 倍
    pub fn enclosing(&self, points: &[Point]) -> FrameConfig {
        let mut frame = *self;
        if !(frame.radius.is_finite() && frame.radius > 0.0) {
            log::warn!(
                "invalid frame radius {}, using {}",
                frame.radius,
                DEFAULT_FRAME_RADIUS
            );
            frame.radius = DEFAULT_FRAME_RADIUS;
        }

        if !frame.auto_expand {
            return frame;
        }

        let finite = points.iter().filter(|p| p.is_finite());
        let max_offset = finite
            .clone()
            .map(|p| (p.x - frame.center.x).abs().max((p.y - frame.center.y).abs()))
            .fold(0.0, f64::max);

        if max_offset >= frame.radius * FRAME_EXPANSION_THRESHOLD {
            let radius = max_offset * FRAME_EXPANSION_FACTOR;
            log::warn!(
                "points reach {:.1} from frame center, expanding frame radius {} -> {}",
                max_offset,
                frame.radius,
                radius
            );
            frame.radius = radius;
        }

        let span = bounding_span(finite);
        if span * FRAME_SPAN_FACTOR > frame.radius {
            log::debug!(
                "point set spans {:.3}, frame radius {} -> {}",
                span,
                frame.radius,
                span * FRAME_SPAN_FACTOR
            );
            frame.radius = span * FRAME_SPAN_FACTOR;
        }

        frame
    }
}

/// 包围盒较长的边长，没有点时为 0
fn bounding_span<'a>(points: impl Iterator<Item = &'a Point>) -> f64 {
    let (min, max) = points.fold(
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
    if min.x > max.x {
        return 0.0;
    }
    (max.x - min.x).max(max.y - min.y)
}

// ============================================================================
// 三角形
// ============================================================================

/// arena 中的三角形
///
/// `vertices` 保持逆时针；`neighbors[i]` 是与顶点 `vertices[i]` 对边相邻的三角形，
/// 外框边界上为 `None`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub vertices: [VertexId; 3],
    pub neighbors: [Option<TriangleId>; 3],
}

impl Triangle {
    pub fn contains_vertex(&self, vertex: VertexId) -> bool {
        self.vertices.contains(&vertex)
    }

    /// 三个顶点都是真实点
    pub fn is_real(&self) -> bool {
        self.vertices.iter().all(|&v| v >= FRAME_VERTEX_COUNT)
    }

    pub fn slot_of_vertex(&self, vertex: VertexId) -> Option<usize> {
        self.vertices.iter().position(|&v| v == vertex)
    }

    pub fn slot_of_neighbor(&self, neighbor: TriangleId) -> Option<usize> {
        self.neighbors.iter().position(|&n| n == Some(neighbor))
    }

    /// 边 (e0, e1) 对应的槽位，即不在该边上的那个顶点的位置
    pub fn slot_opposite_edge(&self, e0: VertexId, e1: VertexId) -> Option<usize> {
        if !self.contains_vertex(e0) || !self.contains_vertex(e1) {
            return None;
        }
        self.vertices.iter().position(|&v| v != e0 && v != e1)
    }

    /// 槽位 `slot` 对应的有向边（逆时针方向）
    pub fn edge(&self, slot: usize) -> (VertexId, VertexId) {
        (self.vertices[(slot + 1) % 3], self.vertices[(slot + 2) % 3])
    }
}

/// 空洞边界上的一条有向边及其外侧三角形
#[derive(Debug, Clone, Copy)]
struct BoundaryEdge {
    start: VertexId,
    end: VertexId,
    outside: Option<TriangleId>,
}

/// 重建过程中的诊断信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildDiagnostics {
    /// 未能插入的真实点（外部索引）：重复点、非有限坐标或边界绕行失败
    pub skipped_points: Vec<usize>,
    /// 创建时方向为顺时针、已被翻转的三角形数量
    pub orientation_fixes: usize,
    /// 超出步数上限而放弃的空洞边界绕行次数
    pub aborted_walks: usize,
}

// ============================================================================
// 三角剖分
// ============================================================================

/// Delaunay 三角剖分
///
/// 由 [`Triangulation::build`] 一次性构建，之后只读。
/// 点集变化时整体重建，不做增量修补。
#[derive(Debug, Clone)]
pub struct Triangulation {
    frame: FrameConfig,
    /// 外框顶点 + 真实点
    coords: Vec<Point>,
    /// 三角形 arena，被删除的槽位为 `None`
    arena: Vec<Option<Triangle>>,
    active_count: usize,
    diagnostics: BuildDiagnostics,
}

impl Default for Triangulation {
    fn default() -> Self {
        Self::build(&[], &FrameConfig::default())
    }
}

/// 使用默认外框对点集做 Delaunay 三角剖分
pub fn triangulate(points: &[Point]) -> Triangulation {
    Triangulation::build(points, &FrameConfig::default())
}

impl Triangulation {
    /// 从点集构建三角剖分
    ///
    /// 空点集得到没有真实三角形的剖分，内部只剩两个外框种子三角形。
    /// 重复点与共线点不会报错：重复点被跳过，退化三角形保留。
    pub fn build(points: &[Point], frame: &FrameConfig) -> Self {
        let start_time = Instant::now();
        let frame = frame.enclosing(points);

        let mut coords = Vec::with_capacity(FRAME_VERTEX_COUNT + points.len());
        coords.extend(frame.vertices());
        coords.extend_from_slice(points);

        let mut triangulation = Self {
            frame,
            coords,
            arena: Vec::with_capacity(2 + 6 * points.len()),
            active_count: 0,
            diagnostics: BuildDiagnostics::default(),
        };

        triangulation.seed();
        for vertex in FRAME_VERTEX_COUNT..triangulation.coords.len() {
            triangulation.insert_vertex(vertex);
        }

        #[cfg(debug_assertions)]
        if !triangulation.is_adjacency_consistent() {
            log::warn!("triangulation adjacency is inconsistent after rebuild");
        }

        log::debug!(
            "triangulated {} points: {} triangles ({} real), {} skipped, {} orientation fixes, took {:.2?}",
            points.len(),
            triangulation.active_count,
            triangulation.real_triangle_count(),
            triangulation.diagnostics.skipped_points.len(),
            triangulation.diagnostics.orientation_fixes,
            start_time.elapsed()
        );

        triangulation
    }

    // ------------------------------------------------------------------------
    // 查询
    // ------------------------------------------------------------------------

    /// 当前有效的三角形及其 id，按 arena 顺序（即创建顺序）
    pub fn triangles(&self) -> impl Iterator<Item = (TriangleId, &Triangle)> + '_ {
        self.arena
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_ref().map(|t| (id, t)))
    }

    pub fn triangle(&self, id: TriangleId) -> Option<&Triangle> {
        self.arena.get(id).and_then(Option::as_ref)
    }

    /// arena 中有效三角形的数量，包含带外框顶点的三角形
    ///
    /// 真实三角形数量见 [`Triangulation::real_triangle_count`]。
    pub fn triangle_count(&self) -> usize {
        self.active_count
    }

    pub fn real_triangle_count(&self) -> usize {
        self.triangles().filter(|(_, t)| t.is_real()).count()
    }

    /// 没有真实三角形（点数不足 3 或全部共线）
    pub fn is_empty(&self) -> bool {
        !self.triangles().any(|(_, t)| t.is_real())
    }

    /// 只由真实点组成的三角形，索引已转换为从 0 开始的外部索引
    ///
    /// 顶点顺序保持逆时针。
    pub fn real_triangles(&self) -> Vec<[usize; 3]> {
        self.triangles()
            .filter(|(_, t)| t.is_real())
            .map(|(_, t)| t.vertices.map(|v| v - FRAME_VERTEX_COUNT))
            .collect()
    }

    /// 真实三角形的无向边（外部索引，`[小, 大]`，有序）
    pub fn real_edges(&self) -> Vec<[usize; 2]> {
        let mut edges = BTreeSet::new();
        for [a, b, c] in self.real_triangles() {
            for (u, v) in [(a, b), (b, c), (c, a)] {
                edges.insert([u.min(v), u.max(v)]);
            }
        }
        edges.into_iter().collect()
    }

    /// 外框顶点 + 真实点的全部坐标
    pub fn coords(&self) -> &[Point] {
        &self.coords
    }

    /// 真实点坐标
    pub fn points(&self) -> &[Point] {
        &self.coords[FRAME_VERTEX_COUNT..]
    }

    pub fn point_count(&self) -> usize {
        self.coords.len() - FRAME_VERTEX_COUNT
    }

    pub fn vertex(&self, vertex: VertexId) -> Option<Point> {
        self.coords.get(vertex).copied()
    }

    /// 实际使用的外框（可能已被自动扩展）
    pub fn frame(&self) -> &FrameConfig {
        &self.frame
    }

    pub fn diagnostics(&self) -> &BuildDiagnostics {
        &self.diagnostics
    }

    /// 检查邻接关系是否对称且与共享边一致
    ///
    /// - 每个邻居都有效，且反向指回自己
    /// - 相邻的两个三角形共享对应的边
    /// - 空槽位只出现在外框边上
    pub fn is_adjacency_consistent(&self) -> bool {
        self.triangles().all(|(id, triangle)| {
            (0..3).all(|slot| {
                let (e0, e1) = triangle.edge(slot);
                match triangle.neighbors[slot] {
                    None => e0 < FRAME_VERTEX_COUNT && e1 < FRAME_VERTEX_COUNT,
                    Some(neighbor_id) => match self.triangle(neighbor_id) {
                        None => false,
                        Some(neighbor) => {
                            neighbor
                                .slot_opposite_edge(e0, e1)
                                .is_some_and(|back| neighbor.neighbors[back] == Some(id))
                        }
                    },
                }
            })
        })
    }

    /// 所有三角形都严格逆时针
    pub fn is_counter_clockwise(&self) -> bool {
        self.triangles().all(|(_, t)| {
            let [a, b, c] = t.vertices.map(|v| self.coords[v]);
            orientation(a, b, c) > 0.0
        })
    }

    // ------------------------------------------------------------------------
    // 构建
    // ------------------------------------------------------------------------

    /// 外框四边形沿对角线 1-3 拆成两个种子三角形
    fn seed(&mut self) {
        let first = self.push_triangle([0, 1, 3], [None; 3]);
        let second = self.push_triangle([2, 3, 1], [Some(first), None, None]);
        if let Some(Some(triangle)) = self.arena.get_mut(first) {
            if let Some(slot) = triangle.slot_opposite_edge(1, 3) {
                triangle.neighbors[slot] = Some(second);
            }
        }
    }

    /// 插入一个顶点，返回是否真正插入
    fn insert_vertex(&mut self, vertex: VertexId) -> bool {
        let point = self.coords[vertex];

        // 全量扫描，不做局部游走
        let bad: Vec<TriangleId> = self
            .triangles()
            .filter(|(_, t)| self.circumcircle_contains(t, point))
            .map(|(id, _)| id)
            .collect();

        if bad.is_empty() {
            log::trace!(
                "point {} at ({}, {}) lies in no circumcircle, skipped",
                vertex - FRAME_VERTEX_COUNT,
                point.x,
                point.y
            );
            self.diagnostics
                .skipped_points
                .push(vertex - FRAME_VERTEX_COUNT);
            return false;
        }

        let bad_set: HashSet<TriangleId> = bad.iter().copied().collect();
        let Some(boundary) = self.cavity_boundary(&bad, &bad_set) else {
            log::warn!(
                "cavity walk for point {} did not close ({} bad triangles), skipped",
                vertex - FRAME_VERTEX_COUNT,
                bad.len()
            );
            self.diagnostics.aborted_walks += 1;
            self.diagnostics
                .skipped_points
                .push(vertex - FRAME_VERTEX_COUNT);
            return false;
        };

        for &id in &bad {
            self.remove_triangle(id);
        }

        let fan = self.fill_cavity(vertex, &boundary);
        self.stitch_fan(&fan);

        log::trace!(
            "inserted point {}: removed {}, created {}",
            vertex - FRAME_VERTEX_COUNT,
            bad.len(),
            fan.len()
        );
        true
    }

    fn circumcircle_contains(&self, triangle: &Triangle, point: Point) -> bool {
        let [a, b, c] = triangle.vertices.map(|v| self.coords[v]);
        in_circumcircle(a, b, c, point)
    }

    /// 绕行空洞边界
    ///
    /// 从第一个坏三角形的槽位 0 出发：邻居不是坏三角形时记录边界边并前进一个槽位；
    /// 是坏三角形时跳进去，从指回来的槽位的下一个继续。
    /// 第一条边的起点等于最后一条边的终点时闭合。
    ///
    /// 每条内部边最多被双向穿越各一次，每条边界边最多记录一次，
    /// 因此步数不超过 `6 * bad.len()`；超出说明几何已退化，返回 `None`。
    fn cavity_boundary(
        &self,
        bad: &[TriangleId],
        bad_set: &HashSet<TriangleId>,
    ) -> Option<Vec<BoundaryEdge>> {
        let max_steps = 6 * bad.len() + 3;
        let mut boundary: Vec<BoundaryEdge> = Vec::new();
        let mut current = *bad.first()?;
        let mut slot = 0;

        for _ in 0..max_steps {
            let triangle = self.triangle(current)?;
            match triangle.neighbors[slot] {
                Some(next) if bad_set.contains(&next) => {
                    let back = self.triangle(next)?.slot_of_neighbor(current)?;
                    slot = (back + 1) % 3;
                    current = next;
                }
                outside => {
                    let (start, end) = triangle.edge(slot);
                    boundary.push(BoundaryEdge {
                        start,
                        end,
                        outside,
                    });
                    slot = (slot + 1) % 3;

                    if let (Some(first), Some(last)) = (boundary.first(), boundary.last()) {
                        if first.start == last.end {
                            return Some(boundary);
                        }
                    }
                }
            }
        }

        None
    }

    fn remove_triangle(&mut self, id: TriangleId) {
        if let Some(slot) = self.arena.get_mut(id) {
            if slot.take().is_some() {
                self.active_count -= 1;
            }
        }
    }

    /// 用新顶点与每条边界边组成新三角形，并把外侧邻居指向新三角形
    fn fill_cavity(
        &mut self,
        vertex: VertexId,
        boundary: &[BoundaryEdge],
    ) -> Vec<(TriangleId, BoundaryEdge)> {
        boundary
            .iter()
            .map(|edge| {
                let id = self.push_triangle(
                    [vertex, edge.start, edge.end],
                    [edge.outside, None, None],
                );
                if let Some(outside) = edge.outside {
                    self.relink(outside, edge.start, edge.end, id);
                }
                (id, *edge)
            })
            .collect()
    }

    /// 外侧三角形原本指向被删除三角形的槽位，改为指向新三角形（按共享边匹配）
    fn relink(&mut self, outside: TriangleId, e0: VertexId, e1: VertexId, new_id: TriangleId) {
        if let Some(Some(triangle)) = self.arena.get_mut(outside) {
            if let Some(slot) = triangle.slot_opposite_edge(e0, e1) {
                triangle.neighbors[slot] = Some(new_id);
            }
        }
    }

    /// 围绕新顶点把扇形中的三角形首尾相连
    ///
    /// 第 i 个三角形 (p, start, end) 与后继共享边 (p, end)，与前驱共享边 (p, start)。
    /// 按共享边找槽位，不依赖顶点在元组中的位置。
    fn stitch_fan(&mut self, fan: &[(TriangleId, BoundaryEdge)]) {
        let n = fan.len();
        for (i, &(id, edge)) in fan.iter().enumerate() {
            let successor = fan[(i + 1) % n].0;
            let predecessor = fan[(i + n - 1) % n].0;

            if let Some(Some(triangle)) = self.arena.get_mut(id) {
                if let Some(slot) = triangle.slot_of_vertex(edge.start) {
                    triangle.neighbors[slot] = Some(successor);
                }
                if let Some(slot) = triangle.slot_of_vertex(edge.end) {
                    triangle.neighbors[slot] = Some(predecessor);
                }
            }
        }
    }

    /// 创建三角形并保证逆时针
    ///
    /// 顺时针时交换顶点 1、2 以及对应的邻居槽位，槽位语义不变。
    fn push_triangle(
        &mut self,
        mut vertices: [VertexId; 3],
        mut neighbors: [Option<TriangleId>; 3],
    ) -> TriangleId {
        let [a, b, c] = vertices.map(|v| self.coords[v]);
        if orientation(a, b, c) < 0.0 {
            log::warn!("clockwise triangle {:?} created, reordering", vertices);
            vertices.swap(1, 2);
            neighbors.swap(1, 2);
            self.diagnostics.orientation_fixes += 1;
        }

        let id = self.arena.len();
        self.arena.push(Some(Triangle {
            vertices,
            neighbors,
        }));
        self.active_count += 1;
        id
    }
}
