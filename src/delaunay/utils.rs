//! Delaunay 三角剖分工具函数模块
//!
//! 提供验证和辅助计算功能，主要供测试和调试诊断使用。

use super::point::Point;
use super::predicates::{in_circumcircle, orientation};
use crate::error::{EngineError, EngineResult};

// ============================================================================
// 公开 API
// ============================================================================

/// 验证三角剖分结果是否满足 Delaunay 性质
///
/// Delaunay 性质：任意三角形的外接圆内不包含其他点。
/// 对每个三角形穷举检查所有非顶点的输入点，使用与构建时相同的谓词和容差。
///
/// # 参数
/// - `triangles`: 逆时针三角形（外部索引）
/// - `points`: 点坐标列表
///
/// # 返回值
/// - `true`: 满足 Delaunay 性质
/// - `false`: 不满足或索引越界
pub fn validate_delaunay(triangles: &[[usize; 3]], points: &[Point]) -> bool {
    first_delaunay_violation(triangles, points).is_none()
}

/// 找出第一个违反 Delaunay 性质的 `(三角形下标, 点索引)`
///
/// 索引越界的三角形报告为 `(下标, usize::MAX)`。
pub fn first_delaunay_violation(
    triangles: &[[usize; 3]],
    points: &[Point],
) -> Option<(usize, usize)> {
    for (t_idx, triangle) in triangles.iter().enumerate() {
        if triangle.iter().any(|&v| v >= points.len()) {
            return Some((t_idx, usize::MAX));
        }

        let [a, b, c] = triangle.map(|v| points[v]);
        for (p_idx, &point) in points.iter().enumerate() {
            if triangle.contains(&p_idx) {
                continue;
            }
            if in_circumcircle(a, b, c, point) {
                return Some((t_idx, p_idx));
            }
        }
    }

    None
}

/// 检查三角形的顶点索引都在 `0..point_count` 内
///
/// 返回第一个越界的索引。
pub fn check_triangle_indices(triangles: &[[usize; 3]], point_count: usize) -> EngineResult<()> {
    match triangles.iter().flatten().find(|&&v| v >= point_count) {
        Some(&index) => Err(EngineError::IndexOutOfRange {
            index,
            len: point_count,
        }),
        None => Ok(()),
    }
}

/// 计算点集凸包的顶点数量
///
/// 使用 Andrew 单调链算法，共线的边界点不计入。
/// 重复点只计一次。
///
/// 理论上，对于 n 个点（其中 k 个在凸包边界上），
/// Delaunay 三角剖分产生的三角形数为 `2n - 2 - k`。
pub fn convex_hull_size(points: &[Point]) -> usize {
    convex_hull(points).len()
}

/// 凸包顶点（逆时针，按坐标去重）
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut sorted: Vec<Point> = points.iter().copied().filter(|p| p.is_finite()).collect();
    sorted.sort_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
    });
    sorted.dedup();

    if sorted.len() < 3 {
        return sorted;
    }

    let mut hull: Vec<Point> = Vec::with_capacity(sorted.len() * 2);

    // 下凸壳
    for &p in &sorted {
        while hull.len() >= 2 && orientation(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }

    // 上凸壳
    let lower_len = hull.len() + 1;
    for &p in sorted.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && orientation(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }

    hull.pop();
    hull
}

/// 理论三角形数量 `2n - 2 - k`，点数不足 3 时为 0
pub fn expected_triangle_count(point_count: usize, hull_size: usize) -> usize {
    if point_count < 3 {
        return 0;
    }
    (2 * point_count).saturating_sub(2 + hull_size)
}
