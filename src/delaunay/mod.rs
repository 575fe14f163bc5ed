//! Delaunay 三角剖分与 Voronoi 图模块
//!
//! 本模块提供 alpha shape 的几何基础：
//! - **几何谓词**: 外接圆测试、外心、方向
//! - **Delaunay 三角剖分**: 外框 + 逐点插入 + 空洞重建
//! - **Voronoi 图**: Delaunay 的对偶图，凸包站点的区域用射线延伸
//!
//! # 架构概览
//!
//! ```text
//! 输入点集 (Vec<Point>)
//!        │
//!        ▼
//! ┌──────────────────────┐
//! │ Triangulation::build │  ── 全量重建，无跨调用状态
//! └──────────┬───────────┘
//!            │
//!            ▼
//!   真实三角形 (Vec<[usize; 3]>)
//!            │
//!            ├──────────────────────┐
//!            ▼                      ▼
//! ┌────────────────────┐   ┌──────────────────┐
//! │ compute_voronoi()  │   │ alpha_shape::    │
//! └────────────────────┘   │   classify()     │
//!                          └──────────────────┘
//! ```
//!
//! # 使用示例
//!
//! ```ignore
//! use alpha_shapes::delaunay::{triangulate, voronoi::compute_voronoi, Point};
//!
//! let points = vec![
//!     Point::new(0.0, 0.0),
//!     Point::new(100.0, 0.0),
//!     Point::new(50.0, 100.0),
//! ];
//!
//! let triangulation = triangulate(&points);
//! let triangles = triangulation.real_triangles();
//! let voronoi = compute_voronoi(&triangles, &points)?;
//! ```
//!
//! # 模块结构
//!
//! - `point`: 双精度二维点
//! - `predicates`: 几何谓词
//! - `triangulation`: 三角剖分引擎
//! - `voronoi`: Voronoi 图生成
//! - `utils`: 验证和辅助工具

mod point;
pub mod predicates;
mod triangulation;
mod utils;

#[cfg(test)]
mod voronoi_tests;

// ============================================================================
// 公开 API
// ============================================================================

pub use point::Point;

/// 三角剖分引擎
pub use triangulation::{
    triangulate, BuildDiagnostics, FrameConfig, Triangle, TriangleId, Triangulation, VertexId,
    DEFAULT_FRAME_RADIUS, FRAME_SPAN_FACTOR, FRAME_VERTEX_COUNT,
};

/// 验证与辅助函数
pub use utils::{
    check_triangle_indices, convex_hull, convex_hull_size, expected_triangle_count,
    first_delaunay_violation, validate_delaunay,
};

/// Voronoi 图模块
pub mod voronoi;
