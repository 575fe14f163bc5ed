//! Alpha shape 过滤
//!
//! `alpha` 是探测圆半径的倒数 `r = 1 / alpha`，两个探测圆相切时圆心距离为 `2r`，
//! 因此阈值取 `2 / alpha`：
//!
//! - 三角形三条边都不超过阈值时填充
//! - 每条边不超过阈值时单独进入线框，与所在三角形是否填充无关
//!
//! 这是按边长的近似，而不是教科书上按外接圆半径比较的 alpha shape，保持不变。

use std::collections::BTreeSet;

use crate::delaunay::{check_triangle_indices, Point};
use crate::error::{EngineError, EngineResult};

/// 一次分类的结果
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaComplex {
    pub alpha: f64,
    pub threshold: f64,
    /// 填充的三角形（外部索引）
    pub filled: Vec<[usize; 3]>,
    /// 线框边，每条无向边一次，`[小, 大]` 有序
    pub edges: Vec<[usize; 2]>,
}

/// 带有效 alpha 的过滤器
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlphaShape {
    alpha: f64,
}

impl AlphaShape {
    pub fn new(alpha: f64) -> EngineResult<Self> {
        validate_alpha(alpha)?;
        Ok(Self { alpha })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// 更新 alpha，无效值时保持原值并返回错误
    pub fn set_alpha(&mut self, alpha: f64) -> EngineResult<()> {
        validate_alpha(alpha)?;
        self.alpha = alpha;
        Ok(())
    }

    /// 边长阈值 `2 / alpha`
    pub fn threshold(&self) -> f64 {
        2.0 / self.alpha
    }

    /// 探测圆半径 `1 / alpha`
    pub fn probe_radius(&self) -> f64 {
        1.0 / self.alpha
    }

    /// 三角形顶点索引越界时返回 [`EngineError::IndexOutOfRange`]
    pub fn classify(
        &self,
        triangles: &[[usize; 3]],
        points: &[Point],
    ) -> EngineResult<AlphaComplex> {
        check_triangle_indices(triangles, points.len())?;
        let threshold = self.threshold();
        let mut filled = Vec::new();
        let mut edges = BTreeSet::new();

        for &triangle in triangles {
            let [a, b, c] = triangle;
            let sides = [(a, b), (a, c), (b, c)];
            let within = sides.map(|(u, v)| points[u].distance(points[v]) <= threshold);

            if within.iter().all(|&ok| ok) {
                filled.push(triangle);
            }

            for (&(u, v), &ok) in sides.iter().zip(within.iter()) {
                if ok {
                    edges.insert([u.min(v), u.max(v)]);
                }
            }
        }

        log::trace!(
            "alpha {}: threshold {:.3}, {} filled of {}, {} wireframe edges",
            self.alpha,
            threshold,
            filled.len(),
            triangles.len(),
            edges.len()
        );

        Ok(AlphaComplex {
            alpha: self.alpha,
            threshold,
            filled,
            edges: edges.into_iter().collect(),
        })
    }
}

/// 对三角形按 `2 / alpha` 分类
///
/// `alpha` 必须有限且大于 0，否则返回 [`EngineError::InvalidParameter`]；
/// 三角形引用不存在的点时返回 [`EngineError::IndexOutOfRange`]。
pub fn classify(
    triangles: &[[usize; 3]],
    points: &[Point],
    alpha: f64,
) -> EngineResult<AlphaComplex> {
    AlphaShape::new(alpha)?.classify(triangles, points)
}

fn validate_alpha(alpha: f64) -> EngineResult<()> {
    if alpha.is_finite() && alpha > 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidParameter {
            name: "alpha",
            value: alpha,
        })
    }
}
