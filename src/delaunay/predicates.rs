//! 几何谓词
//!
//! 纯数值测试，被三角剖分、Voronoi 与验证工具共用。
//! 全部使用固定容差的浮点运算，不做自适应精度。

use super::point::Point;

/// 外接圆测试的判定阈值
pub const IN_CIRCLE_EPSILON: f64 = 1e-12;

/// 外心公式分母的退化阈值，低于此值时退回质心
pub const CIRCUMCENTER_EPSILON: f64 = 1e-8;

/// 判断 `p` 是否严格位于三角形 `(a, b, c)` 的外接圆内
///
/// 以 `p` 为原点构造 3×3 行列式：
///
/// ```text
/// | ax-px  ay-py  (ax-px)²+(ay-py)² |
/// | bx-px  by-py  (bx-px)²+(by-py)² |
/// | cx-px  cy-py  (cx-px)²+(cy-py)² |
/// ```
///
/// 值大于 [`IN_CIRCLE_EPSILON`] 时返回 `true`。
///
/// **注意**: 符号约定只对逆时针的 `(a, b, c)` 成立，调用方不做方向修正。
/// 三角剖分在创建每个三角形时负责维护逆时针顺序。
pub fn in_circumcircle(a: Point, b: Point, c: Point, p: Point) -> bool {
    let ax = a.x - p.x;
    let ay = a.y - p.y;
    let bx = b.x - p.x;
    let by = b.y - p.y;
    let cx = c.x - p.x;
    let cy = c.y - p.y;

    let a_squared = ax * ax + ay * ay;
    let b_squared = bx * bx + by * by;
    let c_squared = cx * cx + cy * cy;

    let det = ax * (by * c_squared - b_squared * cy) - ay * (bx * c_squared - b_squared * cx)
        + a_squared * (bx * cy - by * cx);

    det > IN_CIRCLE_EPSILON
}

/// 三角形的有向面积的两倍，逆时针为正
pub fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// 计算三角形的外心
///
/// 近共线三角形（分母绝对值小于 [`CIRCUMCENTER_EPSILON`]）返回质心。
pub fn circumcenter(a: Point, b: Point, c: Point) -> Point {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));

    if d.abs() < CIRCUMCENTER_EPSILON {
        return triangle_centroid(a, b, c);
    }

    let a_squared = a.length_sq();
    let b_squared = b.length_sq();
    let c_squared = c.length_sq();

    let ux = (a_squared * (b.y - c.y) + b_squared * (c.y - a.y) + c_squared * (a.y - b.y)) / d;
    let uy = (a_squared * (c.x - b.x) + b_squared * (a.x - c.x) + c_squared * (b.x - a.x)) / d;

    Point::new(ux, uy)
}

pub fn triangle_centroid(a: Point, b: Point, c: Point) -> Point {
    Point::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0)
}
