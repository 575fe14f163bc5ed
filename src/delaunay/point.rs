use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// 二维点（双精度）
///
/// 引擎内部统一使用 `f64`：外框顶点距离真实点很远，
/// 外接圆行列式中的平方项在 `f32` 下会丢失全部有效位。
/// 颜色、半径等渲染属性不属于点本身，由 [`crate::rendering::Palette`] 管理。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn length_sq(self) -> f64 {
        self.dot(self)
    }

    pub fn length(self) -> f64 {
        self.length_sq().sqrt()
    }

    pub fn distance(self, other: Self) -> f64 {
        (other - self).length()
    }

    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    /// 左手法线（逆时针旋转 90°）
    pub fn perp(self) -> Self {
        Self::new(-self.y, self.x)
    }

    /// 单位向量；零向量原样返回
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len > 0.0 {
            self * (1.0 / len)
        } else {
            self
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// 点集质心，空集返回原点
    pub fn centroid(points: &[Point]) -> Point {
        if points.is_empty() {
            return Point::ZERO;
        }
        let sum = points.iter().fold(Point::ZERO, |acc, &p| acc + p);
        sum * (1.0 / points.len() as f64)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

impl From<egui::Pos2> for Point {
    fn from(pos: egui::Pos2) -> Self {
        Point::new(pos.x as f64, pos.y as f64)
    }
}

impl From<Point> for egui::Pos2 {
    fn from(point: Point) -> Self {
        egui::Pos2::new(point.x as f32, point.y as f32)
    }
}
