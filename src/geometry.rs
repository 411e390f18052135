// 该文件是 Chepai （车牌） 项目的一部分。
// src/geometry.rs - 四边形与角点定义
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::ops::Index;

/// 四边形角点，顺序固定为 左上 -> 右上 -> 右下 -> 左下
///
/// 仿射解码器输出与透视变换的目标矩形都依赖该顺序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
  TopLeft,
  TopRight,
  BottomRight,
  BottomLeft,
}

impl Corner {
  pub const ALL: [Corner; 4] = [
    Corner::TopLeft,
    Corner::TopRight,
    Corner::BottomRight,
    Corner::BottomLeft,
  ];

  pub fn index(self) -> usize {
    match self {
      Corner::TopLeft => 0,
      Corner::TopRight => 1,
      Corner::BottomRight => 2,
      Corner::BottomLeft => 3,
    }
  }

  pub fn name(self) -> &'static str {
    match self {
      Corner::TopLeft => "top_left",
      Corner::TopRight => "top_right",
      Corner::BottomRight => "bottom_right",
      Corner::BottomLeft => "bottom_left",
    }
  }

  /// 该角点在 `width x height` 矩形上的位置
  pub fn on_rect(self, width: f64, height: f64) -> (f64, f64) {
    match self {
      Corner::TopLeft => (0.0, 0.0),
      Corner::TopRight => (width, 0.0),
      Corner::BottomRight => (width, height),
      Corner::BottomLeft => (0.0, height),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<T> {
  pub x: T,
  pub y: T,
}

impl<T> Point<T> {
  pub fn new(x: T, y: T) -> Self {
    Self { x, y }
  }
}

impl<T: Copy + Into<f64>> Point<T> {
  pub fn to_f64(self) -> (f64, f64) {
    (self.x.into(), self.y.into())
  }
}

/// 按 [`Corner`] 顺序存放的四个点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrilateral<T> {
  points: [Point<T>; 4],
}

impl<T: Copy> Quadrilateral<T> {
  /// 以 左上、右上、右下、左下 的顺序构造
  pub fn new(points: [Point<T>; 4]) -> Self {
    Self { points }
  }

  pub fn corner(&self, corner: Corner) -> Point<T> {
    self.points[corner.index()]
  }

  pub fn points(&self) -> &[Point<T>; 4] {
    &self.points
  }

  pub fn iter(&self) -> impl Iterator<Item = (Corner, Point<T>)> + '_ {
    Corner::ALL.into_iter().map(|c| (c, self.corner(c)))
  }

  pub fn map<U: Copy>(&self, f: impl Fn(Point<T>) -> Point<U>) -> Quadrilateral<U> {
    Quadrilateral {
      points: self.points.map(f),
    }
  }
}

impl<T> Index<Corner> for Quadrilateral<T> {
  type Output = Point<T>;

  fn index(&self, corner: Corner) -> &Self::Output {
    &self.points[corner.index()]
  }
}

impl<T: Copy + Into<f64>> Quadrilateral<T> {
  /// 按角点顺序遍历各边，叉积同号即为凸且不自交
  ///
  /// 退化（面积为零）的四边形不算凸。
  pub fn is_convex(&self) -> bool {
    let pts = self.points.map(Point::to_f64);
    let mut sign = 0.0f64;
    for i in 0..4 {
      let (ax, ay) = pts[i];
      let (bx, by) = pts[(i + 1) % 4];
      let (cx, cy) = pts[(i + 2) % 4];
      let cross = (bx - ax) * (cy - by) - (by - ay) * (cx - bx);
      if cross == 0.0 {
        return false;
      }
      if sign == 0.0 {
        sign = cross.signum();
      } else if cross.signum() != sign {
        return false;
      }
    }
    true
  }

  /// 所有点是否落在 `[0, width) x [0, height)` 内
  pub fn is_within(&self, width: u32, height: u32) -> bool {
    let (w, h) = (f64::from(width), f64::from(height));
    self.points.iter().all(|p| {
      let (x, y) = p.to_f64();
      (0.0..w).contains(&x) && (0.0..h).contains(&y)
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rect(x0: i32, y0: i32, x1: i32, y1: i32) -> Quadrilateral<i32> {
    Quadrilateral::new([
      Point::new(x0, y0),
      Point::new(x1, y0),
      Point::new(x1, y1),
      Point::new(x0, y1),
    ])
  }

  #[test]
  fn corners_index_in_fixed_order() {
    let q = rect(1, 2, 10, 20);
    assert_eq!(q[Corner::TopLeft], Point::new(1, 2));
    assert_eq!(q[Corner::TopRight], Point::new(10, 2));
    assert_eq!(q[Corner::BottomRight], Point::new(10, 20));
    assert_eq!(q[Corner::BottomLeft], Point::new(1, 20));
    let order: Vec<_> = q.iter().map(|(c, _)| c).collect();
    assert_eq!(order, Corner::ALL.to_vec());
  }

  #[test]
  fn rectangle_is_convex() {
    assert!(rect(0, 0, 5, 5).is_convex());
  }

  #[test]
  fn bow_tie_is_not_convex() {
    let q = Quadrilateral::new([
      Point::new(0, 0),
      Point::new(10, 10),
      Point::new(10, 0),
      Point::new(0, 10),
    ]);
    assert!(!q.is_convex());
  }

  #[test]
  fn collapsed_quad_is_not_convex() {
    let q = Quadrilateral::new([Point::new(3, 3); 4]);
    assert!(!q.is_convex());
  }

  #[test]
  fn within_checks_half_open_bounds() {
    assert!(rect(0, 0, 99, 49).is_within(100, 50));
    assert!(!rect(0, 0, 100, 49).is_within(100, 50));
    assert!(!rect(-1, 0, 10, 10).is_within(100, 50));
  }
}
