// 该文件是 Chepai （车牌） 项目的一部分。
// src/decode/affine.rs - 仿射参数到四边形的解码
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

use nalgebra::{Matrix2x3, Matrix2x4, Matrix3x4};

use crate::{
  geometry::{Point, Quadrilateral},
  grid::AffineGrid,
};

/// 单位四边形模板（齐次坐标），列顺序为 左上、右上、右下、左下
#[rustfmt::skip]
pub const QUAD_TEMPLATE: [[f32; 4]; 3] = [
  [-0.5,  0.5, 0.5, -0.5],
  [-0.5, -0.5, 0.5,  0.5],
  [ 1.0,  1.0, 1.0,  1.0],
];

fn template() -> Matrix3x4<f32> {
  Matrix3x4::from_fn(|r, c| QUAD_TEMPLATE[r][c])
}

/// 取出锚点处的 θ，并将对角缩放项截断为非负，避免四边形镜像翻转
fn theta_at(affines: &AffineGrid, anchor_y: usize, anchor_x: usize) -> Matrix2x3<f32> {
  let p = affines.slice(ndarray::s![.., anchor_y, anchor_x]);
  Matrix2x3::new(
    p[0].max(0.0),
    p[1],
    p[2],
    p[3],
    p[4].max(0.0),
    p[5],
  )
}

/// 将锚点 `(anchor_y, anchor_x)` 处的仿射参数解码为归一化坐标下的四边形
///
/// 调用方需保证锚点在网格范围内。
pub fn decode_affine(
  affines: &AffineGrid,
  anchor_y: usize,
  anchor_x: usize,
  scaling_const: f32,
) -> Quadrilateral<f32> {
  let (_, grid_h, grid_w) = affines.dim();
  let theta = theta_at(affines, anchor_y, anchor_x);

  let bounds: Matrix2x4<f32> = theta * template() * scaling_const;

  let (ox, oy) = (anchor_x as f32 + 0.5, anchor_y as f32 + 0.5);
  let (gw, gh) = (grid_w as f32, grid_h as f32);
  let points = std::array::from_fn(|i| {
    Point::new(
      (bounds[(0, i)] + ox) / gw,
      (bounds[(1, i)] + oy) / gh,
    )
  });

  Quadrilateral::new(points)
}
