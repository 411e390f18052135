// 该文件是 Chepai （车牌） 项目的一部分。
// src/decode.rs - 锚点网格仿射解码
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

use image::imageops::FilterType;
use thiserror::Error;
use tracing::debug;

use crate::{
  geometry::Quadrilateral,
  grid::{AffineGrid, ProbabilityGrid, check_grids},
};

mod affine;
mod anchor;
mod mapper;
mod resize;

pub use self::affine::{QUAD_TEMPLATE, decode_affine};
pub use self::anchor::{Anchor, select_anchor};
pub use self::mapper::to_pixels;
pub use self::resize::{ResizeTarget, fixed_ratio_size, resize_to_fixed_ratio};

/// 锚点尺度常数，使解码后的四边形与单个锚点的典型目标尺寸相符
pub const SCALING_CONST: f32 = 7.75;
/// 短边基准尺寸
pub const BASE_SIDE: u32 = 288;
/// 缩放后短边上限
pub const MAX_SIDE: u32 = 608;
/// 网络步长
pub const NETWORK_STRIDE: u32 = 16;

#[derive(Error, Debug)]
pub enum DecodeError {
  #[error("图像尺寸无效: {width}x{height}")]
  InvalidImage { width: u32, height: u32 },
  #[error("网格形状不一致: 概率 {probs:?}, 仿射 {affines:?}")]
  ShapeMismatch {
    probs: (usize, usize),
    affines: (usize, usize, usize),
  },
}

/// 解码参数
#[derive(Debug, Clone, Copy)]
pub struct DecodeConfig {
  pub base_side: u32,
  pub max_side: u32,
  pub stride: u32,
  pub scaling_const: f32,
  pub filter: FilterType,
}

impl Default for DecodeConfig {
  fn default() -> Self {
    Self {
      base_side: BASE_SIDE,
      max_side: MAX_SIDE,
      stride: NETWORK_STRIDE,
      scaling_const: SCALING_CONST,
      filter: FilterType::CatmullRom,
    }
  }
}

/// 解码结果（像素坐标）
#[derive(Debug, Clone, Copy)]
pub struct Detection {
  pub anchor: Anchor,
  pub bounds: Quadrilateral<i32>,
}

impl Detection {
  pub fn confidence(&self) -> f32 {
    self.anchor.confidence
  }
}

/// 从推理输出中解码出置信度最高的目标
///
/// `orig_w`/`orig_h` 为原始图像尺寸，结果以原始图像像素坐标表示。
pub fn decode(
  probs: &ProbabilityGrid,
  affines: &AffineGrid,
  orig_w: u32,
  orig_h: u32,
  config: &DecodeConfig,
) -> Result<Detection, DecodeError> {
  let shape = check_grids(probs, affines)?;
  debug!("锚点网格: {}x{}", shape.width, shape.height);

  let anchor = select_anchor(probs)?;
  debug!(
    "最大概率锚点: ({}, {}), 置信度 {:.4}",
    anchor.y, anchor.x, anchor.confidence
  );

  let normalized = decode_affine(affines, anchor.y, anchor.x, config.scaling_const);
  let bounds = to_pixels(&normalized, orig_w, orig_h);
  debug!("解码边界: {:?}", bounds);

  Ok(Detection { anchor, bounds })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::geometry::Corner;

  #[test]
  fn decode_rejects_mismatched_grids() {
    let probs = ProbabilityGrid::zeros((3, 3));
    let affines = AffineGrid::zeros((6, 3, 2));
    let err = decode(&probs, &affines, 10, 10, &DecodeConfig::default()).unwrap_err();
    assert!(matches!(err, DecodeError::ShapeMismatch { probs: (3, 3), affines: (6, 3, 2) }));
  }

  #[test]
  fn decode_maps_best_anchor_to_pixels() {
    let mut probs = ProbabilityGrid::zeros((2, 2));
    probs[[1, 1]] = 0.9;
    let mut affines = AffineGrid::zeros((6, 2, 2));
    affines[[0, 1, 1]] = 0.1;
    affines[[4, 1, 1]] = 0.1;

    let detection = decode(&probs, &affines, 200, 100, &DecodeConfig::default()).unwrap();
    assert_eq!(detection.confidence(), 0.9);
    assert_eq!((detection.anchor.y, detection.anchor.x), (1, 1));

    // x = (±0.3875 + 1.5) / 2 * 200, y = (±0.3875 + 1.5) / 2 * 100
    let tl = detection.bounds[Corner::TopLeft];
    let br = detection.bounds[Corner::BottomRight];
    assert_eq!((tl.x, tl.y), (111, 55));
    assert_eq!((br.x, br.y), (188, 94));
  }
}
