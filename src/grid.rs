// 该文件是 Chepai （车牌） 项目的一部分。
// src/grid.rs - 锚点网格定义
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

use ndarray::{Array2, Array3};

use crate::decode::DecodeError;

/// 每个锚点的仿射参数个数 (2x3)
pub const AFFINE_PARAMS: usize = 6;

/// 目标存在概率，形状 `(grid_h, grid_w)`
pub type ProbabilityGrid = Array2<f32>;

/// 仿射参数，形状 `(6, grid_h, grid_w)`
///
/// 每个锚点的参数按行主序排列为 `[a00, a01, a02, a10, a11, a12]`。
pub type AffineGrid = Array3<f32>;

/// 网格尺寸
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
  pub height: usize,
  pub width: usize,
}

/// 校验推理输出的两个网格是否一致，返回共同的空间尺寸
pub fn check_grids(probs: &ProbabilityGrid, affines: &AffineGrid) -> Result<GridShape, DecodeError> {
  let (grid_h, grid_w) = probs.dim();
  let (channels, affine_h, affine_w) = affines.dim();

  if channels != AFFINE_PARAMS || affine_h != grid_h || affine_w != grid_w {
    return Err(DecodeError::ShapeMismatch {
      probs: (grid_h, grid_w),
      affines: (channels, affine_h, affine_w),
    });
  }

  if grid_h == 0 || grid_w == 0 {
    return Err(DecodeError::ShapeMismatch {
      probs: (grid_h, grid_w),
      affines: (channels, affine_h, affine_w),
    });
  }

  Ok(GridShape {
    height: grid_h,
    width: grid_w,
  })
}
