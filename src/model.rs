// 该文件是 Chepai （车牌） 项目的一部分。
// src/model.rs - 模型
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

use crate::{
  frame::ImageTensor,
  grid::{AffineGrid, ProbabilityGrid},
};

/// 推理后端
///
/// 输入为 `(1, 3, H, W)`、取值 `[0, 1]` 的张量，输出去掉批次维度后的
/// 概率网格 `(grid_h, grid_w)` 与仿射网格 `(6, grid_h, grid_w)`。
/// 只做推理，不保存跨调用的可变状态。
pub trait InferenceAdapter {
  type Error;

  fn infer(&self, input: &ImageTensor) -> Result<(ProbabilityGrid, AffineGrid), Self::Error>;
}

impl<M: InferenceAdapter + ?Sized> InferenceAdapter for &M {
  type Error = M::Error;

  fn infer(&self, input: &ImageTensor) -> Result<(ProbabilityGrid, AffineGrid), Self::Error> {
    (**self).infer(input)
  }
}

#[cfg(feature = "rknpu")]
mod wpodnet;
#[cfg(feature = "rknpu")]
pub use self::wpodnet::{Wpodnet, WpodnetBuilder, WpodnetError};
