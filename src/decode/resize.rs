// 该文件是 Chepai （车牌） 项目的一部分。
// src/decode/resize.rs - 固定比例缩放
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

use image::RgbImage;
use tracing::debug;

use super::{DecodeConfig, DecodeError};

/// 缩放目标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeTarget {
  pub width: u32,
  pub height: u32,
  /// 缩放后短边的边界尺寸
  pub bound_dim: u32,
}

/// 计算固定比例缩放尺寸
///
/// 长宽比越大短边越长，使不同长宽比的图像锚点密度大致一致，
/// 短边向上取整到步长倍数并限制在 `max_side` 内。
pub fn fixed_ratio_size(
  width: u32,
  height: u32,
  config: &DecodeConfig,
) -> Result<ResizeTarget, DecodeError> {
  if width == 0 || height == 0 {
    return Err(DecodeError::InvalidImage { width, height });
  }

  let (long, short) = (width.max(height), width.min(height));
  let wh_ratio = f64::from(long) / f64::from(short);
  let side = (wh_ratio * f64::from(config.base_side)).floor() as u64;
  let stride = u64::from(config.stride.max(1));
  let aligned = side.div_ceil(stride) * stride;
  let bound_dim = aligned.min(u64::from(config.max_side)) as u32;

  // floor(w * bound_dim / short)，整数运算避免浮点误差
  let scale = |dim: u32| -> u32 {
    let scaled = u64::from(dim) * u64::from(bound_dim) / u64::from(short);
    u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
  };
  let reg_w = scale(width);
  let reg_h = scale(height);

  Ok(ResizeTarget {
    width: reg_w,
    height: reg_h,
    bound_dim,
  })
}

/// 将图像缩放到固定比例尺寸，便于设置锚点
pub fn resize_to_fixed_ratio(image: &RgbImage, config: &DecodeConfig) -> Result<RgbImage, DecodeError> {
  let target = fixed_ratio_size(image.width(), image.height(), config)?;
  debug!(
    "缩放图像: {}x{} -> {}x{}",
    image.width(),
    image.height(),
    target.width,
    target.height
  );
  Ok(image::imageops::resize(
    image,
    target.width,
    target.height,
    config.filter,
  ))
}
