// 该文件是 Chepai （车牌） 项目的一部分。
// src/frame.rs - NCHW 张量帧定义
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
use ndarray::Array4;

const RGB_CHANNELS: usize = 3;

/// 网络输入张量，形状 `(1, 3, H, W)`，取值范围 `[0, 1]`
#[derive(Debug, Clone)]
pub struct ImageTensor {
  data: Array4<f32>,
}

impl From<&RgbImage> for ImageTensor {
  fn from(image: &RgbImage) -> Self {
    let (width, height) = image.dimensions();
    let data = Array4::from_shape_fn(
      (1, RGB_CHANNELS, height as usize, width as usize),
      |(_, c, y, x)| f32::from(image.get_pixel(x as u32, y as u32)[c]) / 255.0,
    );
    Self { data }
  }
}

impl ImageTensor {
  pub fn height(&self) -> usize {
    self.data.dim().2
  }

  pub fn width(&self) -> usize {
    self.data.dim().3
  }

  pub fn channels(&self) -> usize {
    RGB_CHANNELS
  }

  pub fn as_array(&self) -> &Array4<f32> {
    &self.data
  }

  /// 还原为 u8 的 NCHW 字节序列，供只接受整型输入的后端使用
  pub fn to_nchw_u8(&self) -> Vec<u8> {
    self
      .data
      .iter()
      .map(|v| (v * 255.0).round().clamp(0.0, 255.0) as u8)
      .collect()
  }
}
