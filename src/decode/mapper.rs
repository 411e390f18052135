// 该文件是 Chepai （车牌） 项目的一部分。
// src/decode/mapper.rs - 归一化坐标到像素坐标
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

use crate::geometry::{Point, Quadrilateral};

/// 按原始图像尺寸缩放并向零截断为整数像素坐标
///
/// 不做越界截断，越界与否由调用方检查。
pub fn to_pixels(normalized: &Quadrilateral<f32>, orig_w: u32, orig_h: u32) -> Quadrilateral<i32> {
  let (w, h) = (orig_w as f32, orig_h as f32);
  normalized.map(|p| Point::new((p.x * w) as i32, (p.y * h) as i32))
}
