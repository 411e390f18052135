// 该文件是 Chepai （车牌） 项目的一部分。
// src/output/draw.rs - 定位结果可视化
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

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;

use crate::geometry::{Corner, Quadrilateral};

pub const DEFAULT_OUTLINE: Rgb<u8> = Rgb([255, 0, 0]); // 红色
pub const DEFAULT_OUTLINE_WIDTH: u32 = 3;

/// 解析颜色，支持常见颜色名和 `#rrggbb`
pub fn parse_color(name: &str) -> Option<Rgb<u8>> {
  let name = name.trim();
  if let Some(hex) = name.strip_prefix('#') {
    if hex.len() != 6 || !hex.is_ascii() {
      return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    return Some(Rgb([channel(0)?, channel(2)?, channel(4)?]));
  }

  let rgb = match name.to_ascii_lowercase().as_str() {
    "red" => [255, 0, 0],
    "green" => [0, 255, 0],
    "blue" => [0, 0, 255],
    "yellow" => [255, 255, 0],
    "white" => [255, 255, 255],
    "black" => [0, 0, 0],
    _ => return None,
  };
  Some(Rgb(rgb))
}

/// 绘制闭合四边形轮廓，线宽为 `width` 像素
///
/// 每条边沿法线方向以半像素步长平移多次绘制，得到加粗效果。
pub fn draw_quadrilateral(image: &mut RgbImage, quad: &Quadrilateral<i32>, color: Rgb<u8>, width: u32) {
  let width = width.max(1) as f32;
  let steps = ((width - 1.0) * 2.0) as u32;

  for (i, corner) in Corner::ALL.into_iter().enumerate() {
    let next = Corner::ALL[(i + 1) % Corner::ALL.len()];
    let (a, b) = (quad[corner], quad[next]);
    let (ax, ay) = (a.x as f32, a.y as f32);
    let (bx, by) = (b.x as f32, b.y as f32);

    let len = ((bx - ax).powi(2) + (by - ay).powi(2)).sqrt();
    let (nx, ny) = if len > 0.0 {
      (-(by - ay) / len, (bx - ax) / len)
    } else {
      (0.0, 0.0)
    };

    for step in 0..=steps {
      let offset = step as f32 * 0.5 - (width - 1.0) / 2.0;
      let (ox, oy) = (nx * offset, ny * offset);
      draw_line_segment_mut(image, (ax + ox, ay + oy), (bx + ox, by + oy), color);
    }
  }
}
