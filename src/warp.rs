// 该文件是 Chepai （车牌） 项目的一部分。
// src/warp.rs - 透视校正
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
use nalgebra::{Matrix3, SMatrix, SVector};
use thiserror::Error;
use tracing::{debug, error};

use crate::geometry::{Corner, Quadrilateral};

/// 三点共线判定阈值（两倍三角形面积）
const COLLINEAR_EPS: f64 = 1e-6;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WarpError {
  #[error("透视变换矩阵奇异: 源四边形退化")]
  SingularTransform,
  #[error("输出尺寸无效: {width}x{height}")]
  InvalidSize { width: u32, height: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
  Nearest,
  #[default]
  Bilinear,
}

/// 透视变换，`h` 将源点映射到目标点（`h[2][2] = 1`）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveTransform {
  h: Matrix3<f64>,
}

impl PerspectiveTransform {
  /// 求解把 `src` 各角点映射到 `dst` 对应角点的 8 个系数
  pub fn from_quads(src: &[(f64, f64); 4], dst: &[(f64, f64); 4]) -> Result<Self, WarpError> {
    if has_collinear_triple(src) || has_collinear_triple(dst) {
      return Err(WarpError::SingularTransform);
    }

    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();
    for (i, (&(sx, sy), &(dx, dy))) in src.iter().zip(dst.iter()).enumerate() {
      let r = 2 * i;
      a.row_mut(r)
        .copy_from_slice(&[sx, sy, 1.0, 0.0, 0.0, 0.0, -sx * dx, -sy * dx]);
      a.row_mut(r + 1)
        .copy_from_slice(&[0.0, 0.0, 0.0, sx, sy, 1.0, -sx * dy, -sy * dy]);
      b[r] = dx;
      b[r + 1] = dy;
    }

    let coeffs = a.lu().solve(&b).ok_or(WarpError::SingularTransform)?;
    if coeffs.iter().any(|c| !c.is_finite()) {
      return Err(WarpError::SingularTransform);
    }

    #[rustfmt::skip]
    let h = Matrix3::new(
      coeffs[0], coeffs[1], coeffs[2],
      coeffs[3], coeffs[4], coeffs[5],
      coeffs[6], coeffs[7], 1.0,
    );
    Ok(Self { h })
  }

  /// 8 个系数 `[a, b, c, d, e, f, g, h]`
  pub fn coefficients(&self) -> [f64; 8] {
    let h = &self.h;
    [
      h[(0, 0)],
      h[(0, 1)],
      h[(0, 2)],
      h[(1, 0)],
      h[(1, 1)],
      h[(1, 2)],
      h[(2, 0)],
      h[(2, 1)],
    ]
  }

  pub fn apply(&self, x: f64, y: f64) -> Option<(f64, f64)> {
    project(&self.h, x, y)
  }

  pub fn inverse(&self) -> Result<Self, WarpError> {
    let inv = self.h.try_inverse().ok_or(WarpError::SingularTransform)?;
    Ok(Self { h: inv })
  }
}

fn project(h: &Matrix3<f64>, x: f64, y: f64) -> Option<(f64, f64)> {
  let den = h[(2, 0)] * x + h[(2, 1)] * y + h[(2, 2)];
  if den.abs() < f64::EPSILON {
    return None;
  }
  let px = (h[(0, 0)] * x + h[(0, 1)] * y + h[(0, 2)]) / den;
  let py = (h[(1, 0)] * x + h[(1, 1)] * y + h[(1, 2)]) / den;
  Some((px, py))
}

fn has_collinear_triple(points: &[(f64, f64); 4]) -> bool {
  const TRIPLES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
  TRIPLES.iter().any(|&[i, j, k]| {
    let (ax, ay) = points[i];
    let (bx, by) = points[j];
    let (cx, cy) = points[k];
    ((bx - ax) * (cy - ay) - (by - ay) * (cx - ax)).abs() < COLLINEAR_EPS
  })
}

/// 将任意四边形区域重采样为轴对齐矩形
#[derive(Debug, Clone, Copy)]
pub struct PerspectiveWarper {
  pub interpolation: Interpolation,
  pub fill: Rgb<u8>,
}

impl Default for PerspectiveWarper {
  fn default() -> Self {
    Self {
      interpolation: Interpolation::default(),
      fill: Rgb([0, 0, 0]),
    }
  }
}

impl PerspectiveWarper {
  pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
    self.interpolation = interpolation;
    self
  }

  /// 把 `quad` 映射到 `width x height` 的矩形上
  ///
  /// 对每个目标像素用逆变换求源位置并采样，源图外的像素填充 `fill`。
  pub fn warp<T: Copy + Into<f64>>(
    &self,
    image: &RgbImage,
    quad: &Quadrilateral<T>,
    width: u32,
    height: u32,
  ) -> Result<RgbImage, WarpError> {
    if width == 0 || height == 0 {
      return Err(WarpError::InvalidSize { width, height });
    }

    let src = quad.points().map(|p| p.to_f64());
    let dst = Corner::ALL.map(|c| c.on_rect(f64::from(width), f64::from(height)));

    let transform = PerspectiveTransform::from_quads(&src, &dst).inspect_err(|_| {
      error!("透视变换求解失败, 源四边形: {:?}", src);
    })?;
    debug!("透视变换系数: {:?}", transform.coefficients());
    let inverse = transform.inverse()?;

    let mut out = RgbImage::from_pixel(width, height, self.fill);
    for (x, y, pixel) in out.enumerate_pixels_mut() {
      let Some((sx, sy)) = inverse.apply(f64::from(x), f64::from(y)) else {
        continue;
      };
      if let Some(sample) = self.sample(image, sx, sy) {
        *pixel = sample;
      }
    }

    Ok(out)
  }

  fn sample(&self, image: &RgbImage, x: f64, y: f64) -> Option<Rgb<u8>> {
    let (w, h) = (f64::from(image.width()), f64::from(image.height()));
    if !(x > -0.5 && y > -0.5 && x < w - 0.5 && y < h - 0.5) {
      return None;
    }

    match self.interpolation {
      Interpolation::Nearest => {
        let nx = x.round().clamp(0.0, w - 1.0) as u32;
        let ny = y.round().clamp(0.0, h - 1.0) as u32;
        Some(*image.get_pixel(nx, ny))
      }
      Interpolation::Bilinear => {
        let x = x.clamp(0.0, w - 1.0);
        let y = y.clamp(0.0, h - 1.0);
        let (x0, y0) = (x.floor(), y.floor());
        let x1 = (x0 + 1.0).min(w - 1.0);
        let y1 = (y0 + 1.0).min(h - 1.0);
        let (fx, fy) = (x - x0, y - y0);

        let p00 = image.get_pixel(x0 as u32, y0 as u32);
        let p01 = image.get_pixel(x1 as u32, y0 as u32);
        let p10 = image.get_pixel(x0 as u32, y1 as u32);
        let p11 = image.get_pixel(x1 as u32, y1 as u32);

        let channel = |c: usize| {
          let top = f64::from(p00[c]) * (1.0 - fx) + f64::from(p01[c]) * fx;
          let bottom = f64::from(p10[c]) * (1.0 - fx) + f64::from(p11[c]) * fx;
          (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8
        };
        Some(Rgb([channel(0), channel(1), channel(2)]))
      }
    }
  }
}
