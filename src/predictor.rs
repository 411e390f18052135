// 该文件是 Chepai （车牌） 项目的一部分。
// src/predictor.rs - 车牌定位预测
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

use std::path::Path;

use image::{Rgb, RgbImage};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
  decode::{DecodeConfig, DecodeError, decode, resize_to_fixed_ratio},
  frame::ImageTensor,
  geometry::Quadrilateral,
  model::InferenceAdapter,
  output::{
    SaveImageError,
    draw::{DEFAULT_OUTLINE, DEFAULT_OUTLINE_WIDTH, draw_quadrilateral},
    save_image,
  },
  warp::{PerspectiveWarper, WarpError},
};

/// 校正输出的默认尺寸（车牌长宽比）
pub const DEFAULT_WARP_WIDTH: u32 = 208;
pub const DEFAULT_WARP_HEIGHT: u32 = 60;

#[derive(Error, Debug)]
pub enum PredictError {
  #[error("解码错误: {0}")]
  Decode(#[from] DecodeError),
  #[error("推理错误: {0}")]
  Inference(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// 车牌定位器
///
/// 不保存跨调用的可变状态；同一实例同一时刻只应有一次推理。
pub struct Predictor<M> {
  model: M,
  config: DecodeConfig,
}

impl<M> Predictor<M>
where
  M: InferenceAdapter,
  M::Error: std::error::Error + Send + Sync + 'static,
{
  pub fn new(model: M) -> Self {
    Self {
      model,
      config: DecodeConfig::default(),
    }
  }

  pub fn with_config(mut self, config: DecodeConfig) -> Self {
    self.config = config;
    self
  }

  pub fn config(&self) -> &DecodeConfig {
    &self.config
  }

  /// 定位图像中置信度最高的目标
  pub fn predict<'a>(&self, image: &'a RgbImage) -> Result<Prediction<'a>, PredictError> {
    let (orig_w, orig_h) = image.dimensions();

    let resized = resize_to_fixed_ratio(image, &self.config)?;
    let tensor = ImageTensor::from(&resized);

    let now = std::time::Instant::now();
    let (probs, affines) = self
      .model
      .infer(&tensor)
      .map_err(|e| PredictError::Inference(Box::new(e)))?;
    debug!("推理完成，耗时: {:.2?}", now.elapsed());

    let detection = decode(&probs, &affines, orig_w, orig_h, &self.config)?;

    let prediction = Prediction {
      image,
      bounds: detection.bounds,
      confidence: detection.confidence(),
    };

    match prediction.check_bounds() {
      BoundsCheck::Inside => {}
      check => warn!("解码四边形异常: {:?}, 边界: {:?}", check, prediction.bounds),
    }

    Ok(prediction)
  }
}

/// 解码四边形的几何检查结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsCheck {
  Inside,
  /// 有角点落在图像外
  OutOfImage,
  /// 自交或退化
  NonConvex,
}

/// 预测结果
///
/// 借用原始图像，创建后只读。
#[derive(Debug, Clone, Copy)]
pub struct Prediction<'a> {
  image: &'a RgbImage,
  bounds: Quadrilateral<i32>,
  confidence: f32,
}

impl<'a> Prediction<'a> {
  pub fn new(image: &'a RgbImage, bounds: Quadrilateral<i32>, confidence: f32) -> Self {
    Self {
      image,
      bounds,
      confidence,
    }
  }

  pub fn image(&self) -> &'a RgbImage {
    self.image
  }

  pub fn bounds(&self) -> &Quadrilateral<i32> {
    &self.bounds
  }

  pub fn confidence(&self) -> f32 {
    self.confidence
  }

  /// 不截断越界角点，只报告
  pub fn check_bounds(&self) -> BoundsCheck {
    if !self.bounds.is_convex() {
      BoundsCheck::NonConvex
    } else if !self.bounds.is_within(self.image.width(), self.image.height()) {
      BoundsCheck::OutOfImage
    } else {
      BoundsCheck::Inside
    }
  }

  /// 在图像副本上绘制四边形轮廓
  pub fn annotated(&self, outline: Rgb<u8>, width: u32) -> RgbImage {
    let mut canvas = self.image.clone();
    draw_quadrilateral(&mut canvas, &self.bounds, outline, width);
    canvas
  }

  /// 绘制轮廓并保存到 `path`，已存在的文件会被覆盖
  pub fn annotate(&self, path: impl AsRef<Path>, outline: Rgb<u8>, width: u32) -> Result<(), SaveImageError> {
    save_image(path.as_ref(), &self.annotated(outline, width))
  }

  /// 使用默认颜色与线宽标注
  pub fn annotate_default(&self, path: impl AsRef<Path>) -> Result<(), SaveImageError> {
    self.annotate(path, DEFAULT_OUTLINE, DEFAULT_OUTLINE_WIDTH)
  }

  /// 将四边形区域校正为 `width x height` 的图像
  pub fn warped(&self, width: u32, height: u32) -> Result<RgbImage, WarpError> {
    PerspectiveWarper::default().warp(self.image, &self.bounds, width, height)
  }

  pub fn warp(&self, path: impl AsRef<Path>, width: u32, height: u32) -> Result<(), SaveImageError> {
    let warped = self.warped(width, height)?;
    info!("校正图像: {}x{}", width, height);
    save_image(path.as_ref(), &warped)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::geometry::Point;

  fn quad(points: [(i32, i32); 4]) -> Quadrilateral<i32> {
    Quadrilateral::new(points.map(|(x, y)| Point::new(x, y)))
  }

  #[test]
  fn inside_bounds_pass_check() {
    let image = RgbImage::new(100, 50);
    let p = Prediction::new(&image, quad([(10, 10), (60, 12), (58, 40), (12, 38)]), 0.9);
    assert_eq!(p.check_bounds(), BoundsCheck::Inside);
  }

  #[test]
  fn out_of_image_is_reported_not_clamped() {
    let image = RgbImage::new(100, 50);
    let bounds = quad([(-5, 10), (60, 12), (58, 40), (12, 38)]);
    let p = Prediction::new(&image, bounds, 0.9);
    assert_eq!(p.check_bounds(), BoundsCheck::OutOfImage);
    assert_eq!(p.bounds(), &bounds);
  }

  #[test]
  fn self_intersecting_is_reported() {
    let image = RgbImage::new(100, 50);
    let p = Prediction::new(&image, quad([(10, 10), (60, 40), (60, 10), (10, 40)]), 0.9);
    assert_eq!(p.check_bounds(), BoundsCheck::NonConvex);
  }

  #[test]
  fn annotated_leaves_source_untouched() {
    let image = RgbImage::new(40, 30);
    let p = Prediction::new(&image, quad([(5, 5), (30, 5), (30, 20), (5, 20)]), 0.5);
    let canvas = p.annotated(Rgb([255, 0, 0]), 1);
    assert_eq!(*canvas.get_pixel(5, 5), Rgb([255, 0, 0]));
    assert_eq!(*canvas.get_pixel(17, 5), Rgb([255, 0, 0]));
    assert_eq!(*canvas.get_pixel(17, 12), Rgb([0, 0, 0]));
    assert_eq!(*image.get_pixel(5, 5), Rgb([0, 0, 0]));
  }

  #[test]
  fn degenerate_bounds_fail_to_warp() {
    let image = RgbImage::new(40, 30);
    let p = Prediction::new(&image, quad([(5, 5); 4]), 0.5);
    assert_eq!(p.warped(20, 10).unwrap_err(), WarpError::SingularTransform);
  }
}
