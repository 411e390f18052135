// 该文件是 Chepai （车牌） 项目的一部分。
// src/output.rs - 输出定义
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

use image::RgbImage;
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{FromUrl, predictor::Prediction, warp::WarpError};
#[cfg(any(feature = "save_image_file", feature = "record_file"))]
use crate::FromUrlWithScheme;

pub trait Render: Sized {
  type Error;
  fn render_result(&self, prediction: &Prediction<'_>) -> Result<(), Self::Error>;
}

pub mod draw;

#[cfg(feature = "save_image_file")]
mod save_image_file;
#[cfg(feature = "save_image_file")]
pub use self::save_image_file::{AnnotateOutput, SaveImageFileError, WarpOutput};

#[cfg(feature = "record_file")]
mod record;
#[cfg(feature = "record_file")]
pub use self::record::{RecordOutput, RecordOutputError, prediction_record};

#[derive(Error, Debug)]
pub enum SaveImageError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("透视校正错误: {0}")]
  WarpError(#[from] WarpError),
}

/// 保存图像，必要时创建父目录；已存在的文件会被覆盖
pub fn save_image(path: &Path, image: &RgbImage) -> Result<(), SaveImageError> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)?;
  }

  image.save(path)?;
  info!("保存图像到文件: {}", path.display());

  Ok(())
}

#[derive(Error, Debug)]
pub enum OutputError {
  #[cfg(feature = "save_image_file")]
  #[error("保存图像文件错误: {0}")]
  SaveImageFileError(#[from] SaveImageFileError),
  #[cfg(feature = "record_file")]
  #[error("记录输出错误: {0}")]
  RecordOutputError(#[from] RecordOutputError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

pub enum OutputWrapper {
  #[cfg(feature = "save_image_file")]
  Annotate(AnnotateOutput),
  #[cfg(feature = "save_image_file")]
  Warp(WarpOutput),
  #[cfg(feature = "record_file")]
  Record(RecordOutput),
}

impl FromUrl for OutputWrapper {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      #[cfg(feature = "save_image_file")]
      AnnotateOutput::SCHEME => Ok(OutputWrapper::Annotate(AnnotateOutput::from_url(url)?)),
      #[cfg(feature = "save_image_file")]
      WarpOutput::SCHEME => Ok(OutputWrapper::Warp(WarpOutput::from_url(url)?)),
      #[cfg(feature = "record_file")]
      RecordOutput::SCHEME => Ok(OutputWrapper::Record(RecordOutput::from_url(url)?)),
      scheme => Err(OutputError::SchemeMismatch(scheme.to_string())),
    }
  }
}

impl Render for OutputWrapper {
  type Error = OutputError;

  fn render_result(&self, prediction: &Prediction<'_>) -> Result<(), Self::Error> {
    match self {
      #[cfg(feature = "save_image_file")]
      OutputWrapper::Annotate(output) => output
        .render_result(prediction)
        .map_err(OutputError::from),
      #[cfg(feature = "save_image_file")]
      OutputWrapper::Warp(output) => output
        .render_result(prediction)
        .map_err(OutputError::from),
      #[cfg(feature = "record_file")]
      OutputWrapper::Record(output) => output
        .render_result(prediction)
        .map_err(OutputError::from),
      #[allow(unreachable_patterns)]
      _ => Ok(()),
    }
  }
}
