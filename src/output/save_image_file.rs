// 该文件是 Chepai （车牌） 项目的一部分。
// src/output/save_image_file.rs - 保存标注图像与校正图像
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

use std::collections::HashMap;

use image::Rgb;
use thiserror::Error;
use tracing::error;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  output::{
    Render, SaveImageError,
    draw::{DEFAULT_OUTLINE, DEFAULT_OUTLINE_WIDTH, parse_color},
  },
  predictor::{DEFAULT_WARP_HEIGHT, DEFAULT_WARP_WIDTH, Prediction},
};

#[derive(Error, Debug)]
pub enum SaveImageFileError {
  #[error("保存失败: {0}")]
  SaveError(#[from] SaveImageError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("参数无效: {0}={1}")]
  InvalidParameter(String, String),
}

fn check_scheme(url: &Url, expected: &str) -> Result<HashMap<String, String>, SaveImageFileError> {
  if url.scheme() != expected {
    error!(
      "URI 方案不匹配: 期望 '{}', 实际 '{}'",
      expected,
      url.scheme()
    );
    return Err(SaveImageFileError::SchemeMismatch(format!(
      "期望保存方式 '{}', 实际保存方式 '{}'",
      expected,
      url.scheme()
    )));
  }

  Ok(
    url
      .query_pairs()
      .map(|(k, v)| (String::from(k), String::from(v)))
      .collect(),
  )
}

fn parse_dim(query: &HashMap<String, String>, key: &str, default: u32) -> Result<u32, SaveImageFileError> {
  match query.get(key) {
    None => Ok(default),
    Some(v) => v
      .parse::<u32>()
      .ok()
      .filter(|&n| n > 0)
      .ok_or_else(|| SaveImageFileError::InvalidParameter(key.to_string(), v.clone())),
  }
}

/// 保存标注轮廓的图像，`annotate:///path/out.png?color=red&width=3`
#[derive(Debug, Clone)]
pub struct AnnotateOutput {
  path: String,
  color: Rgb<u8>,
  width: u32,
}

impl FromUrlWithScheme for AnnotateOutput {
  const SCHEME: &'static str = "annotate";
}

impl FromUrl for AnnotateOutput {
  type Error = SaveImageFileError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    let query = check_scheme(url, Self::SCHEME)?;

    let color = match query.get("color") {
      None => DEFAULT_OUTLINE,
      Some(v) => parse_color(v)
        .ok_or_else(|| SaveImageFileError::InvalidParameter("color".to_string(), v.clone()))?,
    };
    let width = parse_dim(&query, "width", DEFAULT_OUTLINE_WIDTH)?;

    Ok(AnnotateOutput {
      path: url.path().to_string(),
      color,
      width,
    })
  }
}

impl Render for AnnotateOutput {
  type Error = SaveImageFileError;

  fn render_result(&self, prediction: &Prediction<'_>) -> Result<(), Self::Error> {
    prediction.annotate(&self.path, self.color, self.width)?;
    Ok(())
  }
}

/// 保存透视校正后的目标图像，`warp:///path/plate.png?width=208&height=60`
#[derive(Debug, Clone)]
pub struct WarpOutput {
  path: String,
  width: u32,
  height: u32,
}

impl FromUrlWithScheme for WarpOutput {
  const SCHEME: &'static str = "warp";
}

impl FromUrl for WarpOutput {
  type Error = SaveImageFileError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    let query = check_scheme(url, Self::SCHEME)?;

    Ok(WarpOutput {
      path: url.path().to_string(),
      width: parse_dim(&query, "width", DEFAULT_WARP_WIDTH)?,
      height: parse_dim(&query, "height", DEFAULT_WARP_HEIGHT)?,
    })
  }
}

impl Render for WarpOutput {
  type Error = SaveImageFileError;

  fn render_result(&self, prediction: &Prediction<'_>) -> Result<(), Self::Error> {
    prediction.warp(&self.path, self.width, self.height)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn annotate_url_parses_query() {
    let url = Url::parse("annotate:///tmp/out.png?color=%2300ff00&width=5").unwrap();
    let output = AnnotateOutput::from_url(&url).unwrap();
    assert_eq!(output.path, "/tmp/out.png");
    assert_eq!(output.color, Rgb([0, 255, 0]));
    assert_eq!(output.width, 5);
  }

  #[test]
  fn annotate_url_defaults() {
    let url = Url::parse("annotate:///tmp/out.png").unwrap();
    let output = AnnotateOutput::from_url(&url).unwrap();
    assert_eq!(output.color, DEFAULT_OUTLINE);
    assert_eq!(output.width, DEFAULT_OUTLINE_WIDTH);
  }

  #[test]
  fn warp_url_parses_size() {
    let url = Url::parse("warp:///tmp/plate.png?width=240").unwrap();
    let output = WarpOutput::from_url(&url).unwrap();
    assert_eq!((output.width, output.height), (240, DEFAULT_WARP_HEIGHT));
  }

  #[test]
  fn invalid_parameters_are_rejected() {
    let url = Url::parse("warp:///tmp/plate.png?height=0").unwrap();
    assert!(matches!(
      WarpOutput::from_url(&url),
      Err(SaveImageFileError::InvalidParameter(..))
    ));
    let url = Url::parse("annotate:///tmp/out.png?color=mauve").unwrap();
    assert!(AnnotateOutput::from_url(&url).is_err());
  }

  #[test]
  fn wrong_scheme_is_rejected() {
    let url = Url::parse("warp:///tmp/plate.png").unwrap();
    assert!(matches!(
      AnnotateOutput::from_url(&url),
      Err(SaveImageFileError::SchemeMismatch(_))
    ));
  }
}
