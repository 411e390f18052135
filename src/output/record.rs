// 该文件是 Chepai （车牌） 项目的一部分。
// src/output/record.rs - 定位结果记录
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

use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, output::Render, predictor::Prediction};

#[derive(Error, Debug)]
pub enum RecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("序列化错误: {0}")]
  JsonError(#[from] serde_json::Error),
}

/// 将预测结果转为 JSON，角点按名称给出
pub fn prediction_record(prediction: &Prediction<'_>) -> Value {
  let corners: Map<String, Value> = prediction
    .bounds()
    .iter()
    .map(|(corner, p)| (corner.name().to_string(), json!([p.x, p.y])))
    .collect();

  json!({
    "confidence": prediction.confidence(),
    "bounds": corners,
    "check": format!("{:?}", prediction.check_bounds()),
    "image": {
      "width": prediction.image().width(),
      "height": prediction.image().height(),
    },
  })
}

/// 保存 JSON 记录，`record:///path/result.json`
#[derive(Debug, Clone)]
pub struct RecordOutput {
  path: String,
}

impl FromUrlWithScheme for RecordOutput {
  const SCHEME: &'static str = "record";
}

impl FromUrl for RecordOutput {
  type Error = RecordOutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(RecordOutputError::SchemeMismatch);
    }
    Ok(RecordOutput {
      path: url.path().to_string(),
    })
  }
}

impl Render for RecordOutput {
  type Error = RecordOutputError;

  fn render_result(&self, prediction: &Prediction<'_>) -> Result<(), Self::Error> {
    let path = Path::new(&self.path);
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }
    let record = serde_json::to_string_pretty(&prediction_record(prediction))?;
    std::fs::write(path, record)?;
    info!("保存记录到文件: {}", self.path);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::geometry::{Point, Quadrilateral};
  use image::RgbImage;

  #[test]
  fn record_names_every_corner() {
    let image = RgbImage::new(100, 50);
    let bounds = Quadrilateral::new([
      Point::new(16, 6),
      Point::new(24, 6),
      Point::new(24, 14),
      Point::new(16, 14),
    ]);
    let prediction = Prediction::new(&image, bounds, 1.0);
    let record = prediction_record(&prediction);

    assert_eq!(record["confidence"], json!(1.0));
    assert_eq!(record["bounds"]["top_left"], json!([16, 6]));
    assert_eq!(record["bounds"]["bottom_right"], json!([24, 14]));
    assert_eq!(record["check"], json!("Inside"));
    assert_eq!(record["image"]["width"], json!(100));
  }

  #[test]
  fn record_is_written_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("result.json");
    let url = Url::from_file_path(&path).unwrap();
    let url = Url::parse(&url.as_str().replacen("file:", "record:", 1)).unwrap();

    let image = RgbImage::new(10, 10);
    let bounds = Quadrilateral::new([Point::new(1, 1); 4]);
    RecordOutput::from_url(&url)
      .unwrap()
      .render_result(&Prediction::new(&image, bounds, 0.25))
      .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let value: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["confidence"], json!(0.25));
    assert_eq!(value["check"], json!("NonConvex"));
  }
}
