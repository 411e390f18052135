// 该文件是 Chepai （车牌） 项目的一部分。
// src/bin/simple_oneshot.rs - 单张图像车牌定位
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

use anyhow::Result;
use clap::Parser;
use tracing::info;
use url::Url;

use chepai::{
  FromUrl, Predictor,
  input::ImageFileInput,
  model::WpodnetBuilder,
  output::{OutputWrapper, Render},
};

/// Chepai 参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// RKNN 模型文件路径，例如 rknn:///opt/wpodnet.rknn
  #[arg(long, value_name = "MODEL")]
  pub model: Url,
  /// 输入图像，例如 image:///data/car.jpg
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出，可重复指定
  /// 支持格式:
  /// - 标注: annotate:///out/car.png?color=red&width=3
  /// - 校正: warp:///out/plate.png?width=208&height=60
  /// - 记录: record:///out/result.json
  #[arg(long, value_name = "OUTPUT")]
  pub output: Vec<Url>,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("模型文件路径: {}", args.model);
  info!("输入来源: {}", args.input);

  let input = ImageFileInput::from_url(&args.input)?;
  let model = WpodnetBuilder::from_url(&args.model)?.build()?;
  let outputs = args
    .output
    .iter()
    .map(OutputWrapper::from_url)
    .collect::<Result<Vec<_>, _>>()?;
  let predictor = Predictor::new(model);

  info!("开始推理...");
  for image in input {
    let now = std::time::Instant::now();
    let prediction = predictor.predict(&image)?;
    info!(
      "定位完成，耗时: {:.2?}, 置信度: {:.4}, 边界: {:?}",
      now.elapsed(),
      prediction.confidence(),
      prediction.bounds()
    );

    for output in &outputs {
      output.render_result(&prediction)?;
    }
  }

  Ok(())
}
