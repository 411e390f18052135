// 该文件是 Chepai （车牌） 项目的一部分。
// src/model/wpodnet.rs - WPOD-Net 的 RKNN 推理后端
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

use ndarray::{Array2, Array3, ArrayView3, s};
use rknpu::{Context, InitFlags, TensorType};
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  decode::NETWORK_STRIDE,
  frame::ImageTensor,
  grid::{AFFINE_PARAMS, AffineGrid, ProbabilityGrid},
  model::InferenceAdapter,
};

const WPODNET_NUM_INPUTS: u32 = 1;
const WPODNET_NUM_OUTPUTS: u32 = 2;
/// 概率输出的通道数，第 0 通道为目标概率
const WPODNET_PROB_CHANNELS: usize = 2;

/// RKNN 上运行的 WPOD-Net
///
/// 模型转换时需将输入配置为 u8 NCHW 且 `std = 255`，
/// 使 NPU 上的归一化与 `[0, 1]` 张量语义一致。
pub struct Wpodnet {
  context: Context,
}

#[derive(Error, Debug)]
pub enum WpodnetError {
  #[error("模型加载错误: {0}")]
  ModelLoadError(#[from] std::io::Error),
  #[error("模型无效: {0}, 错误: {1}")]
  ModelInvalid(String, rknpu::Error),
  #[error("RKNN 错误: {0}")]
  RknnError(#[from] rknpu::Error),
  #[error("模型路径错误: {0}")]
  ModelPathError(String),
  #[error("输出大小不匹配: 输出 {index} 期望 {expected}, 实际 {actual}")]
  OutputSizeMismatch {
    index: u32,
    expected: usize,
    actual: usize,
  },
}

impl WpodnetError {
  pub fn invalid(msg: &str, e: rknpu::Error) -> Self {
    WpodnetError::ModelInvalid(msg.to_string(), e)
  }
}

pub struct WpodnetBuilder {
  model_path: String,
  flags: InitFlags,
}

impl FromUrlWithScheme for WpodnetBuilder {
  const SCHEME: &'static str = "rknn";
}

impl FromUrl for WpodnetBuilder {
  type Error = WpodnetError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(WpodnetError::ModelPathError(format!(
        "模型路径必须使用 {} 方案",
        Self::SCHEME
      )));
    }

    Ok(WpodnetBuilder {
      model_path: url.path().to_string(),
      flags: InitFlags::default(),
    })
  }
}

impl WpodnetBuilder {
  pub fn flags(mut self, flags: InitFlags) -> Self {
    self.flags = flags;
    self
  }

  pub fn build(self) -> Result<Wpodnet, WpodnetError> {
    info!("加载模型文件: {}", self.model_path);
    let model_data = std::fs::read(&self.model_path)?;
    debug!(
      "模型文件大小: {:.2} MB",
      model_data.len() as f64 / (1024.0 * 1024.0)
    );

    info!("创建 RKNN 推理上下文");
    let context = Context::new(&model_data, self.flags)?;

    let num_inputs = context
      .num_inputs()
      .map_err(|e| WpodnetError::invalid("无法获取输入数量", e))?;
    let num_outputs = context
      .num_outputs()
      .map_err(|e| WpodnetError::invalid("无法获取输出数量", e))?;

    if num_inputs != WPODNET_NUM_INPUTS || num_outputs != WPODNET_NUM_OUTPUTS {
      let msg = format!(
        "预期模型输入/输出数量为 {}/{}, 实际为 {}/{}",
        WPODNET_NUM_INPUTS, WPODNET_NUM_OUTPUTS, num_inputs, num_outputs
      );
      error!("{}", msg);
      return Err(WpodnetError::invalid(&msg, rknpu::Error::InvalidModel));
    }

    info!("模型加载完成");
    Ok(Wpodnet { context })
  }
}

fn check_len(index: u32, data: &[f32], expected: usize) -> Result<(), WpodnetError> {
  if data.len() != expected {
    error!(
      "输出 {} 大小不匹配: 期望 {}, 实际 {}",
      index,
      expected,
      data.len()
    );
    return Err(WpodnetError::OutputSizeMismatch {
      index,
      expected,
      actual: data.len(),
    });
  }
  Ok(())
}

impl InferenceAdapter for Wpodnet {
  type Error = WpodnetError;

  fn infer(&self, input: &ImageTensor) -> Result<(ProbabilityGrid, AffineGrid), Self::Error> {
    let stride = NETWORK_STRIDE as usize;
    let grid_h = input.height() / stride;
    let grid_w = input.width() / stride;
    let spatial = grid_h * grid_w;

    debug!("设置模型输入: {}x{}", input.width(), input.height());
    self.context.set_input(
      0,
      &input.to_nchw_u8(),
      rknpu::TensorFormat::NCHW,
      TensorType::UInt8,
    )?;

    debug!("执行模型推理");
    self.context.run()?;

    let output = self.context.get_outputs()?;

    let probs = output.get_f32(0)?;
    check_len(0, probs, WPODNET_PROB_CHANNELS * spatial)?;
    let affines = output.get_f32(1)?;
    check_len(1, affines, AFFINE_PARAMS * spatial)?;

    // 长度已校验，形状转换不会失败
    let probs = ArrayView3::from_shape((WPODNET_PROB_CHANNELS, grid_h, grid_w), probs)
      .map_err(|_| WpodnetError::OutputSizeMismatch {
        index: 0,
        expected: WPODNET_PROB_CHANNELS * spatial,
        actual: probs.len(),
      })?;
    let probs: Array2<f32> = probs.slice(s![0, .., ..]).to_owned();
    let affines = Array3::from_shape_vec((AFFINE_PARAMS, grid_h, grid_w), affines.to_vec())
      .map_err(|_| WpodnetError::OutputSizeMismatch {
        index: 1,
        expected: AFFINE_PARAMS * spatial,
        actual: affines.len(),
      })?;

    debug!("锚点网格: {}x{}", grid_w, grid_h);
    Ok((probs, affines))
  }
}
