use std::cell::Cell;

use chepai::{
  frame::ImageTensor,
  grid::{AffineGrid, ProbabilityGrid},
  model::InferenceAdapter,
};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("synthetic backend failure")]
pub struct SyntheticError;

/// 返回固定网格的推理后端，并记录收到的张量尺寸
pub struct SyntheticAdapter {
  pub probs: ProbabilityGrid,
  pub affines: AffineGrid,
  pub fail: bool,
  pub seen: Cell<Option<(usize, usize)>>,
}

impl SyntheticAdapter {
  pub fn new(probs: ProbabilityGrid, affines: AffineGrid) -> Self {
    Self {
      probs,
      affines,
      fail: false,
      seen: Cell::new(None),
    }
  }

  /// `grid_h x grid_w` 网格，仅 `(y, x)` 处概率为 `p`，参数为 `theta`
  pub fn single_peak(grid_h: usize, grid_w: usize, y: usize, x: usize, p: f32, theta: [f32; 6]) -> Self {
    let mut probs = ProbabilityGrid::zeros((grid_h, grid_w));
    probs[[y, x]] = p;
    let mut affines = AffineGrid::zeros((6, grid_h, grid_w));
    for (c, v) in theta.into_iter().enumerate() {
      affines[[c, y, x]] = v;
    }
    Self::new(probs, affines)
  }
}

impl InferenceAdapter for SyntheticAdapter {
  type Error = SyntheticError;

  fn infer(&self, input: &ImageTensor) -> Result<(ProbabilityGrid, AffineGrid), Self::Error> {
    self.seen.set(Some((input.height(), input.width())));
    if self.fail {
      return Err(SyntheticError);
    }
    Ok((self.probs.clone(), self.affines.clone()))
  }
}

pub const IDENTITY: [f32; 6] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
