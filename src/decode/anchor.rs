// 该文件是 Chepai （车牌） 项目的一部分。
// src/decode/anchor.rs - 最大概率锚点选择
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

use super::DecodeError;
use crate::grid::ProbabilityGrid;

/// 网格中的一个锚点及其概率
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
  pub y: usize,
  pub x: usize,
  pub confidence: f32,
}

/// 按行主序扫描，返回概率最大的锚点；并列时取最先出现者
pub fn select_anchor(probs: &ProbabilityGrid) -> Result<Anchor, DecodeError> {
  let mut best: Option<Anchor> = None;

  for ((y, x), &p) in probs.indexed_iter() {
    match best {
      Some(b) if p <= b.confidence => {}
      // NaN 不参与比较，除非网格中还没有任何候选
      Some(_) if p.is_nan() => {}
      _ => best = Some(Anchor { y, x, confidence: p }),
    }
  }

  best.ok_or_else(|| {
    let (h, w) = probs.dim();
    DecodeError::ShapeMismatch {
      probs: (h, w),
      affines: (0, h, w),
    }
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unique_maximum_is_found() {
    let mut probs = ProbabilityGrid::from_elem((5, 6), 0.1);
    probs[[2, 3]] = 0.8;
    let anchor = select_anchor(&probs).unwrap();
    assert_eq!((anchor.y, anchor.x), (2, 3));
    assert_eq!(anchor.confidence, 0.8);
  }

  #[test]
  fn ties_resolve_to_first_in_row_major_order() {
    let mut probs = ProbabilityGrid::zeros((4, 4));
    probs[[3, 0]] = 0.7;
    probs[[1, 2]] = 0.7;
    probs[[1, 3]] = 0.7;
    let anchor = select_anchor(&probs).unwrap();
    assert_eq!((anchor.y, anchor.x), (1, 2));
  }

  #[test]
  fn single_cell_grid_selects_origin() {
    let probs = ProbabilityGrid::from_elem((1, 1), 0.0);
    let anchor = select_anchor(&probs).unwrap();
    assert_eq!((anchor.y, anchor.x), (0, 0));
  }

  #[test]
  fn nan_does_not_hide_maximum() {
    let mut probs = ProbabilityGrid::zeros((2, 2));
    probs[[0, 1]] = f32::NAN;
    probs[[1, 1]] = 0.5;
    let anchor = select_anchor(&probs).unwrap();
    assert_eq!((anchor.y, anchor.x), (1, 1));
  }

  #[test]
  fn empty_grid_is_an_error() {
    let probs = ProbabilityGrid::zeros((0, 0));
    assert!(select_anchor(&probs).is_err());
  }
}
