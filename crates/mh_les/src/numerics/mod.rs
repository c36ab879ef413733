// crates/mh_les/src/numerics/mod.rs

//! 数值算子
//!
//! - [`operators`]: 有限体积显式微积分（插值、梯度、散度）
//! - [`matrix`]: 动量方程项的隐式矩阵 + 显式源表示

pub mod matrix;
pub mod operators;

pub use matrix::MomentumMatrix;
