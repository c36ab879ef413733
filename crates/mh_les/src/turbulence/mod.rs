// crates/mh_les/src/turbulence/mod.rs

//! LES 亚格子应力闭合
//!
//! - [`ScaleSimilarity`]: 尺度相似模型，非耗散，只提供显式应力项
//! - [`Smagorinsky`]: 涡黏模型，耗散，提供隐式 Laplacian 项
//! - [`MixedModel`]: 两者组合，可直接用于动量方程
//!
//! 模型通过 [`LesModelRegistry`] 按配置名称创建。

pub mod delta;
pub mod mixed;
pub mod registry;
pub mod scale_similarity;
pub mod smagorinsky;
pub mod traits;

pub use delta::{cube_root_vol, max_delta_xyz, LesDelta};
pub use mixed::MixedModel;
pub use registry::{LesModelFactory, LesModelRegistry};
pub use scale_similarity::{leonard_stress, ScaleSimilarity, DEFAULT_C_B};
pub use smagorinsky::{Smagorinsky, DEFAULT_CE, DEFAULT_CK};
pub use traits::{viscous_stress_divergence, LesContext, LesModel};
