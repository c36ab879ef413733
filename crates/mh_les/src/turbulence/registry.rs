// crates/mh_les/src/turbulence/registry.rs

//! LES 模型注册中心
//!
//! 按配置中的 `model` 名称选择模型，未指定时为 `mixed_smagorinsky`。

use std::collections::BTreeMap;
use std::fmt;

use mh_config::DEFAULT_MODEL;
use mh_foundation::{require, MhError, MhResult};

use super::mixed::MixedModel;
use super::scale_similarity::ScaleSimilarity;
use super::smagorinsky::Smagorinsky;
use super::traits::{LesContext, LesModel};
use crate::fields::{SurfaceScalarField, VolVectorField};

/// LES 模型构造函数
pub type LesModelFactory =
    fn(LesContext, &VolVectorField, &SurfaceScalarField) -> MhResult<Box<dyn LesModel>>;

/// LES 模型注册中心
///
/// 按配置中的 `model` 选择模型，缺少配置时使用 `mixed_smagorinsky`。
#[derive(Clone)]
pub struct LesModelRegistry {
    factories: BTreeMap<String, LesModelFactory>,
}

impl LesModelRegistry {
    /// 空注册中心
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// 包含内置模型
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Smagorinsky::TYPE_NAME, smagorinsky_factory);
        registry.register("mixed_smagorinsky", mixed_smagorinsky_factory);
        registry
    }

    /// 注册模型，同名时覆盖并返回 true
    pub fn register(&mut self, name: impl Into<String>, factory: LesModelFactory) -> bool {
        self.factories.insert(name.into(), factory).is_some()
    }

    /// 已注册名称（有序）
    pub fn names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// 是否已注册
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// 按当前配置创建模型
    pub fn create(
        &self,
        ctx: LesContext,
        u: &VolVectorField,
        phi: &SurfaceScalarField,
    ) -> MhResult<Box<dyn LesModel>> {
        let name = ctx
            .load_properties()?
            .map(|p| p.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        self.create_named(&name, ctx, u, phi)
    }

    /// 按名称创建模型
    pub fn create_named(
        &self,
        name: &str,
        ctx: LesContext,
        u: &VolVectorField,
        phi: &SurfaceScalarField,
    ) -> MhResult<Box<dyn LesModel>> {
        if name == ScaleSimilarity::TYPE_NAME && !self.contains(name) {
            return Err(MhError::config(format!(
                "{name} 不耗散, 不能单独使用, 须与涡黏模型组合 (如 mixed_smagorinsky)"
            )));
        }
        let factory = require!(
            self.factories.get(name),
            MhError::unknown_selection("LES 模型", name, self.names())
        );
        log::info!("选择 LES 模型: {name} ({})", ctx.properties().describe());
        factory(ctx, u, phi)
    }
}

impl Default for LesModelRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for LesModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LesModelRegistry")
            .field("models", &self.names())
            .finish()
    }
}

fn smagorinsky_factory(
    ctx: LesContext,
    u: &VolVectorField,
    phi: &SurfaceScalarField,
) -> MhResult<Box<dyn LesModel>> {
    Ok(Box::new(Smagorinsky::new(ctx, u, phi)?))
}

fn mixed_smagorinsky_factory(
    ctx: LesContext,
    u: &VolVectorField,
    phi: &SurfaceScalarField,
) -> MhResult<Box<dyn LesModel>> {
    Ok(Box::new(MixedModel::mixed_smagorinsky(ctx, u, phi)?))
}
