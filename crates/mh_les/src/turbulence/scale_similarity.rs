// crates/mh_les/src/turbulence/scale_similarity.rs

//! 尺度相似亚格子应力模型
//!
//! 假设亚滤波尺度的应力结构与两级滤波之间的应力结构相似
//! （Bardina 1980）：
//!
//! ```text
//! B = c_b · (filter(U⊗U) − filter(U)⊗filter(U))
//! ```
//!
//! 括号内为 Leonard 应力 L，对任意速度场都是对称的。模型不估计
//! 亚格子动能和耗散（k = ε = 0），也不是耗散的：其散度只能显式处理。
//! 因此不能单独使用，须与涡黏模型组合，见 [`super::MixedModel`]。
//!
//! # 配置
//!
//! 从 `coeffs.scale_similarity` 读取：
//!
//! ```json
//! { "c_b": 1.0, "filter": { "type": "box", "width": 2 } }
//! ```
//!
//! 构造时缺少配置使用 `c_b = 1.0` 与 `simple` 滤波器；重新加载时
//! 缺少该段则保持当前系数与滤波器。

use std::sync::Arc;

use mh_config::{FilterConfig, LesProperties, DEFAULT_FILTER};
use mh_foundation::{ensure, MhError, MhResult};

use super::traits::{zero_scalar, LesContext, LesModel};
use crate::fields::{
    SurfaceScalarField, VolScalarField, VolSymmTensorField, VolTensorField, VolVectorField,
};
use crate::filters::LesFilter;
use crate::numerics::{operators, MomentumMatrix};
use crate::tensor::SymmTensor;

/// 相似系数默认值
pub const DEFAULT_C_B: f64 = 1.0;

/// Leonard 应力 `filter(U⊗U) − filter(U)⊗filter(U)`
pub fn leonard_stress(filter: &dyn LesFilter, u: &VolVectorField) -> MhResult<VolSymmTensorField> {
    let filtered_uu = filter.filter_symm_tensor(&u.map(SymmTensor::sqr))?;
    let filtered_u = filter.filter_vector(u)?;
    filtered_uu.zip_map(&filtered_u, |uu, uf| uu - SymmTensor::sqr(uf))
}

#[derive(Debug, Clone, PartialEq)]
struct SimilarityCoeffs {
    c_b: f64,
    filter: FilterConfig,
}

impl Default for SimilarityCoeffs {
    fn default() -> Self {
        Self {
            c_b: DEFAULT_C_B,
            filter: FilterConfig::named(DEFAULT_FILTER),
        }
    }
}

impl SimilarityCoeffs {
    fn from_properties(props: Option<&LesProperties>) -> MhResult<Self> {
        let Some(coeffs) = props.and_then(|p| p.coeffs(ScaleSimilarity::TYPE_NAME)) else {
            return Ok(Self::default());
        };
        let c_b = coeffs.lookup_or_default("c_b", DEFAULT_C_B);
        ensure!(
            c_b.is_finite(),
            MhError::invalid_config("scale_similarity.c_b", c_b.to_string(), "必须为有限值")
        );
        Ok(Self {
            c_b,
            filter: coeffs
                .filter
                .clone()
                .unwrap_or_else(|| FilterConfig::named(DEFAULT_FILTER)),
        })
    }
}

/// 尺度相似模型
///
/// 独占其滤波器；不可克隆。
#[derive(Debug)]
pub struct ScaleSimilarity {
    ctx: LesContext,
    coeffs: SimilarityCoeffs,
    filter: Box<dyn LesFilter>,
    leonard: VolSymmTensorField,
    print_coeffs: bool,
}

impl ScaleSimilarity {
    /// 模型名称
    pub const TYPE_NAME: &'static str = "scale_similarity";

    /// 创建模型并计算初始 Leonard 应力
    ///
    /// 配置存在但无效、滤波器未注册或不适用于网格时失败，
    /// 不会返回部分构造的模型。
    pub fn new(ctx: LesContext, u: &VolVectorField, phi: &SurfaceScalarField) -> MhResult<Self> {
        ctx.check_fields(u, phi)?;
        let props = ctx.load_properties()?;
        let coeffs = SimilarityCoeffs::from_properties(props.as_ref())?;
        let filter = ctx
            .filters()
            .create(Arc::clone(ctx.mesh()), &coeffs.filter)?;
        let leonard = leonard_stress(filter.as_ref(), u)?;

        let model = Self {
            print_coeffs: props.as_ref().is_some_and(|p| p.print_coeffs),
            ctx,
            coeffs,
            filter,
            leonard,
        };
        log::info!(
            "尺度相似模型: filter={}, 网格 {}",
            model.filter.type_name(),
            model.ctx.mesh().describe()
        );
        model.log_coeffs();
        Ok(model)
    }

    /// 相似系数
    pub fn c_b(&self) -> f64 {
        self.coeffs.c_b
    }

    /// 当前滤波器
    pub fn filter(&self) -> &dyn LesFilter {
        self.filter.as_ref()
    }

    /// 当前滤波器配置
    pub fn filter_config(&self) -> &FilterConfig {
        &self.coeffs.filter
    }

    /// 最近一次 `correct` 得到的 Leonard 应力
    pub fn leonard(&self) -> &VolSymmTensorField {
        &self.leonard
    }

    fn log_coeffs(&self) {
        if self.print_coeffs {
            log::info!(
                "{} 系数: c_b = {}, filter = {:?}",
                Self::TYPE_NAME,
                self.coeffs.c_b,
                self.coeffs.filter
            );
        }
    }
}

impl LesModel for ScaleSimilarity {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn context(&self) -> &LesContext {
        &self.ctx
    }

    fn is_dissipative(&self) -> bool {
        false
    }

    fn sgs_kinetic_energy(&self) -> VolScalarField {
        zero_scalar(self.ctx.mesh())
    }

    fn sgs_dissipation(&self) -> VolScalarField {
        zero_scalar(self.ctx.mesh())
    }

    fn sgs_viscosity(&self) -> VolScalarField {
        zero_scalar(self.ctx.mesh())
    }

    /// `c_b · L`
    ///
    /// L 只在 `new` 与 `correct` 时计算：重新加载换用滤波器后，
    /// 下一次 `correct` 之前返回的仍是旧滤波器得到的应力。
    fn stress_tensor(&self) -> VolSymmTensorField {
        self.leonard.scaled(self.coeffs.c_b)
    }

    /// 显式 `∇·(ρ dev(B))`
    fn sgs_stress_divergence(
        &self,
        u: &VolVectorField,
        rho: Option<&VolScalarField>,
    ) -> MhResult<MomentumMatrix> {
        u.check_domain(self.ctx.mesh(), "U")?;
        let dev_b = self.stress_tensor().map(|b| b.dev());
        let dev_b = match rho {
            Some(rho) => dev_b.weighted(rho)?,
            None => dev_b,
        };
        Ok(MomentumMatrix::su(&operators::div_symm(&dev_b)))
    }

    fn correct(
        &mut self,
        u: &VolVectorField,
        phi: &SurfaceScalarField,
        _grad_hint: Option<&VolTensorField>,
    ) -> MhResult<()> {
        self.ctx.check_fields(u, phi)?;
        self.leonard = leonard_stress(self.filter.as_ref(), u)?;
        log::trace!(
            "{}: max|L| = {:.4e}",
            Self::TYPE_NAME,
            self.leonard.max_abs()
        );
        Ok(())
    }

    fn reload_configuration(&mut self) -> bool {
        let props = match self.ctx.load_properties() {
            Ok(Some(props)) => props,
            Ok(None) => {
                log::debug!(
                    "{}: 无 LES 配置 ({}), 保持当前系数",
                    Self::TYPE_NAME,
                    self.ctx.properties().describe()
                );
                return false;
            }
            Err(err) => {
                log::warn!("{}: 读取配置失败, 保持当前系数: {err}", Self::TYPE_NAME);
                return false;
            }
        };
        if props.coeffs(Self::TYPE_NAME).is_none() {
            log::debug!("{}: 配置中无 {} 段, 保持当前系数", Self::TYPE_NAME, Self::TYPE_NAME);
            return false;
        }
        let next = match SimilarityCoeffs::from_properties(Some(&props)) {
            Ok(next) => next,
            Err(err) => {
                log::warn!("{}: 配置无效, 保持当前系数: {err}", Self::TYPE_NAME);
                return false;
            }
        };
        self.print_coeffs = props.print_coeffs;
        if next == self.coeffs {
            return false;
        }

        if next.filter != self.coeffs.filter {
            match self
                .ctx
                .filters()
                .create(Arc::clone(self.ctx.mesh()), &next.filter)
            {
                Ok(filter) => {
                    log::info!(
                        "{}: 滤波器 {} -> {}",
                        Self::TYPE_NAME,
                        self.filter.type_name(),
                        filter.type_name()
                    );
                    self.filter = filter;
                }
                Err(err) => {
                    log::warn!("{}: 新滤波器创建失败, 保持当前配置: {err}", Self::TYPE_NAME);
                    return false;
                }
            }
        }
        self.coeffs = next;
        self.log_coeffs();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::CartesianMesh;
    use crate::transport::Newtonian;
    use glam::DVec3;
    use mh_config::{ModelCoeffs, SharedProperties};

    fn setup(props: Option<LesProperties>) -> (LesContext, SharedProperties) {
        let mesh = Arc::new(CartesianMesh::periodic_box(6, 1.0).unwrap());
        let transport = Arc::new(Newtonian::new(mesh.clone(), 1e-5).unwrap());
        let shared = match props {
            Some(p) => SharedProperties::new(p),
            None => SharedProperties::empty(),
        };
        let ctx = LesContext::new(mesh, transport, Arc::new(shared.clone())).unwrap();
        (ctx, shared)
    }

    fn wavy(ctx: &LesContext) -> VolVectorField {
        VolVectorField::from_fn(ctx.mesh(), |p| {
            let t = std::f64::consts::TAU;
            DVec3::new((t * p.y).sin(), (t * p.z).cos(), (t * p.x).sin() * 0.5)
        })
    }

    #[test]
    fn test_defaults_without_configuration() {
        let (ctx, _) = setup(None);
        let u = wavy(&ctx);
        let phi = operators::flux(&u);
        let model = ScaleSimilarity::new(ctx, &u, &phi).unwrap();
        assert_eq!(model.c_b(), DEFAULT_C_B);
        assert_eq!(model.filter().type_name(), "simple");
        assert!(!model.is_dissipative());
    }

    #[test]
    fn test_non_dissipative_outputs_are_zero() {
        let (ctx, _) = setup(None);
        let u = wavy(&ctx);
        let phi = operators::flux(&u);
        let model = ScaleSimilarity::new(ctx, &u, &phi).unwrap();
        assert_eq!(model.sgs_kinetic_energy().max_abs(), 0.0);
        assert_eq!(model.sgs_dissipation().max_abs(), 0.0);
        assert_eq!(model.sgs_viscosity().max_abs(), 0.0);
        assert!(model.stress_tensor().max_abs() > 0.0);
    }

    #[test]
    fn test_divergence_is_explicit_only() {
        let (ctx, _) = setup(None);
        let u = wavy(&ctx);
        let phi = operators::flux(&u);
        let model = ScaleSimilarity::new(ctx, &u, &phi).unwrap();
        let term = model.sgs_stress_divergence(&u, None).unwrap();
        assert!(!term.has_implicit_part());
        assert!(term.explicit_contribution().max_abs() > 0.0);
    }

    #[test]
    fn test_density_weighting() {
        let (ctx, _) = setup(None);
        let u = wavy(&ctx);
        let phi = operators::flux(&u);
        let rho = VolScalarField::uniform(ctx.mesh(), 3.0);
        let model = ScaleSimilarity::new(ctx, &u, &phi).unwrap();
        let plain = model.sgs_stress_divergence(&u, None).unwrap().explicit_contribution();
        let weighted = model
            .sgs_stress_divergence(&u, Some(&rho))
            .unwrap()
            .explicit_contribution();
        for (a, b) in plain.values().iter().zip(weighted.values()) {
            assert!((*a * 3.0 - *b).length() < 1e-12);
        }
    }

    #[test]
    fn test_unknown_filter_fails_construction() {
        let props = LesProperties::default().with_coeffs(
            ScaleSimilarity::TYPE_NAME,
            ModelCoeffs::new().with_filter(FilterConfig::named("spectral")),
        );
        let (ctx, _) = setup(Some(props));
        let u = wavy(&ctx);
        let phi = operators::flux(&u);
        let err = ScaleSimilarity::new(ctx, &u, &phi).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_reload_without_change() {
        let props = LesProperties::default()
            .with_coeffs(ScaleSimilarity::TYPE_NAME, ModelCoeffs::new().with_value("c_b", 0.5));
        let (ctx, _) = setup(Some(props));
        let u = wavy(&ctx);
        let phi = operators::flux(&u);
        let mut model = ScaleSimilarity::new(ctx, &u, &phi).unwrap();
        assert_eq!(model.c_b(), 0.5);
        assert!(!model.reload_configuration());
    }

    #[test]
    fn test_reload_with_cleared_configuration_keeps_state() {
        let props = LesProperties::default()
            .with_coeffs(ScaleSimilarity::TYPE_NAME, ModelCoeffs::new().with_value("c_b", 0.5));
        let (ctx, shared) = setup(Some(props));
        let u = wavy(&ctx);
        let phi = operators::flux(&u);
        let mut model = ScaleSimilarity::new(ctx, &u, &phi).unwrap();
        shared.clear();
        assert!(!model.reload_configuration());
        assert_eq!(model.c_b(), 0.5);
    }

    #[test]
    fn test_reload_with_removed_section_keeps_state() {
        let props = LesProperties::default().with_coeffs(
            ScaleSimilarity::TYPE_NAME,
            ModelCoeffs::new()
                .with_value("c_b", 0.3)
                .with_filter(FilterConfig::box_filter(2.0)),
        );
        let (ctx, shared) = setup(Some(props));
        let u = wavy(&ctx);
        let phi = operators::flux(&u);
        let mut model = ScaleSimilarity::new(ctx, &u, &phi).unwrap();
        assert_eq!(model.filter().type_name(), "box");

        shared.update(|p| p.coeffs.clear());
        assert!(!model.reload_configuration());
        assert_eq!(model.c_b(), 0.3);
        assert_eq!(model.filter().type_name(), "box");
        assert_eq!(model.filter_config(), &FilterConfig::box_filter(2.0));
    }

    #[test]
    fn test_reload_with_bad_filter_keeps_old_filter() {
        let (ctx, shared) = setup(Some(LesProperties::default()));
        let u = wavy(&ctx);
        let phi = operators::flux(&u);
        let mut model = ScaleSimilarity::new(ctx, &u, &phi).unwrap();
        assert_eq!(model.filter().type_name(), "simple");

        shared.update(|p| {
            p.coeffs.insert(
                ScaleSimilarity::TYPE_NAME.to_string(),
                ModelCoeffs::new()
                    .with_value("c_b", 2.0)
                    .with_filter(FilterConfig::named("box")),
            );
        });
        assert!(!model.reload_configuration());
        assert_eq!(model.filter().type_name(), "simple");
        assert_eq!(model.c_b(), 1.0);
    }

    #[test]
    fn test_reload_swaps_filter() {
        let (ctx, shared) = setup(Some(LesProperties::default()));
        let u = wavy(&ctx);
        let phi = operators::flux(&u);
        let mut model = ScaleSimilarity::new(ctx, &u, &phi).unwrap();
        let before = model.stress_tensor();

        shared.update(|p| {
            p.coeffs.insert(
                ScaleSimilarity::TYPE_NAME.to_string(),
                ModelCoeffs::new().with_filter(FilterConfig::box_filter(2.0)),
            );
        });
        assert!(model.reload_configuration());
        assert_eq!(model.filter().type_name(), "box");
        assert_eq!(model.filter_config(), &FilterConfig::box_filter(2.0));

        // Leonard 应力要到下一次 correct 才用新滤波器重算
        assert_eq!(model.stress_tensor().values(), before.values());
        model.correct(&u, &phi, None).unwrap();
        let expected = leonard_stress(model.filter(), &u).unwrap();
        assert_eq!(model.stress_tensor().values(), expected.values());
    }

    #[test]
    fn test_rejects_field_on_other_mesh() {
        let (ctx, _) = setup(None);
        let u = wavy(&ctx);
        let phi = operators::flux(&u);
        let mut model = ScaleSimilarity::new(ctx, &u, &phi).unwrap();

        let other = Arc::new(CartesianMesh::periodic_box(5, 1.0).unwrap());
        let u2 = VolVectorField::uniform(&other, DVec3::X);
        let phi2 = operators::flux(&u2);
        assert!(matches!(
            model.correct(&u2, &phi2, None),
            Err(MhError::MeshMismatch { .. })
        ));
        assert!(model.sgs_stress_divergence(&u2, None).is_err());
    }
}
