// crates/mh_les/src/turbulence/smagorinsky.rs

//! Smagorinsky 亚格子涡黏模型
//!
//! 由局部平衡假设得到亚格子动能，再由 k 与 Δ 给出涡黏度：
//!
//! ```text
//! D     = symm(∇U)
//! k     = (2 c_k / c_e) Δ² (dev(D) : dev(D))
//! ν_sgs = c_k Δ √k
//! ε     = c_e k^{3/2} / Δ
//! B     = (2/3) k I − 2 ν_sgs dev(D)
//! ```
//!
//! 默认 `c_k = 0.094`，`c_e = 1.048`，对应 C_s ≈ 0.17。
//! 系数从 `coeffs.smagorinsky` 读取，Δ 由 `delta` 配置决定。

use mh_config::{DeltaConfig, LesProperties};
use mh_foundation::{ensure, MhError, MhResult};

use super::delta::LesDelta;
use super::traits::{viscous_stress_divergence, LesContext, LesModel};
use crate::fields::{
    SurfaceScalarField, VolScalarField, VolSymmTensorField, VolTensorField, VolVectorField,
};
use crate::numerics::{operators, MomentumMatrix};
use crate::tensor::SymmTensor;

/// c_k 默认值
pub const DEFAULT_CK: f64 = 0.094;

/// c_e 默认值
pub const DEFAULT_CE: f64 = 1.048;

#[derive(Debug, Clone, Copy, PartialEq)]
struct SmagorinskyCoeffs {
    ck: f64,
    ce: f64,
    delta: DeltaConfig,
}

impl SmagorinskyCoeffs {
    fn from_properties(props: Option<&LesProperties>) -> MhResult<Self> {
        let coeffs = props.and_then(|p| p.coeffs(Smagorinsky::TYPE_NAME));
        let ck = coeffs.map_or(DEFAULT_CK, |c| c.lookup_or_default("c_k", DEFAULT_CK));
        let ce = coeffs.map_or(DEFAULT_CE, |c| c.lookup_or_default("c_e", DEFAULT_CE));
        for (key, value) in [("smagorinsky.c_k", ck), ("smagorinsky.c_e", ce)] {
            ensure!(
                value.is_finite() && value > 0.0,
                MhError::invalid_config(key, value.to_string(), "必须为正")
            );
        }
        Ok(Self {
            ck,
            ce,
            delta: props.map(|p| p.delta).unwrap_or_default(),
        })
    }
}

/// Smagorinsky 模型
#[derive(Debug)]
pub struct Smagorinsky {
    ctx: LesContext,
    coeffs: SmagorinskyCoeffs,
    delta: LesDelta,
    /// 应变率 D = symm(∇U)
    strain: VolSymmTensorField,
    k: VolScalarField,
    nu_sgs: VolScalarField,
    print_coeffs: bool,
}

impl Smagorinsky {
    /// 模型名称
    pub const TYPE_NAME: &'static str = "smagorinsky";

    /// 创建模型并由初始速度场计算 k 与 ν_sgs
    pub fn new(ctx: LesContext, u: &VolVectorField, phi: &SurfaceScalarField) -> MhResult<Self> {
        ctx.check_fields(u, phi)?;
        let props = ctx.load_properties()?;
        let coeffs = SmagorinskyCoeffs::from_properties(props.as_ref())?;
        let delta = LesDelta::new(ctx.mesh(), &coeffs.delta)?;
        let strain = operators::grad(u).map(SymmTensor::symm);
        let zeros = VolScalarField::zeros(ctx.mesh());

        let mut model = Self {
            print_coeffs: props.as_ref().is_some_and(|p| p.print_coeffs),
            ctx,
            coeffs,
            delta,
            strain,
            k: zeros.clone(),
            nu_sgs: zeros,
        };
        model.update_viscosity();
        log::info!(
            "Smagorinsky 模型: Δ = {:.4e} ({:?})",
            model.delta.value(),
            model.delta.kind()
        );
        model.log_coeffs();
        Ok(model)
    }

    /// c_k
    pub fn ck(&self) -> f64 {
        self.coeffs.ck
    }

    /// c_e
    pub fn ce(&self) -> f64 {
        self.coeffs.ce
    }

    /// 滤波尺度
    pub fn delta(&self) -> &LesDelta {
        &self.delta
    }

    /// 由缓存的 D 计算 k 与 ν_sgs
    fn update_viscosity(&mut self) {
        let SmagorinskyCoeffs { ck, ce, .. } = self.coeffs;
        let delta = self.delta.value();
        self.k = self.strain.map(|d| {
            let dev_d = d.dev();
            2.0 * ck / ce * delta * delta * dev_d.double_dot(&dev_d)
        });
        self.nu_sgs = self.k.map(|k| ck * delta * k.sqrt());
    }

    fn log_coeffs(&self) {
        if self.print_coeffs {
            log::info!(
                "{} 系数: c_k = {}, c_e = {}, delta = {:?}",
                Self::TYPE_NAME,
                self.coeffs.ck,
                self.coeffs.ce,
                self.coeffs.delta
            );
        }
    }
}

impl LesModel for Smagorinsky {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn context(&self) -> &LesContext {
        &self.ctx
    }

    fn is_dissipative(&self) -> bool {
        true
    }

    fn sgs_kinetic_energy(&self) -> VolScalarField {
        self.k.clone()
    }

    fn sgs_dissipation(&self) -> VolScalarField {
        let ce = self.coeffs.ce;
        let delta = self.delta.value();
        self.k.map(|k| ce * k.powf(1.5) / delta)
    }

    fn sgs_viscosity(&self) -> VolScalarField {
        self.nu_sgs.clone()
    }

    fn stress_tensor(&self) -> VolSymmTensorField {
        let values = self
            .strain
            .values()
            .iter()
            .zip(self.k.values())
            .zip(self.nu_sgs.values())
            .map(|((d, &k), &nu)| SymmTensor::IDENTITY * (2.0 / 3.0 * k) - d.dev() * (2.0 * nu))
            .collect();
        VolSymmTensorField::from_parts(self.ctx.mesh(), values)
    }

    /// 隐式 `−∇·(ρν_sgs∇U)` 加显式 `−∇·(ρν_sgs dev(∇Uᵀ))`
    fn sgs_stress_divergence(
        &self,
        u: &VolVectorField,
        rho: Option<&VolScalarField>,
    ) -> MhResult<MomentumMatrix> {
        u.check_domain(self.ctx.mesh(), "U")?;
        viscous_stress_divergence(&operators::grad(u), &self.nu_sgs, rho)
    }

    fn correct(
        &mut self,
        u: &VolVectorField,
        phi: &SurfaceScalarField,
        grad_hint: Option<&VolTensorField>,
    ) -> MhResult<()> {
        self.ctx.check_fields(u, phi)?;
        self.strain = match grad_hint {
            Some(grad_u) => {
                grad_u.check_domain(self.ctx.mesh(), "∇U")?;
                grad_u.map(SymmTensor::symm)
            }
            None => operators::grad(u).map(SymmTensor::symm),
        };
        self.update_viscosity();
        log::trace!(
            "{}: max ν_sgs = {:.4e}",
            Self::TYPE_NAME,
            self.nu_sgs.max_abs()
        );
        Ok(())
    }

    fn reload_configuration(&mut self) -> bool {
        let props = match self.ctx.load_properties() {
            Ok(Some(props)) => props,
            Ok(None) => return false,
            Err(err) => {
                log::warn!("{}: 读取配置失败, 保持当前系数: {err}", Self::TYPE_NAME);
                return false;
            }
        };
        let next = match SmagorinskyCoeffs::from_properties(Some(&props))
            .and_then(|c| LesDelta::new(self.ctx.mesh(), &c.delta).map(|d| (c, d)))
        {
            Ok(next) => next,
            Err(err) => {
                log::warn!("{}: 配置无效, 保持当前系数: {err}", Self::TYPE_NAME);
                return false;
            }
        };
        self.print_coeffs = props.print_coeffs;
        if next.0 == self.coeffs {
            return false;
        }
        (self.coeffs, self.delta) = next;
        self.update_viscosity();
        self.log_coeffs();
        true
    }
}
