// crates/mh_les/src/turbulence/traits.rs

//! LES 闭合 trait
//!
//! 定义亚格子应力模型的公共接口。动量方程左端的有效应力项约定为
//!
//! ```text
//! divDevReff(U) = −∇·(ρν ∇U) − ∇·(ρν dev(∇Uᵀ)) + SGS 项
//! ```
//!
//! 第一项隐式装配，第二项作为显式修正；SGS 项由各模型给出。

use std::fmt;
use std::sync::Arc;

use mh_config::{LesProperties, PropertiesSource};
use mh_foundation::MhResult;

use crate::fields::{
    SurfaceScalarField, VolScalarField, VolSymmTensorField, VolTensorField, VolVectorField,
};
use crate::filters::FilterRegistry;
use crate::mesh::CartesianMesh;
use crate::numerics::{operators, MomentumMatrix};
use crate::tensor::{dev, SymmTensor};
use crate::transport::TransportModel;

/// LES 模型构造输入
#[derive(Debug, Clone)]
pub struct LesContext {
    mesh: Arc<CartesianMesh>,
    transport: Arc<dyn TransportModel>,
    properties: Arc<dyn PropertiesSource>,
    filters: Arc<FilterRegistry>,
}

impl LesContext {
    /// 使用内置滤波器注册中心创建
    pub fn new(
        mesh: Arc<CartesianMesh>,
        transport: Arc<dyn TransportModel>,
        properties: Arc<dyn PropertiesSource>,
    ) -> MhResult<Self> {
        transport.nu().check_domain(&mesh, "运动黏度")?;
        Ok(Self {
            mesh,
            transport,
            properties,
            filters: Arc::new(FilterRegistry::with_defaults()),
        })
    }

    /// 替换滤波器注册中心
    pub fn with_filters(mut self, filters: Arc<FilterRegistry>) -> Self {
        self.filters = filters;
        self
    }

    /// 网格
    #[inline]
    pub fn mesh(&self) -> &Arc<CartesianMesh> {
        &self.mesh
    }

    /// 输运模型
    #[inline]
    pub fn transport(&self) -> &Arc<dyn TransportModel> {
        &self.transport
    }

    /// 配置来源
    #[inline]
    pub fn properties(&self) -> &Arc<dyn PropertiesSource> {
        &self.properties
    }

    /// 滤波器注册中心
    #[inline]
    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    /// 读取当前配置，`None` 表示没有配置
    pub fn load_properties(&self) -> MhResult<Option<LesProperties>> {
        Ok(self.properties.load()?)
    }

    /// 检查 U 与 phi 是否位于本网格
    pub fn check_fields(&self, u: &VolVectorField, phi: &SurfaceScalarField) -> MhResult<()> {
        u.check_domain(&self.mesh, "U")?;
        phi.check_domain(&self.mesh, "phi")
    }
}

/// 亚格子应力闭合模型
///
/// 生命周期：构造成功即可用；`correct` 在每个外迭代调用一次，
/// `reload_configuration` 在配置可能变化时调用。两者不得与其他
/// 方法并发调用，由调用方保证。
pub trait LesModel: Send + Sync + fmt::Debug {
    /// 模型名称
    fn type_name(&self) -> &'static str;

    /// 构造输入
    fn context(&self) -> &LesContext;

    /// 所在网格
    fn mesh(&self) -> &Arc<CartesianMesh> {
        self.context().mesh()
    }

    /// 输运模型
    fn transport(&self) -> &Arc<dyn TransportModel> {
        self.context().transport()
    }

    /// 是否耗散（是否可以隐式处理）
    fn is_dissipative(&self) -> bool;

    /// 亚格子动能 k
    fn sgs_kinetic_energy(&self) -> VolScalarField;

    /// 亚格子耗散率 ε
    fn sgs_dissipation(&self) -> VolScalarField;

    /// 亚格子涡黏度 ν_sgs
    fn sgs_viscosity(&self) -> VolScalarField;

    /// 亚格子应力 B
    ///
    /// 取最近一次 `correct`（或构造）时的状态。`reload_configuration`
    /// 只替换系数与滤波器，不重算 B。
    fn stress_tensor(&self) -> VolSymmTensorField;

    /// 仅 SGS 部分的动量方程项
    fn sgs_stress_divergence(
        &self,
        u: &VolVectorField,
        rho: Option<&VolScalarField>,
    ) -> MhResult<MomentumMatrix>;

    /// 由当前速度场更新缓存量
    ///
    /// `grad_hint` 是可选的已算好的 ∇U，是否提供不影响结果。
    fn correct(
        &mut self,
        u: &VolVectorField,
        phi: &SurfaceScalarField,
        grad_hint: Option<&VolTensorField>,
    ) -> MhResult<()>;

    /// 重新读取配置，返回是否有值改变
    ///
    /// 配置缺失或无法读取时返回 false 且保持原状态。
    fn reload_configuration(&mut self) -> bool;

    /// 有效黏度 ν + ν_sgs
    fn effective_viscosity(&self) -> MhResult<VolScalarField> {
        self.transport().nu().try_add(&self.sgs_viscosity())
    }

    /// 有效偏应力 dev(B) − ν dev(2 symm(∇U))
    fn effective_stress(&self, u: &VolVectorField) -> MhResult<VolSymmTensorField> {
        let nu = self.transport().nu();
        let grad_u = operators::grad(u);
        let laminar = grad_u.zip_map(&nu, |g, n| SymmTensor::two_symm(g).dev() * n)?;
        self.stress_tensor().zip_map(&laminar, |b, l| b.dev() - l)
    }

    /// 完整有效应力项：层流部分 + SGS 部分
    ///
    /// `rho = None` 为常密度情形。
    fn effective_stress_divergence(
        &self,
        u: &VolVectorField,
        rho: Option<&VolScalarField>,
    ) -> MhResult<MomentumMatrix> {
        let nu = self.transport().nu();
        let laminar = viscous_stress_divergence(&operators::grad(u), &nu, rho)?;
        laminar.try_add(&self.sgs_stress_divergence(u, rho)?)
    }
}

/// 黏性应力项 `−∇·(ργ∇U) − ∇·(ργ dev(∇Uᵀ))`
///
/// 第一项隐式，第二项显式。
pub fn viscous_stress_divergence(
    grad_u: &VolTensorField,
    gamma: &VolScalarField,
    rho: Option<&VolScalarField>,
) -> MhResult<MomentumMatrix> {
    let coeff = density_weighted(gamma, rho)?;
    let correction = grad_u.zip_map(&coeff, |g, c| dev(&g.transpose()) * c)?;

    let mut term = -MomentumMatrix::laplacian(&operators::interpolate(&coeff));
    term.sub_explicit(&operators::div_tensor(&correction))?;
    Ok(term)
}

/// γ 或 ργ
pub(crate) fn density_weighted(
    gamma: &VolScalarField,
    rho: Option<&VolScalarField>,
) -> MhResult<VolScalarField> {
    match rho {
        Some(rho) => gamma.zip_map(rho, |g, r| g * r),
        None => Ok(gamma.clone()),
    }
}

/// 逐单元零场，供非耗散模型返回 k、ε、ν_sgs
pub(crate) fn zero_scalar(mesh: &Arc<CartesianMesh>) -> VolScalarField {
    VolScalarField::zeros(mesh)
}
