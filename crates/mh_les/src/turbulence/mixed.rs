// crates/mh_les/src/turbulence/mixed.rs

//! 组合模型：尺度相似 + 涡黏
//!
//! ```text
//! B            = B_ss + B_ev
//! divDevReff   = 层流项 + ∇·dev(B_ss)（显式） + 涡黏项（隐式）
//! ```
//!
//! 非耗散的相似部分只进入显式源，耗散的涡黏部分提供隐式稳定。

use mh_foundation::{ensure, MhError, MhResult};

use super::scale_similarity::ScaleSimilarity;
use super::smagorinsky::Smagorinsky;
use super::traits::{LesContext, LesModel};
use crate::fields::{
    FieldValue, SurfaceScalarField, VolField, VolScalarField, VolSymmTensorField, VolTensorField,
    VolVectorField,
};
use crate::numerics::MomentumMatrix;

/// 尺度相似与涡黏模型的组合
#[derive(Debug)]
pub struct MixedModel {
    name: &'static str,
    similarity: ScaleSimilarity,
    eddy: Box<dyn LesModel>,
}

impl MixedModel {
    /// 组合两个已构造的模型
    ///
    /// 涡黏部分必须是耗散的，且与相似部分位于同一网格。
    pub fn new(
        name: &'static str,
        similarity: ScaleSimilarity,
        eddy: Box<dyn LesModel>,
    ) -> MhResult<Self> {
        ensure!(
            eddy.is_dissipative(),
            MhError::config(format!(
                "组合模型 {name} 的涡黏部分 {} 不是耗散模型",
                eddy.type_name()
            ))
        );
        ensure!(
            similarity.mesh().same_domain(eddy.mesh()),
            MhError::mesh_mismatch(format!(
                "组合模型 {name}: {} 与 {} 不在同一网格",
                similarity.type_name(),
                eddy.type_name()
            ))
        );
        log::info!(
            "组合模型 {name}: {} + {}",
            similarity.type_name(),
            eddy.type_name()
        );
        Ok(Self {
            name,
            similarity,
            eddy,
        })
    }

    /// 尺度相似 + Smagorinsky
    pub fn mixed_smagorinsky(
        ctx: LesContext,
        u: &VolVectorField,
        phi: &SurfaceScalarField,
    ) -> MhResult<Self> {
        let similarity = ScaleSimilarity::new(ctx.clone(), u, phi)?;
        let eddy = Smagorinsky::new(ctx, u, phi)?;
        Self::new("mixed_smagorinsky", similarity, Box::new(eddy))
    }

    /// 相似部分
    pub fn similarity(&self) -> &ScaleSimilarity {
        &self.similarity
    }

    /// 涡黏部分
    pub fn eddy_viscosity(&self) -> &dyn LesModel {
        self.eddy.as_ref()
    }
}

/// 两部分逐单元相加，网格一致性已在构造时检查
fn sum<T: FieldValue>(a: VolField<T>, b: VolField<T>) -> VolField<T> {
    debug_assert!(a.mesh().same_domain(b.mesh()));
    let values = a
        .values()
        .iter()
        .zip(b.values())
        .map(|(&x, &y)| x + y)
        .collect();
    VolField::from_parts(a.mesh(), values)
}

impl LesModel for MixedModel {
    fn type_name(&self) -> &'static str {
        self.name
    }

    fn context(&self) -> &LesContext {
        self.similarity.context()
    }

    fn is_dissipative(&self) -> bool {
        true
    }

    fn sgs_kinetic_energy(&self) -> VolScalarField {
        sum(
            self.similarity.sgs_kinetic_energy(),
            self.eddy.sgs_kinetic_energy(),
        )
    }

    fn sgs_dissipation(&self) -> VolScalarField {
        sum(self.similarity.sgs_dissipation(), self.eddy.sgs_dissipation())
    }

    fn sgs_viscosity(&self) -> VolScalarField {
        sum(self.similarity.sgs_viscosity(), self.eddy.sgs_viscosity())
    }

    fn stress_tensor(&self) -> VolSymmTensorField {
        sum(self.similarity.stress_tensor(), self.eddy.stress_tensor())
    }

    fn sgs_stress_divergence(
        &self,
        u: &VolVectorField,
        rho: Option<&VolScalarField>,
    ) -> MhResult<MomentumMatrix> {
        let explicit = self.similarity.sgs_stress_divergence(u, rho)?;
        explicit.try_add(&self.eddy.sgs_stress_divergence(u, rho)?)
    }

    fn correct(
        &mut self,
        u: &VolVectorField,
        phi: &SurfaceScalarField,
        grad_hint: Option<&VolTensorField>,
    ) -> MhResult<()> {
        self.similarity.correct(u, phi, grad_hint)?;
        self.eddy.correct(u, phi, grad_hint)
    }

    fn reload_configuration(&mut self) -> bool {
        let similarity = self.similarity.reload_configuration();
        let eddy = self.eddy.reload_configuration();
        similarity || eddy
    }
}
