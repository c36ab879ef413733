// crates/mh_les/src/numerics/matrix.rs

//! 动量方程项的矩阵表示
//!
//! 一个 [`MomentumMatrix`] 表示动量方程左端的一项 `T(U)`，按体积积分:
//!
//! ```text
//! ∫_V T(U) dV ≈ diag_c U_c + Σ_f a_f U_nb + explicit_c
//! ```
//!
//! - 隐式部分使用 LDU 存储：`upper[f]` 为 owner 行中 neighbour 的系数，
//!   `lower[f]` 为 neighbour 行中 owner 的系数
//! - 显式部分 `explicit` 是已积分的矢量源
//!
//! 求解器把隐式部分装配进线性系统，显式部分移到右端。

use std::ops::Neg;
use std::sync::Arc;

use glam::DVec3;
use mh_foundation::MhResult;

use crate::fields::{SurfaceScalarField, VolVectorField};
use crate::mesh::CartesianMesh;

/// 动量方程项：隐式 LDU 系数 + 显式源
#[derive(Debug, Clone)]
pub struct MomentumMatrix {
    mesh: Arc<CartesianMesh>,
    diag: Vec<f64>,
    lower: Vec<f64>,
    upper: Vec<f64>,
    explicit: Vec<DVec3>,
}

impl MomentumMatrix {
    /// 零项
    pub fn zeros(mesh: &Arc<CartesianMesh>) -> Self {
        Self {
            mesh: Arc::clone(mesh),
            diag: vec![0.0; mesh.n_cells()],
            lower: vec![0.0; mesh.n_faces()],
            upper: vec![0.0; mesh.n_faces()],
            explicit: vec![DVec3::ZERO; mesh.n_cells()],
        }
    }

    /// 隐式 Laplacian `∇·(Γ∇U)`
    ///
    /// 零梯度边界面不贡献系数。
    pub fn laplacian(gamma_f: &SurfaceScalarField) -> Self {
        let mesh = gamma_f.mesh();
        let mut m = Self::zeros(mesh);
        for (f, face) in mesh.faces().iter().enumerate() {
            let Some(nb) = face.neighbour else {
                continue;
            };
            let a = gamma_f[f] * face.mag_sf() / face.delta;
            m.upper[f] += a;
            m.lower[f] += a;
            m.diag[face.owner] -= a;
            m.diag[nb] -= a;
        }
        m
    }

    /// 显式源 `Su`：把逐单元的源（单位体积）加到显式部分
    pub fn su(source: &VolVectorField) -> Self {
        let mut m = Self::zeros(source.mesh());
        let v = m.mesh.cell_volume();
        for (e, s) in m.explicit.iter_mut().zip(source.values()) {
            *e = *s * v;
        }
        m
    }

    /// 所在网格
    #[inline]
    pub fn mesh(&self) -> &Arc<CartesianMesh> {
        &self.mesh
    }

    /// 对角系数
    #[inline]
    pub fn diag(&self) -> &[f64] {
        &self.diag
    }

    /// 下三角系数（每面）
    #[inline]
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    /// 上三角系数（每面）
    #[inline]
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// 已积分的显式源
    #[inline]
    pub fn explicit_source(&self) -> &[DVec3] {
        &self.explicit
    }

    /// 是否含隐式系数
    pub fn has_implicit_part(&self) -> bool {
        self.diag.iter().any(|&d| d != 0.0)
            || self.upper.iter().any(|&a| a != 0.0)
            || self.lower.iter().any(|&a| a != 0.0)
    }

    /// 隐式部分是否对称
    pub fn is_symmetric(&self) -> bool {
        self.lower
            .iter()
            .zip(&self.upper)
            .all(|(l, u)| (l - u).abs() <= 1e-14 * l.abs().max(u.abs()).max(1.0))
    }

    /// 隐式部分作用于 U，返回单位体积的值
    pub fn implicit_contribution(&self, u: &VolVectorField) -> MhResult<VolVectorField> {
        u.check_domain(&self.mesh, "U")?;
        let values = u.values();
        let mut acc: Vec<DVec3> = self
            .diag
            .iter()
            .zip(values)
            .map(|(&d, &uc)| uc * d)
            .collect();
        for (f, face) in self.mesh.faces().iter().enumerate() {
            if let Some(nb) = face.neighbour {
                acc[face.owner] += values[nb] * self.upper[f];
                acc[nb] += values[face.owner] * self.lower[f];
            }
        }
        let inv_v = 1.0 / self.mesh.cell_volume();
        Ok(VolVectorField::from_parts(
            &self.mesh,
            acc.into_iter().map(|a| a * inv_v).collect(),
        ))
    }

    /// 显式部分，单位体积
    pub fn explicit_contribution(&self) -> VolVectorField {
        let inv_v = 1.0 / self.mesh.cell_volume();
        VolVectorField::from_parts(
            &self.mesh,
            self.explicit.iter().map(|&e| e * inv_v).collect(),
        )
    }

    /// 整项 T(U)，单位体积
    pub fn evaluate(&self, u: &VolVectorField) -> MhResult<VolVectorField> {
        self.implicit_contribution(u)?
            .try_add(&self.explicit_contribution())
    }

    /// 加上显式源（单位体积）
    pub fn add_explicit(&mut self, source: &VolVectorField) -> MhResult<()> {
        source.check_domain(&self.mesh, "显式源")?;
        let v = self.mesh.cell_volume();
        for (e, s) in self.explicit.iter_mut().zip(source.values()) {
            *e += *s * v;
        }
        Ok(())
    }

    /// 减去显式源（单位体积）
    pub fn sub_explicit(&mut self, source: &VolVectorField) -> MhResult<()> {
        self.add_explicit(&source.scaled(-1.0))
    }

    /// 与另一项相加
    pub fn try_add(mut self, other: &MomentumMatrix) -> MhResult<Self> {
        if !self.mesh.same_domain(&other.mesh) {
            return Err(mh_foundation::MhError::mesh_mismatch(format!(
                "动量项位于 {} 网格, 期望 {}",
                other.mesh.describe(),
                self.mesh.describe()
            )));
        }
        for (a, b) in self.diag.iter_mut().zip(&other.diag) {
            *a += b;
        }
        for (a, b) in self.lower.iter_mut().zip(&other.lower) {
            *a += b;
        }
        for (a, b) in self.upper.iter_mut().zip(&other.upper) {
            *a += b;
        }
        for (a, b) in self.explicit.iter_mut().zip(&other.explicit) {
            *a += *b;
        }
        Ok(self)
    }
}

impl Neg for MomentumMatrix {
    type Output = Self;

    fn neg(mut self) -> Self {
        self.diag.iter_mut().for_each(|d| *d = -*d);
        self.lower.iter_mut().for_each(|a| *a = -*a);
        self.upper.iter_mut().for_each(|a| *a = -*a);
        self.explicit.iter_mut().for_each(|e| *e = -*e);
        self
    }
}
