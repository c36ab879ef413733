// crates/mh_les/src/numerics/operators.rs

//! 有限体积显式算子
//!
//! 基于 Gauss 定理把体积分转化为面积分:
//! ```text
//! ∇φ  ≈ (1/V) Σ_f S_f φ_f
//! ∇·T ≈ (1/V) Σ_f S_f·T_f
//! ```
//!
//! 面值使用线性插值；零梯度边界面取 owner 单元值。

use glam::{DMat3, DVec3};

use crate::fields::{
    FieldValue, SurfaceField, SurfaceScalarField, VolField, VolScalarField, VolSymmTensorField,
    VolTensorField, VolVectorField,
};
use crate::tensor::outer;

/// 体场线性插值到面
pub fn interpolate<T: FieldValue>(field: &VolField<T>) -> SurfaceField<T> {
    let mesh = field.mesh();
    let values = field.values();
    let face_values = mesh
        .faces()
        .iter()
        .map(|face| match face.neighbour {
            Some(nb) => (values[face.owner] + values[nb]) * 0.5,
            None => values[face.owner],
        })
        .collect();
    SurfaceField::from_parts(mesh, face_values)
}

/// 面场对每个单元的面求和
pub fn surface_sum<T: FieldValue>(field: &SurfaceField<T>) -> VolField<T> {
    let mesh = field.mesh();
    let mut sum = vec![T::zero(); mesh.n_cells()];
    for (face, &v) in mesh.faces().iter().zip(field.values()) {
        sum[face.owner] = sum[face.owner] + v;
        if let Some(nb) = face.neighbour {
            sum[nb] = sum[nb] + v;
        }
    }
    VolField::from_parts(mesh, sum)
}

/// 矢量场的 Gauss 梯度，`(∇U)_ij = ∂U_j/∂x_i`
pub fn grad(u: &VolVectorField) -> VolTensorField {
    let mesh = u.mesh();
    let u_f = interpolate(u);
    let mut acc = vec![DMat3::ZERO; mesh.n_cells()];
    for (face, &uf) in mesh.faces().iter().zip(u_f.values()) {
        let flux = outer(face.sf, uf);
        acc[face.owner] += flux;
        if let Some(nb) = face.neighbour {
            acc[nb] -= flux;
        }
    }
    let inv_v = 1.0 / mesh.cell_volume();
    VolField::from_parts(mesh, acc.into_iter().map(|g| g * inv_v).collect())
}

/// 对称张量场的散度 `(∇·B)_j = ∂B_ij/∂x_i`
pub fn div_symm(b: &VolSymmTensorField) -> VolVectorField {
    let mesh = b.mesh();
    let b_f = interpolate(b);
    let mut acc = vec![DVec3::ZERO; mesh.n_cells()];
    for (face, bf) in mesh.faces().iter().zip(b_f.values()) {
        let flux = bf.dot(face.sf);
        acc[face.owner] += flux;
        if let Some(nb) = face.neighbour {
            acc[nb] -= flux;
        }
    }
    let inv_v = 1.0 / mesh.cell_volume();
    VolField::from_parts(mesh, acc.into_iter().map(|d| d * inv_v).collect())
}

/// 完整张量场的散度 `(∇·T)_j = ∂T_ij/∂x_i`
pub fn div_tensor(t: &VolTensorField) -> VolVectorField {
    let mesh = t.mesh();
    let t_f = interpolate(t);
    let mut acc = vec![DVec3::ZERO; mesh.n_cells()];
    for (face, tf) in mesh.faces().iter().zip(t_f.values()) {
        let flux = tf.transpose() * face.sf;
        acc[face.owner] += flux;
        if let Some(nb) = face.neighbour {
            acc[nb] -= flux;
        }
    }
    let inv_v = 1.0 / mesh.cell_volume();
    VolField::from_parts(mesh, acc.into_iter().map(|d| d * inv_v).collect())
}

/// 由速度场计算面体积通量 `phi_f = U_f·S_f`
pub fn flux(u: &VolVectorField) -> SurfaceScalarField {
    let mesh = u.mesh();
    let u_f = interpolate(u);
    let values = mesh
        .faces()
        .iter()
        .zip(u_f.values())
        .map(|(face, uf)| uf.dot(face.sf))
        .collect();
    SurfaceField::from_parts(mesh, values)
}

/// 通量场的散度 `(1/V) Σ_f phi_f`（连续性残差）
pub fn div_flux(phi: &SurfaceScalarField) -> VolScalarField {
    let mesh = phi.mesh();
    let mut acc = vec![0.0; mesh.n_cells()];
    for (face, &p) in mesh.faces().iter().zip(phi.values()) {
        acc[face.owner] += p;
        if let Some(nb) = face.neighbour {
            acc[nb] -= p;
        }
    }
    let inv_v = 1.0 / mesh.cell_volume();
    VolField::from_parts(mesh, acc.into_iter().map(|d| d * inv_v).collect())
}
