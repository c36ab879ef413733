// crates/mh_les/src/filters/simple.rs

//! 面平均滤波器
//!
//! 先把单元值线性插值到面上，再按面积加权求和：
//! ```text
//! φ̄_P = Σ_f |S_f| φ_f / Σ_f |S_f|
//! ```
//! 边界面取所属单元值，所以零梯度边界附近同样保持常数场。

use std::sync::Arc;

use mh_foundation::{MhError, MhResult};

use super::{validate_support, FilterKernel};
use crate::fields::{FieldValue, VolField};
use crate::mesh::CartesianMesh;
use crate::numerics::operators;

/// 面平均滤波器
#[derive(Debug, Clone)]
pub struct SimpleFilter {
    mesh: Arc<CartesianMesh>,
    radius: [usize; 3],
}

impl SimpleFilter {
    /// 注册名
    pub const TYPE_NAME: &'static str = "simple";

    /// 创建滤波器
    pub fn new(mesh: Arc<CartesianMesh>) -> MhResult<Self> {
        let mut radius = [0; 3];
        for axis in mesh.active_axes() {
            radius[axis] = 1;
        }
        if mesh.n_faces() == 0 {
            return Err(MhError::invalid_mesh("面平均滤波器需要至少一个非空方向"));
        }
        validate_support(&mesh, radius, Self::TYPE_NAME)?;
        Ok(Self { mesh, radius })
    }
}

impl FilterKernel for SimpleFilter {
    fn kernel_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn kernel_mesh(&self) -> &Arc<CartesianMesh> {
        &self.mesh
    }

    fn kernel_radius(&self) -> [usize; 3] {
        self.radius
    }

    fn convolve<T: FieldValue>(&self, field: &VolField<T>) -> VolField<T> {
        let n = self.mesh.n_cells();
        let face_values = operators::interpolate(field);

        let mut sum = vec![T::zero(); n];
        let mut area = vec![0.0; n];
        for (face, &value) in self.mesh.faces().iter().zip(face_values.values()) {
            let a = face.mag_sf();
            sum[face.owner] = sum[face.owner] + value * a;
            area[face.owner] += a;
            if let Some(nb) = face.neighbour {
                sum[nb] = sum[nb] + value * a;
                area[nb] += a;
            }
        }

        let values = sum
            .into_iter()
            .zip(area)
            .map(|(s, a)| s * (1.0 / a))
            .collect();
        VolField::from_parts(&self.mesh, values)
    }
}
