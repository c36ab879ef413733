// crates/mh_les/src/filters/mod.rs

//! LES 空间滤波器
//!
//! 滤波器是作用在体场上的线性低通算子，返回同类型、同网格的新场，
//! 不修改输入。所有实现共享 [`LesFilter`] 契约，可按名称通过
//! [`FilterRegistry`] 在运行时选择。
//!
//! | 名称 | 核 | 参数 |
//! |------|----|------|
//! | `simple` | 面积加权的面插值平均 | 无 |
//! | `box` | 顶帽（top-hat） | `width` |
//! | `gaussian` | 截断高斯 | `width` |
//! | `anisotropic` | 各向异性顶帽 | `widths` |
//! | `laplace` | φ + Σ δ²φ / c | `width_coeff` |
//!
//! 宽度以网格单元数计。空方向上不做滤波。

mod registry;
mod simple;
mod stencil;

use std::fmt;
use std::sync::Arc;

use mh_foundation::MhResult;

use crate::fields::{FieldValue, VolField, VolScalarField, VolSymmTensorField, VolVectorField};
use crate::mesh::CartesianMesh;

pub use registry::{FilterFactory, FilterRegistry};
pub use simple::SimpleFilter;
pub use stencil::{box_kernel_1d, gaussian_kernel_1d, Stencil, StencilFilter, StencilKind};

/// 滤波器契约
///
/// 每次调用都会检查输入场是否位于滤波器所属网格，不一致时返回
/// `MeshMismatch`。
pub trait LesFilter: Send + Sync + fmt::Debug {
    /// 滤波器名称
    fn type_name(&self) -> &'static str;

    /// 所属网格
    fn mesh(&self) -> &Arc<CartesianMesh>;

    /// 各方向的支撑半径（单元数），即并行分解时需要的 halo 宽度
    fn support_radius(&self) -> [usize; 3];

    /// 滤波标量场
    fn filter_scalar(&self, field: &VolScalarField) -> MhResult<VolScalarField>;

    /// 滤波矢量场
    fn filter_vector(&self, field: &VolVectorField) -> MhResult<VolVectorField>;

    /// 滤波对称张量场
    fn filter_symm_tensor(&self, field: &VolSymmTensorField) -> MhResult<VolSymmTensorField>;
}

/// 线性卷积核
///
/// 实现本 trait 即自动获得 [`LesFilter`]。
pub trait FilterKernel: Send + Sync + fmt::Debug {
    /// 核名称
    fn kernel_name(&self) -> &'static str;

    /// 所属网格
    fn kernel_mesh(&self) -> &Arc<CartesianMesh>;

    /// 支撑半径
    fn kernel_radius(&self) -> [usize; 3];

    /// 对已确认位于本网格的场做卷积
    fn convolve<T: FieldValue>(&self, field: &VolField<T>) -> VolField<T>;
}

fn convolve_checked<K: FilterKernel, T: FieldValue>(
    kernel: &K,
    field: &VolField<T>,
    what: &str,
) -> MhResult<VolField<T>> {
    field.check_domain(kernel.kernel_mesh(), what)?;
    Ok(kernel.convolve(field))
}

impl<K: FilterKernel> LesFilter for K {
    fn type_name(&self) -> &'static str {
        self.kernel_name()
    }

    fn mesh(&self) -> &Arc<CartesianMesh> {
        self.kernel_mesh()
    }

    fn support_radius(&self) -> [usize; 3] {
        self.kernel_radius()
    }

    fn filter_scalar(&self, field: &VolScalarField) -> MhResult<VolScalarField> {
        convolve_checked(self, field, "滤波输入标量场")
    }

    fn filter_vector(&self, field: &VolVectorField) -> MhResult<VolVectorField> {
        convolve_checked(self, field, "滤波输入矢量场")
    }

    fn filter_symm_tensor(&self, field: &VolSymmTensorField) -> MhResult<VolSymmTensorField> {
        convolve_checked(self, field, "滤波输入张量场")
    }
}

/// 检查支撑 `2r+1` 不超过各非空方向的单元数
///
/// 周期方向上更宽的支撑会与自身重叠，零梯度方向上只是重复截断到边界单元。
pub(crate) fn validate_support(
    mesh: &CartesianMesh,
    radius: [usize; 3],
    filter: &str,
) -> MhResult<()> {
    use crate::mesh::AxisBoundary;
    use mh_foundation::MhError;

    for axis in 0..3 {
        if mesh.boundary(axis) != AxisBoundary::Empty && 2 * radius[axis] + 1 > mesh.dims()[axis] {
            return Err(MhError::invalid_config(
                format!("{filter}.width"),
                format!("radius={} (axis {axis})", radius[axis]),
                format!("滤波支撑超出该方向单元数 {}", mesh.dims()[axis]),
            ));
        }
    }
    Ok(())
}
