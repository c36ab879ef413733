// crates/mh_les/src/fields.rs

//! 体场与面场
//!
//! 体场 [`VolField`] 每个单元一个值，面场 [`SurfaceField`] 每个面一个值。
//! 两者都持有网格的共享引用，所有二元运算先检查场域一致性。

use std::fmt;
use std::ops::{Add, Index, Mul, Sub};
use std::sync::Arc;

use glam::{DMat3, DVec3};
use mh_foundation::{MhError, MhResult};

use crate::mesh::CartesianMesh;
use crate::tensor::SymmTensor;

/// 可存放在场中的值类型
pub trait FieldValue:
    Copy
    + Send
    + Sync
    + fmt::Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f64, Output = Self>
    + 'static
{
    /// 零值
    fn zero() -> Self;
}

impl FieldValue for f64 {
    #[inline]
    fn zero() -> Self {
        0.0
    }
}

impl FieldValue for DVec3 {
    #[inline]
    fn zero() -> Self {
        DVec3::ZERO
    }
}

impl FieldValue for DMat3 {
    #[inline]
    fn zero() -> Self {
        DMat3::ZERO
    }
}

impl FieldValue for SymmTensor {
    #[inline]
    fn zero() -> Self {
        SymmTensor::ZERO
    }
}

/// 体场（单元中心值）
#[derive(Debug, Clone)]
pub struct VolField<T: FieldValue> {
    mesh: Arc<CartesianMesh>,
    values: Vec<T>,
}

/// 标量体场
pub type VolScalarField = VolField<f64>;
/// 矢量体场
pub type VolVectorField = VolField<DVec3>;
/// 对称张量体场
pub type VolSymmTensorField = VolField<SymmTensor>;
/// 完整张量体场
pub type VolTensorField = VolField<DMat3>;

impl<T: FieldValue> VolField<T> {
    /// 由单元值创建，长度必须等于单元数
    pub fn new(mesh: Arc<CartesianMesh>, values: Vec<T>) -> MhResult<Self> {
        MhError::check_size("体场", mesh.n_cells(), values.len())?;
        Ok(Self { mesh, values })
    }

    /// 由算子结果创建，长度由网格遍历保证
    pub(crate) fn from_parts(mesh: &Arc<CartesianMesh>, values: Vec<T>) -> Self {
        debug_assert_eq!(values.len(), mesh.n_cells());
        Self {
            mesh: Arc::clone(mesh),
            values,
        }
    }

    /// 均匀场
    pub fn uniform(mesh: &Arc<CartesianMesh>, value: T) -> Self {
        Self {
            values: vec![value; mesh.n_cells()],
            mesh: Arc::clone(mesh),
        }
    }

    /// 零场
    pub fn zeros(mesh: &Arc<CartesianMesh>) -> Self {
        Self::uniform(mesh, T::zero())
    }

    /// 按单元中心坐标生成
    pub fn from_fn(mesh: &Arc<CartesianMesh>, f: impl Fn(DVec3) -> T) -> Self {
        let values = (0..mesh.n_cells()).map(|c| f(mesh.cell_center(c))).collect();
        Self {
            mesh: Arc::clone(mesh),
            values,
        }
    }

    /// 所在网格
    #[inline]
    pub fn mesh(&self) -> &Arc<CartesianMesh> {
        &self.mesh
    }

    /// 单元值
    #[inline]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// 可变单元值（长度不可变）
    #[inline]
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    /// 取出单元值
    pub fn into_values(self) -> Vec<T> {
        self.values
    }

    /// 单元数
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 检查场是否位于指定网格
    pub fn check_domain(&self, mesh: &CartesianMesh, name: &str) -> MhResult<()> {
        if self.mesh.same_domain(mesh) {
            Ok(())
        } else {
            Err(MhError::mesh_mismatch(format!(
                "{name} 位于 {} 网格, 期望 {}",
                self.mesh.describe(),
                mesh.describe()
            )))
        }
    }

    /// 逐单元映射
    pub fn map<U: FieldValue>(&self, f: impl Fn(T) -> U) -> VolField<U> {
        VolField {
            mesh: Arc::clone(&self.mesh),
            values: self.values.iter().map(|&v| f(v)).collect(),
        }
    }

    /// 与另一场逐单元组合
    pub fn zip_map<U: FieldValue, V: FieldValue>(
        &self,
        other: &VolField<U>,
        f: impl Fn(T, U) -> V,
    ) -> MhResult<VolField<V>> {
        other.check_domain(&self.mesh, "组合运算右操作数")?;
        Ok(VolField {
            mesh: Arc::clone(&self.mesh),
            values: self
                .values
                .iter()
                .zip(other.values.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }

    /// 逐单元相加
    pub fn try_add(&self, other: &VolField<T>) -> MhResult<Self> {
        self.zip_map(other, |a, b| a + b)
    }

    /// 逐单元相减
    pub fn try_sub(&self, other: &VolField<T>) -> MhResult<Self> {
        self.zip_map(other, |a, b| a - b)
    }

    /// 乘以常数
    pub fn scaled(&self, s: f64) -> Self {
        self.map(|v| v * s)
    }

    /// 逐单元乘以标量场
    pub fn weighted(&self, w: &VolScalarField) -> MhResult<Self> {
        self.zip_map(w, |v, s| v * s)
    }
}

impl<T: FieldValue> Index<usize> for VolField<T> {
    type Output = T;

    #[inline]
    fn index(&self, cell: usize) -> &T {
        &self.values[cell]
    }
}

impl VolScalarField {
    /// 最大绝对值
    pub fn max_abs(&self) -> f64 {
        self.values.iter().fold(0.0, |m, v| m.max(v.abs()))
    }
}

impl VolVectorField {
    /// 各分量的最大绝对值
    pub fn max_abs(&self) -> f64 {
        self.values
            .iter()
            .fold(0.0, |m, v| m.max(v.abs().max_element()))
    }
}

impl VolSymmTensorField {
    /// 各分量的最大绝对值
    pub fn max_abs(&self) -> f64 {
        self.values.iter().fold(0.0, |m, t| m.max(t.max_abs()))
    }
}

/// 面场（面中心值）
#[derive(Debug, Clone)]
pub struct SurfaceField<T: FieldValue> {
    mesh: Arc<CartesianMesh>,
    values: Vec<T>,
}

/// 标量面场（如体积通量 phi）
pub type SurfaceScalarField = SurfaceField<f64>;

impl<T: FieldValue> SurfaceField<T> {
    /// 由面值创建，长度必须等于面数
    pub fn new(mesh: Arc<CartesianMesh>, values: Vec<T>) -> MhResult<Self> {
        MhError::check_size("面场", mesh.n_faces(), values.len())?;
        Ok(Self { mesh, values })
    }

    /// 由算子结果创建，长度由网格遍历保证
    pub(crate) fn from_parts(mesh: &Arc<CartesianMesh>, values: Vec<T>) -> Self {
        debug_assert_eq!(values.len(), mesh.n_faces());
        Self {
            mesh: Arc::clone(mesh),
            values,
        }
    }

    /// 均匀面场
    pub fn uniform(mesh: &Arc<CartesianMesh>, value: T) -> Self {
        Self {
            values: vec![value; mesh.n_faces()],
            mesh: Arc::clone(mesh),
        }
    }

    /// 零面场
    pub fn zeros(mesh: &Arc<CartesianMesh>) -> Self {
        Self::uniform(mesh, T::zero())
    }

    /// 所在网格
    #[inline]
    pub fn mesh(&self) -> &Arc<CartesianMesh> {
        &self.mesh
    }

    /// 面值
    #[inline]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// 面数
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 检查面场是否位于指定网格
    pub fn check_domain(&self, mesh: &CartesianMesh, name: &str) -> MhResult<()> {
        if self.mesh.same_domain(mesh) {
            Ok(())
        } else {
            Err(MhError::mesh_mismatch(format!(
                "{name} 位于 {} 网格, 期望 {}",
                self.mesh.describe(),
                mesh.describe()
            )))
        }
    }
}

impl<T: FieldValue> Index<usize> for SurfaceField<T> {
    type Output = T;

    #[inline]
    fn index(&self, face: usize) -> &T {
        &self.values[face]
    }
}
