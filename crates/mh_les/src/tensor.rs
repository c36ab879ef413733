// crates/mh_les/src/tensor.rs

//! 张量代数
//!
//! - 完整二阶张量使用 [`glam::DMat3`]，约定 `(∇U)_ij = ∂U_j/∂x_i`
//!   存放在第 i 行第 j 列（glam 为列主序：`m.col(j)[i]`）
//! - 对称二阶张量使用 [`SymmTensor`]，只存储 6 个独立分量，
//!   任何由它表示的量天然满足 `B = Bᵀ`

use glam::{DMat3, DVec3};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// 对称二阶张量
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SymmTensor {
    /// xx 分量
    pub xx: f64,
    /// xy = yx 分量
    pub xy: f64,
    /// xz = zx 分量
    pub xz: f64,
    /// yy 分量
    pub yy: f64,
    /// yz = zy 分量
    pub yz: f64,
    /// zz 分量
    pub zz: f64,
}

impl SymmTensor {
    /// 零张量
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);

    /// 单位张量
    pub const IDENTITY: Self = Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 1.0);

    /// 由分量创建
    #[inline]
    pub const fn new(xx: f64, xy: f64, xz: f64, yy: f64, yz: f64, zz: f64) -> Self {
        Self { xx, xy, xz, yy, yz, zz }
    }

    /// 并矢 v⊗v
    #[inline]
    pub fn sqr(v: DVec3) -> Self {
        Self::new(
            v.x * v.x,
            v.x * v.y,
            v.x * v.z,
            v.y * v.y,
            v.y * v.z,
            v.z * v.z,
        )
    }

    /// 对称部分 (T + Tᵀ)/2
    #[inline]
    pub fn symm(m: DMat3) -> Self {
        Self::new(
            m.x_axis.x,
            0.5 * (m.y_axis.x + m.x_axis.y),
            0.5 * (m.z_axis.x + m.x_axis.z),
            m.y_axis.y,
            0.5 * (m.z_axis.y + m.y_axis.z),
            m.z_axis.z,
        )
    }

    /// T + Tᵀ
    #[inline]
    pub fn two_symm(m: DMat3) -> Self {
        Self::symm(m) * 2.0
    }

    /// 迹
    #[inline]
    pub fn trace(&self) -> f64 {
        self.xx + self.yy + self.zz
    }

    /// 偏量部分 T - tr(T)/3 I
    #[inline]
    pub fn dev(&self) -> Self {
        *self - Self::IDENTITY * (self.trace() / 3.0)
    }

    /// 双点积 A:B
    #[inline]
    pub fn double_dot(&self, other: &Self) -> f64 {
        self.xx * other.xx
            + self.yy * other.yy
            + self.zz * other.zz
            + 2.0 * (self.xy * other.xy + self.xz * other.xz + self.yz * other.yz)
    }

    /// 模的平方 A:A
    #[inline]
    pub fn mag_sqr(&self) -> f64 {
        self.double_dot(self)
    }

    /// 张量与矢量的点积 T·v
    #[inline]
    pub fn dot(&self, v: DVec3) -> DVec3 {
        DVec3::new(
            self.xx * v.x + self.xy * v.y + self.xz * v.z,
            self.xy * v.x + self.yy * v.y + self.yz * v.z,
            self.xz * v.x + self.yz * v.y + self.zz * v.z,
        )
    }

    /// 按 (行, 列) 取分量
    #[inline]
    pub fn component(&self, row: usize, col: usize) -> f64 {
        match (row.min(col), row.max(col)) {
            (0, 0) => self.xx,
            (0, 1) => self.xy,
            (0, 2) => self.xz,
            (1, 1) => self.yy,
            (1, 2) => self.yz,
            _ => self.zz,
        }
    }

    /// 转换为完整张量
    #[inline]
    pub fn to_mat3(&self) -> DMat3 {
        DMat3::from_cols(
            DVec3::new(self.xx, self.xy, self.xz),
            DVec3::new(self.xy, self.yy, self.yz),
            DVec3::new(self.xz, self.yz, self.zz),
        )
    }

    /// 所有分量是否有限
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.xx.is_finite()
            && self.xy.is_finite()
            && self.xz.is_finite()
            && self.yy.is_finite()
            && self.yz.is_finite()
            && self.zz.is_finite()
    }

    /// 分量绝对值的最大值
    #[inline]
    pub fn max_abs(&self) -> f64 {
        [self.xx, self.xy, self.xz, self.yy, self.yz, self.zz]
            .into_iter()
            .fold(0.0, |m, c| m.max(c.abs()))
    }
}

impl Add for SymmTensor {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.xx + rhs.xx,
            self.xy + rhs.xy,
            self.xz + rhs.xz,
            self.yy + rhs.yy,
            self.yz + rhs.yz,
            self.zz + rhs.zz,
        )
    }
}

impl Sub for SymmTensor {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.xx - rhs.xx,
            self.xy - rhs.xy,
            self.xz - rhs.xz,
            self.yy - rhs.yy,
            self.yz - rhs.yz,
            self.zz - rhs.zz,
        )
    }
}

impl Neg for SymmTensor {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        self * -1.0
    }
}

impl Mul<f64> for SymmTensor {
    type Output = Self;

    #[inline]
    fn mul(self, s: f64) -> Self {
        Self::new(
            self.xx * s,
            self.xy * s,
            self.xz * s,
            self.yy * s,
            self.yz * s,
            self.zz * s,
        )
    }
}

impl Mul<SymmTensor> for f64 {
    type Output = SymmTensor;

    #[inline]
    fn mul(self, t: SymmTensor) -> SymmTensor {
        t * self
    }
}

impl Div<f64> for SymmTensor {
    type Output = Self;

    #[inline]
    fn div(self, s: f64) -> Self {
        self * (1.0 / s)
    }
}

impl AddAssign for SymmTensor {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for SymmTensor {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

/// 并矢 a⊗b，结果第 i 行第 j 列为 a_i b_j
#[inline]
pub fn outer(a: DVec3, b: DVec3) -> DMat3 {
    DMat3::from_cols(a * b.x, a * b.y, a * b.z)
}

/// 完整张量的迹
#[inline]
pub fn trace(m: &DMat3) -> f64 {
    m.x_axis.x + m.y_axis.y + m.z_axis.z
}

/// 完整张量的偏量部分
#[inline]
pub fn dev(m: &DMat3) -> DMat3 {
    *m - DMat3::IDENTITY * (trace(m) / 3.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqr_matches_outer() {
        let v = DVec3::new(1.0, -2.0, 3.0);
        let s = SymmTensor::sqr(v).to_mat3();
        let o = outer(v, v);
        assert!((s - o).abs_diff_eq(DMat3::ZERO, 1e-14));
    }

    #[test]
    fn test_outer_layout() {
        let m = outer(DVec3::X, DVec3::Y);
        // 第 0 行第 1 列
        assert_eq!(m.col(1).x, 1.0);
        assert_eq!(m.col(0).y, 0.0);
    }

    #[test]
    fn test_dev_is_traceless() {
        let t = SymmTensor::new(3.0, 1.0, 0.5, 2.0, -1.0, 4.0);
        assert!(t.dev().trace().abs() < 1e-14);
        assert!((t.dev().xy - 1.0).abs() < 1e-14);

        let m = outer(DVec3::new(1.0, 2.0, 3.0), DVec3::new(4.0, 5.0, 6.0));
        assert!(trace(&dev(&m)).abs() < 1e-12);
    }

    #[test]
    fn test_symm_of_shear() {
        // u = y: ∂u/∂y 位于第 1 行第 0 列
        let grad = outer(DVec3::Y, DVec3::X);
        let d = SymmTensor::symm(grad);
        assert!((d.xy - 0.5).abs() < 1e-14);
        assert_eq!(d.xx, 0.0);
        assert!((SymmTensor::two_symm(grad).xy - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_double_dot() {
        let a = SymmTensor::new(1.0, 2.0, 0.0, 3.0, 0.0, 0.0);
        // 1 + 9 + 2*4
        assert!((a.mag_sqr() - 18.0).abs() < 1e-14);
        let full = a.to_mat3();
        let mut expected = 0.0;
        for i in 0..3 {
            for j in 0..3 {
                expected += full.col(j)[i] * full.col(j)[i];
            }
        }
        assert!((a.mag_sqr() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_dot() {
        let t = SymmTensor::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        let v = DVec3::new(1.0, 1.0, 1.0);
        let expected = t.to_mat3() * v;
        assert!((t.dot(v) - expected).length() < 1e-14);
    }

    #[test]
    fn test_component_symmetry() {
        let t = SymmTensor::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(t.component(i, j), t.component(j, i));
            }
        }
    }
}
