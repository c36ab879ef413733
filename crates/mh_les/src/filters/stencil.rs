// crates/mh_les/src/filters/stencil.rs

//! 模板滤波器
//!
//! 顶帽、高斯、各向异性和 Laplace 滤波器都表示为固定的
//! (偏移, 权重) 模板。边界处按网格规则取邻居：周期回绕、零梯度截断。
//!
//! # 顶帽核
//!
//! 一维权重取 `[x - w/2, x + w/2]` 与各单元的重叠长度再除以 w：
//! ```text
//! w = 1: [1]
//! w = 2: [1/4, 1/2, 1/4]
//! w = 3: [1/3, 1/3, 1/3]
//! ```

use std::sync::Arc;

use mh_foundation::{ensure, MhError, MhResult};
use rayon::prelude::*;

use super::{validate_support, FilterKernel};
use crate::fields::{FieldValue, VolField};
use crate::mesh::{AxisBoundary, CartesianMesh};

/// 并行计算阈值（单元数）
const PARALLEL_THRESHOLD: usize = 4096;

/// 可忽略的权重
const WEIGHT_EPS: f64 = 1e-14;

/// 一维顶帽核
pub fn box_kernel_1d(width: f64) -> Vec<(isize, f64)> {
    let half = 0.5 * width;
    let reach = (half - 0.5).ceil().max(0.0) as isize;
    (-reach..=reach)
        .filter_map(|o| {
            let lo = (o as f64 - 0.5).max(-half);
            let hi = (o as f64 + 0.5).min(half);
            let w = (hi - lo).max(0.0) / width;
            (w > WEIGHT_EPS).then_some((o, w))
        })
        .collect()
}

/// 一维截断高斯核 `exp(-6 r²/w²)`，截断于 `ceil(w)` 个单元并归一化
pub fn gaussian_kernel_1d(width: f64) -> Vec<(isize, f64)> {
    let reach = width.ceil().max(1.0) as isize;
    let raw: Vec<(isize, f64)> = (-reach..=reach)
        .map(|o| {
            let r = o as f64;
            (o, (-6.0 * r * r / (width * width)).exp())
        })
        .collect();
    let total: f64 = raw.iter().map(|(_, w)| w).sum();
    raw.into_iter()
        .map(|(o, w)| (o, w / total))
        .filter(|(_, w)| *w > WEIGHT_EPS)
        .collect()
}

/// 三维滤波模板
#[derive(Debug, Clone, PartialEq)]
pub struct Stencil {
    entries: Vec<([isize; 3], f64)>,
    radius: [usize; 3],
}

impl Stencil {
    /// 恒等模板
    pub fn identity() -> Self {
        Self {
            entries: vec![([0, 0, 0], 1.0)],
            radius: [0; 3],
        }
    }

    /// 由偏移-权重对创建
    pub fn from_entries(entries: Vec<([isize; 3], f64)>) -> Self {
        let mut radius = [0usize; 3];
        for (off, _) in &entries {
            for axis in 0..3 {
                radius[axis] = radius[axis].max(off[axis].unsigned_abs());
            }
        }
        Self { entries, radius }
    }

    /// 三个一维核的张量积
    pub fn separable(kernels: [Vec<(isize, f64)>; 3]) -> Self {
        let mut entries = Vec::new();
        for &(i, wx) in &kernels[0] {
            for &(j, wy) in &kernels[1] {
                for &(k, wz) in &kernels[2] {
                    entries.push(([i, j, k], wx * wy * wz));
                }
            }
        }
        Self::from_entries(entries)
    }

    /// 模板项
    #[inline]
    pub fn entries(&self) -> &[([isize; 3], f64)] {
        &self.entries
    }

    /// 各方向半径
    #[inline]
    pub fn radius(&self) -> [usize; 3] {
        self.radius
    }

    /// 权重之和（保持常数场要求为 1）
    pub fn weight_sum(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w).sum()
    }

    /// 作用于体场
    pub fn apply<T: FieldValue>(&self, mesh: &Arc<CartesianMesh>, field: &VolField<T>) -> VolField<T> {
        let src = field.values();
        let entries = &self.entries;
        let eval = |cell: usize| {
            entries.iter().fold(T::zero(), |acc, (off, w)| {
                acc + src[mesh.offset_cell(cell, *off)] * *w
            })
        };

        let n = mesh.n_cells();
        let values: Vec<T> = if n >= PARALLEL_THRESHOLD {
            (0..n).into_par_iter().map(eval).collect()
        } else {
            (0..n).map(eval).collect()
        };
        VolField::from_parts(mesh, values)
    }
}

/// 模板滤波器类型及参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StencilKind {
    /// 各向同性顶帽
    TopHat {
        /// 宽度（单元数）
        width: f64,
    },
    /// 各方向独立宽度的顶帽
    Anisotropic {
        /// 各方向宽度（单元数）
        widths: [f64; 3],
    },
    /// 截断高斯
    Gaussian {
        /// 宽度（单元数）
        width: f64,
    },
    /// Laplace 近似
    Laplace {
        /// 宽度系数
        width_coeff: f64,
    },
}

impl StencilKind {
    /// 注册名
    pub fn name(&self) -> &'static str {
        match self {
            Self::TopHat { .. } => "box",
            Self::Anisotropic { .. } => "anisotropic",
            Self::Gaussian { .. } => "gaussian",
            Self::Laplace { .. } => "laplace",
        }
    }
}

fn kernel_radius(kernel: &[(isize, f64)]) -> usize {
    kernel.iter().map(|(offset, _)| offset.unsigned_abs()).max().unwrap_or(0)
}

/// 基于固定模板的滤波器
#[derive(Debug, Clone)]
pub struct StencilFilter {
    mesh: Arc<CartesianMesh>,
    kind: StencilKind,
    stencil: Stencil,
}

impl StencilFilter {
    /// 顶帽滤波器
    pub fn top_hat(mesh: Arc<CartesianMesh>, width: f64) -> MhResult<Self> {
        Self::build(mesh, StencilKind::TopHat { width })
    }

    /// 各向异性顶帽滤波器
    pub fn anisotropic(mesh: Arc<CartesianMesh>, widths: [f64; 3]) -> MhResult<Self> {
        Self::build(mesh, StencilKind::Anisotropic { widths })
    }

    /// 高斯滤波器
    pub fn gaussian(mesh: Arc<CartesianMesh>, width: f64) -> MhResult<Self> {
        Self::build(mesh, StencilKind::Gaussian { width })
    }

    /// Laplace 滤波器
    pub fn laplace(mesh: Arc<CartesianMesh>, width_coeff: f64) -> MhResult<Self> {
        Self::build(mesh, StencilKind::Laplace { width_coeff })
    }

    fn build(mesh: Arc<CartesianMesh>, kind: StencilKind) -> MhResult<Self> {
        let name = kind.name();
        let active = |axis: usize| mesh.boundary(axis) != AxisBoundary::Empty;
        let per_axis = |f: &dyn Fn(usize) -> Vec<(isize, f64)>| -> [Vec<(isize, f64)>; 3] {
            [0, 1, 2].map(|a| if active(a) { f(a) } else { vec![(0, 1.0)] })
        };
        // 张量积之前先检查一维支撑
        let separable = |kernels: [Vec<(isize, f64)>; 3]| -> MhResult<Stencil> {
            validate_support(&mesh, [0, 1, 2].map(|a| kernel_radius(&kernels[a])), name)?;
            Ok(Stencil::separable(kernels))
        };

        let stencil = match kind {
            StencilKind::TopHat { width } => {
                check_positive(name, "width", width)?;
                separable(per_axis(&|_| box_kernel_1d(width)))?
            }
            StencilKind::Anisotropic { widths } => {
                for w in widths {
                    check_positive(name, "widths", w)?;
                }
                separable(per_axis(&|a| box_kernel_1d(widths[a])))?
            }
            StencilKind::Gaussian { width } => {
                check_positive(name, "width", width)?;
                separable(per_axis(&|_| gaussian_kernel_1d(width)))?
            }
            StencilKind::Laplace { width_coeff } => {
                check_positive(name, "width_coeff", width_coeff)?;
                let mut entries = Vec::new();
                let mut center = 1.0;
                for axis in (0..3).filter(|&a| active(a)) {
                    let mut off = [0isize; 3];
                    off[axis] = 1;
                    entries.push((off, 1.0 / width_coeff));
                    off[axis] = -1;
                    entries.push((off, 1.0 / width_coeff));
                    center -= 2.0 / width_coeff;
                }
                entries.push(([0, 0, 0], center));
                Stencil::from_entries(entries)
            }
        };

        validate_support(&mesh, stencil.radius(), name)?;
        Ok(Self {
            mesh,
            kind,
            stencil,
        })
    }

    /// 滤波器类型
    pub fn kind(&self) -> StencilKind {
        self.kind
    }

    /// 模板
    pub fn stencil(&self) -> &Stencil {
        &self.stencil
    }
}

fn check_positive(filter: &str, key: &str, value: f64) -> MhResult<()> {
    ensure!(
        value.is_finite() && value > 0.0,
        MhError::invalid_config(format!("{filter}.{key}"), value.to_string(), "必须为正的有限值")
    );
    Ok(())
}

impl FilterKernel for StencilFilter {
    fn kernel_name(&self) -> &'static str {
        self.kind.name()
    }

    fn kernel_mesh(&self) -> &Arc<CartesianMesh> {
        &self.mesh
    }

    fn kernel_radius(&self) -> [usize; 3] {
        self.stencil.radius()
    }

    fn convolve<T: FieldValue>(&self, field: &VolField<T>) -> VolField<T> {
        self.stencil.apply(&self.mesh, field)
    }
}
