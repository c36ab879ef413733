// crates/mh_les/src/mesh.rs

//! 均匀笛卡尔网格
//!
//! 以 owner/neighbour 面列表描述拓扑，与非结构化有限体积算子兼容；
//! 同时保留 (i, j, k) 结构，供滤波模板按偏移寻址。
//!
//! # 边界
//!
//! | 类型 | 面 | 模板偏移 |
//! |------|----|----------|
//! | `Periodic` | 首尾单元之间的内部面 | 取模回绕 |
//! | `ZeroGradient` | 两个无 neighbour 的边界面 | 截断到边界单元 |
//! | `Empty` | 无面（2D 方向，要求 n = 1） | 忽略 |

use glam::DVec3;
use mh_foundation::{ensure, MhError, MhResult};
use serde::{Deserialize, Serialize};

/// 单个坐标方向的边界类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AxisBoundary {
    /// 周期边界
    #[default]
    Periodic,
    /// 零梯度边界，边界面取相邻单元值
    ZeroGradient,
    /// 空方向（2D 计算）
    Empty,
}

/// 网格面
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// 所属单元
    pub owner: usize,
    /// 相邻单元，边界面为 `None`
    pub neighbour: Option<usize>,
    /// 法向所在坐标轴
    pub axis: usize,
    /// 面积矢量（内部面由 owner 指向 neighbour，边界面指向外侧）
    pub sf: DVec3,
    /// 面两侧单元中心距离（边界面为单元中心到面的距离）
    pub delta: f64,
}

impl Face {
    /// 面积
    #[inline]
    pub fn mag_sf(&self) -> f64 {
        self.sf.length()
    }

    /// 是否为边界面
    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.neighbour.is_none()
    }
}

/// 均匀笛卡尔网格
#[derive(Debug, Clone, PartialEq)]
pub struct CartesianMesh {
    dims: [usize; 3],
    spacing: [f64; 3],
    origin: DVec3,
    boundaries: [AxisBoundary; 3],
    faces: Vec<Face>,
}

impl CartesianMesh {
    /// 由单元数、网格间距和边界类型创建
    pub fn new(
        dims: [usize; 3],
        spacing: [f64; 3],
        boundaries: [AxisBoundary; 3],
    ) -> MhResult<Self> {
        for axis in 0..3 {
            ensure!(
                dims[axis] > 0,
                MhError::invalid_mesh(format!("方向 {axis} 单元数为 0"))
            );
            ensure!(
                spacing[axis].is_finite() && spacing[axis] > 0.0,
                MhError::invalid_mesh(format!("方向 {axis} 网格间距无效: {}", spacing[axis]))
            );
            match boundaries[axis] {
                AxisBoundary::Empty => ensure!(
                    dims[axis] == 1,
                    MhError::invalid_mesh(format!(
                        "空方向 {axis} 要求单元数为 1, 实际 {}",
                        dims[axis]
                    ))
                ),
                AxisBoundary::Periodic => ensure!(
                    dims[axis] >= 2,
                    MhError::invalid_mesh(format!("周期方向 {axis} 至少需要 2 个单元"))
                ),
                AxisBoundary::ZeroGradient => {}
            }
        }
        ensure!(
            boundaries.iter().any(|b| *b != AxisBoundary::Empty),
            MhError::invalid_mesh("至少需要一个非空方向")
        );

        let mut mesh = Self {
            dims,
            spacing,
            origin: DVec3::ZERO,
            boundaries,
            faces: Vec::new(),
        };
        mesh.faces = mesh.build_faces();
        Ok(mesh)
    }

    /// 由区域长度创建
    pub fn uniform(
        dims: [usize; 3],
        lengths: [f64; 3],
        boundaries: [AxisBoundary; 3],
    ) -> MhResult<Self> {
        let spacing = [
            lengths[0] / dims[0].max(1) as f64,
            lengths[1] / dims[1].max(1) as f64,
            lengths[2] / dims[2].max(1) as f64,
        ];
        Self::new(dims, spacing, boundaries)
    }

    /// 三方向周期的立方体网格
    pub fn periodic_box(n: usize, length: f64) -> MhResult<Self> {
        Self::uniform([n; 3], [length; 3], [AxisBoundary::Periodic; 3])
    }

    /// 设置原点
    pub fn with_origin(mut self, origin: DVec3) -> Self {
        self.origin = origin;
        self
    }

    fn build_faces(&self) -> Vec<Face> {
        let mut faces = Vec::new();
        for axis in 0..3 {
            let bc = self.boundaries[axis];
            if bc == AxisBoundary::Empty {
                continue;
            }
            let n = self.dims[axis];
            let area = self.face_area(axis);
            let normal = unit(axis);
            let mut shift = [0isize; 3];
            shift[axis] = 1;

            for cell in 0..self.n_cells() {
                let i = self.cell_ijk(cell)[axis];

                if i == 0 && bc == AxisBoundary::ZeroGradient {
                    faces.push(Face {
                        owner: cell,
                        neighbour: None,
                        axis,
                        sf: -normal * area,
                        delta: 0.5 * self.spacing[axis],
                    });
                }

                if i + 1 < n || bc == AxisBoundary::Periodic {
                    faces.push(Face {
                        owner: cell,
                        neighbour: Some(self.offset_cell(cell, shift)),
                        axis,
                        sf: normal * area,
                        delta: self.spacing[axis],
                    });
                } else {
                    faces.push(Face {
                        owner: cell,
                        neighbour: None,
                        axis,
                        sf: normal * area,
                        delta: 0.5 * self.spacing[axis],
                    });
                }
            }
        }
        faces
    }

    /// 单元总数
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    /// 面总数
    #[inline]
    pub fn n_faces(&self) -> usize {
        self.faces.len()
    }

    /// 各方向单元数
    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// 某方向网格间距
    #[inline]
    pub fn spacing(&self, axis: usize) -> f64 {
        self.spacing[axis]
    }

    /// 各方向网格间距
    #[inline]
    pub fn spacings(&self) -> [f64; 3] {
        self.spacing
    }

    /// 某方向边界类型
    #[inline]
    pub fn boundary(&self, axis: usize) -> AxisBoundary {
        self.boundaries[axis]
    }

    /// 非空方向
    pub fn active_axes(&self) -> impl Iterator<Item = usize> + '_ {
        (0..3).filter(move |&a| self.boundaries[a] != AxisBoundary::Empty)
    }

    /// 单元体积
    #[inline]
    pub fn cell_volume(&self) -> f64 {
        self.spacing[0] * self.spacing[1] * self.spacing[2]
    }

    /// 法向为 `axis` 的面的面积
    #[inline]
    pub fn face_area(&self, axis: usize) -> f64 {
        let (a, b) = match axis {
            0 => (1, 2),
            1 => (0, 2),
            _ => (0, 1),
        };
        self.spacing[a] * self.spacing[b]
    }

    /// 所有面
    #[inline]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// (i, j, k) -> 单元编号，x 最快变化
    #[inline]
    pub fn cell_index(&self, ijk: [usize; 3]) -> usize {
        ijk[0] + self.dims[0] * (ijk[1] + self.dims[1] * ijk[2])
    }

    /// 单元编号 -> (i, j, k)
    #[inline]
    pub fn cell_ijk(&self, cell: usize) -> [usize; 3] {
        let nx = self.dims[0];
        let ny = self.dims[1];
        [cell % nx, (cell / nx) % ny, cell / (nx * ny)]
    }

    /// 单元中心坐标
    #[inline]
    pub fn cell_center(&self, cell: usize) -> DVec3 {
        let ijk = self.cell_ijk(cell);
        self.origin
            + DVec3::new(
                (ijk[0] as f64 + 0.5) * self.spacing[0],
                (ijk[1] as f64 + 0.5) * self.spacing[1],
                (ijk[2] as f64 + 0.5) * self.spacing[2],
            )
    }

    /// 按 (di, dj, dk) 偏移寻址单元
    ///
    /// 周期方向回绕，零梯度方向截断到边界单元，空方向忽略偏移。
    pub fn offset_cell(&self, cell: usize, offset: [isize; 3]) -> usize {
        let mut ijk = self.cell_ijk(cell);
        for axis in 0..3 {
            let n = self.dims[axis] as isize;
            let target = ijk[axis] as isize + offset[axis];
            ijk[axis] = match self.boundaries[axis] {
                AxisBoundary::Periodic => target.rem_euclid(n) as usize,
                AxisBoundary::ZeroGradient => target.clamp(0, n - 1) as usize,
                AxisBoundary::Empty => ijk[axis],
            };
        }
        self.cell_index(ijk)
    }

    /// 两网格是否描述同一计算域
    pub fn same_domain(&self, other: &CartesianMesh) -> bool {
        std::ptr::eq(self, other)
            || (self.dims == other.dims
                && self.spacing == other.spacing
                && self.boundaries == other.boundaries
                && self.origin == other.origin)
    }

    /// 网格描述（用于错误信息）
    pub fn describe(&self) -> String {
        format!(
            "{}x{}x{} ({:?}/{:?}/{:?})",
            self.dims[0],
            self.dims[1],
            self.dims[2],
            self.boundaries[0],
            self.boundaries[1],
            self.boundaries[2]
        )
    }
}

#[inline]
fn unit(axis: usize) -> DVec3 {
    match axis {
        0 => DVec3::X,
        1 => DVec3::Y,
        _ => DVec3::Z,
    }
}
