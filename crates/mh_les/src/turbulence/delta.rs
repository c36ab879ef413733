// crates/mh_les/src/turbulence/delta.rs

//! LES 滤波尺度 Δ
//!
//! ```text
//! cube_root_vol:  Δ = c · (Π_a h_a)^(1/n)    n 为非空方向数
//! max_delta_xyz:  Δ = c · max_a h_a
//! ```
//!
//! 三维时第一式即 `c · ∛V`；二维（一个空方向）时为 `c · √(V/厚度)`。

use std::sync::Arc;

use mh_config::{DeltaConfig, DeltaKind};
use mh_foundation::{ensure, MhError, MhResult};

use crate::fields::VolScalarField;
use crate::mesh::CartesianMesh;

/// 非空方向间距的几何平均
pub fn cube_root_vol(mesh: &CartesianMesh) -> f64 {
    let (product, n) = mesh
        .active_axes()
        .fold((1.0, 0), |(p, n), axis| (p * mesh.spacing(axis), n + 1));
    if n == 0 {
        return 0.0;
    }
    product.powf(1.0 / n as f64)
}

/// 非空方向的最大间距
pub fn max_delta_xyz(mesh: &CartesianMesh) -> f64 {
    mesh.active_axes()
        .map(|axis| mesh.spacing(axis))
        .fold(0.0, f64::max)
}

/// 滤波尺度
#[derive(Debug, Clone)]
pub struct LesDelta {
    kind: DeltaKind,
    coeff: f64,
    value: f64,
    field: VolScalarField,
}

impl LesDelta {
    /// 按配置计算
    pub fn new(mesh: &Arc<CartesianMesh>, config: &DeltaConfig) -> MhResult<Self> {
        ensure!(
            config.coeff.is_finite() && config.coeff > 0.0,
            MhError::invalid_config("delta.coeff", config.coeff.to_string(), "必须为正")
        );
        let base = match config.kind {
            DeltaKind::CubeRootVol => cube_root_vol(mesh),
            DeltaKind::MaxDeltaXyz => max_delta_xyz(mesh),
        };
        let value = config.coeff * base;
        ensure!(
            value > 0.0,
            MhError::invalid_mesh("无法在没有非空方向的网格上定义滤波尺度")
        );
        Ok(Self {
            kind: config.kind,
            coeff: config.coeff,
            value,
            field: VolScalarField::uniform(mesh, value),
        })
    }

    /// 尺度类型
    pub fn kind(&self) -> DeltaKind {
        self.kind
    }

    /// 系数
    pub fn coeff(&self) -> f64 {
        self.coeff
    }

    /// Δ 值（均匀网格上处处相同）
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Δ 场
    pub fn field(&self) -> &VolScalarField {
        &self.field
    }
}
