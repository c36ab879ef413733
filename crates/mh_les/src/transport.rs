// crates/mh_les/src/transport.rs

//! 输运（分子粘性）模型

use std::fmt;
use std::sync::Arc;

use mh_foundation::{ensure, MhError, MhResult};

use crate::fields::VolScalarField;
use crate::mesh::CartesianMesh;

/// 分子运动粘性来源
pub trait TransportModel: Send + Sync + fmt::Debug {
    /// 模型名称
    fn name(&self) -> &'static str;

    /// 分子运动粘性 ν [m²/s]
    fn nu(&self) -> VolScalarField;
}

/// 牛顿流体，常运动粘性
#[derive(Debug, Clone)]
pub struct Newtonian {
    mesh: Arc<CartesianMesh>,
    nu: f64,
}

impl Newtonian {
    /// 创建，ν 必须为非负有限值
    pub fn new(mesh: Arc<CartesianMesh>, nu: f64) -> MhResult<Self> {
        ensure!(
            nu.is_finite() && nu >= 0.0,
            MhError::invalid_config("nu", nu.to_string(), "运动粘性必须为非负有限值")
        );
        Ok(Self { mesh, nu })
    }

    /// 运动粘性值
    pub fn value(&self) -> f64 {
        self.nu
    }
}

impl TransportModel for Newtonian {
    fn name(&self) -> &'static str {
        "newtonian"
    }

    fn nu(&self) -> VolScalarField {
        VolScalarField::uniform(&self.mesh, self.nu)
    }
}
