// crates/mh_les/src/lib.rs

//! MariHydro LES 亚格子闭合
//!
//! 在均匀笛卡尔有限体积网格上提供大涡模拟的亚格子应力模型：
//! - 网格与场 (mesh, fields, tensor)
//! - 有限体积算子与动量方程项 (numerics)
//! - 空间滤波器库 (filters)
//! - 亚格子闭合 (turbulence)：尺度相似、Smagorinsky 与组合模型
//!
//! # 示例
//!
//! ```
//! use std::sync::Arc;
//!
//! use glam::DVec3;
//! use mh_config::SharedProperties;
//! use mh_les::prelude::*;
//!
//! let mesh = Arc::new(CartesianMesh::periodic_box(8, 1.0).unwrap());
//! let transport = Arc::new(Newtonian::new(mesh.clone(), 1e-5).unwrap());
//! let ctx = LesContext::new(mesh.clone(), transport, Arc::new(SharedProperties::empty())).unwrap();
//!
//! let u = VolVectorField::uniform(&mesh, DVec3::X);
//! let phi = operators::flux(&u);
//! let model = LesModelRegistry::default().create(ctx, &u, &phi).unwrap();
//!
//! assert_eq!(model.type_name(), "mixed_smagorinsky");
//! assert!(model.stress_tensor().max_abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod fields;
pub mod filters;
pub mod mesh;
pub mod numerics;
pub mod tensor;
pub mod transport;
pub mod turbulence;

pub use fields::{
    FieldValue, SurfaceField, SurfaceScalarField, VolField, VolScalarField, VolSymmTensorField,
    VolTensorField, VolVectorField,
};
pub use filters::{FilterRegistry, LesFilter, SimpleFilter, StencilFilter};
pub use mesh::{AxisBoundary, CartesianMesh};
pub use numerics::MomentumMatrix;
pub use tensor::SymmTensor;
pub use transport::{Newtonian, TransportModel};
pub use turbulence::{
    LesContext, LesModel, LesModelRegistry, MixedModel, ScaleSimilarity, Smagorinsky,
};

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::fields::{
        SurfaceScalarField, VolScalarField, VolSymmTensorField, VolTensorField, VolVectorField,
    };
    pub use crate::filters::{FilterRegistry, LesFilter};
    pub use crate::mesh::{AxisBoundary, CartesianMesh};
    pub use crate::numerics::{operators, MomentumMatrix};
    pub use crate::tensor::SymmTensor;
    pub use crate::transport::{Newtonian, TransportModel};
    pub use crate::turbulence::{
        LesContext, LesModel, LesModelRegistry, MixedModel, ScaleSimilarity, Smagorinsky,
    };
}
