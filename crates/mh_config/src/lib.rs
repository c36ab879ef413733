// crates/mh_config/src/lib.rs

//! MariHydro LES Config Layer
//!
//! 配置层，提供 LES 闭合的系数字典与运行时可重读的配置源。
//!
//! # 模块概览
//!
//! - [`les_properties`]: `LesProperties` 系数字典（JSON）
//! - [`source`]: `PropertiesSource` 运行时配置源（内存共享 / 文件）
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! mh_les        ─> 读取 LesProperties，构造滤波器与闭合模型
//! mh_config     ─> LesProperties, PropertiesSource (本层)
//! mh_foundation ─> MhError
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod les_properties;
pub mod source;

// 重导出核心类型
pub use error::ConfigError;
pub use les_properties::{
    DeltaConfig, DeltaKind, FilterConfig, LesProperties, ModelCoeffs, DEFAULT_FILTER, DEFAULT_MODEL,
};
pub use source::{FileProperties, PropertiesSource, SharedProperties};
