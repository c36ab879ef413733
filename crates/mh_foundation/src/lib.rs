// crates/mh_foundation/src/lib.rs

//! MariHydro LES Foundation Layer
//!
//! 基础层，为 LES 闭合工作区提供统一错误类型。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型 [`MhError`] 与 [`MhResult`]
//!
//! # 示例
//!
//! ```
//! use mh_foundation::{ensure, MhError, MhResult};
//!
//! fn check_width(width: f64) -> MhResult<f64> {
//!     ensure!(width > 0.0, MhError::invalid_config("width", width.to_string(), "必须为正"));
//!     Ok(width)
//! }
//!
//! assert!(check_width(2.0).is_ok());
//! assert!(check_width(-1.0).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;

pub use error::{MhError, MhResult};

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::error::{MhError, MhResult};
    pub use crate::{ensure, require};
}
