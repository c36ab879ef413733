// crates/mh_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `MhError` 枚举和 `MhResult` 类型别名，用于整个工作区的错误处理。
//!
//! # 错误分类
//!
//! 1. **配置错误**: 未知的模型/滤波器名称、缺失或无效的系数，构造时致命
//! 2. **场域不匹配**: 场所在网格与闭合模型网格不一致，在调用处致命
//! 3. **IO 与序列化错误**: 配置文件读写失败
//!
//! # 示例
//!
//! ```
//! use mh_foundation::error::{MhError, MhResult};
//!
//! fn read_config() -> MhResult<()> {
//!     Err(MhError::config("配置文件格式错误"))
//! }
//! ```

use thiserror::Error;

/// 统一结果类型
pub type MhResult<T> = Result<T, MhError>;

/// MariHydro 错误类型
#[derive(Error, Debug)]
pub enum MhError {
    // ========================================================================
    // IO 相关错误
    // ========================================================================

    /// IO 错误
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        #[source]
        /// 可选的底层 IO 错误
        source: Option<std::io::Error>,
    },

    /// 序列化错误
    #[error("序列化错误: {message}")]
    Serialization {
        /// 序列化失败原因
        message: String,
    },

    // ========================================================================
    // 配置错误
    // ========================================================================

    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },

    /// 缺少配置项
    #[error("缺少必需的配置项: {key}")]
    MissingConfig {
        /// 配置键名
        key: String,
    },

    /// 配置值无效
    #[error("配置值无效: {key}={value}, 原因: {reason}")]
    InvalidConfig {
        /// 配置键名
        key: String,
        /// 配置值
        value: String,
        /// 无效原因说明
        reason: String,
    },

    /// 运行时选择的名称未注册
    #[error("未知的{kind}: '{name}' (可选: {available:?})")]
    UnknownSelection {
        /// 选择类别（如 "LES 模型"、"滤波器"）
        kind: &'static str,
        /// 请求的名称
        name: String,
        /// 已注册的名称
        available: Vec<String>,
    },

    // ========================================================================
    // 场与网格错误
    // ========================================================================

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 场所在网格与期望网格不一致
    #[error("场域不匹配: {message}")]
    MeshMismatch {
        /// 具体错误信息
        message: String,
    },

    /// 无效网格
    #[error("无效的网格: {message}")]
    InvalidMesh {
        /// 具体错误信息
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl MhError {
    /// 从IO错误创建（带源）
    pub fn io_with_source(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source),
        }
    }

    /// 序列化错误
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 缺少配置
    pub fn missing_config(key: impl Into<String>) -> Self {
        Self::MissingConfig { key: key.into() }
    }

    /// 配置值无效
    pub fn invalid_config(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// 未知的运行时选择
    pub fn unknown_selection(
        kind: &'static str,
        name: impl Into<String>,
        available: Vec<String>,
    ) -> Self {
        Self::UnknownSelection {
            kind,
            name: name.into(),
            available,
        }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }

    /// 场域不匹配
    pub fn mesh_mismatch(message: impl Into<String>) -> Self {
        Self::MeshMismatch {
            message: message.into(),
        }
    }

    /// 无效网格
    pub fn invalid_mesh(message: impl Into<String>) -> Self {
        Self::InvalidMesh {
            message: message.into(),
        }
    }

    /// 是否为配置类错误
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::Config { .. }
                | Self::MissingConfig { .. }
                | Self::InvalidConfig { .. }
                | Self::UnknownSelection { .. }
        )
    }
}

// ========================================================================
// 验证辅助方法
// ========================================================================

impl MhError {
    /// 检查数组大小是否匹配
    #[inline]
    pub fn check_size(name: &'static str, expected: usize, actual: usize) -> MhResult<()> {
        if expected != actual {
            Err(Self::size_mismatch(name, expected, actual))
        } else {
            Ok(())
        }
    }
}

// ========================================================================
// 标准库错误转换
// ========================================================================

impl From<std::io::Error> for MhError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

// ========================================================================
// 宏
// ========================================================================

/// 条件不满足时提前返回错误
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err($err.into());
        }
    };
}

/// 从 `Option` 取值，`None` 时提前返回错误
#[macro_export]
macro_rules! require {
    ($opt:expr, $err:expr $(,)?) => {
        match $opt {
            Some(v) => v,
            None => return Err($err.into()),
        }
    };
}

// ========================================================================
// 测试
// ========================================================================
