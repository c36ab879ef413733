// crates/mh_config/src/source.rs

//! 运行时配置源
//!
//! 闭合模型在构造时和 `reload_configuration` 时从配置源读取
//! [`LesProperties`]。配置源返回 `Ok(None)` 表示当前没有可用配置，
//! 调用方据此保留原状态。

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::ConfigError;
use crate::les_properties::LesProperties;

/// 可重复读取的 LES 配置源
pub trait PropertiesSource: Send + Sync + fmt::Debug {
    /// 读取当前配置
    ///
    /// - `Ok(Some(_))`: 读取成功且已验证
    /// - `Ok(None)`: 配置不存在
    /// - `Err(_)`: 配置存在但无法解析或验证失败
    fn load(&self) -> Result<Option<LesProperties>, ConfigError>;

    /// 配置源描述（用于日志）
    fn describe(&self) -> String;
}

/// 内存共享配置
///
/// 克隆得到的句柄共享同一份配置，修改对所有持有者可见。
#[derive(Debug, Clone, Default)]
pub struct SharedProperties {
    inner: Arc<RwLock<Option<LesProperties>>>,
}

impl SharedProperties {
    /// 以给定配置创建
    pub fn new(props: LesProperties) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(props))),
        }
    }

    /// 创建不含配置的句柄
    pub fn empty() -> Self {
        Self::default()
    }

    /// 替换配置
    pub fn set(&self, props: LesProperties) {
        *self.inner.write() = Some(props);
    }

    /// 移除配置
    pub fn clear(&self) {
        *self.inner.write() = None;
    }

    /// 原地修改配置，无配置时返回 `false`
    pub fn update<F: FnOnce(&mut LesProperties)>(&self, f: F) -> bool {
        match self.inner.write().as_mut() {
            Some(props) => {
                f(props);
                true
            }
            None => false,
        }
    }

    /// 当前配置副本
    pub fn snapshot(&self) -> Option<LesProperties> {
        self.inner.read().clone()
    }
}

impl PropertiesSource for SharedProperties {
    fn load(&self) -> Result<Option<LesProperties>, ConfigError> {
        match self.snapshot() {
            Some(props) => {
                props.validate()?;
                Ok(Some(props))
            }
            None => Ok(None),
        }
    }

    fn describe(&self) -> String {
        "shared".to_string()
    }
}

/// 文件配置
///
/// 每次 `load` 都重新读取 JSON 文件；文件不存在视为无配置。
#[derive(Debug, Clone)]
pub struct FileProperties {
    path: PathBuf,
}

impl FileProperties {
    /// 绑定到文件路径
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PropertiesSource for FileProperties {
    fn load(&self) -> Result<Option<LesProperties>, ConfigError> {
        if !self.path.exists() {
            log::debug!("LES 配置文件不存在: {}", self.path.display());
            return Ok(None);
        }
        LesProperties::from_file(&self.path).map(Some)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
