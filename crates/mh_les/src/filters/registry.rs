// crates/mh_les/src/filters/registry.rs

//! 滤波器注册中心，按 `filter.type` 选择

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use mh_config::FilterConfig;
use mh_foundation::{require, MhError, MhResult};

use super::{LesFilter, SimpleFilter, StencilFilter};
use crate::mesh::CartesianMesh;

/// 滤波器构造函数
pub type FilterFactory = fn(Arc<CartesianMesh>, &FilterConfig) -> MhResult<Box<dyn LesFilter>>;

/// 滤波器注册中心
#[derive(Clone)]
pub struct FilterRegistry {
    /// 名称到构造函数的映射
    factories: BTreeMap<String, FilterFactory>,
}

impl FilterRegistry {
    /// 空注册中心
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// 包含全部内置滤波器
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("simple", simple_factory);
        registry.register("box", box_factory);
        registry.register("gaussian", gaussian_factory);
        registry.register("anisotropic", anisotropic_factory);
        registry.register("laplace", laplace_factory);
        registry
    }

    /// 注册滤波器，同名时覆盖并返回 true
    pub fn register(&mut self, name: impl Into<String>, factory: FilterFactory) -> bool {
        self.factories.insert(name.into(), factory).is_some()
    }

    /// 已注册名称（有序）
    pub fn names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// 是否已注册
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// 按配置创建滤波器
    pub fn create(
        &self,
        mesh: Arc<CartesianMesh>,
        config: &FilterConfig,
    ) -> MhResult<Box<dyn LesFilter>> {
        let factory = require!(
            self.factories.get(config.kind.as_str()),
            MhError::unknown_selection("滤波器", config.kind.clone(), self.names())
        );
        let filter = factory(mesh, config)?;
        log::debug!(
            "创建滤波器 {} (radius {:?})",
            filter.type_name(),
            filter.support_radius()
        );
        Ok(filter)
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.names())
            .finish()
    }
}

fn simple_factory(mesh: Arc<CartesianMesh>, _config: &FilterConfig) -> MhResult<Box<dyn LesFilter>> {
    Ok(Box::new(SimpleFilter::new(mesh)?))
}

fn box_factory(mesh: Arc<CartesianMesh>, config: &FilterConfig) -> MhResult<Box<dyn LesFilter>> {
    let width = require!(config.width, MhError::missing_config("filter.width"));
    Ok(Box::new(StencilFilter::top_hat(mesh, width)?))
}

fn gaussian_factory(mesh: Arc<CartesianMesh>, config: &FilterConfig) -> MhResult<Box<dyn LesFilter>> {
    let width = require!(config.width, MhError::missing_config("filter.width"));
    Ok(Box::new(StencilFilter::gaussian(mesh, width)?))
}

fn anisotropic_factory(
    mesh: Arc<CartesianMesh>,
    config: &FilterConfig,
) -> MhResult<Box<dyn LesFilter>> {
    let widths = require!(config.widths, MhError::missing_config("filter.widths"));
    Ok(Box::new(StencilFilter::anisotropic(mesh, widths)?))
}

fn laplace_factory(mesh: Arc<CartesianMesh>, config: &FilterConfig) -> MhResult<Box<dyn LesFilter>> {
    let width_coeff = require!(
        config.width_coeff,
        MhError::missing_config("filter.width_coeff")
    );
    Ok(Box::new(StencilFilter::laplace(mesh, width_coeff)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh() -> Arc<CartesianMesh> {
        Arc::new(CartesianMesh::periodic_box(6, 1.0).unwrap())
    }

    #[test]
    fn test_default_names() {
        let registry = FilterRegistry::default();
        assert_eq!(
            registry.names(),
            vec!["anisotropic", "box", "gaussian", "laplace", "simple"]
        );
    }

    #[test]
    fn test_create_each_builtin() {
        let registry = FilterRegistry::with_defaults();
        let configs = [
            FilterConfig::named("simple"),
            FilterConfig::box_filter(2.0),
            FilterConfig::named("gaussian").with_width(2.0),
            FilterConfig::named("anisotropic").with_widths([2.0, 1.0, 3.0]),
            FilterConfig::named("laplace").with_width_coeff(8.0),
        ];
        for config in &configs {
            let filter = registry.create(mesh(), config).unwrap();
            assert_eq!(filter.type_name(), config.kind);
        }
    }

    #[test]
    fn test_unknown_filter() {
        let registry = FilterRegistry::with_defaults();
        let err = registry
            .create(mesh(), &FilterConfig::named("wavelet"))
            .unwrap_err();
        match err {
            MhError::UnknownSelection { name, available, .. } => {
                assert_eq!(name, "wavelet");
                assert!(available.contains(&"box".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_width() {
        let registry = FilterRegistry::with_defaults();
        let err = registry
            .create(mesh(), &FilterConfig::named("box"))
            .unwrap_err();
        assert!(matches!(err, MhError::MissingConfig { .. }));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_register_custom() {
        fn identity(mesh: Arc<CartesianMesh>, _: &FilterConfig) -> MhResult<Box<dyn LesFilter>> {
            Ok(Box::new(StencilFilter::top_hat(mesh, 1.0)?))
        }
        let mut registry = FilterRegistry::new();
        assert!(!registry.register("identity", identity));
        assert!(registry.register("identity", identity));
        assert!(registry.contains("identity"));
        assert!(!registry.contains("box"));
    }
}
