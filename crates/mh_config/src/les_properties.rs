// crates/mh_config/src/les_properties.rs

//! LesProperties - LES 闭合系数字典
//!
//! 对应求解器的 LES 配置字典：选择的模型名、LES 长度尺度、
//! 以及按模型名分组的系数子字典。
//!
//! ```json
//! {
//!   "model": "mixed_smagorinsky",
//!   "print_coeffs": true,
//!   "delta": { "type": "cube_root_vol", "coeff": 1.0 },
//!   "coeffs": {
//!     "scale_similarity": { "filter": { "type": "box", "width": 2.0 }, "c_b": 1.0 },
//!     "smagorinsky": { "c_k": 0.094, "c_e": 1.048 }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ConfigError;

/// 默认 LES 模型
pub const DEFAULT_MODEL: &str = "mixed_smagorinsky";

/// 默认滤波器
pub const DEFAULT_FILTER: &str = "simple";

/// LES 配置字典
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LesProperties {
    /// 选择的 LES 模型名
    #[serde(default = "default_model")]
    pub model: String,

    /// 构造时是否打印模型系数
    #[serde(default)]
    pub print_coeffs: bool,

    /// LES 长度尺度
    #[serde(default)]
    pub delta: DeltaConfig,

    /// 各模型系数子字典，键为模型名
    #[serde(default)]
    pub coeffs: BTreeMap<String, ModelCoeffs>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Default for LesProperties {
    fn default() -> Self {
        Self {
            model: default_model(),
            print_coeffs: false,
            delta: DeltaConfig::default(),
            coeffs: BTreeMap::new(),
        }
    }
}

/// LES 长度尺度类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeltaKind {
    /// 单元体积立方根（2D 时为面积平方根）
    #[default]
    CubeRootVol,
    /// 三个方向网格间距的最大值
    MaxDeltaXyz,
}

/// LES 长度尺度配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeltaConfig {
    /// 长度尺度类型
    #[serde(rename = "type", default)]
    pub kind: DeltaKind,
    /// 缩放系数
    #[serde(default = "default_delta_coeff")]
    pub coeff: f64,
}

fn default_delta_coeff() -> f64 {
    1.0
}

impl Default for DeltaConfig {
    fn default() -> Self {
        Self {
            kind: DeltaKind::default(),
            coeff: default_delta_coeff(),
        }
    }
}

/// 单个模型的系数子字典
///
/// 除 `filter` 外的所有键均按标量系数处理。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelCoeffs {
    /// 滤波器选择（仅滤波类模型使用）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterConfig>,

    /// 标量系数
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

impl ModelCoeffs {
    /// 创建空子字典
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置滤波器
    pub fn with_filter(mut self, filter: FilterConfig) -> Self {
        self.filter = Some(filter);
        self
    }

    /// 设置标量系数
    pub fn with_value(mut self, key: impl Into<String>, value: f64) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    /// 查询系数，不存在时返回默认值
    pub fn lookup_or_default(&self, key: &str, default: f64) -> f64 {
        self.values.get(key).copied().unwrap_or(default)
    }
}

/// 滤波器选择与参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// 滤波核名称
    #[serde(rename = "type", default = "default_filter_kind")]
    pub kind: String,

    /// 滤波宽度（以网格单元数计），box / gaussian 使用
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,

    /// Laplace 滤波宽度系数
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_coeff: Option<f64>,

    /// 各方向滤波宽度（以网格单元数计），anisotropic 使用
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widths: Option<[f64; 3]>,
}

fn default_filter_kind() -> String {
    DEFAULT_FILTER.to_string()
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::named(DEFAULT_FILTER)
    }
}

impl FilterConfig {
    /// 按名称创建，不带参数
    pub fn named(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            width: None,
            width_coeff: None,
            widths: None,
        }
    }

    /// 指定宽度的 box 滤波器
    pub fn box_filter(width: f64) -> Self {
        Self::named("box").with_width(width)
    }

    /// 设置滤波宽度
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    /// 设置宽度系数
    pub fn with_width_coeff(mut self, width_coeff: f64) -> Self {
        self.width_coeff = Some(width_coeff);
        self
    }

    /// 设置各方向宽度
    pub fn with_widths(mut self, widths: [f64; 3]) -> Self {
        self.widths = Some(widths);
        self
    }

    fn validate(&self, scope: &str) -> Result<(), ConfigError> {
        if self.kind.trim().is_empty() {
            return Err(ConfigError::invalid(format!("{scope}.filter.type"), "", "不能为空"));
        }
        if let Some(w) = self.width {
            check_positive(&format!("{scope}.filter.width"), w)?;
        }
        if let Some(c) = self.width_coeff {
            check_positive(&format!("{scope}.filter.width_coeff"), c)?;
        }
        if let Some(ws) = self.widths {
            for w in ws {
                check_positive(&format!("{scope}.filter.widths"), w)?;
            }
        }
        Ok(())
    }
}

fn check_positive(key: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::invalid(key, value, "必须为正的有限值"));
    }
    Ok(())
}

impl LesProperties {
    /// 从 JSON 字符串解析并验证
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let props: LesProperties =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        props.validate()?;
        Ok(props)
    }

    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::invalid("model", "", "模型名不能为空"));
        }

        check_positive("delta.coeff", self.delta.coeff)?;

        for (model, coeffs) in &self.coeffs {
            for (key, value) in &coeffs.values {
                if !value.is_finite() {
                    return Err(ConfigError::invalid(
                        format!("{model}.{key}"),
                        value,
                        "必须为有限值",
                    ));
                }
            }
            if let Some(filter) = &coeffs.filter {
                filter.validate(model)?;
            }
        }

        Ok(())
    }

    /// 获取模型系数子字典
    pub fn coeffs(&self, model: &str) -> Option<&ModelCoeffs> {
        self.coeffs.get(model)
    }

    /// 设置模型系数子字典
    pub fn with_coeffs(mut self, model: impl Into<String>, coeffs: ModelCoeffs) -> Self {
        self.coeffs.insert(model.into(), coeffs);
        self
    }

    /// 设置模型名
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}
