// ==========================================
// MFA→LCI 过程图构建 - 配置层
// ==========================================
// 职责: 批处理配置加载、默认值、环境变量覆写与校验
// 存储: JSON 文件
// ==========================================

pub mod builder_config;

// 重导出核心配置类型
pub use builder_config::{
    BuilderConfig, CatalogFormat, CatalogSource, ConfigError, ConfigResult, RouteConfig,
    YearWindow, CONFIG_PATH_ENV, OUTPUT_DIR_ENV,
};
