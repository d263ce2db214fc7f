// ==========================================
// 设备完整性管理系统 - 配置层
// ==========================================
// 职责: RBI 计算参数配置, 构造时校验
// ==========================================

pub mod rbi_config;

// 重导出顶层配置
pub use rbi_config::{
    BatchConfig, CacheConfig, IntervalConfig, LearningConfig, Level1Config, Level2Config,
    Level3Config, PatternConfig, QualityConfig, RbiConfig,
};
