// ==========================================
// 集成测试共享辅助模块
// ==========================================

pub mod test_data_builder;

#[allow(unused_imports)]
pub use test_data_builder::*;
