// ==========================================
// MFA→LCI 过程图构建 - 交换符号
// ==========================================
// 两个独立的 ±1 因子相乘:
// - 库类型: 常规过程库 +1，基本流库 -1
// - 流向:   input +1，output -1
// ==========================================

use crate::domain::types::{FlowDirection, StoreKind};

fn store_factor(kind: StoreKind) -> f64 {
    match kind {
        StoreKind::Technosphere => 1.0,
        StoreKind::Biosphere => -1.0,
    }
}

fn direction_factor(direction: FlowDirection) -> f64 {
    match direction {
        FlowDirection::Input => 1.0,
        FlowDirection::Output => -1.0,
    }
}

/// 外部交换的符号乘子
pub fn exchange_sign(kind: StoreKind, direction: FlowDirection) -> f64 {
    store_factor(kind) * direction_factor(direction)
}
