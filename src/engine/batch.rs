// ==========================================
// 设备完整性管理系统 - 批量计算器
// ==========================================
// 并发模型: 单台计算是纯函数 (只读注册表),
//           不同设备可完全并行
// 约束: 固定大小工作池 + 单项超时;
//       超时/失败逐项上报, 不中断同批其余项
// ==========================================

use crate::domain::equipment::{EquipmentData, ExtractedRBIData};
use crate::domain::result::CalculationResult;
use crate::domain::types::CalculationLevel;
use crate::engine::calculator::RbiCalculator;
use crate::engine::error::RbiError;
use anyhow::anyhow;
use chrono::NaiveDate;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{info, warn};

// ==========================================
// BatchItem - 批量计算输入项
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    pub equipment: EquipmentData,

    #[serde(default)]
    pub data: Option<ExtractedRBIData>,

    /// None = auto (从最高等级起算)
    #[serde(default)]
    pub requested_level: Option<CalculationLevel>,

    /// 该设备历史计算结果 (异常检测用)
    #[serde(default)]
    pub history: Vec<CalculationResult>,
}

// ==========================================
// BatchFailure - 逐项失败记录
// ==========================================
#[derive(Debug)]
pub struct BatchFailure {
    pub equipment_id: String,
    pub error: RbiError,
}

// ==========================================
// BatchOutcome - 批量结果 (部分成功语义)
// ==========================================
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// 成功结果列表
    pub results: Vec<CalculationResult>,
    /// 并行的逐项失败列表
    pub failures: Vec<BatchFailure>,
}

// ==========================================
// BatchCalculator - 批量计算器
// ==========================================
pub struct BatchCalculator {
    calculator: Arc<RbiCalculator>,
}

impl BatchCalculator {
    pub fn new(calculator: Arc<RbiCalculator>) -> Self {
        Self { calculator }
    }

    /// 批量计算 (工作池限并发 + 单项超时)
    ///
    /// # 返回
    /// 部分成功列表 + 逐项失败列表; 本调用自身不失败
    pub async fn calculate_all(&self, items: Vec<BatchItem>, today: NaiveDate) -> BatchOutcome {
        let batch = &self.calculator.config().batch;
        let semaphore = Arc::new(Semaphore::new(batch.max_workers));
        let timeout = Duration::from_secs(batch.timeout_seconds);
        let total = items.len();

        info!(
            total,
            max_workers = batch.max_workers,
            timeout_seconds = batch.timeout_seconds,
            "开始批量 RBI 计算"
        );

        let tasks = items.into_iter().map(|item| {
            let calculator = self.calculator.clone();
            let semaphore = semaphore.clone();
            let timeout_seconds = batch.timeout_seconds;
            async move {
                let equipment_id = item.equipment.equipment_id.clone();

                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return Err(BatchFailure {
                            equipment_id,
                            error: RbiError::Other(anyhow!("工作池已关闭: {}", e)),
                        })
                    }
                };

                let handle = tokio::task::spawn_blocking(move || {
                    calculator.calculate(
                        Some(&item.equipment),
                        item.data.as_ref(),
                        item.requested_level,
                        &item.history,
                        today,
                    )
                });

                match tokio::time::timeout(timeout, handle).await {
                    // 超时: 逐项上报, 不影响同批其余项
                    Err(_) => Err(BatchFailure {
                        equipment_id: equipment_id.clone(),
                        error: RbiError::CalculationTimeout {
                            equipment_id,
                            seconds: timeout_seconds,
                        },
                    }),
                    Ok(Err(join_error)) => Err(BatchFailure {
                        equipment_id,
                        error: RbiError::Other(anyhow!("计算任务异常终止: {}", join_error)),
                    }),
                    Ok(Ok(Ok(result))) => Ok(result),
                    Ok(Ok(Err(error))) => Err(BatchFailure {
                        equipment_id,
                        error,
                    }),
                }
            }
        });

        let mut outcome = BatchOutcome::default();
        for task_result in join_all(tasks).await {
            match task_result {
                Ok(result) => outcome.results.push(result),
                Err(failure) => {
                    warn!(
                        equipment_id = %failure.equipment_id,
                        error = %failure.error,
                        "批量计算单项失败"
                    );
                    outcome.failures.push(failure);
                }
            }
        }

        info!(
            succeeded = outcome.results.len(),
            failed = outcome.failures.len(),
            "批量 RBI 计算完成"
        );
        outcome
    }
}
