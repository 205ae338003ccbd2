//! 实验场景参数

use serde::Deserialize;

use crate::epon::{GrantPolicy, PonConfig};

/// 流量剖面
///
/// - `Lrd`：长相关（自相似）突发流量，Pareto ON/OFF
/// - `Srd`：短相关突发流量，指数 ON/OFF
/// - `Cbr`：恒定比特率
/// - `Video`：令牌桶视频流
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficProfile {
    #[default]
    Lrd,
    Srd,
    Cbr,
    Video,
}

impl TrafficProfile {
    pub fn descriptor(&self) -> &'static str {
        match self {
            TrafficProfile::Lrd => "Bursty (Self-similar)",
            TrafficProfile::Srd => "Bursty (non-Self-similar)",
            TrafficProfile::Cbr => "Constant Bit Rate",
            TrafficProfile::Video => "Video Stream",
        }
    }
}

/// 一次实验的全部参数。负载在 [min_load, max_load] 上等距取
/// num_test 个点，每个点跑到所有 LLID 合计送出 packet_limit 个包。
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EponScenario {
    pub seed: u64,
    /// 每个负载点的发包数
    pub packet_limit: u64,
    /// 统计开始前的预热时长（ns）
    pub warmup_time: i64,
    pub min_load: f64,
    pub max_load: f64,
    pub num_test: usize,
    pub traffic: TrafficProfile,
    /// 每个包源聚合的 ON/OFF 流条数
    pub burst_pool_size: u16,
    /// 平均突发长度（字节）
    pub mean_burst_size: f64,
    pub pareto_shape: f64,
    /// 视频流的突发周期（字节戳）
    pub video_burst_period: u64,
    pub policy: GrantPolicy,
    /// 出现协议告警时中止本次运行
    pub stop_on_warning: bool,
    pub pon: PonConfig,
}

impl Default for EponScenario {
    fn default() -> Self {
        EponScenario {
            seed: 1,
            packet_limit: 1_000_000,
            warmup_time: 10 * 1_000_000_000,
            min_load: 0.05,
            max_load: 0.90,
            num_test: 18,
            traffic: TrafficProfile::Lrd,
            burst_pool_size: 128,
            mean_burst_size: 3200.0,
            pareto_shape: 1.4,
            video_burst_period: 10_000,
            policy: GrantPolicy::Limited,
            stop_on_warning: false,
            pon: PonConfig::default(),
        }
    }
}

impl EponScenario {
    /// 相邻负载点的间距
    pub fn load_step(&self) -> f64 {
        if self.num_test > 1 {
            (self.max_load - self.min_load) / (self.num_test - 1) as f64
        } else {
            0.0
        }
    }

    /// 第 t 个负载点的目标负载
    pub fn target_load(&self, t: usize) -> f64 {
        self.min_load + t as f64 * self.load_step()
    }
}
