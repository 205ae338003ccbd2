//! ON/OFF 更新过程流
//!
//! 一条流交替产生（突发字节数, 间歇字节数）对。四种变体只在
//! 突发/间歇的采样方式上不同，用带参枚举表达。

use crate::sim::SimRng;

pub const MIN_ALPHA: f64 = 1.001;
pub const MAX_ALPHA: f64 = 1.999;

pub const MIN_LOAD: f64 = 1.0e-10;
pub const MAX_LOAD: f64 = 0.99999;

fn clamp_load(load: f64) -> f64 {
    load.clamp(MIN_LOAD, MAX_LOAD)
}

/// 流变体与各自的采样参数
#[derive(Debug, Clone)]
pub enum StreamKind {
    /// Pareto ON/OFF：长相关（自相似）流量
    Pareto {
        min_burst: f64,
        min_pause: f64,
        shape: f64,
    },
    /// 指数 ON/OFF：短相关流量
    Expon { mean_burst: f64, mean_pause: f64 },
    /// 恒定比特率
    Cbr { burst: u64, pause: u64 },
    /// 令牌桶视频流：每个突发周期按 Pareto 积累令牌，突发受上限截断
    Video {
        tokens: u64,
        last_burst: u64,
        period: u64,
        min_burst: f64,
        max_burst: u64,
        shape: f64,
    },
}

impl StreamKind {
    pub fn pareto(mean_burst: f64, shape: f64) -> Self {
        let shape = shape.clamp(MIN_ALPHA, MAX_ALPHA);
        StreamKind::Pareto {
            min_burst: mean_burst * (1.0 - 1.0 / shape),
            min_pause: 0.0,
            shape,
        }
    }

    pub fn expon(mean_burst: f64) -> Self {
        StreamKind::Expon {
            mean_burst,
            mean_pause: 0.0,
        }
    }

    pub fn cbr(mean_burst: f64) -> Self {
        StreamKind::Cbr {
            burst: mean_burst.round() as u64,
            pause: 0,
        }
    }

    pub fn video(max_burst: f64, burst_period: u64, shape: f64) -> Self {
        StreamKind::Video {
            tokens: 0,
            last_burst: 0,
            period: burst_period,
            min_burst: 0.0,
            max_burst: max_burst.round() as u64,
            shape: shape.clamp(MIN_ALPHA, MAX_ALPHA),
        }
    }
}

/// 更新过程流。只保存当前突发长度和下一次到达的字节戳。
#[derive(Debug, Clone)]
pub struct Stream {
    /// 聚合器池中的稳定序号（到达时间相同的流靠它区分）
    pub(crate) slot: u32,
    burst_size: u64,
    /// 下一个突发首字节的字节戳
    arrival: u64,
    kind: StreamKind,
}

impl Stream {
    /// 构造流：设定负载并做一次随机相位复位。
    pub fn new(kind: StreamKind, load: f64, rng: &mut SimRng) -> Self {
        let mut s = Stream {
            slot: 0,
            burst_size: 0,
            arrival: 0,
            kind,
        };
        s.set_load(load);
        s.reset(rng);
        s
    }

    pub fn arrival_bytestamp(&self) -> u64 {
        self.arrival
    }

    pub fn burst_size(&self) -> u64 {
        self.burst_size
    }

    fn next_burst_size(&mut self, rng: &mut SimRng) -> u64 {
        match &mut self.kind {
            StreamKind::Pareto { min_burst, shape, .. } => {
                (rng.pareto(*shape) * *min_burst).round() as u64
            }
            StreamKind::Expon { mean_burst, .. } => {
                (rng.exponential() * *mean_burst).round() as u64
            }
            StreamKind::Cbr { burst, .. } => *burst,
            StreamKind::Video {
                tokens,
                last_burst,
                min_burst,
                max_burst,
                shape,
                ..
            } => {
                *tokens += (rng.pareto(*shape) * *min_burst).round() as u64;
                *last_burst = (*tokens).min(*max_burst);
                *tokens -= *last_burst;
                *last_burst
            }
        }
    }

    fn next_pause_size(&mut self, rng: &mut SimRng) -> u64 {
        match &mut self.kind {
            StreamKind::Pareto { min_pause, shape, .. } => {
                (rng.pareto(*shape) * *min_pause).round() as u64
            }
            StreamKind::Expon { mean_pause, .. } => {
                (rng.exponential() * *mean_pause).round() as u64
            }
            StreamKind::Cbr { pause, .. } => *pause,
            StreamKind::Video {
                last_burst, period, ..
            } => period.saturating_sub(*last_burst),
        }
    }

    /// 设定流的目标负载（ON 占空比）。
    pub fn set_load(&mut self, load: f64) {
        let load = clamp_load(load);
        match &mut self.kind {
            StreamKind::Pareto {
                min_burst,
                min_pause,
                ..
            } => {
                *min_pause = *min_burst * (1.0 / load - 1.0);
            }
            StreamKind::Expon {
                mean_burst,
                mean_pause,
            } => {
                *mean_pause = *mean_burst * (1.0 / load - 1.0);
            }
            StreamKind::Cbr { burst, pause } => {
                *pause = (*burst as f64 * (1.0 / load - 1.0)).round() as u64;
            }
            StreamKind::Video {
                min_burst,
                period,
                shape,
                ..
            } => {
                *min_burst = ((1.0 - 1.0 / *shape) * load * *period as f64).round();
            }
        }
    }

    /// 复位：抽一对新的（突发, 间歇），再在 [0, burst+pause) 内均匀
    /// 选一个起点。起点落在 ON 窗口则立刻可发（剩余突发相应缩短）；
    /// 落在 OFF 窗口则重抽突发并顺延到达。这样避免 set_load 之后
    /// 各条流的 OFF 期对齐。
    pub fn reset(&mut self, rng: &mut SimRng) {
        self.burst_size = self.next_burst_size(rng);
        self.arrival = self.next_pause_size(rng).saturating_add(self.burst_size);

        let hi = self.arrival.min(i64::MAX as u64) as i64;
        let start = rng.uniform_int(0, hi) as u64;
        if start < self.burst_size {
            self.burst_size -= start;
            self.arrival = 0;
        } else {
            self.burst_size = self.next_burst_size(rng);
            self.arrival -= start;
        }
    }

    /// 取走当前突发并抽取下一个。到达字节戳越过本突发与后续间歇。
    pub fn extract_burst(&mut self, rng: &mut SimRng) {
        let pause = self.next_pause_size(rng);
        self.arrival = self
            .arrival
            .saturating_add(self.burst_size)
            .saturating_add(pause);
        self.burst_size = self.next_burst_size(rng);
    }
}
