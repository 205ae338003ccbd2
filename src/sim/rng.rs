//! 随机源
//!
//! 可复现的种子化随机源与按下标采样的 CDF 分布。随机源由仿真器
//! 持有并显式传递，同一种子下多次运行产生完全相同的轨迹。

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp1, Pareto};

/// 仿真随机源
#[derive(Debug, Clone)]
pub struct SimRng {
    rng: SmallRng,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// [0, 1)
    pub fn uniform(&mut self) -> f64 {
        self.rng.random()
    }

    /// [0, 1]
    pub fn uniform_incl(&mut self) -> f64 {
        self.rng.random_range(0.0..=1.0)
    }

    /// [lo, hi]，闭区间
    pub fn uniform_int(&mut self, lo: i64, hi: i64) -> i64 {
        self.rng.random_range(lo..=hi)
    }

    /// 单位指数分布：-ln(U)，U ∈ (0, 1]
    pub fn exponential(&mut self) -> f64 {
        Exp1.sample(&mut self.rng)
    }

    /// 单位尺度 Pareto：U^(-1/shape)
    pub fn pareto(&mut self, shape: f64) -> f64 {
        Pareto::new(1.0, shape)
            .expect("pareto shape clamped positive")
            .sample(&mut self.rng)
    }
}

/// 按下标采样的离散分布。
///
/// 构造时一次性累加出整型 CDF；采样对 U·cdf[N-1] 做二分查找，
/// 返回第一个 CDF 严格大于样本值的下标。
#[derive(Debug, Clone)]
pub struct IndexedCdf {
    cdf: Vec<u64>,
}

impl IndexedCdf {
    pub fn from_frequencies(freq: &[u64]) -> Self {
        let mut cdf = Vec::with_capacity(freq.len());
        let mut acc = 0u64;
        for &f in freq {
            acc += f;
            cdf.push(acc);
        }
        IndexedCdf { cdf }
    }

    pub fn len(&self) -> usize {
        self.cdf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cdf.is_empty()
    }

    pub fn sample(&self, rng: &mut SimRng) -> usize {
        let total = *self.cdf.last().expect("non-empty distribution");
        let val = (rng.uniform_incl() * total as f64) as u64;
        let idx = self.cdf.partition_point(|&c| c <= val);
        idx.min(self.cdf.len() - 1)
    }
}
