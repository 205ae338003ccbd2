pub mod sim;
pub mod traffic;
pub mod epon;
pub mod stats;
pub mod experiments;

// 导出 experiments 模块中的公共类型，供 bin 文件使用
pub use experiments::{EponExperiment, EponScenario, RunResults, TrafficProfile};

#[cfg(test)]
mod test;
