//! 仿真实验
//!
//! 此模块负责把网络元素接成一棵 EPON、按负载点驱动仿真循环、
//! 通过观察者采集统计并渲染结果表。

mod scenario;
mod monitor;
mod results;
mod epon_run;

pub use scenario::{EponScenario, TrafficProfile};
pub use monitor::{Monitor, TestCounters};
pub use results::{render_conf_csv, RunResults};
pub use epon_run::EponExperiment;
