//! 仿真核心模块
//!
//! 此模块包含事件驱动仿真的核心组件：仿真时间、事件记录与事件池、
//! 事件队列、本地时钟、随机源以及仿真器本身。

// 子模块声明
mod time;
mod event;
mod queue;
mod object;
mod clock;
mod rng;
mod simulator;

// 重新导出公共接口
pub use time::SimTime;
pub use event::{Event, EventId, EventKind, EventPayload, EventState, GateData, PacketData, ReportData};
pub use queue::EventQueue;
pub use object::{ObjectId, SimObject};
pub use clock::{DriftClock, SyncClock, DRIFT_PERIOD};
pub use rng::{IndexedCdf, SimRng};
pub use simulator::{ProtocolWarning, Simulator, WarningCounters};
