//! 仿真对象接口
//!
//! 所有网络元素（ONU、OLT、链路、包源）都实现 `SimObject`，
//! 并登记在仿真器的对象表中，由仿真器统一分发事件、统一复位。

use std::any::Any;

use super::event::EventId;
use super::simulator::Simulator;

/// 对象句柄：仿真器对象表中的下标。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub usize);

/// 仿真对象接口
pub trait SimObject: Any {
    /// 处理分发到本对象的事件。
    ///
    /// 约定：处理函数要么重新注册该事件，要么不管它（由分发器回收）；
    /// 返回之后不得继续持有事件句柄。
    fn on_event(&mut self, ev: EventId, sim: &mut Simulator);

    /// 复位到初始状态（每个负载点开始时调用）。
    fn reset(&mut self, sim: &mut Simulator);

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
