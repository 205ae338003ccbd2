//! 仿真器
//!
//! 事件驱动仿真器：持有事件队列、对象表、随机源与协议告警计数。
//! 原型中的全局静态环境在这里改写为一个显式传递的值。

use tracing::{debug, trace, warn};

use super::event::{Event, EventId, EventKind, EventState};
use super::object::{ObjectId, SimObject};
use super::queue::EventQueue;
use super::rng::SimRng;
use super::time::SimTime;

/// 协议告警：表示被仿真系统的调度/协议异常，而非仿真器错误。
#[derive(Debug, Clone, Copy)]
pub enum ProtocolWarning {
    /// 授权起点已落在本地时间 + 处理时延之前
    LateGrant(ObjectId),
    /// 授权太小，放不下一个 REPORT
    GrantTooSmall(ObjectId),
    /// 上行包到达时间重叠
    Collision(ObjectId),
    /// 对象收到它不认识的事件类型
    UnhandledEvent(ObjectId, EventKind),
}

/// 按类别累计的告警计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarningCounters {
    pub late_grant: u64,
    pub grant_too_small: u64,
    pub collision: u64,
    pub unhandled_event: u64,
}

impl WarningCounters {
    pub fn total(&self) -> u64 {
        self.late_grant + self.grant_too_small + self.collision + self.unhandled_event
    }
}

/// 事件驱动仿真器
pub struct Simulator {
    queue: EventQueue,
    objects: Vec<Option<Box<dyn SimObject>>>,
    rng: SimRng,
    warnings: WarningCounters,
}

impl Default for Simulator {
    fn default() -> Self {
        Simulator::new(0)
    }
}

impl Simulator {
    pub fn new(seed: u64) -> Self {
        Simulator {
            queue: EventQueue::default(),
            objects: Vec::new(),
            rng: SimRng::new(seed),
            warnings: WarningCounters::default(),
        }
    }

    /// 获取当前仿真时间
    pub fn now(&self) -> SimTime {
        self.queue.now()
    }

    pub fn rng_mut(&mut self) -> &mut SimRng {
        &mut self.rng
    }

    pub fn warnings(&self) -> WarningCounters {
        self.warnings
    }

    /// 记录一次协议告警：打日志并计数。
    pub fn warn(&mut self, w: ProtocolWarning) {
        match w {
            ProtocolWarning::LateGrant(id) => {
                warn!(object = id.0, "Late Grant for LLID");
                self.warnings.late_grant += 1;
            }
            ProtocolWarning::GrantTooSmall(id) => {
                warn!(object = id.0, "Grant is too small for Report");
                self.warnings.grant_too_small += 1;
            }
            ProtocolWarning::Collision(id) => {
                warn!(object = id.0, "OLT detected collided packets");
                self.warnings.collision += 1;
            }
            ProtocolWarning::UnhandledEvent(id, kind) => {
                warn!(object = id.0, ?kind, "unhandled event");
                self.warnings.unhandled_event += 1;
            }
        }
    }

    //////////////////////////////////////////////////////////////////
    // 事件队列接口
    //////////////////////////////////////////////////////////////////

    pub fn event(&self, id: EventId) -> &Event {
        self.queue.event(id)
    }

    pub fn event_mut(&mut self, id: EventId) -> &mut Event {
        self.queue.event_mut(id)
    }

    /// 分配一个空白事件（优先复用空闲池）。
    pub fn allocate_event(&mut self) -> EventId {
        self.queue.allocate()
    }

    /// 注册事件：负间隔裁剪为 0；间隔 0 走栈顶栈。
    pub fn register_event(&mut self, id: EventId, interval: SimTime, producer: Option<ObjectId>) {
        self.queue.register(id, interval, producer);
    }

    /// 取消事件：清空消费者，事件仍占一个分发槽但变为空操作。
    pub fn cancel_event(&mut self, id: EventId) {
        self.queue.cancel(id);
    }

    pub fn destroy_event(&mut self, id: EventId) {
        self.queue.destroy(id);
    }

    /// 弹出下一个事件并推进系统时间。
    pub fn pop_next_event(&mut self) -> Option<EventId> {
        self.queue.pop()
    }

    pub fn pending_events(&self) -> usize {
        self.queue.pending()
    }

    pub fn pooled_events(&self) -> usize {
        self.queue.pooled()
    }

    /// 分发事件。
    ///
    /// 消费者为空（已取消）则跳过处理。处理函数重新注册即视为消费；
    /// 否则由这里回收进空闲池。
    pub fn dispatch(&mut self, id: EventId) {
        let consumer = self.queue.event(id).consumer;
        if let Some(cid) = consumer {
            trace!(event = id.0, consumer = cid.0, now = ?self.now(), "分发事件");
            // 暂时把对象取出来，避免 &mut self 与 &mut object 的重叠借用
            let mut obj = self.objects[cid.0].take().expect("consumer exists");
            obj.on_event(id, self);
            self.objects[cid.0] = Some(obj);
        }
        if self.queue.event(id).state() == EventState::Detached {
            self.queue.destroy(id);
        }
    }

    //////////////////////////////////////////////////////////////////
    // 对象表
    //////////////////////////////////////////////////////////////////

    /// 登记一个新对象；构造函数在闭包里拿到分配的对象句柄。
    pub fn add_object<F>(&mut self, build: F) -> ObjectId
    where
        F: FnOnce(ObjectId) -> Box<dyn SimObject>,
    {
        let id = ObjectId(self.objects.len());
        self.objects.push(Some(build(id)));
        id
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn object_as<T: SimObject>(&self, id: ObjectId) -> Option<&T> {
        self.objects[id.0]
            .as_deref()
            .and_then(|o| o.as_any().downcast_ref::<T>())
    }

    /// 对某个对象执行一段需要同时访问仿真器的操作。
    pub fn with_object_mut<T: SimObject, R>(
        &mut self,
        id: ObjectId,
        f: impl FnOnce(&mut T, &mut Simulator) -> R,
    ) -> R {
        let mut obj = self.objects[id.0].take().expect("object exists");
        let r = f(
            obj.as_any_mut().downcast_mut::<T>().expect("object type"),
            self,
        );
        self.objects[id.0] = Some(obj);
        r
    }

    //////////////////////////////////////////////////////////////////
    // 全局复位与释放
    //////////////////////////////////////////////////////////////////

    /// 清空事件队列、时间归零，然后复位所有登记对象。
    pub fn global_reset(&mut self) {
        debug!(pending = self.queue.pending(), "全局复位");
        self.queue.reset();
        for ndx in 0..self.objects.len() {
            let mut obj = self.objects[ndx].take().expect("object exists");
            obj.reset(self);
            self.objects[ndx] = Some(obj);
        }
    }

    /// 释放所有事件记录（对象的资源由 Drop 负责）。
    pub fn global_free(&mut self) {
        self.queue.free_all();
    }
}
