//! 事件队列
//!
//! 按激活时间排序的事件队列。三个部分：
//! - arena + 空闲栈：事件记录的分配与回收；
//! - 有序堆：未来事件，按 (激活时间, 序号) 排序；
//! - 栈顶栈：间隔为 0 的即时事件，LIFO，先于有序堆弹出，
//!   保证响应链（入队→出队→到达）的直观顺序。

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::event::{Event, EventId, EventState};
use super::time::SimTime;

/// 堆内条目：时间相同按序号先进先出。
struct QueuedEntry {
    at: SimTime,
    seq: u64,
    ev: EventId,
}

// BinaryHeap 是 max-heap；我们需要最小时间优先，因此反向比较。
impl Ord for QueuedEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.at.cmp(&other.at) {
            Ordering::Equal => self.seq.cmp(&other.seq),
            ord => ord,
        }
        .reverse()
    }
}

impl PartialOrd for QueuedEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedEntry {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for QueuedEntry {}

/// 事件队列
#[derive(Default)]
pub struct EventQueue {
    now: SimTime,
    next_seq: u64,
    arena: Vec<Event>,
    free: Vec<EventId>,
    heap: BinaryHeap<QueuedEntry>,
    top: Vec<EventId>,
}

impl EventQueue {
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// 等待分发的事件数（有序堆 + 栈顶栈）
    pub fn pending(&self) -> usize {
        self.heap.len() + self.top.len()
    }

    /// 空闲池中的事件数
    pub fn pooled(&self) -> usize {
        self.free.len()
    }

    /// 历史上分配过的事件记录总数
    pub fn allocated(&self) -> usize {
        self.arena.len()
    }

    pub fn event(&self, id: EventId) -> &Event {
        &self.arena[id.0]
    }

    pub fn event_mut(&mut self, id: EventId) -> &mut Event {
        &mut self.arena[id.0]
    }

    /// 取一个空闲事件；池空时向 arena 追加新记录。
    /// 返回的事件已清零，处于 Detached 状态。
    pub fn allocate(&mut self) -> EventId {
        match self.free.pop() {
            Some(id) => {
                self.arena[id.0].recycle();
                id
            }
            None => {
                let id = EventId(self.arena.len());
                self.arena.push(Event::blank());
                id
            }
        }
    }

    /// 注册事件：赋激活时间并入队。
    ///
    /// 负间隔被裁剪为 0（不允许时间倒流）。间隔为 0 进栈顶栈，
    /// 否则进有序堆。对非 Detached 事件的重复注册被静默忽略。
    pub fn register(&mut self, id: EventId, interval: SimTime, producer: Option<super::object::ObjectId>) {
        let now = self.now;
        let ev = &mut self.arena[id.0];
        if ev.state != EventState::Detached {
            return;
        }
        let interval = interval.max(SimTime::ZERO);
        ev.producer = producer;
        ev.at = now + interval;
        ev.state = EventState::Queued;
        if interval == SimTime::ZERO {
            self.top.push(id);
        } else {
            let seq = self.next_seq;
            self.next_seq = self.next_seq.wrapping_add(1);
            self.heap.push(QueuedEntry { at: ev.at, seq, ev: id });
        }
    }

    /// 取消事件：只清空消费者，不出队。
    pub fn cancel(&mut self, id: EventId) {
        self.arena[id.0].consumer = None;
    }

    /// 将 Detached 事件归还空闲池。
    pub fn destroy(&mut self, id: EventId) {
        let ev = &mut self.arena[id.0];
        if ev.state == EventState::Detached {
            ev.state = EventState::Pooled;
            self.free.push(id);
        }
    }

    /// 弹出下一个事件并推进系统时间。栈顶栈优先（LIFO）。
    pub fn pop(&mut self) -> Option<EventId> {
        let id = match self.top.pop() {
            Some(id) => id,
            None => self.heap.pop()?.ev,
        };
        let ev = &mut self.arena[id.0];
        self.now = ev.at;
        ev.state = EventState::Detached;
        Some(id)
    }

    /// 清空队列：所有事件迭代回收进空闲池，时间归零。
    pub fn reset(&mut self) {
        self.now = SimTime::ZERO;
        // 迭代回收，避免深度退化结构上的递归遍历
        while let Some(entry) = self.heap.pop() {
            let ev = &mut self.arena[entry.ev.0];
            ev.state = EventState::Pooled;
            self.free.push(entry.ev);
        }
        while let Some(id) = self.top.pop() {
            let ev = &mut self.arena[id.0];
            ev.state = EventState::Pooled;
            self.free.push(id);
        }
    }

    /// 释放全部事件记录。
    pub fn free_all(&mut self) {
        self.reset();
        self.free.clear();
        self.arena.clear();
        self.next_seq = 0;
    }
}
