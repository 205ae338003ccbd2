//! 突发聚合器
//!
//! 把一组 ON/OFF 流聚合成单一的包序列。流按下一次到达的字节戳
//! 存放在有序池里；取包时不断从最早的流吸收突发字节（令牌），
//! 直到够下一个包为止。

use std::collections::BTreeMap;
use std::mem;

use crate::sim::{IndexedCdf, SimRng};

use super::stream::Stream;

/// 聚合器产出的一个包：长度与距上一个包的间隔（均以字节计）。
#[derive(Debug, Clone, Copy, Default)]
pub struct GenPacket {
    pub source_id: i16,
    pub size: u32,
    /// 距上一个包首字节的间隔（字节戳差，≥ size + min_ifg）
    pub interval: u64,
}

type StreamPool = BTreeMap<(u64, u32), Stream>;

/// 包生成器（聚合器）
pub struct PacketGenerator {
    /// 在班流：按 (到达字节戳, 流序号) 排序
    busy: StreamPool,
    /// 复位时的过渡池，避免原地改键
    idle: StreamPool,
    next_packet: GenPacket,
    /// 自上次复位起流过的字节戳
    elapsed: u64,
    min_ifg: u32,
    tokens: u64,
    next_slot: u32,
    size_dist: IndexedCdf,
    source_id: i16,
}

impl PacketGenerator {
    pub fn new(source_id: i16, min_ifg: u32, size_dist: IndexedCdf, rng: &mut SimRng) -> Self {
        let first_size = size_dist.sample(rng) as u32;
        PacketGenerator {
            busy: BTreeMap::new(),
            idle: BTreeMap::new(),
            next_packet: GenPacket {
                source_id,
                size: first_size,
                interval: (first_size + min_ifg) as u64,
            },
            elapsed: 0,
            min_ifg,
            tokens: 0,
            next_slot: 0,
            size_dist,
            source_id,
        }
    }

    pub fn stream_count(&self) -> usize {
        self.busy.len()
    }

    pub fn tokens(&self) -> u64 {
        self.tokens
    }

    pub fn add_stream(&mut self, mut stream: Stream) {
        stream.slot = self.next_slot;
        self.next_slot += 1;
        self.busy
            .insert((stream.arrival_bytestamp(), stream.slot), stream);
    }

    /// 预读下一个将要产出的包。
    pub fn peek_next_packet(&self) -> GenPacket {
        self.next_packet
    }

    /// 取出聚合流量中的下一个包。
    ///
    /// 返回上一次预计算好的包；本次调用把游标推进到新包的末字节，
    /// 并把新包缓存起来供下一次返回。
    pub fn next_packet(&mut self, rng: &mut SimRng) -> GenPacket {
        let pending = self.next_packet;
        let pckt_size = self.size_dist.sample(rng) as u32;
        let mut pckt_time = self.elapsed;

        // 剩余令牌不够一个包时，从最早的流继续吸收突发
        while self.tokens < pckt_size as u64 {
            let Some(((_, _), mut strm)) = self.busy.pop_first() else {
                break;
            };
            if strm.arrival_bytestamp() > pckt_time.saturating_add(self.tokens) {
                pckt_time = strm.arrival_bytestamp() - self.tokens;
            }
            self.tokens += strm.burst_size();
            strm.extract_burst(rng);
            self.busy
                .insert((strm.arrival_bytestamp(), strm.slot), strm);
        }

        self.tokens = self.tokens.saturating_sub(pckt_size as u64);
        // 游标指向该包的最后一个字节（含最小帧间隔）
        pckt_time += (pckt_size + self.min_ifg) as u64;

        self.next_packet = GenPacket {
            source_id: self.source_id,
            size: pckt_size,
            interval: pckt_time - self.elapsed,
        };
        self.elapsed = pckt_time;

        pending
    }

    /// 只改负载不复位：低负载下新负载要等在途的长 OFF 期结束才生效。
    pub fn set_load(&mut self, load: f64) {
        let n = self.busy.len().max(1) as f64;
        for strm in self.busy.values_mut() {
            strm.set_load(load / n);
        }
    }

    /// 改负载并复位每条流（经由过渡池重建键序），游标归零。
    pub fn set_load_reset(&mut self, load: f64, rng: &mut SimRng) {
        let per_stream = load / self.busy.len().max(1) as f64;
        while let Some((_, mut strm)) = self.busy.pop_first() {
            strm.set_load(per_stream);
            strm.reset(rng);
            self.idle.insert((strm.arrival_bytestamp(), strm.slot), strm);
        }
        mem::swap(&mut self.busy, &mut self.idle);
        self.elapsed = 0;
    }

    /// 复位所有流与游标（负载不变）。
    pub fn reset(&mut self, rng: &mut SimRng) {
        while let Some((_, mut strm)) = self.busy.pop_first() {
            strm.reset(rng);
            self.idle.insert((strm.arrival_bytestamp(), strm.slot), strm);
        }
        mem::swap(&mut self.busy, &mut self.idle);
        self.elapsed = 0;
    }
}
