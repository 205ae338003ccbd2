//! PON 参数配置
//!
//! 原型里的编译期常量在这里收拢成一个构造期传入的配置值，
//! 默认值对应 1G EPON、16 LLID 的标准场景。

use serde::Deserialize;

use crate::sim::SimTime;

/// PON 配置常量
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PonConfig {
    /// 逻辑链路数（每 ONU 一个 LLID）
    pub num_llid: u16,
    /// ONU 缓冲区（字节）
    pub buffer_size: i64,
    /// 单次授权上限（字节）
    pub max_slot: i64,
    /// OLT 硬件处理时延（ns）
    pub olt_hw_process_delay: i64,
    /// ONU 硬件处理时延（ns）
    pub onu_hw_process_delay: i64,
    /// 相邻时隙之间的保护带（ns）
    pub guard_band_time: i64,
    /// 最短链路距离（米）
    pub min_link_distance: i64,
    /// 最长链路距离（米）
    pub max_link_distance: i64,
    /// 光纤时延（ns / 米）
    pub fiber_delay: i64,
    /// PON 口每字节时间（ns），1 Gbps = 8
    pub pon_byte_time: i64,
    /// 用户口每字节时间（ns），100 Mbps = 80
    pub uni_byte_time: i64,
    /// 每包线路开销：前导 8 + 最小帧间隔 12
    pub packet_overhead: u32,
    pub min_packet_size: u32,
    pub max_packet_size: u32,
    pub mpcp_packet_size: u32,
}

impl Default for PonConfig {
    fn default() -> Self {
        PonConfig {
            num_llid: 16,
            buffer_size: 1024 * 1024,
            max_slot: 15500,
            olt_hw_process_delay: 16384,
            onu_hw_process_delay: 16384,
            guard_band_time: 1000,
            min_link_distance: 500,
            max_link_distance: 20000,
            fiber_delay: 5,
            pon_byte_time: 8,
            uni_byte_time: 80,
            packet_overhead: 8 + 12,
            min_packet_size: 64,
            max_packet_size: 1518,
            mpcp_packet_size: 64,
        }
    }
}

impl PonConfig {
    /// 帧长加上线路开销（字节）
    pub fn overhead(&self, size: u32) -> i64 {
        (size + self.packet_overhead) as i64
    }

    /// 若干字节在 PON 口上占用的时间
    pub fn pon_time(&self, bytes: i64) -> SimTime {
        SimTime(bytes * self.pon_byte_time)
    }

    /// 一个帧（含开销）在 PON 口上占用的时间
    pub fn pon_pckt_time(&self, size: u32) -> SimTime {
        self.pon_time(self.overhead(size))
    }

    pub fn uni_time(&self, bytes: i64) -> SimTime {
        SimTime(bytes * self.uni_byte_time)
    }

    pub fn uni_pckt_time(&self, size: u32) -> SimTime {
        self.uni_time(self.overhead(size))
    }
}
