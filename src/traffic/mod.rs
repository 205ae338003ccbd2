//! 合成流量模块
//!
//! 此模块包含 ON/OFF 更新过程流、突发聚合器以及包长分布。
//! 流在"字节戳"时间线上工作（自创建起的字节数），由包源按
//! 端口字节时间换算成 tick。

mod stream;
mod generator;
mod size_dist;

pub use stream::{Stream, StreamKind, MAX_ALPHA, MAX_LOAD, MIN_ALPHA, MIN_LOAD};
pub use generator::{GenPacket, PacketGenerator};
pub use size_dist::{fixed_size_frequencies, upstream_size_frequencies};
