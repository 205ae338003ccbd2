//! 包长分布
//!
//! 上行以太网帧长的经验直方图。实测接入网流量呈三峰形态：
//! 64 字节（ACK/控制帧）、576 附近（历史 MTU 分片）和 1518
//! 字节（满长帧）三个峰，其余长度上有低而平的本底。
//! 频数表按下标即帧长组织，64 以下为零，喂给 `IndexedCdf`。

/// 生成 0..=max_size 的帧长频数表。
pub fn upstream_size_frequencies(max_size: u32) -> Vec<u64> {
    let max = max_size as usize;
    let mut freq = vec![0u64; max + 1];
    if max < 64 {
        return freq;
    }

    // 平坦本底
    for f in freq.iter_mut().take(max + 1).skip(64) {
        *f = 40;
    }

    // 64 字节峰，向上快速衰减
    freq[64] = 360_000;
    for (ndx, f) in freq.iter_mut().enumerate().take((max + 1).min(129)).skip(65) {
        *f += 24_000 / (ndx - 63) as u64;
    }

    // 570..=594 的中间峰
    for f in freq.iter_mut().take((max + 1).min(595)).skip(570.min(max)) {
        *f += 6_000;
    }

    // 满长帧峰
    if max >= 1518 {
        freq[1518] = 180_000;
        for f in freq.iter_mut().take(1518).skip(1400) {
            *f += 800;
        }
    }

    freq
}

/// 单一帧长的退化分布（CBR 与测试用）。
pub fn fixed_size_frequencies(size: u32, max_size: u32) -> Vec<u64> {
    let mut freq = vec![0u64; max_size as usize + 1];
    freq[size as usize] = 1;
    freq
}
