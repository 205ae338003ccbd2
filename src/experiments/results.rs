//! 结果表
//!
//! 每个指标一行：第一列指标名，第二列留空，之后每个负载点一列。

use std::fmt::Write;

use crate::epon::PonConfig;
use crate::sim::WarningCounters;

use super::monitor::TestCounters;
use super::scenario::EponScenario;

/// 一次完整运行的结果
#[derive(Debug, Clone)]
pub struct RunResults {
    pub tests: Vec<TestCounters>,
    pub warnings: WarningCounters,
    pub num_llid: u16,
    pub pon: PonConfig,
}

fn ratio(num: f64, den: f64) -> f64 {
    if den != 0.0 {
        num / den
    } else {
        0.0
    }
}

impl RunResults {
    /// 渲染结果 CSV。
    pub fn render_result_csv(&self) -> String {
        let mut out = String::new();
        let n = self.num_llid as f64;
        let pon_bt = self.pon.pon_byte_time as f64;
        let uni_bt = self.pon.uni_byte_time as f64;

        let mut row = |label: &str, value: &dyn Fn(&TestCounters) -> String| {
            let _ = write!(out, "{label},");
            for t in &self.tests {
                let _ = write!(out, ",{}", value(t));
            }
            let _ = writeln!(out);
        };

        row("TARGET_LOAD", &|t| format!("{}", t.target_load));
        row("SIM_TIME(sec)", &|t| format!("{}", t.run_time.as_secs_f64()));
        row("ONU_LOAD", &|t| {
            format!("{}", ratio(t.recv_byte as f64 * uni_bt, t.run_time.0 as f64) / n)
        });
        row("OFFERED_LOAD", &|t| {
            format!("{}", ratio(t.recv_byte as f64 * pon_bt, t.run_time.0 as f64))
        });
        row("CARRIED_LOAD", &|t| {
            format!("{}", ratio(t.sent_byte as f64 * pon_bt, t.run_time.0 as f64))
        });
        row("AVG_DLY(ms)", &|t| format!("{}", t.dly.avg()));
        row("MAX_DLY(ms)", &|t| format!("{}", t.dly.max()));
        row("AVG_QUEUE(bytes)", &|t| format!("{}", t.que.avg() / n));
        row("RECV_PACKETS", &|t| format!("{}", t.recv_pckt));
        row("SENT_PACKETS", &|t| format!("{}", t.sent_pckt));
        row("DROP_PACKETS", &|t| format!("{}", t.drop_pckt));
        row("RECV_BYTES", &|t| format!("{}", t.recv_byte));
        row("SENT_BYTES", &|t| format!("{}", t.sent_byte));
        row("DROP_BYTES", &|t| format!("{}", t.drop_byte));
        row("PACKET_LOSS_RATIO", &|t| {
            format!("{}", ratio(t.drop_pckt as f64, t.recv_pckt as f64))
        });
        row("BYTE_LOSS_RATIO", &|t| {
            format!("{}", ratio(t.drop_byte as f64, t.recv_byte as f64))
        });
        row("AVG_CYCLE(ms)", &|t| format!("{}", t.cyc.avg()));
        row("MAX_CYCLE(ms)", &|t| format!("{}", t.cyc.max()));
        row("CYCLES", &|t| format!("{}", t.cyc.count()));
        row("SCHD_PACKETS", &|t| format!("{}", t.schd_pckt));
        row("SCHD_BYTES", &|t| format!("{}", t.schd_byte));

        out
    }

    /// 渲染告警 CSV（按类别计数）。
    pub fn render_warning_csv(&self) -> String {
        let w = self.warnings;
        format!(
            "Late Grants,{}\nGrants Too Small,{}\nCollisions,{}\nUnhandled Events,{}\n",
            w.late_grant, w.grant_too_small, w.collision, w.unhandled_event
        )
    }
}

/// 渲染配置回显 CSV。
pub fn render_conf_csv(sc: &EponScenario) -> String {
    let p = &sc.pon;
    let mut out = String::new();
    let _ = writeln!(out, "Packet Limit,{}", sc.packet_limit);
    let _ = writeln!(out, "Warm-up time (seconds),{}", sc.warmup_time as f64 / 1e9);
    let _ = writeln!(out, "Minimum Load,{}", sc.min_load);
    let _ = writeln!(out, "Maximum Load,{}", sc.max_load);
    let _ = writeln!(out, "Number of Tests,{}", sc.num_test);
    let _ = writeln!(out, "Random Seed,{}", sc.seed);
    let _ = writeln!(out, "-----------------------------");
    let _ = writeln!(out, "Traffic Type,{}", sc.traffic.descriptor());
    let _ = writeln!(out, "Burst Pool Size,{}", sc.burst_pool_size);
    let _ = writeln!(out, "Mean Burst Size (bytes),{}", sc.mean_burst_size);
    let _ = writeln!(out, "Grant Policy,{:?}", sc.policy);
    let _ = writeln!(out, "-----------------------------");
    let _ = writeln!(out, "OLT HW Delay (ns),{}", p.olt_hw_process_delay);
    let _ = writeln!(out, "ONU HW Delay (ns),{}", p.onu_hw_process_delay);
    let _ = writeln!(out, "Guard Band Time (ns),{}", p.guard_band_time);
    let _ = writeln!(out, "-----------------------------");
    let _ = writeln!(out, "Number of LLIDs,{}", p.num_llid);
    let _ = writeln!(out, "ONU Buffer Size (bytes),{}", p.buffer_size);
    let _ = writeln!(out, "Maximum Slot (bytes),{}", p.max_slot);
    let _ = writeln!(out, "Minimum Link Distance (m),{}", p.min_link_distance);
    let _ = writeln!(out, "Maximum Link Distance (m),{}", p.max_link_distance);
    out
}
