//! EPON 仿真命令行
//!
//! 按场景跑一次完整的负载扫描，输出四个 CSV 文件：
//! 告警、配置回显、运行信息、结果表。文件名带启动时间戳。

use std::fs;
use std::path::PathBuf;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use clap::Parser;
use tracing::info;

use epon_rs::experiments::render_conf_csv;
use epon_rs::{EponExperiment, EponScenario, TrafficProfile};
use epon_rs::epon::GrantPolicy;

#[derive(Debug, Parser)]
#[command(name = "epon-sim", about = "EPON/MPCP 上行调度仿真")]
struct Args {
    /// Output file prefix
    prefix: Option<String>,

    /// Path to a scenario JSON file (defaults apply for missing fields)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Override random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override number of LLIDs
    #[arg(long)]
    num_llid: Option<u16>,

    /// Override per-load packet limit
    #[arg(long)]
    packet_limit: Option<u64>,

    /// Override warm-up time in seconds
    #[arg(long)]
    warmup_sec: Option<f64>,

    #[arg(long)]
    min_load: Option<f64>,

    #[arg(long)]
    max_load: Option<f64>,

    #[arg(long)]
    num_test: Option<usize>,

    /// Traffic profile: lrd, srd, cbr or video
    #[arg(long)]
    traffic: Option<String>,

    /// Grant policy: fixed, limited, gated, constant_credit, linear_credit, elastic
    #[arg(long)]
    policy: Option<String>,

    /// Abort the run on the first protocol warning
    #[arg(long)]
    stop_on_warning: bool,

    /// Skip writing output files (results go to stdout)
    #[arg(long)]
    no_files: bool,
}

/// _MMDDYY_HHMMSS，取 UTC
fn timestamp_suffix() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_secs();

    let days = (secs / 86_400) as i64;
    let rem = secs % 86_400;
    let (hh, mm, ss) = (rem / 3600, rem % 3600 / 60, rem % 60);

    // 民用日期换算（Howard Hinnant 的 civil_from_days）
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };

    format!("{m:02}{d:02}{:02}_{hh:02}{mm:02}{ss:02}", y % 100)
}

fn build_scenario(args: &Args) -> EponScenario {
    let mut sc: EponScenario = match &args.scenario {
        Some(path) => {
            let text = fs::read_to_string(path).expect("read scenario file");
            serde_json::from_str(&text).expect("parse scenario JSON")
        }
        None => EponScenario::default(),
    };

    if let Some(v) = args.seed {
        sc.seed = v;
    }
    if let Some(v) = args.num_llid {
        sc.pon.num_llid = v;
    }
    if let Some(v) = args.packet_limit {
        sc.packet_limit = v;
    }
    if let Some(v) = args.warmup_sec {
        sc.warmup_time = (v * 1e9) as i64;
    }
    if let Some(v) = args.min_load {
        sc.min_load = v;
    }
    if let Some(v) = args.max_load {
        sc.max_load = v;
    }
    if let Some(v) = args.num_test {
        sc.num_test = v;
    }
    if let Some(t) = &args.traffic {
        sc.traffic = match t.as_str() {
            "lrd" => TrafficProfile::Lrd,
            "srd" => TrafficProfile::Srd,
            "cbr" => TrafficProfile::Cbr,
            "video" => TrafficProfile::Video,
            other => panic!("unknown traffic profile: {other}"),
        };
    }
    if let Some(p) = &args.policy {
        sc.policy = match p.as_str() {
            "fixed" => GrantPolicy::Fixed,
            "limited" => GrantPolicy::Limited,
            "gated" => GrantPolicy::Gated,
            "constant_credit" => GrantPolicy::ConstantCredit,
            "linear_credit" => GrantPolicy::LinearCredit,
            "elastic" => GrantPolicy::Elastic,
            other => panic!("unknown grant policy: {other}"),
        };
    }
    if args.stop_on_warning {
        sc.stop_on_warning = true;
    }

    sc
}

fn main() {
    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let scenario = build_scenario(&args);

    let stamp = timestamp_suffix();
    let prefix = args.prefix.clone().unwrap_or_default();
    let file_name = |kind: &str| format!("{prefix}_{stamp}_{kind}.csv");

    info!(">>>>> Simulation started");
    let wall_start = Instant::now();

    let conf_csv = render_conf_csv(&scenario);
    let mut experiment = EponExperiment::build(scenario);
    let results = experiment.execute();

    let elapsed = wall_start.elapsed().as_secs();
    info!(elapsed_sec = elapsed, "<<<<< Simulation finished");

    let result_csv = results.render_result_csv();
    let warn_csv = results.render_warning_csv();

    let mut info_lines = String::new();
    info_lines.push_str(">>>>> Simulation started\n");
    for t in &results.tests {
        info_lines.push_str(&format!(
            "load = {}, sim time = {} sec\n",
            t.target_load,
            t.run_time.as_secs_f64()
        ));
    }
    info_lines.push_str(&format!("<<<<< Elapsed time: {elapsed} sec.\n"));

    if args.no_files {
        print!("{result_csv}");
    } else {
        fs::write(file_name("warn"), warn_csv).expect("write warning file");
        fs::write(file_name("conf"), conf_csv).expect("write configuration file");
        fs::write(file_name("info"), info_lines).expect("write info file");
        fs::write(file_name("rslt"), result_csv).expect("write result file");
        info!(prefix = %prefix, stamp = %stamp, "output files written");
    }
}
