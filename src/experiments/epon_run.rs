//! EPON 实验驱动
//!
//! 接线：一个 OLT、N 个 ONU、N 条双向链路（每条的传播时延在
//! 构造时均匀抽取一次）、N 个包源；源→ONU→链路↔OLT。
//! 执行：预热后对每个负载点循环，跑到发包数达到上限为止。

use tracing::{error, info};

use crate::epon::{BiDirLink, Olt, Onu, PacketSource, PonConfig};
use crate::sim::{IndexedCdf, ObjectId, SimTime, Simulator};
use crate::traffic::{upstream_size_frequencies, PacketGenerator, Stream, StreamKind};

use super::monitor::Monitor;
use super::results::RunResults;
use super::scenario::{EponScenario, TrafficProfile};

/// EPON 实验：接好线的仿真器加观察者。
pub struct EponExperiment {
    scenario: EponScenario,
    sim: Simulator,
    olt: ObjectId,
    onus: Vec<ObjectId>,
    links: Vec<ObjectId>,
    sources: Vec<ObjectId>,
    monitor: Monitor,
}

fn stream_kind(sc: &EponScenario) -> StreamKind {
    match sc.traffic {
        TrafficProfile::Lrd => StreamKind::pareto(sc.mean_burst_size, sc.pareto_shape),
        TrafficProfile::Srd => StreamKind::expon(sc.mean_burst_size),
        TrafficProfile::Cbr => StreamKind::cbr(sc.mean_burst_size),
        TrafficProfile::Video => StreamKind::video(
            sc.mean_burst_size,
            sc.video_burst_period,
            sc.pareto_shape,
        ),
    }
}

impl EponExperiment {
    /// 创建全部网络元素并接线。
    pub fn build(scenario: EponScenario) -> Self {
        let cfg: PonConfig = scenario.pon;
        let mut sim = Simulator::new(scenario.seed);

        let olt = sim.add_object(|id| Box::new(Olt::new(id, cfg, scenario.policy)));

        let mut onus = Vec::new();
        let mut links = Vec::new();
        let mut sources = Vec::new();

        let size_freq = upstream_size_frequencies(cfg.max_packet_size);

        for n in 0..cfg.num_llid {
            // 到这个 ONU 的传播时延
            let delay = SimTime(
                sim.rng_mut()
                    .uniform_int(cfg.min_link_distance, cfg.max_link_distance)
                    * cfg.fiber_delay,
            );

            let onu = sim.add_object(|id| Box::new(Onu::new(id, cfg)));
            let lnk = sim.add_object(|id| Box::new(BiDirLink::new(id, delay)));

            let mut gen = PacketGenerator::new(
                n as i16,
                cfg.packet_overhead,
                IndexedCdf::from_frequencies(&size_freq),
                sim.rng_mut(),
            );
            let per_stream = scenario.min_load / scenario.burst_pool_size.max(1) as f64;
            for _ in 0..scenario.burst_pool_size {
                let strm = Stream::new(stream_kind(&scenario), per_stream, sim.rng_mut());
                gen.add_stream(strm);
            }
            let src =
                sim.add_object(|id| Box::new(PacketSource::new(id, gen, cfg.uni_byte_time)));

            // 下行：OLT 端口 → 链路 → ONU
            sim.with_object_mut::<Olt, _>(olt, |o, _| o.set_port(lnk, n as usize));
            sim.with_object_mut::<BiDirLink, _>(lnk, |l, _| {
                l.set_port(onu, 0);
                l.set_port(olt, 1);
            });
            // 上行：源 → ONU → 链路 → OLT
            sim.with_object_mut::<Onu, _>(onu, |o, _| o.set_port(lnk));
            sim.with_object_mut::<PacketSource, _>(src, |s, _| s.set_port(onu));

            onus.push(onu);
            links.push(lnk);
            sources.push(src);
        }

        info!(objects = sim.object_count(), "Created simulation objects");

        let monitor = Monitor::new(onus.clone(), scenario.num_test);
        EponExperiment {
            scenario,
            sim,
            olt,
            onus,
            links,
            sources,
            monitor,
        }
    }

    pub fn simulator(&self) -> &Simulator {
        &self.sim
    }

    pub fn olt_id(&self) -> ObjectId {
        self.olt
    }

    pub fn onu_ids(&self) -> &[ObjectId] {
        &self.onus
    }

    pub fn link_ids(&self) -> &[ObjectId] {
        &self.links
    }

    /// 复位引擎与所有对象（OLT 重新发现，包源重新定时）。
    pub fn prepare(&mut self) {
        self.sim.global_reset();
    }

    /// 预热：不经过观察者，跑到预热时刻。
    pub fn warm_up(&mut self) {
        info!("Warming-up ...");
        while self.sim.now() < SimTime(self.scenario.warmup_time) {
            let Some(ev) = self.sim.pop_next_event() else {
                break;
            };
            self.sim.dispatch(ev);
        }
        info!("Warm-up completed");
    }

    /// 给所有包源设第 t 个负载点的目标负载，并切换观察者。
    pub fn apply_load(&mut self, t: usize) {
        let target = self.scenario.target_load(t);
        info!(load = target, "load");
        for &src in &self.sources {
            self.sim
                .with_object_mut::<PacketSource, _>(src, |s, sim| s.set_load(target, sim));
        }
        self.monitor.start_test(t, target);
    }

    /// 经过观察者跑到指定时刻。
    pub fn run_until(&mut self, until: SimTime) {
        while self.sim.now() < until {
            let Some(ev) = self.sim.pop_next_event() else {
                break;
            };
            self.monitor.observe(&self.sim, ev);
            self.sim.dispatch(ev);
        }
    }

    /// 跑完第 t 个负载点：直到发包数达到上限。
    /// 返回 false 表示因协议告警而中止。
    pub fn run_load_point(&mut self, t: usize) -> bool {
        let started = self.sim.now();

        while self.monitor.tests[t].sent_pckt < self.scenario.packet_limit {
            let Some(ev) = self.sim.pop_next_event() else {
                break;
            };
            self.monitor.observe(&self.sim, ev);
            self.sim.dispatch(ev);

            if self.scenario.stop_on_warning && self.sim.warnings().total() > 0 {
                error!("protocol warning raised, aborting run");
                self.monitor.tests[t].run_time = self.sim.now() - started;
                return false;
            }
        }

        self.monitor.tests[t].run_time = self.sim.now() - started;
        true
    }

    pub fn results(&self) -> RunResults {
        RunResults {
            tests: self.monitor.tests.clone(),
            warnings: self.sim.warnings(),
            num_llid: self.scenario.pon.num_llid,
            pon: self.scenario.pon,
        }
    }

    /// 运行整个实验：预热，然后逐负载点测量。
    pub fn execute(&mut self) -> RunResults {
        self.prepare();
        self.warm_up();

        for t in 0..self.scenario.num_test {
            self.apply_load(t);
            if !self.run_load_point(t) {
                break;
            }
        }

        info!("Simulation completed");
        self.results()
    }
}
