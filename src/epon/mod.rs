//! EPON 网络元素
//!
//! 此模块包含 PON 参数配置、链路、包源、ONU 与 OLT。

mod config;
mod link;
mod source;
mod onu;
mod olt;

pub use config::PonConfig;
pub use link::{BiDirLink, JitterFn, JitterLink, LosslessLink, LossyLink};
pub use source::PacketSource;
pub use onu::Onu;
pub use olt::{GrantPolicy, Olt};
