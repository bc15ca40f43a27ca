// Adapters layer: concrete probes and the docker-backed container runtime.

pub mod docker;
pub mod func;
pub mod redis;
pub mod tcp;

pub use self::docker::DockerCli;
pub use self::func::FnProbe;
pub use self::redis::RedisProbe;
pub use self::tcp::TcpProbe;
