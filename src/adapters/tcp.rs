use crate::core::Probe;
use crate::utils::error::{ReadyError, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::time::Duration;
use tokio::net::TcpStream;

/// Ready as soon as `addr` accepts a TCP connection.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    name: String,
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(name: impl Into<String>, addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            name: name.into(),
            addr: addr.into(),
            timeout,
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}

#[async_trait]
impl Probe for TcpProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> Result<bool> {
        match tokio::time::timeout(self.timeout, TcpStream::connect(&self.addr)).await {
            Err(_) => Err(ReadyError::transient(
                &self.name,
                format!("connect to {} timed out after {:?}", self.addr, self.timeout),
            )),
            Ok(Ok(_stream)) => Ok(true),
            Ok(Err(e)) if is_transient_io(e.kind()) => {
                Err(ReadyError::transient(&self.name, format!("{}: {}", self.addr, e)))
            }
            Ok(Err(e)) => Err(ReadyError::IoError(e)),
        }
    }
}

fn is_transient_io(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::TimedOut
            | ErrorKind::NotConnected
            | ErrorKind::AddrNotAvailable
    )
}
