use crate::core::Probe;
use crate::utils::error::{ReadyError, Result};
use async_trait::async_trait;
use redis::{ErrorKind, RedisError};
use std::time::Duration;

/// PINGs a Redis server. Opens a fresh client on every check so nothing is
/// carried over between attempts.
#[derive(Debug, Clone)]
pub struct RedisProbe {
    name: String,
    url: String,
    timeout: Duration,
}

impl RedisProbe {
    pub fn new(name: impl Into<String>, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            timeout,
        }
    }

    fn timed_out(&self, stage: &str) -> ReadyError {
        ReadyError::transient(&self.name, format!("{} timed out after {:?}", stage, self.timeout))
    }
}

#[async_trait]
impl Probe for RedisProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> Result<bool> {
        let client = redis::Client::open(self.url.as_str())?;

        let mut conn = tokio::time::timeout(self.timeout, client.get_multiplexed_async_connection())
            .await
            .map_err(|_| self.timed_out("connect"))?
            .map_err(|e| classify(&self.name, e))?;

        let reply: redis::RedisResult<String> =
            tokio::time::timeout(self.timeout, redis::cmd("PING").query_async(&mut conn))
                .await
                .map_err(|_| self.timed_out("PING"))?;

        let reply = reply.map_err(|e| classify(&self.name, e))?;
        tracing::debug!("{} replied {:?} to PING", self.name, reply);
        Ok(reply.eq_ignore_ascii_case("PONG"))
    }
}

/// Connection-level failures and a server still loading its dataset are
/// worth retrying; everything else is a configuration or protocol problem.
pub fn classify(dependency: &str, err: RedisError) -> ReadyError {
    let transient = err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_timeout()
        || err.is_io_error()
        || err.kind() == ErrorKind::BusyLoadingError;

    if transient {
        ReadyError::transient(dependency, err)
    } else {
        ReadyError::Redis(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::{TcpListener, TcpStream};

    async fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    /// Minimal RESP server: answers PING with `ping_reply`, anything else with `+OK`.
    async fn fake_redis(ping_reply: &'static str) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(serve(socket, ping_reply));
            }
        });
        port
    }

    async fn serve(socket: TcpStream, ping_reply: &'static str) {
        let (read, mut write) = socket.into_split();
        let mut reader = BufReader::new(read);
        while let Some(args) = read_command(&mut reader).await {
            let reply = match args.first() {
                Some(cmd) if cmd.eq_ignore_ascii_case("PING") => ping_reply,
                _ => "+OK\r\n",
            };
            if write.write_all(reply.as_bytes()).await.is_err() {
                return;
            }
        }
    }

    async fn read_command<R: AsyncBufReadExt + Unpin>(reader: &mut R) -> Option<Vec<String>> {
        let mut line = String::new();
        if reader.read_line(&mut line).await.ok()? == 0 {
            return None;
        }
        let count: usize = line.trim_end().strip_prefix('*')?.parse().ok()?;
        let mut args = Vec::with_capacity(count);
        for _ in 0..count {
            // `$len` header, then the bulk string itself
            line.clear();
            reader.read_line(&mut line).await.ok()?;
            line.clear();
            reader.read_line(&mut line).await.ok()?;
            args.push(line.trim_end().to_string());
        }
        Some(args)
    }

    #[tokio::test]
    async fn test_pong_reply_is_ready() {
        let port = fake_redis("+PONG\r\n").await;
        let probe = RedisProbe::new(
            "redis",
            format!("redis://127.0.0.1:{}", port),
            Duration::from_secs(2),
        );

        assert!(probe.check().await.unwrap());
    }

    #[tokio::test]
    async fn test_other_reply_is_not_ready() {
        let port = fake_redis("+HELLO\r\n").await;
        let probe = RedisProbe::new(
            "redis",
            format!("redis://127.0.0.1:{}", port),
            Duration::from_secs(2),
        );

        assert!(!probe.check().await.unwrap());
    }

    #[tokio::test]
    async fn test_loading_reply_is_transient() {
        let port = fake_redis("-LOADING Redis is loading the dataset in memory\r\n").await;
        let probe = RedisProbe::new(
            "redis",
            format!("redis://127.0.0.1:{}", port),
            Duration::from_secs(2),
        );

        let err = probe.check().await.unwrap_err();
        assert!(err.is_transient(), "unexpected error: {:?}", err);
    }

    #[tokio::test]
    async fn test_refused_connection_is_transient() {
        let port = closed_port().await;
        let probe = RedisProbe::new(
            "redis",
            format!("redis://127.0.0.1:{}", port),
            Duration::from_secs(2),
        );

        let err = probe.check().await.unwrap_err();
        assert!(err.is_transient(), "unexpected error: {:?}", err);
    }

    #[tokio::test]
    async fn test_invalid_url_is_not_transient() {
        let probe = RedisProbe::new("redis", "http://localhost:6379", Duration::from_secs(1));

        let err = probe.check().await.unwrap_err();
        assert!(!err.is_transient());
        assert!(matches!(err, ReadyError::Redis(_)));
    }

    #[test]
    fn test_classify_keeps_config_errors_terminal() {
        let err = RedisError::from((ErrorKind::InvalidClientConfig, "bad url"));
        assert!(!classify("redis", err).is_transient());

        let err = RedisError::from((ErrorKind::BusyLoadingError, "loading"));
        assert!(classify("redis", err).is_transient());

        let err = RedisError::from(std::io::Error::from(std::io::ErrorKind::ConnectionRefused));
        assert!(classify("redis", err).is_transient());
    }
}
