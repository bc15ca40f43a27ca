use redis_ready::{Probe, ReadinessWaiter, RetryPolicy, TcpProbe};
use std::time::Duration;
use tokio::net::TcpListener;

#[tokio::test]
async fn test_listening_port_is_ready() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let probe = TcpProbe::new("redis", addr, Duration::from_secs(1));

    assert!(probe.check().await.unwrap());
}

#[tokio::test]
async fn test_closed_port_is_transient() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);
    let probe = TcpProbe::new("redis", addr, Duration::from_secs(1));

    let err = probe.check().await.unwrap_err();
    assert!(err.is_transient(), "unexpected error: {:?}", err);
}

#[tokio::test]
async fn test_waiter_sees_port_come_up() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let server = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        let listener = TcpListener::bind(addr).await.unwrap();
        let _ = listener.accept().await;
    });

    let probe = TcpProbe::new("redis", addr.to_string(), Duration::from_millis(500));
    let waiter = ReadinessWaiter::new(RetryPolicy::new(20, Duration::from_millis(100)).unwrap());

    let report = waiter.wait(&probe).await.unwrap();

    assert!(report.attempts >= 2);
    assert_eq!(report.dependency, "redis");
    server.abort();
}
