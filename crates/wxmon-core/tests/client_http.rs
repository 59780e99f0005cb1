//! End-to-end tests for [`OpenMeteoClient`] against a local HTTP fixture.
//!
//! The fixture is a plain tokio TCP listener that replays a scripted list of
//! responses, one per connection, so tests can observe exactly how many
//! requests the client issues and how many run at once.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use wxmon_core::{Error, OpenMeteoClient, RetryConfig, WeatherSource};

const VALID_BODY: &str = r#"{
    "current": {
        "time": "2026-08-23T14:30",
        "temperature_2m": 27.4,
        "apparent_temperature": 26.1,
        "relative_humidity_2m": 38,
        "weather_code": 1,
        "cloud_cover": 20,
        "pressure_msl": 1014.2,
        "wind_speed_10m": 12.6,
        "wind_direction_10m": 245,
        "wind_gusts_10m": 28.1
    },
    "daily": {
        "time": ["2026-08-23", "2026-08-24", "2026-08-25"],
        "weather_code": [1, 61, 3],
        "temperature_2m_max": [28.0, 22.7, 24.1],
        "temperature_2m_min": [15.3, 14.1, 13.0],
        "precipitation_sum": [0.0, 4.3, 0.2],
        "wind_gusts_10m_max": [33.5, 41.0, 25.9]
    }
}"#;

struct Fixture {
    base_url: String,
    requests: Arc<AtomicUsize>,
}

/// Spawn a one-response-per-connection HTTP server. Each connection gets the
/// next `(status, body)` from the script; the last entry repeats once the
/// script is exhausted. `hold` delays the response after the request is read.
async fn spawn_server(script: Vec<(u16, String)>, hold: Duration) -> Fixture {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&requests);

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let index = counter.fetch_add(1, Ordering::SeqCst);
            let (status, body) = script[index.min(script.len() - 1)].clone();

            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let mut read = 0;
                // Read until the end of the request headers.
                while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf[read..]).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => read += n,
                    }
                }

                tokio::time::sleep(hold).await;

                let reason = if status == 200 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {status} {reason}\r\n\
                     Content-Type: application/json\r\n\
                     Content-Length: {}\r\n\
                     Connection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    Fixture {
        base_url: format!("http://{addr}"),
        requests,
    }
}

fn fast_retry() -> RetryConfig {
    RetryConfig::default().initial_delay(Duration::from_millis(10))
}

#[tokio::test]
async fn test_fetch_success_parses_snapshot() {
    let fixture = spawn_server(vec![(200, VALID_BODY.to_string())], Duration::ZERO).await;
    let client = OpenMeteoClient::with_base_url(&fixture.base_url)
        .unwrap()
        .retry_config(RetryConfig::none());

    let snapshot = client.fetch(&CancellationToken::new()).await.unwrap();

    assert_eq!(fixture.requests.load(Ordering::SeqCst), 1);
    assert_eq!(snapshot.current.unwrap().temperature_c, 27.4);
    assert_eq!(snapshot.daily.len(), 3);
}

#[tokio::test]
async fn test_fetch_retries_server_errors_then_succeeds() {
    let fixture = spawn_server(
        vec![
            (500, "oops".to_string()),
            (503, "oops".to_string()),
            (200, VALID_BODY.to_string()),
        ],
        Duration::ZERO,
    )
    .await;
    let client = OpenMeteoClient::with_base_url(&fixture.base_url)
        .unwrap()
        .retry_config(fast_retry());

    let snapshot = client.fetch(&CancellationToken::new()).await.unwrap();

    assert_eq!(fixture.requests.load(Ordering::SeqCst), 3);
    assert!(snapshot.current.is_some());
}

#[tokio::test]
async fn test_fetch_gives_up_after_retries_exhausted() {
    let fixture = spawn_server(vec![(500, "oops".to_string())], Duration::ZERO).await;
    let client = OpenMeteoClient::with_base_url(&fixture.base_url)
        .unwrap()
        .retry_config(fast_retry());

    let result = client.fetch(&CancellationToken::new()).await;

    assert!(matches!(result, Err(Error::Status { status: 500 })));
    assert_eq!(fixture.requests.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_fetch_does_not_retry_parse_errors() {
    let fixture = spawn_server(vec![(200, "{not-json".to_string())], Duration::ZERO).await;
    let client = OpenMeteoClient::with_base_url(&fixture.base_url)
        .unwrap()
        .retry_config(fast_retry());

    let result = client.fetch(&CancellationToken::new()).await;

    assert!(matches!(result, Err(Error::Parse(_))));
    assert_eq!(fixture.requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_fetches_are_serialized() {
    // Hold each response long enough that overlapping requests would be
    // visible in the request counter before the first one completes.
    let fixture = spawn_server(
        vec![(200, VALID_BODY.to_string())],
        Duration::from_millis(150),
    )
    .await;
    let client = Arc::new(
        OpenMeteoClient::with_base_url(&fixture.base_url)
            .unwrap()
            .retry_config(RetryConfig::none()),
    );

    let cancel = CancellationToken::new();
    let mut tasks = Vec::new();
    for _ in 0..3 {
        let client = Arc::clone(&client);
        let cancel = cancel.clone();
        tasks.push(tokio::spawn(
            async move { client.fetch(&cancel).await },
        ));
    }

    // While the first request is held open, the gate keeps the others queued.
    tokio::time::sleep(Duration::from_millis(75)).await;
    assert_eq!(fixture.requests.load(Ordering::SeqCst), 1);

    for task in tasks {
        assert!(task.await.unwrap().is_ok());
    }
    assert_eq!(fixture.requests.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_fetch_cancelled_while_waiting_for_response() {
    let fixture = spawn_server(
        vec![(200, VALID_BODY.to_string())],
        Duration::from_secs(5),
    )
    .await;
    let client = OpenMeteoClient::with_base_url(&fixture.base_url)
        .unwrap()
        .retry_config(RetryConfig::none());

    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel_clone.cancel();
    });

    let result = client.fetch(&cancel).await;
    assert!(matches!(result, Err(Error::Cancelled)));
}
