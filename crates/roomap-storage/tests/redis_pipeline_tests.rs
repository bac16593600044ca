//! Redis backend tests against a scripted RESP listener.
//!
//! The listener speaks just enough RESP2 to answer the commands the store
//! sends, so the real `RedisRoomStore` client path runs without a server.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use roomap_storage::{RedisConfig, RedisRoomStore, RoomStore, StorageError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

/// Reply sent for a given HGETALL key.
#[derive(Clone)]
enum HashReply {
    Fields(Vec<(&'static str, &'static str)>),
    Error(&'static str),
}

fn bulk(value: &str) -> String {
    format!("${}\r\n{}\r\n", value.len(), value)
}

fn encode_reply(command: &[String], hashes: &HashMap<String, HashReply>) -> String {
    let name = command.first().map(|c| c.to_ascii_uppercase()).unwrap_or_default();
    match name.as_str() {
        "PING" => "+PONG\r\n".to_string(),
        "INFO" => bulk("# Server\r\nredis_version:7.2.0"),
        "HGETALL" => match command.get(1).and_then(|key| hashes.get(key)) {
            Some(HashReply::Fields(fields)) => {
                let mut reply = format!("*{}\r\n", fields.len() * 2);
                for (field, value) in fields {
                    reply.push_str(&bulk(field));
                    reply.push_str(&bulk(value));
                }
                reply
            }
            Some(HashReply::Error(message)) => format!("-{message}\r\n"),
            None => "*0\r\n".to_string(),
        },
        _ => "+OK\r\n".to_string(),
    }
}

async fn read_command<R>(reader: &mut R) -> std::io::Result<Option<Vec<String>>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    let count: usize = line
        .trim_end()
        .strip_prefix('*')
        .and_then(|n| n.parse().ok())
        .unwrap_or(0);

    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        line.clear();
        reader.read_line(&mut line).await?;
        let len: usize = line
            .trim_end()
            .strip_prefix('$')
            .and_then(|n| n.parse().ok())
            .unwrap_or(0);
        let mut buf = vec![0u8; len + 2];
        reader.read_exact(&mut buf).await?;
        buf.truncate(len);
        args.push(String::from_utf8_lossy(&buf).into_owned());
    }
    Ok(Some(args))
}

/// Starts a listener answering from `hashes`; returns its address.
async fn spawn_fake_redis(hashes: HashMap<String, HashReply>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let hashes = hashes.clone();
            tokio::spawn(async move {
                let (read, mut write) = socket.into_split();
                let mut reader = BufReader::new(read);
                while let Ok(Some(command)) = read_command(&mut reader).await {
                    let reply = encode_reply(&command, &hashes);
                    if write.write_all(reply.as_bytes()).await.is_err() {
                        break;
                    }
                }
            });
        }
    });

    addr
}

async fn connect(addr: SocketAddr) -> RedisRoomStore {
    let config = RedisConfig {
        addrs: vec![addr.to_string()],
        connect_timeout: Duration::from_secs(2),
        response_timeout: Duration::from_secs(2),
        ..Default::default()
    };
    RedisRoomStore::from_config(&config).await.unwrap()
}

fn hotel_42_and_broken() -> HashMap<String, HashReply> {
    HashMap::from([
        (
            "room_map:{42}".to_string(),
            HashReply::Fields(vec![("Ocean View", r#"{"id":5}"#)]),
        ),
        (
            "room_map:{bad}".to_string(),
            HashReply::Error("WRONGTYPE Operation against a key holding the wrong kind of value"),
        ),
    ])
}

#[tokio::test]
async fn test_pipeline_error_reply_is_isolated_to_its_key() {
    let addr = spawn_fake_redis(hotel_42_and_broken()).await;
    let store = connect(addr).await;

    let keys: Vec<String> = ["room_map:{42}", "room_map:{#42}", "room_map:{bad}", "room_map:{#bad}"]
        .iter()
        .map(|k| k.to_string())
        .collect();
    let response = store.pipelined_hash_get_all(&keys).await;

    assert_eq!(response.results.len(), 4);

    let fields = response.results[0].as_ref().unwrap();
    assert_eq!(fields["Ocean View"], r#"{"id":5}"#);

    assert!(response.results[1].as_ref().unwrap_err().is_not_found());

    let err = response.results[2].as_ref().unwrap_err();
    assert!(matches!(err, StorageError::QueryError { .. }));
    assert!(err.to_string().contains("WRONGTYPE"));

    assert!(response.results[3].as_ref().unwrap_err().is_not_found());

    // The failing key is still surfaced at batch level.
    assert!(matches!(
        response.batch_error,
        Some(StorageError::QueryError { .. })
    ));
}

#[tokio::test]
async fn test_pipeline_of_absent_keys_has_no_batch_error() {
    let addr = spawn_fake_redis(HashMap::new()).await;
    let store = connect(addr).await;

    let keys = vec!["room_map:{1}".to_string(), "room_map:{#1}".to_string()];
    let response = store.pipelined_hash_get_all(&keys).await;

    assert!(response.results.iter().all(|r| r
        .as_ref()
        .is_err_and(StorageError::is_not_found)));
    assert!(response.batch_error.is_none());
}

#[tokio::test]
async fn test_single_read_and_health_against_listener() {
    let addr = spawn_fake_redis(hotel_42_and_broken()).await;
    let store = connect(addr).await;

    let fields = store.hash_get_all("room_map:{42}").await.unwrap();
    assert_eq!(fields.len(), 1);

    let err = store.hash_get_all("room_map:{bad}").await.unwrap_err();
    assert!(matches!(err, StorageError::QueryError { .. }));

    let status = store.health_check().await.unwrap();
    assert!(status.healthy);
    assert_eq!(store.backend_name(), "redis");
}
