//! End-to-end session tests: a real TCP client against a running node.

use pos_node::{Node, NodeConfig};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout, Instant};

fn test_config() -> NodeConfig {
    NodeConfig {
        listen_addr: "127.0.0.1:0".to_string(),
        round_interval_secs: 1,
        snapshot_interval_secs: 1,
    }
}

#[tokio::test]
async fn register_propose_win_announce() {
    let node = Node::new(test_config());
    let addr = node.start().await.unwrap();

    let stream = TcpStream::connect(addr).await.unwrap();
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    // Stake, then one BPM proposal.
    write_half.write_all(b"3\n").await.unwrap();
    write_half.write_all(b"72\n").await.unwrap();

    // Within a few rounds the winner announcement must come back. Prompts
    // arrive without trailing newlines, so scan whole lines for the marker.
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut announced = false;
    let mut line = String::new();
    while Instant::now() < deadline {
        line.clear();
        match timeout(Duration::from_millis(500), reader.read_line(&mut line)).await {
            Ok(Ok(0)) => break,
            Ok(Ok(_)) => {
                if line.contains("winning validator:") {
                    announced = true;
                    break;
                }
            }
            _ => {}
        }
    }

    assert!(announced, "no winner announcement received");
    assert!(node.chain().len() >= 2, "chain did not grow past genesis");

    let tip = node.chain().tip();
    assert_eq!(tip.bpm, 72);
    assert_eq!(node.registry().len(), 1);
}

#[tokio::test]
async fn malformed_bpm_deregisters_validator() {
    let node = Node::new(test_config());
    let addr = node.start().await.unwrap();

    let stream = TcpStream::connect(addr).await.unwrap();
    let (_read_half, mut write_half) = stream.into_split();

    write_half.write_all(b"5\n").await.unwrap();

    // Wait for registration to land.
    let deadline = Instant::now() + Duration::from_secs(5);
    while node.registry().is_empty() && Instant::now() < deadline {
        sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(node.registry().len(), 1);

    write_half.write_all(b"not-a-number\n").await.unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while !node.registry().is_empty() && Instant::now() < deadline {
        sleep(Duration::from_millis(20)).await;
    }
    assert!(node.registry().is_empty(), "validator was not removed");
}

#[tokio::test]
async fn snapshot_ships_full_chain_as_json() {
    let node = Node::new(test_config());
    let addr = node.start().await.unwrap();

    let stream = TcpStream::connect(addr).await.unwrap();
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    write_half.write_all(b"2\n").await.unwrap();

    // A snapshot line is a JSON array whose first element is genesis.
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut snapshot: Option<serde_json::Value> = None;
    let mut line = String::new();
    while Instant::now() < deadline {
        line.clear();
        match timeout(Duration::from_millis(500), reader.read_line(&mut line)).await {
            Ok(Ok(0)) => break,
            Ok(Ok(_)) => {
                // Prompts may be glued onto the front of the line; the JSON
                // array always starts at the first '['.
                if let Some(start) = line.find('[') {
                    if let Ok(value) = serde_json::from_str(line[start..].trim()) {
                        snapshot = Some(value);
                        break;
                    }
                }
            }
            _ => {}
        }
    }

    let snapshot = snapshot.expect("no chain snapshot received");
    let blocks = snapshot.as_array().expect("snapshot is not an array");
    assert!(!blocks.is_empty());
    assert_eq!(blocks[0]["Index"], 0);
    assert_eq!(blocks[0]["PrevHash"], "");
}
