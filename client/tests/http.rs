use std::time::Duration;

use mockito::{Matcher, Server};
use serde_json::json;

use client::probe::{AvailabilityProbe, HttpProbe};
use client::rpc::{HttpRpc, NodeRpc};
use common::errors::RpcError;
use common::types::{Availability, BlockHeader, BlockTag};

const TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::test]
async fn test_finalized_block_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({
            "jsonrpc": "2.0",
            "id": "dontcare",
            "method": "block",
            "params": { "finality": "final" },
        })))
        .with_header("content-type", "application/json")
        .with_body(r#"{"jsonrpc":"2.0","id":"dontcare","result":{"header":{"height":120,"hash":"9Xb3"}}}"#)
        .create_async()
        .await;

    let rpc = HttpRpc::new(&server.url(), TIMEOUT).unwrap();
    let header = rpc.get_block(BlockTag::Final).await.unwrap();

    assert_eq!(header, BlockHeader::new(120, "9Xb3"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_missing_block_is_sentinel() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({
            "method": "block",
            "params": { "block_id": 121 },
        })))
        .with_body(r#"{"jsonrpc":"2.0","id":"dontcare","error":{"name":"HANDLER_ERROR","cause":{"name":"UNKNOWN_BLOCK"}}}"#)
        .create_async()
        .await;

    let rpc = HttpRpc::new(&server.url(), TIMEOUT).unwrap();
    let header = rpc.get_block_header(121).await.unwrap();

    assert_eq!(header.height, 0);
    assert!(!header.is_produced());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_chunk_author_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({
            "method": "chunk",
            "params": { "block_id": 120, "shard_id": 3 },
        })))
        .with_body(r#"{"jsonrpc":"2.0","id":"dontcare","result":{"author":"node3.testnet","header":{"shard_id":3}}}"#)
        .create_async()
        .await;

    let rpc = HttpRpc::new(&server.url(), TIMEOUT).unwrap();
    let author = rpc.get_chunk_author(120, 3).await.unwrap();

    assert_eq!(author, "node3.testnet");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/")
        .with_status(502)
        .with_body("<html>bad gateway</html>")
        .create_async()
        .await;

    let rpc = HttpRpc::new(&server.url(), TIMEOUT).unwrap();
    let err = rpc.get_block(BlockTag::Final).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<RpcError>(),
        Some(RpcError::Decode { method, .. }) if method == "block"
    ));
}

#[tokio::test]
async fn test_unreachable_node_is_transport_error() {
    let rpc = HttpRpc::new("http://127.0.0.1:1", TIMEOUT).unwrap();
    let err = rpc.get_block_header(5).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<RpcError>(),
        Some(RpcError::Transport { .. })
    ));
}

#[tokio::test]
async fn test_probe_found() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/get")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("prev_hash".into(), "9Xb3".into()),
            Matcher::UrlEncoded("shard_id".into(), "4".into()),
        ]))
        .with_status(200)
        .create_async()
        .await;

    let probe = HttpProbe::new(&format!("{}/get", server.url()), TIMEOUT).unwrap();
    let status = probe.probe("9Xb3", 4).await.unwrap();

    assert_eq!(status, Availability::Found);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_probe_not_found() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/get")
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;

    let probe = HttpProbe::new(&format!("{}/get", server.url()), TIMEOUT).unwrap();
    let status = probe.probe("9Xb3", 1).await.unwrap();

    assert_eq!(status, Availability::NotFound);
}

#[tokio::test]
async fn test_probe_transport_error() {
    let probe = HttpProbe::new("http://127.0.0.1:1/get", TIMEOUT).unwrap();
    let err = probe.probe("9Xb3", 2).await.unwrap_err();

    assert_eq!(err.shard(), 2);
}
