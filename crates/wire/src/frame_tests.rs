// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::envelope::Message;
use gaffer_core::{Credentials, Task};

#[tokio::test]
async fn roundtrip_through_duplex_stream() {
    let (mut client, mut server) = tokio::io::duplex(4096);

    let sent = Envelope::with_token(
        Message::SubmitTask { task: Task::new("task-aaa", "cliente1", "x") },
        "tok-123",
        7,
    );
    write_envelope(&mut client, &sent).await.unwrap();

    let received = read_envelope(&mut server).await.unwrap();
    assert_eq!(received, sent);
}

#[tokio::test]
async fn several_frames_are_read_in_order() {
    let (mut client, mut server) = tokio::io::duplex(4096);

    for lamport in 1..=3u64 {
        let env = Envelope::new(Message::Heartbeat { worker_id: "w1".into() }, lamport);
        write_envelope(&mut client, &env).await.unwrap();
    }

    for lamport in 1..=3u64 {
        let env = read_envelope(&mut server).await.unwrap();
        assert_eq!(env.lamport, lamport);
    }
}

#[tokio::test]
async fn closed_stream_reports_connection_closed() {
    let (client, mut server) = tokio::io::duplex(4096);
    drop(client);

    let err = read_envelope(&mut server).await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}

#[tokio::test]
async fn mid_frame_close_reports_connection_closed() {
    let (mut client, mut server) = tokio::io::duplex(4096);

    // Length prefix promising more bytes than will ever arrive
    tokio::io::AsyncWriteExt::write_all(&mut client, &100u32.to_be_bytes()).await.unwrap();
    tokio::io::AsyncWriteExt::write_all(&mut client, b"partial").await.unwrap();
    drop(client);

    let err = read_envelope(&mut server).await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}

#[tokio::test]
async fn oversized_length_prefix_is_rejected() {
    let (mut client, mut server) = tokio::io::duplex(4096);

    let len = MAX_FRAME_BYTES + 1;
    tokio::io::AsyncWriteExt::write_all(&mut client, &len.to_be_bytes()).await.unwrap();

    let err = read_envelope(&mut server).await.unwrap_err();
    assert!(matches!(err, ProtocolError::FrameTooLarge(n) if n == len));
}

#[tokio::test]
async fn garbage_payload_is_malformed() {
    let (mut client, mut server) = tokio::io::duplex(4096);

    let garbage = b"not json at all";
    tokio::io::AsyncWriteExt::write_all(&mut client, &(garbage.len() as u32).to_be_bytes())
        .await
        .unwrap();
    tokio::io::AsyncWriteExt::write_all(&mut client, garbage).await.unwrap();

    let err = read_envelope(&mut server).await.unwrap_err();
    assert!(matches!(err, ProtocolError::Malformed(_)));
}

#[tokio::test]
async fn token_is_omitted_from_the_wire_when_absent() {
    let (mut client, mut server) = tokio::io::duplex(4096);

    let env = Envelope::new(
        Message::Authenticate(Credentials::new("cliente1", "senha123")),
        1,
    );
    write_envelope(&mut client, &env).await.unwrap();

    let mut len_buf = [0u8; 4];
    tokio::io::AsyncReadExt::read_exact(&mut server, &mut len_buf).await.unwrap();
    let mut payload = vec![0u8; u32::from_be_bytes(len_buf) as usize];
    tokio::io::AsyncReadExt::read_exact(&mut server, &mut payload).await.unwrap();

    let text = String::from_utf8(payload).unwrap();
    assert!(text.contains("\"kind\":\"AUTHENTICATE\""));
    assert!(!text.contains("\"auth\""));
}
