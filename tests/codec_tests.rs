use courier::RpcError;
use courier::codec::{CodecKind, CodecReader, CodecWriter, FrameReader, RecordReader, RecordWriter};
use courier::constants::MAX_FRAME_SIZE;
use courier::proto::RpcHeader;
use tokio::io::AsyncWriteExt;

fn header(service_method: &str, seq: u64, error: &str) -> RpcHeader {
    RpcHeader {
        service_method: service_method.to_string(),
        seq,
        error: error.to_string(),
    }
}

async fn round_trip(kind: CodecKind) {
    let (client_io, server_io) = tokio::io::duplex(64 * 1024);
    let (_client_read, client_write) = tokio::io::split(client_io);
    let (server_read, _server_write) = tokio::io::split(server_io);
    let mut writer = RecordWriter::new(kind, Box::new(client_write));
    let mut reader = RecordReader::new(kind, Box::new(server_read));

    let sent = header("Arith.Multiply", 7, "");
    let body = kind.encode(&"payload one".to_string()).unwrap();
    writer.write(&sent, &body).await.unwrap();

    let received = reader.read_header().await.unwrap();
    assert_eq!(received, sent);
    let raw = reader.read_body().await.unwrap();
    assert_eq!(&raw[..], &body[..]);
    let value: String = kind.decode(&raw).unwrap();
    assert_eq!(value, "payload one");
}

#[tokio::test]
async fn header_and_body_round_trip_bitcode() {
    round_trip(CodecKind::Bitcode).await;
}

#[tokio::test]
async fn header_and_body_round_trip_json() {
    round_trip(CodecKind::Json).await;
}

#[tokio::test]
async fn error_header_round_trips_verbatim() {
    for kind in [CodecKind::Bitcode, CodecKind::Json] {
        let (client_io, server_io) = tokio::io::duplex(64 * 1024);
        let (_client_read, client_write) = tokio::io::split(client_io);
        let (server_read, _server_write) = tokio::io::split(server_io);
        let mut writer = RecordWriter::new(kind, Box::new(client_write));
        let mut reader = RecordReader::new(kind, Box::new(server_read));

        let sent = header("Foo.Sum", 42, "method not found: Foo.Sum");
        writer.write(&sent, &[]).await.unwrap();
        let received = reader.read_header().await.unwrap();
        assert_eq!(received, sent);
        assert!(reader.read_body().await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn discarded_body_keeps_the_stream_aligned() {
    let kind = CodecKind::Bitcode;
    let (client_io, server_io) = tokio::io::duplex(64 * 1024);
    let (_client_read, client_write) = tokio::io::split(client_io);
    let (server_read, _server_write) = tokio::io::split(server_io);
    let mut writer = RecordWriter::new(kind, Box::new(client_write));
    let mut reader = RecordReader::new(kind, Box::new(server_read));

    let first = header("Svc.First", 1, "");
    let second = header("Svc.Second", 2, "");
    writer
        .write(&first, &kind.encode(&"unwanted".to_string()).unwrap())
        .await
        .unwrap();
    writer
        .write(&second, &kind.encode(&"wanted".to_string()).unwrap())
        .await
        .unwrap();

    assert_eq!(reader.read_header().await.unwrap(), first);
    // Read the body and drop it unexamined.
    drop(reader.read_body().await.unwrap());
    assert_eq!(reader.read_header().await.unwrap(), second);
    let raw = reader.read_body().await.unwrap();
    let value: String = kind.decode(&raw).unwrap();
    assert_eq!(value, "wanted");
}

#[tokio::test]
async fn oversized_record_is_drained_and_reported() {
    let (mut client_io, server_io) = tokio::io::duplex(64 * 1024);
    let pump = tokio::spawn(async move {
        let oversized = MAX_FRAME_SIZE + 1;
        client_io
            .write_all(&(oversized as u32).to_le_bytes())
            .await
            .unwrap();
        let chunk = vec![0u8; 64 * 1024];
        let mut remaining = oversized;
        while remaining > 0 {
            let take = remaining.min(chunk.len());
            client_io.write_all(&chunk[..take]).await.unwrap();
            remaining -= take;
        }
        client_io.write_all(&5u32.to_le_bytes()).await.unwrap();
        client_io.write_all(b"after").await.unwrap();
    });

    let (server_read, _server_write) = tokio::io::split(server_io);
    let mut reader = FrameReader::new(Box::new(server_read));
    let err = reader.read_frame().await.unwrap_err();
    assert!(matches!(err, RpcError::FrameTooLarge { len } if len == MAX_FRAME_SIZE + 1));
    // The oversized record was consumed in full; the next one is intact.
    let frame = reader.read_frame().await.unwrap();
    assert_eq!(&frame[..], b"after");
    pump.await.unwrap();
}

#[tokio::test]
async fn write_failure_poisons_the_writer() {
    let (client_io, server_io) = tokio::io::duplex(1024);
    drop(server_io);
    let (_client_read, client_write) = tokio::io::split(client_io);
    let mut writer = RecordWriter::new(CodecKind::Bitcode, Box::new(client_write));

    let h = header("Svc.Method", 1, "");
    let err = writer.write(&h, b"x").await.unwrap_err();
    assert!(matches!(err, RpcError::Io(_)));
    // Subsequent writes fail fast without touching the dead stream.
    let err = writer.write(&h, b"x").await.unwrap_err();
    assert!(matches!(err, RpcError::Io(_)));
}

#[test]
fn codec_tags_round_trip() {
    for kind in [CodecKind::Bitcode, CodecKind::Json] {
        assert_eq!(CodecKind::from_tag(kind.tag()), Some(kind));
    }
    assert_eq!(CodecKind::from_tag("application/gob"), None);
}
