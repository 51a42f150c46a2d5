use bytes::Bytes;
use courier::codec::CodecKind;
use courier::service::{InboundCall, ServiceDispatch, ServiceError, ServiceRegistry};

fn inbound(kind: CodecKind, service_method: &str, seq: u64, args: Vec<u8>) -> InboundCall {
    InboundCall {
        service_method: service_method.to_string(),
        seq,
        codec: kind,
        args: Bytes::from(args),
    }
}

#[tokio::test]
async fn typed_handler_round_trip() {
    let mut registry = ServiceRegistry::new();
    registry.register("Arith.Sum", |terms: Vec<f64>| async move {
        Ok::<_, ServiceError>(terms.iter().sum::<f64>())
    });

    let kind = CodecKind::Bitcode;
    let args = kind.encode(&vec![1.0f64, 2.0, 3.5]).unwrap();
    let reply = registry
        .dispatch(inbound(kind, "Arith.Sum", 1, args))
        .await
        .unwrap();
    let total: f64 = kind.decode(&reply).unwrap();
    assert_eq!(total, 6.5);
}

#[tokio::test]
async fn one_registration_serves_every_codec() {
    let mut registry = ServiceRegistry::new();
    registry.register("Echo.Upper", |text: String| async move {
        Ok::<_, ServiceError>(text.to_uppercase())
    });

    for kind in [CodecKind::Bitcode, CodecKind::Json] {
        let args = kind.encode(&"hello".to_string()).unwrap();
        let reply = registry
            .dispatch(inbound(kind, "Echo.Upper", 1, args))
            .await
            .unwrap();
        let out: String = kind.decode(&reply).unwrap();
        assert_eq!(out, "HELLO");
    }
}

#[tokio::test]
async fn unknown_method_is_reported() {
    let registry = ServiceRegistry::new();
    let err = registry
        .dispatch(inbound(CodecKind::Json, "No.Such", 9, b"null".to_vec()))
        .await
        .unwrap_err();
    assert_eq!(err, ServiceError::MethodNotFound("No.Such".to_string()));
}

#[tokio::test]
async fn undecodable_argument_is_a_bad_request() {
    let mut registry = ServiceRegistry::new();
    registry.register("Echo.Upper", |text: String| async move {
        Ok::<_, ServiceError>(text)
    });

    let err = registry
        .dispatch(inbound(
            CodecKind::Json,
            "Echo.Upper",
            2,
            b"{not json".to_vec(),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::BadRequest(_)));
}
