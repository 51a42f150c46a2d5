use courier::{ConnectOption, EchoService, RpcClient, RpcServer};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Bind to a random available port
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    {
        let server = Arc::new(RpcServer::new(Arc::new(EchoService)));
        tokio::spawn(server.accept(listener));
    }

    let client = Arc::new(
        RpcClient::dial(addr, ConnectOption::default())
            .await
            .unwrap(),
    );

    let mut calls = Vec::new();
    for i in 0..5 {
        let client = Arc::clone(&client);
        calls.push(tokio::spawn(async move {
            let args = format!("rpc req {}", i);
            let reply: String = client.call("Foo.Sum", &args).await.unwrap();
            tracing::info!("reply for {:?}: {:?}", args, reply);
        }));
    }
    for call in calls {
        call.await.unwrap();
    }

    let _ = client.close().await;
}
