use peer_dispatch::dispatch::dispatcher_config::DispatcherConfig;
use peer_dispatch::dispatch::packet_handler::PacketHandler;
use peer_dispatch::dispatch::serialized::SerializedDispatcher;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let config = DispatcherConfig {
        max_source_queue_size: 32,
        give_up_after_skipped: 8,
        drop_source_after_retries: 3,
    };
    let dispatcher: Arc<SerializedDispatcher<SocketAddr, Vec<u8>>> =
        Arc::new(SerializedDispatcher::new(Arc::new(LoggingHandler {}), config)?);

    let receive_socket = UdpSocket::bind("127.0.0.1:0").await?;
    let receive_addr = receive_socket.local_addr()?;

    for peer in 0..3u32 {
        tokio::spawn(async move {
            let socket = UdpSocket::bind("127.0.0.1:0").await?;
            for i in 0..10u32 {
                socket.send_to(format!("peer {} message {}", peer, i).as_bytes(), receive_addr).await?;
            }
            anyhow::Ok(())
        });
    }

    let mut buf = [0u8; 1500];
    for _ in 0..30 {
        let (num_read, from) = receive_socket.recv_from(&mut buf).await?;
        dispatcher.dispatch(from, buf[..num_read].to_vec()).await;
    }

    info!("done - traffic from {} peers was dispatched", dispatcher.num_sources().await);
    Ok(())
}

struct LoggingHandler {}
#[async_trait::async_trait]
impl PacketHandler<SocketAddr, Vec<u8>> for LoggingHandler {
    async fn handle_packet(&self, source: SocketAddr, message: Vec<u8>) -> anyhow::Result<()> {
        info!("handling {} bytes from {:?}", message.len(), source);
        Ok(())
    }
}
