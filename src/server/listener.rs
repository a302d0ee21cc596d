use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::http::connection::Connection;
use crate::logging::access::AccessLog;

pub async fn run(cfg: Arc<Config>, log: AccessLog) -> anyhow::Result<()> {
    let listener = TcpListener::bind(cfg.listen_addr()).await?;
    info!(
        "Listening on http://{}/ serving {}",
        cfg.listen_addr(),
        cfg.document_root.display()
    );

    loop {
        let (socket, peer) = listener.accept().await?;
        tracing::debug!("Accepted connection from {}", peer);

        let cfg = Arc::clone(&cfg);
        let log = log.clone();
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, peer, cfg, log);
            if let Err(e) = conn.run().await {
                tracing::error!("Connection error from {}: {}", peer, e);
            }
        });
    }
}
