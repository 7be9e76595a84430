pub mod api;

use log::info;
use std::error::Error;
use std::sync::Arc;

use crate::cli::ServeArgs;
use crate::llm::{ new_client, CompletionClient, UpstreamConfig };

pub struct Server {
    addr: String,
    upstream: Arc<dyn CompletionClient>,
}

impl Server {
    pub fn new(addr: String, upstream: Arc<dyn CompletionClient>) -> Self {
        Self {
            addr,
            upstream,
        }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        api::start_http_server(&self.addr, self.upstream.clone()).await
    }
}

pub async fn run(args: ServeArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = UpstreamConfig {
        url: args.upstream_url.clone(),
        api_key: args.upstream_api_key.clone(),
        model: args.upstream_model.clone(),
    };
    let upstream = new_client(&config)?;
    info!("Upstream configured: Model={}, URL={}", upstream.model(), args.upstream_url);

    let server = Server::new(args.server_addr, upstream);
    server.run().await
}
