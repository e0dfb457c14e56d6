//! rest-invoker
//!
//! Issues a single HTTP invocation through the rest client and prints the
//! status code and body. Ctrl+C cancels the in-flight call.
//!
//! ```text
//! rest-invoker --address 127.0.0.1:8080 --path /users/7
//! rest-invoker -c invoker.toml -a svc:8443 -m POST -d '{"name":"a"}' -t 2000
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use reqwest::Method;

use rest_invoker::client::{self, ClientRegistry, RestRequest, RestResponse};
use rest_invoker::config::{load_config, InvokerConfig};
use rest_invoker::observability::{logging, metrics};
use rest_invoker::options::url_path;
use rest_invoker::{CallContext, LatencyCollector};

#[derive(Parser, Debug)]
#[command(name = "rest-invoker")]
#[command(about = "Invoke an HTTP endpoint through the rest client", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target host:port
    #[arg(short, long)]
    address: String,

    /// Request path, including any query string
    #[arg(short, long, default_value = "/")]
    path: String,

    /// HTTP method
    #[arg(short, long, default_value = "GET")]
    method: String,

    /// Request body
    #[arg(short, long)]
    data: Option<String>,

    /// Call deadline in milliseconds
    #[arg(short, long, default_value_t = 5000)]
    timeout_ms: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => InvokerConfig::default(),
    };

    logging::init_logging(&config.observability)?;

    tracing::info!(
        address = %cli.address,
        path = %cli.path,
        method = %cli.method,
        timeout_ms = cli.timeout_ms,
        "rest-invoker v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let registry = ClientRegistry::with_defaults(Arc::new(LatencyCollector::new()));
    let client = registry.create(client::NAME, config.client.to_options())?;

    let method = Method::from_bytes(cli.method.to_ascii_uppercase().as_bytes())?;
    let mut arg = RestRequest::new(method);
    if let Some(data) = cli.data {
        arg = arg.with_body(data);
    }
    let mut request = client.new_request("cli", "", "invoke", Box::new(arg), vec![]);

    let ctx = CallContext::background().with_timeout(Duration::from_millis(cli.timeout_ms));
    let canceller = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling call");
            canceller.cancel();
        }
    });

    let mut response = RestResponse::default();
    let result = client
        .call(
            &ctx,
            &cli.address,
            &mut request,
            &mut response,
            vec![url_path(cli.path)],
        )
        .await;

    if response.status_code() != 0 {
        println!("{}", response.status_code());
        println!("{}", response.text());
    }

    result?;
    Ok(())
}
