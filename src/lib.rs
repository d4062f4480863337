use clap::Parser;
use code_exec::{CodeExecutionService, ScriptLimits};
use code_exec_server::{create_app, run_server, AppState};
use doc_service::{DocumentClient, DocumentServiceConfig, DEFAULT_BASE_URL};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Server address to listen on
    #[arg(short, long, env = "RUNNER_ADDR", default_value = "0.0.0.0:3000")]
    pub addr: SocketAddr,

    /// Base URL of the document-generation service
    #[arg(long, env = "DOCUMENT_SERVICE_URL", default_value = DEFAULT_BASE_URL)]
    pub document_service_url: String,

    /// Timeout for the outbound document call, in seconds
    #[arg(long, env = "DOCUMENT_TIMEOUT_SECS", default_value = "30")]
    pub document_timeout_secs: u64,

    /// Maximum number of concurrent script executions
    #[arg(short, long, env = "RUNNER_MAX_CONCURRENT", default_value = "10")]
    pub max_concurrent: usize,

    /// Wall-clock limit per script, in seconds
    #[arg(long, env = "SCRIPT_TIMEOUT_SECS", default_value = "30")]
    pub script_timeout_secs: u64,

    /// Engine operation ceiling per script (0 = unlimited)
    #[arg(long, env = "SCRIPT_MAX_OPERATIONS", default_value = "50000000")]
    pub max_operations: u64,

    /// Name reported in every response
    #[arg(long, env = "RUNNER_SERVICE_NAME", default_value = "AuditBrain - Script Runner")]
    pub service_name: String,
}

impl Args {
    pub fn script_limits(&self) -> ScriptLimits {
        ScriptLimits {
            max_operations: self.max_operations,
            timeout: Duration::from_secs(self.script_timeout_secs),
            ..ScriptLimits::default()
        }
    }

    pub fn document_config(&self) -> DocumentServiceConfig {
        DocumentServiceConfig::new(self.document_service_url.clone())
            .with_timeout(Duration::from_secs(self.document_timeout_secs))
    }

    pub fn app_state(&self) -> anyhow::Result<AppState> {
        let service = CodeExecutionService::new(self.max_concurrent, self.script_limits());
        let documents = DocumentClient::new(self.document_config())?;
        Ok(AppState::new(service, documents, self.service_name.clone()))
    }
}

pub async fn run(args: Args) -> anyhow::Result<()> {
    let state = args.app_state()?;
    info!(
        document_service = %args.document_service_url,
        max_concurrent = args.max_concurrent,
        script_timeout_secs = args.script_timeout_secs,
        "Configured script runner"
    );

    run_server(create_app(state), args.addr).await?;

    Ok(())
}
