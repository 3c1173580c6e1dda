use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while wiring up or running the process.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("failed to listen on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("server stopped unexpectedly: {0}")]
    Serve(#[source] io::Error),
    #[error("failed to read `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
    #[error("{component} setup failed: {message}")]
    Setup {
        component: &'static str,
        message: String,
    },
}

impl InfraError {
    pub fn setup(component: &'static str, message: impl Into<String>) -> Self {
        Self::Setup {
            component,
            message: message.into(),
        }
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}
