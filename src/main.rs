use std::{io::Write, process, sync::Arc};

use praxis::{
    application::{
        chrome::ChromeService,
        contact::ContactService,
        content::ContentService,
        error::AppError,
        mail::MailTransport,
        render::render_html,
    },
    config::{self, MailTransportKind},
    domain::rich_text::Document,
    infra::{
        content::FileContentRepo,
        error::InfraError,
        http::{self, HttpState, access::AccessGate},
        mail::{HttpMailTransport, LogMailTransport},
        telemetry,
    },
};
use tokio::signal;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Render(args) => run_render(args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let state = build_http_state(&settings)?;

    let access = match &settings.access.credentials {
        Some(credentials) => Some(Arc::new(AccessGate::new(
            &credentials.username,
            &credentials.password,
            &settings.access.realm,
        )?)),
        None => None,
    };

    let router = http::build_router(state, access.clone());

    let addr = settings.server.addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| InfraError::Bind { addr, source })?;

    info!(
        target = "praxis::serve",
        addr = %addr,
        access_gate = access.is_some(),
        "listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(InfraError::Serve)?;

    info!(target = "praxis::serve", "server stopped");
    Ok(())
}

fn build_http_state(settings: &config::Settings) -> Result<HttpState, AppError> {
    let repo = Arc::new(FileContentRepo::new(settings.content.directory.clone()));
    if !repo.root().is_dir() {
        warn!(
            target = "praxis::serve",
            content = %repo.root().display(),
            "content directory does not exist; every collection will be empty"
        );
    }

    let transport: Arc<dyn MailTransport> = match &settings.mail.transport {
        MailTransportKind::Log => {
            warn!(
                target = "praxis::serve",
                "mail transport is `log`; contact messages will not be delivered"
            );
            Arc::new(LogMailTransport)
        }
        MailTransportKind::Http(http) => Arc::new(HttpMailTransport::new(
            http.endpoint.clone(),
            http.api_token.clone(),
            http.recipient.clone(),
            http.sender_address.clone(),
            settings.mail.timeout,
        )?),
    };

    Ok(HttpState {
        content: Arc::new(ContentService::new(repo)),
        chrome: Arc::new(ChromeService::new(&settings.site)),
        contact: Arc::new(ContactService::new(transport)),
    })
}

async fn run_render(args: config::RenderArgs) -> Result<(), AppError> {
    let raw = tokio::fs::read_to_string(&args.file)
        .await
        .map_err(|source| InfraError::Read {
            path: args.file.clone(),
            source,
        })?;

    let document = Document::from_json_str(&raw).unwrap_or_else(|err| {
        warn!(
            target = "praxis::render",
            file = %args.file.display(),
            error = %err,
            "document is not valid JSON; rendering it as empty"
        );
        Document::empty()
    });

    let html = render_html(&document);
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{html}").map_err(InfraError::Output)?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(target = "praxis::serve", error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(target = "praxis::serve", error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!(target = "praxis::serve", "shutdown signal received");
}
