use app::{AppFactory, AppService};
use clap::Parser;
use cli::{handlers, Command};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod app;
mod cli;
mod config;
mod debounce;
mod eid;
mod notes;
mod session;
mod storage;
mod subjects;
mod suggest;
mod web;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("classnotes=info,tower_http=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let args = cli::Args::parse();
    let paths = AppFactory::get_paths()?;

    let service = || AppFactory::create_app_service(&paths);

    match args.command {
        Command::Daemon {} => {
            let config = AppFactory::create_config(&paths)?;
            let app = AppService::new(Box::new(AppFactory::create_local_app(&paths)?));
            web::start_daemon(app, config)
        }
        Command::Compose { title, id } => {
            let config = AppFactory::create_config(&paths)?;
            handlers::handle_compose(title, id, service()?, &config)
        }
        Command::List {
            sort,
            subject,
            search,
        } => handlers::handle_list(sort, subject, search, &service()?),
        Command::Show { id } => handlers::handle_show(id, &service()?),
        Command::Add {
            title,
            body,
            subject,
        } => handlers::handle_add(title, body, subject, &service()?),
        Command::Edit {
            id,
            title,
            body,
            subject,
        } => handlers::handle_edit(id, title, body, subject, &service()?),
        Command::Delete { id, yes } => handlers::handle_delete(id, yes, &service()?),
        Command::Suggest { title, body, id } => {
            handlers::handle_suggest(title, body, id, &service()?)
        }
        Command::Recategorize { yes } => handlers::handle_recategorize(yes, &service()?),
        Command::Subject { action } => handlers::handle_subject(action, &service()?),
    }
}
