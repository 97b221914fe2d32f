use std::{
    fs,
    io::{self, Write},
    process,
    sync::Arc,
};

use folio::{
    application::{
        blog::BlogService,
        clipboard::{Clipboard, spawn_copy},
        error::AppError,
        render::render_service,
        site,
    },
    config,
    domain::posts::{Catalog, PostQuery},
    infra::{
        clipboard::CommandClipboard,
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
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
        .with_writer(io::stderr)
        .with_max_level(Level::ERROR)
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
    let blog = Arc::new(build_blog_service(&settings)?);

    match command {
        config::Command::Serve(_) => run_serve(&settings, blog).await,
        config::Command::Render(args) => run_render(&blog, args),
        config::Command::Related(args) => run_related(&blog, args),
        config::Command::List(args) => run_list(&blog, args),
        config::Command::Copy(args) => run_copy(&settings, &blog, args).await,
        config::Command::Export(args) => run_export(&blog, args),
    }
}

fn build_blog_service(settings: &config::Settings) -> Result<BlogService, AppError> {
    let catalog = match settings.content.catalog_path.as_deref() {
        Some(path) => Catalog::from_path(path)?,
        None => Catalog::bundled()?,
    };

    info!(
        target = "folio::startup",
        posts = catalog.len(),
        source = settings
            .content
            .catalog_path
            .as_deref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "bundled".to_string()),
        "catalog loaded"
    );

    Ok(BlogService::new(
        Arc::new(catalog),
        render_service(),
        settings.content.related_limit.get(),
    ))
}

async fn run_serve(settings: &config::Settings, blog: Arc<BlogService>) -> Result<(), AppError> {
    let router = http::build_router(HttpState::new(blog));

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "folio::serve",
        addr = %settings.server.addr,
        "listening"
    );

    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))
}

fn run_render(blog: &BlogService, args: config::RenderArgs) -> Result<(), AppError> {
    let document = blog.render_post(args.id)?;
    let output = match args.format {
        config::OutputFormat::Html => blog.renderer().to_html(&document),
        config::OutputFormat::Json => serde_json::to_string_pretty(&document)
            .map_err(|err| AppError::unexpected(format!("failed to encode document: {err}")))?,
    };

    match args.output {
        Some(path) => {
            fs::write(&path, output).map_err(|err| AppError::from(InfraError::Io(err)))?;
            info!(
                target = "folio::render",
                post_id = args.id,
                path = %path.display(),
                blocks = document.len(),
                "document written"
            );
            Ok(())
        }
        None => write_stdout(&output),
    }
}

fn run_related(blog: &BlogService, args: config::RelatedArgs) -> Result<(), AppError> {
    let mut out = String::new();
    for related in blog.related(args.id)? {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\n",
            related.id, related.category, related.title, related.preview
        ));
    }
    write_stdout(&out)
}

fn run_list(blog: &BlogService, args: config::ListArgs) -> Result<(), AppError> {
    let listing = blog.listing(&PostQuery {
        search: args.search,
        category: args.category,
    });

    let mut out = String::new();
    for (marker, post) in listing
        .featured
        .iter()
        .map(|post| ("*", post))
        .chain(listing.regular.iter().map(|post| (" ", post)))
    {
        out.push_str(&format!(
            "{marker} {}\t{}\t{}\t{}\n",
            post.id, post.date, post.category, post.title
        ));
    }
    if listing.total() == 0 {
        out.push_str("no posts match\n");
    }
    write_stdout(&out)
}

async fn run_copy(
    settings: &config::Settings,
    blog: &BlogService,
    args: config::CopyArgs,
) -> Result<(), AppError> {
    let code = blog.code_block(args.id, args.block)?;
    let clipboard: Arc<dyn Clipboard> =
        Arc::new(CommandClipboard::from_settings(&settings.clipboard));

    let outcome = spawn_copy(clipboard, code.copy).outcome().await;
    let notification = outcome.notification();
    eprintln!("{} {}", notification.title, notification.message);

    if outcome.is_copied() {
        Ok(())
    } else {
        Err(AppError::unexpected(notification.message))
    }
}

fn run_export(blog: &BlogService, args: config::ExportArgs) -> Result<(), AppError> {
    let summary = site::export_site(blog, &args.dir)?;
    write_stdout(&format!(
        "exported {} posts to {}\n",
        summary.posts,
        args.dir.display()
    ))
}

fn write_stdout(text: &str) -> Result<(), AppError> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|err| AppError::from(InfraError::Io(err)))
}
