use clap::Parser;
use quadra::cli::{
    build_service, handle_add, handle_cleanup, handle_complete, handle_delete, handle_export,
    handle_import, handle_info, handle_list, handle_migrate_dir, handle_migrate_images,
    handle_update, Cli, Commands,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let service = build_service(cli.data_dir);

    let result = match cli.command {
        Commands::List { quadrant, json } => handle_list(&service, quadrant, json).await,
        Commands::Add {
            title,
            quadrant,
            content,
            json,
        } => handle_add(&service, title, quadrant, content, json).await,
        Commands::Update {
            id,
            title,
            content,
            quadrant,
            sort_order,
        } => handle_update(&service, id, title, content, quadrant, sort_order).await,
        Commands::Complete { id } => handle_complete(&service, id).await,
        Commands::Delete { id } => handle_delete(&service, id).await,
        Commands::Export { file, theme } => handle_export(&service, &file, theme).await,
        Commands::Import { file } => handle_import(&service, &file).await,
        Commands::Cleanup => handle_cleanup(&service).await,
        Commands::MigrateImages => handle_migrate_images(&service).await,
        Commands::MigrateDir { path } => handle_migrate_dir(&service, &path).await,
        Commands::Info { json } => handle_info(&service, json).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
