use clap::{Parser, Subcommand};

use unipet::config::Config;
use unipet::db;
use unipet::db::units::UnitSlugs;
use unipet::error::AppError;
use unipet::resolver;
use unipet::slug;

#[derive(Parser)]
#[command(name = "unipet-slugs")]
#[command(about = "Inspect and maintain network unit URL slugs", long_about = None)]
struct Cli {
    /// Database URL (defaults to DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the slug a name normalizes to
    Normalize {
        text: String,
    },
    /// List free slugs for a name
    Suggest {
        text: String,
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },
    /// Re-derive slugs from unit names
    Regenerate {
        /// Unit id to re-slug
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        id: Option<String>,
        /// Re-slug every unit
        #[arg(long)]
        all: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "unipet=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = Config::from_env();
    let database_url = cli.database_url.unwrap_or(config.database_url);

    match cli.command {
        Commands::Normalize { text } => {
            let normalized = slug::normalize_to_slug(&text);
            if !slug::is_valid_slug(&normalized) {
                return Err(AppError::BadRequest(format!(
                    "{text:?} has no letters or digits to build a slug from"
                )));
            }
            println!("{normalized}");
        }
        Commands::Suggest { text, limit } => {
            let pool = db::create_pool(&database_url).await?;
            let suggestions =
                resolver::suggest_slugs(&UnitSlugs(&pool), &text, limit, &config.slugs).await?;
            for suggestion in suggestions {
                println!("{suggestion}");
            }
        }
        Commands::Regenerate { id: Some(id), .. } => {
            let pool = db::create_pool(&database_url).await?;
            let before = db::units::get_unit(&pool, &id).await?;
            let after = db::units::regenerate_slug(&pool, &config.slugs, &id).await?;
            println!("{}\t{}\t{}", after.id, before.url_slug, after.url_slug);
        }
        Commands::Regenerate { id: None, .. } => {
            let pool = db::create_pool(&database_url).await?;
            let outcomes = db::units::regenerate_all(&pool, &config.slugs).await?;
            let mut failed = 0;
            for (before, result) in &outcomes {
                match result {
                    Ok(after) => println!("{}\t{}\t{}", after.id, before.url_slug, after.url_slug),
                    Err(_) => failed += 1,
                }
            }
            if failed > 0 {
                return Err(AppError::Internal(format!(
                    "{failed} of {} units could not be re-slugged",
                    outcomes.len()
                )));
            }
        }
    }

    Ok(())
}
