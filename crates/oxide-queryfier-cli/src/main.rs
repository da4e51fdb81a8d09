//! oxide-queryfier CLI
//!
//! Prunes a query template against a set of bindings and prints the result,
//! or runs it against a SQLite database.

mod literal;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use oxide_queryfier::{Parameter, Queryfied, Queryfier, SqlValue};
use oxide_queryfier_sqlx::PreparedQuery;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

/// Bind named parameters and prune filters left unbound.
#[derive(Parser)]
#[command(name = "oxide-queryfier")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Keep clauses whose parameter is null instead of removing them.
    #[arg(long, global = true, env = "QUERYFIER_ALLOW_NULLS")]
    allow_nulls: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the pruned query and its parameters.
    Prune {
        #[command(flatten)]
        template: TemplateArgs,

        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Prune the query and run it.
    Exec {
        #[command(flatten)]
        template: TemplateArgs,

        /// Database URL (SQLite path or connection string).
        #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite::memory:")]
        database: String,
    },
}

#[derive(Args)]
struct TemplateArgs {
    /// Query template text.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    sql: Option<String>,

    /// File holding the query template.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Value for the next unbound placeholder (repeatable, in order).
    #[arg(short, long = "bind", value_name = "LITERAL")]
    binds: Vec<String>,

    /// Value for a placeholder by name (repeatable).
    #[arg(short, long = "param", value_name = "NAME=LITERAL", value_parser = literal::parse_named)]
    params: Vec<(String, SqlValue)>,

    /// Named placeholder whose clause is kept even when null (repeatable).
    #[arg(long = "nullable", value_name = "NAME[=LITERAL]", value_parser = literal::parse_nullable)]
    nullable: Vec<(String, SqlValue)>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Query text followed by one `:name = value` line per parameter.
    Text,
    /// The pruned query as a JSON object.
    Json,
}

impl TemplateArgs {
    fn queryfy(self, allow_nulls: bool) -> anyhow::Result<Queryfied> {
        let sql = match (self.sql, self.file) {
            (Some(sql), _) => sql,
            (None, Some(path)) => std::fs::read_to_string(&path)
                .with_context(|| format!("reading template {}", path.display()))?,
            (None, None) => anyhow::bail!("either --sql or --file is required"),
        };

        let mut queryfier = Queryfier::new(sql);
        for raw in &self.binds {
            queryfier = queryfier.with(literal::parse_literal(raw));
        }
        for (name, value) in self.params {
            queryfier = queryfier.with_parameter(Parameter::new(name, value));
        }
        for (name, value) in self.nullable {
            queryfier = queryfier.with_parameter(Parameter::nullable(name, value));
        }
        if allow_nulls {
            queryfier = queryfier.allowing_nulls();
        }

        debug!(slots = queryfier.parameters().len(), "bound template");
        Ok(queryfier.build())
    }
}

fn print_text(queryfied: &Queryfied) {
    println!("{}", queryfied.sql());
    for parameter in queryfied.parameters() {
        println!("  :{} = {}", parameter.name(), parameter.value());
    }
}

fn returns_rows(sql: &str) -> bool {
    let head = sql.split_whitespace().next().unwrap_or_default();
    ["SELECT", "WITH", "VALUES", "PRAGMA"]
        .iter()
        .any(|kw| head.eq_ignore_ascii_case(kw))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Prune { template, format } => {
            let queryfied = template.queryfy(cli.allow_nulls)?;
            match format {
                Format::Text => print_text(&queryfied),
                Format::Json => println!("{}", serde_json::to_string_pretty(&queryfied)?),
            }
        }

        Commands::Exec { template, database } => {
            let queryfied = template.queryfy(cli.allow_nulls)?;
            let prepared = PreparedQuery::new(&queryfied)?;
            info!("{}", prepared.sql());

            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .connect(&database)
                .await
                .with_context(|| format!("connecting to {database}"))?;

            if returns_rows(prepared.sql()) {
                let rows = prepared.fetch_all(&pool).await?;
                println!("{} row(s)", rows.len());
            } else {
                let affected = prepared.execute(&pool).await?;
                println!("{affected} row(s) affected");
            }
        }
    }

    Ok(())
}
