use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shared::domain::SubmissionId;
use storage::Storage;

/// Read-only inspection of stored contact submissions.
#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://./data/contact.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Most recent submissions first.
    List {
        #[arg(long, default_value_t = 20)]
        limit: u32,
        #[arg(long)]
        json: bool,
    },
    Show {
        id: String,
    },
    Count,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::List { limit, json } => {
            let submissions = storage.list_submissions(limit).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&submissions)?);
            } else {
                for s in submissions {
                    println!("{}  {}  {} <{}>", s.id, s.created_at.to_rfc3339(), s.name, s.email);
                }
            }
        }
        Command::Show { id } => {
            let id: SubmissionId = id
                .parse()
                .with_context(|| format!("'{id}' is not a submission id"))?;
            match storage.get_submission(id).await? {
                Some(s) => println!("{}", serde_json::to_string_pretty(&s)?),
                None => println!("no submission with id={id}"),
            }
        }
        Command::Count => {
            println!("{}", storage.count_submissions().await?);
        }
    }

    Ok(())
}
