use std::io::Read;

use anyhow::{bail, Context, Result};
use clap::Parser;
use client_core::{ContactClient, ContactForm, Field, Notification, Notifier, SubmitError, Tone};
use tracing_subscriber::EnvFilter;

/// Send a message through the portfolio contact form.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long, env = "CONTACT_SERVER_URL", default_value = "http://127.0.0.1:8080")]
    server_url: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    /// Message text; `-` reads it from stdin.
    #[arg(long)]
    message: String,
}

struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn notify(&mut self, notification: Notification) {
        match notification.tone {
            Tone::Success => println!("{}\n{}", notification.title, notification.description),
            Tone::Destructive => eprintln!("{}\n{}", notification.title, notification.description),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let message = if args.message == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read message from stdin")?;
        buf
    } else {
        args.message
    };

    let client = ContactClient::new(&args.server_url)
        .with_context(|| format!("invalid server url '{}'", args.server_url))?;

    let mut form = ContactForm::new();
    form.set(Field::Name, args.name);
    form.set(Field::Email, args.email);
    form.set(Field::Message, message);

    match form.submit(&client, &mut StdoutNotifier).await {
        Ok(receipt) => {
            println!("id={}", receipt.id);
            Ok(())
        }
        Err(SubmitError::Invalid(rejection)) => {
            for field in rejection.fields() {
                eprintln!("{field}");
            }
            bail!("form is not valid; nothing was sent")
        }
        Err(err) => Err(err.into()),
    }
}
