use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "xframe-cli")]
#[command(about = "Management CLI for the X-Frame-Options filter", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[arg(short, long, env = "XFRAME_ADMIN_KEY")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service status
    Status,
    /// Show the active header policy
    Show,
    /// Send the header with the given value (DENY, SAMEORIGIN, "ALLOW-FROM <uri>")
    Set { value: String },
    /// Start sending the header, keeping the current value
    Enable,
    /// Stop sending the header
    Disable,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let policy_url = format!("{}/admin/xframe", cli.url);

    match cli.command {
        Commands::Status => {
            let res = client.get(format!("{}/admin/status", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Show => {
            let res = client.get(&policy_url).headers(headers).send().await?;
            print_response(res).await?;
        }
        Commands::Set { value } => {
            let res = client.put(&policy_url)
                .headers(headers)
                .json(&json!({ "sendHeader": true, "options": value }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Enable => {
            let res = set_enabled(&client, &policy_url, headers, true).await?;
            print_response(res).await?;
        }
        Commands::Disable => {
            let res = set_enabled(&client, &policy_url, headers, false).await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

/// Flip `sendHeader`, resubmitting the current value.
async fn set_enabled(
    client: &reqwest::Client,
    policy_url: &str,
    headers: HeaderMap,
    send_header: bool,
) -> Result<reqwest::Response, reqwest::Error> {
    let current: Value = client.get(policy_url)
        .headers(headers.clone())
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    client.put(policy_url)
        .headers(headers)
        .json(&json!({ "sendHeader": send_header, "options": current["options"] }))
        .send()
        .await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
