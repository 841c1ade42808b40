use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

const LOGIN_PATH: &str = "/api/v1/auth/token";
const STK_PUSH_PATH: &str = "/api/v1/fees/mpesa/stk-push";
const LOGIN_FAILED_MESSAGE: &str = "Invalid credentials. Please try again.";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("not signed in; run `asili-cli login` first")]
    MissingSession,
    #[error("{msg}", msg = LOGIN_FAILED_MESSAGE)]
    LoginFailed,
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned HTTP {status}: {message}")]
    ServerError { status: u16, message: String },
    #[error("session file {path}: {source}")]
    SessionFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "asili-cli", about = "Asili SSMS API command-line client")]
struct Cli {
    #[arg(long, env = "ASILI_BASE_URL", default_value = "http://127.0.0.1:8000")]
    base_url: String,

    #[arg(long, env = "ASILI_SESSION_FILE", default_value = ".asili-session.json")]
    session_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone)]
struct CliContext {
    base_url: String,
    session_file: PathBuf,
}

impl CliContext {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check server health.
    Ping,
    /// Sign in and store the session token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "ASILI_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show the signed-in user's profile.
    Whoami,
    /// Show the SDG 4 indicator snapshot.
    Metrics,
    /// Flag outliers in a series of attendance rates.
    Anomalies {
        #[arg(required = true, allow_negative_numbers = true)]
        rates: Vec<f64>,
    },
    /// Prompt a phone for an M-Pesa school-fee payment.
    PayFees {
        /// Payer's Safaricom number, e.g. 0712345678.
        #[arg(long)]
        phone: String,
        /// Whole shillings.
        #[arg(long)]
        amount: u64,
        /// Paybill account reference, usually the admission number.
        #[arg(long)]
        account: String,
    },
    /// Forget the stored session.
    Logout,
}

/// Session persisted between invocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredSession {
    email: String,
    token: String,
    role: String,
}

#[derive(Debug, Deserialize)]
struct TokenReply {
    access_token: String,
    role: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let ctx = CliContext {
        base_url: cli.base_url,
        session_file: cli.session_file,
    };

    match run(&ctx, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(ctx: &CliContext, command: Command) -> Result<(), CliError> {
    match command {
        Command::Ping => run_ping(ctx).await,
        Command::Login { email, password } => {
            let session = login(ctx, &email, &password).await?;
            save_session(&ctx.session_file, &session)?;
            println!("signed in as {} ({})", session.email, session.role);
            Ok(())
        }
        Command::Whoami => {
            let session = load_session(&ctx.session_file)?;
            let json = api_request(ctx, reqwest::Method::GET, "/api/v1/auth/me", None, Some(&session.token)).await?;
            print_json(&json)
        }
        Command::Metrics => {
            let json = api_request(ctx, reqwest::Method::GET, "/api/v1/analytics/sdg4", None, None).await?;
            print_json(&json)
        }
        Command::Anomalies { rates } => {
            let session = load_session(&ctx.session_file)?;
            let json = api_request(
                ctx,
                reqwest::Method::POST,
                "/api/v1/analytics/attendance/anomalies",
                Some(serde_json::json!({ "rates": rates })),
                Some(&session.token),
            )
            .await?;
            print_json(&json)
        }
        Command::PayFees { phone, amount, account } => {
            let session = load_session(&ctx.session_file)?;
            let json = api_request(
                ctx,
                reqwest::Method::POST,
                STK_PUSH_PATH,
                Some(serde_json::json!({
                    "phone_number": phone,
                    "amount": amount,
                    "account_reference": account,
                })),
                Some(&session.token),
            )
            .await?;
            print_json(&json)
        }
        Command::Logout => {
            if clear_session(&ctx.session_file)? {
                println!("signed out");
            } else {
                println!("no stored session");
            }
            Ok(())
        }
    }
}

async fn run_ping(ctx: &CliContext) -> Result<(), CliError> {
    let response = reqwest::Client::new().get(ctx.url("/health")).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::ServerError {
            status: status.as_u16(),
            message: "health check failed".to_owned(),
        });
    }
    println!("ok");
    Ok(())
}

/// Send exactly one form-encoded token request.
///
/// Every failure, transport included, maps to `CliError::LoginFailed` so the
/// terminal shows the same message as the web form.
async fn login(ctx: &CliContext, email: &str, password: &str) -> Result<StoredSession, CliError> {
    let email = email.trim();
    let fields = [("username", email), ("password", password)];
    let response = reqwest::Client::new()
        .post(ctx.url(LOGIN_PATH))
        .form(&fields)
        .send()
        .await
        .map_err(|_| CliError::LoginFailed)?;
    if !response.status().is_success() {
        return Err(CliError::LoginFailed);
    }
    let reply = response.json::<TokenReply>().await.map_err(|_| CliError::LoginFailed)?;
    if reply.access_token.is_empty() || reply.role.is_empty() {
        return Err(CliError::LoginFailed);
    }
    Ok(StoredSession {
        email: email.to_owned(),
        token: reply.access_token,
        role: reply.role,
    })
}

async fn api_request(
    ctx: &CliContext,
    method: reqwest::Method,
    path: &str,
    body: Option<Value>,
    bearer: Option<&str>,
) -> Result<Value, CliError> {
    let request = reqwest::Client::new().request(method, ctx.url(path));
    let request = if let Some(token) = bearer { request.bearer_auth(token) } else { request };
    let request = if let Some(json) = body { request.json(&json) } else { request };

    let response = request.send().await?;
    let status = response.status();
    let value = response.json::<Value>().await.unwrap_or(Value::Null);

    if !status.is_success() {
        let message = value
            .get("detail")
            .and_then(Value::as_str)
            .map_or_else(|| value.to_string(), str::to_owned);
        return Err(CliError::ServerError {
            status: status.as_u16(),
            message,
        });
    }

    Ok(value)
}

fn session_file_error(path: &Path, source: std::io::Error) -> CliError {
    CliError::SessionFile {
        path: path.display().to_string(),
        source,
    }
}

fn save_session(path: &Path, session: &StoredSession) -> Result<(), CliError> {
    use std::io::Write;

    let rendered = serde_json::to_string_pretty(session)?;
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        options.mode(0o600);
        // `mode` only applies on create; tighten a file left by an older run.
        if path.exists() {
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
                .map_err(|e| session_file_error(path, e))?;
        }
    }
    let mut file = options.open(path).map_err(|e| session_file_error(path, e))?;
    file.write_all(rendered.as_bytes())
        .map_err(|e| session_file_error(path, e))
}

fn load_session(path: &Path) -> Result<StoredSession, CliError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Err(CliError::MissingSession),
        Err(error) => return Err(session_file_error(path, error)),
    };
    Ok(serde_json::from_str(&raw)?)
}

/// Returns whether a session file existed.
fn clear_session(path: &Path) -> Result<bool, CliError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(error) => Err(session_file_error(path, error)),
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
