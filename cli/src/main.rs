#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

use clap::{Args, Parser, Subcommand};
use firebase::{Document, Fields, FirebaseConfig, FirebaseError, FirestoreClient, IdentityToolkitClient, Value};
use rand::seq::IndexedRandom;
use serde_json::{Map, Value as Json};
use session::Role;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing_subscriber::EnvFilter;

const JOBS: &str = "jobs";
const USERS: &str = "users";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("firebase: {0}")]
    Firebase(#[from] FirebaseError),
    #[error("unknown role `{0}`; expected seeker, employer, admin or user")]
    InvalidRole(String),
    #[error("--email and --password must be given together")]
    IncompleteCredentials,
    #[error("timestamp formatting failed: {0}")]
    Timestamp(#[from] time::error::Format),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "jobverse-cli", about = "JobVerse operator CLI: seed jobs, assign roles, list jobs")]
struct Cli {
    #[command(flatten)]
    auth: AuthArgs,

    #[command(subcommand)]
    command: Command,
}

/// Who the Firestore requests run as. Without either option they are anonymous.
#[derive(Args, Debug)]
struct AuthArgs {
    #[arg(long, env = "JOBVERSE_ID_TOKEN", conflicts_with_all = ["email", "password"])]
    id_token: Option<String>,

    #[arg(long, env = "JOBVERSE_EMAIL")]
    email: Option<String>,

    #[arg(long, env = "JOBVERSE_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add randomly generated job postings.
    SeedJobs {
        #[arg(long, default_value_t = 50)]
        count: usize,
    },
    /// Write `role` onto `users/{uid}`, creating the profile if needed.
    SetRole { uid: String, role: String },
    /// Print every job posting.
    ListJobs {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = FirebaseConfig::from_env()?;
    let firestore = authorized_client(&config, &cli.auth).await?;

    match cli.command {
        Command::SeedJobs { count } => seed_jobs(&firestore, count).await,
        Command::SetRole { uid, role } => set_role(&firestore, &uid, &role).await,
        Command::ListJobs { json } => list_jobs(&firestore, json).await,
    }
}

async fn authorized_client(config: &FirebaseConfig, auth: &AuthArgs) -> Result<FirestoreClient, CliError> {
    let client = FirestoreClient::new(config)?;
    if let Some(token) = &auth.id_token {
        return Ok(client.with_bearer(token));
    }
    match (&auth.email, &auth.password) {
        (Some(email), Some(password)) => {
            let identity = IdentityToolkitClient::new(config.clone())?;
            let credential = identity.sign_in_with_password(email, password).await?;
            tracing::info!(uid = %credential.uid, "signed in");
            Ok(client.with_bearer(&credential.id_token))
        }
        (None, None) => Ok(client),
        _ => Err(CliError::IncompleteCredentials),
    }
}

// =============================================================================
// SEED JOBS
// =============================================================================

const TITLES: &[&str] = &[
    "Frontend Developer",
    "Backend Developer",
    "Full Stack Engineer",
    "UI/UX Designer",
    "Data Analyst",
    "DevOps Engineer",
    "React Developer",
    "Node.js Developer",
    "Product Manager",
    "Digital Marketer",
];

const COMPANIES: &[&str] = &[
    "TechNova Pvt. Ltd.",
    "CodeCrushers Inc.",
    "AdWise Digital",
    "ByteWorks",
    "MarketX",
    "DesignHut Ltd.",
    "GrowthLoop",
    "SmartPay India",
    "Learnly",
    "CloudBridge",
];

const LOCATIONS: &[&str] = &["Delhi", "Mumbai", "Bangalore", "Hyderabad", "Remote", "Chennai", "Pune", "Kolkata"];
const TYPES: &[&str] = &["Full-Time", "Part-Time", "Internship", "Remote"];
const CATEGORIES: &[&str] = &["IT & Software", "Marketing", "Finance", "Design", "Sales", "Remote Jobs"];
const SALARIES: &[&str] = &["₹3-5 LPA", "₹4-6 LPA", "₹5-8 LPA", "₹8-12 LPA", "₹10-15 LPA"];

const DESCRIPTIONS: &[&str] = &[
    "We are looking for a passionate individual to join our growing team.",
    "Exciting opportunity to work on cutting-edge technology with a young and energetic team.",
    "Experience with modern frameworks is a plus. Apply now!",
    "A fast-paced role for someone who enjoys a challenge.",
    "We value innovation, creativity, and ownership.",
];

fn pick<R: rand::Rng + ?Sized>(rng: &mut R, items: &[&str]) -> Value {
    Value::string(items.choose(rng).copied().unwrap_or_default())
}

/// One random job document, posted at `posted_at` (RFC 3339).
fn generate_job<R: rand::Rng + ?Sized>(rng: &mut R, posted_at: &str) -> Fields {
    let mut fields = Fields::new();
    fields.insert("title".into(), pick(rng, TITLES));
    fields.insert("company".into(), pick(rng, COMPANIES));
    fields.insert("location".into(), pick(rng, LOCATIONS));
    fields.insert("type".into(), pick(rng, TYPES));
    fields.insert("category".into(), pick(rng, CATEGORIES));
    fields.insert("salary".into(), pick(rng, SALARIES));
    fields.insert("description".into(), pick(rng, DESCRIPTIONS));
    fields.insert("postedAt".into(), Value::timestamp(posted_at));
    fields
}

async fn seed_jobs(firestore: &FirestoreClient, count: usize) -> Result<(), CliError> {
    let posted_at = OffsetDateTime::now_utc().format(&Rfc3339)?;
    let mut added = 0_usize;
    for _ in 0..count {
        let fields = generate_job(&mut rand::rng(), &posted_at);
        let summary = format!("{} at {}", text(&fields, "title"), text(&fields, "company"));
        let doc = firestore.create_document(JOBS, fields).await?;
        added = added.saturating_add(1);
        tracing::info!(id = doc.id().unwrap_or_default(), job = %summary, "added job");
    }
    eprintln!("seeded {added} jobs");
    Ok(())
}

fn text<'a>(fields: &'a Fields, key: &str) -> &'a str {
    match fields.get(key) {
        Some(Value::String(s)) => s,
        _ => "",
    }
}

// =============================================================================
// SET ROLE
// =============================================================================

fn parse_role(raw: &str) -> Result<Role, CliError> {
    raw.trim().to_ascii_lowercase().parse::<Role>().map_err(|_| CliError::InvalidRole(raw.to_owned()))
}

async fn set_role(firestore: &FirestoreClient, uid: &str, raw_role: &str) -> Result<(), CliError> {
    let role = parse_role(raw_role)?;
    let mut fields = Fields::new();
    fields.insert("uid".into(), Value::string(uid));
    fields.insert("role".into(), Value::string(role.as_str()));
    firestore.merge_document(USERS, uid, fields).await?;
    tracing::info!(%uid, %role, "role updated");
    println!("{uid}: {role}");
    Ok(())
}

// =============================================================================
// LIST JOBS
// =============================================================================

fn job_line(doc: &Document) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        doc.id().unwrap_or_default(),
        text(&doc.fields, "title"),
        text(&doc.fields, "company"),
        text(&doc.fields, "location"),
    )
}

async fn list_jobs(firestore: &FirestoreClient, json: bool) -> Result<(), CliError> {
    let docs = firestore.list_all(JOBS).await?;
    if json {
        let rows: Vec<Json> = docs
            .iter()
            .map(|doc| {
                let mut row = Map::new();
                row.insert("id".to_owned(), Json::String(doc.id().unwrap_or_default().to_owned()));
                row.extend(doc.to_json());
                Json::Object(row)
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for doc in &docs {
            println!("{}", job_line(doc));
        }
        eprintln!("{} jobs", docs.len());
    }
    Ok(())
}
