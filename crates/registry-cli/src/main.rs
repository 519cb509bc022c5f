use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use registry_core::{Star, Wallet};
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "registry-cli")]
#[command(about = "CLI client for the star registry node")]
struct Cli {
    /// Node base URL (e.g. http://127.0.0.1:8000)
    #[arg(long, global = true, default_value = "http://127.0.0.1:8000")]
    node: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a wallet key pair
    Keygen,
    /// Ask the node for a challenge message to sign
    Challenge {
        #[arg(long)]
        address: String,
    },
    /// Request a challenge, sign it locally and register a star
    Submit {
        /// Hex-encoded wallet secret key
        #[arg(long, env = "REGISTRY_SECRET")]
        secret: String,
        #[command(flatten)]
        star: StarArgs,
    },
    /// Fetch a block by height or hash
    Block {
        #[arg(long, conflicts_with = "hash", required_unless_present = "hash")]
        height: Option<u64>,
        #[arg(long)]
        hash: Option<String>,
    },
    /// List the stars registered to an address
    Stars {
        #[arg(long)]
        address: String,
    },
    /// Run chain validation on the node
    Validate,
}

#[derive(Args, Debug)]
struct StarArgs {
    #[arg(long)]
    story: String,
    #[arg(long, default_value = "")]
    dec: String,
    #[arg(long, default_value = "")]
    ra: String,
    #[arg(long)]
    mag: Option<String>,
    #[arg(long)]
    cen: Option<String>,
}

impl From<StarArgs> for Star {
    fn from(a: StarArgs) -> Self {
        Star {
            dec: a.dec,
            ra: a.ra,
            story: a.story,
            mag: a.mag,
            cen: a.cen,
        }
    }
}

#[derive(Serialize)]
struct ClaimBody {
    address: String,
    message: String,
    signature: String,
    star: Star,
}

struct NodeClient {
    http: Client,
    base: String,
}

impl NodeClient {
    fn new(base: &str) -> Self {
        Self {
            http: Client::new(),
            base: base.trim_end_matches('/').to_string(),
        }
    }

    async fn get(&self, path: &str) -> Result<Value> {
        let res = self.http.get(format!("{}{path}", self.base)).send().await?;
        read(res).await
    }

    async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Value> {
        let res = self
            .http
            .post(format!("{}{path}", self.base))
            .json(body)
            .send()
            .await?;
        read(res).await
    }

    async fn challenge(&self, address: &str) -> Result<String> {
        let body = self
            .post("/requestValidation", &json!({ "address": address }))
            .await?;
        body["message"]
            .as_str()
            .map(str::to_string)
            .context("node returned no challenge message")
    }
}

async fn read(res: Response) -> Result<Value> {
    let status = res.status();
    let body: Value = res.json().await.context("node returned non-json body")?;
    debug!("node replied {status}: {body}");
    if !status.is_success() {
        let reason = body["error"].as_str().unwrap_or("unknown error");
        bail!("{status}: {reason}");
    }
    Ok(body)
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .init();

    let cli = Cli::parse();
    let node = NodeClient::new(&cli.node);
    let out = match cli.cmd {
        Command::Keygen => {
            let wallet = Wallet::generate();
            json!({ "address": wallet.address(), "secret": wallet.secret_hex() })
        }
        Command::Challenge { address } => json!({ "message": node.challenge(&address).await? }),
        Command::Submit { secret, star } => {
            let wallet = Wallet::from_secret_hex(&secret).context("invalid secret key")?;
            let address = wallet.address();
            let message = node.challenge(&address).await?;
            let body = ClaimBody {
                signature: wallet.sign(&message),
                address,
                message,
                star: star.into(),
            };
            node.post("/submitstar", &body).await?
        }
        Command::Block { height, hash } => match (height, hash) {
            (Some(h), _) => node.get(&format!("/block/height/{h}")).await?,
            (None, Some(hash)) => node.get(&format!("/block/hash/{hash}")).await?,
            (None, None) => bail!("pass --height or --hash"),
        },
        Command::Stars { address } => node.get(&format!("/blocks/{address}")).await?,
        Command::Validate => node.get("/validate").await?,
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
