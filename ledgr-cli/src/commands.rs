//! Subcommand handlers.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use chrono::{DateTime, SecondsFormat, Utc};
use ledgr_chain::{Chain, ClassRegistry, ImportBatch};
use ledgr_core::{Block, Provenance};

use crate::cli::{Command, IdentityCommand};
use crate::config::LedgerConfig;

/// Environment variable checked before prompting for a passphrase.
pub const PASSPHRASE_ENV: &str = "LEDGR_PASSPHRASE";

/// Where identity passphrases come from.
///
/// Every identity in a ledger's identity directory is sealed under the same
/// passphrase.
pub enum Passphrase {
    /// A passphrase supplied up front.
    Fixed(String),
    /// Ask on the terminal.
    Prompt,
}

impl Passphrase {
    /// Use `LEDGR_PASSPHRASE` when set, otherwise prompt.
    pub fn from_env() -> Self {
        match std::env::var(PASSPHRASE_ENV) {
            Ok(value) if !value.is_empty() => Passphrase::Fixed(value),
            _ => Passphrase::Prompt,
        }
    }

    fn read(&self) -> anyhow::Result<String> {
        match self {
            Passphrase::Fixed(value) => Ok(value.clone()),
            Passphrase::Prompt => prompt_password("Enter passphrase: "),
        }
    }

    /// Read a passphrase for sealing a new identity, confirming when typed.
    fn read_new(&self) -> anyhow::Result<String> {
        match self {
            Passphrase::Fixed(value) => Ok(value.clone()),
            Passphrase::Prompt => prompt_password_confirm(),
        }
    }
}

fn prompt_password(prompt: &str) -> anyhow::Result<String> {
    rpassword::prompt_password(prompt).context("Failed to read passphrase")
}

fn prompt_password_confirm() -> anyhow::Result<String> {
    let pass1 = prompt_password("Enter passphrase: ")?;
    let pass2 = prompt_password("Confirm passphrase: ")?;
    if pass1 != pass2 {
        bail!("Passphrases do not match");
    }
    Ok(pass1)
}

/// Dispatch a parsed subcommand.
pub async fn run(
    config: &LedgerConfig,
    command: Command,
    passphrase: &Passphrase,
) -> anyhow::Result<()> {
    match command {
        Command::Init { identity } => cmd_init(config, passphrase, &identity).await,
        Command::Identity(IdentityCommand::New { name }) => {
            cmd_identity_new(config, passphrase, &name)
        }
        Command::Identity(IdentityCommand::List) => cmd_identity_list(config),
        Command::Post { creator, batch } => cmd_post(config, passphrase, &creator, &batch).await,
        Command::Import {
            creator,
            file,
            label,
        } => cmd_import(config, passphrase, &creator, &file, label).await,
        Command::Verify => cmd_verify(config, passphrase).await,
        Command::Show { from, to } => cmd_show(config, passphrase, from, to).await,
    }
}

// ============================================================================
// Identity Commands
// ============================================================================

fn cmd_identity_new(
    config: &LedgerConfig,
    passphrase: &Passphrase,
    name: &str,
) -> anyhow::Result<()> {
    let identities = config.identity_store();
    if identities.contains(name) {
        bail!("Identity already exists: {}", name);
    }

    let pass = passphrase.read_new()?;
    let identity = identities.create(name, &pass)?;

    println!("Generated new identity:");
    println!("  Name:        {}", identity.name());
    println!("  Fingerprint: {}", identity.fingerprint());
    println!("  Public Key:  {}", hex::encode(identity.public_key().as_bytes()));
    println!("  Saved to:    {}", identities.dir().display());

    Ok(())
}

fn cmd_identity_list(config: &LedgerConfig) -> anyhow::Result<()> {
    let names = config.identity_store().list()?;
    if names.is_empty() {
        println!("No identities in {}", config.identity_dir.display());
        return Ok(());
    }
    for name in names {
        println!("  {}", name);
    }
    Ok(())
}

// ============================================================================
// Ledger Commands
// ============================================================================

async fn cmd_init(
    config: &LedgerConfig,
    passphrase: &Passphrase,
    identity: &str,
) -> anyhow::Result<()> {
    let store = config.ledger_store();
    if store.exists() {
        bail!("Ledger already exists: {}", store.ledger_path().display());
    }

    let identities = config.identity_store();
    let pass = if identities.contains(identity) {
        passphrase.read()?
    } else {
        let pass = passphrase.read_new()?;
        identities.create(identity, &pass)?;
        println!("Created identity '{}'", identity);
        pass
    };
    let authorization = identities.load_all(&pass)?;

    if store.key_path().is_file() {
        tracing::warn!(path = %store.key_path().display(), "reusing existing ledger key");
    } else {
        store.init_key()?;
    }

    let chain = Chain::new(authorization, ClassRegistry::standard(), identity)?
        .with_policy(config.subclass_policy);
    store.save_async(&chain).await?;

    let genesis = chain.genesis();
    println!("Initialized ledger:");
    println!("  Ledger:   {}", store.ledger_path().display());
    println!("  Key:      {}", store.key_path().display());
    println!("  Genesis:  {}", genesis.hash_hex());
    println!("  Creator:  {}", genesis.creator);
    println!();
    println!("Keep the key file safe: the ledger cannot be read without it.");

    Ok(())
}

async fn cmd_post(
    config: &LedgerConfig,
    passphrase: &Passphrase,
    creator: &str,
    batch_path: &Path,
) -> anyhow::Result<()> {
    let batch = read_batch(batch_path)?;
    let mut chain = load_chain(config, passphrase).await?;

    let block = chain.post(batch, creator)?;
    print_appended(block);

    config.ledger_store().save_async(&chain).await?;
    Ok(())
}

async fn cmd_import(
    config: &LedgerConfig,
    passphrase: &Passphrase,
    creator: &str,
    file: &Path,
    label: Option<String>,
) -> anyhow::Result<()> {
    let mut batch = read_batch(file)?;
    batch.source_label = label.or(batch.source_label).or_else(|| {
        file.file_name()
            .map(|name| name.to_string_lossy().into_owned())
    });

    let mut chain = load_chain(config, passphrase).await?;
    let block = chain.import(batch, creator)?;
    print_appended(block);

    config.ledger_store().save_async(&chain).await?;
    Ok(())
}

async fn cmd_verify(config: &LedgerConfig, passphrase: &Passphrase) -> anyhow::Result<()> {
    let chain = load_chain(config, passphrase).await?;
    let audit = chain.validate_chain();

    println!("Ledger: {}", config.ledger_path.display());
    println!("  Blocks:     {}", chain.len());
    println!("  Last hash:  {}", hex::encode(chain.last_hash()));

    if let Some(failure) = audit.failure {
        println!(
            "  Hashes:     FAILED at block {} ({:?})",
            failure.sequence, failure.kind
        );
        bail!("ledger failed verification at block {}", failure.sequence);
    }
    println!("  Hashes:     ok ({} blocks checked)", audit.blocks_checked);

    if let Err(e) = chain.audit_signatures() {
        println!("  Signatures: FAILED ({})", e);
        bail!("ledger failed verification: {}", e);
    }
    println!("  Signatures: ok");

    Ok(())
}

async fn cmd_show(
    config: &LedgerConfig,
    passphrase: &Passphrase,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> anyhow::Result<()> {
    let chain = load_chain(config, passphrase).await?;
    let start = from.unwrap_or(DateTime::<Utc>::MIN_UTC);
    let end = to.unwrap_or(DateTime::<Utc>::MAX_UTC);

    let mut shown = 0;
    for block in chain.blocks_in_range(start, end) {
        print!("{}", render_block(block));
        shown += 1;
    }
    println!("{} of {} blocks", shown, chain.len());

    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

async fn load_chain(config: &LedgerConfig, passphrase: &Passphrase) -> anyhow::Result<Chain> {
    let store = config.ledger_store();
    if !store.exists() {
        bail!(
            "No ledger at {}; run `ledgr init` first",
            store.ledger_path().display()
        );
    }

    let authorization = config.identity_store().load_all(&passphrase.read()?)?;
    let chain = store.load_async(authorization).await?;
    Ok(chain.with_policy(config.subclass_policy))
}

fn read_batch(path: &Path) -> anyhow::Result<ImportBatch> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch file {}", path.display()))?;
    ImportBatch::from_json(&json)
        .with_context(|| format!("Invalid batch file {}", path.display()))
}

fn print_appended(block: &Block) {
    println!("Appended block {}:", block.sequence);
    println!("  Hash:     {}", block.hash_hex());
    println!("  Entries:  {}", block.entry_count());
    println!("  Creator:  {}", block.creator);
}

/// Hex digits of an entry signature shown by `show`.
const SIGNATURE_PREFIX: usize = 16;

fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Human-readable listing of one block and its entries.
fn render_block(block: &Block) -> String {
    let mut out = String::new();
    let source = match &block.provenance {
        Provenance::Direct => String::new(),
        Provenance::Imported { source_label } => format!(
            "  [imported: {}]",
            source_label.as_deref().unwrap_or("unlabelled")
        ),
    };

    let _ = writeln!(
        out,
        "Block {}  {}  by {}{}",
        block.sequence,
        format_time(&block.timestamp),
        block.creator,
        source
    );
    let _ = writeln!(out, "  Hash:      {}", block.hash_hex());
    if let Some(previous) = &block.previous_hash {
        let _ = writeln!(out, "  Previous:  {}", hex::encode(previous));
    }
    for entry in &block.entries {
        let _ = writeln!(
            out,
            "    {:<28} Dr {:>12}  Cr {:>12}  {}  {}{}",
            format!("{} / {}", entry.class, entry.subclass),
            entry.debit.to_string(),
            entry.credit.to_string(),
            entry.sender,
            entry.accounting_date.format("%Y-%m-%d"),
            entry
                .detail
                .as_deref()
                .map(|d| format!("  {}", d))
                .unwrap_or_default()
        );
        let signature = entry.signature.to_hex();
        let _ = writeln!(out, "      Sig: {}", &signature[..SIGNATURE_PREFIX]);
    }
    out
}
