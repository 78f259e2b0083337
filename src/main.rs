//! Sealed VFS - an encrypted virtual file system in a directory.
//!
//! Every file, directory and piece of metadata is sealed with AES-256-GCM
//! under a key derived from the passphrase.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sealed_vfs::config::{argon2_params, DEFAULT_BLOCK_SIZE};
use sealed_vfs::{KdfParams, Store, StoreConfig};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sealed-vfs")]
#[command(author, version, long_about = None)]
#[command(about = "Encrypted virtual file system stored in a single directory")]
struct Cli {
    /// Store directory
    #[arg(short, long, global = true, env = "SEALED_VFS_STORE", default_value = ".")]
    store: PathBuf,

    /// Passphrase (prompted for when not given)
    #[arg(long, global = true, env = "SEALED_VFS_PASSPHRASE", hide_env_values = true)]
    passphrase: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new store
    Init {
        /// Content block size in bytes (power of two)
        #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
        block_size: u32,

        /// Argon2id memory cost in KiB
        #[arg(long, default_value_t = argon2_params::MEMORY_COST)]
        kdf_memory: u32,

        /// Argon2id iterations
        #[arg(long, default_value_t = argon2_params::TIME_COST)]
        kdf_iterations: u32,

        /// Argon2id lanes
        #[arg(long, default_value_t = argon2_params::PARALLELISM)]
        kdf_parallelism: u32,
    },

    /// List directory contents
    Ls {
        /// Store path to list
        #[arg(default_value = "/")]
        path: String,
    },

    /// Create a directory
    Mkdir {
        path: String,

        /// Create missing parent directories
        #[arg(short, long)]
        parents: bool,
    },

    /// Write to a file, creating it if needed
    Write {
        path: String,

        /// Input file (default: stdin)
        #[arg(long, conflicts_with = "data")]
        input: Option<PathBuf>,

        /// String data to write
        #[arg(long, conflicts_with = "input")]
        data: Option<String>,

        /// Byte offset to write at
        #[arg(long, default_value_t = 0)]
        offset: u64,
    },

    /// Print a file
    Cat {
        path: String,

        /// Byte offset to start at
        #[arg(long, default_value_t = 0)]
        offset: u64,

        /// Number of bytes (default: to end of file)
        #[arg(long)]
        len: Option<u64>,

        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Remove a file or empty directory
    Rm { path: String },

    /// Move or rename
    Mv { from: String, to: String },

    /// Truncate or zero-extend a file
    Truncate { path: String, len: u64 },

    /// Copy a host file or directory into the store
    Import { host: PathBuf, path: String },

    /// Copy a store file or directory out to the host
    Export { path: String, host: PathBuf },

    /// Show file or directory details
    Stat { path: String },

    /// Manage per-node metadata
    Meta {
        #[command(subcommand)]
        action: MetaAction,
    },

    /// Manage tags
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },

    /// Show store summary
    Info,

    /// Authenticate every block in the store
    Verify,

    /// Change the store passphrase
    Passwd {
        /// New passphrase (prompted for when not given)
        #[arg(long, env = "SEALED_VFS_NEW_PASSPHRASE", hide_env_values = true)]
        new_passphrase: Option<String>,
    },
}

#[derive(Subcommand)]
enum MetaAction {
    Set { path: String, key: String, value: String },
    Get { path: String, key: String },
    List { path: String },
    Rm { path: String, key: String },
}

#[derive(Subcommand)]
enum TagAction {
    Add { path: String, tags: Vec<String> },
    Rm { path: String, tags: Vec<String> },
    Get { path: String },
    Clear { path: String },
    List,
    /// Find paths carrying all terms; prefix a term with ! to exclude it
    Search {
        #[arg(required = true, allow_hyphen_values = true)]
        terms: Vec<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sealed_vfs=warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init {
            block_size,
            kdf_memory,
            kdf_iterations,
            kdf_parallelism,
        } => {
            let kdf = KdfParams {
                memory_kib: kdf_memory,
                iterations: kdf_iterations,
                parallelism: kdf_parallelism,
            };
            cmd_init(&cli.store, cli.passphrase, StoreConfig::new(block_size, kdf))
        }
        command => run_open(&cli.store, cli.passphrase, command),
    }
}

fn run_open(location: &Path, passphrase: Option<String>, command: Commands) -> Result<()> {
    let passphrase = match passphrase {
        Some(p) => p,
        None => prompt_passphrase("Passphrase: ")?,
    };
    let mut store = Store::open(location, &passphrase)
        .with_context(|| format!("opening store {}", location.display()))?;

    match command {
        Commands::Init { .. } => bail!("store already initialized"),
        Commands::Ls { path } => cmd_ls(&store, &path)?,
        Commands::Mkdir { path, parents } => {
            if parents {
                store.create_dir_all(&path)?;
            } else {
                store.mkdir(&path)?;
            }
            println!("Created directory {}", path);
        }
        Commands::Write {
            path,
            input,
            data,
            offset,
        } => {
            let content = match (input, data) {
                (Some(file), _) => std::fs::read(&file)
                    .with_context(|| format!("reading {}", file.display()))?,
                (None, Some(s)) => s.into_bytes(),
                (None, None) => {
                    let mut buffer = Vec::new();
                    io::stdin().read_to_end(&mut buffer)?;
                    buffer
                }
            };
            store.write_file(&path, offset, &content)?;
            println!("Wrote {} bytes to {}", content.len(), path);
        }
        Commands::Cat {
            path,
            offset,
            len,
            output,
        } => cmd_cat(&store, &path, offset, len, output)?,
        Commands::Rm { path } => {
            store.remove(&path)?;
            println!("Removed {}", path);
        }
        Commands::Mv { from, to } => {
            store.rename(&from, &to)?;
            println!("Moved {} -> {}", from, to);
        }
        Commands::Truncate { path, len } => {
            store.truncate(&path, len)?;
            println!("Truncated {} to {} bytes", path, len);
        }
        Commands::Import { host, path } => {
            let count = store.import(&host, &path)?;
            println!("Imported {} file(s) into {}", count, path);
        }
        Commands::Export { path, host } => {
            let count = store.export(&path, &host)?;
            println!("Exported {} file(s) to {}", count, host.display());
        }
        Commands::Stat { path } => {
            let info = store.stat(&path)?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Commands::Meta { action } => cmd_meta(&mut store, action)?,
        Commands::Tag { action } => cmd_tag(&mut store, action)?,
        Commands::Info => {
            let info = store.info()?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Commands::Verify => cmd_verify(&store)?,
        Commands::Passwd { new_passphrase } => {
            let new_passphrase = match new_passphrase {
                Some(p) => p,
                None => prompt_new_passphrase()?,
            };
            store.change_passphrase(&new_passphrase)?;
            println!("Passphrase changed");
        }
    }

    store.close().context("committing changes")?;
    Ok(())
}

fn prompt_passphrase(prompt: &str) -> Result<String> {
    rpassword::prompt_password(prompt).context("reading passphrase")
}

fn prompt_new_passphrase() -> Result<String> {
    let passphrase = prompt_passphrase("New passphrase: ")?;
    let confirm = prompt_passphrase("Confirm passphrase: ")?;
    if passphrase != confirm {
        bail!("passphrases do not match");
    }
    Ok(passphrase)
}

fn cmd_init(location: &Path, passphrase: Option<String>, config: StoreConfig) -> Result<()> {
    let passphrase = match passphrase {
        Some(p) => p,
        None => prompt_new_passphrase()?,
    };

    let mut store = Store::create(location, &passphrase, config)
        .with_context(|| format!("creating store {}", location.display()))?;
    let info = store.info()?;
    store.close()?;

    println!("Store initialized in {}", info.location.display());
    println!("  Block size: {} bytes", info.block_size);
    println!(
        "  KDF:        Argon2id, {} KiB, {} iterations, {} lanes",
        info.kdf.memory_kib, info.kdf.iterations, info.kdf.parallelism
    );
    Ok(())
}

fn cmd_ls(store: &Store, path: &str) -> Result<()> {
    let entries = store.list(path)?;

    if entries.is_empty() {
        println!("(empty)");
        return Ok(());
    }
    for entry in entries {
        let (type_char, size) = if entry.is_dir() {
            ('d', "-".to_string())
        } else {
            ('-', entry.size.to_string())
        };
        println!("{} {:>10}  {}", type_char, size, entry.name);
    }
    Ok(())
}

fn cmd_cat(
    store: &Store,
    path: &str,
    offset: u64,
    len: Option<u64>,
    output: Option<PathBuf>,
) -> Result<()> {
    let len = match len {
        Some(len) => len,
        None => store.stat(path)?.size.saturating_sub(offset),
    };
    let data = store.read_file(path, offset, len)?;

    match output {
        Some(file) => {
            std::fs::write(&file, &data)?;
            println!("Wrote {} bytes to {}", data.len(), file.display());
        }
        None => io::stdout().write_all(&data)?,
    }
    Ok(())
}

fn cmd_meta(store: &mut Store, action: MetaAction) -> Result<()> {
    match action {
        MetaAction::Set { path, key, value } => store.metadata_set(&path, &key, &value)?,
        MetaAction::Get { path, key } => println!("{}", store.metadata_get(&path, &key)?),
        MetaAction::List { path } => {
            let metadata = store.metadata_list(&path)?;
            println!("{}", serde_json::to_string_pretty(&metadata)?);
        }
        MetaAction::Rm { path, key } => store.metadata_remove(&path, &key)?,
    }
    Ok(())
}

fn cmd_tag(store: &mut Store, action: TagAction) -> Result<()> {
    match action {
        TagAction::Add { path, tags } => {
            for tag in tags {
                store.tag_add(&path, &tag)?;
            }
        }
        TagAction::Rm { path, tags } => {
            for tag in tags {
                store.tag_remove(&path, &tag)?;
            }
        }
        TagAction::Get { path } => {
            for tag in store.tag_get(&path)? {
                println!("{}", tag);
            }
        }
        TagAction::Clear { path } => store.tag_clear(&path)?,
        TagAction::List => {
            for tag in store.tag_list()? {
                println!("{}", tag);
            }
        }
        TagAction::Search { terms } => {
            for path in store.tag_search(&terms)? {
                println!("{}", path);
            }
        }
    }
    Ok(())
}

fn cmd_verify(store: &Store) -> Result<()> {
    let report = store.verify()?;

    println!("Store Health Report");
    println!("===================");
    println!("Files:          {}", report.total_files);
    println!("Intact:         {}", report.intact_files);
    println!("Blocks checked: {}", report.blocks_checked);

    if report.is_healthy() {
        println!();
        println!("All files authenticated");
        return Ok(());
    }

    println!();
    println!("Damaged Files:");
    for (path, reason) in &report.damaged_files {
        println!("  {} ({})", path, reason);
    }
    bail!("{} damaged file(s)", report.damaged_files.len())
}
