use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use adforge::{
    AdConfig, AdforgeConfig, BatchCompositor, BatchEvent, Catalog, Compositor, FileStorage,
    TemplateStore,
};

#[derive(Parser, Debug)]
#[command(name = "adforge", version, about = "Compose ad templates into images")]
struct Cli {
    /// JSON settings file (every key optional).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `adforge=trace`. Overrides the settings file.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the built-in platforms and ad sizes.
    Catalog(CatalogArgs),
    /// Expand a campaign config into one ad per size and export them.
    Generate(GenerateArgs),
    /// Composite a single template JSON into an image.
    Render(RenderArgs),
    /// Manage the persisted template list.
    Store(StoreArgs),
}

#[derive(Parser, Debug)]
struct CatalogArgs {
    /// Only this platform id (e.g. `google`).
    #[arg(long)]
    platform: Option<String>,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Campaign config JSON (`name`, `title`, `subtitle`, `buttonText`, `platforms`, ...).
    #[arg(long)]
    config: PathBuf,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Write template JSON files instead of images.
    #[arg(long, default_value_t = false)]
    templates_only: bool,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Template JSON in the exchange format.
    #[arg(long)]
    template: PathBuf,

    /// Output image path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct StoreArgs {
    /// Store directory (defaults to the settings value).
    #[arg(long)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    action: StoreAction,
}

#[derive(Subcommand, Debug)]
enum StoreAction {
    /// Print stored templates.
    List,
    /// Append a template JSON file.
    Import { file: PathBuf },
    /// Write a stored template to a directory.
    Export {
        id: String,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Remove a stored template.
    Delete { id: String },
    /// Remove every stored template.
    Clear,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = match &cli.settings {
        Some(path) => AdforgeConfig::from_path(path)?,
        None => AdforgeConfig::default(),
    };
    if let Some(level) = cli.log_level {
        settings.logging.level = level;
    }
    adforge::logging::init_logging(&settings.logging);

    match cli.cmd {
        Command::Catalog(args) => cmd_catalog(args),
        Command::Generate(args) => cmd_generate(args, &settings),
        Command::Render(args) => cmd_render(args, &settings),
        Command::Store(args) => cmd_store(args, &settings),
    }
}

fn cmd_catalog(args: CatalogArgs) -> anyhow::Result<()> {
    let catalog = Catalog::builtin();
    let platforms: Vec<_> = catalog
        .platforms
        .iter()
        .filter(|p| args.platform.as_deref().is_none_or(|id| p.id == id))
        .collect();
    if platforms.is_empty() {
        anyhow::bail!(
            "unknown platform '{}'",
            args.platform.unwrap_or_default()
        );
    }
    for p in platforms {
        println!("{} {} ({})", p.icon, p.name, p.id);
        for s in &p.sizes {
            println!(
                "  {:<24} {:>9}  {} - {}",
                s.id,
                s.dimensions_label(),
                s.name,
                s.description
            );
        }
    }
    Ok(())
}

fn cmd_generate(args: GenerateArgs, settings: &AdforgeConfig) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.config)
        .with_context(|| format!("read config '{}'", args.config.display()))?;
    let config: AdConfig = serde_json::from_str(&text)
        .with_context(|| format!("parse config '{}'", args.config.display()))?;

    let templates = adforge::generate(&config, &Catalog::builtin());
    if templates.is_empty() {
        anyhow::bail!("no ad sizes match the configured platforms/sizes");
    }
    create_dir(&args.out)?;

    if args.templates_only {
        for t in &templates {
            let path = args.out.join(format!("{}.json", t.id));
            std::fs::write(&path, adforge::export_json(t)?)
                .with_context(|| format!("write '{}'", path.display()))?;
        }
        eprintln!("wrote {} templates to {}", templates.len(), args.out.display());
        return Ok(());
    }

    let batch = BatchCompositor::new(Compositor::new(settings.compositor.clone()));
    let mut ads = Vec::new();
    for event in batch.run(templates) {
        match event {
            BatchEvent::Progress(p) => {
                eprintln!("[{:>3.0}%] {}/{}", p.percent, p.completed, p.total);
            }
            BatchEvent::Finished(done) => ads = done,
        }
    }

    let written = adforge::write_generated_ads(&args.out, &ads)?;
    let failed = ads.len() - written.len();
    eprintln!("wrote {} images to {}", written.len(), args.out.display());
    if failed > 0 {
        anyhow::bail!("{failed} ads failed to render");
    }
    Ok(())
}

fn cmd_render(args: RenderArgs, settings: &AdforgeConfig) -> anyhow::Result<()> {
    let template = adforge::import_file(&args.template)?;
    if let Err(e) = template.validate() {
        tracing::warn!(error = %e, "template does not pass validation, rendering anyway");
    }

    let compositor = Compositor::new(settings.compositor.clone());
    let encoded = compositor.composite(&template)?;

    if let Some(parent) = args.out.parent() {
        create_dir(parent)?;
    }
    std::fs::write(&args.out, &encoded.bytes)
        .with_context(|| format!("write image '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_store(args: StoreArgs, settings: &AdforgeConfig) -> anyhow::Result<()> {
    let dir = args.dir.unwrap_or_else(|| settings.storage.dir.clone());
    let backend = FileStorage::new(dir).with_retry(settings.storage.retry);
    let store = TemplateStore::with_key(backend, settings.storage.key.clone());

    match args.action {
        StoreAction::List => {
            for t in store.list() {
                println!("{}\t{}\t{}", t.id, t.dimensions_label(), t.name);
            }
        }
        StoreAction::Import { file } => {
            let template = adforge::import_file(&file)?;
            adforge::validate_template(&template)?;
            store.append(template);
        }
        StoreAction::Export { id, out } => {
            let template = store
                .get(&id)
                .with_context(|| format!("no stored template with id '{id}'"))?;
            let path = adforge::export_to_dir(&template, &out)?;
            eprintln!("wrote {}", path.display());
        }
        StoreAction::Delete { id } => store.delete(&id),
        StoreAction::Clear => store.clear(),
    }

    if let Some(report) = store.last_error() {
        anyhow::bail!("{report}");
    }
    Ok(())
}

fn create_dir(dir: &Path) -> anyhow::Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(dir).with_context(|| format!("create output dir '{}'", dir.display()))
}
