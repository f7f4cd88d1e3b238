use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use locsmith::orchestrator::Orchestrator;
use locsmith::{
    AutoTranslator, Config, HttpTranslator, LocaleCatalog, LocaleHandle, ManualTranslator,
    ResourceManager, TranslationCache,
};

struct Args {
    source: PathBuf,
    languages: Vec<String>,
    output_dir: PathBuf,
    manual: bool,
}

fn parse_args() -> Result<Args> {
    let mut positional = Vec::new();
    let mut manual = false;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--manual" => manual = true,
            other if other.starts_with("--") => bail!("unknown flag {other:?}"),
            other => positional.push(other.to_string()),
        }
    }

    let [source, languages, output_dir] = positional.try_into().map_err(|_| {
        anyhow::anyhow!(
            "usage: locsmith <source.properties> <language,language,...> <output-dir> [--manual]"
        )
    })?;

    Ok(Args {
        source: PathBuf::from(source),
        languages: languages
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        output_dir: PathBuf::from(output_dir),
        manual,
    })
}

async fn run(args: Args) -> Result<()> {
    // Manual mode needs no service credentials, so the full config is only
    // loaded for automatic translation.
    let default_locale_code =
        std::env::var("DEFAULT_LOCALE").unwrap_or_else(|_| "en-US".to_string());

    let catalog = Arc::new(LocaleCatalog::builtin());
    let default_locale = LocaleHandle::from_code(&catalog, &default_locale_code)
        .with_context(|| format!("invalid DEFAULT_LOCALE {default_locale_code:?}"))?;

    let mut manager = ResourceManager::new(catalog, default_locale);
    manager
        .input(&args.source)
        .with_context(|| format!("failed to ingest {:?}", args.source))?;

    for language in &args.languages {
        manager
            .new_target(language, false)
            .with_context(|| format!("failed to create target for {language:?}"))?;
    }
    manager.set_target_directory(&args.output_dir);

    let orchestrator: Box<dyn Orchestrator> = if args.manual {
        info!("manual mode: targets receive source content for hand translation");
        Box::new(ManualTranslator)
    } else {
        let config = Config::from_env()?;
        let cache = TranslationCache::new(Path::new(&config.cache_path));
        let service = HttpTranslator::new(&config)?;
        Box::new(AutoTranslator::new(cache, service))
    };

    info!(
        "translating {:?} into {} target(s)",
        args.source,
        args.languages.len()
    );
    manager.translate_all(orchestrator.as_ref()).await?;

    if !manager.verify_complete() {
        warn!("some targets were incomplete and have been repaired with empty values");
    }

    let report = match manager.save_all() {
        Ok(report) => report,
        Err(failure) => {
            // Renamed-on-conflict signals survive a partial failure.
            report_renames(&failure.report);
            return Err(failure.into());
        }
    };
    info!("wrote {} file(s) to {:?}", report.written, args.output_dir);
    report_renames(&report);

    Ok(())
}

fn report_renames(report: &locsmith::SaveReport) {
    for renamed in &report.renamed {
        warn!(
            "default target collided with an existing file, saved as {:?} ({})",
            renamed.path, renamed.locale_code
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("locsmith=info")),
        )
        .init();

    let args = parse_args()?;
    run(args).await
}
