use clap::{Arg, ArgAction, Command, value_parser};
use idml_mt::mt::{MachineTranslator, MockMode, MockTranslator, OpenAiTranslator, TranslationOptions};
use idml_mt::{Config, TranslateIdml, ZipIdmlRepository};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn command() -> Command {
    Command::new("idml-mt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Machine translation for InDesign IDML files")
        .arg(
            Arg::new("file")
                .help("IDML file to translate")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .index(1),
        )
        .arg(
            Arg::new("target-locale")
                .long("target")
                .short('t')
                .help("Target language code (default: TARGET_LOCALE or pl)"),
        )
        .arg(
            Arg::new("source-locale")
                .long("source")
                .short('s')
                .help("Source language code (default: SOURCE_LOCALE or en)"),
        )
        .arg(
            Arg::new("model")
                .long("model")
                .help("OpenAI model (default: OPENAI_MODEL or gpt-4o)"),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .short('m')
                .help("Use mock translator instead of OpenAI")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug-files")
                .long("debug-files")
                .help("Dump loaded and translated stories next to the file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("concurrency")
                .long("concurrency")
                .short('c')
                .help("Maximum concurrent translation requests")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log every step of the translation")
                .action(ArgAction::SetTrue),
        )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = match command().try_get_matches() {
        Ok(matches) => matches,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let verbose = matches.get_flag("verbose");
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("warn,idml_mt={}", level))),
        )
        .init();

    let mut config = Config::from_env()?;
    if let Some(target) = matches.get_one::<String>("target-locale") {
        config.target_locale = target.clone();
    }
    if let Some(source) = matches.get_one::<String>("source-locale") {
        config.source_locale = source.clone();
    }
    if let Some(model) = matches.get_one::<String>("model") {
        config.openai_model = model.clone();
    }
    if let Some(&concurrency) = matches.get_one::<usize>("concurrency") {
        config.concurrency = concurrency.max(1);
    }
    if matches.get_flag("debug-files") {
        config.debug_files = true;
    }

    let file = matches
        .get_one::<PathBuf>("file")
        .cloned()
        .ok_or("missing IDML file argument")?;

    let translator: Box<dyn MachineTranslator> = if matches.get_flag("mock") {
        Box::new(MockTranslator::new(MockMode::Suffix))
    } else {
        let api_key = match config.require_api_key() {
            Ok(key) => key.to_string(),
            Err(e) => {
                error!("{}", e);
                eprintln!("❌ OPENAI_API_KEY environment variable not set");
                eprintln!("   Set it with: export OPENAI_API_KEY=your_api_key");
                eprintln!("   Or use --mock to use mock translator");
                return Err(e.into());
            }
        };
        Box::new(
            OpenAiTranslator::new(api_key, config.openai_model.clone())?
                .with_base_url(config.openai_base_url.clone()),
        )
    };

    info!(
        provider = translator.provider_name(),
        source = %config.source_locale,
        target = %config.target_locale,
        "configured translator"
    );

    let repository = ZipIdmlRepository::new(config.debug_files);
    let options = TranslationOptions {
        source_locale: config.source_locale.clone(),
        target_locale: config.target_locale.clone(),
        concurrency: config.concurrency,
    };

    let outcome = match TranslateIdml::new(&repository, translator.as_ref(), options)
        .execute(&file)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, "translation failed");
            eprintln!("❌ Translation failed: {}", e);
            return Err(e.into());
        }
    };

    if verbose {
        println!("📦 {} stories, {} paragraphs", outcome.stories, outcome.units);
        println!(
            "🌍 {} paragraphs rewritten in {} stories",
            outcome.applied, outcome.updated_stories
        );
    }
    for mismatch in &outcome.mismatches {
        println!("⚠️  {}", mismatch);
    }
    println!("{}", outcome.output_path.display());

    Ok(())
}
