use anyhow::{anyhow, Result};
use chaptergen::chapters::{render_chapter_list, validate_completion, Chapter};
use chaptergen::metadata::{extract_video_metadata, fetch_video_metadata, parse_watch_url};
use chaptergen::{create_provider, ChapterGenerator, Config, ValidationProfile, VideoMetadata};
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let lenient = Arg::new("lenient")
        .long("lenient")
        .help("Skip zero-start, balance and title checks")
        .action(clap::ArgAction::SetTrue);
    let json = Arg::new("json")
        .long("json")
        .help("Print chapters as JSON")
        .action(clap::ArgAction::SetTrue);
    let duration = Arg::new("duration")
        .long("duration")
        .value_name("SECONDS")
        .help("Video duration in seconds")
        .value_parser(clap::value_parser!(u32).range(1..))
        .required(true);

    Command::new("chaptergen")
        .version(env!("CARGO_PKG_VERSION"))
        .author("TigreRoll")
        .about("Generate and validate video chapters with an LLM")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file")
                .global(true)
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .global(true)
                .action(clap::ArgAction::SetTrue)
        )
        .subcommand(
            Command::new("generate")
                .about("Generate chapters for a video through the configured provider")
                .arg(
                    Arg::new("title")
                        .short('t')
                        .long("title")
                        .value_name("TITLE")
                        .help("Video title")
                        .required(true)
                )
                .arg(duration.clone())
                .arg(
                    Arg::new("transcript-file")
                        .long("transcript-file")
                        .value_name("FILE")
                        .help("File containing the video transcript")
                )
                .arg(
                    Arg::new("description")
                        .long("description")
                        .value_name("TEXT")
                        .help("Video description")
                )
                .arg(lenient.clone())
                .arg(json.clone())
        )
        .subcommand(
            Command::new("validate")
                .about("Validate a saved model completion without calling a provider")
                .arg(
                    Arg::new("file")
                        .value_name("FILE")
                        .help("File containing `MM:SS - Title` lines")
                        .required(true)
                )
                .arg(duration)
                .arg(lenient)
                .arg(json)
        )
        .subcommand(
            Command::new("extract")
                .about("Extract video metadata from a saved watch page or a watch URL")
                .arg(
                    Arg::new("source")
                        .value_name("FILE_OR_URL")
                        .help("Saved watch page HTML or https://www.youtube.com/watch?v=... URL")
                        .required(true)
                )
        )
        .subcommand(
            Command::new("serve")
                .about("Run the HTTP API (requires the `api` feature)")
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .value_name("PORT")
                        .help("Port to listen on")
                        .value_parser(clap::value_parser!(u16))
                )
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    let config = match matches.get_one::<String>("config") {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            eprintln!("Failed to load config, using defaults: {}", e);
            Config::default()
        }),
    };

    let directive = if matches.get_flag("verbose") {
        "chaptergen=debug,warn".to_string()
    } else {
        config.logging.filter_directive()
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive)))
        .init();

    let result = match matches.subcommand() {
        Some(("generate", sub)) => run_generate(config, sub).await,
        Some(("validate", sub)) => run_validate(&config, sub).await,
        Some(("extract", sub)) => run_extract(&config, sub).await,
        Some(("serve", sub)) => run_serve(config, sub).await,
        _ => Err(anyhow!("Unknown command")),
    };

    if let Err(e) = &result {
        error!("{}", e);
    }
    result
}

fn profile_for(config: &Config, matches: &ArgMatches) -> ValidationProfile {
    if matches.get_flag("lenient") {
        ValidationProfile::lenient()
    } else {
        config.validation.clone()
    }
}

fn required<'a, T: Clone + Send + Sync + 'static>(matches: &'a ArgMatches, name: &str) -> Result<&'a T> {
    matches
        .get_one::<T>(name)
        .ok_or_else(|| anyhow!("Missing required argument: {}", name))
}

fn build_generator(config: &Config, profile: ValidationProfile) -> Result<ChapterGenerator> {
    config.validate()?;
    let provider = create_provider(&config.llm)?;
    info!("🤖 Using {:?} provider with model {}", config.llm.provider, config.llm.model);

    Ok(ChapterGenerator::new(provider)
        .with_settings(config.generation.clone())
        .with_profile(profile)
        .with_sampling(config.llm.sampling.clone()))
}

fn print_chapters(chapters: &[Chapter], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(chapters)?);
    } else {
        println!("{}", render_chapter_list(chapters));
    }
    Ok(())
}

async fn run_generate(config: Config, matches: &ArgMatches) -> Result<()> {
    let title = required::<String>(matches, "title")?;
    let duration = *required::<u32>(matches, "duration")?;

    let mut metadata = VideoMetadata::new(title.clone(), duration);
    if let Some(path) = matches.get_one::<String>("transcript-file") {
        metadata.transcript = Some(tokio::fs::read_to_string(path).await?);
    }
    if let Some(description) = matches.get_one::<String>("description") {
        metadata.description = Some(description.clone());
    }
    if !metadata.has_content() {
        return Err(anyhow!("Either --transcript-file or --description must be provided"));
    }

    let generator = build_generator(&config, profile_for(&config, matches))?;
    let chapters = generator.generate(&metadata).await?;

    print_chapters(&chapters, matches.get_flag("json"))
}

async fn run_validate(config: &Config, matches: &ArgMatches) -> Result<()> {
    let path = PathBuf::from(required::<String>(matches, "file")?);
    let duration = *required::<u32>(matches, "duration")?;
    let profile = profile_for(config, matches);

    let text = tokio::fs::read_to_string(&path).await?;
    info!("🔍 Validating {} against a {}s video", path.display(), duration);

    match validate_completion(&text, duration, &profile) {
        Ok(chapters) => {
            info!("✅ {} chapters passed validation", chapters.len());
            print_chapters(&chapters, matches.get_flag("json"))
        }
        Err(e) => {
            warn!("❌ {:?}: {}", e.kind(), e);
            Err(e.into())
        }
    }
}

async fn run_extract(config: &Config, matches: &ArgMatches) -> Result<()> {
    let source = required::<String>(matches, "source")?;

    let metadata = if parse_watch_url(source).is_some() {
        fetch_video_metadata(source, config.generation.request_timeout_seconds).await?
    } else {
        let html = tokio::fs::read_to_string(source).await?;
        extract_video_metadata(&html)?
    };

    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}

#[cfg(feature = "api")]
async fn run_serve(mut config: Config, matches: &ArgMatches) -> Result<()> {
    use chaptergen::api::ApiServer;
    use std::sync::Arc;

    if let Some(port) = matches.get_one::<u16>("port") {
        config.server.port = *port;
    }
    config.validate_for_server()?;
    info!("{}", config.summary());

    let generator = Arc::new(build_generator(&config, config.validation.clone())?);
    ApiServer::new(generator, config.server.clone()).start().await
}

#[cfg(not(feature = "api"))]
async fn run_serve(_config: Config, _matches: &ArgMatches) -> Result<()> {
    Err(anyhow!("chaptergen was built without the `api` feature"))
}
