//! Command implementations

use crate::anonymizer::OperatorConfig;
use crate::config::MosaicConfig;
use crate::domain::Language;
use crate::engine::Engine;
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

/// Text source shared by the analyze and anonymize commands
#[derive(Args, Debug)]
pub struct TextInput {
    /// Text to process
    #[arg(short, long, conflicts_with = "file")]
    pub text: Option<String>,

    /// Read the text from a file instead
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

impl TextInput {
    fn read(&self) -> anyhow::Result<String> {
        match (&self.text, &self.file) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display())),
            (None, None) => anyhow::bail!("provide either --text or --file"),
        }
    }
}

/// Arguments for the analyze command
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub input: TextInput,

    /// Language of the text
    #[arg(short, long, default_value = "zh")]
    pub language: Language,

    /// Entity types to detect (comma-separated); all types when omitted
    #[arg(short, long, value_delimiter = ',')]
    pub entities: Option<Vec<String>>,

    /// Minimum score for reported results
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Exact span text to suppress (repeatable)
    #[arg(long = "allow")]
    pub allow_list: Vec<String>,
}

/// Arguments for the anonymize command
#[derive(Args, Debug)]
pub struct AnonymizeArgs {
    #[command(flatten)]
    pub input: TextInput,

    /// Language of the text
    #[arg(short, long, default_value = "zh")]
    pub language: Language,

    /// Entity types to detect (comma-separated); all types when omitted
    #[arg(short, long, value_delimiter = ',')]
    pub entities: Option<Vec<String>>,

    /// Minimum score for anonymized results
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Exact span text to suppress (repeatable)
    #[arg(long = "allow")]
    pub allow_list: Vec<String>,

    /// JSON file with operator configurations
    #[arg(short, long)]
    pub operators: Option<PathBuf>,

    /// Replace each span with a synthesized fake value instead of the
    /// configured operators (requires OPENAI_API_KEY)
    #[arg(long)]
    pub synthesize: bool,
}

/// Arguments for the entities command
#[derive(Args, Debug)]
pub struct EntitiesArgs {
    /// Language to list entity types for
    #[arg(short, long, default_value = "zh")]
    pub language: Language,
}

pub fn analyze(args: &AnalyzeArgs, config: &MosaicConfig) -> anyhow::Result<i32> {
    let text = args.input.read()?;
    let engine = Engine::new(config)?;

    let results = engine.analyze(
        &text,
        args.language,
        args.entities.as_deref(),
        args.threshold,
        &args.allow_list,
    )?;

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(0)
}

pub async fn anonymize(args: &AnonymizeArgs, config: &MosaicConfig) -> anyhow::Result<i32> {
    let text = args.input.read()?;
    let engine = Engine::new(config)?;

    let operators: Vec<OperatorConfig> = match &args.operators {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("invalid operator configuration in {}", path.display()))?
        }
        None => Vec::new(),
    };

    let output = engine
        .analyze_and_anonymize(
            &text,
            args.language,
            args.entities.as_deref(),
            args.threshold,
            &args.allow_list,
            &operators,
            args.synthesize,
        )
        .await?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(0)
}

pub fn entities(args: &EntitiesArgs, config: &MosaicConfig) -> anyhow::Result<i32> {
    let engine = Engine::new(config)?;
    let entities = engine.supported_entities(args.language)?;
    println!("{}", serde_json::to_string_pretty(&entities)?);
    Ok(0)
}

pub fn operators(config: &MosaicConfig) -> anyhow::Result<i32> {
    let engine = Engine::new(config)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&engine.supported_anonymizers())?
    );
    Ok(0)
}
