use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use limbic::evaluation::{EMOTION_SENTENCES, MIXED_SENTENCES, NEUTRAL_SENTENCES};
use limbic::{
    evaluate, render_prediction, render_report, shared_classifier, ArtifactManager, Classifier,
    NormalizationVariant, Normalizer, RuntimeConfig,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the model, vectorizer and mapping artifacts
    #[arg(long, global = true, env = "LIMBIC_ARTIFACTS")]
    artifacts_dir: Option<PathBuf>,

    /// Normalization variant (full or compact); defaults to the manifest's
    #[arg(long, global = true)]
    normalizer: Option<NormalizationVariant>,

    /// Check artifact hashes against the manifest before loading
    #[arg(long, global = true)]
    verify_hashes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify the given text, or each line of stdin when none is given
    Classify {
        text: Vec<String>,
        /// Emit JSON instead of bars
        #[arg(long)]
        json: bool,
        #[arg(long, default_value_t = 30)]
        width: usize,
    },
    /// Prompt for text until quit, exit or q
    Interactive {
        #[arg(long, default_value_t = 30)]
        width: usize,
    },
    /// Report which artifacts are present and verify the manifest
    Check,
    /// Run the built-in sentence battery
    Verify {
        #[arg(long)]
        json: bool,
    },
    /// Print the built-in sentence battery
    Sentences,
    /// Print text as the vectorizer sees it
    Normalize { text: Vec<String> },
}

impl Args {
    fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            artifacts_dir: self.artifacts_dir.clone(),
            normalization: self.normalizer,
            verify_hashes: self.verify_hashes,
        }
    }

    fn manager(&self) -> ArtifactManager {
        ArtifactManager::new(self.runtime_config().resolved_artifacts_dir())
    }

    fn classifier(&self) -> Result<&'static Classifier> {
        let start = Instant::now();
        let classifier = shared_classifier(&self.runtime_config())
            .context("Failed to load the emotion classifier")?;
        info!("Classifier ready in {:.2?}", start.elapsed());
        Ok(classifier)
    }
}

fn main() -> Result<()> {
    limbic::init_logger();
    let args = Args::parse();

    match &args.command {
        Command::Classify { text, json, width } => classify(&args, text, *json, *width),
        Command::Interactive { width } => interactive(args.classifier()?, *width),
        Command::Check => check(&args.manager()),
        Command::Verify { json } => {
            let report = evaluate(args.classifier()?)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_report(&report));
            }
            Ok(())
        }
        Command::Sentences => {
            print_sentences();
            Ok(())
        }
        Command::Normalize { text } => {
            let variant = match args.normalizer {
                Some(variant) => variant,
                None => args
                    .manager()
                    .load_manifest()?
                    .and_then(|m| m.normalizer)
                    .unwrap_or_default(),
            };
            let normalizer = Normalizer::new(variant);
            for line in inputs(text)? {
                println!("{}", normalizer.normalize(&line));
            }
            Ok(())
        }
    }
}

/// Joined arguments, or stdin line by line when there are none.
fn inputs(text: &[String]) -> Result<Vec<String>> {
    if !text.is_empty() {
        return Ok(vec![text.join(" ")]);
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer.lines().map(str::to_string).collect())
}

fn classify(args: &Args, text: &[String], json: bool, width: usize) -> Result<()> {
    let lines = inputs(text)?;
    if lines.iter().all(|l| l.trim().is_empty()) {
        warn!("No text to classify");
        eprintln!("Please enter some text!");
        return Ok(());
    }

    let classifier = args.classifier()?;
    let failed = classify_lines(classifier, &lines, json, width, &mut io::stdout().lock())?;
    if failed > 0 {
        bail!("{} of {} inputs could not be classified", failed, lines.len());
    }
    Ok(())
}

/// Classifies each non-blank line on its own. A failed prediction is reported
/// and skipped; returns how many failed.
fn classify_lines<W: Write>(
    classifier: &Classifier,
    lines: &[String],
    json: bool,
    width: usize,
    out: &mut W,
) -> Result<usize> {
    let mut failed = 0;
    for line in lines.iter().filter(|l| !l.trim().is_empty()) {
        let prediction = match classifier.predict(line) {
            Ok(prediction) => prediction,
            Err(e) => {
                eprintln!("Error during prediction for {:?}: {}", line, e);
                failed += 1;
                continue;
            }
        };
        if json {
            let record = serde_json::json!({ "text": line, "prediction": prediction });
            writeln!(out, "{}", serde_json::to_string(&record)?)?;
        } else {
            writeln!(out, "Text: {}", line)?;
            writeln!(out, "{}", render_prediction(&prediction, width))?;
        }
    }
    Ok(failed)
}

fn available_emotions(classifier: &Classifier) -> String {
    let names: Vec<&str> = classifier.labels().iter().map(|e| e.as_str()).collect();
    format!("Available emotions: {}", names.join(", "))
}

fn interactive(classifier: &Classifier, width: usize) -> Result<()> {
    println!("{}", available_emotions(classifier));
    println!("Interactive mode (type 'quit' to exit)");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("\nEnter text to classify: ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let input = line?;
        let input = input.trim();

        if matches!(input.to_lowercase().as_str(), "quit" | "exit" | "q") {
            break;
        }
        if input.is_empty() {
            println!("Please enter some text!");
            continue;
        }

        match classifier.predict(input) {
            Ok(prediction) => print!("{}", render_prediction(&prediction, width)),
            Err(e) => eprintln!("Error during prediction: {}", e),
        }
    }
    println!("Goodbye!");
    Ok(())
}

fn check(manager: &ArtifactManager) -> Result<()> {
    println!("Artifacts directory: {}", manager.artifacts_dir().display());
    for status in manager.check() {
        if status.exists {
            println!("  [ok]      {} ({} bytes)", status.kind, status.size_bytes.unwrap_or(0));
        } else {
            println!("  [missing] {}", status.kind);
        }
    }

    let missing = manager.missing();
    if !missing.is_empty() {
        bail!("{} of 3 artifacts missing", missing.len());
    }

    match manager.load_manifest()? {
        Some(_) => {
            let manifest = manager.verify()?;
            println!(
                "Manifest verified ({} files, normalizer: {})",
                manifest.files.len(),
                manifest
                    .normalizer
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "unspecified".into())
            );
        }
        None => println!("No manifest; hashes not checked"),
    }
    Ok(())
}

fn print_sentences() {
    let mut total = 0;
    for (emotion, sentences) in EMOTION_SENTENCES.iter() {
        println!("\n{} sentences:", emotion.title());
        for (i, sentence) in sentences.iter().enumerate() {
            println!("{:2}. {}", i + 1, sentence);
        }
        total += sentences.len();
    }

    println!("\nMixed sentences:");
    for (i, sentence) in MIXED_SENTENCES.iter().enumerate() {
        println!("{:2}. {}", i + 1, sentence);
    }
    println!("\nNeutral sentences:");
    for (i, sentence) in NEUTRAL_SENTENCES.iter().enumerate() {
        println!("{:2}. {}", i + 1, sentence);
    }

    println!("\nEmotion-specific sentences: {}", total);
    println!("Mixed sentences: {}", MIXED_SENTENCES.len());
    println!("Neutral sentences: {}", NEUTRAL_SENTENCES.len());
    println!(
        "Total: {}",
        total + MIXED_SENTENCES.len() + NEUTRAL_SENTENCES.len()
    );
}
