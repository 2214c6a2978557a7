// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and hands off to Layer 2. The only
// output printed here is the final result of each command.

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{BuildVocabArgs, Commands, PrepareArgs, ScoreArgs};

#[derive(Parser, Debug)]
#[command(
    name = "encodec-asr",
    version,
    about = "Prepare EnCodec unit / transcript pairs for seq2seq ASR training and score transcripts by WER."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Prepare(args)    => run_prepare(args),
            Commands::Score(args)      => run_score(args),
            Commands::BuildVocab(args) => run_build_vocab(args),
        }
    }
}

fn run_prepare(args: PrepareArgs) -> Result<()> {
    use crate::application::prepare_use_case::PrepareUseCase;

    tracing::info!("Preparing split '{}' from '{}'", args.split, args.data_dir.display());
    let report = PrepareUseCase::new(args.into_config()?).execute()?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_score(args: ScoreArgs) -> Result<()> {
    use crate::application::score_use_case::ScoreUseCase;

    let evaluation = ScoreUseCase::new(args.into_config()?).execute()?;

    println!("{}", serde_json::json!({ "wer": evaluation.wer }));
    Ok(())
}

fn run_build_vocab(args: BuildVocabArgs) -> Result<()> {
    use crate::application::build_vocab_use_case::BuildVocabUseCase;

    let output = args.output_dir.clone();
    let size = BuildVocabUseCase::new(args.into_config()?).execute()?;

    println!("Tokenizer with {} entries saved to '{}'", size, output.join("tokenizer.json").display());
    Ok(())
}
