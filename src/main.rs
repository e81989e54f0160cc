use clap::Parser;
use log::info;

use brutesynth::memory::Calculator;
use brutesynth::{DataSample, LearnerConfig, SupervisedLearning, Value};

/// Finds a calculator program mapping the training inputs to their outputs.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Training pairs, written `input:output`
    #[arg(short, long, value_delimiter = ',', value_parser = parse_pair, required = true)]
    train: Vec<(i64, i64)>,

    /// Inputs to run the learned program on
    #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
    predict: Vec<i64>,

    #[arg(long, default_value_t = LearnerConfig::default().max_length)]
    max_length: usize,

    #[arg(long, default_value_t = 1.0)]
    accepted_score: f64,

    /// Operation ceiling per run, 0 for none
    #[arg(long, default_value_t = 100)]
    max_operations: u64,
}

fn parse_pair(s: &str) -> Result<(i64, i64), String> {
    let (input, output) = s.split_once(':')
        .ok_or_else(|| format!("expected `input:output`, got `{s}`"))?;
    let parse = |x: &str| x.trim().parse::<i64>().map_err(|e| format!("`{x}`: {e}"));

    Ok((parse(input)?, parse(output)?))
}

fn main() -> Result<(), brutesynth::Error> {
    colog::init();

    let cli = Cli::parse();
    let config = LearnerConfig {
        max_length: cli.max_length,
        accepted_score: cli.accepted_score,
        max_operations: (cli.max_operations > 0).then_some(cli.max_operations),
    };
    let samples: Vec<_> = cli.train.iter()
        .map(|(input, output)| DataSample::new(*input, *output))
        .collect();

    info!("Started");

    let mut learner = SupervisedLearning::new(Calculator::default(), config);
    let report = learner.fit(&samples)?;

    match learner.best_program() {
        Some(program) => println!("Best program (score {}):\n{program}", report.best_score),
        None => println!("No program reproduces any of the examples"),
    }

    for input in cli.predict {
        match learner.predict(&Value::Int(input))? {
            Some(output) => println!("{input} -> {output}"),
            None => println!("{input} -> ?"),
        }
    }

    Ok(())
}
