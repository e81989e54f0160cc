use log::{debug, info, trace};

use crate::error::Error;
use crate::event::{EventDispatcher, ExecutionEvent, PRE_STRATEGY_EXECUTION};
use crate::memory::Memory;
use crate::program::{Budget, Program};
use crate::synth::brute_enum::{BruteForce, DEFAULT_MAX_LENGTH};
use crate::synth::Synthesizer;
use crate::value::{same, Value};

/// An input together with the output it is expected to produce.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSample {
    input: Value,
    output: Value,
}

impl DataSample {
    pub fn new(input: impl Into<Value>, output: impl Into<Value>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }

    pub fn input(&self) -> &Value {
        &self.input
    }

    pub fn output(&self) -> &Value {
        &self.output
    }

    /// Reads a sample out of a map with `input` and `output` keys.
    pub fn from_record(record: &Value) -> Result<Self, Error> {
        let map = record.as_map();
        let input = map.and_then(|m| m.get("input")).ok_or(Error::MissingKey("input"))?;
        let output = map.and_then(|m| m.get("output")).ok_or(Error::MissingKey("output"))?;

        Ok(Self::new(input.clone(), output.clone()))
    }

    pub fn from_records(records: &[Value]) -> Result<Vec<Self>, Error> {
        records.iter().map(Self::from_record).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LearnerConfig {
    /// Longest program the default enumerator tries.
    pub max_length: usize,
    /// Fitting stops as soon as a program scores at least this much.
    pub accepted_score: f64,
    /// Operation ceiling for a single run; `None` for no ceiling.
    pub max_operations: Option<u64>,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            accepted_score: 1.0,
            max_operations: Some(100),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FitReport {
    /// How many candidates were drawn from the synthesizer.
    pub evaluated: usize,
    pub best_score: f64,
    /// Whether a candidate reached the accepted score.
    pub accepted: bool,
}

pub type Transform = Box<dyn Fn(Value) -> Value>;

/// Learns a program for a memory from labeled examples and replays it.
pub struct SupervisedLearning<M> {
    memory: M,
    config: LearnerConfig,
    preprocess_input: Transform,
    preprocess_output: Transform,
    postprocess_output: Transform,
    best_program: Option<Program<M>>,
    best_score: f64,
    dispatcher: EventDispatcher<M>,
}

impl<M: Memory> SupervisedLearning<M> {
    pub fn new(memory: M, config: LearnerConfig) -> Self {
        Self {
            memory,
            config,
            preprocess_input: Box::new(|x| x),
            preprocess_output: Box::new(|x| x),
            postprocess_output: Box::new(|x| x),
            best_program: None,
            best_score: 0.0,
            dispatcher: EventDispatcher::new(),
        }
    }

    pub fn with_preprocess_input(mut self, f: impl Fn(Value) -> Value + 'static) -> Self {
        self.preprocess_input = Box::new(f);
        self
    }

    pub fn with_preprocess_output(mut self, f: impl Fn(Value) -> Value + 'static) -> Self {
        self.preprocess_output = Box::new(f);
        self
    }

    pub fn with_postprocess_output(mut self, f: impl Fn(Value) -> Value + 'static) -> Self {
        self.postprocess_output = Box::new(f);
        self
    }

    pub fn add_event_listener<F>(&mut self, event: impl Into<String>, listener: F)
    where
        F: for<'a> FnMut(&mut ExecutionEvent<'a, M>) + 'static,
    {
        self.dispatcher.add_event_listener(event, listener);
    }

    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    pub fn best_program(&self) -> Option<&Program<M>> {
        self.best_program.as_ref()
    }

    pub fn best_score(&self) -> f64 {
        self.best_score
    }

    /// Searches every program up to the configured length over the memory's
    /// current vocabulary.
    pub fn fit(&mut self, data: &[DataSample]) -> Result<FitReport, Error> {
        let synth = BruteForce::from_memory(&self.memory, self.config.max_length);
        self.fit_with(data, synth)
    }

    /// Scores the candidates of `synth` in order and keeps the best one.
    /// Stops drawing candidates once one reaches the accepted score.
    pub fn fit_with<S>(&mut self, data: &[DataSample], mut synth: S) -> Result<FitReport, Error>
    where
        S: Synthesizer<M>,
    {
        if data.is_empty() {
            return Err(Error::NoExamples);
        }

        let samples = self.preprocess(data);
        for sample in &samples {
            synth.learn(sample);
        }

        info!("Fitting on {} samples", samples.len());

        self.best_program = None;
        self.best_score = 0.0;
        let mut report = FitReport::default();

        while let Some(program) = synth.next_program() {
            report.evaluated += 1;
            let score = self.score(&program, &samples)?;
            trace!("Score {score} for {program:?}");

            if score > self.best_score {
                debug!("New best score {score}: {program:?}");
                self.best_score = score;
                self.best_program = Some(program);

                if score >= self.config.accepted_score {
                    report.accepted = true;
                    break;
                }
            }
        }

        report.best_score = self.best_score;
        info!(
            "Done after {} candidates, best score {}",
            report.evaluated, report.best_score,
        );

        Ok(report)
    }

    /// Runs the best program found so far on `input`. `None` if there is no
    /// such program.
    pub fn predict(&mut self, input: &Value) -> Result<Option<Value>, Error> {
        let Some(program) = self.best_program.take() else {
            return Ok(None);
        };

        let res = self.predict_with(input, &program);
        self.best_program = Some(program);

        res.map(Some)
    }

    pub fn predict_with(&mut self, input: &Value, program: &Program<M>) -> Result<Value, Error> {
        let preprocessed = (self.preprocess_input)(input.clone());
        let output = self.run(program, input, &preprocessed)?;

        Ok((self.postprocess_output)(output))
    }

    fn preprocess(&self, data: &[DataSample]) -> Vec<DataSample> {
        data.iter()
            .map(|sample| DataSample {
                input: (self.preprocess_input)(sample.input.clone()),
                output: (self.preprocess_output)(sample.output.clone()),
            })
            .collect()
    }

    fn score(&mut self, program: &Program<M>, samples: &[DataSample]) -> Result<f64, Error> {
        let mut correct = 0;
        for sample in samples {
            let prediction = self.run(program, &sample.input, &sample.input)?;
            if same(&prediction, &sample.output) {
                correct += 1;
            }
        }

        Ok(correct as f64 / samples.len() as f64)
    }

    /// A single run on a freshly reset memory with a fresh budget.
    fn run(
        &mut self,
        program: &Program<M>,
        input: &Value,
        preprocessed_input: &Value,
    ) -> Result<Value, Error> {
        let mut budget = Budget::new(self.config.max_operations);
        self.memory.reset();
        self.memory.input(preprocessed_input.clone())?;

        let mut event = ExecutionEvent {
            memory: &mut self.memory,
            program,
            input,
            preprocessed_input,
        };
        self.dispatcher.dispatch_event(PRE_STRATEGY_EXECUTION, &mut event);

        program.execute(&mut self.memory, &mut budget);

        Ok(self.memory.output())
    }
}
