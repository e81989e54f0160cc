use log::{debug, trace};

use crate::instruction::{ControlStructure, Instruction};
use crate::memory::{Memory, Vocabulary};
use crate::program::Program;

use super::Synthesizer;

pub const DEFAULT_MAX_LENGTH: usize = 5;

/// Digit 0 of a candidate closes the innermost open body.
pub const END_OF_BODY: usize = 0;

/// A non-negative number written in a fixed base, least significant digit
/// first. Zero has no digits at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitCounter {
    base: usize,
    digits: Vec<usize>,
}

impl DigitCounter {
    pub fn new(base: usize) -> Self {
        // NOTE: this assert failing is 100% an API misuse. In base 1
        // incrementing never terminates.
        assert!(base >= 2, "Base must be at least 2");

        Self {
            base,
            digits: Vec::new(),
        }
    }

    pub fn from_decimal(mut decimal: u64, base: usize) -> Self {
        let mut res = Self::new(base);
        let b = base as u64;
        while decimal > 0 {
            res.digits.push((decimal % b) as usize);
            decimal /= b;
        }

        res
    }

    pub fn digits(&self) -> &[usize] {
        &self.digits
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn increment(&mut self) {
        // NOTE: this assert failing is 100% a bug
        debug_assert!(self.digits.iter().all(|x| *x < self.base));

        for digit in &mut self.digits {
            if *digit + 1 < self.base {
                *digit += 1;
                return;
            }

            *digit = 0;
        }

        self.digits.push(1);
    }
}

/// Enumerates every program of at most `max_length` instructions (control
/// structures and body ends included) built from a vocabulary.
///
/// Candidates are the numbers in base `k`, where `k` is the size of the
/// instruction alphabet, visited in increasing order. Each digit of a number
/// is an instruction, except for [`END_OF_BODY`]. Numbers that close a body
/// which was never opened are skipped.
pub struct BruteForce<M> {
    alphabet: Vec<Instruction<M>>,
    max_length: usize,
    counter: Option<DigitCounter>,
    // Set when only the empty program can be built
    empty_pending: bool,
}

impl<M> BruteForce<M> {
    pub fn new(vocabulary: Vocabulary<M>, max_length: usize) -> Self {
        let empty_vocabulary = vocabulary.is_empty();
        let alphabet = Self::prepare_alphabet(vocabulary);

        // Templates that need a condition contribute nothing without
        // conditions, so the alphabet can be empty even if the vocabulary
        // is not. The empty program is still a candidate then.
        let alphabet_empty = alphabet.is_empty();
        let counter = if alphabet_empty {
            debug!("Empty alphabet");
            None
        } else {
            debug!("Alphabet of {} instructions, max length {max_length}", alphabet.len() + 1);
            Some(DigitCounter::new(alphabet.len() + 1))
        };

        Self {
            alphabet,
            max_length,
            counter,
            empty_pending: alphabet_empty && !empty_vocabulary,
        }
    }

    pub fn from_memory(memory: &M, max_length: usize) -> Self
    where
        M: Memory,
    {
        Self::new(memory.vocabulary(), max_length)
    }

    /// The instructions behind digits `1..k`.
    pub fn alphabet(&self) -> &[Instruction<M>] {
        &self.alphabet
    }

    fn prepare_alphabet(vocabulary: Vocabulary<M>) -> Vec<Instruction<M>> {
        let Vocabulary {
            actions,
            conditions,
            control_structures,
        } = vocabulary;

        let mut alphabet: Vec<_> = actions.into_iter().map(Instruction::Action).collect();
        for template in control_structures {
            if template.needs_condition() {
                alphabet.extend(conditions.iter().map(|condition| {
                    Instruction::Control(ControlStructure::new(
                        template.clone(),
                        Some(condition.clone()),
                        Program::new(),
                    ))
                }));
            } else {
                alphabet.push(Instruction::Control(ControlStructure::new(
                    template,
                    None,
                    Program::new(),
                )));
            }
        }

        alphabet
    }

    /// Turns a digit string into a program, or `None` if it closes more
    /// bodies than it opens. Bodies left open at the end are kept as they are.
    pub fn decode(&self, digits: &[usize]) -> Option<Program<M>> {
        // Open bodies, innermost last. The root has no control structure.
        let mut stack: Vec<(Option<ControlStructure<M>>, Program<M>)> =
            vec![(None, Program::new())];

        for digit in digits {
            if *digit == END_OF_BODY {
                let (control, body) = stack.pop()?;
                let mut control = control?;
                control.set_body(body);
                // The root is never popped, so there is a parent.
                stack.last_mut()?.1.push(control);
                continue;
            }

            match self.alphabet.get(digit - 1)?.clone() {
                Instruction::Control(control) => stack.push((Some(control), Program::new())),
                other => stack.last_mut()?.1.push(other),
            }
        }

        while let Some((control, body)) = stack.pop() {
            match control {
                Some(mut control) => {
                    control.set_body(body);
                    stack.last_mut()?.1.push(control);
                },
                None => return Some(body),
            }
        }

        None
    }
}

impl<M> Iterator for BruteForce<M> {
    type Item = Program<M>;

    fn next(&mut self) -> Option<Program<M>> {
        if self.empty_pending {
            self.empty_pending = false;
            return Some(Program::new());
        }

        loop {
            let counter = self.counter.as_mut()?;
            if counter.len() > self.max_length {
                self.counter = None;
                return None;
            }

            let digits = counter.digits().to_vec();
            counter.increment();

            match self.decode(&digits) {
                Some(program) => {
                    trace!("Candidate {digits:?}");
                    return Some(program);
                },
                None => trace!("Skip {digits:?}"),
            }
        }
    }
}

impl<M> Synthesizer<M> for BruteForce<M> {
    fn next_program(&mut self) -> Option<Program<M>> {
        self.next()
    }
}
