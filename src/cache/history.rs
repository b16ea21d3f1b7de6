//! Call History Module
//!
//! Positionally paired input/output logs for traced operations.

use serde::Serialize;

// == Call Record ==
/// One traced invocation: serialized arguments and, once finished, the result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallRecord {
    /// Stable identifier of the traced operation
    pub method: String,
    /// Serialized call arguments
    pub input: String,
    /// Serialized result, None while the call is still running
    pub output: Option<String>,
}

impl CallRecord {
    pub fn is_complete(&self) -> bool {
        self.output.is_some()
    }
}

// == Call Slot ==
/// Reservation for the output of a call whose input is already logged.
///
/// Handed out by `ValueStore::begin_call` and consumed by `finish_call`.
#[derive(Debug)]
#[must_use = "a call slot must be finished to record the call's output"]
pub struct CallSlot {
    pub(crate) method: String,
    pub(crate) index: usize,
    pub(crate) generation: u64,
}

impl CallSlot {
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Position of this call in the method's input/output logs.
    pub fn index(&self) -> usize {
        self.index
    }
}

// == Call Log ==
/// Input and output logs for a single method.
///
/// Both vectors always have the same length: opening a call pushes its input
/// and an empty output position together.
#[derive(Debug, Default)]
pub(crate) struct CallLog {
    inputs: Vec<String>,
    outputs: Vec<Option<String>>,
}

impl CallLog {
    /// Appends an input and reserves the matching output position.
    pub fn open(&mut self, input: String) -> usize {
        self.inputs.push(input);
        self.outputs.push(None);
        self.inputs.len() - 1
    }

    /// Fills the output position reserved by `open`.
    ///
    /// Returns false if the position is unknown or already filled.
    pub fn complete(&mut self, index: usize, output: String) -> bool {
        match self.outputs.get_mut(index) {
            Some(slot) if slot.is_none() => {
                *slot = Some(output);
                true
            }
            _ => false,
        }
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Option<String>] {
        &self.outputs
    }

    pub fn records(&self, method: &str) -> Vec<CallRecord> {
        self.inputs
            .iter()
            .zip(self.outputs.iter())
            .map(|(input, output)| CallRecord {
                method: method.to_string(),
                input: input.clone(),
                output: output.clone(),
            })
            .collect()
    }
}
