//! Scores: time-stamped input events for offline rendering

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::synth::ParamValue;

/// A list of events to play through the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Seconds to keep rendering after the last event (default: 1.0)
    #[serde(default = "default_tail")]
    pub tail: f64,

    #[serde(default)]
    pub events: Vec<ScoreEvent>,
}

fn default_tail() -> f64 { 1.0 }

impl Default for Score {
    fn default() -> Self {
        Self {
            tail: default_tail(),
            events: Vec::new(),
        }
    }
}

/// One event; exactly one of `midi` or `parameter` must be set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEvent {
    /// Time in seconds from the start of the render
    pub at: f64,

    /// Raw MIDI bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub midi: Option<Vec<u8>>,

    /// Named parameter change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<ParameterEvent>,
}

/// A `(destination, parameter, value)` change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterEvent {
    pub destination: String,
    pub name: String,
    pub value: ScoreValue,
}

/// Number or name, as accepted by the parameter surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreValue {
    Number(f64),
    Text(String),
}

impl ScoreValue {
    pub fn as_param(&self) -> ParamValue<'_> {
        match self {
            ScoreValue::Number(n) => ParamValue::Number(*n),
            ScoreValue::Text(s) => ParamValue::Text(s),
        }
    }
}

impl Score {
    /// Validate the score
    pub fn validate(&self) -> Result<()> {
        if !self.tail.is_finite() || self.tail < 0.0 {
            bail!("Score tail must be a non-negative number of seconds");
        }
        for (i, event) in self.events.iter().enumerate() {
            if !event.at.is_finite() || event.at < 0.0 {
                bail!("Event {} has an invalid time {}", i, event.at);
            }
            match (&event.midi, &event.parameter) {
                (Some(_), None) | (None, Some(_)) => {}
                _ => bail!("Event {} must have exactly one of 'midi' or 'parameter'", i),
            }
        }
        Ok(())
    }

    /// Events ordered by time; ties keep file order
    pub fn sorted_events(&self) -> Vec<&ScoreEvent> {
        let mut events: Vec<&ScoreEvent> = self.events.iter().collect();
        events.sort_by(|a, b| a.at.total_cmp(&b.at));
        events
    }

    /// Time of the last event plus the tail
    pub fn duration(&self) -> f64 {
        let last = self.events.iter().map(|e| e.at).fold(0.0, f64::max);
        last + self.tail
    }
}
