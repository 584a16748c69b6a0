// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Decoding model outputs into a labelled classification.
//!
//! ```text
//!   ModelOutput::FloatTensor(logits) ─► softmax ─► argmax ─► label table ─► ClassificationResult
//!   ModelOutput::OtherTensor / NonTensor ─► skipped
//! ```

use crate::text::FixedStr;
use crate::RuntimeError;
use model_program::ModelOutput;
use tensor_core::{argmax, softmax};

/// Largest label, in bytes, that fits the output record with its NUL.
pub const LABEL_CAPACITY: usize = 99;

/// Largest logit vector the decoder accepts.
pub const MAX_LOGITS: usize = 64;

/// Scale from probability to reported confidence.
pub const PERCENT_SCALE: f32 = 100.0;

/// Label reserved for "no known object".
pub const UNKNOWN_LABEL: &str = "UNKNOWN";

/// Bounded label text.
pub type Label = FixedStr<LABEL_CAPACITY>;

const VEHICLE_CLASS_NAMES: [&str; 4] = ["UNKNOWN", "BUS", "CAR", "TRUCK"];
const BANANA_CLASS_NAMES: [&str; 4] = ["Overripe", "Ripe", "Rotten", "Unripe"];
const TOOL_CLASS_NAMES: [&str; 4] = ["Bolt", "Hammer", "Nail", "Nut"];
const RPS_CLASS_NAMES: [&str; 4] = ["PAPER", "ROCK", "SCISSORS", "UNKNOWN"];

/// The classifier a build is made for. Selects the label table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelVariant {
    Vehicle,
    BananaRipeness,
    Tool,
    RockPaperScissors,
}

impl ModelVariant {
    /// The variant selected by cargo features (`variant-vehicle`,
    /// `variant-banana`, `variant-tool`); rock-paper-scissors otherwise.
    pub const BUILD: ModelVariant = if cfg!(feature = "variant-vehicle") {
        ModelVariant::Vehicle
    } else if cfg!(feature = "variant-banana") {
        ModelVariant::BananaRipeness
    } else if cfg!(feature = "variant-tool") {
        ModelVariant::Tool
    } else {
        ModelVariant::RockPaperScissors
    };

    /// Class names in model output order.
    pub const fn labels(self) -> &'static [&'static str] {
        match self {
            ModelVariant::Vehicle => &VEHICLE_CLASS_NAMES,
            ModelVariant::BananaRipeness => &BANANA_CLASS_NAMES,
            ModelVariant::Tool => &TOOL_CLASS_NAMES,
            ModelVariant::RockPaperScissors => &RPS_CLASS_NAMES,
        }
    }

    /// Class name for `index`, if the table has one.
    pub fn label(self, index: usize) -> Option<&'static str> {
        self.labels().get(index).copied()
    }

    /// Number of classes.
    pub fn num_classes(self) -> usize {
        self.labels().len()
    }

    /// Short name.
    pub fn name(self) -> &'static str {
        match self {
            ModelVariant::Vehicle => "vehicle",
            ModelVariant::BananaRipeness => "banana-ripeness",
            ModelVariant::Tool => "tool",
            ModelVariant::RockPaperScissors => "rock-paper-scissors",
        }
    }
}

impl Default for ModelVariant {
    fn default() -> Self {
        Self::BUILD
    }
}

impl std::fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The decoded result of one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationResult {
    /// Class name.
    pub label: Label,
    /// Index into the variant's label table.
    pub class_index: usize,
    /// Probability of the class, scaled to percent.
    pub confidence: f32,
}

impl ClassificationResult {
    /// Returns `false` when the model saw nothing it knows.
    pub fn is_known(&self) -> bool {
        self.label != UNKNOWN_LABEL
    }

    /// Confidence truncated to a whole percent, as drawn on the frame.
    pub fn confidence_percent(&self) -> i32 {
        self.confidence as i32
    }
}

/// ANSI colour used when printing class `index`.
pub fn class_color(index: usize) -> &'static str {
    match index {
        0 => "\x1b[33m",
        1 => "\x1b[32m",
        2 => "\x1b[31m",
        3 => "\x1b[34m",
        _ => COLOR_RESET,
    }
}

/// ANSI reset sequence.
pub const COLOR_RESET: &str = "\x1b[0m";

/// Decodes the method outputs into a classification.
///
/// Only float tensors are decoded; every other output is skipped with a
/// diagnostic. When several float outputs decode, the last one wins.
///
/// # Errors
/// [`RuntimeError::NoClassification`] when no output decodes.
pub fn decode<'a>(
    outputs: impl IntoIterator<Item = ModelOutput<'a>>,
    variant: ModelVariant,
) -> Result<ClassificationResult, RuntimeError> {
    let mut result = None;

    for (i, output) in outputs.into_iter().enumerate() {
        match output {
            ModelOutput::FloatTensor(logits) => {
                if let Some(decoded) = decode_logits(i, logits, variant) {
                    result = Some(decoded);
                }
            }
            ModelOutput::OtherTensor { dtype } => {
                tracing::debug!(output = i, %dtype, "skipping non-float tensor output");
            }
            ModelOutput::NonTensor { tag } => {
                tracing::warn!(output = i, %tag, "output is not a tensor");
            }
        }
    }

    result.ok_or(RuntimeError::NoClassification)
}

fn decode_logits(
    output: usize,
    logits: &[f32],
    variant: ModelVariant,
) -> Option<ClassificationResult> {
    if logits.len() > MAX_LOGITS {
        tracing::warn!(output, len = logits.len(), "logit vector too long, skipped");
        return None;
    }

    let mut probs = [0.0f32; MAX_LOGITS];
    let probs = &mut probs[..logits.len()];
    if let Err(e) = softmax(logits, probs) {
        tracing::warn!(output, "cannot decode output: {e}");
        return None;
    }
    let (class_index, probability) = argmax(probs)?;

    let Some(name) = variant.label(class_index) else {
        tracing::warn!(
            output,
            class_index,
            "class index outside the {variant} label table"
        );
        return None;
    };

    let result = ClassificationResult {
        label: Label::truncated(name),
        class_index,
        confidence: probability * PERCENT_SCALE,
    };
    tracing::info!(
        "predicted class: {} ({:.2} %)",
        result.label,
        result.confidence
    );
    Some(result)
}
