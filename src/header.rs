use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{Error, ModelParams, Result};

/// File name the native pipeline includes
pub const DEFAULT_OUTPUT_FILE: &str = "model_params.h";

/// Include guard macro of the generated header
pub const INCLUDE_GUARD: &str = "MODEL_PARAMS_H";

/// Format `value` as a C `float` literal: shortest round-trip decimal, no
/// exponent, always a decimal point, `f` suffix.
pub fn c_float_literal(value: f32) -> Result<String> {
    if !value.is_finite() {
        return Err(Error::Unsupported(format!(
            "{} has no C float literal",
            value
        )));
    }
    let mut literal = value.to_string();
    if !literal.contains('.') {
        literal.push_str(".0");
    }
    literal.push('f');
    Ok(literal)
}

/// Render the complete header text
///
/// Three groups separated by blank lines: input size, output quantization,
/// detection layout.
pub fn render_header(params: &ModelParams) -> Result<String> {
    let scale = c_float_literal(params.quantization_scale)?;

    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write!(
        out,
        "#ifndef {guard}\n\
         #define {guard}\n\
         \n\
         #define MODEL_INPUT_HEIGHT {}\n\
         #define MODEL_INPUT_WIDTH {}\n\
         \n\
         #define QUANTIZATION_SCALE {}\n\
         #define QUANTIZATION_ZERO_POINT {}\n\
         \n\
         #define NUM_CLASSES {}\n\
         #define NUM_DETECTIONS {}\n\
         \n\
         #endif // {guard}\n",
        params.input_height,
        params.input_width,
        scale,
        params.quantization_zero_point,
        params.num_classes,
        params.num_detections,
        guard = INCLUDE_GUARD,
    );
    Ok(out)
}

/// Writes rendered headers to a fixed path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderEmitter {
    output_path: PathBuf,
}

impl Default for HeaderEmitter {
    /// `model_params.h` relative to the working directory
    fn default() -> Self {
        HeaderEmitter::new(DEFAULT_OUTPUT_FILE)
    }
}

impl HeaderEmitter {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        HeaderEmitter {
            output_path: output_path.into(),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Render `params` and write them, truncating any existing file
    pub fn emit(&self, params: &ModelParams) -> Result<()> {
        let text = render_header(params)?;
        fs::write(&self.output_path, &text)?;
        debug!(
            path = %self.output_path.display(),
            bytes = text.len(),
            "header written"
        );
        Ok(())
    }
}
