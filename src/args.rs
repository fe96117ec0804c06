use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use param_finder::{DEFAULT_OUTPUT_FILE, ModelFormat};

/// Extract model input size and output quantization into a C header
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // optional so a missing path exits 1 with a plain message, not a usage error
    /// Model file (.tflite or .onnx)
    #[arg(value_name = "MODEL")]
    pub model: Option<PathBuf>,

    /// Header to write, overwritten if it exists
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// Model format, detected from the file when `auto`
    #[arg(long, value_enum, default_value_t = FormatArg::Auto)]
    pub format: FormatArg,

    /// Fail on models without exactly one input and one output
    #[arg(long)]
    pub strict_io: bool,

    /// Log debug details to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Auto,
    Tflite,
    Onnx,
}

impl FormatArg {
    pub fn forced(self) -> Option<ModelFormat> {
        match self {
            FormatArg::Auto => None,
            FormatArg::Tflite => Some(ModelFormat::Tflite),
            FormatArg::Onnx => Some(ModelFormat::Onnx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_fixed_header_name() {
        let args = Args::try_parse_from(["param-finder", "yolov5s.tflite"]).unwrap();
        assert_eq!(args.model, Some(PathBuf::from("yolov5s.tflite")));
        assert_eq!(args.output, PathBuf::from("model_params.h"));
        assert_eq!(args.format, FormatArg::Auto);
        assert!(!args.strict_io);
        assert!(!args.verbose);
    }

    #[test]
    fn missing_model_still_parses() {
        let args = Args::try_parse_from(["param-finder"]).unwrap();
        assert!(args.model.is_none());
    }

    #[test]
    fn flags_and_forced_format() {
        let args = Args::try_parse_from([
            "param-finder",
            "--format",
            "onnx",
            "-o",
            "build/params.h",
            "--strict-io",
            "-v",
            "model.bin",
        ])
        .unwrap();
        assert_eq!(args.format.forced(), Some(ModelFormat::Onnx));
        assert_eq!(args.output, PathBuf::from("build/params.h"));
        assert!(args.strict_io);
        assert!(args.verbose);
        assert_eq!(FormatArg::Auto.forced(), None);
    }
}
