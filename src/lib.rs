//! # param-finder
//!
//! Reads the input shape and output quantization of a quantized YOLO-style
//! detection model and writes them as C preprocessor constants, so a native
//! inference pipeline can be compiled against the exact model it will load.
//!
//! Two model formats are understood without linking an inference runtime:
//! - TensorFlow Lite flatbuffers (`.tflite`)
//! - ONNX protobuf graphs (`.onnx`), quantization taken from QDQ nodes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use param_finder::{AutoRuntime, HeaderEmitter, ParamFinder};
//!
//! let params = ParamFinder::new(AutoRuntime::new()).find(Path::new("yolov5s_int8.tflite"))?;
//! println!("{} classes, {} detections", params.num_classes, params.num_detections);
//!
//! HeaderEmitter::default().emit(&params)?;
//! # Ok::<(), param_finder::Error>(())
//! ```

pub mod error;
pub mod header;
pub mod onnx;
pub mod onnx_proto;
pub mod params;
mod proto_adapter;
pub mod runtime;
pub mod tensor;
pub mod tflite;
pub mod tflite_schema;
pub mod types;

pub use error::{Error, Result};
pub use header::{DEFAULT_OUTPUT_FILE, HeaderEmitter, c_float_literal, render_header};
pub use onnx::OnnxModel;
pub use params::{ModelParams, ParamFinder};
pub use runtime::{AutoRuntime, LoadedModel, ModelFormat, ModelRuntime};
pub use tensor::{Quantization, TensorDescriptor};
pub use tflite::TfliteModel;
pub use types::DataType;
