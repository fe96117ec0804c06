//! FlatBuffer accessors for the part of the TFLite `schema.fbs` that is read.
//!
//! Laid out the way `flatc --rust` output is: one table struct wrapping a
//! [`flatbuffers::Table`], `VT_*` vtable offsets, a `Verifiable` impl that
//! covers every field the accessors touch, and `*Args` + `create` for
//! building buffers. Fields that are never read (operators, buffers,
//! signature defs, ...) are skipped by both the verifier and the accessors.

use flatbuffers::{
    FlatBufferBuilder, Follow, ForwardsUOffset, InvalidFlatbuffer, Table, VOffsetT, Vector,
    Verifiable, Verifier, WIPOffset,
};

/// File identifier stored at bytes 4..8 of every TFLite model
pub const MODEL_IDENTIFIER: &str = "TFL3";

/// Verify `buf` and return the root `Model` table
pub fn root_as_model(buf: &[u8]) -> Result<Model<'_>, InvalidFlatbuffer> {
    flatbuffers::root::<Model>(buf)
}

/// True when `buf` carries the `TFL3` file identifier
pub fn model_buffer_has_identifier(buf: &[u8]) -> bool {
    // buffer_has_identifier asserts on short input
    buf.len() >= 8 && flatbuffers::buffer_has_identifier(buf, MODEL_IDENTIFIER, false)
}

/// Finish `fbb` with `root` as a TFLite model, identifier included
pub fn finish_model_buffer<'a>(fbb: &mut FlatBufferBuilder<'a>, root: WIPOffset<Model<'a>>) {
    fbb.finish(root, Some(MODEL_IDENTIFIER));
}

// ---------------------------------------------------------------------------
// Model

#[derive(Copy, Clone, PartialEq)]
pub struct Model<'a> {
    pub _tab: Table<'a>,
}

impl<'a> Follow<'a> for Model<'a> {
    type Inner = Model<'a>;
    #[inline]
    unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        Self {
            _tab: unsafe { Table::new(buf, loc) },
        }
    }
}

impl<'a> Model<'a> {
    pub const VT_VERSION: VOffsetT = 4;
    pub const VT_SUBGRAPHS: VOffsetT = 8;
    pub const VT_DESCRIPTION: VOffsetT = 10;

    #[inline]
    pub fn version(&self) -> u32 {
        // Safety: verified in run_verifier
        unsafe { self._tab.get::<u32>(Model::VT_VERSION, Some(0)).unwrap_or(0) }
    }

    #[inline]
    pub fn subgraphs(&self) -> Option<Vector<'a, ForwardsUOffset<SubGraph<'a>>>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, ForwardsUOffset<SubGraph>>>>(
                    Model::VT_SUBGRAPHS,
                    None,
                )
        }
    }

    #[inline]
    pub fn description(&self) -> Option<&'a str> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<&str>>(Model::VT_DESCRIPTION, None)
        }
    }

    pub fn create<'bldr>(
        fbb: &mut FlatBufferBuilder<'bldr>,
        args: &ModelArgs<'bldr>,
    ) -> WIPOffset<Model<'bldr>> {
        let start = fbb.start_table();
        if let Some(x) = args.description {
            fbb.push_slot_always(Model::VT_DESCRIPTION, x);
        }
        if let Some(x) = args.subgraphs {
            fbb.push_slot_always(Model::VT_SUBGRAPHS, x);
        }
        fbb.push_slot::<u32>(Model::VT_VERSION, args.version, 0);
        let o = fbb.end_table(start);
        WIPOffset::new(o.value())
    }
}

impl Verifiable for Model<'_> {
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<u32>("version", Self::VT_VERSION, false)?
            .visit_field::<ForwardsUOffset<Vector<'_, ForwardsUOffset<SubGraph>>>>(
                "subgraphs",
                Self::VT_SUBGRAPHS,
                false,
            )?
            .visit_field::<ForwardsUOffset<&str>>("description", Self::VT_DESCRIPTION, false)?
            .finish();
        Ok(())
    }
}

pub struct ModelArgs<'a> {
    pub version: u32,
    pub subgraphs: Option<WIPOffset<Vector<'a, ForwardsUOffset<SubGraph<'a>>>>>,
    pub description: Option<WIPOffset<&'a str>>,
}

impl Default for ModelArgs<'_> {
    fn default() -> Self {
        ModelArgs {
            version: 3,
            subgraphs: None,
            description: None,
        }
    }
}

// ---------------------------------------------------------------------------
// SubGraph

#[derive(Copy, Clone, PartialEq)]
pub struct SubGraph<'a> {
    pub _tab: Table<'a>,
}

impl<'a> Follow<'a> for SubGraph<'a> {
    type Inner = SubGraph<'a>;
    #[inline]
    unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        Self {
            _tab: unsafe { Table::new(buf, loc) },
        }
    }
}

impl<'a> SubGraph<'a> {
    pub const VT_TENSORS: VOffsetT = 4;
    pub const VT_INPUTS: VOffsetT = 6;
    pub const VT_OUTPUTS: VOffsetT = 8;
    pub const VT_NAME: VOffsetT = 12;

    #[inline]
    pub fn tensors(&self) -> Option<Vector<'a, ForwardsUOffset<Tensor<'a>>>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, ForwardsUOffset<Tensor>>>>(
                    SubGraph::VT_TENSORS,
                    None,
                )
        }
    }

    /// Indices into `tensors()` of the subgraph inputs
    #[inline]
    pub fn inputs(&self) -> Option<Vector<'a, i32>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, i32>>>(SubGraph::VT_INPUTS, None)
        }
    }

    /// Indices into `tensors()` of the subgraph outputs
    #[inline]
    pub fn outputs(&self) -> Option<Vector<'a, i32>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, i32>>>(SubGraph::VT_OUTPUTS, None)
        }
    }

    #[inline]
    pub fn name(&self) -> Option<&'a str> {
        unsafe { self._tab.get::<ForwardsUOffset<&str>>(SubGraph::VT_NAME, None) }
    }

    pub fn create<'bldr>(
        fbb: &mut FlatBufferBuilder<'bldr>,
        args: &SubGraphArgs<'bldr>,
    ) -> WIPOffset<SubGraph<'bldr>> {
        let start = fbb.start_table();
        if let Some(x) = args.name {
            fbb.push_slot_always(SubGraph::VT_NAME, x);
        }
        if let Some(x) = args.outputs {
            fbb.push_slot_always(SubGraph::VT_OUTPUTS, x);
        }
        if let Some(x) = args.inputs {
            fbb.push_slot_always(SubGraph::VT_INPUTS, x);
        }
        if let Some(x) = args.tensors {
            fbb.push_slot_always(SubGraph::VT_TENSORS, x);
        }
        let o = fbb.end_table(start);
        WIPOffset::new(o.value())
    }
}

impl Verifiable for SubGraph<'_> {
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<ForwardsUOffset<Vector<'_, ForwardsUOffset<Tensor>>>>(
                "tensors",
                Self::VT_TENSORS,
                false,
            )?
            .visit_field::<ForwardsUOffset<Vector<'_, i32>>>("inputs", Self::VT_INPUTS, false)?
            .visit_field::<ForwardsUOffset<Vector<'_, i32>>>("outputs", Self::VT_OUTPUTS, false)?
            .visit_field::<ForwardsUOffset<&str>>("name", Self::VT_NAME, false)?
            .finish();
        Ok(())
    }
}

#[derive(Default)]
pub struct SubGraphArgs<'a> {
    pub tensors: Option<WIPOffset<Vector<'a, ForwardsUOffset<Tensor<'a>>>>>,
    pub inputs: Option<WIPOffset<Vector<'a, i32>>>,
    pub outputs: Option<WIPOffset<Vector<'a, i32>>>,
    pub name: Option<WIPOffset<&'a str>>,
}

// ---------------------------------------------------------------------------
// Tensor

#[derive(Copy, Clone, PartialEq)]
pub struct Tensor<'a> {
    pub _tab: Table<'a>,
}

impl<'a> Follow<'a> for Tensor<'a> {
    type Inner = Tensor<'a>;
    #[inline]
    unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        Self {
            _tab: unsafe { Table::new(buf, loc) },
        }
    }
}

impl<'a> Tensor<'a> {
    pub const VT_SHAPE: VOffsetT = 4;
    pub const VT_TYPE_: VOffsetT = 6;
    pub const VT_BUFFER: VOffsetT = 8;
    pub const VT_NAME: VOffsetT = 10;
    pub const VT_QUANTIZATION: VOffsetT = 12;
    pub const VT_SHAPE_SIGNATURE: VOffsetT = 18;

    #[inline]
    pub fn shape(&self) -> Option<Vector<'a, i32>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, i32>>>(Tensor::VT_SHAPE, None)
        }
    }

    /// Raw `TensorType` enum value, see [`crate::DataType::from_tflite_type`]
    #[inline]
    pub fn type_(&self) -> i8 {
        unsafe { self._tab.get::<i8>(Tensor::VT_TYPE_, Some(0)).unwrap_or(0) }
    }

    #[inline]
    pub fn buffer(&self) -> u32 {
        unsafe { self._tab.get::<u32>(Tensor::VT_BUFFER, Some(0)).unwrap_or(0) }
    }

    #[inline]
    pub fn name(&self) -> Option<&'a str> {
        unsafe { self._tab.get::<ForwardsUOffset<&str>>(Tensor::VT_NAME, None) }
    }

    #[inline]
    pub fn quantization(&self) -> Option<QuantizationParameters<'a>> {
        unsafe {
            self._tab.get::<ForwardsUOffset<QuantizationParameters>>(
                Tensor::VT_QUANTIZATION,
                None,
            )
        }
    }

    /// Shape with `-1` for dynamic dimensions, absent for static models
    #[inline]
    pub fn shape_signature(&self) -> Option<Vector<'a, i32>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, i32>>>(Tensor::VT_SHAPE_SIGNATURE, None)
        }
    }

    pub fn create<'bldr>(
        fbb: &mut FlatBufferBuilder<'bldr>,
        args: &TensorArgs<'bldr>,
    ) -> WIPOffset<Tensor<'bldr>> {
        let start = fbb.start_table();
        if let Some(x) = args.shape_signature {
            fbb.push_slot_always(Tensor::VT_SHAPE_SIGNATURE, x);
        }
        if let Some(x) = args.quantization {
            fbb.push_slot_always(Tensor::VT_QUANTIZATION, x);
        }
        if let Some(x) = args.name {
            fbb.push_slot_always(Tensor::VT_NAME, x);
        }
        fbb.push_slot::<u32>(Tensor::VT_BUFFER, args.buffer, 0);
        if let Some(x) = args.shape {
            fbb.push_slot_always(Tensor::VT_SHAPE, x);
        }
        fbb.push_slot::<i8>(Tensor::VT_TYPE_, args.type_, 0);
        let o = fbb.end_table(start);
        WIPOffset::new(o.value())
    }
}

impl Verifiable for Tensor<'_> {
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<ForwardsUOffset<Vector<'_, i32>>>("shape", Self::VT_SHAPE, false)?
            .visit_field::<i8>("type_", Self::VT_TYPE_, false)?
            .visit_field::<u32>("buffer", Self::VT_BUFFER, false)?
            .visit_field::<ForwardsUOffset<&str>>("name", Self::VT_NAME, false)?
            .visit_field::<ForwardsUOffset<QuantizationParameters>>(
                "quantization",
                Self::VT_QUANTIZATION,
                false,
            )?
            .visit_field::<ForwardsUOffset<Vector<'_, i32>>>(
                "shape_signature",
                Self::VT_SHAPE_SIGNATURE,
                false,
            )?
            .finish();
        Ok(())
    }
}

#[derive(Default)]
pub struct TensorArgs<'a> {
    pub shape: Option<WIPOffset<Vector<'a, i32>>>,
    pub type_: i8,
    pub buffer: u32,
    pub name: Option<WIPOffset<&'a str>>,
    pub quantization: Option<WIPOffset<QuantizationParameters<'a>>>,
    pub shape_signature: Option<WIPOffset<Vector<'a, i32>>>,
}

// ---------------------------------------------------------------------------
// QuantizationParameters

#[derive(Copy, Clone, PartialEq)]
pub struct QuantizationParameters<'a> {
    pub _tab: Table<'a>,
}

impl<'a> Follow<'a> for QuantizationParameters<'a> {
    type Inner = QuantizationParameters<'a>;
    #[inline]
    unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        Self {
            _tab: unsafe { Table::new(buf, loc) },
        }
    }
}

impl<'a> QuantizationParameters<'a> {
    pub const VT_SCALE: VOffsetT = 8;
    pub const VT_ZERO_POINT: VOffsetT = 10;
    pub const VT_QUANTIZED_DIMENSION: VOffsetT = 16;

    #[inline]
    pub fn scale(&self) -> Option<Vector<'a, f32>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, f32>>>(QuantizationParameters::VT_SCALE, None)
        }
    }

    #[inline]
    pub fn zero_point(&self) -> Option<Vector<'a, i64>> {
        unsafe {
            self._tab.get::<ForwardsUOffset<Vector<'a, i64>>>(
                QuantizationParameters::VT_ZERO_POINT,
                None,
            )
        }
    }

    #[inline]
    pub fn quantized_dimension(&self) -> i32 {
        unsafe {
            self._tab
                .get::<i32>(QuantizationParameters::VT_QUANTIZED_DIMENSION, Some(0))
                .unwrap_or(0)
        }
    }

    pub fn create<'bldr>(
        fbb: &mut FlatBufferBuilder<'bldr>,
        args: &QuantizationParametersArgs<'bldr>,
    ) -> WIPOffset<QuantizationParameters<'bldr>> {
        let start = fbb.start_table();
        fbb.push_slot::<i32>(
            QuantizationParameters::VT_QUANTIZED_DIMENSION,
            args.quantized_dimension,
            0,
        );
        if let Some(x) = args.zero_point {
            fbb.push_slot_always(QuantizationParameters::VT_ZERO_POINT, x);
        }
        if let Some(x) = args.scale {
            fbb.push_slot_always(QuantizationParameters::VT_SCALE, x);
        }
        let o = fbb.end_table(start);
        WIPOffset::new(o.value())
    }
}

impl Verifiable for QuantizationParameters<'_> {
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<ForwardsUOffset<Vector<'_, f32>>>("scale", Self::VT_SCALE, false)?
            .visit_field::<ForwardsUOffset<Vector<'_, i64>>>(
                "zero_point",
                Self::VT_ZERO_POINT,
                false,
            )?
            .visit_field::<i32>(
                "quantized_dimension",
                Self::VT_QUANTIZED_DIMENSION,
                false,
            )?
            .finish();
        Ok(())
    }
}

#[derive(Default)]
pub struct QuantizationParametersArgs<'a> {
    pub scale: Option<WIPOffset<Vector<'a, f32>>>,
    pub zero_point: Option<WIPOffset<Vector<'a, i64>>>,
    pub quantized_dimension: i32,
}
