//! Arithmetic node rules
//!
//! Every source math kind maps to the one generic `RPRArithmetic` node,
//! parameterized by an operation selector. Binary rules copy two inputs,
//! unary rules one; only the operation code, the source input names and the
//! output plug table vary per kind.

use crate::convert::cache::{Conversion, PlugMap};
use crate::convert::error::ConvertResult;
use crate::convert::Converter;
use crate::scene::SceneGraph;

/// 4-channel color output to the arithmetic combined/channel outputs.
pub(crate) const COLOR_OUT: &[(&str, &str)] = &[
    ("outColor", "out"),
    ("outColorR", "outX"),
    ("outColorG", "outY"),
    ("outColorB", "outZ"),
];

/// Subtraction also feeds transparency consumers.
const SUBTRACT_OUT: &[(&str, &str)] = &[
    ("outColor", "out"),
    ("outColorR", "outX"),
    ("outColorG", "outY"),
    ("outColorB", "outZ"),
    ("outTransparency", "out"),
    ("outTransparencyR", "outX"),
    ("outTransparencyG", "outY"),
    ("outTransparencyB", "outZ"),
];

const VALUE_OUT: &[(&str, &str)] = &[
    ("outValue", "out"),
    ("outValueX", "outX"),
    ("outValueY", "outY"),
    ("outValueZ", "outZ"),
];

/// Dot product collapses to a scalar.
const DOT_OUT: &[(&str, &str)] = &[("outValue", "outX")];

const MULTIPLY_DIVIDE_OUT: &[(&str, &str)] = &[
    ("output", "out"),
    ("outputX", "outX"),
    ("outputY", "outY"),
    ("outputZ", "outZ"),
];

impl<G: SceneGraph> Converter<'_, G> {
    fn arithmetic(
        &mut self,
        source: &str,
        operation: i32,
        inputs: &[(&str, &str)],
        out: &'static [(&'static str, &'static str)],
    ) -> ConvertResult<Conversion> {
        let target = self.allocate("RPRArithmetic", source, "_rpr")?;
        self.begin_entry(source, &target);

        self.set_property(&target, "operation", operation);
        for (target_attr, source_attr) in inputs {
            self.copy_property(&target, source, target_attr, source_attr)?;
        }

        self.end_entry(source);
        Ok(Conversion::new(target, PlugMap::Table(out)))
    }

    pub(crate) fn convert_binary_arithmetic(
        &mut self,
        source: &str,
        operation: i32,
        input1: &str,
        input2: &str,
    ) -> ConvertResult<Conversion> {
        self.arithmetic(
            source,
            operation,
            &[("inputA", input1), ("inputB", input2)],
            COLOR_OUT,
        )
    }

    pub(crate) fn convert_unary_arithmetic(
        &mut self,
        source: &str,
        operation: i32,
        input: &str,
    ) -> ConvertResult<Conversion> {
        self.arithmetic(source, operation, &[("inputA", input)], COLOR_OUT)
    }

    pub(crate) fn convert_subtract(&mut self, source: &str) -> ConvertResult<Conversion> {
        self.arithmetic(
            source,
            1,
            &[("inputA", "input1"), ("inputB", "input2")],
            SUBTRACT_OUT,
        )
    }

    pub(crate) fn convert_cross(&mut self, source: &str) -> ConvertResult<Conversion> {
        self.arithmetic(
            source,
            12,
            &[("inputA", "input1"), ("inputB", "input2")],
            VALUE_OUT,
        )
    }

    pub(crate) fn convert_dot(&mut self, source: &str) -> ConvertResult<Conversion> {
        self.arithmetic(
            source,
            11,
            &[("inputA", "input1"), ("inputB", "input2")],
            DOT_OUT,
        )
    }

    /// Trigonometric node: the operation selector comes from the source's
    /// own function switch (sin/cos/tan).
    pub(crate) fn convert_trigo(&mut self, source: &str) -> ConvertResult<Conversion> {
        let function = self.scalar(source, "function") as i32;
        let operation = match function {
            0 => 5,
            1 => 4,
            _ => 6,
        };
        self.arithmetic(source, operation, &[("inputA", "input")], COLOR_OUT)
    }

    /// Schema-neutral multiply/divide utility; its operation switch counts
    /// from 1 (multiply, divide, power).
    pub(crate) fn convert_multiply_divide(&mut self, source: &str) -> ConvertResult<Conversion> {
        let operation = match self.scalar(source, "operation") as i32 {
            2 => 3,
            3 => 15,
            _ => 2,
        };
        self.arithmetic(
            source,
            operation,
            &[("inputA", "input1"), ("inputB", "input2")],
            MULTIPLY_DIVIDE_OUT,
        )
    }
}
