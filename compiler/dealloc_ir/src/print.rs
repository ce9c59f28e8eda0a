//! Textual dump of a routine.
//!
//! The format is line oriented and only meant for debugging and test
//! snapshots; there is no parser for it.
//!
//! ```text
//! func @f(%0: buffer<?xf32>) {
//!   %1 = alloc() : buffer<?xf32>
//!   %2 = own(%1) : ownership
//!   %3 = retain(%1 | %2) : ownership
//!   return(%1)
//! }
//! ```
//!
//! Region blocks print as `^bbN(args):` followed by their operations. An
//! empty region prints as `{}`.

use std::fmt::{self, Write};

use crate::function::Function;
use crate::ids::{BlockId, OpId, RegionId, ValueId};
use crate::ops::OpKind;

const INDENT: &str = "  ";

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut printer = Printer { func: self, out: f };
        printer.routine()
    }
}

struct Printer<'a, 'b, W: Write> {
    func: &'a Function,
    out: &'b mut W,
}

impl<W: Write> Printer<'_, '_, W> {
    fn routine(&mut self) -> fmt::Result {
        let func = self.func;
        let entry = func.entry_block();
        write!(self.out, "func @{}(", func.name())?;
        self.typed_values(func.block_args(entry))?;
        self.out.write_str(") {\n")?;
        for &op in func.block_ops(entry) {
            self.op(op, 1)?;
        }
        self.out.write_str("}\n")
    }

    fn op(&mut self, op: OpId, depth: usize) -> fmt::Result {
        let func = self.func;
        self.indent(depth)?;
        let results = func.results(op);
        if !results.is_empty() {
            self.values(results)?;
            self.out.write_str(" = ")?;
        }
        let operands = func.operands(op);
        write!(self.out, "{}(", func.kind(op).name())?;
        match func.kind(op) {
            OpKind::Retain { num_retained } => {
                let split = (*num_retained as usize).min(operands.len());
                self.values(&operands[..split])?;
                self.out.write_str(" | ")?;
                self.values(&operands[split..])?;
            }
            _ => self.values(operands)?,
        }
        self.out.write_char(')')?;
        if !results.is_empty() {
            self.out.write_str(" : ")?;
            for (i, &result) in results.iter().enumerate() {
                if i > 0 {
                    self.out.write_str(", ")?;
                }
                write!(self.out, "{}", func.value_type(result))?;
            }
        }
        for (i, &region) in func.regions(op).iter().enumerate() {
            self.out.write_str(if i == 0 { " " } else { ", " })?;
            self.region(region, depth)?;
        }
        self.out.write_char('\n')
    }

    fn region(&mut self, region: RegionId, depth: usize) -> fmt::Result {
        let func = self.func;
        let blocks = func.region_blocks(region);
        if blocks.is_empty() {
            return self.out.write_str("{}");
        }
        self.out.write_str("{\n")?;
        for &block in blocks {
            self.block(block, depth + 1)?;
        }
        self.indent(depth)?;
        self.out.write_char('}')
    }

    fn block(&mut self, block: BlockId, depth: usize) -> fmt::Result {
        self.indent(depth - 1)?;
        let func = self.func;
        write!(self.out, "^bb{}", block.raw())?;
        let args = func.block_args(block);
        if !args.is_empty() {
            self.out.write_char('(')?;
            self.typed_values(args)?;
            self.out.write_char(')')?;
        }
        self.out.write_str(":\n")?;
        for &op in func.block_ops(block) {
            self.op(op, depth)?;
        }
        Ok(())
    }

    fn values(&mut self, values: &[ValueId]) -> fmt::Result {
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                self.out.write_str(", ")?;
            }
            write!(self.out, "%{}", value.raw())?;
        }
        Ok(())
    }

    fn typed_values(&mut self, values: &[ValueId]) -> fmt::Result {
        for (i, &value) in values.iter().enumerate() {
            if i > 0 {
                self.out.write_str(", ")?;
            }
            write!(self.out, "%{}: {}", value.raw(), self.func.value_type(value))?;
        }
        Ok(())
    }

    fn indent(&mut self, depth: usize) -> fmt::Result {
        for _ in 0..depth {
            self.out.write_str(INDENT)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
