//! Assembly idioms for every VM instruction.
//!
//! All snippets keep the stack pointer in `SP` pointing at the first free
//! slot and use `D` as the only scratch register; `R13` and `R14` are
//! clobbered by `return`.

use super::{error::ErrorKind, Translator};
use crate::vm::{LabelAction, Segment, VMCommand, VMInstruction};

/// `*SP = D; SP++`
const PUSH_D: [&str; 5] = ["@SP", "A=M", "M=D", "@SP", "M=M+1"];
/// `SP--; D = *SP`
const POP_D: [&str; 3] = ["@SP", "AM=M-1", "D=M"];

const TEMP_BASE: usize = 5;
const TEMP_SIZE: usize = 8;
const MAX_CONSTANT: usize = 0x7FFF;

/// Registers saved in a call frame, in push order.
const FRAME: [&str; 4] = ["LCL", "ARG", "THIS", "THAT"];

pub(super) fn lines(code: &[&str]) -> Vec<String> {
    code.iter().map(|line| (*line).to_owned()).collect()
}

impl Translator {
    pub(super) fn translate_instruction(
        &mut self,
        instruction: &VMInstruction,
    ) -> Result<Vec<String>, ErrorKind> {
        match instruction {
            VMInstruction::Push(segment, index) => self.push(*segment, *index),
            VMInstruction::Pop(segment, index) => self.pop(*segment, *index),
            VMInstruction::Command(VMCommand::Return) => Ok(vm_return()),
            VMInstruction::Command(command) => Ok(self.arithmetic(*command)),
            VMInstruction::Label(action, label) => Ok(self.label(*action, label)),
            VMInstruction::Function(name, locals) => Ok(self.function(name, *locals)),
            VMInstruction::Call(name, arguments) => Ok(self.call(name, *arguments)),
        }
    }

    // region: Memory access

    fn push(&self, segment: Segment, index: usize) -> Result<Vec<String>, ErrorKind> {
        let load = match segment {
            Segment::Constant => {
                if index > MAX_CONSTANT {
                    return Err(ErrorKind::ConstantOutOfRange(index));
                }
                vec![format!("@{index}"), "D=A".into()]
            }
            Segment::Local => load_indirect("LCL", index),
            Segment::Argument => load_indirect("ARG", index),
            Segment::This => load_indirect("THIS", index),
            Segment::That => load_indirect("THAT", index),
            Segment::Static => vec![format!("@{}", self.static_symbol(index)), "D=M".into()],
            Segment::Temp => vec![format!("@{}", temp_address(index)?), "D=M".into()],
            Segment::Pointer => vec![format!("@{}", pointer_register(index)?), "D=M".into()],
        };

        Ok([load, lines(&PUSH_D)].concat())
    }

    fn pop(&self, segment: Segment, index: usize) -> Result<Vec<String>, ErrorKind> {
        let target = match segment {
            Segment::Constant => return Err(ErrorKind::PopConstant),
            Segment::Local => return Ok(store_indirect("LCL", index)),
            Segment::Argument => return Ok(store_indirect("ARG", index)),
            Segment::This => return Ok(store_indirect("THIS", index)),
            Segment::That => return Ok(store_indirect("THAT", index)),
            Segment::Static => self.static_symbol(index),
            Segment::Temp => temp_address(index)?.to_string(),
            Segment::Pointer => pointer_register(index)?.to_owned(),
        };

        Ok([lines(&POP_D), vec![format!("@{target}"), "M=D".into()]].concat())
    }

    fn static_symbol(&self, index: usize) -> String {
        format!("{}.{index}", self.unit_name)
    }

    // endregion

    // region: Arithmetic

    fn arithmetic(&mut self, command: VMCommand) -> Vec<String> {
        match command {
            VMCommand::Add => binary("M=D+M"),
            VMCommand::Sub => binary("M=M-D"),
            VMCommand::And => binary("M=D&M"),
            VMCommand::Or => binary("M=D|M"),
            VMCommand::Neg => lines(&["@SP", "A=M-1", "M=-M"]),
            VMCommand::Not => lines(&["@SP", "A=M-1", "M=!M"]),
            VMCommand::Eq => self.comparison("EQ", "JEQ"),
            VMCommand::Gt => self.comparison("GT", "JGT"),
            VMCommand::Lt => self.comparison("LT", "JLT"),
            VMCommand::Return => vm_return(),
        }
    }

    /// Replaces the top two values `x y` with `-1` if `x - y` satisfies `jump`, `0` otherwise.
    fn comparison(&mut self, prefix: &str, jump: &str) -> Vec<String> {
        let id = self.next_label_id();
        // `$` keeps these apart from `Unit.index` statics
        let is_true = format!("{prefix}${id}");
        let end = format!("{prefix}END${id}");

        [
            lines(&POP_D),
            lines(&["A=A-1", "D=M-D"]),
            vec![format!("@{is_true}"), format!("D;{jump}")],
            lines(&["@SP", "A=M-1", "M=0"]),
            vec![format!("@{end}"), "0;JMP".into(), format!("({is_true})")],
            lines(&["@SP", "A=M-1", "M=-1"]),
            vec![format!("({end})")],
        ]
        .concat()
    }

    // endregion

    // region: Program flow

    /// Labels declared inside a function are only visible within it.
    fn scoped(&self, label: &str) -> String {
        match &self.current_function {
            Some(function) => format!("{function}${label}"),
            None => label.to_owned(),
        }
    }

    fn label(&self, action: LabelAction, label: &str) -> Vec<String> {
        let label = self.scoped(label);

        match action {
            LabelAction::Label => vec![format!("({label})")],
            LabelAction::Goto => vec![format!("@{label}"), "0;JMP".into()],
            LabelAction::IfGoto => {
                [lines(&POP_D), vec![format!("@{label}"), "D;JNE".into()]].concat()
            }
        }
    }

    // endregion

    // region: Function calls

    fn function(&mut self, name: &str, locals: usize) -> Vec<String> {
        self.current_function = Some(name.to_owned());

        let mut code = vec![format!("({name})")];
        for _ in 0..locals {
            code.extend(lines(&["@SP", "A=M", "M=0", "@SP", "M=M+1"]));
        }

        code
    }

    pub(super) fn call(&mut self, name: &str, arguments: usize) -> Vec<String> {
        let return_label = format!("{name}$ret${}", self.next_label_id());

        let mut code = vec![format!("@{return_label}"), "D=A".into()];
        code.extend(lines(&PUSH_D));

        for register in FRAME {
            code.extend([format!("@{register}"), "D=M".into()]);
            code.extend(lines(&PUSH_D));
        }

        // ARG = SP - 5 - arguments
        code.extend([
            "@SP".into(),
            "D=M".into(),
            format!("@{}", FRAME.len() + 1 + arguments),
            "D=D-A".into(),
            "@ARG".into(),
            "M=D".into(),
        ]);
        // LCL = SP
        code.extend(lines(&["@SP", "D=M", "@LCL", "M=D"]));

        code.extend([
            format!("@{name}"),
            "0;JMP".into(),
            format!("({return_label})"),
        ]);

        code
    }

    // endregion
}

fn binary(operation: &str) -> Vec<String> {
    [lines(&POP_D), lines(&["A=A-1", operation])].concat()
}

/// `D = *(register + index)`
fn load_indirect(register: &str, index: usize) -> Vec<String> {
    vec![
        format!("@{index}"),
        "D=A".into(),
        format!("@{register}"),
        "A=D+M".into(),
        "D=M".into(),
    ]
}

/// Pops into `*(register + index)`, moving the base temporarily
/// so that no scratch register is needed.
fn store_indirect(register: &str, index: usize) -> Vec<String> {
    [
        vec![
            format!("@{index}"),
            "D=A".into(),
            format!("@{register}"),
            "M=D+M".into(),
        ],
        lines(&POP_D),
        vec![format!("@{register}"), "A=M".into(), "M=D".into()],
        vec![
            format!("@{index}"),
            "D=A".into(),
            format!("@{register}"),
            "M=M-D".into(),
        ],
    ]
    .concat()
}

const fn temp_address(index: usize) -> Result<usize, ErrorKind> {
    if index < TEMP_SIZE {
        Ok(TEMP_BASE + index)
    } else {
        Err(ErrorKind::TempIndex(index))
    }
}

const fn pointer_register(index: usize) -> Result<&'static str, ErrorKind> {
    match index {
        0 => Ok("THIS"),
        1 => Ok("THAT"),
        _ => Err(ErrorKind::PointerIndex(index)),
    }
}

fn vm_return() -> Vec<String> {
    let mut code = lines(&[
        // R13 = frame
        "@LCL", "D=M", "@R13", "M=D", //
        // R14 = return address
        "@5", "A=D-A", "D=M", "@R14", "M=D",
    ]);

    // *ARG = return value; SP = ARG + 1
    code.extend(lines(&POP_D));
    code.extend(lines(&["@ARG", "A=M", "M=D", "@ARG", "D=M+1", "@SP", "M=D"]));

    for register in FRAME.iter().rev() {
        code.extend([
            "@R13".into(),
            "AM=M-1".into(),
            "D=M".into(),
            format!("@{register}"),
            "M=D".into(),
        ]);
    }

    code.extend(lines(&["@R14", "A=M", "0;JMP"]));
    code
}
