use crate::vm::{self, LabelAction, Segment, VMCommand, VMInstruction};

/// Collects the VM instructions of one class.
#[derive(Debug, Default)]
pub struct VMWriter {
    output: Vec<VMInstruction>,
    next_label_id: usize,
}

impl VMWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_push(&mut self, segment: Segment, index: usize) {
        self.output.push(vm::push(segment, index));
    }

    pub fn write_pop(&mut self, segment: Segment, index: usize) {
        self.output.push(vm::pop(segment, index));
    }

    pub fn write_arithmetic(&mut self, command: VMCommand) {
        self.output.push(vm::command(command));
    }

    pub fn write_label(&mut self, label: &str) {
        self.output.push(vm::label(LabelAction::Label, label));
    }

    pub fn write_goto(&mut self, label: &str) {
        self.output.push(vm::label(LabelAction::Goto, label));
    }

    /// Writes an `if-goto`, returning its position so the target can be changed later.
    pub fn write_if(&mut self, label: &str) -> usize {
        self.output.push(vm::label(LabelAction::IfGoto, label));
        self.output.len() - 1
    }

    /// Point the `if-goto` written at `position` to `label` instead.
    pub fn retarget(&mut self, position: usize, label: &str) {
        if let Some(VMInstruction::Label(LabelAction::IfGoto, target)) =
            self.output.get_mut(position)
        {
            label.clone_into(target);
        }
    }

    pub fn write_call(&mut self, function_name: &str, argument_count: usize) {
        self.output.push(vm::call(function_name, argument_count));
    }

    pub fn write_function(&mut self, function_name: &str, local_count: usize) {
        self.output.push(vm::function(function_name, local_count));
    }

    pub fn write_return(&mut self) {
        self.output.push(vm::vm_return());
    }

    /// Hands out the next label number of this class.
    pub fn new_label_id(&mut self) -> usize {
        let id = self.next_label_id;
        self.next_label_id += 1;
        id
    }

    /// Render the collected code as `.vm` text, one instruction per line.
    pub fn finish(&self) -> String {
        self.output
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
