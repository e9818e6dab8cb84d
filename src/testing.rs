//! A minimal Hack CPU for running generated programs in tests.

use crate::{
    assembler::{instruction::Word, Assembler},
    compiler,
    fileio::input::SourceFile,
    translator,
};

const RAM_SIZE: usize = 0x8000;

pub struct Cpu {
    pub ram: Vec<i16>,
    rom: Vec<Word>,
    a: i16,
    d: i16,
    pc: usize,
}

impl Cpu {
    pub fn new(rom: Vec<Word>) -> Self {
        Self {
            ram: vec![0; RAM_SIZE],
            rom,
            a: 0,
            d: 0,
            pc: 0,
        }
    }

    /// Execute at most `steps` instructions, stopping early if the program counter leaves the ROM.
    pub fn run(&mut self, steps: usize) {
        for _ in 0..steps {
            let Some(&instruction) = self.rom.get(self.pc) else {
                return;
            };
            self.execute(instruction);
        }
    }

    fn execute(&mut self, instruction: Word) {
        if instruction & 0x8000 == 0 {
            self.a = instruction as i16;
            self.pc += 1;
            return;
        }

        let address = self.a as u16 as usize;
        let y = if instruction & 0x1000 == 0 {
            self.a
        } else {
            self.ram[address]
        };
        let out = alu(self.d, y, (instruction >> 6) & 0b11_1111);

        let destination = (instruction >> 3) & 0b111;
        if destination & 0b001 != 0 {
            self.ram[address] = out;
        }
        if destination & 0b010 != 0 {
            self.d = out;
        }
        if destination & 0b100 != 0 {
            self.a = out;
        }

        let jump = instruction & 0b111;
        let taken = (jump & 0b100 != 0 && out < 0)
            || (jump & 0b010 != 0 && out == 0)
            || (jump & 0b001 != 0 && out > 0);

        self.pc = if taken { address } else { self.pc + 1 };
    }
}

fn alu(mut x: i16, mut y: i16, control: Word) -> i16 {
    if control & 0b10_0000 != 0 {
        x = 0;
    }
    if control & 0b01_0000 != 0 {
        x = !x;
    }
    if control & 0b00_1000 != 0 {
        y = 0;
    }
    if control & 0b00_0100 != 0 {
        y = !y;
    }

    let out = if control & 0b10 != 0 {
        x.wrapping_add(y)
    } else {
        x & y
    };

    if control & 1 != 0 {
        !out
    } else {
        out
    }
}

/// Assemble and load a translated program.
fn load(units: &[SourceFile]) -> Cpu {
    let assembly = translator::translate(units).unwrap_or_default();
    let words = Assembler::new().assemble(&assembly).unwrap_or_default();
    assert!(!words.is_empty(), "program should translate and assemble");

    Cpu::new(words)
}

/// Compile `Jack` classes and load them as one program.
fn load_jack(classes: &[(&str, &str)]) -> Cpu {
    let units = classes
        .iter()
        .map(|(name, source)| {
            let vm_code = compiler::compile_class(&SourceFile::internal(*name, *source));
            assert!(vm_code.is_ok(), "{name} should compile: {vm_code:?}");
            SourceFile::internal(*name, vm_code.unwrap_or_default())
        })
        .collect::<Vec<_>>();

    load(&units)
}

const SYS: &str = "
class Sys {
    function void init() {
        do Main.main();
        while (true) {}
    }
}";

const MEMORY: &str = "
/** Bump allocator standing in for the OS heap. */
class Memory {
    static int next;

    function int alloc(int size) {
        var int block;
        if (next = 0) {
            let next = 2048;
        }
        let block = next;
        let next = next + size;
        return block;
    }
}";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alu() {
        assert_eq!(alu(5, 3, 0b00_0010), 8);
        assert_eq!(alu(5, 3, 0b01_0011), 2);
        assert_eq!(alu(5, 3, 0b00_0111), -2);
        assert_eq!(alu(5, 3, 0b11_1010), -1);
        assert_eq!(alu(5, 3, 0b00_1111), -5);
    }

    #[test]
    fn test_comparisons_push_booleans() {
        let unit = SourceFile::internal(
            "Prog",
            [
                "push constant 7",
                "push constant 8",
                "lt",
                "push constant 7",
                "push constant 8",
                "gt",
                "push constant 9",
                "push constant 9",
                "eq",
                "push constant 1",
                "neg",
                "push constant 12",
                "and",
            ]
            .join("\n"),
        );

        let mut cpu = load(&[unit]);
        cpu.ram[0] = 256;
        cpu.run(1_000);

        assert_eq!(cpu.ram[0], 260);
        assert_eq!(cpu.ram[256..260], [-1, 0, -1, 12]);
    }

    #[test]
    fn test_statics_of_unit_eq_are_variables() {
        let unit = SourceFile::internal(
            "EQ",
            [
                "push constant 1",
                "push constant 1",
                "eq",
                "push constant 5",
                "pop static 0",
            ]
            .join("\n"),
        );

        let mut cpu = load(&[unit]);
        cpu.ram[0] = 256;
        cpu.run(1_000);

        assert_eq!(cpu.ram[0], 257);
        assert_eq!(cpu.ram[256], -1);
        // `EQ.0` is the first variable
        assert_eq!(cpu.ram[16], 5);
    }

    #[test]
    fn test_call_return_restores_frame() {
        let unit = SourceFile::internal(
            "Foo",
            [
                "push constant 3",
                "call Foo.double 1",
                "label END",
                "goto END",
                "function Foo.double 2",
                "push argument 0",
                "push argument 0",
                "add",
                "pop local 1",
                "push constant 5000",
                "pop pointer 0",
                "push constant 6000",
                "pop pointer 1",
                "push local 1",
                "return",
            ]
            .join("\n"),
        );

        let mut cpu = load(&[unit]);
        cpu.ram[0..5].copy_from_slice(&[256, 300, 400, 3000, 4000]);
        cpu.run(1_000);

        // SP, LCL, ARG, THIS, THAT
        assert_eq!(cpu.ram[0..5], [257, 300, 400, 3000, 4000]);
        assert_eq!(cpu.ram[256], 6);
    }

    #[test]
    fn test_array_store_survives_that_changes() {
        let main = "
        class Main {
            function void main() {
                var Array a;
                let a = 8000;
                let a[2] = Main.f();
                return;
            }

            function int f() {
                var Array b;
                let b = 9000;
                let b[1] = 42;
                return 7;
            }
        }";

        let mut cpu = load_jack(&[("Main", main), ("Sys", SYS)]);
        cpu.run(10_000);

        assert_eq!(cpu.ram[8002], 7);
        assert_eq!(cpu.ram[9001], 42);
    }

    #[test]
    fn test_objects_and_control_flow() {
        let point = "
        class Point {
            field int x, y;

            constructor Point new(int ax, int ay) {
                let x = ax;
                let y = ay;
                return this;
            }

            method int sum() {
                return x + y;
            }
        }";

        let main = "
        class Main {
            function void main() {
                var Array out;
                var Point p;
                var int i, total;

                let out = 7000;
                let p = Point.new(3, 4);
                let out[0] = p.sum();

                let i = 1;
                while (~(i > 10)) {
                    let total = total + i;
                    let i = i + 1;
                }
                let out[1] = total;

                if (total > 50) {
                    let out[2] = 1;
                } else {
                    let out[2] = 2;
                }
                let out[3] = -out[0];
                return;
            }
        }";

        let mut cpu = load_jack(&[
            ("Main", main),
            ("Memory", MEMORY),
            ("Point", point),
            ("Sys", SYS),
        ]);
        cpu.run(50_000);

        assert_eq!(cpu.ram[7000..7004], [7, 55, 1, -7]);
        // both fields of the single `Point` live at the start of the heap
        assert_eq!(cpu.ram[2048..2050], [3, 4]);
    }
}
