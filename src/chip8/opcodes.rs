//! The instruction set of the chip.
//!
//! Every handler validates everything that can fail before it writes to the chip, so a
//! failing instruction never leaves a partially updated state behind. Flags are computed
//! from copies of the operands taken before the first register write, as `VF` may be one of
//! the operands.
use crate::{
    definitions::{cpu, memory},
    opcode::{Opcode, OpcodeTrait, Operation, ProgramCounterStep},
};

use super::{dispatch::Outcome, ChipSet};

const FLAG: usize = cpu::register::LAST;

#[inline]
fn step(step: ProgramCounterStep) -> Outcome {
    Ok((step, Operation::None))
}

#[inline]
fn next() -> Outcome {
    step(ProgramCounterStep::Next)
}

impl ChipSet {
    /// - `00E0` - Display  - `disp_clear()`        - Clears the screen.
    pub(super) fn clear_display(&mut self, _: Opcode) -> Outcome {
        self.display.clear();
        Ok((ProgramCounterStep::Next, Operation::Draw))
    }

    /// - `00EE` - Flow     - `return;`             - Returns from a subroutine.
    pub(super) fn return_subroutine(&mut self, _: Opcode) -> Outcome {
        let pc = self.pop_stack()?;
        step(ProgramCounterStep::Jump(pc))
    }

    /// - `1NNN` - Flow     - `goto NNN;`           - Jumps to address `NNN`.
    pub(super) fn jump(&mut self, opcode: Opcode) -> Outcome {
        step(ProgramCounterStep::Jump(opcode.nnn()))
    }

    /// - `2NNN` - Flow     - `*(0xNNN)()`          - Calls subroutine at `NNN`.
    ///
    /// The address of the opcode after the call is pushed as return address.
    pub(super) fn call_subroutine(&mut self, opcode: Opcode) -> Outcome {
        let ret = ProgramCounterStep::Next.apply(self.program_counter);
        self.push_stack(ret)?;
        step(ProgramCounterStep::Jump(opcode.nnn()))
    }

    /// - `3XNN` - Cond    - `if(Vx==NN)`          - Skips the next instruction if `VX` equals `NN`.
    pub(super) fn skip_equals_const(&mut self, opcode: Opcode) -> Outcome {
        let (x, nn) = opcode.xnn();
        step(ProgramCounterStep::cond(self.registers[x] == nn))
    }

    /// - `4XNN` - Cond     - `if(Vx!=NN)`          - Skips the next instruction if `VX` doesn't equal `NN`.
    pub(super) fn skip_not_equals_const(&mut self, opcode: Opcode) -> Outcome {
        let (x, nn) = opcode.xnn();
        step(ProgramCounterStep::cond(self.registers[x] != nn))
    }

    /// - `5XY0` - Cond     - `if(Vx==Vy)`          - Skips the next instruction if `VX` equals `VY`.
    pub(super) fn skip_equals_register(&mut self, opcode: Opcode) -> Outcome {
        let (x, y) = opcode.xy();
        step(ProgramCounterStep::cond(self.registers[x] == self.registers[y]))
    }

    /// - `6XNN` - Const    - `Vx = NN`             - Sets `VX` to `NN`.
    pub(super) fn set_const(&mut self, opcode: Opcode) -> Outcome {
        let (x, nn) = opcode.xnn();
        self.registers[x] = nn;
        next()
    }

    /// - `7XNN` - Const    - `Vx += NN`            - Adds `NN` to `VX`. (Carry flag is not changed)
    pub(super) fn add_const(&mut self, opcode: Opcode) -> Outcome {
        let (x, nn) = opcode.xnn();
        // let VX overflow, but ignore carry
        self.registers[x] = self.registers[x].wrapping_add(nn);
        next()
    }

    /// - `8XY0` - Assign   - `Vx=Vy`               - Sets `VX` to the value of `VY`.
    pub(super) fn set_register(&mut self, opcode: Opcode) -> Outcome {
        let (x, y) = opcode.xy();
        self.registers[x] = self.registers[y];
        next()
    }

    /// - `8XY1` - BitOp    - `Vx=Vx|Vy`            - Sets `VX` to `VX` or `VY`.
    pub(super) fn or(&mut self, opcode: Opcode) -> Outcome {
        let (x, y) = opcode.xy();
        self.registers[x] |= self.registers[y];
        next()
    }

    /// - `8XY2` - BitOp    - `Vx=Vx&Vy`            - Sets `VX` to `VX` and `VY`.
    pub(super) fn and(&mut self, opcode: Opcode) -> Outcome {
        let (x, y) = opcode.xy();
        self.registers[x] &= self.registers[y];
        next()
    }

    /// - `8XY3` - BitOp    - `Vx=Vx^Vy`            - Sets `VX` to `VX` xor `VY`.
    pub(super) fn xor(&mut self, opcode: Opcode) -> Outcome {
        let (x, y) = opcode.xy();
        self.registers[x] ^= self.registers[y];
        next()
    }

    /// - `8XY4` - Math     - `Vx += Vy`            - Adds `VY` to `VX`. `VF` is set to `1` when
    /// there's a carry, and to `0` when there isn't.
    pub(super) fn add_with_carry(&mut self, opcode: Opcode) -> Outcome {
        let (x, y) = opcode.xy();
        let (left, right) = (self.registers[x], self.registers[y]);
        let (res, carry) = left.overflowing_add(right);
        self.registers[x] = res;
        self.registers[FLAG] = carry as u8;
        next()
    }

    /// - `8XY5` - Math     - `Vx -= Vy`            - `VY` is subtracted from `VX`. `VF` is set to
    /// `0` when there's a borrow, and `1` when there isn't.
    pub(super) fn sub_with_borrow(&mut self, opcode: Opcode) -> Outcome {
        let (x, y) = opcode.xy();
        let (left, right) = (self.registers[x], self.registers[y]);
        self.registers[x] = left.wrapping_sub(right);
        self.registers[FLAG] = (left >= right) as u8;
        next()
    }

    /// - `8XY6` - BitOp    - `Vx>>=1`              - Stores the least significant bit of `VX` in
    /// `VF` and then shifts `VX` to the right by `1`.
    pub(super) fn shift_right(&mut self, opcode: Opcode) -> Outcome {
        let x = opcode.x();
        let value = self.registers[x];
        self.registers[x] = value >> 1;
        self.registers[FLAG] = value & 0x01;
        next()
    }

    /// - `8XY7` - Math     - `Vx=Vy-Vx`            - Sets `VX` to `VY` minus `VX`. `VF` is set to
    /// `0` when there's a borrow, and `1` when there isn't.
    pub(super) fn sub_reverse(&mut self, opcode: Opcode) -> Outcome {
        let (x, y) = opcode.xy();
        let (left, right) = (self.registers[y], self.registers[x]);
        self.registers[x] = left.wrapping_sub(right);
        self.registers[FLAG] = (left >= right) as u8;
        next()
    }

    /// - `8XYE` - BitOp    - `Vx<<=1`              - Stores the most significant bit of `VX` in
    /// `VF` and then shifts `VX` to the left by `1`.
    pub(super) fn shift_left(&mut self, opcode: Opcode) -> Outcome {
        const SHIFT_SIGNIFICANT: u8 = 7;
        let x = opcode.x();
        let value = self.registers[x];
        self.registers[x] = value << 1;
        self.registers[FLAG] = value >> SHIFT_SIGNIFICANT;
        next()
    }

    /// - `9XY0` - Cond     - `if(Vx!=Vy)`          - Skips the next instruction if `VX` doesn't equal `VY`.
    pub(super) fn skip_not_equals_register(&mut self, opcode: Opcode) -> Outcome {
        let (x, y) = opcode.xy();
        step(ProgramCounterStep::cond(self.registers[x] != self.registers[y]))
    }

    /// - `ANNN` - MEM    - `I = NNN`             - Sets `I` to the address `NNN`.
    pub(super) fn set_index(&mut self, opcode: Opcode) -> Outcome {
        self.index_register = opcode.nnn();
        next()
    }

    /// - `BNNN` - Flow    - `PC=V0+NNN`           - Jumps to the address `NNN` plus `V0`.
    ///
    /// The target wraps around at the end of the twelve bit address space.
    pub(super) fn jump_offset(&mut self, opcode: Opcode) -> Outcome {
        let target = opcode.nnn() + self.registers[0] as u16;
        step(ProgramCounterStep::Jump(target & memory::ADDRESS_MASK))
    }

    /// - `CXNN` - Rand     - `Vx=rand()&NN`        - Sets `VX` to the result of a bitwise and
    /// operation on a random number (Typically: `0 to 255`) and `NN`.
    pub(super) fn random(&mut self, opcode: Opcode) -> Outcome {
        let (x, nn) = opcode.xnn();
        // using a fill bytes call here, as the trait RngCore does not
        // support random u8.
        let mut rand = [0u8; 1];
        self.rng.fill_bytes(&mut rand);
        self.registers[x] = nn & rand[0];
        next()
    }

    /// - `DXYN` - Disp     - `draw(Vx,Vy,N)`       - Draws a sprite at coordinate `(VX, VY)` that
    /// has a width of `8` pixels and a height of `N` pixels. Each row of `8` pixels is read as
    /// bit-coded starting from memory location `I`; `I` value doesn't change after the execution
    /// of this instruction. `VF` is set to `1` if any screen pixels are flipped from set to unset
    /// when the sprite is drawn, and to `0` if that doesn't happen.
    ///
    /// Pixels leaving the screen wrap around to the opposite edge.
    pub(super) fn draw(&mut self, opcode: Opcode) -> Outcome {
        const BYTE: usize = 8;

        let (reg_x, reg_y, n) = opcode.xyn();
        let coorx = self.registers[reg_x] as usize;
        let coory = self.registers[reg_y] as usize;

        let sprite = self.memory.slice(self.index_register as usize, n)?;

        let mut collision = false;
        for (i, row) in sprite.iter().enumerate() {
            for j in 0..BYTE {
                let mask = 0x80u8 >> j;
                if row & mask == 0 {
                    continue;
                }
                collision |= self.display.flip(coorx + j, coory + i);
            }
        }
        self.registers[FLAG] = collision as u8;

        Ok((ProgramCounterStep::Next, Operation::Draw))
    }

    /// - `EX9E` - KeyOp    - `if(key()==Vx)`       - Skips the next instruction if the key stored
    /// in `VX` is pressed.
    pub(super) fn skip_key_pressed(&mut self, opcode: Opcode) -> Outcome {
        let key = self.key_register(opcode.x());
        step(ProgramCounterStep::cond(self.keyboard.is_pressed(key)))
    }

    /// - `EXA1` - KeyOp    - `if(key()!=Vx)`       - Skips the next instruction if the key stored
    /// in `VX` isn't pressed.
    pub(super) fn skip_key_not_pressed(&mut self, opcode: Opcode) -> Outcome {
        let key = self.key_register(opcode.x());
        step(ProgramCounterStep::cond(!self.keyboard.is_pressed(key)))
    }

    /// - `FX07` - Timer    - `Vx = get_delay()`    - Sets `VX` to the value of the delay timer.
    pub(super) fn get_delay_timer_into(&mut self, opcode: Opcode) -> Outcome {
        self.registers[opcode.x()] = self.delay_timer.get_value();
        next()
    }

    /// - `FX0A` - KeyOp    - `Vx = get_key()`      - A key press is awaited, and then stored in `VX`.
    ///
    /// While no key is pressed the program counter stays on this opcode and the host is told
    /// to wait, so the opcode runs again with the next key snapshot.
    pub(super) fn await_key_press(&mut self, opcode: Opcode) -> Outcome {
        match self.keyboard.first_pressed() {
            Some(key) => {
                self.registers[opcode.x()] = key;
                next()
            }
            None => Ok((ProgramCounterStep::None, Operation::Wait)),
        }
    }

    /// - `FX15` - Timer    - `delay_timer(Vx)`     - Sets the delay timer to `VX`.
    pub(super) fn set_delay_timer(&mut self, opcode: Opcode) -> Outcome {
        self.delay_timer.set_value(self.registers[opcode.x()]);
        next()
    }

    /// - `FX18` - Sound    - `sound_timer(Vx)`     - Sets the sound timer to `VX`.
    pub(super) fn set_sound_timer(&mut self, opcode: Opcode) -> Outcome {
        self.sound_timer.set_value(self.registers[opcode.x()]);
        next()
    }

    /// - `FX1E` - MEM      - `I +=Vx`              - Adds `VX` to `I`. `VF` is set to `1` when
    /// there is a range overflow (`I+VX>0xFFF`), and to `0` when there isn't.
    pub(super) fn add_index(&mut self, opcode: Opcode) -> Outcome {
        let sum = self.index_register as u32 + self.registers[opcode.x()] as u32;
        self.index_register = sum as u16;
        self.registers[FLAG] = (sum > memory::ADDRESS_MASK as u32) as u8;
        next()
    }

    /// - `FX29` - MEM      - `I=sprite_addr[Vx]`   - Sets `I` to the location of the sprite for
    /// the character in `VX`. Characters `0-F` (in hexadecimal) are represented by a `4x5` font.
    pub(super) fn set_index_to_sprite(&mut self, opcode: Opcode) -> Outcome {
        use crate::definitions::display::fontset::GLYPH_SIZE;

        let digit = self.key_register(opcode.x()) as usize;
        self.index_register = (self.config.font_location() + digit * GLYPH_SIZE) as u16;
        next()
    }

    /// - `FX33` - BCD      - `246 / 100 => 2` `246 / 10 => 24 % 10 => 4` `246 % 10 => 6` -
    /// Stores the [binary-coded decimal](https://en.wikipedia.org/wiki/Binary-coded_decimal)
    /// representation of `VX`, the hundreds digit at `I`, the tens digit at `I+1`, and the ones
    /// digit at `I+2`.
    pub(super) fn store_bcd(&mut self, opcode: Opcode) -> Outcome {
        let r = self.registers[opcode.x()];
        let target = self.memory.slice_mut(self.index_register as usize, 3)?;

        target[0] = r / 100;
        target[1] = r / 10 % 10;
        target[2] = r % 10;
        next()
    }

    /// - `FX55` - MEM      - `reg_dump(Vx,&I)`     - Stores `V0` to `VX` (including `VX`) in
    /// memory starting at address `I`. `I` itself is left unmodified.
    pub(super) fn store_registers(&mut self, opcode: Opcode) -> Outcome {
        let x = opcode.x();
        self.memory
            .slice_mut(self.index_register as usize, x + 1)?
            .copy_from_slice(&self.registers[..=x]);
        next()
    }

    /// - `FX65` - MEM      - `reg_load(Vx,&I)`     - Fills `V0` to `VX` (including `VX`) with
    /// values from memory starting at address `I`. `I` itself is left unmodified.
    pub(super) fn load_registers(&mut self, opcode: Opcode) -> Outcome {
        let x = opcode.x();
        let source = self.memory.slice(self.index_register as usize, x + 1)?;
        self.registers[..=x].copy_from_slice(source);
        next()
    }

    /// The value of the register, reduced to a single hex digit.
    fn key_register(&self, x: usize) -> u8 {
        let value = self.registers[x];
        if value > 0xF {
            log::warn!("V{:X} holds {:#04X}, only the low nibble is used", x, value);
        }
        value & 0xF
    }
}
