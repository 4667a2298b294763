use rand::RngCore;
use tinyvec::ArrayVec;

use crate::{
    config::Config,
    definitions::{cpu, keyboard},
    devices::{FrameBuffer, Keyboard, Row},
    memory::Memory,
    opcode::{self, Opcode, Operation, ProgramCounter, ProgramCounterStep},
    resources::Rom,
    timer::{NoCallback, Timer, TimerCallback},
    ProcessError, StackError,
};

use super::dispatch;

/// The ChipSet struct represents the current state
/// of the system, it contains all the structures
/// needed for emulating an instant on the
/// Chip8 CPU.
///
/// Every instance owns its whole state, a host running multiple machines creates one
/// chipset per machine.
pub struct ChipSet {
    /// the loaded rom, kept for resetting
    pub(super) rom: Rom,
    /// the settings used while loading and running
    pub(super) config: Config,
    /// all two bytes long and stored big-endian
    pub(super) opcode: Opcode,
    /// - `0x000-0x1FF` - Chip 8 interpreter (contains font set in emu)
    /// - `0x050-0x0A0` - Used for the built in `4x5` pixel font set (`0-F`)
    /// - `0x200-0xFFF` - Program ROM and work RAM
    pub(super) memory: Memory,
    /// `8-bit` data registers named `V0` to `VF`. The `VF` register doubles as a flag for some
    /// instructions; thus, it should be avoided. In an addition operation, `VF` is the carry flag,
    /// while in subtraction, it is the "no borrow" flag. In the draw instruction `VF` is set upon
    /// pixel collision.
    pub(super) registers: [u8; cpu::register::SIZE],
    /// The index for the register, this is a special register entry
    /// called index `I`
    pub(super) index_register: u16,
    /// The program counter is a CPU register in the computer processor which has the address of the
    /// next instruction to be executed from memory.
    pub(super) program_counter: u16,
    /// The stack is only used to store return addresses when subroutines are called. The original
    /// [RCA 1802](https://de.wikipedia.org/wiki/RCA1802) version allocated `48` bytes for up to
    /// `12` levels of nesting; modern implementations usually have more.
    /// (here we are using `16`)
    pub(super) stack: ArrayVec<[u16; cpu::stack::SIZE]>,
    /// Delay timer: This timer is intended to be used for timing the events of games. Its value
    /// can be set and read.
    pub(super) delay_timer: Timer<NoCallback>,
    /// Sound timer: This timer is used for sound effects. When it reaches zero the beep callback
    /// is run.
    pub(super) sound_timer: Timer<Box<dyn TimerCallback + Send>>,
    /// cycles run since the last timer tick
    pub(super) cycles_since_tick: u32,
    /// The graphics of the Chip 8 are black and white and the screen has a total of `2048` pixels
    /// `(64 x 32)`.
    pub(super) display: FrameBuffer,
    /// The key snapshot given by the host before a cycle.
    pub(super) keyboard: Keyboard,
    /// This stores the random number generator, used by the chipset.
    /// It is stored into the chipset, so as to enable simple mocking
    /// of the given type.
    pub(super) rng: Box<dyn RngCore + Send>,
}

impl ChipSet {
    /// will create a new chipset object with the default configuration
    pub fn new(rom: Rom) -> Result<Self, ProcessError> {
        Self::with_config(rom, Config::default())
    }

    /// will create a new chipset object
    pub fn with_config(rom: Rom, config: Config) -> Result<Self, ProcessError> {
        let memory = Self::load_memory(&rom, &config)?;

        Ok(Self {
            rom,
            config,
            opcode: 0,
            memory,
            registers: [0; cpu::register::SIZE],
            index_register: 0,
            program_counter: cpu::PROGRAM_COUNTER as u16,
            stack: ArrayVec::new(),
            delay_timer: Timer::new(0),
            sound_timer: Timer::with_callback(0, Box::new(NoCallback)),
            cycles_since_tick: 0,
            display: FrameBuffer::new(),
            keyboard: Keyboard::new(),
            rng: Box::new(rand::rngs::OsRng),
        })
    }

    /// Will replace the random source used by `CXNN`.
    pub fn with_rng<R>(mut self, rng: R) -> Self
    where
        R: RngCore + Send + 'static,
    {
        self.rng = Box::new(rng);
        self
    }

    /// Will replace the callback run once the sound timer reaches zero.
    pub fn with_sound_callback<S>(mut self, callback: S) -> Self
    where
        S: TimerCallback + Send + 'static,
    {
        let value = self.sound_timer.get_value();
        self.sound_timer = Timer::with_callback(value, Box::new(callback));
        self
    }

    fn load_memory(rom: &Rom, config: &Config) -> Result<Memory, ProcessError> {
        let mut memory = Memory::new();
        Self::fill_memory(&mut memory, rom, config)?;
        Ok(memory)
    }

    fn fill_memory(memory: &mut Memory, rom: &Rom, config: &Config) -> Result<(), ProcessError> {
        memory.load_fontset(config.font_location())?;
        memory.load_program(rom.get_data())?;
        Ok(())
    }

    /// Will bring the chip back into the state right after loading the rom.
    /// The random source and the sound callback are kept.
    pub fn reset(&mut self) -> Result<(), ProcessError> {
        self.memory.clear();
        Self::fill_memory(&mut self.memory, &self.rom, &self.config)?;
        self.opcode = 0;
        self.registers = [0; cpu::register::SIZE];
        self.index_register = 0;
        self.program_counter = cpu::PROGRAM_COUNTER as u16;
        self.stack.clear();
        self.delay_timer.set_value(0);
        self.sound_timer.set_value(0);
        self.cycles_since_tick = 0;
        self.display.clear();
        self.keyboard.reset();
        log::debug!("reset chip running '{}'", self.rom.get_name());
        Ok(())
    }

    /// will get the next opcode from memory
    pub(super) fn set_opcode(&mut self) -> Result<(), ProcessError> {
        // will build the opcode given from the pointer
        self.opcode = opcode::build_opcode(self.memory.as_slice(), self.program_counter as usize)?;
        Ok(())
    }

    /// Will advance the program by a single instruction and a single timer tick.
    ///
    /// - `Ok(Operation::Wait)` - the instruction waits for a key press, the program counter
    ///   did not move
    /// - a recoverable error - the opcode could not be decoded, the program counter was still
    ///   moved to the next opcode and the timers ticked
    /// - any other error - nothing in the state was changed
    pub fn next(&mut self) -> Result<Operation, ProcessError> {
        // get next opcode
        self.set_opcode()?;
        let opcode = self.opcode;

        match dispatch::execute(self, opcode) {
            Ok((step, operation)) => {
                self.step(step);
                self.tick_timers();
                Ok(operation)
            }
            Err(err) if err.is_recoverable() => {
                log::warn!("{} at {:#06X}", err, self.program_counter);
                self.step(ProgramCounterStep::Next);
                self.tick_timers();
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Will take the key snapshot and run a single cycle.
    pub fn cycle(&mut self, keys: &[bool; keyboard::SIZE]) -> Result<Operation, ProcessError> {
        self.set_keyboard(keys);
        self.next()
    }

    fn tick_timers(&mut self) {
        self.cycles_since_tick += 1;
        if self.cycles_since_tick < self.config.timer_divider() {
            return;
        }
        self.cycles_since_tick = 0;

        self.delay_timer.tick();
        if self.sound_timer.tick() {
            log::debug!("sound timer reached zero");
        }
    }

    /// Will write keyboard data into the internal keyboard representation.
    pub fn set_keyboard(&mut self, keys: &[bool; keyboard::SIZE]) {
        self.keyboard.set_mult(keys);
    }

    /// Will set the value of the given key
    pub fn set_key(&mut self, key: usize, to: bool) {
        self.keyboard.set_key(key, to)
    }

    /// Will toggle the given key
    pub fn toggle_key(&mut self, key: usize) {
        self.keyboard.toggle_key(key)
    }

    /// Will get the current state of the keyboard
    pub fn get_keyboard(&self) -> &[bool] {
        self.keyboard.get_keys()
    }

    /// will return the sound timer
    pub fn get_sound_timer(&self) -> u8 {
        self.sound_timer.get_value()
    }

    /// will return the delay timer
    pub fn get_delay_timer(&self) -> u8 {
        self.delay_timer.get_value()
    }

    /// Will return a immutable slice of the current display configuration
    pub fn get_display(&self) -> &[Row] {
        self.display.rows()
    }

    pub fn get_framebuffer(&self) -> &FrameBuffer {
        &self.display
    }

    pub fn get_memory(&self) -> &Memory {
        &self.memory
    }

    pub fn get_registers(&self) -> &[u8] {
        &self.registers
    }

    pub fn get_index_register(&self) -> u16 {
        self.index_register
    }

    pub fn get_program_counter(&self) -> u16 {
        self.program_counter
    }

    /// The return addresses, the last one is the top of the stack
    pub fn get_stack(&self) -> &[u16] {
        &self.stack
    }

    /// The last fetched opcode
    pub fn get_opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn get_name(&self) -> &str {
        self.rom.get_name()
    }

    /// Will push the given pointer to the stack
    pub(super) fn push_stack(&mut self, pointer: u16) -> Result<(), StackError> {
        match self.stack.try_push(pointer) {
            None => {
                log::debug!("push {:#06X}, depth {}", pointer, self.stack.len());
                Ok(())
            }
            Some(_) => Err(StackError::Full),
        }
    }

    /// Will pop from the stack
    pub(super) fn pop_stack(&mut self) -> Result<u16, StackError> {
        let pointer = self.stack.pop().ok_or(StackError::Empty)?;
        log::debug!("pop {:#06X}, depth {}", pointer, self.stack.len());
        Ok(pointer)
    }
}

impl ProgramCounter for ChipSet {
    fn step(&mut self, step: ProgramCounterStep) {
        self.program_counter = step.apply(self.program_counter);
    }
}
