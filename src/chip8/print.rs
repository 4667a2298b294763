//! A human readable dump of the [`ChipSet`](super::ChipSet) state.

use super::ChipSet;
use crate::definitions::cpu;
use std::fmt;

/// Values per printed row
const ROW_LEN: usize = 8;

const END_OF_LINE: char = '\n';
const INDENT_CHAR: char = '\t';
const INDENT_SIZE: usize = 2;

/// Removes the new line after the last row.
fn drop_last_line_break(text: &mut String) {
    if let Some(index) = text.rfind(END_OF_LINE) {
        text.truncate(index);
    }
}

fn push_indent(text: &mut String, indent: usize) {
    for _ in 0..indent {
        text.push(INDENT_CHAR);
    }
}

macro_rules! intsize {
    () => {
        6
    };
}

macro_rules! intformat {
    () => {
        // `0x` followed by four hex digits
        concat!("{:#0", intsize!(), "X}")
    };
}

const INTEGER_LEN: usize = intsize!();

/// upper bound of a printed line, used for preallocation
const LINE_CAPACITY: usize = INDENT_SIZE + ROW_LEN * (INTEGER_LEN + 1) + 1 + 2 * INTEGER_LEN + 5;

mod pointer_print {
    use std::fmt::Write;
    /// `from - to :` prefix of a row
    pub(super) fn formatter(line: &mut String, from: usize, to: usize) -> std::fmt::Result {
        write!(
            line,
            concat!(intformat!(), " - ", intformat!(), " :"),
            from, to
        )
    }
}

/// Memory rows, read as big-endian words
mod opcode_print {
    use super::{integer_print, pointer_print, ROW_LEN};
    use crate::{definitions::memory, opcode::Opcode};
    use once_cell::sync::Lazy;
    use std::fmt::{self, Write};

    /// bytes per row
    const ROW_BYTES: usize = ROW_LEN * memory::opcodes::SIZE as usize;
    const ELLIPSIS: &str = "...";

    /// Replaces the words of a zero row, aligned to the width of a full row.
    static ZERO_FILLER: Lazy<String> = Lazy::new(|| {
        let mut formatted = String::new();
        // writing into a string never fails
        let _ = integer_print::formatter(&mut formatted, 0u16);
        let gap = formatted.len() * (ROW_LEN - 2) + (ROW_LEN - 1)
            - ELLIPSIS.len();
        let filler = " ".repeat(gap / 2);

        format!(
            "{}{}{}{}{}",
            formatted, filler, ELLIPSIS, filler, formatted
        )
    });

    struct Row {
        from: usize,
        to: usize,
        data: [Opcode; ROW_LEN],
        only_null: bool,
    }

    impl fmt::Display for Row {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let mut res = String::with_capacity(super::LINE_CAPACITY);
            pointer_print::formatter(&mut res, self.from, self.to)?;
            res.push(' ');

            if !self.only_null {
                let entries: Vec<String> = self
                    .data
                    .iter()
                    .map(|entry| format!(intformat!(), entry))
                    .collect();
                res.push_str(&entries.join(" "));
            } else {
                res.push_str(&ZERO_FILLER)
            }
            write!(f, "{}", res)
        }
    }

    /// One line per row, consecutive zero rows are merged into one line. Addresses are
    /// counted from the start of `memory`.
    pub(super) fn printer(memory: &[u8], indent: usize) -> Result<String, fmt::Error> {
        let mut rows: Vec<Row> = Vec::with_capacity(memory.len() / ROW_BYTES);

        for (chunk_index, chunk) in memory.chunks(ROW_BYTES).enumerate() {
            let from = chunk_index * ROW_BYTES;
            let to = from + chunk.len() - 1;

            let mut data = [0; ROW_LEN];
            for (entry, pair) in data.iter_mut().zip(chunk.chunks(2)) {
                let low = pair.get(1).copied().unwrap_or(0);
                *entry = Opcode::from_be_bytes([pair[0], low]);
            }
            let only_null = data.iter().all(|&entry| entry == 0);

            let mut row = Row {
                from,
                to,
                data,
                only_null,
            };

            if only_null {
                if let Some(last_row) = rows.last() {
                    if last_row.only_null {
                        row.from = last_row.from;
                        rows.pop();
                    }
                }
            }
            rows.push(row)
        }

        let mut string = String::with_capacity((super::LINE_CAPACITY + 1) * rows.len());
        for row in rows {
            super::push_indent(&mut string, indent);
            write!(string, "{}{}", row, super::END_OF_LINE)?;
        }
        super::drop_last_line_break(&mut string);
        Ok(string)
    }
}

/// Registers and stack entries
mod integer_print {
    use super::{pointer_print, ROW_LEN};
    use num_traits::Unsigned;
    use std::fmt::{self, Write};

    pub(super) fn formatter<T>(line: &mut String, data: T) -> fmt::Result
    where
        T: fmt::Display + fmt::UpperHex + Unsigned + Copy,
    {
        write!(line, intformat!(), data)
    }

    pub(super) fn printer<T>(data: &[T], indent: usize) -> Result<String, fmt::Error>
    where
        T: fmt::Display + fmt::UpperHex + Unsigned + Copy,
    {
        let result_size = super::LINE_CAPACITY * (data.len() / ROW_LEN + 1);

        let mut res = String::with_capacity(result_size);
        for (chunk_index, chunk) in data.chunks(ROW_LEN).enumerate() {
            let from = chunk_index * ROW_LEN;

            super::push_indent(&mut res, indent);
            pointer_print::formatter(&mut res, from, from + chunk.len() - 1)?;

            for entry in chunk {
                res.push(' ');
                formatter(&mut res, *entry)?;
            }
            res.push(super::END_OF_LINE);
        }

        super::drop_last_line_break(&mut res);

        Ok(res)
    }
}

/// Key states
mod bool_print {
    use super::{pointer_print, END_OF_LINE, ROW_LEN, INTEGER_LEN};

    /// padded to the width of a printed integer
    fn formatter(val: bool) -> String {
        format!("{:<width$}", val, width = INTEGER_LEN)
    }

    pub(super) fn printer(data: &[bool], indent: usize) -> Result<String, std::fmt::Error> {
        let result_size = super::LINE_CAPACITY * (data.len() / ROW_LEN + 1);

        let mut res = String::with_capacity(result_size);

        for (chunk_index, chunk) in data.chunks(ROW_LEN).enumerate() {
            let from = chunk_index * ROW_LEN;
            super::push_indent(&mut res, indent);

            pointer_print::formatter(&mut res, from, from + chunk.len() - 1)?;

            let entries: Vec<String> = chunk.iter().map(|&value| formatter(value)).collect();
            res.push(' ');
            res.push_str(entries.join(" ").trim_end());
            res.push(END_OF_LINE);
        }
        super::drop_last_line_break(&mut res);

        Ok(res)
    }
}

/// A single indented value
fn single<T>(value: T) -> Result<String, fmt::Error>
where
    T: fmt::Display + fmt::UpperHex + num_traits::Unsigned + Copy,
{
    let mut line = String::with_capacity(INTEGER_LEN + INDENT_SIZE);
    push_indent(&mut line, INDENT_SIZE);
    integer_print::formatter(&mut line, value)?;
    Ok(line)
}

impl fmt::Display for ChipSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut nam = String::with_capacity(INDENT_SIZE + self.get_name().len());
        push_indent(&mut nam, INDENT_SIZE);
        nam.push_str(self.get_name());

        let mem = opcode_print::printer(self.memory.as_slice(), INDENT_SIZE)?;
        let reg = integer_print::printer(&self.registers, INDENT_SIZE)?;

        // always print all stack slots
        let mut stack = [0u16; cpu::stack::SIZE];
        stack[..self.stack.len()].copy_from_slice(&self.stack);

        let sta = integer_print::printer(&stack, INDENT_SIZE)?;
        let key = bool_print::printer(self.keyboard.get_keys(), INDENT_SIZE)?;

        write!(
            f,
            "Chipset {{\n\
                \tProgram Name :\n{}\n\
                \tOpcode :\n{}\n\
                \tProgram Counter :\n{}\n\
                \tIndex Register :\n{}\n\
                \tDelay Timer :\n{}\n\
                \tSound Timer :\n{}\n\
                \tMemory :\n{}\n\
                \tKeyboard :\n{}\n\
                \tStack :\n{}\n\
                \tRegister :\n{}\n\
                }}",
            nam,
            single(self.opcode)?,
            single(self.program_counter)?,
            single(self.index_register)?,
            single(self.get_delay_timer())?,
            single(self.get_sound_timer())?,
            mem,
            key,
            sta,
            reg
        )
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests;
    use crate::definitions::keyboard;

    const OUTPUT_PRINT: &str = "\
        Chipset {\n\
            \tProgram Name :\n\
                \t\tPRINT\n\
            \tOpcode :\n\
                \t\t0x00E0\n\
            \tProgram Counter :\n\
                \t\t0x0202\n\
            \tIndex Register :\n\
                \t\t0x0000\n\
            \tDelay Timer :\n\
                \t\t0x0000\n\
            \tSound Timer :\n\
                \t\t0x0000\n\
            \tMemory :\n\
                \t\t0x0000 - 0x004F : 0x0000                    ...                    0x0000\n\
                \t\t0x0050 - 0x005F : 0xF090 0x9090 0xF020 0x6020 0x2070 0xF010 0xF080 0xF0F0\n\
                \t\t0x0060 - 0x006F : 0x10F0 0x10F0 0x9090 0xF010 0x10F0 0x80F0 0x10F0 0xF080\n\
                \t\t0x0070 - 0x007F : 0xF090 0xF0F0 0x1020 0x4040 0xF090 0xF090 0xF0F0 0x90F0\n\
                \t\t0x0080 - 0x008F : 0x10F0 0xF090 0xF090 0x90E0 0x90E0 0x90E0 0xF080 0x8080\n\
                \t\t0x0090 - 0x009F : 0xF0E0 0x9090 0x90E0 0xF080 0xF080 0xF0F0 0x80F0 0x8080\n\
                \t\t0x00A0 - 0x01FF : 0x0000                    ...                    0x0000\n\
                \t\t0x0200 - 0x020F : 0x00E0 0x6A07 0x2206 0x0000 0x0000 0x0000 0x0000 0x0000\n\
                \t\t0x0210 - 0x0FFF : 0x0000                    ...                    0x0000\n\
            \tKeyboard :\n\
            \t\t0x0000 - 0x0007 : false  true   false  true   false  true   false  true\n\
            \t\t0x0008 - 0x000F : false  true   false  true   false  true   false  true\n\
            \tStack :\n\
                \t\t0x0000 - 0x0007 : 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000\n\
                \t\t0x0008 - 0x000F : 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000\n\
            \tRegister :\n\
            \t\t0x0000 - 0x0007 : 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000\n\
            \t\t0x0008 - 0x000F : 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000\n\
        }";

    #[test]
    /// tests if the pretty print output is as expected
    fn test_full_print() {
        let mut chip = tests::setup_chip("PRINT", &[0x00E0, 0x6A07, 0x2206]);
        let mut keys = [false; keyboard::SIZE];

        for (index, key) in keys.iter_mut().enumerate() {
            *key = index % 2 != 0;
        }

        chip.set_keyboard(&keys);
        assert!(chip.next().is_ok());

        // override the chip register as they are generated randomly
        chip.registers.fill(0);

        let actual_full = format!("{}", chip);
        let actual_split = actual_full.split('\n');
        let expected = OUTPUT_PRINT.split('\n');

        assert_eq!(OUTPUT_PRINT.lines().count(), actual_full.lines().count());
        for (exp, act) in expected.zip(actual_split) {
            assert_eq!(exp, act);
        }
    }

    #[test]
    fn test_stack_print() {
        let mut chip = tests::setup_chip("PRINT", &[0x00E0, 0x6A07, 0x2206]);
        chip.program_counter = 0x204;
        assert!(chip.next().is_ok());
        let print = format!("{}", chip);
        assert!(print.contains(
            "\t\t0x0000 - 0x0007 : 0x0206 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000"
        ));
    }
}
