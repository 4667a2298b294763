use crate::{
    chip8::ChipSet,
    devices::{DisplayCommands, KeyboardCommands},
    opcode::Operation,
    ProcessError,
};

/// Will run up to `cycles` cycles on the chip as a single frame of the host.
///
/// The keyboard is polled once at the start of the frame. The frame ends early if the
/// program waits for a key press or fails with an error that can not be skipped. Opcodes
/// that could not be decoded are stepped over. Once the frame is done the display is
/// given the framebuffer, if any instruction drew onto it.
///
/// Returns [`Operation::Wait`] if the frame stopped waiting for a key,
/// [`Operation::Draw`] if the display was updated and [`Operation::None`] otherwise.
pub fn run_frame<D, K>(
    chip: &mut ChipSet,
    display: &mut D,
    keyboard: &mut K,
    cycles: usize,
) -> Result<Operation, ProcessError>
where
    D: DisplayCommands,
    K: KeyboardCommands,
{
    let keys = keyboard.get_keyboard();
    chip.set_keyboard(&keys);

    let mut drawn = false;
    let mut waiting = false;

    for _ in 0..cycles {
        match chip.next() {
            Ok(Operation::Draw) => drawn = true,
            Ok(Operation::Wait) => {
                waiting = true;
                break;
            }
            Ok(Operation::None) => {}
            Err(err) if err.is_recoverable() => {
                log::debug!("skipped undecodable opcode in frame: {}", err);
            }
            Err(err) => {
                log::error!(
                    "'{}' stopped at {:#06X}: {}",
                    chip.get_name(),
                    chip.get_program_counter(),
                    err
                );
                return Err(err);
            }
        }
    }

    if drawn {
        if chip.get_framebuffer().count_set() == 0 {
            display.clear_display();
        } else {
            display.display(chip.get_display());
        }
    }

    Ok(if waiting {
        Operation::Wait
    } else if drawn {
        Operation::Draw
    } else {
        Operation::None
    })
}
