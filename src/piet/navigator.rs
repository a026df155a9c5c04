//! The navigator (§4.5): drives one program step, including the white-slide
//! and black-wall retry protocols, and hands decoded commands to the
//! executor.

use crate::piet::color::{transition, Color};
use crate::piet::dp::InstructionPointer;
use crate::piet::error::Halt;
use crate::piet::executor;
use crate::piet::grid::Grid;
use crate::io::Io;
use crate::piet::region::{find_block, ColorBlock};
use crate::stack::Stack;
use log::trace;

/// The running state of a Piet program: position, DP/CC, value stack, and
/// step count (§3 "Piet Machine State").
pub struct Machine<'a> {
    grid: &'a Grid,
    pos: (i64, i64),
    ip: InstructionPointer,
    stack: Stack,
    step_count: u64,
}

pub enum StepOutcome {
    Continued,
    Halted(Halt),
}

impl<'a> Machine<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        Machine { grid, pos: (0, 0), ip: InstructionPointer::default(), stack: Stack::new(), step_count: 0 }
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn pos(&self) -> (i64, i64) {
        self.pos
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Executes one program step (§4.5). Returns [`StepOutcome::Halted`] on
    /// normal termination; the caller decides whether to keep calling
    /// `step` past a `max_steps` ceiling (that's a host policy, not a core
    /// concern — see §5).
    pub fn step(&mut self, io: &mut dyn Io) -> StepOutcome {
        self.step_count += 1;
        let color = self.grid.at(self.pos.0, self.pos.1);
        trace!("step {} at {:?} color {:?} dp/cc {:?}", self.step_count, self.pos, color, self.ip);

        match color {
            Color::Black => StepOutcome::Halted(Halt::TerminatedOnBlack),
            Color::White => match white_slide(self.grid, self.pos, &mut self.ip) {
                Some((next_pos, _)) => {
                    self.pos = next_pos;
                    StepOutcome::Continued
                }
                None => StepOutcome::Halted(Halt::Terminated),
            },
            Color::Chromatic(..) => {
                let block = find_block(self.grid, self.pos.0 as usize, self.pos.1 as usize);
                self.step_chromatic(block, io)
            }
        }
    }

    fn step_chromatic(&mut self, block: ColorBlock, io: &mut dyn Io) -> StepOutcome {
        let Some((target, target_color)) = find_exit(&block, &mut self.ip, self.grid) else {
            return StepOutcome::Halted(Halt::Terminated);
        };

        let (final_pos, final_color) = if target_color == Color::White {
            match white_slide(self.grid, target, &mut self.ip) {
                Some(result) => result,
                None => return StepOutcome::Halted(Halt::Terminated),
            }
        } else {
            (target, target_color)
        };

        let command = transition(block.color, final_color)
            .expect("both endpoints of a navigator-chosen transition are chromatic");
        executor::execute(command, block.size() as i64, &mut self.stack, &mut self.ip, io);
        self.pos = final_pos;
        StepOutcome::Continued
    }

    /// Runs until the program halts or `max_steps` is reached.
    pub fn run(&mut self, io: &mut dyn Io, max_steps: Option<u64>) -> Halt {
        loop {
            if let Some(max) = max_steps {
                if self.step_count >= max {
                    return Halt::StepCapExceeded;
                }
            }
            if let StepOutcome::Halted(h) = self.step(io) {
                return h;
            }
        }
    }
}

/// Tries to exit the color block via `block.exit_target(ip.dp, ip.cc)`,
/// alternating CC toggle / DP rotation on failure, for up to the eight
/// attempts in §4.5 step 5. Returns the first non-black target reached
/// (chromatic or white) and leaves `ip` at whatever state found it.
fn find_exit(block: &ColorBlock, ip: &mut InstructionPointer, grid: &Grid) -> Option<((i64, i64), Color)> {
    for attempt in 0..8 {
        let target = block.exit_target(ip.dp, ip.cc);
        let target_color = grid.at(target.0, target.1);
        if target_color != Color::Black {
            return Some((target, target_color));
        }
        if attempt % 2 == 0 {
            ip.toggle_cc();
        } else {
            ip.rotate_dp_cw();
        }
    }
    None
}

/// Slides across contiguous white codels starting at `from` in the
/// direction `ip.dp`, bouncing (toggle CC, rotate DP) off black walls and
/// retrying from wherever the slide currently stands (§4.5 step 2).
///
/// Uses a flat eight-attempt counter, matching `find_exit`'s own retry loop
/// and the grounding source's `for (tries = 0; tries < 8; tries++)` — all
/// eight bounces are burned regardless of whether `(dp, cc)` has already
/// repeated, since CC's period-2 and DP's period-4 always return to the
/// starting combination after four toggle-both bounces.
fn white_slide(grid: &Grid, mut pos: (i64, i64), ip: &mut InstructionPointer) -> Option<((i64, i64), Color)> {
    for _ in 0..8 {
        let (dx, dy) = ip.dp.delta();
        loop {
            let next = (pos.0 + dx, pos.1 + dy);
            match grid.at(next.0, next.1) {
                Color::Black => break,
                Color::White => pos = next,
                other => return Some((next, other)),
            }
        }
        ip.toggle_cc();
        ip.rotate_dp_cw();
    }
    None
}
